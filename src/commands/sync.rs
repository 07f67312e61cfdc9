use crate::config::SyncConfig;
use crate::diff::{UnifiedDiffConfig, generate_unified_diff};
use crate::manifest::Document;
use crate::output;
use crate::scanner::PathEnumerator;
use crate::sync::{CandidatePath, SyncOptions, SyncReport, Synchronizer};
use anyhow::{Context, Result};
use colored::control::SHOULD_COLORIZE;
use std::io::Write;
use tracing::info;

/// Execute the sync pipeline: load the manifest, add every matching file
/// below `config.source_dir`, then write the manifest once.
///
/// Nothing is written if any step before the save fails, and nothing at all
/// with `config.dry_run`; a diff of the pending change is printed instead.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest cannot be read or parsed, or is malformed
/// - The source directory cannot be walked
/// - The manifest cannot be written
pub fn execute(config: &SyncConfig) -> Result<SyncReport> {
    let project = &config.project_path;

    let mut doc = Document::load(project)
        .with_context(|| format!("Failed to load project {}", project.display()))?;
    let scanner = PathEnumerator::new(config)?;
    let options = SyncOptions::from(config);

    info!(
        source = %scanner.root().display(),
        project = %project.display(),
        pattern = %config.pattern,
        "Synchronizing"
    );

    let original = if config.dry_run {
        Some(doc.to_xml(config.indent)?)
    } else {
        None
    };

    let mut synchronizer = Synchronizer::new(&mut doc, &options)?;
    let mut matched = 0usize;
    for candidate in scanner.candidates() {
        let candidate = CandidatePath::parse(&candidate?)?;
        synchronizer.add(&candidate)?;
        matched += 1;
    }
    let report = synchronizer.finish();

    if matched == 0 {
        output::warning(&format!(
            "No files matching '{}' under {}",
            config.pattern,
            scanner.root().display()
        ));
    }

    if let Some(original) = original {
        let updated = doc.to_xml(config.indent)?;
        let diff_config = UnifiedDiffConfig {
            colorize: SHOULD_COLORIZE.should_colorize(),
            ..UnifiedDiffConfig::default()
        };
        let mut stdout = std::io::stdout().lock();
        generate_unified_diff(&original, &updated, project, &diff_config, &mut stdout)
            .context("Failed to print diff")?;
        stdout.flush()?;
    } else {
        doc.save(project, config.indent)
            .with_context(|| format!("Failed to write project {}", project.display()))?;
    }

    print_summary(&report, config.dry_run);
    Ok(report)
}

/// Final one-line summary of a run
fn print_summary(report: &SyncReport, dry_run: bool) {
    if report.is_unchanged() {
        output::info("Project already up to date");
        return;
    }

    let summary = format!(
        "{} file(s) added, {} group(s) created",
        report.added_files.len(),
        report.created_groups.len()
    );
    if dry_run {
        output::info(&format!("{summary} (dry run, nothing written)"));
    } else {
        output::success(&summary);
    }
}
