//! xtask for ewpsync - build automation
//!
//! Currently only renders the man page from the clap definitions.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for ewpsync")]
enum Task {
    /// Generate the ewpsync(1) man page
    GenerateManPages {
        /// Output directory for man pages (default: ./man)
        #[arg(short, long, default_value = "man")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    match Task::parse() {
        Task::GenerateManPages { output } => generate_man_page(&output),
    }
}

fn generate_man_page(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let cmd = ewpsync::cli::Cli::command();
    let man_path = output_dir.join("ewpsync.1");
    let man_file = fs::File::create(&man_path)
        .with_context(|| format!("Failed to create man page: {}", man_path.display()))?;

    clap_mangen::Man::new(cmd).render(&mut BufWriter::new(man_file))?;

    println!("✓ Generated: {}", man_path.display());
    println!("\nTo view the man page:");
    println!("  man {}", man_path.display());

    Ok(())
}
