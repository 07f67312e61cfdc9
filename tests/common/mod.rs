#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest with a root element and nothing else
pub const EMPTY_MANIFEST: &str =
    "<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n<project/>\n";

/// Temporary project fixture: a manifest at `<tmp>/app.ewp` next to the sources
pub struct TestProject {
    pub temp_dir: TempDir,
}

impl TestProject {
    /// Create a project whose manifest has no entries
    pub fn new() -> Result<Self> {
        Self::with_manifest(EMPTY_MANIFEST)
    }

    /// Create a project with the given manifest content
    pub fn with_manifest(content: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::write(temp_dir.path().join("app.ewp"), content)?;
        Ok(Self { temp_dir })
    }

    /// Get the temporary directory path
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.path().join("app.ewp")
    }

    /// Create an empty source file (and its parent directories)
    pub fn touch(&self, relative: &str) -> Result<()> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "")?;
        Ok(())
    }

    /// Manifest bytes as currently on disk
    pub fn manifest_bytes(&self) -> Result<Vec<u8>> {
        Ok(fs::read(self.manifest_path())?)
    }

    /// Manifest decoded as ISO-8859-1
    pub fn manifest(&self) -> Result<String> {
        Ok(ewpsync::manifest::codec::decode_latin1(&self.manifest_bytes()?))
    }

    /// `ewpsync <tmp>/<source> <tmp>/app.ewp`, run from the project directory
    pub fn sync(&self, source: &str) -> Result<Command> {
        let mut cmd = Command::cargo_bin("ewpsync")?;
        cmd.current_dir(self.path())
            .env_remove("EWPSYNC_CONFIG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg(self.path().join(source))
            .arg(self.manifest_path());
        Ok(cmd)
    }
}
