//! Durable storage for the source list.
//!
//! Sources live as pretty JSON in `sources.json` under the data directory.
//! Reads take a shared lock and writes an exclusive one.

use crate::data::Source;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SourceStore {
    path: PathBuf,
}

impl SourceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved list; `None` when nothing was ever saved
    pub fn load(&self) -> Result<Option<Vec<Source>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.lock_shared()?;

        let mut content = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut content);
        file.unlock()?;
        read?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let sources = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse sources from {}", self.path.display()))?;
        Ok(Some(sources))
    }

    pub fn save(&self, sources: &[Source]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.lock_exclusive()?;

        // Truncate only once the lock is held so readers never see a half-written list
        let content = serde_json::to_string_pretty(sources)?;
        let written = file.set_len(0).and_then(|_| {
            let mut writer = std::io::BufWriter::new(&file);
            writer.write_all(content.as_bytes())?;
            writer.flush()
        });
        file.unlock()?;
        written.with_context(|| format!("Failed to write {}", self.path.display()))?;

        // API keys are stored in plain text
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!("Saved {} sources to {}", sources.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{default_sources, Provider};
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_store() {
        let dir = TempDir::new().unwrap();
        let store = SourceStore::new(dir.path().join("sources.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SourceStore::new(dir.path().join("nested").join("sources.json"));

        let mut sources = default_sources();
        sources.push(Source {
            name: "internal".into(),
            url: "group/project".into(),
            domain: Some("https://gitlab.example.com".into()),
            api_key: "secret".into(),
            provider: Provider::Gitlab,
        });
        store.save(&sources).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, sources);
    }

    #[test]
    fn test_shorter_save_truncates() {
        let dir = TempDir::new().unwrap();
        let store = SourceStore::new(dir.path().join("sources.json"));

        store.save(&default_sources()).unwrap();
        store.save(&[Source::github("a/b")]).unwrap();

        assert_eq!(store.load().unwrap().unwrap(), vec![Source::github("a/b")]);
    }

    #[test]
    fn test_corrupt_store_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sources.json");
        fs::write(&path, "{not json").unwrap();
        assert!(SourceStore::new(path).load().is_err());
    }
}
