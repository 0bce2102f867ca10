use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use identity_swap_core::{Result, SwapError, SwapJournal};

pub trait JournalStore {
    fn load(&self, key: &str) -> Result<Option<SwapJournal>>;

    fn save(&self, key: &str, journal: &SwapJournal) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Human-readable location of the journal, for operator messages.
    fn location(&self, key: &str) -> String;
}

/// Stores each journal as `<dir>/<key>.swap.json`.
#[derive(Debug, Clone)]
pub struct FileJournalStore {
    dir: PathBuf,
}

impl FileJournalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.swap.json"))
    }
}

impl JournalStore for FileJournalStore {
    fn load(&self, key: &str) -> Result<Option<SwapJournal>> {
        let path = self.path(key);
        match fs::read(&path) {
            Ok(bytes) => SwapJournal::from_json(&bytes).map(Some),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SwapError::journal(format!(
                "failed to read {}: {error}",
                path.display()
            ))),
        }
    }

    fn save(&self, key: &str, journal: &SwapJournal) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|error| {
            SwapError::journal(format!("failed to create {}: {error}", self.dir.display()))
        })?;

        let path = self.path(key);
        let staging_path = path.with_extension("json.tmp");
        fs::write(&staging_path, journal.to_json()?).map_err(|error| {
            SwapError::journal(format!("failed to write {}: {error}", staging_path.display()))
        })?;
        fs::rename(&staging_path, &path).map_err(|error| {
            SwapError::journal(format!("failed to replace {}: {error}", path.display()))
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SwapError::journal(format!(
                "failed to remove {}: {error}",
                path.display()
            ))),
        }
    }

    fn location(&self, key: &str) -> String {
        self.path(key).display().to_string()
    }
}
