//! Storage port for snapshot documents.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Failures reported by a [`SnapshotStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the stored document failed.
    #[error("failed to read snapshot from {path}: {source}")]
    Read {
        /// Location that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Writing the document failed.
    #[error("failed to write snapshot to {path}: {source}")]
    Write {
        /// Location that was written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Best-effort storage for a single snapshot document.
pub trait SnapshotStore {
    /// Returns the stored document, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the stored document.
    fn save(&mut self, document: &str) -> Result<(), StoreError>;
}

/// Keeps the document in memory; useful for tests and headless runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    document: Option<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `document`.
    #[must_use]
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.document.clone())
    }

    fn save(&mut self, document: &str) -> Result<(), StoreError> {
        self.document = Some(document.to_owned());
        Ok(())
    }
}

/// Keeps the document in a file, replacing it atomically on save.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&mut self, document: &str) -> Result<(), StoreError> {
        write_text_atomic(&self.path, document).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    replace_file(&tmp_path, path)
}

fn replace_file(tmp_path: &Path, final_path: &Path) -> io::Result<()> {
    match fs::remove_file(final_path) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            let _ = fs::remove_file(tmp_path);
            return Err(error);
        }
    }

    if let Err(error) = fs::rename(tmp_path, final_path) {
        let _ = fs::remove_file(tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("snapshot.json");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_starts_empty_and_keeps_the_last_document() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().expect("load"), None);

        store.save("first").expect("save");
        store.save("second").expect("save");

        assert_eq!(store.load().expect("load").as_deref(), Some("second"));
    }

    #[test]
    fn temp_file_sits_next_to_the_target() {
        assert_eq!(
            temp_path_for(Path::new("saves/roster.json")),
            PathBuf::from("saves/roster.json.tmp")
        );
        assert_eq!(
            temp_path_for(Path::new("roster.json")),
            PathBuf::from("roster.json.tmp")
        );
    }
}
