// File: src/persistence/file.rs
use crate::core::types::WordList;
use crate::error::{Error, Result};
use crate::persistence::WordStore;
use async_trait::async_trait;
use std::fs;
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const FILE_NAME: &str = "wordlist.json";
const LABEL: &str = "FS";

/// Local-file strategy: a data directory holding one JSON envelope.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WordStore for FileStore {
    async fn load(&self) -> Result<Option<WordList>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_from_disk(&path))
            .await
            .map_err(|e| Error::unavailable(LABEL, e))?
    }

    async fn save(&self, list: &WordList) -> Result<()> {
        let path = self.path.clone();
        let list = list.clone();
        tokio::task::spawn_blocking(move || save_to_disk(&list, &path))
            .await
            .map_err(|e| Error::unavailable(LABEL, e))?
    }

    fn label(&self) -> &'static str {
        LABEL
    }
}

pub fn load_from_disk(path: &Path) -> Result<Option<WordList>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::unavailable(LABEL, e)),
    };
    let list = WordList::from_json_slice(&bytes)?;
    debug!(path = %path.display(), words = list.len(), "Loaded word list from disk");
    Ok(Some(list))
}

/// Writes to a temp file in the target directory, then renames it into place,
/// so readers see either the old document or the new one.
pub fn save_to_disk(list: &WordList, path: &Path) -> Result<()> {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir).map_err(|e| io_failure(parent_dir, e))?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| io_failure(parent_dir, e))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, list).map_err(|e| {
            if e.is_io() {
                Error::unavailable(LABEL, e)
            } else {
                Error::Serialization(e)
            }
        })?;
        writer.flush().map_err(|e| io_failure(parent_dir, e))?;
    }
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| io_failure(parent_dir, e))?;

    temp_file
        .persist(path)
        .map_err(|e| io_failure(parent_dir, e.error))?;
    debug!(path = %path.display(), words = list.len(), "Saved word list to disk");
    Ok(())
}

fn io_failure(dir: &Path, e: io::Error) -> Error {
    if e.kind() == ErrorKind::PermissionDenied {
        Error::NotConfigured(format!("data directory {} is not writable: {e}", dir.display()))
    } else {
        Error::unavailable(LABEL, e)
    }
}
