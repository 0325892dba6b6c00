//! Durable player record store
//!
//! The whole collection is rewritten on every save. Writes go to a temp file in
//! the same directory which is then renamed over the store, so a crash mid-write
//! leaves the previous contents intact.

use crate::error::{EngineError, EngineResult};
use crate::record::{decode_all, encode_all, PlayerMap};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Backend for the full player collection
///
/// Callers must serialize `load_all` + mutate + `save_all` themselves; the
/// store only guarantees that a single save is all-or-nothing.
pub trait RecordStore: Send {
    /// Read every record. Fails with `StoreUnavailable` only when the medium
    /// does not exist yet; any other read failure is fatal.
    fn load_all(&self) -> EngineResult<PlayerMap>;

    /// Replace the durable contents with `records`
    fn save_all(&mut self, records: &PlayerMap) -> EngineResult<()>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}

/// Flat text file store, one player per line
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl RecordStore for FileRecordStore {
    fn load_all(&self) -> EngineResult<PlayerMap> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EngineError::StoreUnavailable(e));
            }
            Err(e) => return Err(EngineError::Io(e)),
        };

        let body = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            EngineError::CorruptRecordStore {
                line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
                reason: "not valid UTF-8".to_string(),
            }
        })?;
        let records = decode_all(&body)?;
        log::debug!("Loaded {} players from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn save_all(&mut self, records: &PlayerMap) -> EngineResult<()> {
        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        tmp.write_all(encode_all(records).as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        log::debug!("Saved {} players to {}", records.len(), self.path.display());
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "flat-file"
    }
}
