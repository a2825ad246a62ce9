use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, info, trace};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{Bit, BitDraft, BitError, Result};

/// The JSON file holding every bit, newest first.
pub struct BitStore {
    /// Location of the store file
    path: PathBuf,
}

impl BitStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every stored record as raw JSON. A missing file, or one that is
    /// not a JSON list, is an error; the store is never created implicitly.
    ///
    /// Records are not checked against the bit shape, so older entries are
    /// written back exactly as they were read.
    pub fn load(&self) -> Result<Vec<Value>> {
        debug!("Loading bits from {}", self.path.display());
        let content = fs::read_to_string(&self.path).map_err(|e| {
            error!("Failed to read bits store {}: {}", self.path.display(), e);
            BitError::StoreIo {
                path: self.path.clone(),
                source: e,
            }
        })?;

        let bits: Vec<Value> = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse bits store {}: {}", self.path.display(), e);
            BitError::StoreCorrupt {
                path: self.path.clone(),
                source: e,
            }
        })?;

        trace!("Loaded {} bits", bits.len());
        Ok(bits)
    }

    /// Finalizes `draft` and puts it at the head of the store
    pub fn prepend(&self, draft: BitDraft) -> Result<Bit> {
        let mut bits = self.load()?;

        let bit = draft.finalize();
        info!("Adding bit {}", bit.id);
        bits.insert(0, serde_json::to_value(&bit)?);

        self.save(&bits)?;
        Ok(bit)
    }

    /// Overwrites the store with `bits`, pretty-printed
    pub fn save(&self, bits: &[Value]) -> Result<()> {
        let mut json = serde_json::to_string_pretty(bits)?;
        json.push('\n');

        // Create a temporary file in the same directory (for atomic operation)
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let store_err = |e: std::io::Error| BitError::StoreIo {
            path: self.path.clone(),
            source: e,
        };

        let mut temp_file = NamedTempFile::new_in(dir).map_err(store_err)?;
        temp_file.write_all(json.as_bytes()).map_err(store_err)?;
        temp_file.flush().map_err(store_err)?;

        debug!("Moving new store into place at {}", self.path.display());
        temp_file.persist(&self.path).map_err(|e| {
            error!("Failed to persist {}: {}", self.path.display(), e.error);
            store_err(e.error)
        })?;

        Ok(())
    }
}
