//! On-disk serialization for the alignments store.
//!
//! The store works with extensionless logical paths; the io implementation
//! owns the file extension and the encoding.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::alignments::record::AlignmentRecord;

#[derive(Debug, Error)]
pub enum AlignmentsError {
    #[error("alignments io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("alignments file is not valid json: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait AlignmentsIo: Send {
    /// Full on-disk path for a logical, extensionless path.
    fn file_path(&self, path: &Path) -> PathBuf;

    fn exists(&self, path: &Path) -> bool {
        self.file_path(path).is_file()
    }

    fn load(&self, path: &Path) -> Result<BTreeMap<String, AlignmentRecord>, AlignmentsError>;

    fn save(
        &self,
        path: &Path,
        data: &BTreeMap<String, AlignmentRecord>,
    ) -> Result<(), AlignmentsError>;
}

#[derive(Debug, Default)]
pub struct JsonAlignmentsIo;

impl AlignmentsIo for JsonAlignmentsIo {
    fn file_path(&self, path: &Path) -> PathBuf {
        path.with_extension("json")
    }

    fn load(&self, path: &Path) -> Result<BTreeMap<String, AlignmentRecord>, AlignmentsError> {
        let raw = fs::read_to_string(self.file_path(path))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Stages to a `.part` file and renames, so an interrupted save never
    /// leaves a truncated file where a valid one stood.
    fn save(
        &self,
        path: &Path,
        data: &BTreeMap<String, AlignmentRecord>,
    ) -> Result<(), AlignmentsError> {
        let serialized = serde_json::to_string(data)?;
        let target = self.file_path(path);
        let staging = target.with_extension("json.part");
        fs::write(&staging, serialized)?;
        fs::rename(&staging, &target)?;
        Ok(())
    }
}
