//! Run configuration consumed by the extract pipeline.

use std::path::PathBuf;

use crate::detection::infrastructure::plugins::{AlignerKind, DetectorKind};

pub const DEFAULT_REF_THRESHOLD: f32 = 0.6;

/// Everything a single extract run needs to know. Built by the CLI and
/// treated as immutable afterwards.
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Explicit alignments location; resolved relative to the input if absent.
    pub alignments_path: Option<PathBuf>,
    pub skip_existing: bool,
    pub skip_faces: bool,
    /// Reference images of identities to keep.
    pub filter: Vec<PathBuf>,
    /// Reference images of identities to reject.
    pub nfilter: Vec<PathBuf>,
    pub ref_threshold: f32,
    pub detector: DetectorKind,
    pub aligner: AlignerKind,
    /// Compute filter reference embeddings on the main thread instead of a
    /// worker.
    pub singleprocess: bool,
    pub debug_landmarks: bool,
}

impl ExtractConfig {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            alignments_path: None,
            skip_existing: false,
            skip_faces: false,
            filter: Vec::new(),
            nfilter: Vec::new(),
            ref_threshold: DEFAULT_REF_THRESHOLD,
            detector: DetectorKind::Onnx,
            aligner: AlignerKind::Similarity,
            singleprocess: false,
            debug_landmarks: false,
        }
    }
}
