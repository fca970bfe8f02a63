//! Enumerated plugin kinds and the factory that builds them.
//!
//! Plugin selection is a closed set resolved up front; there is no runtime
//! lookup by name beyond parsing these kinds.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::detection::domain::aligner::FaceAligner;
use crate::detection::domain::detector::FaceDetector;
use crate::detection::domain::recognizer::{FaceRecognizer, PluginFactory};
use crate::detection::infrastructure::model_resolver::{self, ModelResolveError};
use crate::detection::infrastructure::onnx_detector::{OnnxFaceDetector, DEFAULT_CONFIDENCE};
use crate::detection::infrastructure::onnx_recognizer::OnnxFaceRecognizer;
use crate::detection::infrastructure::similarity_aligner::SimilarityAligner;
use crate::shared::constants::{
    DETECT_MODEL_NAME, DETECT_MODEL_URL, EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL,
};

#[derive(Debug, Error)]
#[error("unknown plugin kind: {0}")]
pub struct UnknownPluginKind(String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorKind {
    Onnx,
}

impl FromStr for DetectorKind {
    type Err = UnknownPluginKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "onnx" => Ok(Self::Onnx),
            other => Err(UnknownPluginKind(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignerKind {
    Similarity,
}

impl FromStr for AlignerKind {
    type Err = UnknownPluginKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "similarity" => Ok(Self::Similarity),
            other => Err(UnknownPluginKind(other.to_string())),
        }
    }
}

/// Builds ONNX-backed plugin instances from cached model files.
///
/// Model resolution (cache check, download) happens once here; workers then
/// construct sessions from the local paths.
pub struct OnnxPluginFactory {
    detector_kind: DetectorKind,
    aligner_kind: AlignerKind,
    detector_model: PathBuf,
    recognizer_model: PathBuf,
}

impl OnnxPluginFactory {
    pub fn resolve(
        detector_kind: DetectorKind,
        aligner_kind: AlignerKind,
    ) -> Result<Self, ModelResolveError> {
        let detector_model = model_resolver::resolve(DETECT_MODEL_NAME, DETECT_MODEL_URL)?;
        let recognizer_model = model_resolver::resolve(EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL)?;
        Ok(Self {
            detector_kind,
            aligner_kind,
            detector_model,
            recognizer_model,
        })
    }
}

impl PluginFactory for OnnxPluginFactory {
    fn build_detector(&self) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
        match self.detector_kind {
            DetectorKind::Onnx => Ok(Box::new(OnnxFaceDetector::new(
                &self.detector_model,
                DEFAULT_CONFIDENCE,
            )?)),
        }
    }

    fn build_aligner(&self) -> Result<Box<dyn FaceAligner>, Box<dyn std::error::Error>> {
        match self.aligner_kind {
            AlignerKind::Similarity => Ok(Box::new(SimilarityAligner)),
        }
    }

    fn build_recognizer(&self) -> Result<Box<dyn FaceRecognizer>, Box<dyn std::error::Error>> {
        Ok(Box::new(OnnxFaceRecognizer::new(&self.recognizer_model)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_kind_parses_case_insensitively() {
        assert_eq!(DetectorKind::from_str("ONNX").unwrap(), DetectorKind::Onnx);
    }

    #[test]
    fn test_aligner_kind_parses() {
        assert_eq!(
            AlignerKind::from_str("similarity").unwrap(),
            AlignerKind::Similarity
        );
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let err = DetectorKind::from_str("mtcnn").unwrap_err();
        assert!(err.to_string().contains("mtcnn"));
    }
}
