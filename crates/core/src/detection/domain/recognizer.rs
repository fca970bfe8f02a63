use crate::detection::domain::aligned_face::AlignedFace;
use crate::detection::domain::aligner::FaceAligner;
use crate::detection::domain::detector::FaceDetector;

/// Produces an L2-normalised identity embedding for an aligned face.
pub trait FaceRecognizer: Send {
    fn embed(&mut self, face: &AlignedFace) -> Result<Vec<f32>, Box<dyn std::error::Error>>;
}

/// Builds fresh plugin instances, one set per worker.
///
/// ONNX sessions are not shared across threads, so anything that runs
/// detection off the main extract loop constructs its own instances
/// through this factory.
pub trait PluginFactory: Send + Sync {
    fn build_detector(&self) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>>;
    fn build_aligner(&self) -> Result<Box<dyn FaceAligner>, Box<dyn std::error::Error>>;
    fn build_recognizer(&self) -> Result<Box<dyn FaceRecognizer>, Box<dyn std::error::Error>>;
}
