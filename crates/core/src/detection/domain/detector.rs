use crate::detection::domain::face::BoundingBox;
use crate::detection::domain::landmarks::FaceLandmarks;
use crate::shared::frame::Frame;

/// A detector hit before alignment and pose estimation.
#[derive(Clone, Debug)]
pub struct RawFace {
    pub bounding_box: BoundingBox,
    pub landmarks: FaceLandmarks,
}

/// Finds faces and their 5-point landmarks in a BGR frame.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawFace>, Box<dyn std::error::Error>>;
}
