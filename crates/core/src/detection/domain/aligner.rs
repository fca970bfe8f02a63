use crate::detection::domain::aligned_face::AlignedFace;
use crate::detection::domain::detector::RawFace;
use crate::shared::frame::Frame;

/// Warps a detected face to the canonical aligned crop.
pub trait FaceAligner: Send {
    fn align(
        &mut self,
        frame: &Frame,
        face: &RawFace,
        size: usize,
    ) -> Result<AlignedFace, Box<dyn std::error::Error>>;
}
