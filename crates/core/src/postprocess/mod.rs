//! Optional post-processing applied to each frame's detections before they
//! are persisted.

pub mod debug_overlay;
pub mod draw;
pub mod face_filter;
pub mod pipeline;

use crate::detection::domain::face::FaceDetection;
use crate::shared::frame::Frame;

/// One frame plus its detections, handed through the action chain by value.
/// Each action mutates it in place; nothing else aliases it.
pub struct WorkingMedia {
    pub frame: Frame,
    pub detections: Vec<FaceDetection>,
}

impl WorkingMedia {
    pub fn new(frame: Frame, detections: Vec<FaceDetection>) -> Self {
        Self { frame, detections }
    }
}
