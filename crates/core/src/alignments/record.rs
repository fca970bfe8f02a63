use serde::{Deserialize, Serialize};

use crate::detection::domain::face::{BoundingBox, FaceDetection, Pose};
use crate::detection::domain::landmarks::FaceLandmarks;

/// One face as stored in the alignments file. Pixel data and embeddings are
/// not persisted, only geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedFace {
    pub bounding_box: BoundingBox,
    pub landmarks: FaceLandmarks,
    pub pose: Pose,
}

impl From<&FaceDetection> for PersistedFace {
    fn from(detection: &FaceDetection) -> Self {
        Self {
            bounding_box: detection.bounding_box.clone(),
            landmarks: detection.landmarks.clone(),
            pose: detection.pose,
        }
    }
}

/// Per-frame entry in the alignments store.
///
/// A record with an empty face list is meaningful: the frame was processed
/// and no face was found. It is distinct from the frame having no record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub faces: Vec<PersistedFace>,
}

impl AlignmentRecord {
    pub fn from_detections(detections: &[FaceDetection]) -> Self {
        Self {
            faces: detections
                .iter()
                .filter(|d| !d.filtered)
                .map(PersistedFace::from)
                .collect(),
        }
    }

    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }
}
