use serde::{Deserialize, Serialize};

use crate::detection::domain::aligned_face::AlignedFace;
use crate::detection::domain::landmarks::FaceLandmarks;

/// Axis-aligned face box in source-frame pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

impl BoundingBox {
    /// Diagonal length, used as the "original size" statistic on overlays.
    pub fn diagonal(&self) -> f64 {
        (self.width * self.width + self.height * self.height).sqrt()
    }
}

/// Head pose derived from landmark geometry, in degrees.
///
/// This is a coarse geometric estimate (no 3D model fit): yaw from the
/// horizontal nose offset, pitch from the vertical nose position between the
/// eye and mouth lines. Roll is not tracked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub pitch: f64,
    pub yaw: f64,
}

/// Vertical nose ratio for a level, frontal face.
const NEUTRAL_VERTICAL_RATIO: f64 = 0.6;

impl Pose {
    pub fn from_landmarks(landmarks: &FaceLandmarks) -> Self {
        let yaw = landmarks.horizontal_ratio() * 90.0;
        let pitch = (NEUTRAL_VERTICAL_RATIO - landmarks.vertical_ratio()) * 90.0;
        Self { pitch, yaw }
    }

    /// Endpoints of the X/Y/Z pose axes projected onto an aligned face of
    /// the given size, anchored at its centre. Order: X (right), Y (down),
    /// Z (out of screen).
    pub fn axis_points(&self, size: usize) -> [(i32, i32); 3] {
        let half = size as f64 / 2.0;
        let reach = size as f64 / 3.0;
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();

        // Columns of Ry(yaw) * Rx(pitch), dropped to 2D (screen y grows down).
        let axes = [(cy, sy * sp), (0.0, cp), (sy, -cy * sp)];
        axes.map(|(dx, dy)| {
            (
                (half + dx * reach).round() as i32,
                (half + dy * reach).round() as i32,
            )
        })
    }
}

/// One detected face flowing through the post-processing chain.
///
/// `embedding` is computed lazily by the identity filter; `filtered` marks a
/// detection rejected by it. `aligned` is absent only when no aligner ran
/// (it is always populated by the extract loop).
#[derive(Clone, Debug)]
pub struct FaceDetection {
    pub bounding_box: BoundingBox,
    pub landmarks: FaceLandmarks,
    pub pose: Pose,
    pub embedding: Option<Vec<f32>>,
    pub filtered: bool,
    pub aligned: Option<AlignedFace>,
}

impl FaceDetection {
    pub fn new(
        bounding_box: BoundingBox,
        landmarks: FaceLandmarks,
        aligned: Option<AlignedFace>,
    ) -> Self {
        let pose = Pose::from_landmarks(&landmarks);
        Self {
            bounding_box,
            landmarks,
            pose,
            embedding: None,
            filtered: false,
            aligned,
        }
    }
}
