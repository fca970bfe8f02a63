//! 5-point face landmarks: left eye, right eye, nose, left mouth, right mouth.
//!
//! Points with x <= 0 are treated as invisible (detector keypoint confidence
//! below threshold).

use serde::{Deserialize, Serialize};

const LEFT_EYE: usize = 0;
const RIGHT_EYE: usize = 1;
const NOSE: usize = 2;
const LEFT_MOUTH: usize = 3;
const RIGHT_MOUTH: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    points: [(f64, f64); 5],
}

impl FaceLandmarks {
    pub fn new(points: [(f64, f64); 5]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64); 5] {
        &self.points
    }

    pub fn has_visible(&self) -> bool {
        self.points.iter().any(|(x, _)| *x > 0.0)
    }

    pub fn eyes_and_nose_visible(&self) -> bool {
        [LEFT_EYE, RIGHT_EYE, NOSE]
            .iter()
            .all(|&i| self.points[i].0 > 0.0)
    }

    /// Horizontal nose offset from the eye midpoint, relative to eye span.
    ///
    /// Signed: negative when the nose points left of the midpoint, positive
    /// right. Clamped to [-1, 1]; 0.0 when the required landmarks are not
    /// visible or the eyes coincide.
    pub fn horizontal_ratio(&self) -> f64 {
        if !self.eyes_and_nose_visible() {
            return 0.0;
        }
        let nose = self.points[NOSE];
        let left_eye = self.points[LEFT_EYE];
        let right_eye = self.points[RIGHT_EYE];

        let eye_mid_x = (left_eye.0 + right_eye.0) / 2.0;
        let eye_span = (right_eye.0 - left_eye.0).abs();
        if eye_span <= 0.0 {
            return 0.0;
        }
        ((nose.0 - eye_mid_x) / eye_span).clamp(-1.0, 1.0)
    }

    /// Vertical nose position between the eye line and the mouth line.
    ///
    /// 0.0 at the eye line, 1.0 at the mouth line; clamped to [-1, 2] to
    /// tolerate extreme tilts. Returns the neutral value 0.6 when the
    /// required landmarks are not visible.
    pub fn vertical_ratio(&self) -> f64 {
        const NEUTRAL: f64 = 0.6;
        let visible = self.eyes_and_nose_visible()
            && self.points[LEFT_MOUTH].0 > 0.0
            && self.points[RIGHT_MOUTH].0 > 0.0;
        if !visible {
            return NEUTRAL;
        }

        let eye_y = (self.points[LEFT_EYE].1 + self.points[RIGHT_EYE].1) / 2.0;
        let mouth_y = (self.points[LEFT_MOUTH].1 + self.points[RIGHT_MOUTH].1) / 2.0;
        let span = mouth_y - eye_y;
        if span.abs() < f64::EPSILON {
            return NEUTRAL;
        }
        ((self.points[NOSE].1 - eye_y) / span).clamp(-1.0, 2.0)
    }
}
