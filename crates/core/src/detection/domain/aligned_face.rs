//! Canonically aligned face crops and their centering conventions.

use crate::detection::domain::landmarks::FaceLandmarks;

/// How much of the extract box each centering convention discards.
///
/// The aligned output is produced at `Head` centering; tighter crops are
/// derived from it for display and legacy tooling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Centering {
    Head,
    Face,
    Legacy,
}

impl Centering {
    fn extract_ratio(self) -> f64 {
        match self {
            Centering::Legacy => 0.375,
            Centering::Face => 0.5,
            Centering::Head => 0.625,
        }
    }
}

/// Pixel size of the crop obtained by re-centering an aligned output of
/// `size` pixels from the `from` convention to the `to` convention.
/// Rounded down to an even number so the crop stays centred.
pub fn centered_size(from: Centering, to: Centering, size: usize) -> usize {
    if from == to {
        return size;
    }
    let scaled = size as f64 * (1.0 - from.extract_ratio()) / (1.0 - to.extract_ratio());
    2 * (scaled / 2.0) as usize
}

/// A square BGR crop of one face, warped to the canonical orientation.
#[derive(Clone, Debug)]
pub struct AlignedFace {
    pixels: Vec<u8>,
    size: usize,
    landmarks: FaceLandmarks,
}

impl AlignedFace {
    pub fn new(pixels: Vec<u8>, size: usize, landmarks: FaceLandmarks) -> Self {
        debug_assert_eq!(pixels.len(), size * size * 3);
        Self {
            pixels,
            size,
            landmarks,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Landmarks transformed into this crop's coordinate space.
    pub fn landmarks(&self) -> &FaceLandmarks {
        &self.landmarks
    }

    /// Centred crop box `(x1, y1, x2, y2)` for a smaller target size.
    pub fn cropped_roi(&self, target_size: usize) -> (usize, usize, usize, usize) {
        let pad = self.size.saturating_sub(target_size) / 2;
        (pad, pad, self.size - pad, self.size - pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_landmarks() -> FaceLandmarks {
        FaceLandmarks::new([(0.0, 0.0); 5])
    }

    #[test]
    fn test_centered_size_same_centering_is_identity() {
        assert_eq!(centered_size(Centering::Head, Centering::Head, 512), 512);
    }

    #[test]
    fn test_centered_size_head_to_face() {
        // 512 * 0.375 / 0.5 = 384
        assert_eq!(centered_size(Centering::Head, Centering::Face, 512), 384);
    }

    #[test]
    fn test_centered_size_head_to_legacy() {
        // 512 * 0.375 / 0.625 = 307.2 -> 306 (even)
        assert_eq!(centered_size(Centering::Head, Centering::Legacy, 512), 306);
    }

    #[test]
    fn test_cropped_roi_is_centred() {
        let face = AlignedFace::new(vec![0u8; 512 * 512 * 3], 512, dummy_landmarks());
        let (x1, y1, x2, y2) = face.cropped_roi(384);
        assert_eq!((x1, y1, x2, y2), (64, 64, 448, 448));
        assert_eq!(x2 - x1, 384);
        assert_eq!(y2 - y1, 384);
    }

    #[test]
    fn test_cropped_roi_larger_target_clamps() {
        let face = AlignedFace::new(vec![0u8; 16 * 16 * 3], 16, dummy_landmarks());
        assert_eq!(face.cropped_roi(100), (0, 0, 16, 16));
    }
}
