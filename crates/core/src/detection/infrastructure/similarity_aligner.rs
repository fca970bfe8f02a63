//! Face alignment via 4-DOF similarity transform.
//!
//! Warps detected faces to the canonical square crop using the five
//! ArcFace reference landmarks and least-squares estimation.

use crate::detection::domain::aligned_face::AlignedFace;
use crate::detection::domain::aligner::FaceAligner;
use crate::detection::domain::detector::RawFace;
use crate::detection::domain::landmarks::FaceLandmarks;
use crate::shared::frame::Frame;

/// ArcFace reference landmarks for a 112×112 output; scaled up for larger
/// output sizes.
const REFERENCE_LANDMARKS_112: [(f64, f64); 5] = [
    (38.2946, 51.6963), // left eye
    (73.5318, 51.5014), // right eye
    (56.0252, 71.7366), // nose
    (41.5493, 92.3655), // left mouth
    (70.7299, 92.2041), // right mouth
];

#[derive(Debug, Default)]
pub struct SimilarityAligner;

impl FaceAligner for SimilarityAligner {
    fn align(
        &mut self,
        frame: &Frame,
        face: &RawFace,
        size: usize,
    ) -> Result<AlignedFace, Box<dyn std::error::Error>> {
        let matrix = if face.landmarks.eyes_and_nose_visible() {
            let reference = scaled_reference(size);
            estimate_similarity_transform(face.landmarks.points(), &reference)
        } else {
            // No usable landmarks; map the bounding box to the output square.
            bbox_transform(face, size)
        };

        let pixels = warp_affine(frame, &matrix, size);
        let warped_points = face.landmarks.points().map(|p| apply(&matrix, p));
        Ok(AlignedFace::new(
            pixels,
            size,
            FaceLandmarks::new(warped_points),
        ))
    }
}

fn scaled_reference(size: usize) -> [(f64, f64); 5] {
    let scale = size as f64 / 112.0;
    REFERENCE_LANDMARKS_112.map(|(x, y)| (x * scale, y * scale))
}

fn bbox_transform(face: &RawFace, size: usize) -> [f64; 6] {
    let bbox = &face.bounding_box;
    let span = bbox.width.max(bbox.height).max(1.0);
    let s = size as f64 / span;
    let cx = bbox.x + bbox.width / 2.0;
    let cy = bbox.y + bbox.height / 2.0;
    let half = size as f64 / 2.0;
    [s, 0.0, half - s * cx, 0.0, s, half - s * cy]
}

fn apply(matrix: &[f64; 6], (x, y): (f64, f64)) -> (f64, f64) {
    (
        matrix[0] * x + matrix[1] * y + matrix[2],
        matrix[3] * x + matrix[4] * y + matrix[5],
    )
}

/// Estimate a 2×3 similarity transform (scale, rotation, translation) from
/// `src` landmarks to `dst` landmarks using least-squares.
///
/// Returns `[a, -b, tx, b, a, ty]` representing the matrix:
/// ```text
/// | a  -b  tx |
/// | b   a  ty |
/// ```
fn estimate_similarity_transform(src: &[(f64, f64); 5], dst: &[(f64, f64); 5]) -> [f64; 6] {
    // Overdetermined system A * [a, b, tx, ty]^T = B. For each point pair
    // (sx, sy) -> (dx, dy):
    //   sx * a - sy * b + tx = dx
    //   sy * a + sx * b + ty = dy
    let mut ata = [0.0f64; 16]; // 4x4, row-major
    let mut atb = [0.0f64; 4];

    for i in 0..5 {
        let (sx, sy) = src[i];
        let (dx, dy) = dst[i];

        let r1 = [sx, -sy, 1.0, 0.0];
        let r2 = [sy, sx, 0.0, 1.0];

        for j in 0..4 {
            for k in 0..4 {
                ata[j * 4 + k] += r1[j] * r1[k] + r2[j] * r2[k];
            }
            atb[j] += r1[j] * dx + r2[j] * dy;
        }
    }

    let x = solve_4x4(&ata, &atb);
    let (a, b, tx, ty) = (x[0], x[1], x[2], x[3]);
    [a, -b, tx, b, a, ty]
}

/// Solve a 4×4 linear system via Gaussian elimination with partial pivoting.
#[allow(clippy::needless_range_loop)]
fn solve_4x4(ata: &[f64; 16], atb: &[f64; 4]) -> [f64; 4] {
    let mut m = [[0.0f64; 5]; 4];
    for i in 0..4 {
        for j in 0..4 {
            m[i][j] = ata[i * 4 + j];
        }
        m[i][4] = atb[i];
    }

    // Forward elimination with partial pivoting
    for col in 0..4 {
        let mut max_row = col;
        let mut max_val = m[col][col].abs();
        for row in (col + 1)..4 {
            if m[row][col].abs() > max_val {
                max_val = m[row][col].abs();
                max_row = row;
            }
        }
        m.swap(col, max_row);

        let pivot = m[col][col];
        if pivot.abs() < 1e-12 {
            return [1.0, 0.0, 0.0, 0.0]; // degenerate input, identity-ish
        }

        for row in (col + 1)..4 {
            let factor = m[row][col] / pivot;
            for j in col..5 {
                m[row][j] -= factor * m[col][j];
            }
        }
    }

    // Back substitution
    let mut x = [0.0f64; 4];
    for i in (0..4).rev() {
        x[i] = m[i][4];
        for j in (i + 1)..4 {
            x[i] -= m[i][j] * x[j];
        }
        x[i] /= m[i][i];
    }

    x
}

/// Apply a 2×3 affine warp to a BGR frame, producing a square BGR output.
///
/// Uses bilinear interpolation; out-of-bounds pixels are filled with black.
fn warp_affine(frame: &Frame, matrix: &[f64; 6], out_size: usize) -> Vec<u8> {
    let (a, tx) = (matrix[0], matrix[2]);
    let (b, ty) = (matrix[3], matrix[5]);

    // Invert the 2x2 part: M = [[a, -b], [b, a]], det = a^2 + b^2
    let det = a * a + b * b;
    if det.abs() < 1e-12 {
        return vec![0u8; out_size * out_size * 3];
    }
    let inv_det = 1.0 / det;
    let ia = a * inv_det;
    let ib = b * inv_det;

    let src = frame.data();
    let src_w = frame.width() as i64;
    let src_h = frame.height() as i64;
    let stride = frame.width() as usize * 3;

    let mut output = vec![0u8; out_size * out_size * 3];

    for oy in 0..out_size {
        for ox in 0..out_size {
            // Map output pixel back to source: src = M_inv * (dst - t)
            let dx = ox as f64 - tx;
            let dy = oy as f64 - ty;
            let sx = ia * dx + ib * dy;
            let sy = -ib * dx + ia * dy;

            let x0 = sx.floor() as i64;
            let y0 = sy.floor() as i64;
            let fx = sx - x0 as f64;
            let fy = sy - y0 as f64;

            let sample = |x: i64, y: i64, c: usize| -> f64 {
                if x >= 0 && x < src_w && y >= 0 && y < src_h {
                    src[y as usize * stride + x as usize * 3 + c] as f64
                } else {
                    0.0
                }
            };

            for c in 0..3 {
                let val = sample(x0, y0, c) * (1.0 - fx) * (1.0 - fy)
                    + sample(x0 + 1, y0, c) * fx * (1.0 - fy)
                    + sample(x0, y0 + 1, c) * (1.0 - fx) * fy
                    + sample(x0 + 1, y0 + 1, c) * fx * fy;
                output[(oy * out_size + ox) * 3 + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face::BoundingBox;

    fn flat_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(
            vec![value; (width * height * 3) as usize],
            width,
            height,
            3,
            "f.png",
            None,
        )
    }

    #[test]
    fn test_identity_transform() {
        // src == dst gives a ≈ 1, b ≈ 0, t ≈ 0
        let pts = REFERENCE_LANDMARKS_112;
        let m = estimate_similarity_transform(&pts, &pts);

        assert!((m[0] - 1.0).abs() < 1e-6, "a = {}", m[0]);
        assert!(m[1].abs() < 1e-6, "-b = {}", m[1]);
        assert!(m[2].abs() < 1e-4, "tx = {}", m[2]);
        assert!(m[3].abs() < 1e-6, "b = {}", m[3]);
        assert!((m[4] - 1.0).abs() < 1e-6, "a2 = {}", m[4]);
        assert!(m[5].abs() < 1e-4, "ty = {}", m[5]);
    }

    #[test]
    fn test_scaled_transform() {
        // Source landmarks at 2x scale → transform scale ≈ 0.5
        let src = REFERENCE_LANDMARKS_112.map(|(x, y)| (x * 2.0, y * 2.0));
        let m = estimate_similarity_transform(&src, &REFERENCE_LANDMARKS_112);
        assert!((m[0] - 0.5).abs() < 1e-6, "a = {}", m[0]);
    }

    #[test]
    fn test_scaled_reference_doubles_at_224() {
        let scaled = scaled_reference(224);
        assert!((scaled[0].0 - REFERENCE_LANDMARKS_112[0].0 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_warp_output_size() {
        let frame = flat_frame(64, 48, 128);
        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let out = warp_affine(&frame, &m, 112);
        assert_eq!(out.len(), 112 * 112 * 3);
    }

    #[test]
    fn test_align_maps_landmarks_to_reference_positions() {
        let mut aligner = SimilarityAligner;
        let frame = flat_frame(200, 200, 50);
        let face = RawFace {
            bounding_box: BoundingBox {
                x: 70.0,
                y: 50.0,
                width: 60.0,
                height: 70.0,
                confidence: 0.9,
            },
            landmarks: FaceLandmarks::new([
                (80.0, 60.0),
                (120.0, 60.0),
                (100.0, 85.0),
                (85.0, 110.0),
                (115.0, 110.0),
            ]),
        };

        let aligned = aligner.align(&frame, &face, 112).unwrap();
        assert_eq!(aligned.size(), 112);

        // Warped landmarks should sit close to the reference positions.
        for (warped, reference) in aligned
            .landmarks()
            .points()
            .iter()
            .zip(REFERENCE_LANDMARKS_112)
        {
            assert!((warped.0 - reference.0).abs() < 6.0);
            assert!((warped.1 - reference.1).abs() < 6.0);
        }
    }

    #[test]
    fn test_align_without_landmarks_crops_bounding_box() {
        let mut aligner = SimilarityAligner;

        // White box on black background; crop should be mostly white.
        let mut data = vec![0u8; 100 * 100 * 3];
        for y in 40..80 {
            for x in 30..70 {
                for c in 0..3 {
                    data[(y * 100 + x) * 3 + c] = 255;
                }
            }
        }
        let frame = Frame::new(data, 100, 100, 3, "f.png", None);
        let face = RawFace {
            bounding_box: BoundingBox {
                x: 30.0,
                y: 40.0,
                width: 40.0,
                height: 40.0,
                confidence: 0.9,
            },
            landmarks: FaceLandmarks::new([(0.0, 0.0); 5]),
        };

        let aligned = aligner.align(&frame, &face, 64).unwrap();
        let centre = (32 * 64 + 32) * 3;
        assert_eq!(aligned.pixels()[centre], 255);
    }
}
