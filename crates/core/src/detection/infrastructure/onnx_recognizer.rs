//! ArcFace identity embeddings via ONNX Runtime.
//!
//! Consumes aligned BGR crops, resizes them to the model's 112×112 input
//! and produces L2-normalised 512-dimensional embeddings (w600k_r50).

use std::path::Path;

use crate::detection::domain::aligned_face::AlignedFace;
use crate::detection::domain::recognizer::FaceRecognizer;

const ARCFACE_INPUT_SIZE: usize = 112;
const ARCFACE_MEAN: f32 = 127.5;
const ARCFACE_STD: f32 = 127.5;
const ARCFACE_EMBEDDING_DIM: usize = 512;

pub struct OnnxFaceRecognizer {
    session: ort::session::Session,
}

impl OnnxFaceRecognizer {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self { session })
    }

    /// Resize an aligned BGR crop to the model input and normalise into an
    /// RGB NCHW tensor.
    fn preprocess(face: &AlignedFace) -> ndarray::Array4<f32> {
        let size = ARCFACE_INPUT_SIZE;
        let src = face.pixels();
        let src_size = face.size();
        let scale = src_size as f64 / size as f64;

        let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));
        for y in 0..size {
            let sy = ((y as f64 * scale) as usize).min(src_size - 1);
            for x in 0..size {
                let sx = ((x as f64 * scale) as usize).min(src_size - 1);
                let base = (sy * src_size + sx) * 3;
                // BGR storage, RGB model input
                for c in 0..3 {
                    let pixel = src[base + (2 - c)] as f32;
                    tensor[[0, c, y, x]] = (pixel - ARCFACE_MEAN) / ARCFACE_STD;
                }
            }
        }
        tensor
    }
}

impl FaceRecognizer for OnnxFaceRecognizer {
    fn embed(&mut self, face: &AlignedFace) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let input = Self::preprocess(face);
        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("recognizer model produced no outputs".into());
        }

        let tensor = outputs[0].try_extract_array::<f32>()?;
        let raw: Vec<f32> = tensor.iter().copied().collect();
        if raw.len() != ARCFACE_EMBEDDING_DIM {
            return Err(format!(
                "expected {ARCFACE_EMBEDDING_DIM}-dim embedding, got {}",
                raw.len()
            )
            .into());
        }

        Ok(l2_normalize(raw))
    }
}

pub fn l2_normalize(raw: Vec<f32>) -> Vec<f32> {
    let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        raw.iter().map(|x| x / norm).collect()
    } else {
        raw
    }
}
