//! MobileFaceNet embedding extractor via ONNX Runtime.
//!
//! Crops a detected face with a small margin, resizes to 112×112 and
//! produces an L2-normalized 128-dimensional embedding.

use crate::crop;
use crate::detector::resize_bilinear;
use crate::types::{Embedding, FaceBox, EMBEDDING_DIM};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const MOBILEFACENET_INPUT_SIZE: usize = 112;
const MOBILEFACENET_MEAN: f32 = 127.5;
const MOBILEFACENET_STD: f32 = 128.0;
/// Fraction of the detected box added on each side before cropping, so the
/// embedding sees some forehead/chin context.
const CROP_MARGIN: f32 = 0.1;

#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("model file not found: {0} — download mobilefacenet.onnx and place it in the model dir")]
    ModelNotFound(String),
    #[error("face region unusable for embedding extraction")]
    UnusableCrop,
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// MobileFaceNet-based embedding extractor.
pub struct FaceEmbedder {
    session: Session,
}

impl FaceEmbedder {
    /// Load the MobileFaceNet ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, EmbedderError> {
        if !Path::new(model_path).exists() {
            return Err(EmbedderError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded MobileFaceNet model"
        );

        Ok(Self { session })
    }

    /// Extract an embedding for a detected face in a grayscale frame.
    pub fn extract(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
        face: &FaceBox,
    ) -> Result<Embedding, EmbedderError> {
        let face_crop = crop::crop_face(frame, width, height, face, CROP_MARGIN)
            .ok_or(EmbedderError::UnusableCrop)?;

        let input = preprocess(&face_crop.data, face_crop.width, face_crop.height);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbedderError::InferenceFailed(format!("embedding extraction: {e}")))?;

        let raw: Vec<f32> = raw_data.to_vec();
        if raw.len() != EMBEDDING_DIM {
            return Err(EmbedderError::InferenceFailed(format!(
                "expected {EMBEDDING_DIM}-dim embedding, got {}",
                raw.len()
            )));
        }

        Ok(Embedding {
            values: l2_normalize(raw),
        })
    }
}

/// Preprocess a grayscale face crop into a 112×112 NCHW float tensor.
fn preprocess(face: &[u8], width: usize, height: usize) -> Array4<f32> {
    let size = MOBILEFACENET_INPUT_SIZE;
    let resized = resize_bilinear(face, width, height, size, size);

    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for y in 0..size {
        for x in 0..size {
            let normalized = (resized[y * size + x] as f32 - MOBILEFACENET_MEAN) / MOBILEFACENET_STD;
            // Grayscale → 3-channel: replicate Y → [R=Y, G=Y, B=Y]
            tensor[[0, 0, y, x]] = normalized;
            tensor[[0, 1, y, x]] = normalized;
            tensor[[0, 2, y, x]] = normalized;
        }
    }
    tensor
}

/// L2-normalize an embedding; a zero vector passes through unchanged.
fn l2_normalize(raw: Vec<f32>) -> Vec<f32> {
    let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        raw.iter().map(|x| x / norm).collect()
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_output_shape() {
        let face = vec![128u8; 90 * 90];
        let tensor = preprocess(&face, 90, 90);
        assert_eq!(
            tensor.shape(),
            &[1, 3, MOBILEFACENET_INPUT_SIZE, MOBILEFACENET_INPUT_SIZE]
        );
    }

    #[test]
    fn preprocess_normalization_midpoint() {
        // Pixel value 128 → (128 - 127.5) / 128.
        let face = vec![128u8; 112 * 112];
        let tensor = preprocess(&face, 112, 112);
        let expected = (128.0 - MOBILEFACENET_MEAN) / MOBILEFACENET_STD;
        assert!((tensor[[0, 1, 0, 0]] - expected).abs() < 1e-6);
    }

    #[test]
    fn preprocess_channels_identical() {
        let face: Vec<u8> = (0..112u32 * 112).map(|i| (i % 251) as u8).collect();
        let tensor = preprocess(&face, 112, 112);
        for y in (0..112).step_by(7) {
            for x in (0..112).step_by(7) {
                assert_eq!(tensor[[0, 0, y, x]], tensor[[0, 1, y, x]]);
                assert_eq!(tensor[[0, 1, y, x]], tensor[[0, 2, y, x]]);
            }
        }
    }

    #[test]
    fn l2_normalize_unit_length() {
        let normalized = l2_normalize(vec![3.0, 4.0]);
        let norm: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero_vector_unchanged() {
        let normalized = l2_normalize(vec![0.0; 4]);
        assert!(normalized.iter().all(|&x| x == 0.0));
    }
}
