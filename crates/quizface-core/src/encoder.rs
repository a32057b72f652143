//! Encoder facade: detect the primary face in a frame and embed it.

use crate::detector::{DetectorError, FaceDetector};
use crate::embedder::{EmbedderError, FaceEmbedder};
use crate::types::{Embedding, FaceBox};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("embedder: {0}")]
    Embedder(#[from] EmbedderError),
}

/// The primary face found in a frame: its embedding plus where it was.
pub struct EncodedFace {
    pub embedding: Embedding,
    pub face_box: FaceBox,
}

/// Detector + embedder behind the one operation the app needs:
/// "give me the embedding of the face in this frame, or nothing".
pub struct FaceEncoder {
    detector: FaceDetector,
    embedder: FaceEmbedder,
}

impl FaceEncoder {
    /// Load both ONNX models. Startup-time failure is a hard error.
    pub fn load(detector_path: &str, embedder_path: &str) -> Result<Self, EncoderError> {
        let detector = FaceDetector::load(detector_path)?;
        let embedder = FaceEmbedder::load(embedder_path)?;
        Ok(Self { detector, embedder })
    }

    /// Encode the primary (highest-confidence) face in a grayscale frame.
    ///
    /// Returns `None` when no face is detected. Detection or embedding
    /// failures mid-session are logged and also collapse to `None` — the
    /// caller sees "no face", never an error (spec'd degradation).
    pub fn encode(&mut self, frame: &[u8], width: u32, height: u32) -> Option<EncodedFace> {
        let faces = match self.detector.detect(frame, width, height) {
            Ok(faces) => faces,
            Err(err) => {
                tracing::warn!(error = %err, "face detection failed; treating as no face");
                return None;
            }
        };

        let face_box = faces.into_iter().next()?;

        match self.embedder.extract(frame, width, height, &face_box) {
            Ok(embedding) => Some(EncodedFace {
                embedding,
                face_box,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "embedding extraction failed; treating as no face");
                None
            }
        }
    }
}
