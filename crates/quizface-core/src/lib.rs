//! quizface-core — Face detection and embedding extraction engine.
//!
//! Uses UltraFace (version-RFB-320) for face detection and MobileFaceNet
//! for 128-dimensional face embeddings, both running via ONNX Runtime for
//! CPU inference.

pub mod crop;
pub mod detector;
pub mod embedder;
pub mod encoder;
pub mod types;

pub use crop::{crop_face, FaceCrop};
pub use detector::FaceDetector;
pub use embedder::FaceEmbedder;
pub use encoder::{EncodedFace, FaceEncoder};
pub use types::{Embedding, FaceBox, FaceMatch, FirstWithinTolerance, KnownFace, Matcher};

use std::path::PathBuf;

/// Default directory holding the ONNX model files.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("quizface/models")
}
