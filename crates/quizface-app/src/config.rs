use std::path::PathBuf;

/// App configuration, loaded from `QUIZFACE_*` environment variables.
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Directory holding the two persisted JSON blobs.
    pub data_dir: PathBuf,
    /// Maximum embedding distance considered a match.
    pub tolerance: f32,
    /// Frames to discard after (re)opening the camera so AGC/AE can settle.
    pub warmup_frames: usize,
}

impl Config {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("QUIZFACE_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| quizface_core::default_model_dir());

        let data_dir = std::env::var("QUIZFACE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        Self {
            camera_device: std::env::var("QUIZFACE_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            model_dir,
            data_dir,
            tolerance: env_f32("QUIZFACE_TOLERANCE", quizface_core::types::DEFAULT_TOLERANCE),
            warmup_frames: env_usize("QUIZFACE_WARMUP_FRAMES", 4),
        }
    }

    /// Path to the UltraFace detection model.
    pub fn detector_model_path(&self) -> String {
        self.model_dir
            .join("version-RFB-320.onnx")
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the MobileFaceNet embedding model.
    pub fn embedder_model_path(&self) -> String {
        self.model_dir
            .join("mobilefacenet.onnx")
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the enrolled face gallery blob.
    pub fn faces_path(&self) -> PathBuf {
        self.data_dir.join("known_faces.json")
    }

    /// Path to the leaderboard blob.
    pub fn leaderboard_path(&self) -> PathBuf {
        self.data_dir.join("leaderboard.json")
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("quizface")
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_paths_live_under_data_dir() {
        let config = Config {
            camera_device: "/dev/video0".into(),
            model_dir: PathBuf::from("/models"),
            data_dir: PathBuf::from("/data"),
            tolerance: 0.6,
            warmup_frames: 4,
        };
        assert_eq!(config.faces_path(), PathBuf::from("/data/known_faces.json"));
        assert_eq!(
            config.leaderboard_path(),
            PathBuf::from("/data/leaderboard.json")
        );
        assert!(config.detector_model_path().ends_with("version-RFB-320.onnx"));
        assert!(config.embedder_model_path().ends_with("mobilefacenet.onnx"));
    }
}
