//! quizface-store — JSON-backed persistence and session snapshot storage.
//!
//! Two flat JSON blobs hold all durable state: the enrolled face gallery
//! (`known_faces.json`) and the leaderboard (`leaderboard.json`). Both share
//! the same contract: a missing, empty, or malformed file loads as empty
//! (reset, never a crash), and a failed save is logged, never propagated.

pub mod faces;
pub mod leaderboard;
pub mod snapshot;

pub use faces::FaceStore;
pub use leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardStore};
pub use snapshot::SnapshotStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid image dimensions: {width}x{height} with {len} bytes")]
    InvalidImage {
        width: u32,
        height: u32,
        len: usize,
    },
}
