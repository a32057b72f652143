//! Session-owned temporary storage for recognized-face snapshots.
//!
//! Each app run gets its own uniquely named directory under the system temp
//! dir, so per-name snapshot files cannot collide with another session's.
//! The directory is removed when the store is dropped.

use crate::StoreError;
use image::GrayImage;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Create the session snapshot directory.
    pub fn create() -> Result<Self, StoreError> {
        let dir = std::env::temp_dir().join(format!("quizface-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "created session snapshot dir");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path where the snapshot for `name` lives (whether or not one exists).
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", sanitize(name)))
    }

    /// Save a grayscale face crop as the snapshot for `name`, overwriting
    /// any previous one.
    pub fn save_crop(
        &self,
        name: &str,
        data: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Result<PathBuf, StoreError> {
        let len = data.len();
        let img = GrayImage::from_raw(width, height, data).ok_or(StoreError::InvalidImage {
            width,
            height,
            len,
        })?;
        let path = self.path_for(name);
        img.save(&path)?;
        Ok(path)
    }

    /// Dump a full frame for post-mortem when enrollment finds no face.
    pub fn save_debug_frame(
        &self,
        data: Vec<u8>,
        width: u32,
        height: u32,
    ) -> Result<PathBuf, StoreError> {
        let len = data.len();
        let img = GrayImage::from_raw(width, height, data).ok_or(StoreError::InvalidImage {
            width,
            height,
            len,
        })?;
        let path = self.dir.join("no_face_debug.png");
        img.save(&path)?;
        Ok(path)
    }
}

impl Drop for SnapshotStore {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %err, "failed to remove session snapshot dir");
        }
    }
}

/// Reduce a player name to a safe file stem.
fn sanitize(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}
