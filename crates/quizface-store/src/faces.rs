//! Enrolled face gallery, persisted as a JSON `name → [floats]` mapping.

use crate::StoreError;
use quizface_core::{Embedding, KnownFace};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// JSON-file-backed store for the enrolled face gallery.
pub struct FaceStore {
    path: PathBuf,
}

impl FaceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the gallery, sorted by name.
    ///
    /// A missing file is a normal first run; an unreadable or malformed file
    /// is reset to an empty gallery with a warning.
    pub fn load(&self) -> Vec<KnownFace> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read face gallery; starting empty");
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        let mapping: BTreeMap<String, Vec<f32>> = match serde_json::from_str(&raw) {
            Ok(mapping) => mapping,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "malformed face gallery; resetting to empty");
                return Vec::new();
            }
        };

        // BTreeMap iteration gives the defined (lexicographic) gallery order.
        mapping
            .into_iter()
            .map(|(name, values)| KnownFace {
                name,
                embedding: Embedding { values },
            })
            .collect()
    }

    /// Write the full gallery, overwriting prior contents.
    /// Failure is logged, not propagated.
    pub fn save(&self, gallery: &[KnownFace]) {
        if let Err(err) = self.try_save(gallery) {
            tracing::error!(path = %self.path.display(), error = %err, "failed to save face gallery");
        }
    }

    fn try_save(&self, gallery: &[KnownFace]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mapping: BTreeMap<&str, &Vec<f32>> = gallery
            .iter()
            .map(|face| (face.name.as_str(), &face.embedding.values))
            .collect();
        let json = serde_json::to_string_pretty(&mapping)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Insert or replace a face in the gallery, keeping it sorted by name.
pub fn upsert(gallery: &mut Vec<KnownFace>, face: KnownFace) {
    match gallery.binary_search_by(|f| f.name.as_str().cmp(&face.name)) {
        Ok(idx) => gallery[idx] = face,
        Err(idx) => gallery.insert(idx, face),
    }
}
