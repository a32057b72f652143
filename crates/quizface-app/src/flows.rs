//! Enrollment and recognition flows, glued between camera, encoder, and
//! stores. Both degrade to a "nothing happened" outcome on recoverable
//! failures; only the caller decides what is fatal.

use quizface_core::{crop_face, FaceEncoder, FirstWithinTolerance, KnownFace, Matcher};
use quizface_hw::Frame;
use quizface_store::{faces, FaceStore, SnapshotStore};
use std::path::PathBuf;

/// Margin used when cropping the matched face for the quiz thumbnail.
const SNAPSHOT_MARGIN: f32 = 0.2;

/// Result of an enrollment attempt.
#[derive(Debug)]
pub enum EnrollOutcome {
    Enrolled { name: String },
    EmptyName,
    NoFaceDetected,
}

/// A successfully recognized player.
pub struct Recognized {
    pub name: String,
    pub distance: f32,
    /// Snapshot of the matched face region, when the crop succeeded.
    pub snapshot: Option<PathBuf>,
}

/// Normalize a submitted player name; `None` when effectively empty.
pub fn validate_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Enroll `name` from a captured frame: encode, store, persist.
///
/// When no face is found the raw frame is dumped next to the session
/// snapshots for inspection and nothing is stored.
pub fn enroll(
    encoder: &mut FaceEncoder,
    gallery: &mut Vec<KnownFace>,
    face_store: &FaceStore,
    snapshots: &SnapshotStore,
    name: &str,
    frame: &Frame,
) -> EnrollOutcome {
    let Some(name) = validate_name(name) else {
        tracing::warn!("enrollment rejected: empty name");
        return EnrollOutcome::EmptyName;
    };

    let Some(encoded) = encoder.encode(&frame.data, frame.width, frame.height) else {
        tracing::warn!(name = %name, "enrollment aborted: no face in frame");
        match snapshots.save_debug_frame(frame.data.clone(), frame.width, frame.height) {
            Ok(path) => tracing::warn!(path = %path.display(), "wrote no-face debug frame"),
            Err(err) => tracing::warn!(error = %err, "failed to write no-face debug frame"),
        }
        return EnrollOutcome::NoFaceDetected;
    };

    faces::upsert(
        gallery,
        KnownFace {
            name: name.clone(),
            embedding: encoded.embedding,
        },
    );
    face_store.save(gallery);
    tracing::info!(name = %name, "face enrolled");

    EnrollOutcome::Enrolled { name }
}

/// Recognize the face in a frame against the enrolled gallery.
///
/// On a match, the face region is cropped and saved as the session snapshot
/// for that player; a failed crop costs only the thumbnail.
pub fn recognize(
    encoder: &mut FaceEncoder,
    matcher: &FirstWithinTolerance,
    gallery: &[KnownFace],
    snapshots: &SnapshotStore,
    frame: &Frame,
) -> Option<Recognized> {
    let encoded = encoder.encode(&frame.data, frame.width, frame.height)?;

    let Some(matched) = matcher.compare(&encoded.embedding, gallery) else {
        tracing::warn!("face not recognized against enrolled gallery");
        return None;
    };

    tracing::info!(name = %matched.name, distance = matched.distance, "face recognized");

    let snapshot = match crop_face(
        &frame.data,
        frame.width,
        frame.height,
        &encoded.face_box,
        SNAPSHOT_MARGIN,
    ) {
        Some(crop) => {
            match snapshots.save_crop(&matched.name, crop.data, crop.width as u32, crop.height as u32)
            {
                Ok(path) => Some(path),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to save face snapshot");
                    None
                }
            }
        }
        None => {
            tracing::warn!("matched face region unusable for snapshot crop");
            None
        }
    };

    Some(Recognized {
        name: matched.name,
        distance: matched.distance,
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_name_trims() {
        assert_eq!(validate_name("  Alice  "), Some("Alice".to_string()));
    }

    #[test]
    fn validate_name_rejects_empty_and_whitespace() {
        assert_eq!(validate_name(""), None);
        assert_eq!(validate_name("   \t"), None);
    }
}
