use serde::{Deserialize, Serialize};

/// Embedding length produced by MobileFaceNet.
pub const EMBEDDING_DIM: usize = 128;

/// Default maximum Euclidean distance considered a match.
pub const DEFAULT_TOLERANCE: f32 = 0.6;

/// Bounding box for a detected face, in frame pixel coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

/// Face embedding vector (128-dimensional, L2-normalized at extraction).
///
/// Serializes transparently as a flat float array, matching the on-disk
/// `name → [floats]` mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Compute Euclidean distance to another embedding.
    ///
    /// Dimensions beyond the shorter vector are ignored; callers are
    /// expected to compare embeddings from the same model.
    pub fn distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// An enrolled face: a unique name bound to one embedding.
///
/// Re-enrollment under the same name replaces the embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownFace {
    pub name: String,
    pub embedding: Embedding,
}

/// Result of matching a probe embedding against the gallery.
#[derive(Debug, Clone)]
pub struct FaceMatch {
    pub name: String,
    /// Euclidean distance of the accepted match.
    pub distance: f32,
}

/// Strategy for comparing a probe embedding against the enrolled gallery.
pub trait Matcher {
    fn compare(&self, probe: &Embedding, gallery: &[KnownFace]) -> Option<FaceMatch>;
}

/// First-match scan over an explicitly ordered gallery.
///
/// The gallery is a sequence, not a map: callers keep it sorted by name, so
/// ties between near-duplicate embeddings resolve to the lexicographically
/// first enrolled name rather than depending on map iteration order.
pub struct FirstWithinTolerance {
    pub tolerance: f32,
}

impl Default for FirstWithinTolerance {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Matcher for FirstWithinTolerance {
    fn compare(&self, probe: &Embedding, gallery: &[KnownFace]) -> Option<FaceMatch> {
        for known in gallery {
            let distance = probe.distance(&known.embedding);
            if distance <= self.tolerance {
                return Some(FaceMatch {
                    name: known.name.clone(),
                    distance,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emb(values: &[f32]) -> Embedding {
        Embedding {
            values: values.to_vec(),
        }
    }

    fn face(name: &str, values: &[f32]) -> KnownFace {
        KnownFace {
            name: name.into(),
            embedding: emb(values),
        }
    }

    #[test]
    fn distance_identical_is_zero() {
        let a = emb(&[1.0, 0.0, 0.5]);
        assert!(a.distance(&a).abs() < 1e-6);
    }

    #[test]
    fn distance_unit_axes() {
        let a = emb(&[1.0, 0.0]);
        let b = emb(&[0.0, 1.0]);
        assert!((a.distance(&b) - std::f32::consts::SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn match_within_tolerance() {
        let gallery = vec![face("alice", &[1.0, 0.0])];
        let matcher = FirstWithinTolerance::default();
        let result = matcher.compare(&emb(&[1.0, 0.1]), &gallery).unwrap();
        assert_eq!(result.name, "alice");
        assert!(result.distance < 0.2);
    }

    #[test]
    fn no_match_outside_tolerance() {
        let gallery = vec![face("alice", &[1.0, 0.0])];
        let matcher = FirstWithinTolerance::default();
        assert!(matcher.compare(&emb(&[-1.0, 0.0]), &gallery).is_none());
    }

    #[test]
    fn no_match_empty_gallery() {
        let matcher = FirstWithinTolerance::default();
        assert!(matcher.compare(&emb(&[1.0, 0.0]), &[]).is_none());
    }

    #[test]
    fn first_match_wins_on_near_duplicates() {
        // Two enrolled faces equally close to the probe; the gallery is
        // sorted by name, so the scan stops at the first.
        let gallery = vec![face("alice", &[1.0, 0.0]), face("bob", &[1.0, 0.0])];
        let matcher = FirstWithinTolerance::default();
        let result = matcher.compare(&emb(&[1.0, 0.0]), &gallery).unwrap();
        assert_eq!(result.name, "alice");
    }

    #[test]
    fn boundary_distance_is_accepted() {
        let gallery = vec![face("alice", &[0.0, 0.0])];
        let matcher = FirstWithinTolerance { tolerance: 0.6 };
        // Distance exactly 0.6 from the stored embedding.
        let result = matcher.compare(&emb(&[0.6, 0.0]), &gallery);
        assert!(result.is_some());
    }

    #[test]
    fn enroll_then_match_round_trip() {
        let stored = emb(&[0.25; 16]);
        let gallery = vec![KnownFace {
            name: "carol".into(),
            embedding: stored.clone(),
        }];
        let matcher = FirstWithinTolerance::default();
        let result = matcher.compare(&stored, &gallery).unwrap();
        assert_eq!(result.name, "carol");
        assert!(result.distance.abs() < 1e-6);
    }

    #[test]
    fn embedding_serializes_as_flat_array() {
        let e = emb(&[0.5, -0.5]);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, "[0.5,-0.5]");
        let back: Embedding = serde_json::from_str(&json).unwrap();
        assert_eq!(back.values, e.values);
    }
}
