//! UltraFace face detector via ONNX Runtime.
//!
//! Runs the version-RFB-320 single-stage detector: one fixed-size input,
//! two output tensors (per-anchor class scores and normalized corner boxes),
//! confidence filtering and NMS post-processing.

use crate::types::FaceBox;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const ULTRAFACE_INPUT_WIDTH: usize = 320;
const ULTRAFACE_INPUT_HEIGHT: usize = 240;
const ULTRAFACE_MEAN: f32 = 127.0;
const ULTRAFACE_STD: f32 = 128.0;
const ULTRAFACE_CONFIDENCE_THRESHOLD: f32 = 0.7;
const ULTRAFACE_NMS_THRESHOLD: f32 = 0.5;
/// Values per anchor in the score tensor: [background, face].
const ULTRAFACE_CLASSES: usize = 2;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("model file not found: {0} — download version-RFB-320.onnx and place it in the model dir")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Output tensor indices: (scores_idx, boxes_idx).
type OutputIndices = (usize, usize);

/// UltraFace-based face detector.
pub struct FaceDetector {
    session: Session,
    /// Indices of the score and box output tensors, discovered by name at
    /// load time with a positional fallback.
    output_indices: OutputIndices,
}

impl FaceDetector {
    /// Load the UltraFace ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> =
            session.outputs().iter().map(|o| o.name().to_string()).collect();

        tracing::info!(
            path = model_path,
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?output_names,
            "loaded UltraFace model"
        );

        if output_names.len() < 2 {
            return Err(DetectorError::InferenceFailed(format!(
                "UltraFace model requires 2 outputs (scores, boxes), got {}",
                output_names.len()
            )));
        }

        let output_indices = discover_output_indices(&output_names);
        tracing::debug!(?output_indices, "UltraFace output tensor mapping");

        Ok(Self {
            session,
            output_indices,
        })
    }

    /// Detect faces in a grayscale frame, returning boxes in frame pixel
    /// coordinates sorted by confidence (highest first).
    pub fn detect(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<FaceBox>, DetectorError> {
        let input = preprocess(frame, width as usize, height as usize);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (scores_idx, boxes_idx) = self.output_indices;

        let (_, scores) = outputs[scores_idx]
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::InferenceFailed(format!("scores: {e}")))?;
        let (_, boxes) = outputs[boxes_idx]
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::InferenceFailed(format!("boxes: {e}")))?;

        let detections = decode(
            scores,
            boxes,
            width as f32,
            height as f32,
            ULTRAFACE_CONFIDENCE_THRESHOLD,
        );

        let mut result = nms(detections, ULTRAFACE_NMS_THRESHOLD);
        result.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(result)
    }
}

/// Preprocess a grayscale frame into the detector's NCHW float tensor.
///
/// UltraFace takes a plain (non-letterboxed) resize to 320×240; its boxes
/// come back normalized to [0, 1], so mapping to frame coordinates is a
/// straight multiply by the original dimensions.
fn preprocess(frame: &[u8], width: usize, height: usize) -> Array4<f32> {
    let in_w = ULTRAFACE_INPUT_WIDTH;
    let in_h = ULTRAFACE_INPUT_HEIGHT;
    let resized = resize_bilinear(frame, width, height, in_w, in_h);

    let mut tensor = Array4::<f32>::zeros((1, 3, in_h, in_w));
    for y in 0..in_h {
        for x in 0..in_w {
            let normalized = (resized[y * in_w + x] as f32 - ULTRAFACE_MEAN) / ULTRAFACE_STD;
            // Grayscale → 3-channel: replicate Y → [R=Y, G=Y, B=Y]
            tensor[[0, 0, y, x]] = normalized;
            tensor[[0, 1, y, x]] = normalized;
            tensor[[0, 2, y, x]] = normalized;
        }
    }
    tensor
}

/// Bilinear-resize a grayscale image.
pub(crate) fn resize_bilinear(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
) -> Vec<u8> {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 || src.len() < src_w * src_h {
        return vec![0u8; dst_w * dst_h];
    }

    let scale_x = src_w as f32 / dst_w as f32;
    let scale_y = src_h as f32 / dst_h as f32;

    let mut dst = vec![0u8; dst_w * dst_h];
    for y in 0..dst_h {
        let src_y = (y as f32 + 0.5) * scale_y - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, src_h as i32 - 1) as usize;
        let y1 = (y0 + 1).min(src_h - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..dst_w {
            let src_x = (x as f32 + 0.5) * scale_x - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, src_w as i32 - 1) as usize;
            let x1 = (x0 + 1).min(src_w - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            let tl = src[y0 * src_w + x0] as f32;
            let tr = src[y0 * src_w + x1] as f32;
            let bl = src[y1 * src_w + x0] as f32;
            let br = src[y1 * src_w + x1] as f32;

            let top = tl * (1.0 - fx) + tr * fx;
            let bot = bl * (1.0 - fx) + br * fx;
            let val = top * (1.0 - fy) + bot * fy;

            dst[y * dst_w + x] = val.round().clamp(0.0, 255.0) as u8;
        }
    }
    dst
}

/// Discover the score/box output ordering by name.
///
/// The reference UltraFace export names its outputs "scores" and "boxes";
/// re-exports sometimes carry generic numeric names, in which case the
/// standard positional ordering (scores first) is assumed.
fn discover_output_indices(names: &[String]) -> OutputIndices {
    let scores = names.iter().position(|n| n == "scores");
    let boxes = names.iter().position(|n| n == "boxes");
    match (scores, boxes) {
        (Some(s), Some(b)) => {
            tracing::info!("UltraFace: using name-based output tensor mapping");
            (s, b)
        }
        _ => {
            tracing::info!(
                ?names,
                "UltraFace: output names not recognized, using positional mapping [0]=scores, [1]=boxes"
            );
            (0, 1)
        }
    }
}

/// Decode raw score/box tensors into pixel-space face boxes.
///
/// `scores` is `[1, N, 2]` flattened ([background, face] per anchor);
/// `boxes` is `[1, N, 4]` flattened (normalized [x1, y1, x2, y2]).
fn decode(
    scores: &[f32],
    boxes: &[f32],
    frame_width: f32,
    frame_height: f32,
    threshold: f32,
) -> Vec<FaceBox> {
    let num_anchors = scores.len() / ULTRAFACE_CLASSES;
    let mut detections = Vec::new();

    for idx in 0..num_anchors {
        let confidence = scores[idx * ULTRAFACE_CLASSES + 1];
        if confidence <= threshold {
            continue;
        }

        let off = idx * 4;
        if off + 3 >= boxes.len() {
            continue;
        }
        let x1 = boxes[off].clamp(0.0, 1.0) * frame_width;
        let y1 = boxes[off + 1].clamp(0.0, 1.0) * frame_height;
        let x2 = boxes[off + 2].clamp(0.0, 1.0) * frame_width;
        let y2 = boxes[off + 3].clamp(0.0, 1.0) * frame_height;

        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        detections.push(FaceBox {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            confidence,
        });
    }

    detections
}

/// Non-Maximum Suppression: remove overlapping detections.
fn nms(mut detections: Vec<FaceBox>, iou_threshold: f32) -> Vec<FaceBox> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i].clone());

        for j in (i + 1)..detections.len() {
            if !suppressed[j] && iou(&detections[i], &detections[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// Intersection-over-Union between two boxes.
fn iou(a: &FaceBox, b: &FaceBox) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.width * a.height + b.width * b.height - inter;

    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_box(x: f32, y: f32, w: f32, h: f32, conf: f32) -> FaceBox {
        FaceBox {
            x,
            y,
            width: w,
            height: h,
            confidence: conf,
        }
    }

    #[test]
    fn iou_identical() {
        let a = make_box(0.0, 0.0, 100.0, 100.0, 1.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_disjoint() {
        let a = make_box(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = make_box(20.0, 20.0, 10.0, 10.0, 1.0);
        assert!(iou(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn iou_half_overlap() {
        let a = make_box(0.0, 0.0, 10.0, 10.0, 1.0);
        let b = make_box(5.0, 0.0, 10.0, 10.0, 1.0);
        // Overlap 5x10 = 50, union 150.
        assert!((iou(&a, &b) - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn nms_suppresses_overlapping() {
        let detections = vec![
            make_box(0.0, 0.0, 100.0, 100.0, 0.9),
            make_box(5.0, 5.0, 100.0, 100.0, 0.8),
            make_box(200.0, 200.0, 50.0, 50.0, 0.75),
        ];
        let result = nms(detections, 0.5);
        assert_eq!(result.len(), 2);
        assert!((result[0].confidence - 0.9).abs() < 1e-6);
        assert!((result[1].confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn nms_empty() {
        assert!(nms(vec![], 0.5).is_empty());
    }

    #[test]
    fn decode_maps_normalized_to_pixels() {
        // One anchor above threshold: face score 0.95, box covering the
        // center quarter of a 640x480 frame.
        let scores = vec![0.05, 0.95];
        let boxes = vec![0.25, 0.25, 0.75, 0.75];
        let dets = decode(&scores, &boxes, 640.0, 480.0, 0.7);
        assert_eq!(dets.len(), 1);
        let d = &dets[0];
        assert!((d.x - 160.0).abs() < 1e-3);
        assert!((d.y - 120.0).abs() < 1e-3);
        assert!((d.width - 320.0).abs() < 1e-3);
        assert!((d.height - 240.0).abs() < 1e-3);
    }

    #[test]
    fn decode_filters_low_confidence() {
        let scores = vec![0.8, 0.2, 0.1, 0.9];
        let boxes = vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.4, 0.4];
        let dets = decode(&scores, &boxes, 100.0, 100.0, 0.7);
        assert_eq!(dets.len(), 1);
        assert!((dets[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn decode_skips_inverted_boxes() {
        let scores = vec![0.1, 0.9];
        let boxes = vec![0.8, 0.8, 0.2, 0.2]; // x2 < x1, y2 < y1
        assert!(decode(&scores, &boxes, 100.0, 100.0, 0.7).is_empty());
    }

    #[test]
    fn discover_output_indices_named() {
        let names: Vec<String> = ["boxes", "scores"].iter().map(|s| s.to_string()).collect();
        assert_eq!(discover_output_indices(&names), (1, 0));
    }

    #[test]
    fn discover_output_indices_positional_fallback() {
        let names: Vec<String> = ["428", "429"].iter().map(|s| s.to_string()).collect();
        assert_eq!(discover_output_indices(&names), (0, 1));
    }

    #[test]
    fn resize_uniform_stays_uniform() {
        let src = vec![128u8; 100 * 100];
        let dst = resize_bilinear(&src, 100, 100, 320, 240);
        assert!(dst.iter().all(|&p| p == 128));
    }

    #[test]
    fn resize_same_size_is_identity() {
        let src: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let dst = resize_bilinear(&src, 8, 8, 8, 8);
        assert_eq!(dst, src);
    }

    #[test]
    fn resize_downscale_averages_halves() {
        // 4x4 frame, left half black, right half white → 2x2 keeps the split.
        let src: Vec<u8> = (0..16).map(|i| if i % 4 < 2 { 0 } else { 255 }).collect();
        let dst = resize_bilinear(&src, 4, 4, 2, 2);
        assert_eq!(dst, vec![0, 255, 0, 255]);
    }

    #[test]
    fn preprocess_shape_and_normalization() {
        let frame = vec![127u8; 64 * 48];
        let tensor = preprocess(&frame, 64, 48);
        assert_eq!(
            tensor.shape(),
            &[1, 3, ULTRAFACE_INPUT_HEIGHT, ULTRAFACE_INPUT_WIDTH]
        );
        // Pixel value 127 normalizes to exactly 0.
        assert!(tensor[[0, 0, 10, 10]].abs() < 1e-6);
        // Channels replicate the grayscale plane.
        assert_eq!(tensor[[0, 0, 5, 5]], tensor[[0, 2, 5, 5]]);
    }
}
