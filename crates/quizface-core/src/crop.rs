//! Bounds-checked face cropping from grayscale frames.

use crate::types::FaceBox;

/// A grayscale crop of a detected face region.
pub struct FaceCrop {
    /// Grayscale pixels, `width * height` bytes.
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Crop a face region from a grayscale frame, expanded by `margin`
/// (fraction of the box size on each side) and clamped to the frame.
///
/// Returns `None` when the box is degenerate or lies entirely outside the
/// frame. Callers treat a failed crop as "no preview image", never as a
/// failed recognition.
pub fn crop_face(
    frame: &[u8],
    frame_width: u32,
    frame_height: u32,
    face: &FaceBox,
    margin: f32,
) -> Option<FaceCrop> {
    let fw = frame_width as usize;
    let fh = frame_height as usize;
    if fw == 0 || fh == 0 || frame.len() < fw * fh {
        return None;
    }
    if !(face.width > 0.0) || !(face.height > 0.0) {
        return None;
    }

    let mx = face.width * margin;
    let my = face.height * margin;

    let x0 = (face.x - mx).floor().max(0.0) as usize;
    let y0 = (face.y - my).floor().max(0.0) as usize;
    let x1 = ((face.x + face.width + mx).ceil() as usize).min(fw);
    let y1 = ((face.y + face.height + my).ceil() as usize).min(fh);

    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let width = x1 - x0;
    let height = y1 - y0;
    let mut data = Vec::with_capacity(width * height);
    for y in y0..y1 {
        data.extend_from_slice(&frame[y * fw + x0..y * fw + x1]);
    }

    Some(FaceCrop {
        data,
        width,
        height,
    })
}
