//! quizface-hw — Hardware abstraction for webcam capture.
//!
//! Provides V4L2-based camera access and grayscale frame conversion for
//! the recognition pipeline and the live preview.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, DeviceInfo, PixelFormat};
pub use frame::Frame;
