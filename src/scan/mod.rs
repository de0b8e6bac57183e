//! QR scanner feedback: failure messages that clear themselves after a delay.

pub mod feedback;
pub mod timer;

pub use feedback::{CAMERA_SETTINGS_INFO, DEFAULT_INFO_CLEAR_DELAY, ScanFeedback, ScanImageResult};
pub use timer::CancellableTimer;
