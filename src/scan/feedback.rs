//! Informational message shown under the QR scanner.
//!
//! A failed scan shows a short explanation that clears itself after a delay. A new failure
//! restarts the delay, leaving the screen or clearing by hand stops it.

use crate::scan::timer::CancellableTimer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Default time a scan failure message stays visible
pub const DEFAULT_INFO_CLEAR_DELAY: Duration = Duration::from_secs(1);

pub const CAMERA_SETTINGS_INFO: &str =
    "Camera access is disabled. Enable it in the system settings to scan QR codes.";

/// Why a scan did not produce a usable code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanImageResult {
    InvalidQrCode,
    NoQrCodeFound,
    SeveralQrCodesFound,
    KeystoneCheckOnly,
}

impl ScanImageResult {
    pub fn info(&self) -> &'static str {
        match self {
            ScanImageResult::InvalidQrCode => "This QR code is not valid.",
            ScanImageResult::NoQrCodeFound => "No QR code found in the image.",
            ScanImageResult::SeveralQrCodesFound => {
                "Several QR codes found. The image must contain exactly one."
            }
            ScanImageResult::KeystoneCheckOnly => {
                "Please hold steady so Keystone code can be read."
            }
        }
    }
}

pub struct ScanFeedback {
    info: Arc<watch::Sender<String>>,
    clear_delay: Duration,
    timer: CancellableTimer,
}

impl ScanFeedback {
    pub fn new(clear_delay: Duration) -> Self {
        let (info, _) = watch::channel(String::new());
        Self {
            info: Arc::new(info),
            clear_delay,
            timer: CancellableTimer::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.info.subscribe()
    }

    /// Current message, empty when nothing is shown
    pub fn info(&self) -> String {
        self.info.borrow().clone()
    }

    /// Reset the message when the scanner becomes visible
    pub fn on_appear(&mut self, camera_authorized: bool) {
        self.timer.cancel();
        let info = if camera_authorized {
            String::new()
        } else {
            CAMERA_SETTINGS_INFO.to_string()
        };
        self.info.send_replace(info);
    }

    /// Show the failure and schedule clearing it
    pub fn scan_failed(&mut self, result: ScanImageResult) {
        debug!("Scan failed: {:?}", result);
        self.info.send_replace(result.info().to_string());

        let info = self.info.clone();
        self.timer.schedule(self.clear_delay, move || {
            info.send_replace(String::new());
        });
    }

    pub fn clear_info(&mut self) {
        self.info.send_replace(String::new());
        self.timer.cancel();
    }

    /// Stop a pending clear, the message stays as is
    pub fn on_disappear(&mut self) {
        self.timer.cancel();
    }
}

impl Default for ScanFeedback {
    fn default() -> Self {
        Self::new(DEFAULT_INFO_CLEAR_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_message_clears_after_delay() {
        let mut feedback = ScanFeedback::default();
        let receiver = feedback.subscribe();

        feedback.scan_failed(ScanImageResult::SeveralQrCodesFound);
        assert_eq!(*receiver.borrow(), ScanImageResult::SeveralQrCodesFound.info());

        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(feedback.info(), ScanImageResult::SeveralQrCodesFound.info());

        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(*receiver.borrow(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_failure_restarts_delay() {
        let mut feedback = ScanFeedback::new(Duration::from_secs(1));

        feedback.scan_failed(ScanImageResult::InvalidQrCode);
        tokio::time::advance(Duration::from_millis(800)).await;
        settle().await;

        feedback.scan_failed(ScanImageResult::NoQrCodeFound);
        tokio::time::advance(Duration::from_millis(800)).await;
        settle().await;
        assert_eq!(feedback.info(), ScanImageResult::NoQrCodeFound.info());

        tokio::time::advance(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(feedback.info(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disappear_keeps_message() {
        let mut feedback = ScanFeedback::default();
        feedback.scan_failed(ScanImageResult::KeystoneCheckOnly);
        feedback.on_disappear();
        feedback.on_disappear();

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(feedback.info(), ScanImageResult::KeystoneCheckOnly.info());

        feedback.clear_info();
        assert_eq!(feedback.info(), "");
    }

    #[tokio::test]
    async fn test_appear_without_camera_access() {
        let mut feedback = ScanFeedback::default();
        feedback.on_appear(false);
        assert_eq!(feedback.info(), CAMERA_SETTINGS_INFO);
        feedback.on_appear(true);
        assert_eq!(feedback.info(), "");
    }
}
