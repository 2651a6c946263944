//! Capture device seam.
//!
//! A [`CaptureDevice`] stands for the camera plus on-device recognition.
//! Binding it yields a stream of [`Frame`]s, one per analyzed image; the
//! binding is held until [`unbind`](CaptureDevice::unbind) is called. Each
//! frame carries a [`FrameRelease`] hook that frees the underlying image
//! buffer and must run exactly once, which ownership guarantees: the hook
//! runs on [`FrameRelease::release`] or, failing that, on drop.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

type ReleaseFn = Box<dyn FnOnce() + Send>;

/// One-shot hook that frees a frame's underlying resource.
pub struct FrameRelease(Option<ReleaseFn>);

impl FrameRelease {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(release)))
    }

    /// A hook for frames with nothing to free.
    pub fn noop() -> Self {
        Self(None)
    }

    pub fn release(mut self) {
        if let Some(release) = self.0.take() {
            release();
        }
    }
}

impl Drop for FrameRelease {
    fn drop(&mut self) {
        if let Some(release) = self.0.take() {
            release();
        }
    }
}

impl fmt::Debug for FrameRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FrameRelease")
            .field(&if self.0.is_some() { "pending" } else { "released" })
            .finish()
    }
}

/// A single analyzed frame.
#[derive(Debug)]
pub struct Frame {
    /// Raw value of the first recognised code, if any.
    pub raw: Option<String>,
    release: FrameRelease,
}

impl Frame {
    pub fn new(raw: Option<String>, release: FrameRelease) -> Self {
        Self { raw, release }
    }

    pub fn into_parts(self) -> (Option<String>, FrameRelease) {
        (self.raw, self.release)
    }
}

// ---------------------------------------------------------------------------
// CaptureDevice
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Capture device unavailable: {0}")]
    Unavailable(String),

    #[error("Camera permission not granted")]
    PermissionDenied,
}

/// Camera plus recognition pipeline.
#[async_trait]
pub trait CaptureDevice: Send {
    /// Acquire the device and start delivering frames.
    async fn bind(&mut self) -> Result<mpsc::Receiver<Frame>, CaptureError>;

    /// Release the device. Called once when the session ends.
    async fn unbind(&mut self);
}

// ---------------------------------------------------------------------------
// ChannelCapture
// ---------------------------------------------------------------------------

/// Capture device fed by an external recognition pipeline through a
/// [`FrameSender`].
#[derive(Debug)]
pub struct ChannelCapture {
    frames: Option<mpsc::Receiver<Frame>>,
    bound: Arc<AtomicBool>,
}

/// Producer half of a [`ChannelCapture`].
#[derive(Debug, Clone)]
pub struct FrameSender {
    tx: mpsc::Sender<Frame>,
    bound: Arc<AtomicBool>,
}

impl ChannelCapture {
    pub fn new(capacity: usize) -> (Self, FrameSender) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let bound = Arc::new(AtomicBool::new(false));
        (
            Self {
                frames: Some(rx),
                bound: Arc::clone(&bound),
            },
            FrameSender { tx, bound },
        )
    }
}

#[async_trait]
impl CaptureDevice for ChannelCapture {
    async fn bind(&mut self) -> Result<mpsc::Receiver<Frame>, CaptureError> {
        let frames = self
            .frames
            .take()
            .ok_or_else(|| CaptureError::Unavailable("frame channel already bound".into()))?;
        self.bound.store(true, Ordering::SeqCst);
        Ok(frames)
    }

    async fn unbind(&mut self) {
        self.bound.store(false, Ordering::SeqCst);
    }
}

impl FrameSender {
    /// Deliver a frame. Returns `false` once the session has dropped its end.
    pub async fn send(&self, frame: Frame) -> bool {
        self.tx.send(frame).await.is_ok()
    }

    /// Whether a session currently holds the device.
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use assert_matches::assert_matches;

    use super::*;

    fn counting_release(counter: &Arc<AtomicUsize>) -> FrameRelease {
        let counter = Arc::clone(counter);
        FrameRelease::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn explicit_release_runs_hook_once() {
        let count = Arc::new(AtomicUsize::new(0));
        counting_release(&count).release();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropped_frame_runs_hook_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let frame = Frame::new(Some("01000001".into()), counting_release(&count));
        drop(frame);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn into_parts_then_release_does_not_double_fire() {
        let count = Arc::new(AtomicUsize::new(0));
        let frame = Frame::new(None, counting_release(&count));
        let (raw, release) = frame.into_parts();
        assert!(raw.is_none());
        release.release();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn channel_capture_binds_once() {
        let (mut device, sender) = ChannelCapture::new(4);
        assert!(!sender.is_bound());

        let _frames = device.bind().await.unwrap();
        assert!(sender.is_bound());
        assert_matches!(device.bind().await, Err(CaptureError::Unavailable(_)));

        device.unbind().await;
        assert!(!sender.is_bound());
    }
}
