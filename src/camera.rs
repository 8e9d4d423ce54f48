//! Camera collaborator traits.
//!
//! The library never talks to hardware directly. A host supplies a
//! [`Camera`] that can open a live stream; the session owns the resulting
//! [`FrameStream`] exclusively while previewing and releases it on every
//! exit transition, so the device is never held past the capture screen's
//! lifetime.

use crate::error::CaptureError;
use async_trait::async_trait;

/// One raw frame grabbed from a live stream.
///
/// The bytes are whatever still format the stream produces (JPEG, PNG, …) —
/// anything [`crate::transform::decode::decode_image`] can read.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub bytes: Vec<u8>,
}

/// A live, open camera stream.
///
/// Exclusively owned by the active capture session. `grab` is synchronous by
/// contract: the stream hands over its most recent frame without waiting for
/// a new one.
pub trait FrameStream: Send {
    /// Grab the most recent frame from the live stream.
    fn grab(&mut self) -> Result<RawFrame, CaptureError>;

    /// Stop the stream and release the device. Must be idempotent; the
    /// session calls it on every exit transition and again on drop.
    fn release(&mut self);
}

/// Camera device access: acquire a live stream.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Open a live stream, prompting for permission if the platform
    /// requires it.
    ///
    /// # Errors
    /// [`CaptureError::StreamUnavailable`] when permission is refused or
    /// the hardware cannot deliver frames. Recoverable only by the user
    /// re-granting access and calling open again.
    async fn open(&self) -> Result<Box<dyn FrameStream>, CaptureError>;
}
