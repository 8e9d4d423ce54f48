//! Error types for the proofshot library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`CaptureError`] — **Fatal to the failing call**: the transform or
//!   session operation cannot produce its result (undecodable source, encoder
//!   yielded nothing, camera refused to open, wrong phase). Returned as
//!   `Err(CaptureError)` and never retried by the library itself.
//!
//! * [`GeoError`] — **Non-fatal**: a geolocation fix could not be acquired.
//!   The session absorbs it into an absent [`crate::geo::GeoFix`] and carries
//!   on; presence-photo capture is never blocked by location unavailability.
//!
//! The separation keeps the absorption rule honest: nothing of type
//! [`GeoError`] can escape through a `?` into a fatal path by accident.

use crate::session::CapturePhase;
use thiserror::Error;

/// All fatal errors returned by the proofshot library.
///
/// Geolocation failures use [`GeoError`] and are downgraded to an absent fix
/// rather than propagated here.
#[derive(Debug, Error)]
pub enum CaptureError {
    // ── Transform errors ──────────────────────────────────────────────────
    /// The source bytes could not be decoded as a raster image.
    #[error("Source is not a decodable image: {detail}")]
    Decode { detail: String },

    /// The raster target for the encode step could not be created.
    #[error("Cannot create a {width}x{height} raster target")]
    Surface { width: u32, height: u32 },

    /// The encoder ran but produced no usable output.
    #[error("Image encoding produced no output: {detail}")]
    Encode { detail: String },

    /// A caller-supplied crop region falls outside the source image.
    #[error("Crop region {size}px at ({x}, {y}) exceeds the {width}x{height} source image")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        size: u32,
        width: u32,
        height: u32,
    },

    // ── Session errors ────────────────────────────────────────────────────
    /// The camera stream could not be acquired (permission or hardware).
    /// Recoverable only by the user re-granting access and reopening.
    #[error("Camera stream unavailable: {detail}\nCheck camera permissions and that no other application holds the device.")]
    StreamUnavailable { detail: String },

    /// An operation was invoked in a phase that does not allow it.
    #[error("{op}() is not valid in the {phase:?} phase")]
    WrongPhase {
        op: &'static str,
        phase: CapturePhase,
    },

    /// The attendance window no longer accepts captures.
    #[error("Attendance window for session '{session_id}' is closed")]
    WindowClosed { session_id: String },

    /// The remote submission collaborator rejected the proof or failed.
    /// The message is surfaced verbatim; retry is user-initiated only.
    #[error("Submission failed: {message}")]
    Submission { message: String },

    /// The scheduling collaborator could not be reached.
    #[error("Attendance schedule unavailable: {detail}")]
    ScheduleUnavailable { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal geolocation failure.
///
/// Acquired once per capture attempt and never retried automatically; any of
/// these downgrades the attempt's fix to absent.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum GeoError {
    /// The user or platform denied the location request.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The platform could not produce a position.
    #[error("Position unavailable: {detail}")]
    PositionUnavailable { detail: String },

    /// The fix did not arrive within the provider's own deadline.
    #[error("Location request timed out after {secs}s")]
    Timeout { secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_out_of_bounds_display() {
        let e = CaptureError::RegionOutOfBounds {
            x: 900,
            y: 0,
            size: 400,
            width: 1200,
            height: 800,
        };
        let msg = e.to_string();
        assert!(msg.contains("400px"), "got: {msg}");
        assert!(msg.contains("1200x800"), "got: {msg}");
    }

    #[test]
    fn wrong_phase_display_names_op_and_phase() {
        let e = CaptureError::WrongPhase {
            op: "capture",
            phase: CapturePhase::Idle,
        };
        let msg = e.to_string();
        assert!(msg.contains("capture()"));
        assert!(msg.contains("Idle"));
    }

    #[test]
    fn submission_message_is_verbatim() {
        let e = CaptureError::Submission {
            message: "device outside allowed radius".into(),
        };
        assert!(e.to_string().contains("device outside allowed radius"));
    }

    #[test]
    fn geo_timeout_display() {
        let e = GeoError::Timeout { secs: 10 };
        assert!(e.to_string().contains("10s"));
    }
}
