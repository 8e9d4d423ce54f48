//! # proofshot
//!
//! Attendance-proof photo capture: turn a live camera frame into a compact,
//! verifiable image artifact, coordinated with a time-boxed attendance
//! window and best-effort device geolocation.
//!
//! ## Why this crate?
//!
//! Proving physical presence with a photo has tight constraints: one open
//! window per class period, a single capture opportunity the user can retake
//! but not replay, a payload that must ride inside a JSON request body, and
//! a location fix that may simply never arrive. This crate owns exactly that
//! pipeline — pixel resampling, square cropping, lossy WebP re-encoding,
//! base64 size accounting, and the capture-session state machine — while the
//! portal backend (scheduling, submission) stays behind collaborator traits.
//!
//! ## Pipeline Overview
//!
//! ```text
//! camera frame
//!  │
//!  ├─ 1. Grab     one frame from the exclusively-owned live stream
//!  ├─ 2. Decode   bytes → raster (jpeg/png/webp)
//!  ├─ 3. Resize   proportional fit inside 1280x720, no-op if it fits
//!  ├─ 4. Encode   lossy WebP q0.8 → base64 data URI
//!  └─ 5. Submit   {session_id, image_data, latitude?, longitude?} → backend
//! ```
//!
//! The square crop transforms ([`crop_square_centered`], [`crop_region`])
//! share stages 2–4 and serve the profile-photo editing flow; they emit a
//! named artifact instead of a payload string.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use proofshot::{crop_square_centered, CropConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("portrait.jpg")?;
//!     let avatar = crop_square_centered(&bytes, "portrait.jpg", &CropConfig::default())?;
//!     std::fs::write(&avatar.file_name, avatar.image.bytes())?;
//!     Ok(())
//! }
//! ```
//!
//! Driving a capture session requires host-supplied collaborators:
//!
//! ```rust,ignore
//! let mut session = CaptureSession::new(watcher.current().unwrap());
//! session.open(&camera, locator).await?;
//! session.capture().await?;                 // grab + encode
//! let ack = session.submit(&sink).await?;   // geolocation attached if it arrived
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `proofshot` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! proofshot = { version = "0.4", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod camera;
pub mod config;
pub mod error;
pub mod estimate;
pub mod geo;
pub mod observer;
pub mod session;
pub mod submit;
pub mod transform;
pub mod window;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use camera::{Camera, FrameStream, RawFrame};
pub use config::{CropConfig, CropConfigBuilder, EncodeConfig, EncodeConfigBuilder};
pub use error::{CaptureError, GeoError};
pub use estimate::{estimated_bytes, estimated_kilobytes};
pub use geo::{GeoFix, GeoLocator};
pub use observer::{NoopObserver, ObserverHandle, SessionObserver};
pub use session::{CapturePhase, CaptureSession};
pub use submit::{AttendanceSink, SubmissionAck, SubmissionPayload};
pub use transform::crop::{crop_region, crop_square_centered, CropRegion, ImageArtifact};
pub use transform::encode::{EncodedImage, WEBP_MIME};
pub use transform::resize::{fit_dimensions, resize_encode};
pub use window::{AttendanceWindow, WindowSchedule, WindowWatcher, DEFAULT_POLL_INTERVAL};
