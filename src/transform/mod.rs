//! Image transforms behind the capture and profile-photo flows.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap the codec
//! backend without touching session orchestration.
//!
//! ## Data Flow
//!
//! ```text
//! capture:  decode ──▶ resize (fit 1280x720) ──▶ encode (WebP q0.8) ──▶ data URI
//! avatar:   decode ──▶ crop (centered square) ─▶ resize ──▶ encode ──▶ named artifact
//! manual:   decode ──▶ crop (caller region)  ──▶ resize ──▶ encode ──▶ named artifact
//! ```
//!
//! 1. [`decode`] — raw bytes to an in-memory raster; the only stage that can
//!    fail on malformed input
//! 2. [`resize`] — proportional fit inside a bounding box; a no-op when the
//!    source already fits
//! 3. [`crop`]  — centered or caller-positioned square extraction
//! 4. [`encode`] — lossy WebP re-encode plus base64 wrapping for payloads
//!
//! All stages are synchronous and CPU-bound; callers that live on the async
//! runtime wrap them in `tokio::task::spawn_blocking` (the session does).

pub mod crop;
pub mod decode;
pub mod encode;
pub mod resize;
