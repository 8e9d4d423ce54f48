//! Session-observer trait for capture lifecycle events.
//!
//! Inject an `Arc<dyn SessionObserver>` via
//! [`crate::session::CaptureSession::set_observer`] to mirror session state
//! into a UI without the library knowing how the host renders.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: hosts can
//! forward events to a UI event loop, a broadcast channel, or a log sink
//! without this crate depending on any of them. All methods have default
//! no-op implementations so callers only override what they care about.

use crate::geo::GeoFix;
use crate::session::CapturePhase;
use std::sync::Arc;

/// Called by the capture session as its state machine advances.
///
/// Implementations must be `Send + Sync`; the geolocation task may resolve
/// from another runtime thread.
pub trait SessionObserver: Send + Sync {
    /// A phase transition committed.
    fn on_phase_change(&self, from: CapturePhase, to: CapturePhase) {
        let _ = (from, to);
    }

    /// The one-shot geolocation attempt concluded. `None` means the fix is
    /// absent for this attempt — a valid outcome, not an error.
    fn on_geo_resolved(&self, fix: Option<GeoFix>) {
        let _ = fix;
    }

    /// A user-facing advisory (e.g. "submitting without location").
    fn on_advisory(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for sessions without an observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Convenience alias matching the type the session stores.
pub type ObserverHandle = Arc<dyn SessionObserver>;
