//! Geolocation collaborator: a single best-effort device fix.
//!
//! Location strengthens an attendance proof but never gates it. The session
//! requests exactly one fix per attempt, in parallel with the camera, and
//! treats every failure — denial, timeout, no signal — as a valid "absent"
//! outcome rather than an error.

use crate::error::GeoError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single device location reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// Device location access: one-shot, best-effort.
///
/// Implementations own their own deadline; the session does not impose one
/// and will submit without the fix if it has not arrived by then.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// Acquire one location fix.
    async fn locate(&self) -> Result<GeoFix, GeoError>;
}
