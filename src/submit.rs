//! Submission collaborator: hand the finished proof to the attendance
//! backend.
//!
//! The remote call is opaque — no idempotency guarantee, no automatic retry.
//! A failed submission leaves the session in its failed state and waits for
//! the user to try again.

use crate::error::CaptureError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The packaged attendance proof.
///
/// `latitude`/`longitude` are omitted from the serialized form entirely when
/// no fix was acquired — the backend distinguishes "no location" from a
/// (0, 0) reading in the Gulf of Guinea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    /// The class session this proof belongs to.
    pub session_id: String,
    /// The encoded frame as a `data:image/webp;base64,…` string.
    pub image_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// The backend's verdict on a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub success: bool,
    /// Human-readable outcome, surfaced to the user verbatim.
    pub message: String,
}

/// Submission collaborator: accepts one attendance proof.
#[async_trait]
pub trait AttendanceSink: Send + Sync {
    /// Submit the proof. Transport-level failures are
    /// [`CaptureError::Submission`]; an ack with `success == false` is an
    /// application-level rejection and treated the same way by the session.
    async fn submit(&self, payload: SubmissionPayload) -> Result<SubmissionAck, CaptureError>;
}
