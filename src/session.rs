//! The capture session: a state machine from live preview to submitted
//! proof.
//!
//! One [`CaptureSession`] models one capture attempt against one open
//! [`AttendanceWindow`]. The session exclusively owns the camera stream
//! while previewing, holds at most one encoded frame, and coordinates the
//! best-effort geolocation fix — all single-threaded over `&mut self`, so
//! an encode always completes before the session can leave `Captured`, and
//! a submission always sees the most recently completed encode.
//!
//! ```text
//! Idle ─open()→ Previewing ─capture()→ Captured ─encode→ ReadyToSubmit
//!                   ▲                     │                    │
//!                   └─────── retake() ────┴────────────────────┤
//!                                                          submit()
//!                                                              ▼
//!                             Failed ◀─────────────────── Submitting ──▶ Submitted
//!                               └──────── submit() retry ─────▲
//! ```

use crate::camera::{Camera, FrameStream};
use crate::config::EncodeConfig;
use crate::error::CaptureError;
use crate::geo::{GeoFix, GeoLocator};
use crate::observer::ObserverHandle;
use crate::submit::{AttendanceSink, SubmissionAck, SubmissionPayload};
use crate::transform::encode::EncodedImage;
use crate::transform::resize::resize_encode;
use crate::window::AttendanceWindow;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle phase of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// No resources held; the screen has not opened (or was disposed).
    Idle,
    /// Camera live, geolocation in flight, waiting for the user to capture.
    Previewing,
    /// One frame held, encode pending.
    Captured,
    /// Frame encoded; submission may proceed.
    ReadyToSubmit,
    /// The remote call is in flight.
    Submitting,
    /// The backend accepted the proof. Terminal.
    Submitted,
    /// A transform or submission failed; `failure_message()` says why.
    Failed,
}

/// Tracks the one-shot geolocation attempt without ever blocking on it.
enum GeoState {
    NotRequested,
    Pending(oneshot::Receiver<Option<GeoFix>>),
    Resolved(Option<GeoFix>),
}

/// One capture attempt: window + camera stream + held frame + phase.
///
/// Create per capture screen, call [`open`](Self::open) to go live, and
/// [`dispose`](Self::dispose) (or drop) on navigation away — the camera is
/// released deterministically either way.
pub struct CaptureSession {
    window: AttendanceWindow,
    encode_config: EncodeConfig,
    phase: CapturePhase,
    stream: Option<Box<dyn FrameStream>>,
    frame: Option<EncodedImage>,
    geo: GeoState,
    geo_task: Option<JoinHandle<()>>,
    failure: Option<String>,
    observer: Option<ObserverHandle>,
}

impl CaptureSession {
    /// Create an idle session for one attendance window.
    ///
    /// The encode parameters are fixed for verification-photo use
    /// (quality 0.8 inside 1280x720); they are not caller-tunable because
    /// every proof in the system should compress identically.
    pub fn new(window: AttendanceWindow) -> Self {
        Self {
            window,
            encode_config: EncodeConfig::default(),
            phase: CapturePhase::Idle,
            stream: None,
            frame: None,
            geo: GeoState::NotRequested,
            geo_task: None,
            failure: None,
            observer: None,
        }
    }

    /// Attach an observer for phase-change and advisory events.
    pub fn set_observer(&mut self, observer: ObserverHandle) {
        self.observer = Some(observer);
    }

    /// Current phase.
    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// The window this attempt belongs to.
    pub fn window(&self) -> &AttendanceWindow {
        &self.window
    }

    /// The held encoded frame, if any.
    pub fn encoded_frame(&self) -> Option<&EncodedImage> {
        self.frame.as_ref()
    }

    /// The preserved message of the most recent failure.
    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Go live: acquire the camera stream and start the one-shot
    /// geolocation fix. The two acquisitions are independent; a missing
    /// location never blocks the preview.
    ///
    /// # Errors
    /// * [`CaptureError::WrongPhase`] outside `Idle`.
    /// * [`CaptureError::WindowClosed`] when the scheduling backend has
    ///   marked the window as no longer capturable.
    /// * [`CaptureError::StreamUnavailable`] from the camera; the session
    ///   stays `Idle` so the user can re-grant permission and retry.
    pub async fn open(
        &mut self,
        camera: &dyn Camera,
        locator: Arc<dyn GeoLocator>,
    ) -> Result<(), CaptureError> {
        if self.phase != CapturePhase::Idle {
            return Err(CaptureError::WrongPhase {
                op: "open",
                phase: self.phase,
            });
        }
        if !self.window.can_capture {
            return Err(CaptureError::WindowClosed {
                session_id: self.window.session_id.clone(),
            });
        }

        // Fire the one-shot fix before touching the camera; the two
        // acquisitions are independent and neither waits for the other.
        // One fix per attempt — the result is collected (without blocking)
        // at submit time.
        let (tx, rx) = oneshot::channel();
        let observer = self.observer.clone();
        let geo_task = tokio::spawn(async move {
            let fix = match locator.locate().await {
                Ok(fix) => Some(fix),
                Err(e) => {
                    warn!("Geolocation unavailable, proceeding without: {e}");
                    None
                }
            };
            if let Some(obs) = observer {
                obs.on_geo_resolved(fix);
            }
            let _ = tx.send(fix);
        });

        match camera.open().await {
            Ok(stream) => {
                info!(session_id = %self.window.session_id, "Camera stream acquired");
                self.geo = GeoState::Pending(rx);
                self.geo_task = Some(geo_task);
                self.stream = Some(stream);
                self.set_phase(CapturePhase::Previewing);
                Ok(())
            }
            Err(e) => {
                // No attempt started: leave no geolocation side effects.
                geo_task.abort();
                Err(e)
            }
        }
    }

    /// Grab one frame from the live stream and encode it.
    ///
    /// The grab itself is synchronous; the resize-and-encode runs on the
    /// blocking pool and this call resolves only once it has finished, so
    /// the session is in `ReadyToSubmit` (or `Failed`) on return — never
    /// mid-encode.
    ///
    /// # Errors
    /// * [`CaptureError::WrongPhase`] outside `Previewing` — no side
    ///   effects, no frame grabbed.
    /// * A grab failure leaves the session in `Previewing` for another try.
    /// * A transform failure moves to `Failed` with the message preserved.
    pub async fn capture(&mut self) -> Result<(), CaptureError> {
        if self.phase != CapturePhase::Previewing {
            return Err(CaptureError::WrongPhase {
                op: "capture",
                phase: self.phase,
            });
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(CaptureError::Internal(
                "previewing without a live stream".into(),
            ));
        };

        let raw = stream.grab()?;
        debug!("Grabbed frame: {} bytes", raw.bytes.len());
        self.set_phase(CapturePhase::Captured);

        let config = self.encode_config;
        let result = tokio::task::spawn_blocking(move || resize_encode(&raw.bytes, &config))
            .await
            .map_err(|e| CaptureError::Internal(format!("Encode task panicked: {e}")))?;

        match result {
            Ok(encoded) => {
                info!(
                    "Frame encoded: {}x{}, {} bytes",
                    encoded.width(),
                    encoded.height(),
                    encoded.len()
                );
                self.frame = Some(encoded);
                self.set_phase(CapturePhase::ReadyToSubmit);
                Ok(())
            }
            Err(e) => {
                self.failure = Some(e.to_string());
                self.set_phase(CapturePhase::Failed);
                Err(e)
            }
        }
    }

    /// Discard the held frame and return to the live preview.
    ///
    /// The camera stream is kept and the geolocation attempt is not re-run:
    /// one fix per attempt, however many retakes.
    pub fn retake(&mut self) -> Result<(), CaptureError> {
        match self.phase {
            CapturePhase::Captured | CapturePhase::ReadyToSubmit => {
                self.frame = None;
                self.set_phase(CapturePhase::Previewing);
                Ok(())
            }
            phase => Err(CaptureError::WrongPhase { op: "retake", phase }),
        }
    }

    /// Package the proof and hand it to the submission collaborator.
    ///
    /// Valid in `ReadyToSubmit`, and again in `Failed` while an encoded
    /// frame is still held — a rejected submission is retried only by the
    /// user calling this again, never automatically.
    ///
    /// A geolocation fix that has not arrived (or failed) downgrades to
    /// absent with a warn advisory; submission is never delayed for it.
    ///
    /// # Errors
    /// * [`CaptureError::WrongPhase`] in any other phase — no transition.
    /// * [`CaptureError::Submission`] (or the sink's own error) on a remote
    ///   failure; the session moves to `Failed` with the remote message
    ///   preserved verbatim and the frame retained for retry.
    pub async fn submit(
        &mut self,
        sink: &dyn AttendanceSink,
    ) -> Result<SubmissionAck, CaptureError> {
        let retryable = self.phase == CapturePhase::Failed && self.frame.is_some();
        if self.phase != CapturePhase::ReadyToSubmit && !retryable {
            return Err(CaptureError::WrongPhase {
                op: "submit",
                phase: self.phase,
            });
        }
        let Some(frame) = self.frame.as_ref() else {
            return Err(CaptureError::Internal("ready without an encoded frame".into()));
        };
        let image_data = frame.to_data_uri();

        let fix = self.resolve_geo();
        if fix.is_none() {
            warn!(
                session_id = %self.window.session_id,
                "Submitting attendance proof without a location fix"
            );
            if let Some(obs) = &self.observer {
                obs.on_advisory("submitting without location fix");
            }
        }

        let payload = SubmissionPayload {
            session_id: self.window.session_id.clone(),
            image_data,
            latitude: fix.map(|f| f.latitude),
            longitude: fix.map(|f| f.longitude),
        };

        self.set_phase(CapturePhase::Submitting);
        info!(session_id = %self.window.session_id, "Submitting attendance proof");

        match sink.submit(payload).await {
            Ok(ack) if ack.success => {
                info!(session_id = %self.window.session_id, "Attendance recorded: {}", ack.message);
                self.release_camera();
                self.abort_geo();
                self.set_phase(CapturePhase::Submitted);
                Ok(ack)
            }
            Ok(ack) => {
                self.failure = Some(ack.message.clone());
                self.set_phase(CapturePhase::Failed);
                Err(CaptureError::Submission { message: ack.message })
            }
            Err(e) => {
                self.failure = Some(e.to_string());
                self.set_phase(CapturePhase::Failed);
                Err(e)
            }
        }
    }

    /// Tear down the attempt: release the camera, abort the in-flight
    /// geolocation task, drop any held frame, and return to `Idle`.
    ///
    /// Run this on navigation away from the capture screen. `Drop` performs
    /// the same resource release as a backstop, but without the phase reset.
    pub fn dispose(&mut self) {
        self.release_camera();
        self.abort_geo();
        self.frame = None;
        self.failure = None;
        self.geo = GeoState::NotRequested;
        self.set_phase(CapturePhase::Idle);
        info!(session_id = %self.window.session_id, "Capture session disposed");
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn set_phase(&mut self, to: CapturePhase) {
        if self.phase == to {
            return;
        }
        let from = std::mem::replace(&mut self.phase, to);
        debug!(?from, ?to, "Phase transition");
        if let Some(obs) = &self.observer {
            obs.on_phase_change(from, to);
        }
    }

    /// Collect the geolocation result without blocking. A still-pending fix
    /// stays pending (and reads as absent) — submission never waits.
    fn resolve_geo(&mut self) -> Option<GeoFix> {
        match std::mem::replace(&mut self.geo, GeoState::NotRequested) {
            GeoState::NotRequested => None,
            GeoState::Resolved(fix) => {
                self.geo = GeoState::Resolved(fix);
                fix
            }
            GeoState::Pending(mut rx) => match rx.try_recv() {
                Ok(fix) => {
                    debug!(resolved = fix.is_some(), "Geolocation resolved");
                    self.geo = GeoState::Resolved(fix);
                    fix
                }
                Err(oneshot::error::TryRecvError::Empty) => {
                    self.geo = GeoState::Pending(rx);
                    None
                }
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.geo = GeoState::Resolved(None);
                    None
                }
            },
        }
    }

    fn release_camera(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
            debug!("Camera stream released");
        }
    }

    fn abort_geo(&mut self) {
        if let Some(task) = self.geo_task.take() {
            task.abort();
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release_camera();
        self.abort_geo();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::AttendanceWindow;
    use chrono::Utc;

    fn open_window() -> AttendanceWindow {
        AttendanceWindow {
            session_id: "sess-42".into(),
            opens_at: Utc::now(),
            window_minutes: 10,
            subject: "CS-301".into(),
            can_capture: true,
            time_remaining_minutes: 8,
        }
    }

    struct NoSink;

    #[async_trait::async_trait]
    impl AttendanceSink for NoSink {
        async fn submit(&self, _: SubmissionPayload) -> Result<SubmissionAck, CaptureError> {
            panic!("sink must not be reached from an invalid phase");
        }
    }

    #[tokio::test]
    async fn capture_in_idle_fails_without_side_effects() {
        let mut session = CaptureSession::new(open_window());
        let err = session.capture().await.unwrap_err();
        assert!(matches!(
            err,
            CaptureError::WrongPhase { op: "capture", phase: CapturePhase::Idle }
        ));
        assert_eq!(session.phase(), CapturePhase::Idle);
        assert!(session.encoded_frame().is_none());
    }

    #[tokio::test]
    async fn submit_before_encode_fails_without_transition() {
        let mut session = CaptureSession::new(open_window());
        let err = session.submit(&NoSink).await.unwrap_err();
        assert!(matches!(err, CaptureError::WrongPhase { op: "submit", .. }));
        assert_eq!(session.phase(), CapturePhase::Idle);
    }

    #[tokio::test]
    async fn retake_in_idle_is_rejected() {
        let mut session = CaptureSession::new(open_window());
        assert!(matches!(
            session.retake().unwrap_err(),
            CaptureError::WrongPhase { op: "retake", .. }
        ));
    }

    #[tokio::test]
    async fn dispose_is_safe_on_an_idle_session() {
        let mut session = CaptureSession::new(open_window());
        session.dispose();
        assert_eq!(session.phase(), CapturePhase::Idle);
    }
}
