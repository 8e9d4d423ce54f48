//! Attendance windows: the scheduling collaborator's records and a poller.
//!
//! Window expiry is owned by the scheduling backend, not recomputed locally —
//! the portal's clock is the one that counts. The core only reads
//! [`AttendanceWindow`] snapshots; [`WindowWatcher`] refreshes them on an
//! interval and fans the latest one out through a watch channel.

use crate::error::CaptureError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

/// Default refresh interval for window polling.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// One open attendance-taking opportunity for one class period.
///
/// Created by the scheduling collaborator; read-only here. `can_capture`
/// and `time_remaining_minutes` are the backend's verdicts — the session
/// trusts them instead of re-deriving from `opens_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceWindow {
    /// Identifier of the class session this window belongs to.
    pub session_id: String,
    /// When the window opened.
    pub opens_at: DateTime<Utc>,
    /// Total window length in minutes.
    pub window_minutes: u32,
    /// Subject/course context, for display.
    pub subject: String,
    /// Whether a new capture attempt may still be started.
    pub can_capture: bool,
    /// Minutes left before the window closes, as computed by the backend.
    pub time_remaining_minutes: u32,
}

/// Scheduling collaborator: supplies the current window for a class session.
#[async_trait]
pub trait WindowSchedule: Send + Sync {
    /// Fetch the current window record, or `None` when no window is open.
    async fn fetch_window(
        &self,
        session_id: &str,
    ) -> Result<Option<AttendanceWindow>, CaptureError>;
}

/// Periodically refreshes one session's window record.
///
/// Polls [`WindowSchedule::fetch_window`] on a fixed interval and publishes
/// each result through a watch channel. A failed poll keeps the last good
/// value (with a warning) so a transient backend error does not blank the
/// capture screen. The polling task is aborted on [`stop`](Self::stop) or
/// drop.
pub struct WindowWatcher {
    rx: watch::Receiver<Option<AttendanceWindow>>,
    handle: JoinHandle<()>,
}

impl WindowWatcher {
    /// Spawn a watcher polling `schedule` for `session_id` every `interval`.
    pub fn spawn(
        schedule: Arc<dyn WindowSchedule>,
        session_id: impl Into<String>,
        interval: Duration,
    ) -> Self {
        let session_id = session_id.into();
        let (tx, rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A late tick should not trigger a burst of catch-up polls.
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match schedule.fetch_window(&session_id).await {
                    Ok(window) => {
                        debug!(
                            %session_id,
                            open = window.as_ref().map(|w| w.can_capture),
                            "Window refreshed"
                        );
                        if tx.send(window).is_err() {
                            // All receivers gone; the watcher is orphaned.
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(%session_id, "Window refresh failed, keeping last value: {e}");
                    }
                }
            }
        });

        Self { rx, handle }
    }

    /// Spawn with the repository-default 30 s interval.
    pub fn spawn_default(
        schedule: Arc<dyn WindowSchedule>,
        session_id: impl Into<String>,
    ) -> Self {
        Self::spawn(schedule, session_id, DEFAULT_POLL_INTERVAL)
    }

    /// The most recently published window record.
    pub fn current(&self) -> Option<AttendanceWindow> {
        self.rx.borrow().clone()
    }

    /// A stream of window updates, starting from the current value.
    pub fn updates(&self) -> WatchStream<Option<AttendanceWindow>> {
        WatchStream::new(self.rx.clone())
    }

    /// Stop polling.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for WindowWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Schedule whose window closes after a set number of polls.
    struct CountdownSchedule {
        polls: AtomicU32,
        open_for: u32,
    }

    #[async_trait]
    impl WindowSchedule for CountdownSchedule {
        async fn fetch_window(
            &self,
            session_id: &str,
        ) -> Result<Option<AttendanceWindow>, CaptureError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(AttendanceWindow {
                session_id: session_id.to_string(),
                opens_at: Utc::now(),
                window_minutes: 10,
                subject: "CS-301".into(),
                can_capture: n < self.open_for,
                time_remaining_minutes: self.open_for.saturating_sub(n),
            }))
        }
    }

    /// Schedule that fails every other poll.
    struct FlakySchedule {
        polls: AtomicU32,
    }

    #[async_trait]
    impl WindowSchedule for FlakySchedule {
        async fn fetch_window(
            &self,
            session_id: &str,
        ) -> Result<Option<AttendanceWindow>, CaptureError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 1 {
                return Err(CaptureError::ScheduleUnavailable {
                    detail: "backend hiccup".into(),
                });
            }
            Ok(Some(AttendanceWindow {
                session_id: session_id.to_string(),
                opens_at: Utc::now(),
                window_minutes: 10,
                subject: "CS-301".into(),
                can_capture: true,
                time_remaining_minutes: 9,
            }))
        }
    }

    #[tokio::test]
    async fn watcher_publishes_refreshed_windows() {
        let schedule = Arc::new(CountdownSchedule {
            polls: AtomicU32::new(0),
            open_for: 2,
        });
        let watcher = WindowWatcher::spawn(schedule, "sess-1", Duration::from_millis(5));

        // First poll fires immediately; wait for the window to close.
        tokio::time::sleep(Duration::from_millis(60)).await;
        let current = watcher.current().expect("window should be published");
        assert_eq!(current.session_id, "sess-1");
        assert!(!current.can_capture, "window should have closed");
        watcher.stop();
    }

    #[tokio::test]
    async fn failed_poll_keeps_last_value() {
        let schedule = Arc::new(FlakySchedule {
            polls: AtomicU32::new(0),
        });
        let watcher = WindowWatcher::spawn(schedule, "sess-2", Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(40)).await;
        // Every odd poll errored; the published value survives regardless.
        assert!(watcher.current().is_some());
    }

    #[test]
    fn window_serde_round_trip() {
        let w = AttendanceWindow {
            session_id: "sess-9".into(),
            opens_at: Utc::now(),
            window_minutes: 15,
            subject: "PHY-110".into(),
            can_capture: true,
            time_remaining_minutes: 12,
        };
        let json = serde_json::to_string(&w).unwrap();
        let back: AttendanceWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }
}
