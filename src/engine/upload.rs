use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::tag::{CancelToken, RequestTag};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadEvent {
    Progress(u8),
    Done,
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Done,
    Failed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("an upload is already in progress")]
    AlreadyUploading,
    #[error("no file chosen")]
    NoFile,
}

/// Single-file upload state machine: `Idle -> Uploading -> {Done, Failed}`.
#[derive(Debug, Default)]
pub struct UploadTracker {
    phase: UploadPhase,
    progress: u8,
    file: Option<PathBuf>,
    in_flight: Option<RequestTag>,
    cancel: Option<CancelToken>,
}

impl UploadTracker {
    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn ratio(&self) -> f64 {
        self.progress as f64 / 100.0
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    /// Begin an upload. The returned token aborts the transfer when
    /// cancelled.
    pub fn start(&mut self, tag: RequestTag, file: PathBuf) -> Result<CancelToken, UploadError> {
        if self.is_uploading() {
            return Err(UploadError::AlreadyUploading);
        }
        if file.as_os_str().is_empty() {
            return Err(UploadError::NoFile);
        }
        let token = CancelToken::new();
        self.phase = UploadPhase::Uploading;
        self.progress = 0;
        self.file = Some(file);
        self.in_flight = Some(tag);
        self.cancel = Some(token.clone());
        Ok(token)
    }

    /// Apply an event from the transfer. Returns whether anything changed.
    pub fn apply(&mut self, tag: &RequestTag, event: UploadEvent) -> bool {
        if self.in_flight.as_ref() != Some(tag) || !self.is_uploading() {
            tracing::debug!(seq = tag.seq, ?event, "ignoring stale upload event");
            return false;
        }
        match event {
            UploadEvent::Progress(pct) => {
                let pct = pct.min(100);
                if pct < self.progress {
                    return false;
                }
                let changed = pct != self.progress;
                self.progress = pct;
                changed
            }
            UploadEvent::Done => {
                self.progress = 100;
                self.phase = UploadPhase::Done;
                self.in_flight = None;
                self.cancel = None;
                true
            }
            UploadEvent::Failed(msg) => {
                self.phase = UploadPhase::Failed(msg);
                self.in_flight = None;
                self.cancel = None;
                true
            }
        }
    }

    /// Abort the in-flight upload, if any.
    pub fn cancel(&mut self) {
        if !self.is_uploading() {
            return;
        }
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.in_flight = None;
        self.phase = UploadPhase::Failed("cancelled".to_string());
    }

    pub fn reset(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::UnitId;

    fn tag(seq: u64) -> RequestTag {
        RequestTag {
            unit: UnitId::new("u1"),
            seq,
        }
    }

    fn started() -> UploadTracker {
        let mut tracker = UploadTracker::default();
        tracker.start(tag(1), PathBuf::from("notes.pdf")).unwrap();
        tracker
    }

    #[test]
    fn start_enters_uploading_at_zero() {
        let tracker = started();
        assert_eq!(tracker.phase(), &UploadPhase::Uploading);
        assert_eq!(tracker.progress(), 0);
        assert_eq!(tracker.file(), Some(Path::new("notes.pdf")));
    }

    #[test]
    fn start_while_uploading_is_rejected() {
        let mut tracker = started();
        let err = tracker.start(tag(2), PathBuf::from("other.pdf")).unwrap_err();
        assert_eq!(err, UploadError::AlreadyUploading);
    }

    #[test]
    fn start_requires_a_file() {
        let mut tracker = UploadTracker::default();
        assert_eq!(tracker.start(tag(1), PathBuf::new()).unwrap_err(), UploadError::NoFile);
        assert_eq!(tracker.phase(), &UploadPhase::Idle);
    }

    #[test]
    fn progress_is_monotonic() {
        let mut tracker = started();
        assert!(tracker.apply(&tag(1), UploadEvent::Progress(40)));
        assert!(!tracker.apply(&tag(1), UploadEvent::Progress(20)));
        assert_eq!(tracker.progress(), 40);
        tracker.apply(&tag(1), UploadEvent::Progress(250));
        assert_eq!(tracker.progress(), 100);
    }

    #[test]
    fn events_after_done_are_ignored() {
        let mut tracker = started();
        tracker.apply(&tag(1), UploadEvent::Progress(60));
        tracker.apply(&tag(1), UploadEvent::Done);
        assert_eq!(tracker.phase(), &UploadPhase::Done);
        assert_eq!(tracker.progress(), 100);

        assert!(!tracker.apply(&tag(1), UploadEvent::Progress(10)));
        assert!(!tracker.apply(&tag(1), UploadEvent::Failed("late".into())));
        assert_eq!(tracker.phase(), &UploadPhase::Done);
        assert_eq!(tracker.progress(), 100);
    }

    #[test]
    fn events_after_failure_are_ignored() {
        let mut tracker = started();
        tracker.apply(&tag(1), UploadEvent::Progress(30));
        tracker.apply(&tag(1), UploadEvent::Failed("500".into()));
        assert!(!tracker.apply(&tag(1), UploadEvent::Progress(90)));
        assert!(!tracker.apply(&tag(1), UploadEvent::Done));
        assert_eq!(tracker.phase(), &UploadPhase::Failed("500".into()));
        assert_eq!(tracker.progress(), 30);
    }

    #[test]
    fn stale_tag_is_ignored() {
        let mut tracker = started();
        assert!(!tracker.apply(&tag(99), UploadEvent::Done));
        assert!(tracker.is_uploading());
    }

    #[test]
    fn restart_after_terminal_state() {
        let mut tracker = started();
        tracker.apply(&tag(1), UploadEvent::Done);
        tracker.start(tag(2), PathBuf::from("b.pdf")).unwrap();
        assert_eq!(tracker.progress(), 0);
        // Events for the first upload no longer apply.
        assert!(!tracker.apply(&tag(1), UploadEvent::Progress(50)));
    }

    #[test]
    fn cancel_trips_token_and_fails() {
        let mut tracker = UploadTracker::default();
        let token = tracker.start(tag(1), PathBuf::from("a.pdf")).unwrap();
        tracker.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(tracker.phase(), UploadPhase::Failed(_)));
        assert!(!tracker.apply(&tag(1), UploadEvent::Done));
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut tracker = UploadTracker::default();
        let token = tracker.start(tag(1), PathBuf::from("a.pdf")).unwrap();
        tracker.apply(&tag(1), UploadEvent::Progress(70));
        tracker.reset();
        assert!(token.is_cancelled());
        assert_eq!(tracker.phase(), &UploadPhase::Idle);
        assert_eq!(tracker.progress(), 0);
        assert!(tracker.file().is_none());
    }
}
