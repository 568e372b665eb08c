use thiserror::Error;

use crate::backend::error::BackendError;
use crate::engine::tag::{CancelToken, RequestTag};
use crate::quiz::model::{QuestionSet, QuestionStyle};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Pending,
    Failed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("topic is empty")]
    EmptyTopic,
    #[error("a generation request is already pending")]
    AlreadyPending,
}

/// What the caller must send to the backend after a successful submit.
#[derive(Debug)]
pub struct GenerationRequest {
    pub tag: RequestTag,
    pub topic: String,
    pub style: QuestionStyle,
    pub cancel: CancelToken,
}

/// Lifecycle of one topic+style request: `Idle -> Pending -> {Idle, Failed}`.
/// A success hands the set to the caller and starts over with the same style.
#[derive(Debug, Default)]
pub struct GenerationController {
    phase: GenerationPhase,
    topic: String,
    style: QuestionStyle,
    in_flight: Option<RequestTag>,
    cancel: Option<CancelToken>,
}

impl GenerationController {
    pub fn new(style: QuestionStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> &GenerationPhase {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == GenerationPhase::Pending
    }

    pub fn is_waiting_for(&self, tag: &RequestTag) -> bool {
        self.in_flight.as_ref() == Some(tag)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: &str) {
        self.topic = topic.to_string();
    }

    pub fn style(&self) -> QuestionStyle {
        self.style
    }

    pub fn cycle_style(&mut self) {
        self.style = self.style.next();
    }

    pub fn submit(
        &mut self,
        tag: RequestTag,
        topic: &str,
        style: QuestionStyle,
    ) -> Result<GenerationRequest, GenerationError> {
        if self.is_pending() {
            return Err(GenerationError::AlreadyPending);
        }
        let trimmed = topic.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::EmptyTopic);
        }

        let cancel = CancelToken::new();
        self.phase = GenerationPhase::Pending;
        self.topic = topic.to_string();
        self.style = style;
        self.in_flight = Some(tag.clone());
        self.cancel = Some(cancel.clone());

        Ok(GenerationRequest {
            tag,
            topic: trimmed.to_string(),
            style,
            cancel,
        })
    }

    /// Apply the backend's answer. Yields the new set on success; results
    /// for any other request are dropped.
    pub fn complete(
        &mut self,
        tag: &RequestTag,
        result: Result<QuestionSet, BackendError>,
    ) -> Option<QuestionSet> {
        if self.in_flight.as_ref() != Some(tag) {
            tracing::debug!(seq = tag.seq, "discarding stale generation result");
            return None;
        }
        self.in_flight = None;
        self.cancel = None;
        match result {
            Ok(set) => {
                *self = Self::new(self.style);
                Some(set)
            }
            Err(err) => {
                self.phase = GenerationPhase::Failed(err.to_string());
                None
            }
        }
    }

    /// Back to `Idle`, aborting any in-flight request. The chosen style is kept.
    pub fn reset(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        *self = Self::new(self.style);
    }
}
