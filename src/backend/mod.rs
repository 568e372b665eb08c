pub mod error;
pub mod http;
pub mod progress;
pub mod wire;
pub mod worker;

use std::path::Path;

use crate::backend::error::BackendError;
use crate::backend::progress::ProgressSink;
use crate::engine::tag::CancelToken;
use crate::quiz::model::{QuestionSet, QuestionStyle, SetId, Unit, UnitId};

/// The question-bank service. Every call is blocking and runs on a worker
/// thread; the user identity is fixed by the implementation.
pub trait Backend: Send + Sync {
    fn list_units(&self) -> Result<Vec<Unit>, BackendError>;

    fn create_unit(&self, title: &str) -> Result<Unit, BackendError>;

    /// Upload a lecture document, reporting whole-percent progress through
    /// `progress`. Must return [`BackendError::Cancelled`] when aborted via
    /// `cancel`.
    fn upload(
        &self,
        unit: &UnitId,
        file: &Path,
        progress: ProgressSink,
        cancel: &CancelToken,
    ) -> Result<(), BackendError>;

    fn generate(
        &self,
        unit: &UnitId,
        topic: &str,
        style: QuestionStyle,
    ) -> Result<QuestionSet, BackendError>;

    fn list_sets(&self, unit: &UnitId) -> Result<Vec<QuestionSet>, BackendError>;

    fn search_sets(&self, unit: &UnitId, topic: &str) -> Result<Vec<QuestionSet>, BackendError>;

    fn delete_set(&self, unit: &UnitId, set: &SetId) -> Result<(), BackendError>;
}
