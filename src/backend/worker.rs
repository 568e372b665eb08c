use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::backend::Backend;
use crate::backend::error::BackendError;
use crate::engine::tag::{CancelToken, RequestTag};
use crate::engine::upload::UploadEvent;
use crate::event::AppEvent;
use crate::quiz::model::{QuestionSet, QuestionStyle, SetId, Unit};

/// Completion of a backend call, posted back to the main loop.
#[derive(Debug)]
pub enum BackendEvent {
    UnitsLoaded(Result<Vec<Unit>, BackendError>),
    UnitCreated(Result<Unit, BackendError>),
    Upload {
        tag: RequestTag,
        event: UploadEvent,
    },
    Generated {
        tag: RequestTag,
        result: Result<QuestionSet, BackendError>,
    },
    HistoryLoaded {
        tag: RequestTag,
        result: Result<Vec<QuestionSet>, BackendError>,
    },
    SearchResults {
        tag: RequestTag,
        result: Result<Vec<QuestionSet>, BackendError>,
    },
    Deleted {
        tag: RequestTag,
        set_id: SetId,
        result: Result<(), BackendError>,
    },
}

/// Runs each backend call on its own short-lived thread.
pub struct Worker {
    backend: Arc<dyn Backend>,
    tx: Sender<AppEvent>,
}

impl Worker {
    pub fn new(backend: Arc<dyn Backend>, tx: Sender<AppEvent>) -> Self {
        Self { backend, tx }
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&dyn Backend, &Sender<AppEvent>) + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        thread::spawn(move || job(backend.as_ref(), &tx));
    }

    fn post(tx: &Sender<AppEvent>, event: BackendEvent) {
        // The receiver only goes away when the app is shutting down.
        let _ = tx.send(AppEvent::Backend(event));
    }

    pub fn load_units(&self) {
        self.spawn(|backend, tx| {
            Self::post(tx, BackendEvent::UnitsLoaded(backend.list_units()));
        });
    }

    pub fn create_unit(&self, title: String) {
        self.spawn(move |backend, tx| {
            Self::post(tx, BackendEvent::UnitCreated(backend.create_unit(&title)));
        });
    }

    pub fn upload(&self, tag: RequestTag, file: PathBuf, cancel: CancelToken) {
        self.spawn(move |backend, tx| {
            let progress_tx = tx.clone();
            let progress_tag = tag.clone();
            let sink = Box::new(move |pct: u8| {
                Self::post(
                    &progress_tx,
                    BackendEvent::Upload {
                        tag: progress_tag.clone(),
                        event: UploadEvent::Progress(pct),
                    },
                );
            });
            let event = match backend.upload(&tag.unit, &file, sink, &cancel) {
                Ok(()) => UploadEvent::Done,
                Err(err) => UploadEvent::Failed(err.to_string()),
            };
            Self::post(tx, BackendEvent::Upload { tag, event });
        });
    }

    pub fn generate(&self, tag: RequestTag, topic: String, style: QuestionStyle, cancel: CancelToken) {
        self.spawn(move |backend, tx| {
            if cancel.is_cancelled() {
                return;
            }
            let result = backend.generate(&tag.unit, &topic, style);
            if cancel.is_cancelled() {
                tracing::debug!(seq = tag.seq, "dropping result of cancelled generation");
                return;
            }
            Self::post(tx, BackendEvent::Generated { tag, result });
        });
    }

    pub fn load_history(&self, tag: RequestTag) {
        self.spawn(move |backend, tx| {
            let result = backend.list_sets(&tag.unit);
            Self::post(tx, BackendEvent::HistoryLoaded { tag, result });
        });
    }

    pub fn search(&self, tag: RequestTag, topic: String) {
        self.spawn(move |backend, tx| {
            let result = backend.search_sets(&tag.unit, &topic);
            Self::post(tx, BackendEvent::SearchResults { tag, result });
        });
    }

    pub fn delete_set(&self, tag: RequestTag, set_id: SetId) {
        self.spawn(move |backend, tx| {
            let result = backend.delete_set(&tag.unit, &set_id);
            Self::post(tx, BackendEvent::Deleted { tag, set_id, result });
        });
    }
}
