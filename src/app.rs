use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::backend::Backend;
use crate::backend::worker::{BackendEvent, Worker};
use crate::config::Config;
use crate::engine::generation::{GenerationController, GenerationError};
use crate::engine::sets::QuestionSetStore;
use crate::engine::tag::TagIssuer;
use crate::engine::units::{UnitDirectory, UnitError};
use crate::engine::upload::{UploadEvent, UploadTracker};
use crate::event::AppEvent;
use crate::quiz::model::{Question, QuestionKind, QuestionSet, SetId, UnitId};
use crate::session::responses::ResponseState;
use crate::store::export::{ExportFormat, Exporter};
use crate::ui::line_input::{InputField, LineInput};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Units,
    Unit,
    Quiz,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line status shown in the footer until the next notice or key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub units: UnitDirectory,
    pub upload: UploadTracker,
    pub generation: GenerationController,
    pub sets: QuestionSetStore,
    pub responses: ResponseState,
    pub notice: Option<Notice>,
    pub input: Option<LineInput>,
    /// Local topic filter over the loaded history.
    pub search_term: String,
    pub units_loading: bool,
    pub unit_selected: usize,
    pub history_selected: usize,
    pub history_confirm_delete: bool,
    pub question_selected: usize,
    pub export_format: ExportFormat,
    pub should_quit: bool,
    tags: TagIssuer,
    worker: Worker,
    exporter: Exporter,
}

impl App {
    pub fn new(config: Config, backend: Arc<dyn Backend>, tx: Sender<AppEvent>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "unknown theme, using default");
            Theme::default()
        });
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        Self {
            screen: AppScreen::Units,
            theme,
            units: UnitDirectory::default(),
            upload: UploadTracker::default(),
            generation: GenerationController::new(config.default_style),
            sets: QuestionSetStore::default(),
            responses: ResponseState::default(),
            notice: None,
            input: None,
            search_term: String::new(),
            units_loading: false,
            unit_selected: 0,
            history_selected: 0,
            history_confirm_delete: false,
            question_selected: 0,
            export_format: config.export_format,
            should_quit: false,
            tags: TagIssuer::default(),
            worker: Worker::new(backend, tx),
            exporter: Exporter::new(config.export_path()),
            config,
        }
    }

    pub fn refresh_units(&mut self) {
        self.units_loading = true;
        self.worker.load_units();
    }

    /// Ask the backend for a new unit. Blank titles are ignored.
    pub fn create_unit(&mut self, title: &str) -> bool {
        let Some(title) = self.units.prepare_create(title) else {
            return false;
        };
        tracing::info!(%title, "creating unit");
        self.worker.create_unit(title);
        true
    }

    pub fn select_unit(&mut self, id: &UnitId) -> Result<(), UnitError> {
        let title = self.units.select(id)?.title.clone();
        tracing::info!(unit = %id, %title, "selected unit");
        self.reset_unit_state();
        self.screen = AppScreen::Unit;
        self.load_history();
        Ok(())
    }

    pub fn select_highlighted_unit(&mut self) {
        let Some(id) = self.units.units().get(self.unit_selected).map(|u| u.id.clone()) else {
            return;
        };
        if let Err(err) = self.select_unit(&id) {
            self.notice = Some(Notice::error(err.to_string()));
        }
    }

    pub fn deselect_unit(&mut self) {
        self.units.deselect();
        self.reset_unit_state();
        self.screen = AppScreen::Units;
    }

    /// Discard everything scoped to the active unit. In-flight uploads and
    /// generations are cancelled and their completions will no longer match.
    fn reset_unit_state(&mut self) {
        self.upload.reset();
        self.generation.reset();
        self.sets.clear();
        self.responses = ResponseState::default();
        self.input = None;
        self.search_term.clear();
        self.history_selected = 0;
        self.history_confirm_delete = false;
        self.question_selected = 0;
    }

    pub fn load_history(&mut self) {
        let Some(unit) = self.units.current_id().cloned() else {
            return;
        };
        let tag = self.tags.issue(&unit);
        self.sets.begin_load(tag.clone());
        self.worker.load_history(tag);
    }

    /// Replace history with the backend's matches for the current search
    /// term; an empty term reloads the full history.
    pub fn search_remote(&mut self) {
        let term = self.search_term.trim().to_string();
        if term.is_empty() {
            self.load_history();
            return;
        }
        let Some(unit) = self.units.current_id().cloned() else {
            return;
        };
        let tag = self.tags.issue(&unit);
        self.sets.begin_load(tag.clone());
        self.worker.search(tag, term);
        // Results are already narrowed server-side.
        self.search_term.clear();
        self.history_selected = 0;
    }

    pub fn start_upload(&mut self, path: &str) {
        let Some(unit) = self.units.current_id().cloned() else {
            return;
        };
        let path = path.trim();
        if path.is_empty() {
            return;
        }
        let file = expand_home(path);
        if !file.is_file() {
            self.notice = Some(Notice::error(format!("No such file: {}", file.display())));
            return;
        }

        let tag = self.tags.issue(&unit);
        match self.upload.start(tag.clone(), file.clone()) {
            Ok(cancel) => {
                tracing::info!(unit = %unit, file = %file.display(), "starting upload");
                self.worker.upload(tag, file, cancel);
            }
            Err(err) => self.notice = Some(Notice::error(err.to_string())),
        }
    }

    pub fn cancel_upload(&mut self) {
        if self.upload.is_uploading() {
            self.upload.cancel();
            self.notice = Some(Notice::info("Upload cancelled"));
        }
    }

    pub fn submit_generation(&mut self) {
        let Some(unit) = self.units.current_id().cloned() else {
            return;
        };
        let topic = self.generation.topic().to_string();
        let style = self.generation.style();
        let tag = self.tags.issue(&unit);
        match self.generation.submit(tag, &topic, style) {
            Ok(req) => {
                tracing::info!(unit = %unit, topic = %req.topic, style = req.style.as_str(), "requesting questions");
                self.worker.generate(req.tag, req.topic, req.style, req.cancel);
            }
            Err(GenerationError::EmptyTopic) => {}
            Err(err @ GenerationError::AlreadyPending) => {
                self.notice = Some(Notice::info(err.to_string()));
            }
        }
    }

    /// History after the local topic filter, in display order.
    pub fn visible_history(&self) -> Vec<&QuestionSet> {
        self.sets.search(&self.search_term)
    }

    pub fn highlighted_set_id(&self) -> Option<SetId> {
        self.visible_history()
            .get(self.history_selected)
            .map(|s| s.id.clone())
    }

    pub fn view_set(&mut self, id: &SetId) -> bool {
        if !self.sets.display_by_id(id) {
            return false;
        }
        self.show_displayed();
        true
    }

    pub fn view_highlighted_set(&mut self) {
        if let Some(id) = self.highlighted_set_id() {
            self.view_set(&id);
        }
    }

    fn show_displayed(&mut self) {
        if let Some(set) = self.sets.displayed() {
            self.responses = ResponseState::for_set(set);
            self.question_selected = 0;
            self.screen = AppScreen::Quiz;
        }
    }

    pub fn close_set(&mut self) {
        self.sets.clear_displayed();
        self.responses = ResponseState::default();
        self.question_selected = 0;
        self.screen = AppScreen::Unit;
    }

    /// Remove a set from the history. Unless `local_delete_only` is set the
    /// backend is asked too, and the set comes back if it refuses.
    pub fn delete_set(&mut self, id: &SetId) {
        let Some(unit) = self.units.current_id().cloned() else {
            return;
        };
        let tag = self.tags.issue(&unit);
        let Some(pending) = self.sets.delete(id, tag.clone()) else {
            return;
        };
        if pending.was_displayed {
            self.responses = ResponseState::default();
            if self.screen == AppScreen::Quiz {
                self.screen = AppScreen::Unit;
            }
        }
        self.clamp_history_selection();

        if self.config.local_delete_only {
            self.sets.confirm_delete(&tag, id);
            self.notice = Some(Notice::info(format!("Removed \"{}\"", pending.set.topic)));
            return;
        }
        self.worker.delete_set(tag, id.clone());
    }

    pub fn delete_highlighted_set(&mut self) {
        if let Some(id) = self.highlighted_set_id() {
            self.delete_set(&id);
        }
    }

    fn clamp_history_selection(&mut self) {
        let len = self.visible_history().len();
        self.history_selected = self.history_selected.min(len.saturating_sub(1));
    }

    pub fn export_set(&mut self, id: &SetId) {
        let set = match self.sets.displayed().filter(|s| &s.id == id) {
            Some(set) => set,
            None => match self.sets.get(id) {
                Some(set) => set,
                None => return,
            },
        };
        match self
            .exporter
            .export(set, self.units.current(), self.export_format)
        {
            Ok(path) => {
                self.notice = Some(Notice::info(format!("Exported to {}", path.display())));
            }
            Err(err) => {
                tracing::warn!(set = %id, error = %err, "export failed");
                self.notice = Some(Notice::error(format!("Export failed: {err}")));
            }
        }
    }

    pub fn toggle_export_format(&mut self) {
        self.export_format = self.export_format.toggle();
        self.config.export_format = self.export_format;
        if let Err(err) = self.config.save() {
            tracing::warn!(error = %err, "could not save config");
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.sets.displayed()?.questions.get(self.question_selected)
    }

    pub fn next_question(&mut self) {
        let count = self.sets.displayed().map_or(0, |s| s.questions.len());
        if self.question_selected + 1 < count {
            self.question_selected += 1;
        }
    }

    pub fn prev_question(&mut self) {
        self.question_selected = self.question_selected.saturating_sub(1);
    }

    /// Answer the selected question with its `index`-th option. For
    /// true/false, 0 is True and 1 is False.
    pub fn choose_option(&mut self, index: usize) {
        let Some(question) = self.current_question().cloned() else {
            return;
        };
        let result = match &question.kind {
            QuestionKind::MultipleChoice { options, .. } => match options.get(index) {
                Some(option) => self.responses.select_option(&question, option),
                None => return,
            },
            QuestionKind::TrueFalse { .. } => match index {
                0 => self.responses.select_verdict(&question, true),
                1 => self.responses.select_verdict(&question, false),
                _ => return,
            },
            QuestionKind::OpenEnded { .. } => return,
        };
        if let Err(err) = result {
            tracing::debug!(question = %question.id, error = %err, "answer rejected");
        }
    }

    pub fn toggle_reveal(&mut self) {
        let Some(question) = self.current_question().cloned() else {
            return;
        };
        let _ = self.responses.toggle_reveal(&question);
    }

    pub fn open_input(&mut self, field: InputField) {
        let seed = match field {
            InputField::Topic => self.generation.topic().to_string(),
            InputField::Search => self.search_term.clone(),
            InputField::UnitTitle | InputField::UploadPath => String::new(),
        };
        self.input = Some(LineInput::new(field, &seed));
    }

    /// Mirror the live contents of a field into the state it edits.
    pub fn sync_input(&mut self) {
        let Some(input) = &self.input else {
            return;
        };
        match input.field() {
            InputField::Topic => self.generation.set_topic(input.value()),
            InputField::Search => {
                self.search_term = input.value().to_string();
                self.clamp_history_selection();
            }
            InputField::UnitTitle | InputField::UploadPath => {}
        }
    }

    pub fn submit_input(&mut self) {
        let Some(input) = self.input.take() else {
            return;
        };
        let value = input.value().to_string();
        match input.field() {
            InputField::UnitTitle => {
                self.create_unit(&value);
            }
            InputField::Topic => {
                self.generation.set_topic(&value);
                self.submit_generation();
            }
            InputField::UploadPath => self.start_upload(&value),
            InputField::Search => {
                self.search_term = value;
                self.search_remote();
            }
        }
    }

    pub fn cancel_input(&mut self) {
        if let Some(input) = self.input.take()
            && input.field() == InputField::Search
        {
            self.search_term.clear();
        }
    }

    fn report(&mut self, context: &str, err: &impl std::fmt::Display) {
        tracing::warn!(error = %err, "{context}");
        self.notice = Some(Notice::error(format!("{context}: {err}")));
    }

    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::UnitsLoaded(result) => {
                self.units_loading = false;
                match result {
                    Ok(units) => {
                        tracing::debug!(count = units.len(), "units loaded");
                        self.units.replace_all(units);
                        self.unit_selected = self
                            .unit_selected
                            .min(self.units.units().len().saturating_sub(1));
                    }
                    Err(err) => self.report("Could not load units", &err),
                }
            }
            BackendEvent::UnitCreated(result) => match result {
                Ok(unit) => {
                    let title = unit.title.clone();
                    match self.units.complete_create(unit) {
                        Ok(()) => {
                            self.unit_selected = self.units.units().len() - 1;
                            self.notice = Some(Notice::info(format!("Created unit \"{title}\"")));
                        }
                        Err(err) => self.report("Could not add unit", &err),
                    }
                }
                Err(err) => self.report("Could not create unit", &err),
            },
            BackendEvent::Upload { tag, event } => {
                let outcome = event.clone();
                if !self.upload.apply(&tag, event) {
                    return;
                }
                match outcome {
                    UploadEvent::Done => {
                        let name = self
                            .upload
                            .file()
                            .and_then(|p| p.file_name())
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        tracing::info!(file = %name, "upload finished");
                        self.notice = Some(Notice::info(format!("Uploaded {name}")));
                    }
                    UploadEvent::Failed(msg) => self.report("Upload failed", &msg),
                    UploadEvent::Progress(_) => {}
                }
            }
            BackendEvent::Generated { tag, result } => {
                if !self.generation.is_waiting_for(&tag) {
                    tracing::debug!(seq = tag.seq, "discarding stale generation result");
                    return;
                }
                let failure = result.as_ref().err().map(|e| e.to_string());
                match self.generation.complete(&tag, result) {
                    Some(set) => {
                        tracing::info!(set = %set.id, questions = set.questions.len(), "questions generated");
                        self.sets.display(set);
                        self.show_displayed();
                        self.load_history();
                    }
                    None => {
                        if let Some(msg) = failure {
                            self.report("Question generation failed", &msg);
                        }
                    }
                }
            }
            BackendEvent::HistoryLoaded { tag, result } => match result {
                Ok(sets) => {
                    if self.sets.complete_load(&tag, sets) {
                        self.clamp_history_selection();
                    }
                }
                Err(err) => {
                    if self.sets.abandon_load(&tag) {
                        self.report("Could not load question sets", &err);
                    }
                }
            },
            BackendEvent::SearchResults { tag, result } => match result {
                Ok(sets) => {
                    if self.sets.replace_with_search_results(&tag, sets) {
                        self.clamp_history_selection();
                    }
                }
                Err(err) => {
                    if self.sets.abandon_load(&tag) {
                        self.report("Search failed", &err);
                    }
                }
            },
            BackendEvent::Deleted { tag, set_id, result } => match result {
                Ok(()) => {
                    if !self.sets.confirm_delete(&tag, &set_id) {
                        tracing::debug!(seq = tag.seq, set = %set_id, "ignoring stale delete result");
                    }
                }
                Err(err) => {
                    let Some(restored) = self.sets.rollback_delete(&tag, &set_id) else {
                        tracing::debug!(seq = tag.seq, set = %set_id, "ignoring stale delete failure");
                        return;
                    };
                    if restored.was_displayed
                        && self.screen == AppScreen::Unit
                        && self.sets.displayed().is_some_and(|s| s.id == set_id)
                    {
                        self.show_displayed();
                    }
                    self.clamp_history_selection();
                    self.report("Could not delete question set; restored", &err);
                }
            },
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
