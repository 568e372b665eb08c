use crate::engine::filter;
use crate::engine::tag::RequestTag;
use crate::quiz::model::{QuestionSet, SetId};

/// A set removed optimistically, kept until the backend confirms or rejects
/// the deletion.
#[derive(Clone, Debug)]
pub struct PendingDelete {
    /// The backend request this removal waits on.
    pub tag: RequestTag,
    pub set: QuestionSet,
    /// Position in history at removal time; `None` if the set was only
    /// displayed and not yet part of the loaded history.
    pub index: Option<usize>,
    pub was_displayed: bool,
}

/// History of question sets for the active unit and the set on screen.
#[derive(Debug, Default)]
pub struct QuestionSetStore {
    history: Vec<QuestionSet>,
    displayed: Option<QuestionSet>,
    loading: Option<RequestTag>,
    pending_deletes: Vec<PendingDelete>,
}

impl QuestionSetStore {
    pub fn history(&self) -> &[QuestionSet] {
        &self.history
    }

    pub fn displayed(&self) -> Option<&QuestionSet> {
        self.displayed.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn get(&self, id: &SetId) -> Option<&QuestionSet> {
        self.history.iter().find(|s| &s.id == id)
    }

    /// Expect a history (or search) result for `tag`; any earlier request
    /// is superseded.
    pub fn begin_load(&mut self, tag: RequestTag) {
        self.loading = Some(tag);
    }

    /// Replace history wholesale. Returns false when `tag` is not the
    /// request being waited for.
    pub fn complete_load(&mut self, tag: &RequestTag, sets: Vec<QuestionSet>) -> bool {
        if self.loading.as_ref() != Some(tag) {
            tracing::debug!(seq = tag.seq, "discarding stale history result");
            return false;
        }
        self.loading = None;
        // A reload must not resurrect sets whose deletion is still in flight.
        self.history = sets
            .into_iter()
            .filter(|s| !self.is_delete_pending(&s.id))
            .collect();
        true
    }

    /// Remote search results take the place of history, same as a reload.
    pub fn replace_with_search_results(&mut self, tag: &RequestTag, sets: Vec<QuestionSet>) -> bool {
        self.complete_load(tag, sets)
    }

    pub fn abandon_load(&mut self, tag: &RequestTag) -> bool {
        if self.loading.as_ref() != Some(tag) {
            return false;
        }
        self.loading = None;
        true
    }

    /// Put `set` on screen. The caller resets the per-question responses.
    pub fn display(&mut self, set: QuestionSet) {
        self.displayed = Some(set);
    }

    pub fn display_by_id(&mut self, id: &SetId) -> bool {
        match self.get(id).cloned() {
            Some(set) => {
                self.display(set);
                true
            }
            None => false,
        }
    }

    pub fn clear_displayed(&mut self) {
        self.displayed = None;
    }

    pub fn search(&self, term: &str) -> Vec<&QuestionSet> {
        filter::filter_sets(&self.history, term)
    }

    /// Optimistically remove a set on behalf of the request `tag`. Clears the
    /// displayed set when it is the one being deleted.
    pub fn delete(&mut self, id: &SetId, tag: RequestTag) -> Option<PendingDelete> {
        let index = self.history.iter().position(|s| &s.id == id);
        let was_displayed = self.displayed.as_ref().is_some_and(|d| &d.id == id);

        let set = match index {
            Some(idx) => self.history.remove(idx),
            None if was_displayed => self.displayed.clone()?,
            None => return None,
        };
        if was_displayed {
            self.displayed = None;
        }

        let pending = PendingDelete {
            tag,
            set,
            index,
            was_displayed,
        };
        self.pending_deletes.push(pending.clone());
        Some(pending)
    }

    pub fn is_delete_pending(&self, id: &SetId) -> bool {
        self.pending_deletes.iter().any(|p| &p.set.id == id)
    }

    fn take_pending(&mut self, tag: &RequestTag, id: &SetId) -> Option<PendingDelete> {
        let pos = self
            .pending_deletes
            .iter()
            .position(|p| &p.tag == tag && &p.set.id == id)?;
        Some(self.pending_deletes.remove(pos))
    }

    /// The backend accepted the deletion issued under `tag`. Results for any
    /// other request are ignored.
    pub fn confirm_delete(&mut self, tag: &RequestTag, id: &SetId) -> bool {
        self.take_pending(tag, id).is_some()
    }

    /// The backend rejected the deletion issued under `tag`: put the set back
    /// where it was, and back on screen if nothing replaced it there.
    pub fn rollback_delete(&mut self, tag: &RequestTag, id: &SetId) -> Option<PendingDelete> {
        let pending = self.take_pending(tag, id)?;
        if let Some(index) = pending.index {
            let index = index.min(self.history.len());
            self.history.insert(index, pending.set.clone());
        }
        if pending.was_displayed && self.displayed.is_none() {
            self.displayed = Some(pending.set.clone());
        }
        Some(pending)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
