use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::quiz::model::{Question, QuestionId, QuestionKind, QuestionSet, SetId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Choice(String),
    Verdict(bool),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("'{0}' is not one of the options")]
    NotAnOption(String),
    #[error("question {0} does not take this kind of answer")]
    WrongKind(QuestionId),
}

/// How a single option should be shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    Plain,
    SelectedCorrect,
    SelectedIncorrect,
    /// The true answer, annotated after the user picked something else.
    CorrectAnswer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Unanswered,
    Correct,
    Incorrect,
    /// Open-ended questions are never graded.
    Ungraded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub answered: usize,
    pub correct: usize,
    pub gradable: usize,
}

/// Per-question answers and reveal toggles for the displayed set. Discarded
/// whenever the displayed set changes.
#[derive(Debug, Default)]
pub struct ResponseState {
    set_id: Option<SetId>,
    answers: HashMap<QuestionId, Response>,
    revealed: HashSet<QuestionId>,
}

fn mark<T: PartialEq>(selected: Option<&T>, option: &T, correct: &T) -> OptionMark {
    match selected {
        Some(sel) if sel == option => {
            if option == correct {
                OptionMark::SelectedCorrect
            } else {
                OptionMark::SelectedIncorrect
            }
        }
        Some(sel) if option == correct && sel != correct => OptionMark::CorrectAnswer,
        _ => OptionMark::Plain,
    }
}

impl ResponseState {
    pub fn for_set(set: &QuestionSet) -> Self {
        Self {
            set_id: Some(set.id.clone()),
            ..Self::default()
        }
    }

    pub fn set_id(&self) -> Option<&SetId> {
        self.set_id.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty() && self.revealed.is_empty()
    }

    pub fn response(&self, id: &QuestionId) -> Option<&Response> {
        self.answers.get(id)
    }

    pub fn is_revealed(&self, id: &QuestionId) -> bool {
        self.revealed.contains(id)
    }

    /// Record a multiple-choice selection, replacing any earlier one.
    pub fn select_option(&mut self, question: &Question, option: &str) -> Result<(), AnswerError> {
        match &question.kind {
            QuestionKind::MultipleChoice { options, .. } => {
                if !options.iter().any(|o| o == option) {
                    return Err(AnswerError::NotAnOption(option.to_string()));
                }
                self.answers
                    .insert(question.id.clone(), Response::Choice(option.to_string()));
                Ok(())
            }
            _ => Err(AnswerError::WrongKind(question.id.clone())),
        }
    }

    pub fn select_verdict(&mut self, question: &Question, value: bool) -> Result<(), AnswerError> {
        match &question.kind {
            QuestionKind::TrueFalse { .. } => {
                self.answers
                    .insert(question.id.clone(), Response::Verdict(value));
                Ok(())
            }
            _ => Err(AnswerError::WrongKind(question.id.clone())),
        }
    }

    /// Flip the model-answer visibility of an open-ended question. Returns
    /// the new visibility.
    pub fn toggle_reveal(&mut self, question: &Question) -> Result<bool, AnswerError> {
        if !matches!(question.kind, QuestionKind::OpenEnded { .. }) {
            return Err(AnswerError::WrongKind(question.id.clone()));
        }
        if self.revealed.remove(&question.id) {
            Ok(false)
        } else {
            self.revealed.insert(question.id.clone());
            Ok(true)
        }
    }

    pub fn verdict(&self, question: &Question) -> Verdict {
        let response = self.answers.get(&question.id);
        match (&question.kind, response) {
            (QuestionKind::OpenEnded { .. }, _) => Verdict::Ungraded,
            (_, None) => Verdict::Unanswered,
            (QuestionKind::MultipleChoice { correct, .. }, Some(Response::Choice(sel))) => {
                if sel == correct {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect
                }
            }
            (QuestionKind::TrueFalse { correct }, Some(Response::Verdict(sel))) => {
                if sel == correct {
                    Verdict::Correct
                } else {
                    Verdict::Incorrect
                }
            }
            // Unreachable through the select_* methods.
            _ => Verdict::Unanswered,
        }
    }

    /// Display marks for every option of `question`, in display order.
    /// True/false questions list `True` then `False`; open-ended ones have
    /// no options.
    pub fn option_marks(&self, question: &Question) -> Vec<(String, OptionMark)> {
        let response = self.answers.get(&question.id);
        match &question.kind {
            QuestionKind::MultipleChoice { options, correct } => {
                let selected = match response {
                    Some(Response::Choice(sel)) => Some(sel),
                    _ => None,
                };
                options
                    .iter()
                    .map(|o| (o.clone(), mark(selected, o, correct)))
                    .collect()
            }
            QuestionKind::TrueFalse { correct } => {
                let selected = match response {
                    Some(Response::Verdict(sel)) => Some(sel),
                    _ => None,
                };
                [true, false]
                    .iter()
                    .map(|v| {
                        let label = if *v { "True" } else { "False" };
                        (label.to_string(), mark(selected, v, correct))
                    })
                    .collect()
            }
            QuestionKind::OpenEnded { .. } => Vec::new(),
        }
    }

    pub fn score(&self, set: &QuestionSet) -> Score {
        let mut score = Score::default();
        for q in &set.questions {
            match self.verdict(q) {
                Verdict::Correct => {
                    score.gradable += 1;
                    score.answered += 1;
                    score.correct += 1;
                }
                Verdict::Incorrect => {
                    score.gradable += 1;
                    score.answered += 1;
                }
                Verdict::Unanswered => score.gradable += 1,
                Verdict::Ungraded => {}
            }
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::QuestionStyle;

    fn mc() -> Question {
        Question {
            id: QuestionId::new("q1"),
            prompt: "Powerhouse of the cell?".to_string(),
            kind: QuestionKind::MultipleChoice {
                options: vec![
                    "Nucleus".to_string(),
                    "Mitochondria".to_string(),
                    "Ribosome".to_string(),
                ],
                correct: "Mitochondria".to_string(),
            },
        }
    }

    fn tf(correct: bool) -> Question {
        Question {
            id: QuestionId::new("q2"),
            prompt: "Cells have walls".to_string(),
            kind: QuestionKind::TrueFalse { correct },
        }
    }

    fn open() -> Question {
        Question {
            id: QuestionId::new("q3"),
            prompt: "Explain osmosis".to_string(),
            kind: QuestionKind::OpenEnded {
                answer: "Diffusion of water".to_string(),
            },
        }
    }

    fn marks(state: &ResponseState, q: &Question) -> Vec<OptionMark> {
        state.option_marks(q).into_iter().map(|(_, m)| m).collect()
    }

    #[test]
    fn unanswered_options_are_plain() {
        let state = ResponseState::default();
        assert!(marks(&state, &mc()).iter().all(|m| *m == OptionMark::Plain));
        assert_eq!(state.verdict(&mc()), Verdict::Unanswered);
    }

    #[test]
    fn correct_choice_has_no_annotation() {
        let mut state = ResponseState::default();
        state.select_option(&mc(), "Mitochondria").unwrap();
        assert_eq!(
            marks(&state, &mc()),
            vec![OptionMark::Plain, OptionMark::SelectedCorrect, OptionMark::Plain]
        );
        assert_eq!(state.verdict(&mc()), Verdict::Correct);
    }

    #[test]
    fn wrong_choice_annotates_correct_option() {
        let mut state = ResponseState::default();
        state.select_option(&mc(), "Ribosome").unwrap();
        assert_eq!(
            marks(&state, &mc()),
            vec![
                OptionMark::Plain,
                OptionMark::CorrectAnswer,
                OptionMark::SelectedIncorrect
            ]
        );
        assert_eq!(state.verdict(&mc()), Verdict::Incorrect);
    }

    #[test]
    fn reselection_overwrites() {
        let mut state = ResponseState::default();
        state.select_option(&mc(), "Ribosome").unwrap();
        state.select_option(&mc(), "Mitochondria").unwrap();
        assert_eq!(state.verdict(&mc()), Verdict::Correct);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut state = ResponseState::default();
        let err = state.select_option(&mc(), "Golgi").unwrap_err();
        assert_eq!(err, AnswerError::NotAnOption("Golgi".to_string()));
        assert!(state.is_empty());
    }

    #[test]
    fn true_false_uses_same_marks() {
        let mut state = ResponseState::default();
        state.select_verdict(&tf(false), true).unwrap();
        let labelled = state.option_marks(&tf(false));
        assert_eq!(labelled[0], ("True".to_string(), OptionMark::SelectedIncorrect));
        assert_eq!(labelled[1], ("False".to_string(), OptionMark::CorrectAnswer));

        state.select_verdict(&tf(false), false).unwrap();
        assert_eq!(
            marks(&state, &tf(false)),
            vec![OptionMark::Plain, OptionMark::SelectedCorrect]
        );
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut state = ResponseState::default();
        assert!(state.select_verdict(&mc(), true).is_err());
        assert!(state.select_option(&tf(true), "True").is_err());
        assert!(state.toggle_reveal(&mc()).is_err());
    }

    #[test]
    fn reveal_toggles_back_to_hidden() {
        let mut state = ResponseState::default();
        let q = open();
        assert!(!state.is_revealed(&q.id));
        assert!(state.toggle_reveal(&q).unwrap());
        assert!(state.is_revealed(&q.id));
        assert!(!state.toggle_reveal(&q).unwrap());
        assert!(!state.is_revealed(&q.id));
        assert_eq!(state.verdict(&q), Verdict::Ungraded);
    }

    #[test]
    fn reveals_are_independent_per_question() {
        let mut state = ResponseState::default();
        let a = open();
        let mut b = open();
        b.id = QuestionId::new("q4");
        state.toggle_reveal(&a).unwrap();
        assert!(state.is_revealed(&a.id));
        assert!(!state.is_revealed(&b.id));
    }

    #[test]
    fn score_counts_gradable_questions() {
        let set = QuestionSet {
            id: SetId::new("s"),
            topic: "Cells".to_string(),
            style: QuestionStyle::MultipleChoice,
            questions: vec![mc(), tf(true), open()],
        };
        let mut state = ResponseState::for_set(&set);
        state.select_option(&mc(), "Mitochondria").unwrap();
        state.select_verdict(&tf(true), false).unwrap();
        assert_eq!(
            state.score(&set),
            Score {
                answered: 2,
                correct: 1,
                gradable: 2
            }
        );
        assert_eq!(state.set_id(), Some(&SetId::new("s")));
    }
}
