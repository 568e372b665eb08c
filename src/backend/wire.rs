//! JSON shapes exchanged with the backend and their conversion into the
//! domain model.
//!
//! The backend is loose about types: ids may be numbers or strings, and a
//! true/false answer may arrive as a boolean or as the string `"true"`. All of
//! that is normalised here so the rest of the client only sees
//! [`QuestionSet`]s whose questions match their style.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::quiz::model::{
    Question, QuestionId, QuestionKind, QuestionSet, QuestionStyle, SetId, Unit, UnitId,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Int(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireAnswer {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct WireUnit {
    id: WireId,
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuestion {
    #[serde(default)]
    id: Option<WireId>,
    question: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default, alias = "correct_answer")]
    correct_answer: Option<WireAnswer>,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireQuestionSet {
    id: WireId,
    topic: String,
    #[serde(rename = "type", alias = "style")]
    style: String,
    #[serde(default)]
    questions: Vec<WireQuestion>,
}

#[derive(Debug, Serialize)]
pub struct CreateUnitRequest<'a> {
    pub user_id: &'a str,
    pub title: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub topic: &'a str,
    pub style: &'a str,
    pub user_id: &'a str,
    pub unit_id: &'a str,
}

pub fn decode_unit(body: &str) -> Result<Unit, BackendError> {
    let wire: WireUnit = serde_json::from_str(body)?;
    unit_from_wire(wire)
}

pub fn decode_units(body: &str) -> Result<Vec<Unit>, BackendError> {
    let wire: Vec<WireUnit> = serde_json::from_str(body)?;
    wire.into_iter().map(unit_from_wire).collect()
}

pub fn decode_set(body: &str) -> Result<QuestionSet, BackendError> {
    let wire: WireQuestionSet = serde_json::from_str(body)?;
    set_from_wire(wire)
}

pub fn decode_sets(body: &str) -> Result<Vec<QuestionSet>, BackendError> {
    let wire: Vec<WireQuestionSet> = serde_json::from_str(body)?;
    wire.into_iter().map(set_from_wire).collect()
}

fn unit_from_wire(wire: WireUnit) -> Result<Unit, BackendError> {
    let title = wire.title.trim().to_string();
    if title.is_empty() {
        return Err(BackendError::Malformed("unit with empty title".to_string()));
    }
    Ok(Unit {
        id: UnitId::new(wire.id.into_string()),
        title,
    })
}

fn set_from_wire(wire: WireQuestionSet) -> Result<QuestionSet, BackendError> {
    let style = QuestionStyle::from_name(&wire.style).ok_or_else(|| {
        BackendError::Malformed(format!("unknown question type '{}'", wire.style))
    })?;

    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(wire.questions.len());
    for (idx, q) in wire.questions.into_iter().enumerate() {
        let id = match q.id {
            Some(id) => id.into_string(),
            None => format!("q{}", idx + 1),
        };
        if !seen.insert(id.clone()) {
            return Err(BackendError::Malformed(format!(
                "duplicate question id '{id}'"
            )));
        }
        let kind = kind_from_wire(style, &id, q.options, q.correct_answer, q.answer)?;
        questions.push(Question {
            id: QuestionId::new(id),
            prompt: q.question,
            kind,
        });
    }

    Ok(QuestionSet {
        id: SetId::new(wire.id.into_string()),
        topic: wire.topic,
        style,
        questions,
    })
}

fn kind_from_wire(
    style: QuestionStyle,
    id: &str,
    options: Option<Vec<String>>,
    correct: Option<WireAnswer>,
    answer: Option<String>,
) -> Result<QuestionKind, BackendError> {
    match style {
        QuestionStyle::MultipleChoice => {
            let options = options.filter(|o| !o.is_empty()).ok_or_else(|| {
                BackendError::Malformed(format!("question '{id}' has no options"))
            })?;
            let correct = match correct {
                Some(WireAnswer::Text(text)) => text,
                Some(WireAnswer::Bool(b)) => b.to_string(),
                None => {
                    return Err(BackendError::Malformed(format!(
                        "question '{id}' has no correct answer"
                    )));
                }
            };
            if !options.contains(&correct) {
                tracing::warn!(question = id, "correct answer is not among the options");
            }
            Ok(QuestionKind::MultipleChoice { options, correct })
        }
        QuestionStyle::TrueFalse => {
            let correct = match correct {
                Some(WireAnswer::Bool(b)) => b,
                Some(WireAnswer::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(BackendError::Malformed(format!(
                            "question '{id}' has non-boolean answer '{other}'"
                        )));
                    }
                },
                None => {
                    return Err(BackendError::Malformed(format!(
                        "question '{id}' has no correct answer"
                    )));
                }
            };
            Ok(QuestionKind::TrueFalse { correct })
        }
        QuestionStyle::OpenEnded => {
            // Some backends put the model answer in correctAnswer.
            let answer = answer
                .or(match correct {
                    Some(WireAnswer::Text(text)) => Some(text),
                    _ => None,
                })
                .unwrap_or_default();
            Ok(QuestionKind::OpenEnded { answer })
        }
    }
}
