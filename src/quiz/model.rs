use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(UnitId);
opaque_id!(SetId);
opaque_id!(QuestionId);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub title: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionStyle {
    #[default]
    MultipleChoice,
    TrueFalse,
    OpenEnded,
}

impl QuestionStyle {
    pub const ALL: [QuestionStyle; 3] = [
        QuestionStyle::MultipleChoice,
        QuestionStyle::TrueFalse,
        QuestionStyle::OpenEnded,
    ];

    /// Name used on the wire and in the config file.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionStyle::MultipleChoice => "multiple-choice",
            QuestionStyle::TrueFalse => "true-false",
            QuestionStyle::OpenEnded => "open-ended",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestionStyle::MultipleChoice => "Multiple Choice",
            QuestionStyle::TrueFalse => "True/False",
            QuestionStyle::OpenEnded => "Open-Ended",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn next(self) -> Self {
        match self {
            QuestionStyle::MultipleChoice => QuestionStyle::TrueFalse,
            QuestionStyle::TrueFalse => QuestionStyle::OpenEnded,
            QuestionStyle::OpenEnded => QuestionStyle::MultipleChoice,
        }
    }
}

/// Per-style payload of a question. Each variant carries only the fields its
/// style needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice { options: Vec<String>, correct: String },
    TrueFalse { correct: bool },
    OpenEnded { answer: String },
}

impl QuestionKind {
    pub fn style(&self) -> QuestionStyle {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionStyle::MultipleChoice,
            QuestionKind::TrueFalse { .. } => QuestionStyle::TrueFalse,
            QuestionKind::OpenEnded { .. } => QuestionStyle::OpenEnded,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// One generation result. Every question's kind matches `style`; the wire
/// decoder rejects payloads that break this.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub id: SetId,
    pub topic: String,
    pub style: QuestionStyle,
    pub questions: Vec<Question>,
}

impl QuestionSet {
    pub fn summary(&self) -> String {
        format!("{} \u{b7} {} questions", self.style.label(), self.questions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_names_round_trip() {
        for style in QuestionStyle::ALL {
            assert_eq!(QuestionStyle::from_name(style.as_str()), Some(style));
        }
        assert_eq!(QuestionStyle::from_name("essay"), None);
    }

    #[test]
    fn style_cycle_visits_every_style() {
        let mut style = QuestionStyle::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(style);
            style = style.next();
        }
        assert_eq!(style, QuestionStyle::default());
        assert_eq!(seen, QuestionStyle::ALL.to_vec());
    }

    #[test]
    fn style_serializes_with_wire_names() {
        let json = serde_json::to_string(&QuestionStyle::TrueFalse).unwrap();
        assert_eq!(json, "\"true-false\"");
    }

    #[test]
    fn summary_mentions_label_and_count() {
        let set = QuestionSet {
            id: SetId::new("s1"),
            topic: "Cells".to_string(),
            style: QuestionStyle::OpenEnded,
            questions: vec![Question {
                id: QuestionId::new("q1"),
                prompt: "What is a cell?".to_string(),
                kind: QuestionKind::OpenEnded {
                    answer: "The basic unit of life".to_string(),
                },
            }],
        };
        assert_eq!(set.summary(), "Open-Ended \u{b7} 1 questions");
    }
}
