use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quiz::model::{QuestionKind, QuestionSet, Unit};

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Markdown => "Markdown",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ExportFormat::Json => ExportFormat::Markdown,
            ExportFormat::Markdown => ExportFormat::Json,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub lecturebank_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub unit: Option<Unit>,
    pub set: QuestionSet,
}

/// Writes question sets into a directory, one file per set.
pub struct Exporter {
    base_dir: PathBuf,
}

impl Exporter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn file_name(set: &QuestionSet, format: ExportFormat) -> String {
        let topic = sanitize(set.topic.trim());
        let topic = if topic.is_empty() { "set".to_string() } else { topic };
        format!("{}-{}.{}", topic, sanitize(set.id.as_str()), format.extension())
    }

    /// Write `set` and return the path of the new file. An existing export of
    /// the same set is replaced.
    pub fn export(
        &self,
        set: &QuestionSet,
        unit: Option<&Unit>,
        format: ExportFormat,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir)?;
        let content = match format {
            ExportFormat::Json => {
                let data = ExportData {
                    lecturebank_export_version: EXPORT_VERSION,
                    exported_at: Utc::now(),
                    unit: unit.cloned(),
                    set: set.clone(),
                };
                serde_json::to_string_pretty(&data)?
            }
            ExportFormat::Markdown => render_markdown(set, unit),
        };

        let path = self.base_dir.join(Self::file_name(set, format));
        write_atomic(&path, &content)?;
        tracing::info!(path = %path.display(), set = %set.id, "exported question set");
        Ok(path)
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}


pub fn render_markdown(set: &QuestionSet, unit: Option<&Unit>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", set.topic);
    out.push('\n');
    if let Some(unit) = unit {
        let _ = writeln!(out, "Unit: {}  ", unit.title);
    }
    let _ = writeln!(out, "Style: {}", set.style.label());

    for (i, q) in set.questions.iter().enumerate() {
        out.push('\n');
        let _ = writeln!(out, "## {}. {}", i + 1, q.prompt);
        out.push('\n');
        match &q.kind {
            QuestionKind::MultipleChoice { options, correct } => {
                for option in options {
                    let mark = if option == correct { "x" } else { " " };
                    let _ = writeln!(out, "- [{mark}] {option}");
                }
            }
            QuestionKind::TrueFalse { correct } => {
                let _ = writeln!(out, "Answer: {}", if *correct { "True" } else { "False" });
            }
            QuestionKind::OpenEnded { answer } => {
                for line in answer.lines() {
                    let _ = writeln!(out, "> {line}");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::{Question, QuestionId, QuestionStyle, SetId, UnitId};
    use anyhow::bail;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn read_export(path: &Path) -> Result<ExportData> {
        let content = fs::read_to_string(path)?;
        let data: ExportData = serde_json::from_str(&content)?;
        if data.lecturebank_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.lecturebank_export_version,
                EXPORT_VERSION
            );
        }
        Ok(data)
    }

    fn sample() -> QuestionSet {
        QuestionSet {
            id: SetId::new("42"),
            topic: "Cell biology / intro".to_string(),
            style: QuestionStyle::MultipleChoice,
            questions: vec![Question {
                id: QuestionId::new("q1"),
                prompt: "Powerhouse of the cell?".to_string(),
                kind: QuestionKind::MultipleChoice {
                    options: vec!["Nucleus".to_string(), "Mitochondria".to_string()],
                    correct: "Mitochondria".to_string(),
                },
            }],
        }
    }

    #[test]
    fn file_name_is_sanitized() {
        assert_eq!(
            Exporter::file_name(&sample(), ExportFormat::Json),
            "Cell_biology___intro-42.json"
        );
        let mut blank = sample();
        blank.topic = "  ".to_string();
        assert_eq!(Exporter::file_name(&blank, ExportFormat::Markdown), "set-42.md");
    }

    #[test]
    fn json_export_reads_back() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path().join("nested"));
        let unit = Unit {
            id: UnitId::new("7"),
            title: "Biology".to_string(),
        };
        let path = exporter
            .export(&sample(), Some(&unit), ExportFormat::Json)
            .unwrap();
        let data = read_export(&path).unwrap();
        assert_eq!(data.set, sample());
        assert_eq!(data.unit, Some(unit));
        assert_eq!(data.lecturebank_export_version, EXPORT_VERSION);
    }

    #[test]
    fn export_leaves_no_tmp_files() {
        let dir = TempDir::new().unwrap();
        let exporter = Exporter::new(dir.path());
        exporter.export(&sample(), None, ExportFormat::Markdown).unwrap();
        exporter.export(&sample(), None, ExportFormat::Markdown).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["Cell_biology___intro-42.md".to_string()]);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.json");
        let data = ExportData {
            lecturebank_export_version: 99,
            exported_at: Utc::now(),
            unit: None,
            set: sample(),
        };
        fs::write(&path, serde_json::to_string(&data).unwrap()).unwrap();
        let err = read_export(&path).unwrap_err().to_string();
        assert!(err.contains("Unsupported export version"));
        assert!(err.contains("99"));
    }

    #[test]
    fn markdown_marks_correct_option() {
        let md = render_markdown(&sample(), None);
        assert!(md.starts_with("# Cell biology / intro\n"));
        assert!(md.contains("## 1. Powerhouse of the cell?"));
        assert!(md.contains("- [ ] Nucleus"));
        assert!(md.contains("- [x] Mitochondria"));
    }

    #[test]
    fn markdown_covers_other_styles() {
        let set = QuestionSet {
            id: SetId::new("1"),
            topic: "Osmosis".to_string(),
            style: QuestionStyle::OpenEnded,
            questions: vec![Question {
                id: QuestionId::new("q1"),
                prompt: "Define osmosis".to_string(),
                kind: QuestionKind::OpenEnded {
                    answer: "Diffusion of water".to_string(),
                },
            }],
        };
        assert!(render_markdown(&set, None).contains("> Diffusion of water"));
    }

    #[test]
    fn markdown_quotes_every_answer_line() {
        let set = QuestionSet {
            id: SetId::new("2"),
            topic: "Mitosis".to_string(),
            style: QuestionStyle::OpenEnded,
            questions: vec![Question {
                id: QuestionId::new("q1"),
                prompt: "List the phases".to_string(),
                kind: QuestionKind::OpenEnded {
                    answer: "Prophase\nMetaphase\nAnaphase".to_string(),
                },
            }],
        };
        let md = render_markdown(&set, None);
        assert!(md.ends_with("> Prophase\n> Metaphase\n> Anaphase\n"));
    }
}
