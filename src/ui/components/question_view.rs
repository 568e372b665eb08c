use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::quiz::model::{QuestionKind, QuestionSet};
use crate::session::responses::{OptionMark, ResponseState};
use crate::ui::theme::Theme;

/// One question of the displayed set at a time, marked up from the
/// current responses.
pub struct QuestionView<'a> {
    pub set: &'a QuestionSet,
    pub responses: &'a ResponseState,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl QuestionView<'_> {
    fn header(&self) -> Line<'static> {
        let colors = &self.theme.colors;
        let score = self.responses.score(self.set);
        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.set.summary()),
                Style::default().fg(colors.muted()),
            ),
            Span::styled(
                format!(
                    " Question {}/{} ",
                    (self.selected + 1).min(self.set.questions.len()),
                    self.set.questions.len()
                ),
                Style::default().fg(colors.accent()),
            ),
        ];
        if score.gradable > 0 {
            spans.push(Span::styled(
                format!(" Score {}/{} ", score.correct, score.gradable),
                Style::default().fg(colors.success()),
            ));
        }
        Line::from(spans)
    }

    fn option_line(&self, key: usize, label: &str, mark: OptionMark) -> Line<'static> {
        let colors = &self.theme.colors;
        let (bullet, style, suffix) = match mark {
            OptionMark::Plain => ("( )", Style::default().fg(colors.fg()), ""),
            OptionMark::SelectedCorrect => (
                "(*)",
                Style::default()
                    .fg(colors.correct())
                    .add_modifier(Modifier::BOLD),
                "",
            ),
            OptionMark::SelectedIncorrect => (
                "(*)",
                Style::default()
                    .fg(colors.incorrect())
                    .add_modifier(Modifier::CROSSED_OUT),
                "",
            ),
            OptionMark::CorrectAnswer => (
                "( )",
                Style::default().fg(colors.correct()),
                "  (Correct answer)",
            ),
        };
        Line::from(Span::styled(
            format!("  [{key}] {bullet} {label}{suffix}"),
            style,
        ))
    }
}

impl Widget for QuestionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" {} ", self.set.topic),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);
        Paragraph::new(self.header()).render(layout[0], buf);

        let Some(question) = self.set.questions.get(self.selected) else {
            Paragraph::new(Span::styled(
                " This set has no questions.",
                Style::default().fg(colors.muted()),
            ))
            .render(layout[1], buf);
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!(" {}", question.prompt),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        match &question.kind {
            QuestionKind::OpenEnded { answer } => {
                if self.responses.is_revealed(&question.id) {
                    lines.push(Line::from(Span::styled(
                        "  Model answer:",
                        Style::default().fg(colors.muted()),
                    )));
                    lines.push(Line::from(Span::styled(
                        format!("  {answer}"),
                        Style::default().fg(colors.success()),
                    )));
                } else {
                    lines.push(Line::from(Span::styled(
                        "  [Space] Show answer",
                        Style::default().fg(colors.muted()),
                    )));
                }
            }
            _ => {
                for (i, (label, mark)) in self.responses.option_marks(question).iter().enumerate() {
                    lines.push(self.option_line(i + 1, label, *mark));
                }
            }
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(layout[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::{Question, QuestionId, QuestionStyle, SetId};

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn mc_set() -> QuestionSet {
        QuestionSet {
            id: SetId::new("s"),
            topic: "Cells".to_string(),
            style: QuestionStyle::MultipleChoice,
            questions: vec![Question {
                id: QuestionId::new("q1"),
                prompt: "Powerhouse?".to_string(),
                kind: QuestionKind::MultipleChoice {
                    options: vec!["Nucleus".to_string(), "Mitochondria".to_string()],
                    correct: "Mitochondria".to_string(),
                },
            }],
        }
    }

    fn render(set: &QuestionSet, responses: &ResponseState) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        QuestionView {
            set,
            responses,
            selected: 0,
            theme: &theme,
        }
        .render(area, &mut buf);
        text(&buf)
    }

    #[test]
    fn wrong_answer_shows_annotation() {
        let set = mc_set();
        let mut responses = ResponseState::for_set(&set);
        responses
            .select_option(&set.questions[0], "Nucleus")
            .unwrap();
        let out = render(&set, &responses);
        assert!(out.contains("Mitochondria  (Correct answer)"));
        assert!(out.contains("Score 0/1"));
    }

    #[test]
    fn right_answer_has_no_annotation() {
        let set = mc_set();
        let mut responses = ResponseState::for_set(&set);
        responses
            .select_option(&set.questions[0], "Mitochondria")
            .unwrap();
        let out = render(&set, &responses);
        assert!(!out.contains("(Correct answer)"));
        assert!(out.contains("Score 1/1"));
    }
}
