use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::quiz::model::QuestionSet;
use crate::ui::layout::centered_rect;
use crate::ui::theme::Theme;

/// Previously generated sets for the active unit, with an optional y/n
/// delete confirmation over the top.
pub struct HistoryList<'a> {
    pub sets: &'a [&'a QuestionSet],
    pub selected: usize,
    pub search_term: &'a str,
    pub loading: bool,
    pub confirm_delete: bool,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl Widget for HistoryList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = if self.loading {
            " Question Sets (loading...) ".to_string()
        } else {
            format!(" Question Sets ({}) ", self.sets.len())
        };
        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                title,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let filter_line = if self.search_term.is_empty() {
            Line::from(Span::styled(
                " [/] filter by topic",
                Style::default().fg(colors.muted()),
            ))
        } else {
            Line::from(vec![
                Span::styled(" filter: ", Style::default().fg(colors.muted())),
                Span::styled(self.search_term, Style::default().fg(colors.warning())),
            ])
        };
        Paragraph::new(filter_line).render(layout[0], buf);

        if self.sets.is_empty() {
            let msg = if self.search_term.is_empty() {
                " No question sets yet. Generate some!"
            } else {
                " No topics match."
            };
            Paragraph::new(Line::from(Span::styled(
                msg,
                Style::default().fg(colors.muted()),
            )))
            .render(layout[1], buf);
        } else {
            let rows = (layout[1].height as usize / 2).max(1);
            let offset = (self.selected + 1).saturating_sub(rows);
            let mut lines = Vec::new();
            for (i, set) in self.sets.iter().enumerate().skip(offset).take(rows) {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let topic_style = if is_selected {
                    Style::default()
                        .fg(colors.accent())
                        .bg(colors.selected_bg())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                lines.push(Line::from(Span::styled(
                    format!(" {indicator} {}", set.topic),
                    topic_style,
                )));
                lines.push(Line::from(Span::styled(
                    format!("     {}", set.summary()),
                    Style::default().fg(colors.muted()),
                )));
            }
            Paragraph::new(lines).render(layout[1], buf);
        }

        if self.confirm_delete {
            let topic = self
                .sets
                .get(self.selected)
                .map(|s| s.topic.as_str())
                .unwrap_or("this set");
            let text = format!("Delete \"{topic}\"? (y/n)");
            let width = (text.chars().count() as u16 + 6).max(30);
            let dialog_area = centered_rect(width, 5, area);

            Clear.render(dialog_area, buf);
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {text}  "),
                    Style::default().fg(colors.fg()),
                )),
            ])
            .style(Style::default().bg(colors.bg()))
            .block(
                Block::bordered()
                    .title(" Confirm ")
                    .border_style(Style::default().fg(colors.error()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(dialog_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::{QuestionStyle, SetId};

    fn set(id: &str, topic: &str) -> QuestionSet {
        QuestionSet {
            id: SetId::new(id),
            topic: topic.to_string(),
            style: QuestionStyle::TrueFalse,
            questions: Vec::new(),
        }
    }

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn lists_topics_and_confirm_dialog() {
        let theme = Theme::default();
        let a = set("1", "Cells");
        let b = set("2", "Atoms");
        let sets = vec![&a, &b];
        let area = Rect::new(0, 0, 50, 12);
        let mut buf = Buffer::empty(area);
        HistoryList {
            sets: &sets,
            selected: 1,
            search_term: "",
            loading: false,
            confirm_delete: true,
            focused: true,
            theme: &theme,
        }
        .render(area, &mut buf);
        let out = text(&buf);
        assert!(out.contains("Question Sets (2)"));
        assert!(out.contains("Cells"));
        assert!(out.contains("Delete \"Atoms\"? (y/n)"));
    }
}
