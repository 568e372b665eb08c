use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::quiz::model::Unit;
use crate::ui::theme::Theme;

/// The unit directory: a title banner and one row per unit.
pub struct UnitList<'a> {
    pub units: &'a [Unit],
    pub selected: usize,
    pub loading: bool,
    pub theme: &'a Theme,
}

impl<'a> UnitList<'a> {
    pub fn new(units: &'a [Unit], selected: usize, loading: bool, theme: &'a Theme) -> Self {
        Self {
            units,
            selected,
            loading,
            theme,
        }
    }
}

impl Widget for UnitList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "lecturebank",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Quiz yourself on your lectures",
                Style::default().fg(colors.accent_dim()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        if self.units.is_empty() {
            let msg = if self.loading {
                "Loading units..."
            } else {
                "No units yet. Press [n] to create one."
            };
            Paragraph::new(Line::from(Span::styled(
                msg,
                Style::default().fg(colors.muted()),
            )))
            .alignment(Alignment::Center)
            .render(layout[1], buf);
            return;
        }

        // Keep the selection on screen.
        let rows = layout[1].height as usize;
        let offset = (self.selected + 1).saturating_sub(rows);

        let lines: Vec<Line> = self
            .units
            .iter()
            .enumerate()
            .skip(offset)
            .take(rows)
            .map(|(i, unit)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let style = if is_selected {
                    Style::default()
                        .fg(colors.accent())
                        .bg(colors.selected_bg())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(Span::styled(format!(" {indicator} {}", unit.title), style))
            })
            .collect();
        Paragraph::new(lines).render(layout[1], buf);
    }
}
