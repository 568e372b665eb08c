use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::engine::upload::{UploadPhase, UploadTracker};
use crate::ui::theme::Theme;

/// Bordered upload gauge. The title carries the file name and phase.
pub struct ProgressBar<'a> {
    pub tracker: &'a UploadTracker,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(tracker: &'a UploadTracker, theme: &'a Theme) -> Self {
        Self { tracker, theme }
    }

    fn title(&self) -> String {
        let file = self
            .tracker
            .file()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string());
        match (self.tracker.phase(), file) {
            (UploadPhase::Idle, _) | (_, None) => " Upload: no file ".to_string(),
            (UploadPhase::Uploading, Some(f)) => format!(" Uploading {f} "),
            (UploadPhase::Done, Some(f)) => format!(" Uploaded {f} "),
            (UploadPhase::Failed(_), Some(f)) => format!(" Failed: {f} "),
        }
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = match self.tracker.phase() {
            UploadPhase::Done => colors.success(),
            UploadPhase::Failed(_) => colors.error(),
            _ => colors.border(),
        };

        let block = Block::bordered()
            .title(self.title())
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let ratio = self.tracker.ratio().clamp(0.0, 1.0);
        let filled_width = (ratio * inner.width as f64) as u16;
        let label = match self.tracker.phase() {
            UploadPhase::Failed(msg) => msg.clone(),
            _ => format!("{}%", self.tracker.progress()),
        };

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label: String = label.chars().take(inner.width as usize).collect();
        let label_x = inner.x + inner.width.saturating_sub(label.chars().count() as u16) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tag::RequestTag;
    use crate::engine::upload::UploadEvent;
    use crate::quiz::model::UnitId;
    use std::path::PathBuf;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn renders_percentage_and_file_name() {
        let theme = Theme::default();
        let mut tracker = UploadTracker::default();
        let tag = RequestTag {
            unit: UnitId::new("1"),
            seq: 1,
        };
        tracker.start(tag.clone(), PathBuf::from("/tmp/notes.pdf")).unwrap();
        tracker.apply(&tag, UploadEvent::Progress(50));

        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        ProgressBar::new(&tracker, &theme).render(area, &mut buf);
        assert!(row(&buf, 0).contains("Uploading notes.pdf"));
        assert!(row(&buf, 1).contains("50%"));
    }
}
