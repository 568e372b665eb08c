use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which text field currently has focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputField {
    UnitTitle,
    Topic,
    UploadPath,
    Search,
}

impl InputField {
    pub fn title(self) -> &'static str {
        match self {
            InputField::UnitTitle => "New unit title",
            InputField::Topic => "Topic",
            InputField::UploadPath => "Document to upload",
            InputField::Search => "Search topics",
        }
    }

    pub fn completes_paths(self) -> bool {
        self == InputField::UploadPath
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Single-line editor. Tab cycles through filesystem completions when the
/// field takes a path.
pub struct LineInput {
    field: InputField,
    text: String,
    /// Char index, not byte offset.
    cursor: usize,
    completions: Vec<String>,
    completion_index: Option<usize>,
    pub completion_error: bool,
}

impl LineInput {
    pub fn new(field: InputField, text: &str) -> Self {
        Self {
            field,
            text: text.to_string(),
            cursor: text.chars().count(),
            completions: Vec::new(),
            completion_index: None,
            completion_error: false,
        }
    }

    pub fn field(&self) -> InputField {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    /// `(before_cursor, cursor_char, after_cursor)` for styled rendering.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let at = self.byte_at(self.cursor);
        match self.text[at..].chars().next() {
            Some(ch) => (&self.text[..at], Some(ch), &self.text[at + ch.len_utf8()..]),
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            self.reset_completion();
        }
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_at(self.cursor);
            }
            KeyCode::Delete => self.remove_at(self.cursor),
            KeyCode::Tab if self.field.completes_paths() => self.tab_complete(true),
            KeyCode::BackTab if self.field.completes_paths() => self.tab_complete(false),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => {
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(ch) if !ctrl => {
                let at = self.byte_at(self.cursor);
                self.text.insert(at, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn remove_at(&mut self, char_idx: usize) {
        let at = self.byte_at(char_idx);
        if let Some(ch) = self.text[at..].chars().next() {
            self.text.replace_range(at..at + ch.len_utf8(), "");
        }
    }

    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let (start, end) = (self.byte_at(pos), self.byte_at(self.cursor));
        self.text.replace_range(start..end, "");
        self.cursor = pos;
    }

    fn reset_completion(&mut self) {
        self.completions.clear();
        self.completion_index = None;
        self.completion_error = false;
    }

    fn tab_complete(&mut self, forward: bool) {
        if self.cursor < self.len() {
            return;
        }
        let next = match self.completion_index {
            None => {
                self.completions = self.build_completions();
                if self.completions.is_empty() {
                    return;
                }
                0
            }
            Some(idx) => {
                let count = self.completions.len();
                if forward {
                    (idx + 1) % count
                } else {
                    (idx + count - 1) % count
                }
            }
        };
        self.completion_index = Some(next);
        self.text = self.completions[next].clone();
        self.cursor = self.len();
    }

    fn build_completions(&mut self) -> Vec<String> {
        let seed = self.text.clone();
        let (dir_str, partial) = match seed.rfind(['/', '\\']) {
            Some(pos) => (&seed[..=pos], &seed[pos + 1..]),
            None => ("", seed.as_str()),
        };

        let lookup_dir = match dir_str.strip_prefix('~') {
            Some(rest) => match dirs::home_dir() {
                Some(home) => format!("{}{}", home.to_string_lossy(), rest),
                None => dir_str.to_string(),
            },
            None if dir_str.is_empty() => ".".to_string(),
            None => dir_str.to_string(),
        };

        let entries = match std::fs::read_dir(&lookup_dir) {
            Ok(rd) => rd,
            Err(_) => {
                self.completion_error = true;
                return Vec::new();
            }
        };
        let entries = entries.map(|result| {
            result.map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
                (name, is_dir)
            })
        });
        self.collect_completions(entries, dir_str, partial)
    }

    /// Directories first, then files, each alphabetical. Hidden entries only
    /// when `partial` starts with a dot.
    fn collect_completions(
        &mut self,
        entries: impl Iterator<Item = std::io::Result<(String, bool)>>,
        dir_str: &str,
        partial: &str,
    ) -> Vec<String> {
        let include_hidden = partial.starts_with('.');
        let mut candidates: Vec<(bool, String)> = Vec::new();

        for entry in entries.take(1000) {
            let Ok((name, is_dir)) = entry else {
                self.completion_error = true;
                return Vec::new();
            };
            if (!include_hidden && name.starts_with('.')) || !name.starts_with(partial) {
                continue;
            }
            let full = if is_dir {
                format!("{dir_str}{name}{}", std::path::MAIN_SEPARATOR)
            } else {
                format!("{dir_str}{name}")
            };
            candidates.push((is_dir, full));
        }

        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        candidates.truncate(100);
        candidates.into_iter().map(|(_, path)| path).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_str(input: &mut LineInput, s: &str) {
        for ch in s.chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_and_editing() {
        let mut input = LineInput::new(InputField::Topic, "");
        type_str(&mut input, "Photosynthesis");
        assert_eq!(input.value(), "Photosynthesis");
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "Photosynthesi");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "hotosynthesi");
    }

    #[test]
    fn multibyte_cursor_moves() {
        let mut input = LineInput::new(InputField::Topic, "été");
        input.handle(key(KeyCode::Left));
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "éé");
        assert_eq!(input.render_parts(), ("é", Some('é'), ""));
    }

    #[test]
    fn ctrl_shortcuts() {
        let mut input = LineInput::new(InputField::Search, "cell biology");
        input.handle(ctrl('w'));
        assert_eq!(input.value(), "cell ");
        input.handle(ctrl('u'));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn enter_and_esc() {
        let mut input = LineInput::new(InputField::UnitTitle, "x");
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
    }

    #[test]
    fn tab_is_ignored_outside_path_fields() {
        let mut input = LineInput::new(InputField::Topic, "");
        input.handle(key(KeyCode::Tab));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn path_completion_cycles_dirs_first() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("lectures")).unwrap();
        fs::write(dir.path().join("lab.pdf"), b"x").unwrap();
        fs::write(dir.path().join(".hidden"), b"x").unwrap();

        let seed = format!("{}/l", dir.path().display());
        let mut input = LineInput::new(InputField::UploadPath, &seed);
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with(&format!("lectures{}", std::path::MAIN_SEPARATOR)));
        input.handle(key(KeyCode::Tab));
        assert!(input.value().ends_with("lab.pdf"));
        input.handle(key(KeyCode::BackTab));
        assert!(input.value().contains("lectures"));
    }

    #[test]
    fn completion_error_on_missing_dir() {
        let mut input = LineInput::new(InputField::UploadPath, "/definitely/not/here/x");
        input.handle(key(KeyCode::Tab));
        assert!(input.completion_error);
        assert_eq!(input.value(), "/definitely/not/here/x");
    }

    #[test]
    fn read_error_aborts_completion() {
        let mut input = LineInput::new(InputField::UploadPath, "");
        let entries = vec![
            Ok(("a.pdf".to_string(), false)),
            Err(std::io::Error::other("boom")),
        ];
        let out = input.collect_completions(entries.into_iter(), "", "");
        assert!(out.is_empty());
        assert!(input.completion_error);
    }
}
