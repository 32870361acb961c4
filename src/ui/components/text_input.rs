use crossterm::event::KeyCode;

/// Single line text field with a cursor.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TextInput {
    value: String,
    /// Cursor position in chars.
    cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                let at = self.byte_offset(self.cursor - 1);
                self.value.remove(at);
                self.cursor -= 1;
            }
            KeyCode::Delete if self.cursor < self.value.chars().count() => {
                let at = self.byte_offset(self.cursor);
                self.value.remove(at);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.value.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => {}
        }
    }

    /// The value with a `|` marking the cursor.
    pub fn display_with_cursor(&self) -> String {
        let at = self.byte_offset(self.cursor);
        format!("{}|{}", &self.value[..at], &self.value[at..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TextInput {
        let mut input = TextInput::default();
        for c in text.chars() {
            input.handle_key(KeyCode::Char(c));
        }
        input
    }

    #[test]
    fn typing_appends_at_cursor() {
        let mut input = typed("helo");
        input.handle_key(KeyCode::Left);
        input.handle_key(KeyCode::Char('l'));
        assert_eq!(input.value(), "hello");
        assert_eq!(input.display_with_cursor(), "hell|o");
    }

    #[test]
    fn backspace_and_delete_respect_cursor() {
        let mut input = typed("₦250");
        input.handle_key(KeyCode::Home);
        input.handle_key(KeyCode::Backspace);
        input.handle_key(KeyCode::Delete);
        assert_eq!(input.value(), "250");
        input.handle_key(KeyCode::End);
        input.handle_key(KeyCode::Backspace);
        assert_eq!(input.value(), "25");
    }

    #[test]
    fn whitespace_counts_as_blank() {
        assert!(typed("   ").is_blank());
        assert!(!TextInput::new("x").is_blank());
    }
}
