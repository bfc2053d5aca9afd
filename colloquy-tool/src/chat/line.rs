/// Single-line text buffer with a byte-offset cursor on char boundaries.
#[derive(Debug, Default, Clone)]
pub struct LineInput {
    pub text: String,
    pub cursor_pos: usize,
}

impl LineInput {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor_pos = 0;
    }

    /// Cursor column in characters, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor_pos].chars().count()
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            let prev_char_boundary = self.text[..self.cursor_pos]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.remove(prev_char_boundary);
            self.cursor_pos = prev_char_boundary;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor_pos < self.text.len() {
            self.text.remove(self.cursor_pos);
        }
    }

    pub fn left(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos = self.text[..self.cursor_pos]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn right(&mut self) {
        if self.cursor_pos < self.text.len() {
            self.cursor_pos = self.text[self.cursor_pos..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_pos + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn end(&mut self) {
        self.cursor_pos = self.text.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> LineInput {
        let mut input = LineInput::default();
        for c in s.chars() {
            input.insert(c);
        }
        input
    }

    #[test]
    fn test_editing_multibyte() {
        let mut input = typed("héllo");
        input.left();
        input.left();
        input.left();
        input.left();
        assert_eq!(input.cursor_column(), 1);

        input.delete();
        assert_eq!(input.text, "hllo");

        input.insert('ë');
        input.backspace();
        input.backspace();
        assert_eq!(input.text, "llo");
        assert_eq!(input.cursor_pos, 0);
    }

    #[test]
    fn test_home_end_and_clear() {
        let mut input = typed("abc");
        input.home();
        input.insert('>');
        assert_eq!(input.text, ">abc");
        input.end();
        input.right();
        assert_eq!(input.cursor_pos, 4);
        input.clear();
        assert!(input.is_empty());
        assert_eq!(input.cursor_pos, 0);
    }
}
