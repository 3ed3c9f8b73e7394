use std::str::Chars;

use convey_syntax::TextSize;

/// A view into the characters of a string that tracks how far it advanced.
pub(crate) struct Cursor<'s> {
    text: &'s str,
    len: TextSize,
}

impl<'s> Cursor<'s> {
    pub fn new(text: &'s str) -> Cursor<'s> {
        Cursor {
            text,
            len: 0.into(),
        }
    }

    /// The number of bytes consumed so far.
    pub fn into_len(self) -> TextSize {
        self.len
    }

    pub fn current(&self) -> Option<char> {
        self.chars().next()
    }

    pub fn matches(&self, c: char) -> bool {
        self.current() == Some(c)
    }

    /// Move to the next character
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.chars().next()?;
        self.len += TextSize::of(ch);
        Some(ch)
    }

    /// Moves to the next character as long as `predicate` is satisfied.
    pub fn bump_while<F: Fn(char) -> bool>(&mut self, predicate: F) {
        while let Some(c) = self.current() {
            if !predicate(c) {
                return;
            }
            self.bump();
        }
    }

    /// Returns the text consumed so far.
    pub fn current_token_text(&self) -> &str {
        let len: u32 = self.len.into();
        &self.text[..len as usize]
    }

    fn chars(&self) -> Chars<'_> {
        let len: u32 = self.len.into();
        self.text[len as usize..].chars()
    }
}
