use smol_str::SmolStr;
use text_size::TextSize;

/// The different kinds of trivia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    Comment,
}

/// A piece of text that is not significant to the grammar of a language but that is part of
/// the source text. Trivia is owned by the token that precedes or follows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trivia {
    kind: TriviaKind,
    text: SmolStr,
}

impl Trivia {
    pub fn new(kind: TriviaKind, text: impl Into<SmolStr>) -> Self {
        Trivia {
            kind,
            text: text.into(),
        }
    }

    pub fn whitespace(text: impl Into<SmolStr>) -> Self {
        Trivia::new(TriviaKind::Whitespace, text)
    }

    pub fn end_of_line(text: impl Into<SmolStr>) -> Self {
        Trivia::new(TriviaKind::EndOfLine, text)
    }

    pub fn comment(text: impl Into<SmolStr>) -> Self {
        Trivia::new(TriviaKind::Comment, text)
    }

    pub fn kind(&self) -> TriviaKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> TextSize {
        TextSize::of(self.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns true if removing this trivia would not lose anything but layout.
    pub fn is_whitespace_or_end_of_line(&self) -> bool {
        matches!(self.kind, TriviaKind::Whitespace | TriviaKind::EndOfLine)
    }
}
