use std::{fmt, io};

use convey_paths::AbsPathBuf;
use convey_project::{DocumentId, ManifestError};
use convey_syntax::TextRange;
use thiserror::Error;

/// A failure of the language that performs the conversion.
///
/// The error carries as much context as the language can provide so that the message recorded
/// against a document is enough to locate the problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct TranslationError {
    message: String,
    path: Option<AbsPathBuf>,
    range: Option<TextRange>,
    node_text: Option<String>,
}

impl TranslationError {
    pub fn new(message: impl Into<String>) -> Self {
        TranslationError {
            message: message.into(),
            path: None,
            range: None,
            node_text: None,
        }
    }

    pub fn with_path(mut self, path: Option<AbsPathBuf>) -> Self {
        self.path = path;
        self
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Attaches the text of the node that could not be translated.
    pub fn with_node_text(mut self, text: impl Into<String>) -> Self {
        self.node_text = Some(text.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> Option<&AbsPathBuf> {
        self.path.as_ref()
    }

    pub fn range(&self) -> Option<TextRange> {
        self.range
    }

    pub fn node_text(&self) -> Option<&str> {
        self.node_text.as_deref()
    }
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(path) = &self.path {
            write!(f, " in {path}")?;
        }
        if let Some(range) = self.range {
            write!(
                f,
                " at {}..{}",
                u32::from(range.start()),
                u32::from(range.end())
            )?;
        }
        if let Some(text) = &self.node_text {
            write!(f, "\nwhile translating: {text}")?;
        }
        Ok(())
    }
}

/// A failure that prevents a conversion from producing any result. Failures of individual
/// documents are never reported this way, they are recorded with the result of the document.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("could not build the reference only project")]
    ShadowBuild(#[source] TranslationError),
    #[error("could not parse the text to convert")]
    Parse(#[source] TranslationError),
    #[error("document {0:?} is not part of the project")]
    MissingDocument(DocumentId),
    #[error("could not determine the project directory")]
    ProjectDirectory(#[source] io::Error),
    #[error("could not rewrite the project manifest")]
    Manifest(#[from] ManifestError),
}

#[cfg(test)]
mod tests {
    use convey_paths::AbsPathBuf;
    use convey_syntax::TextRange;

    use super::TranslationError;

    #[test]
    fn display_includes_context() {
        let path = AbsPathBuf::assert(std::env::temp_dir()).join("a.sidl");
        let error = TranslationError::new("unexpected token")
            .with_path(Some(path.clone()))
            .with_range(TextRange::new(3.into(), 7.into()))
            .with_node_text("type");
        assert_eq!(
            error.to_string(),
            format!("unexpected token in {path} at 3..7\nwhile translating: type")
        );
    }
}
