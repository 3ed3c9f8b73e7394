use convey_paths::AbsPathBuf;

/// The outcome of converting a single file.
///
/// A result is produced for every converted document, also when conversion failed; in that case
/// `converted_code` may be absent and `errors` describes what went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionResult {
    pub source_path: Option<AbsPathBuf>,
    pub target_path: Option<AbsPathBuf>,
    pub converted_code: Option<String>,
    pub errors: Vec<String>,
}

impl ConversionResult {
    /// Returns true if the result carries code that is not just whitespace.
    pub fn has_code(&self) -> bool {
        self.converted_code
            .as_deref()
            .map_or(false, |code| !code.trim().is_empty())
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
