use convey_project::{CompilationOptions, MetadataReference};
use convey_syntax::TextRange;

/// Options that influence a conversion.
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Replaces the root namespace of the converted project.
    pub root_namespace_override: Option<String>,

    /// Compilation options of the converted project, the defaults of the target language are
    /// used when absent.
    pub target_compilation_options_override: Option<CompilationOptions>,

    /// When a non-empty span is selected only the code corresponding to the selection is
    /// returned.
    pub selected_text_span: Option<TextRange>,

    /// Libraries that standalone text may refer to.
    pub references: Vec<MetadataReference>,

    /// Compiles the source and converted project and reports their diagnostics as an
    /// additional result.
    pub show_compilation_errors: bool,
}

impl ConversionOptions {
    /// Returns the selected span if it is not empty.
    pub fn selection(&self) -> Option<TextRange> {
        self.selected_text_span.filter(|span| !span.is_empty())
    }
}
