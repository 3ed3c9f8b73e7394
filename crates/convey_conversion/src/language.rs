use convey_paths::AbsPathBuf;
use convey_project::{CompilationOptions, Document, Project};
use convey_syntax::{ElementId, SyntaxTree, TextRange};

use crate::{ConversionOptions, FatalErrorHook, TranslationError};

/// The compilation of the reference only project that shows how the symbols of the source
/// project look in the target language.
#[derive(Debug)]
pub struct ShadowCompilation<C> {
    /// The reference only project
    pub project: Project,
    pub compilation: C,
}

/// A pair of languages that documents can be converted between.
///
/// The conversion machinery treats an implementation as an opaque service that might fail, or
/// panic, on any call. Failures are recorded against the document that was being converted.
pub trait LanguageConversion: Send + Sync + 'static {
    /// The semantic model of a compiled project.
    type Compilation: Send + Sync + 'static;

    /// Compilation options of a standalone source document.
    fn source_compilation_options(&self) -> CompilationOptions;

    /// The default compilation options of converted projects.
    fn target_compilation_options(&self) -> CompilationOptions;

    /// Compiles all documents of `project` according to the options of the project.
    fn compile(&self, project: &Project) -> Result<Self::Compilation, TranslationError>;

    /// Returns a human readable description of every problem found during compilation.
    fn compilation_diagnostics(&self, compilation: &Self::Compilation) -> Vec<String>;

    /// Parses a document that has no syntax tree yet.
    fn parse(&self, document: &Document) -> Result<SyntaxTree, TranslationError>;

    /// Parses a snippet of source code. A snippet may be wrapped to form a complete document,
    /// in which case the range of the original snippet within the returned tree is returned as
    /// well.
    fn parse_standalone(
        &self,
        text: &str,
        options: &ConversionOptions,
    ) -> Result<(SyntaxTree, Option<TextRange>), TranslationError>;

    /// Translates a source document into a target language tree, resolving symbols through the
    /// shadow compilation.
    fn first_pass(
        &self,
        document: &Document,
        shadow: &ShadowCompilation<Self::Compilation>,
    ) -> Result<SyntaxTree, TranslationError>;

    /// Improves a translated document now that the project contains every translated document.
    fn second_pass(&self, document: &Document) -> Result<Document, TranslationError>;

    /// Normalizes the layout of a translated tree.
    fn format(&self, tree: &SyntaxTree) -> SyntaxTree {
        convey_syntax::format(tree)
    }

    /// Returns the children of `node` that carry meaning, used to unwrap nodes that were
    /// introduced around a selection.
    fn find_single_important_child(&self, tree: &SyntaxTree, node: ElementId) -> Vec<ElementId>;

    /// The places where the language reports faults it cannot recover from.
    fn fatal_error_hooks(&self) -> &'static [&'static FatalErrorHook] {
        &[]
    }

    /// Additional documents to add to a converted project, identified by their target path.
    /// `converted` has the target compilation options but none of the converted documents.
    fn supplementary_documents(&self, _converted: &Project) -> Vec<(AbsPathBuf, SyntaxTree)> {
        Vec::new()
    }

    /// The path of the converted document for a source document.
    fn target_path(&self, source_path: &AbsPathBuf) -> AbsPathBuf;

    /// The path of the converted manifest.
    fn target_manifest_path(&self, manifest_path: &AbsPathBuf) -> AbsPathBuf {
        manifest_path.clone()
    }

    /// Applies language specific changes to the rewritten manifest.
    fn post_transform_manifest(&self, text: String) -> String {
        text
    }

    /// The extensions of documents that manifests of converted projects declare as compile
    /// items.
    fn manifest_compile_extensions(&self) -> &'static [&'static str];
}
