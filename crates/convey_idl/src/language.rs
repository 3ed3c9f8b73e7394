use std::ops::Range;

use convey_conversion::{
    ConversionOptions, FatalErrorHook, LanguageConversion, ShadowCompilation, TranslationError,
};
use convey_paths::AbsPathBuf;
use convey_project::{CompilationOptions, Document, Project};
use convey_syntax::{ElementId, SyntaxTree, TextRange, TextSize};

use crate::{
    ast::type_defs,
    compilation::project_dialect,
    parse,
    simplify::simplify,
    syntax_kind::{FIELD, TYPE_DEF},
    translate::translate,
    Dialect, IdlCompilation, ParseError,
};

/// Reports faults of the second pass that leave a document in an unknown state.
pub static SIMPLIFIER_FAULTS: FatalErrorHook = FatalErrorHook::new("pascal simplifier");
static FATAL_ERROR_HOOKS: [&FatalErrorHook; 1] = [&SIMPLIFIER_FAULTS];

const SNIPPET_PREFIX: &str = "type __snippet {\n";
const SNIPPET_SUFFIX: &str = "\n}\n";
const NAMESPACE_FILE_NAME: &str = "Namespace.pidl";

/// Converts snake record definitions into pascal record definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlConversion;

impl IdlConversion {
    pub fn new() -> Self {
        IdlConversion
    }

    fn tree(&self, document: &Document) -> Result<SyntaxTree, TranslationError> {
        match document.syntax_tree() {
            Some(tree) => Ok(tree.clone()),
            None => self.parse(document),
        }
    }
}

impl LanguageConversion for IdlConversion {
    type Compilation = IdlCompilation;

    fn source_compilation_options(&self) -> CompilationOptions {
        CompilationOptions::new(Dialect::Snake.language())
    }

    fn target_compilation_options(&self) -> CompilationOptions {
        CompilationOptions::new(Dialect::Pascal.language()).with_language_version("1.0")
    }

    fn compile(&self, project: &Project) -> Result<IdlCompilation, TranslationError> {
        IdlCompilation::compile(project)
    }

    fn compilation_diagnostics(&self, compilation: &IdlCompilation) -> Vec<String> {
        compilation.diagnostics()
    }

    fn parse(&self, document: &Document) -> Result<SyntaxTree, TranslationError> {
        let dialect = project_dialect(document.project())?;
        parse(document.text(), dialect)
            .ok()
            .map_err(|error| syntax_error(document.file_path().cloned(), document.text(), error))
    }

    /// A snippet that is not a list of type definitions is parsed as the fields of a type.
    fn parse_standalone(
        &self,
        text: &str,
        _options: &ConversionOptions,
    ) -> Result<(SyntaxTree, Option<TextRange>), TranslationError> {
        let definitions = parse(text, Dialect::Snake);
        if definitions.errors().is_empty() && !type_defs(definitions.tree()).is_empty() {
            return Ok((definitions.tree().clone(), None));
        }

        let wrapped = format!("{SNIPPET_PREFIX}{text}{SNIPPET_SUFFIX}");
        let tree = parse(&wrapped, Dialect::Snake)
            .ok()
            .map_err(|error| syntax_error(None, &wrapped, error))?;
        let span = TextRange::at(TextSize::of(SNIPPET_PREFIX), TextSize::of(text));
        Ok((tree, Some(span)))
    }

    fn first_pass(
        &self,
        document: &Document,
        shadow: &ShadowCompilation<IdlCompilation>,
    ) -> Result<SyntaxTree, TranslationError> {
        let dialect = project_dialect(document.project())?;
        if dialect != Dialect::Snake {
            return Err(TranslationError::new(format!(
                "cannot convert {} documents",
                dialect.language()
            ))
            .with_path(document.file_path().cloned()));
        }
        let tree = self.tree(document)?;
        Ok(translate(&tree, &shadow.compilation))
    }

    fn second_pass(&self, document: &Document) -> Result<Document, TranslationError> {
        let compilation = IdlCompilation::compile(document.project())?;
        let tree = self.tree(document)?;
        let simplified = simplify(&tree, &compilation, document.name())
            .map_err(|error| error.with_path(document.file_path().cloned()))?;
        Ok(document.with_syntax_tree(simplified))
    }

    fn find_single_important_child(&self, tree: &SyntaxTree, node: ElementId) -> Vec<ElementId> {
        tree.child_nodes(node)
            .filter(|&child| matches!(tree.kind(child), FIELD | TYPE_DEF))
            .collect()
    }

    fn fatal_error_hooks(&self) -> &'static [&'static FatalErrorHook] {
        &FATAL_ERROR_HOOKS
    }

    /// A converted project with a root namespace gets a document that records it.
    fn supplementary_documents(&self, project: &Project) -> Vec<(AbsPathBuf, SyntaxTree)> {
        let Some(namespace) = &project.options().root_namespace else {
            return Vec::new();
        };
        let directory = match project.directory_path() {
            Ok(directory) => directory,
            Err(error) => {
                log::warn!("cannot place the namespace document of '{}': {error}", project.name());
                return Vec::new();
            }
        };
        let text = format!("// Root namespace: {namespace}\n");
        vec![(
            directory.join(NAMESPACE_FILE_NAME),
            parse(&text, Dialect::Pascal).tree().clone(),
        )]
    }

    fn target_path(&self, source_path: &AbsPathBuf) -> AbsPathBuf {
        AbsPathBuf::assert(source_path.with_extension(Dialect::Pascal.extension()))
    }

    fn target_manifest_path(&self, manifest_path: &AbsPathBuf) -> AbsPathBuf {
        let extension = manifest_path.extension().and_then(|extension| extension.to_str());
        if extension == Some(Dialect::Snake.manifest_extension()) {
            AbsPathBuf::assert(manifest_path.with_extension(Dialect::Pascal.manifest_extension()))
        } else {
            manifest_path.clone()
        }
    }

    /// Compile items refer to the converted documents, the manifest declares the pascal
    /// dialect.
    fn post_transform_manifest(&self, text: String) -> String {
        text.replace(".sidl\"", ".pidl\"").replace(
            "<Language>snake</Language>",
            "<Language>pascal</Language>",
        )
    }

    fn manifest_compile_extensions(&self) -> &'static [&'static str] {
        &["sidl", "pidl"]
    }
}

fn syntax_error(path: Option<AbsPathBuf>, text: &str, error: ParseError) -> TranslationError {
    let node_text = text
        .get(Range::<usize>::from(error.range))
        .unwrap_or_default()
        .to_owned();
    TranslationError::new(format!("syntax error: {error}"))
        .with_path(path)
        .with_range(error.range)
        .with_node_text(node_text)
}
