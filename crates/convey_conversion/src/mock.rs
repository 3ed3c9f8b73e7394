use std::iter;

use convey_paths::AbsPathBuf;
use convey_project::{CompilationOptions, Document, Project};
use convey_syntax::{
    Annotation, ElementId, SmolStr, SyntaxKind, SyntaxTree, SyntaxTreeBuilder, TextRange,
    TextSize, Trivia,
};
use rustc_hash::FxHashSet;

use crate::{
    ConversionOptions, EngineFault, FatalErrorHook, LanguageConversion, ShadowCompilation,
    TranslationError,
};

pub(crate) const ROOT: SyntaxKind = SyntaxKind(0);
pub(crate) const LINE: SyntaxKind = SyntaxKind(1);
pub(crate) const WORD: SyntaxKind = SyntaxKind(2);
pub(crate) const BLOCK: SyntaxKind = SyntaxKind(3);
pub(crate) const END: SyntaxKind = SyntaxKind(4);

pub(crate) static MOCK_FAULTS: FatalErrorHook = FatalErrorHook::new("mock engine");
static MOCK_HOOKS: [&FatalErrorHook; 1] = [&MOCK_FAULTS];

/// A language in which a document is a list of lines of words. Converting a document turns
/// every word into upper case. Some words change the behavior of the conversion:
///
/// * `def:x` defines the symbol `x`, `ref:x` refers to it. A reference that cannot be resolved
///   through the shadow compilation is annotated with an error. The second pass replaces
///   references to symbols defined in the converted project by the name of the symbol.
/// * `panic` and `fail` make the first pass panic or fail.
/// * `crash` makes the second pass report a fatal fault, `oops` makes it panic.
/// * `bad` is reported as a compilation diagnostic.
#[derive(Debug, Default)]
pub(crate) struct MockLanguage {
    failing_compile: bool,
    panicking_compile: bool,
    supplementary: bool,
    panicking_supplementary: bool,
}

#[derive(Debug, Default)]
pub(crate) struct MockCompilation {
    definitions: FxHashSet<String>,
    diagnostics: Vec<String>,
}

impl MockLanguage {
    pub fn with_failing_compile(mut self) -> Self {
        self.failing_compile = true;
        self
    }

    pub fn with_panicking_compile(mut self) -> Self {
        self.panicking_compile = true;
        self
    }

    /// Contributes a generated document to every converted project.
    pub fn with_supplementary_document(mut self) -> Self {
        self.supplementary = true;
        self
    }

    pub fn with_panicking_supplementary_documents(mut self) -> Self {
        self.panicking_supplementary = true;
        self
    }
}

impl LanguageConversion for MockLanguage {
    type Compilation = MockCompilation;

    fn source_compilation_options(&self) -> CompilationOptions {
        CompilationOptions::new("mock-source")
    }

    fn target_compilation_options(&self) -> CompilationOptions {
        CompilationOptions::new("mock-target").with_language_version("2")
    }

    fn compile(&self, project: &Project) -> Result<MockCompilation, TranslationError> {
        if self.panicking_compile {
            panic!("the mock compiler panicked");
        }
        if self.failing_compile {
            return Err(TranslationError::new(format!(
                "cannot compile {}",
                project.name()
            )));
        }

        let referenced = project
            .project_references()
            .iter()
            .filter_map(|&id| project.solution().project(id));
        let mut compilation = MockCompilation::default();
        for project in iter::once(project.clone()).chain(referenced) {
            for document in project.documents() {
                for word in document.text().split_whitespace() {
                    let lower = word.to_ascii_lowercase();
                    if let Some(name) = lower.strip_prefix("def:") {
                        compilation.definitions.insert(name.to_owned());
                    }
                    if lower == "bad" {
                        compilation
                            .diagnostics
                            .push(format!("{}: bad word", document.name()));
                    }
                }
            }
        }
        Ok(compilation)
    }

    fn compilation_diagnostics(&self, compilation: &MockCompilation) -> Vec<String> {
        compilation.diagnostics.clone()
    }

    fn parse(&self, document: &Document) -> Result<SyntaxTree, TranslationError> {
        Ok(parse_text(document.text()))
    }

    /// Wraps the snippet in `begin` and `end` lines.
    fn parse_standalone(
        &self,
        text: &str,
        _options: &ConversionOptions,
    ) -> Result<(SyntaxTree, Option<TextRange>), TranslationError> {
        let snippet = parse_text(&format!("{text}\n"));
        let mut builder = SyntaxTreeBuilder::new();
        builder.start_node(ROOT);
        builder.start_node(LINE);
        builder.token_with_trivia(WORD, "begin", Vec::new(), vec![Trivia::end_of_line("\n")]);
        builder.finish_node();
        builder.start_node(BLOCK);
        for &child in snippet.children(snippet.root()) {
            builder.copy_element(&snippet, child);
        }
        builder.finish_node();
        builder.start_node(LINE);
        builder.token(WORD, "end");
        builder.finish_node();
        builder.finish_node();

        let start = TextSize::of("begin\n");
        let span = TextRange::at(start, TextSize::of(text));
        Ok((builder.finish(), Some(span)))
    }

    fn first_pass(
        &self,
        document: &Document,
        shadow: &ShadowCompilation<MockCompilation>,
    ) -> Result<SyntaxTree, TranslationError> {
        let tree = match document.syntax_tree() {
            Some(tree) => tree.clone(),
            None => self.parse(document)?,
        };

        let mut unresolved = Vec::new();
        for &token in tree.tokens() {
            let word = tree.token(token).map_or("", |token| token.text.as_str());
            match word {
                "panic" => panic!("the mock language panicked"),
                "fail" => {
                    return Err(TranslationError::new("cannot translate 'fail'")
                        .with_path(document.file_path().cloned())
                        .with_range(tree.range(token))
                        .with_node_text(word))
                }
                _ => {}
            }
            if let Some(name) = word.strip_prefix("ref:") {
                if !shadow.compilation.definitions.contains(name) {
                    unresolved.push((token, format!("unresolved reference to {name}")));
                }
            }
        }

        let converted = tree.map_tokens(|_, token| {
            token.text = SmolStr::from(token.text.to_uppercase());
        });
        Ok(unresolved
            .into_iter()
            .fold(converted, |tree, (token, message)| {
                tree.with_annotation(token, Annotation::conversion_error(message))
            }))
    }

    fn second_pass(&self, document: &Document) -> Result<Document, TranslationError> {
        let tree = match document.syntax_tree() {
            Some(tree) => tree.clone(),
            None => self.parse(document)?,
        };

        for &token in tree.tokens() {
            let word = tree.token(token).map_or("", |token| token.text.as_str());
            if word.eq_ignore_ascii_case("crash") {
                MOCK_FAULTS.report(EngineFault::new(format!(
                    "engine crashed in {}",
                    document.name()
                )));
                return Err(TranslationError::new("the engine crashed"));
            }
            if word.eq_ignore_ascii_case("oops") {
                panic!("the mock second pass panicked");
            }
        }

        let definitions = document
            .project()
            .documents()
            .flat_map(|document| {
                document
                    .text()
                    .split_whitespace()
                    .filter_map(|word| word.strip_prefix("DEF:").map(ToOwned::to_owned))
                    .collect::<Vec<_>>()
            })
            .collect::<FxHashSet<_>>();
        let tree = tree.map_tokens(|_, token| {
            let resolved = token
                .text
                .strip_prefix("REF:")
                .filter(|name| definitions.contains(*name))
                .map(SmolStr::from);
            if let Some(resolved) = resolved {
                token.text = resolved;
            }
        });
        Ok(document.with_syntax_tree(tree))
    }

    fn find_single_important_child(&self, tree: &SyntaxTree, node: ElementId) -> Vec<ElementId> {
        tree.child_nodes(node).collect()
    }

    fn fatal_error_hooks(&self) -> &'static [&'static FatalErrorHook] {
        &MOCK_HOOKS
    }

    fn supplementary_documents(&self, project: &Project) -> Vec<(AbsPathBuf, SyntaxTree)> {
        if self.panicking_supplementary {
            panic!("the mock generator panicked");
        }
        if !self.supplementary {
            return Vec::new();
        }
        let directory = project.directory_path().unwrap();
        vec![(
            directory.join("Generated.dst"),
            parse_text("GENERATED\n"),
        )]
    }

    fn target_path(&self, source_path: &AbsPathBuf) -> AbsPathBuf {
        AbsPathBuf::assert(source_path.with_extension("dst"))
    }

    fn manifest_compile_extensions(&self) -> &'static [&'static str] {
        &["src", "dst"]
    }
}

/// Parses lines of whitespace separated words. Everything from a `#` to the end of a line is a
/// comment.
pub(crate) fn parse_text(text: &str) -> SyntaxTree {
    let mut builder = SyntaxTreeBuilder::new();
    builder.start_node(ROOT);

    let mut pending = Vec::new();
    for line in text.split_inclusive('\n') {
        let (content, end_of_line) = match line.strip_suffix('\n') {
            Some(content) => (content, Some("\n")),
            None => (line, None),
        };
        let (code, comment) = match content.find('#') {
            Some(position) => (&content[..position], Some(&content[position..])),
            None => (content, None),
        };

        let mut words = Vec::new();
        let mut rest = code;
        let trailing_whitespace = loop {
            let trimmed = rest.trim_start();
            let whitespace = &rest[..rest.len() - trimmed.len()];
            if trimmed.is_empty() {
                break whitespace;
            }
            let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            words.push((whitespace, &trimmed[..end]));
            rest = &trimmed[end..];
        };

        let mut tail = Vec::new();
        if !trailing_whitespace.is_empty() {
            tail.push(Trivia::whitespace(trailing_whitespace));
        }
        if let Some(comment) = comment {
            tail.push(Trivia::comment(comment));
        }
        if let Some(end_of_line) = end_of_line {
            tail.push(Trivia::end_of_line(end_of_line));
        }

        if words.is_empty() {
            pending.extend(tail);
            continue;
        }

        builder.start_node(LINE);
        let last = words.len() - 1;
        for (index, (whitespace, word)) in words.into_iter().enumerate() {
            let mut leading = std::mem::take(&mut pending);
            if !whitespace.is_empty() {
                leading.push(Trivia::whitespace(whitespace));
            }
            let trailing = if index == last {
                std::mem::take(&mut tail)
            } else {
                Vec::new()
            };
            builder.token_with_trivia(WORD, word, leading, trailing);
        }
        builder.finish_node();
    }
    if !pending.is_empty() {
        builder.token_with_trivia(END, "", pending, Vec::new());
    }

    builder.finish_node();
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::parse_text;

    #[test]
    fn parse_preserves_text() {
        let text = "  first  second # note\n\n# only a comment\nthird";
        assert_eq!(parse_text(text).to_full_string(), text);
    }

    #[test]
    fn trailing_layout_ends_up_in_end_token() {
        let tree = parse_text("word\n\n");
        assert_eq!(tree.tokens().len(), 2);
        assert_eq!(tree.to_full_string(), "word\n\n");
    }
}
