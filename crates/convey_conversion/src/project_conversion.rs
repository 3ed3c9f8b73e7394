use std::{
    fmt::Write,
    path::{Component, Path},
    sync::Arc,
    time::Instant,
};

use convey_paths::AbsPathBuf;
use convey_project::{
    Document, DocumentInfo, ManifestRewriter, Project, ProjectInfo, Solution, TextReplacement,
};
use convey_syntax::SyntaxTree;
use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::{
    crash_guard::{catch_fault, catch_panic},
    executor::{execute_phase, PhaseItem},
    selection,
    wip,
    ConversionError, ConversionOptions, ConversionResult, CrashGuard, LanguageConversion,
    ProgressSink, ProjectContentsConverter, ReportProgress, TranslationError, WipFileConversion,
};

const PHASE_ONE_TITLE: &str = "Phase 1 of 2:";
const PHASE_TWO_TITLE: &str = "Phase 2 of 2:";
const WARNINGS_FILE_NAME: &str = "ConversionWarnings.txt";

const EXCLUDED_DIRECTORIES: &[&str] = &["bin", "obj"];
const EXCLUDED_FILE_MARKER: &str = ".AssemblyAttributes.";

/// Converts a snippet of source code that is not part of any project.
///
/// The snippet is parsed on its own and placed in a project that references
/// [`ConversionOptions::references`]. When the language wraps the snippet to parse it, only the
/// code of the snippet is returned.
pub fn convert_text<L: LanguageConversion>(
    language: Arc<L>,
    text: &str,
    options: ConversionOptions,
    progress: impl ReportProgress + 'static,
) -> Result<ConversionResult, ConversionError> {
    let progress: ProgressSink = Arc::new(progress);
    let _guard = CrashGuard::acquire(language.fatal_error_hooks(), progress.clone());

    let (tree, snippet_span) = catch_fault(|| language.parse_standalone(text, &options))
        .map_err(ConversionError::Parse)?;
    let options = ConversionOptions {
        selected_text_span: snippet_span.or(options.selected_text_span),
        ..options
    };

    let source_options = catch_panic(|| language.source_compilation_options())
        .map_err(ConversionError::ShadowBuild)?;
    let project = Solution::new().add_project(
        ProjectInfo::new("Snippet", source_options)
            .with_metadata_references(options.references.iter().cloned()),
    );
    let document = project.add_document(DocumentInfo::from_syntax_tree("Snippet", tree));
    convert_document(language, &document, options, progress)
}

/// Converts a single document of a project. The other documents of the project are only used
/// to resolve symbols.
///
/// When a non-empty span is selected only the converted code of the selection is returned.
pub fn convert_single<L: LanguageConversion>(
    language: Arc<L>,
    document: &Document,
    options: ConversionOptions,
    progress: impl ReportProgress + 'static,
) -> Result<ConversionResult, ConversionError> {
    let progress: ProgressSink = Arc::new(progress);
    let _guard = CrashGuard::acquire(language.fatal_error_hooks(), progress.clone());
    convert_document(language, document, options, progress)
}

/// Converts every document of `project` and rewrites its manifest.
///
/// Documents in build output directories are skipped. The returned results are in the order of
/// the documents of the project, followed by the compilation warnings if
/// [`ConversionOptions::show_compilation_errors`] is set and the rewritten manifest if the
/// project has one. `replacements` are applied to the manifest before anything else.
pub fn convert_project<L: LanguageConversion>(
    language: Arc<L>,
    project: &Project,
    options: &ConversionOptions,
    progress: impl ReportProgress + 'static,
    replacements: Vec<TextReplacement>,
) -> Result<ProjectConversionResults<L>, ConversionError> {
    let progress: ProgressSink = Arc::new(progress);
    let _guard = CrashGuard::acquire(language.fatal_error_hooks(), progress.clone());
    let started = Instant::now();

    let project_directory = project
        .directory_path()
        .map_err(ConversionError::ProjectDirectory)?;
    let mut conversion = Conversion::start(language.clone(), project, options, progress, false)?;

    let documents = conversion
        .contents
        .source_project()
        .documents()
        .filter(|document| match document.file_path() {
            Some(path) if is_excluded(path) => {
                log::debug!("skipping {path}");
                false
            }
            _ => true,
        })
        .collect();
    let converted = conversion.convert(documents, true);
    let warnings = if options.show_compilation_errors {
        conversion.project_warnings(&converted, &project_directory)
    } else {
        None
    };
    conversion.finish();
    log::info!(
        "converted {} documents of '{}' in {:.2?}",
        converted.len(),
        project.name(),
        started.elapsed()
    );

    let manifest = project.file_path().map(|path| PendingManifest {
        path: path.clone(),
        rewriter: ManifestRewriter::new()
            .with_replacements(replacements)
            .with_language_version(conversion.contents.language_version().map(ToOwned::to_owned))
            .with_root_namespace(conversion.contents.root_namespace().map(ToOwned::to_owned)),
    });

    let documents = converted
        .into_iter()
        .map(|record| to_result(language.as_ref(), record))
        .collect::<Vec<_>>();
    Ok(ProjectConversionResults {
        original_paths: project
            .documents()
            .filter_map(|document| document.file_path().cloned())
            .collect(),
        language,
        documents: documents.into_iter(),
        warnings,
        manifest,
        project_directory,
        added_items: Vec::new(),
    })
}

/// Converts `document` without acquiring a [`CrashGuard`].
fn convert_document<L: LanguageConversion>(
    language: Arc<L>,
    document: &Document,
    options: ConversionOptions,
    progress: ProgressSink,
) -> Result<ConversionResult, ConversionError> {
    let selected_span = options.selection();
    let document = match selected_span {
        Some(span) => catch_fault(|| {
            selection::with_annotated_selection(language.as_ref(), document, span)
        })
        .map_err(ConversionError::Parse)?,
        None => document.clone(),
    };

    let mut conversion = Conversion::start(
        language.clone(),
        document.project(),
        &options,
        progress,
        selected_span.is_some(),
    )?;
    let source_document = conversion
        .contents
        .source_project()
        .document(document.id())
        .ok_or(ConversionError::MissingDocument(document.id()))?;
    let converted = conversion.convert(vec![source_document], false);
    conversion.finish();

    let results = converted
        .into_iter()
        .map(|record| to_result(language.as_ref(), record))
        .collect::<Vec<_>>();
    let errors = results
        .iter()
        .flat_map(|result| result.errors.iter().cloned())
        .unique()
        .collect();
    let mut result = results
        .iter()
        .find(|result| result.has_code())
        .or_else(|| results.first())
        .cloned()
        .unwrap_or_default();
    result.errors = errors;
    Ok(result)
}

/// The stages of a conversion, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ConversionState {
    Init,
    ShadowBuilt,
    Phase1Running,
    Phase1Merged,
    Phase2Running,
    Done,
}

/// A single run of the two conversion phases over a set of documents of one project.
struct Conversion<L: LanguageConversion> {
    language: Arc<L>,
    contents: Arc<ProjectContentsConverter<L>>,
    progress: ProgressSink,
    extract_selection: bool,
    state: ConversionState,
}

impl<L: LanguageConversion> Conversion<L> {
    /// Builds the shadow compilation for `project`.
    fn start(
        language: Arc<L>,
        project: &Project,
        options: &ConversionOptions,
        progress: ProgressSink,
        extract_selection: bool,
    ) -> Result<Self, ConversionError> {
        log::debug!("conversion of '{}': {:?}", project.name(), ConversionState::Init);
        let contents = ProjectContentsConverter::new(language.clone(), project.clone(), options)
            .map_err(|error| {
                log::error!("could not build the shadow project of '{}'", project.name());
                error
            })?;
        let mut conversion = Conversion {
            language,
            contents: Arc::new(contents),
            progress,
            extract_selection,
            state: ConversionState::Init,
        };
        conversion.transition(ConversionState::ShadowBuilt);
        Ok(conversion)
    }

    fn transition(&mut self, next: ConversionState) {
        debug_assert!(next > self.state, "{:?} -> {next:?}", self.state);
        log::debug!(
            "conversion of '{}': {:?} -> {next:?}",
            self.contents.source_project().name(),
            self.state
        );
        self.state = next;
    }

    fn finish(&mut self) {
        self.transition(ConversionState::Done);
    }

    /// Runs both phases. The returned records hold the final trees, without annotations, in the
    /// order of `documents` followed by any supplementary documents.
    fn convert(
        &mut self,
        documents: Vec<Document>,
        with_supplementary_documents: bool,
    ) -> Vec<WipFileConversion<SyntaxTree>> {
        let mut first_pass = self.first_pass(documents);
        if with_supplementary_documents {
            let converted_project = self.contents.converted_project();
            match catch_panic(|| self.language.supplementary_documents(converted_project)) {
                Ok(documents) => first_pass.extend(
                    documents
                        .into_iter()
                        .map(|(path, tree)| WipFileConversion::new(Some(path), tree, Vec::new())),
                ),
                Err(error) => {
                    log::warn!("could not create the supplementary documents: {error}");
                    first_pass.push(WipFileConversion::failed(
                        None,
                        format!("could not create the supplementary documents: {error}"),
                    ));
                }
            }
        }

        let (project, ids) = self.contents.attach(first_pass);
        let documents = wip::resolve(&project, ids);
        self.transition(ConversionState::Phase1Merged);

        self.second_pass(documents)
    }

    fn first_pass(&mut self, documents: Vec<Document>) -> Vec<WipFileConversion<SyntaxTree>> {
        self.transition(ConversionState::Phase1Running);
        let started = Instant::now();

        let items = documents
            .into_iter()
            .map(|document| PhaseItem {
                label: Some(
                    document
                        .file_path()
                        .map_or_else(|| document.name().to_owned(), ToString::to_string),
                ),
                size: document.text().len(),
                value: document,
            })
            .collect();
        let contents = self.contents.clone();
        let results = execute_phase(PHASE_ONE_TITLE, items, &self.progress, move |document| {
            first_pass_document(&contents, &document)
        });

        log::info!("first pass took {:.2?}", started.elapsed());
        results
    }

    fn second_pass(
        &mut self,
        documents: Vec<WipFileConversion<Document>>,
    ) -> Vec<WipFileConversion<SyntaxTree>> {
        self.transition(ConversionState::Phase2Running);
        let started = Instant::now();

        let items = documents
            .into_iter()
            .map(|record| PhaseItem {
                label: record.wip.as_ref().map(|_| record.label()),
                size: record.wip.as_ref().map_or(0, |document| document.text().len()),
                value: record,
            })
            .collect();
        let language = self.language.clone();
        let extract_selection = self.extract_selection;
        let results = execute_phase(PHASE_TWO_TITLE, items, &self.progress, move |record| {
            second_pass_document(language.as_ref(), record, extract_selection)
        });

        log::info!("second pass took {:.2?}", started.elapsed());
        results
    }

    /// Compiles the source project and the converted project and renders the errors of both.
    /// Returns `None` if there is nothing to report.
    fn project_warnings(
        &self,
        converted: &[WipFileConversion<SyntaxTree>],
        project_directory: &AbsPathBuf,
    ) -> Option<ConversionResult> {
        let (converted_project, _) = self.contents.attach(converted.to_vec());
        let mut warnings = String::new();
        for (label, project) in [
            ("source", self.contents.source_project()),
            ("target", &converted_project),
        ] {
            let diagnostics = catch_fault(|| {
                let compilation = self.language.compile(project)?;
                Ok(self.language.compilation_diagnostics(&compilation))
            })
            .unwrap_or_else(|error| vec![error.to_string()]);
            if diagnostics.is_empty() {
                continue;
            }
            let _ = write!(
                warnings,
                "\n{} {label} compilation errors:\n{}",
                diagnostics.len(),
                diagnostics.join("\n")
            );
        }

        if warnings.is_empty() {
            return None;
        }
        Some(ConversionResult {
            source_path: Some(project_directory.join(WARNINGS_FILE_NAME)),
            target_path: None,
            converted_code: None,
            errors: vec![warnings],
        })
    }
}

fn first_pass_document<L: LanguageConversion>(
    contents: &ProjectContentsConverter<L>,
    document: &Document,
) -> WipFileConversion<SyntaxTree> {
    let path = document.file_path().cloned();
    match contents.first_pass(document) {
        Ok(tree) => {
            let errors = wip::annotation_errors(&tree);
            WipFileConversion::new(path, tree, errors)
        }
        Err(error) => {
            log::warn!("first pass of {} failed: {error}", document.name());
            WipFileConversion::failed(path, error.to_string())
        }
    }
}

/// Runs the second pass over a converted document. If that fails the tree from the first pass
/// is kept and the failure is recorded.
fn second_pass_document<L: LanguageConversion>(
    language: &L,
    record: WipFileConversion<Document>,
    extract_selection: bool,
) -> WipFileConversion<SyntaxTree> {
    let WipFileConversion {
        path,
        wip,
        mut errors,
    } = record;
    let Some(document) = wip else {
        return WipFileConversion {
            path,
            wip: None,
            errors,
        };
    };

    let tree = match catch_fault(|| second_pass_tree(language, &document, extract_selection)) {
        Ok(tree) => Some(tree),
        Err(error) => {
            log::warn!("second pass of {} failed: {error}", document.name());
            errors.push(error.to_string());
            document.syntax_tree().cloned()
        }
    };
    let Some(tree) = tree else {
        return WipFileConversion {
            path,
            wip: None,
            errors,
        };
    };

    errors.extend(wip::annotation_errors(&tree));
    let errors = errors.into_iter().unique().collect();
    WipFileConversion::new(path, tree.without_annotations(), errors)
}

fn second_pass_tree<L: LanguageConversion>(
    language: &L,
    document: &Document,
    extract_selection: bool,
) -> Result<SyntaxTree, TranslationError> {
    let document = language.second_pass(document)?;
    let tree = match document.syntax_tree() {
        Some(tree) => tree.clone(),
        None => language.parse(&document)?,
    };
    Ok(if extract_selection {
        selection::extract_selection(language, &tree)
    } else {
        language.format(&tree)
    })
}

fn to_result<L: LanguageConversion>(
    language: &L,
    record: WipFileConversion<SyntaxTree>,
) -> ConversionResult {
    let WipFileConversion {
        path,
        wip,
        mut errors,
    } = record;
    let target_path = path
        .as_ref()
        .and_then(|path| match catch_panic(|| language.target_path(path)) {
            Ok(target_path) => Some(target_path),
            Err(error) => {
                errors.push(error.to_string());
                None
            }
        });
    ConversionResult {
        source_path: path,
        target_path,
        converted_code: wip.map(|tree| tree.to_full_string()),
        errors,
    }
}

/// Returns true for files that are produced by a build rather than written by hand.
fn is_excluded(path: &Path) -> bool {
    let in_build_directory = path.components().any(|component| {
        matches!(component, Component::Normal(name)
            if EXCLUDED_DIRECTORIES.iter().any(|&excluded| name.to_str() == Some(excluded)))
    });
    let generated = path
        .file_name()
        .map_or(false, |name| name.to_string_lossy().contains(EXCLUDED_FILE_MARKER));
    in_build_directory || generated
}

struct PendingManifest {
    path: AbsPathBuf,
    rewriter: ManifestRewriter,
}

/// The results of a project conversion.
///
/// The documents are converted by the time [`convert_project`] returns. The manifest is
/// rewritten when its result is requested, after every document result has been produced,
/// because it declares the documents that were added by the conversion.
pub struct ProjectConversionResults<L: LanguageConversion> {
    language: Arc<L>,
    documents: std::vec::IntoIter<ConversionResult>,
    warnings: Option<ConversionResult>,
    manifest: Option<PendingManifest>,
    original_paths: FxHashSet<AbsPathBuf>,
    project_directory: AbsPathBuf,
    added_items: Vec<String>,
}

impl<L: LanguageConversion> ProjectConversionResults<L> {
    /// Records the results that did not originate from a document of the original project.
    fn track_added(&mut self, result: &ConversionResult) {
        let (Some(source_path), Some(target_path)) = (&result.source_path, &result.target_path)
        else {
            return;
        };
        if result.converted_code.is_none() || self.original_paths.contains(source_path) {
            return;
        }
        match self.project_directory.relative_path_to(target_path) {
            Some(relative) => self.added_items.push(relative.as_str().to_owned()),
            None => log::warn!(
                "{target_path} is outside of {}, it is not added to the manifest",
                self.project_directory
            ),
        }
    }

    fn rewrite_manifest(&mut self, manifest: PendingManifest) -> ConversionResult {
        let PendingManifest { path, rewriter } = manifest;
        let language = self.language.as_ref();
        let added_items = std::mem::take(&mut self.added_items);
        let rewritten = catch_panic(|| {
            let target_path = language.target_manifest_path(&path);
            let rewriter = rewriter
                .with_compile_extensions(language.manifest_compile_extensions().iter().copied())
                .with_added_items(added_items);
            let text = rewriter
                .rewrite_file(&path)
                .map(|text| language.post_transform_manifest(text));
            (target_path, text)
        });
        let (target_path, text) = match rewritten {
            Ok(rewritten) => rewritten,
            Err(error) => {
                log::warn!("could not rewrite the manifest {path}: {error}");
                return ConversionResult {
                    source_path: Some(path),
                    target_path: None,
                    converted_code: None,
                    errors: vec![error.to_string()],
                };
            }
        };
        match text {
            Ok(text) => ConversionResult {
                source_path: Some(path),
                target_path: Some(target_path),
                converted_code: Some(text),
                errors: Vec::new(),
            },
            Err(error) => {
                let error = ConversionError::from(error);
                log::warn!("{error}");
                ConversionResult {
                    source_path: Some(path),
                    target_path: Some(target_path),
                    converted_code: None,
                    errors: vec![error_chain(&error)],
                }
            }
        }
    }
}

impl<L: LanguageConversion> Iterator for ProjectConversionResults<L> {
    type Item = ConversionResult;

    fn next(&mut self) -> Option<ConversionResult> {
        if let Some(result) = self.documents.next() {
            self.track_added(&result);
            return Some(result);
        }
        if let Some(warnings) = self.warnings.take() {
            return Some(warnings);
        }
        let manifest = self.manifest.take()?;
        Some(self.rewrite_manifest(manifest))
    }
}

/// Renders an error followed by all of its sources.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(error) = source {
        let _ = write!(message, ": {error}");
        source = error.source();
    }
    message
}
