use std::sync::Arc;

use convey_project::{Document, DocumentId, Project};
use convey_syntax::SyntaxTree;

use crate::{
    crash_guard::{catch_fault, catch_panic},
    wip, ConversionError, ConversionOptions, LanguageConversion, ShadowCompilation,
    TranslationError, WipFileConversion,
};

/// Holds the per project state of a conversion: the source project, the project that receives
/// converted documents and the shadow compilation used to resolve symbols.
///
/// A contents converter is created for a single run and must not be reused.
pub struct ProjectContentsConverter<L: LanguageConversion> {
    language: Arc<L>,
    source_project: Project,
    converted_project: Project,
    shadow: ShadowCompilation<L::Compilation>,
    root_namespace: Option<String>,
    language_version: Option<String>,
}

impl<L: LanguageConversion> ProjectContentsConverter<L> {
    /// Builds the shadow compilation of `project`. Failing to do so is fatal for the
    /// conversion, without it no symbol can be resolved.
    pub fn new(
        language: Arc<L>,
        project: Project,
        options: &ConversionOptions,
    ) -> Result<Self, ConversionError> {
        let mut target_options = match options.target_compilation_options_override.clone() {
            Some(target_options) => target_options,
            None => catch_panic(|| language.target_compilation_options())
                .map_err(ConversionError::ShadowBuild)?,
        };
        if let Some(root_namespace) = &options.root_namespace_override {
            target_options = target_options.with_root_namespace(root_namespace.clone());
        }

        let converted_project = project.to_project_from_options(target_options.clone());
        let shadow_project = project.create_reference_only_project(target_options.clone());
        let compilation = catch_fault(|| language.compile(&shadow_project))
            .map_err(ConversionError::ShadowBuild)?;

        Ok(ProjectContentsConverter {
            source_project: shadow_project
                .solution()
                .project(project.id())
                .unwrap_or(project),
            converted_project,
            shadow: ShadowCompilation {
                project: shadow_project,
                compilation,
            },
            root_namespace: options.root_namespace_override.clone(),
            language_version: target_options.language_version,
            language,
        })
    }

    /// The project that is converted.
    pub fn source_project(&self) -> &Project {
        &self.source_project
    }

    /// The converted project before any converted document was added.
    pub fn converted_project(&self) -> &Project {
        &self.converted_project
    }

    /// The root namespace to declare in the converted manifest, if it should change.
    pub fn root_namespace(&self) -> Option<&str> {
        self.root_namespace.as_deref()
    }

    /// The language version to declare in the converted manifest.
    pub fn language_version(&self) -> Option<&str> {
        self.language_version.as_deref()
    }

    /// Translates `document` with the shadow compilation. A panic of the language is returned
    /// as an error.
    pub fn first_pass(&self, document: &Document) -> Result<SyntaxTree, TranslationError> {
        catch_fault(|| self.language.first_pass(document, &self.shadow))
    }

    /// Adds the trees produced by the first pass to the converted project.
    pub fn attach(
        &self,
        results: Vec<WipFileConversion<SyntaxTree>>,
    ) -> (Project, Vec<WipFileConversion<DocumentId>>) {
        wip::attach(&self.converted_project, results)
    }
}
