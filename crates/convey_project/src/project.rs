use std::{collections::BTreeMap, io, sync::Arc};

use convey_paths::AbsPathBuf;

use crate::{
    solution::{DocumentState, ProjectState},
    CompilationOptions, Document, DocumentId, DocumentInfo, MetadataImport, MetadataReference,
    ProjectId, Solution,
};

/// Describes a project before it is added to a [`Solution`].
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    id: ProjectId,
    name: String,
    assembly_name: String,
    file_path: Option<AbsPathBuf>,
    options: CompilationOptions,
    metadata_references: Vec<MetadataReference>,
    project_references: Vec<ProjectId>,
    documents: Vec<DocumentInfo>,
}

impl ProjectInfo {
    /// Describes a new project with a fresh id and without any documents or references. The
    /// assembly name defaults to the name of the project.
    pub fn new(name: impl Into<String>, options: CompilationOptions) -> Self {
        let name = name.into();
        ProjectInfo {
            id: ProjectId::new_unique(),
            assembly_name: name.clone(),
            name,
            file_path: None,
            options,
            metadata_references: Vec::new(),
            project_references: Vec::new(),
            documents: Vec::new(),
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn with_id(mut self, id: ProjectId) -> Self {
        self.id = id;
        self
    }

    pub fn with_assembly_name(mut self, assembly_name: impl Into<String>) -> Self {
        self.assembly_name = assembly_name.into();
        self
    }

    /// Sets the path of the manifest that describes the project.
    pub fn with_file_path(mut self, file_path: AbsPathBuf) -> Self {
        self.file_path = Some(file_path);
        self
    }

    pub fn with_metadata_references(
        mut self,
        references: impl IntoIterator<Item = MetadataReference>,
    ) -> Self {
        self.metadata_references = references.into_iter().collect();
        self
    }

    pub fn with_project_references(mut self, references: impl IntoIterator<Item = ProjectId>) -> Self {
        self.project_references = references.into_iter().collect();
        self
    }

    pub fn with_documents(mut self, documents: impl IntoIterator<Item = DocumentInfo>) -> Self {
        self.documents = documents.into_iter().collect();
        self
    }

    pub(crate) fn into_state(self) -> ProjectState {
        let id = self.id;
        let documents = self
            .documents
            .into_iter()
            .map(|info| {
                let state = info.into_state(DocumentId::new_unique(id));
                (state.id, Arc::new(state))
            })
            .collect::<BTreeMap<_, _>>();
        ProjectState {
            id,
            name: self.name,
            assembly_name: self.assembly_name,
            file_path: self.file_path,
            options: self.options,
            metadata_references: self.metadata_references,
            project_references: self.project_references,
            documents: Arc::new(documents),
        }
    }
}

/// A project as it exists in a specific [`Solution`] snapshot.
#[derive(Debug, Clone)]
pub struct Project {
    solution: Solution,
    state: Arc<ProjectState>,
}

impl Project {
    pub(crate) fn from_state(solution: Solution, state: Arc<ProjectState>) -> Project {
        Project { solution, state }
    }

    pub fn id(&self) -> ProjectId {
        self.state.id
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn assembly_name(&self) -> &str {
        &self.state.assembly_name
    }

    /// Returns the path of the manifest of this project, if the project has one.
    pub fn file_path(&self) -> Option<&AbsPathBuf> {
        self.state.file_path.as_ref()
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.state.options
    }

    pub fn metadata_references(&self) -> &[MetadataReference] {
        &self.state.metadata_references
    }

    pub fn project_references(&self) -> &[ProjectId] {
        &self.state.project_references
    }

    /// Returns the solution snapshot this project is part of.
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Returns the documents of this project in the order they were added.
    pub fn documents(&self) -> impl Iterator<Item = Document> + '_ {
        self.state
            .documents
            .values()
            .map(move |state| Document::from_state(self.clone(), state.clone()))
    }

    pub fn document(&self, id: DocumentId) -> Option<Document> {
        let state = self.state.documents.get(&id)?;
        Some(Document::from_state(self.clone(), state.clone()))
    }

    /// Returns a new snapshot of this project that additionally contains the described
    /// document, and that document.
    pub fn add_document(&self, info: DocumentInfo) -> Document {
        let state = Arc::new(info.into_state(DocumentId::new_unique(self.id())));
        let project = self.with_document_state(state.clone());
        Document::from_state(project, state)
    }

    /// Returns a new snapshot of the solution in which this project is replaced by an empty
    /// project with the same id, name and references that is compiled with `options`.
    pub fn to_project_from_options(&self, options: CompilationOptions) -> Project {
        self.with_state(ProjectState {
            options,
            documents: Arc::default(),
            ..(*self.state).clone()
        })
    }

    /// Adds a project without documents to the solution that references this project and all
    /// of its references, and that imports every member regardless of visibility. Compiling the
    /// returned project with `options` shows how the symbols of this project look through the
    /// eyes of the language described by `options`.
    pub fn create_reference_only_project(&self, options: CompilationOptions) -> Project {
        let id = ProjectId::new_unique();
        let project_references = self
            .project_references()
            .iter()
            .copied()
            .chain(std::iter::once(self.id()));
        let info = ProjectInfo::new(
            format!("{}.reference.{}", self.name(), id.0),
            options.with_metadata_import(MetadataImport::All),
        )
        .with_id(id)
        .with_assembly_name(self.assembly_name())
        .with_metadata_references(self.metadata_references().iter().cloned())
        .with_project_references(project_references);
        log::debug!(
            "creating reference only project '{}' for '{}'",
            info.name,
            self.name()
        );
        self.solution.add_project(info)
    }

    /// Returns the directory in which the files of this project live.
    ///
    /// This is the directory of the manifest. For a project without a manifest that is part of
    /// a solution on disk, the first directory directly below the solution directory that
    /// contains documents of this project is used, preferring directories named after the
    /// assembly. In-memory projects resolve to the current working directory.
    pub fn directory_path(&self) -> io::Result<AbsPathBuf> {
        if let Some(directory) = self.file_path().and_then(AbsPathBuf::parent) {
            return Ok(directory);
        }

        if let Some(solution_dir) = self.solution.file_path().and_then(AbsPathBuf::parent) {
            let candidates = self
                .documents()
                .filter_map(|document| {
                    let relative = solution_dir.relative_path_to(document.file_path()?)?;
                    let mut components = relative.as_str().split('/');
                    let first = components.next()?;
                    components.next()?;
                    Some(first.to_owned())
                })
                .collect::<Vec<_>>();
            let directory = candidates
                .iter()
                .find(|candidate| candidate.contains(self.assembly_name()))
                .or_else(|| candidates.first());
            return Ok(match directory {
                Some(directory) => solution_dir.join(directory),
                None => solution_dir,
            });
        }

        Ok(AbsPathBuf::assert(std::env::current_dir()?))
    }

    pub(crate) fn with_document_state(&self, document: Arc<DocumentState>) -> Project {
        let mut documents = (*self.state.documents).clone();
        documents.insert(document.id, document);
        self.with_state(ProjectState {
            documents: Arc::new(documents),
            ..(*self.state).clone()
        })
    }

    fn with_state(&self, state: ProjectState) -> Project {
        let state = Arc::new(state);
        let solution = self.solution.with_project_state(state.clone());
        Project::from_state(solution, state)
    }
}
