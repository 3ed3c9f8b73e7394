use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use convey_paths::AbsPathBuf;
use convey_syntax::SyntaxTree;

use crate::{CompilationOptions, MetadataReference, Project, ProjectInfo};

static NEXT_PROJECT_ID: AtomicU32 = AtomicU32::new(0);
static NEXT_DOCUMENT_ID: AtomicU32 = AtomicU32::new(0);

/// Uniquely identifies a project within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectId(pub(crate) u32);

impl ProjectId {
    pub fn new_unique() -> ProjectId {
        ProjectId(NEXT_PROJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Uniquely identifies a document within the process. Identifiers are handed out in increasing
/// order so documents of a project are ordered by the moment they were added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId {
    project: ProjectId,
    id: u32,
}

impl DocumentId {
    pub fn new_unique(project: ProjectId) -> DocumentId {
        DocumentId {
            project,
            id: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Returns the project the document belongs to.
    pub fn project_id(&self) -> ProjectId {
        self.project
    }
}

pub(crate) type DocumentMap = BTreeMap<DocumentId, Arc<DocumentState>>;

#[derive(Debug, Clone)]
pub(crate) struct DocumentState {
    pub(crate) id: DocumentId,
    pub(crate) name: String,
    pub(crate) file_path: Option<AbsPathBuf>,
    pub(crate) text: Arc<str>,
    pub(crate) syntax_tree: Option<SyntaxTree>,
}

#[derive(Debug, Clone)]
pub(crate) struct ProjectState {
    pub(crate) id: ProjectId,
    pub(crate) name: String,
    pub(crate) assembly_name: String,
    pub(crate) file_path: Option<AbsPathBuf>,
    pub(crate) options: CompilationOptions,
    pub(crate) metadata_references: Vec<MetadataReference>,
    pub(crate) project_references: Vec<ProjectId>,
    pub(crate) documents: Arc<DocumentMap>,
}

/// An immutable snapshot of a set of projects.
///
/// Every modification returns a new snapshot. Snapshots share the projects and documents that
/// were not touched by the modification, so holders of an older snapshot never observe a
/// change.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    file_path: Option<AbsPathBuf>,
    projects: Arc<BTreeMap<ProjectId, Arc<ProjectState>>>,
}

impl Solution {
    /// Constructs an empty solution that does not live on disk.
    pub fn new() -> Solution {
        Solution::default()
    }

    /// Constructs an empty solution that is described by the file at `file_path`.
    pub fn from_file_path(file_path: AbsPathBuf) -> Solution {
        Solution {
            file_path: Some(file_path),
            ..Solution::default()
        }
    }

    pub fn file_path(&self) -> Option<&AbsPathBuf> {
        self.file_path.as_ref()
    }

    /// Returns the project with the given id, if it is part of this snapshot.
    pub fn project(&self, id: ProjectId) -> Option<Project> {
        let state = self.projects.get(&id)?;
        Some(Project::from_state(self.clone(), state.clone()))
    }

    pub fn projects(&self) -> impl Iterator<Item = Project> + '_ {
        self.projects
            .values()
            .map(move |state| Project::from_state(self.clone(), state.clone()))
    }

    /// Returns a new snapshot that additionally contains the described project.
    pub fn add_project(&self, info: ProjectInfo) -> Project {
        let state = Arc::new(info.into_state());
        let solution = self.with_project_state(state.clone());
        Project::from_state(solution, state)
    }

    /// Returns a new snapshot in which the project with the id of `state` is replaced by, or
    /// extended with, `state`.
    pub(crate) fn with_project_state(&self, state: Arc<ProjectState>) -> Solution {
        let mut projects = (*self.projects).clone();
        projects.insert(state.id, state);
        Solution {
            file_path: self.file_path.clone(),
            projects: Arc::new(projects),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Solution;
    use crate::{CompilationOptions, DocumentInfo, ProjectInfo};

    #[test]
    fn adding_documents_does_not_affect_earlier_snapshots() {
        let project =
            Solution::new().add_project(ProjectInfo::new("app", CompilationOptions::new("snake")));
        let first = project.add_document(DocumentInfo::from_text("a.sidl", "type a {}"));
        let second = first
            .project()
            .add_document(DocumentInfo::from_text("b.sidl", "type b {}"));

        assert_eq!(project.documents().count(), 0);
        assert_eq!(first.project().documents().count(), 1);
        assert_eq!(second.project().documents().count(), 2);
        assert_eq!(project.solution().projects().count(), 1);
        assert_eq!(
            second
                .project()
                .documents()
                .map(|document| document.name().to_owned())
                .collect::<Vec<_>>(),
            vec!["a.sidl", "b.sidl"]
        );
    }
}
