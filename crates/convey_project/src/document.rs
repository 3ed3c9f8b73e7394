use std::sync::Arc;

use convey_paths::AbsPathBuf;
use convey_syntax::SyntaxTree;

use crate::{solution::DocumentState, DocumentId, Project};

/// Describes a document before it is added to a [`Project`].
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    name: String,
    file_path: Option<AbsPathBuf>,
    text: Arc<str>,
    syntax_tree: Option<SyntaxTree>,
}

impl DocumentInfo {
    /// Describes a document that has not been parsed yet.
    pub fn from_text(name: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        DocumentInfo {
            name: name.into(),
            file_path: None,
            text: text.into(),
            syntax_tree: None,
        }
    }

    /// Describes a document whose text is the full text of `tree`.
    pub fn from_syntax_tree(name: impl Into<String>, tree: SyntaxTree) -> Self {
        DocumentInfo {
            name: name.into(),
            file_path: None,
            text: tree.to_full_string().into(),
            syntax_tree: Some(tree),
        }
    }

    pub fn with_file_path(mut self, file_path: AbsPathBuf) -> Self {
        self.file_path = Some(file_path);
        self
    }

    pub(crate) fn into_state(self, id: DocumentId) -> DocumentState {
        DocumentState {
            id,
            name: self.name,
            file_path: self.file_path,
            text: self.text,
            syntax_tree: self.syntax_tree,
        }
    }
}

/// A document as it exists in a specific [`Project`] snapshot.
#[derive(Debug, Clone)]
pub struct Document {
    project: Project,
    state: Arc<DocumentState>,
}

impl Document {
    pub(crate) fn from_state(project: Project, state: Arc<DocumentState>) -> Document {
        Document { project, state }
    }

    pub fn id(&self) -> DocumentId {
        self.state.id
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn file_path(&self) -> Option<&AbsPathBuf> {
        self.state.file_path.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.state.text
    }

    /// Returns the syntax tree of the document if it was parsed before.
    pub fn syntax_tree(&self) -> Option<&SyntaxTree> {
        self.state.syntax_tree.as_ref()
    }

    /// Returns the project snapshot this document belongs to.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Returns a new snapshot of this document, and of its project and solution, in which the
    /// document holds `tree`. The text of the document becomes the full text of the tree.
    pub fn with_syntax_tree(&self, tree: SyntaxTree) -> Document {
        self.with_state(DocumentState {
            text: tree.to_full_string().into(),
            syntax_tree: Some(tree),
            ..(*self.state).clone()
        })
    }

    fn with_state(&self, state: DocumentState) -> Document {
        let state = Arc::new(state);
        let project = self.project.with_document_state(state.clone());
        Document::from_state(project, state)
    }
}

#[cfg(test)]
mod tests {
    use convey_syntax::{SyntaxKind, SyntaxTreeBuilder};

    use crate::{CompilationOptions, DocumentInfo, ProjectInfo, Solution};

    #[test]
    fn with_syntax_tree_replaces_document_in_new_snapshot() {
        let project =
            Solution::new().add_project(ProjectInfo::new("app", CompilationOptions::new("snake")));
        let document = project.add_document(DocumentInfo::from_text("a.sidl", "old"));

        let mut builder = SyntaxTreeBuilder::new();
        builder.token(SyntaxKind(0), "new");
        let updated = document.with_syntax_tree(builder.finish());

        assert_eq!(updated.id(), document.id());
        assert_eq!(updated.text(), "new");
        assert_eq!(document.text(), "old");
        assert!(document.syntax_tree().is_none());
        assert_eq!(
            updated.project().document(document.id()).unwrap().text(),
            "new"
        );
        assert_eq!(
            updated
                .project()
                .solution()
                .project(project.id())
                .unwrap()
                .documents()
                .count(),
            1
        );
    }
}
