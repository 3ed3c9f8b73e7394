use convey_paths::AbsPathBuf;
use convey_project::{Document, DocumentId, DocumentInfo, Project};
use convey_syntax::{Annotation, AnnotationKind, SyntaxTree};

/// The state of the conversion of a single file as it moves through the phases of a
/// conversion.
///
/// Errors accumulate, they are never removed. A record without `wip` failed irrecoverably or
/// was never converted, it is carried along so that its errors end up in the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipFileConversion<T> {
    pub path: Option<AbsPathBuf>,
    pub wip: Option<T>,
    pub errors: Vec<String>,
}

impl<T> WipFileConversion<T> {
    pub fn new(path: Option<AbsPathBuf>, wip: T, errors: Vec<String>) -> Self {
        WipFileConversion {
            path,
            wip: Some(wip),
            errors,
        }
    }

    /// A record for a file whose conversion failed with `error`.
    pub fn failed(path: Option<AbsPathBuf>, error: impl Into<String>) -> Self {
        WipFileConversion {
            path,
            wip: None,
            errors: vec![error.into()],
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WipFileConversion<U> {
        WipFileConversion {
            path: self.path,
            wip: self.wip.map(f),
            errors: self.errors,
        }
    }

    /// A short description of the file used in progress messages.
    pub(crate) fn label(&self) -> String {
        path_label(self.path.as_ref())
    }
}

pub(crate) fn path_label(path: Option<&AbsPathBuf>) -> String {
    path.map(ToString::to_string).unwrap_or_default()
}

/// Adds a document for every converted tree to `project`.
///
/// Every record is processed before this function returns, so the returned project contains
/// all documents. The returned records refer to the added documents by id and are in the same
/// order as `results`.
pub fn attach(
    project: &Project,
    results: Vec<WipFileConversion<SyntaxTree>>,
) -> (Project, Vec<WipFileConversion<DocumentId>>) {
    let mut project = project.clone();
    let ids = results
        .into_iter()
        .map(|result| {
            let path = result.path.clone();
            result.map(|tree| {
                let mut info = DocumentInfo::from_syntax_tree(document_name(path.as_ref()), tree);
                if let Some(path) = path {
                    info = info.with_file_path(path);
                }
                let document = project.add_document(info);
                project = document.project().clone();
                document.id()
            })
        })
        .collect::<Vec<_>>();
    (project, ids)
}

/// Looks up the documents that `ids` refer to in `project`, in the same order. Records without a
/// document are passed on unchanged.
pub fn resolve(
    project: &Project,
    ids: Vec<WipFileConversion<DocumentId>>,
) -> Vec<WipFileConversion<Document>> {
    ids.into_iter()
        .map(|record| WipFileConversion {
            path: record.path,
            wip: record.wip.and_then(|id| project.document(id)),
            errors: record.errors,
        })
        .collect()
}

/// Returns the messages of all conversion error annotations of `tree`, in tree order.
pub fn annotation_errors(tree: &SyntaxTree) -> Vec<String> {
    tree.annotations_of_kind(AnnotationKind::ConversionError)
        .into_iter()
        .filter_map(|(_, annotation)| match annotation {
            Annotation::ConversionError(message) => Some(message.clone()),
            Annotation::Selection { .. } => None,
        })
        .collect()
}

fn document_name(path: Option<&AbsPathBuf>) -> String {
    path.and_then(|path| path.file_name())
        .map_or_else(
            || "Document".to_owned(),
            |name| name.to_string_lossy().into_owned(),
        )
}

#[cfg(test)]
mod tests {
    use convey_paths::AbsPathBuf;
    use convey_project::{CompilationOptions, ProjectInfo, Solution};
    use convey_syntax::{Annotation, SyntaxKind, SyntaxTree, SyntaxTreeBuilder};

    use super::{annotation_errors, attach, resolve, WipFileConversion};

    fn tree(text: &str) -> SyntaxTree {
        let mut builder = SyntaxTreeBuilder::new();
        builder.token(SyntaxKind(0), text);
        builder.finish()
    }

    #[test]
    fn attach_and_resolve_preserve_order_and_failures() {
        let root = AbsPathBuf::assert(std::env::temp_dir());
        let project =
            Solution::new().add_project(ProjectInfo::new("app", CompilationOptions::new("pascal")));
        let results = vec![
            WipFileConversion::new(Some(root.join("a.pidl")), tree("a"), Vec::new()),
            WipFileConversion::failed(Some(root.join("b.pidl")), "broken"),
            WipFileConversion::new(None, tree("c"), vec!["warning".to_owned()]),
        ];

        let (project, ids) = attach(&project, results);
        assert_eq!(project.documents().count(), 2);
        assert!(ids[1].wip.is_none());

        let documents = resolve(&project, ids);
        let summary = documents
            .iter()
            .map(|record| {
                (
                    record.wip.as_ref().map(|document| document.text().to_owned()),
                    record.errors.clone(),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                (Some("a".to_owned()), vec![]),
                (None, vec!["broken".to_owned()]),
                (Some("c".to_owned()), vec!["warning".to_owned()]),
            ]
        );
        assert_eq!(documents[0].wip.as_ref().unwrap().name(), "a.pidl");
        assert_eq!(documents[2].wip.as_ref().unwrap().name(), "Document");
    }

    #[test]
    fn errors_from_annotations() {
        let tree = tree("x");
        let root = tree.root();
        let tree = tree
            .with_annotation(root, Annotation::selection())
            .with_annotation(root, Annotation::conversion_error("first"))
            .with_annotation(root, Annotation::conversion_error("second"));
        assert_eq!(annotation_errors(&tree), vec!["first", "second"]);
    }
}
