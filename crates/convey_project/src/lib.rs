//! The in-memory model of the code that is converted.
//!
//! A [`Solution`] is an immutable snapshot of a set of [`Project`]s, each of which holds an
//! ordered set of [`Document`]s. Adding a document or changing a project yields a new snapshot
//! that shares everything that did not change with the previous one.

mod document;
mod loader;
mod manifest;
mod options;
mod project;
mod solution;

pub use convey_paths::{AbsPathBuf, RelativePath, RelativePathBuf};

pub use crate::{
    document::{Document, DocumentInfo},
    loader::{find_manifest, LoadError, ProjectLoader},
    manifest::{ManifestError, ManifestRewriter, TextReplacement},
    options::{CompilationOptions, MetadataImport, MetadataReference},
    project::{Project, ProjectInfo},
    solution::{DocumentId, ProjectId, Solution},
};
