use std::{
    fs, io,
    path::{Path, PathBuf},
};

use convey_paths::AbsPathBuf;
use thiserror::Error;
use walkdir::WalkDir;

use crate::{CompilationOptions, DocumentInfo, MetadataReference, Project, ProjectInfo, Solution};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("'{}' does not refer to a valid manifest path", .path.display())]
    InvalidManifestPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not enumerate project files")]
    Walk(#[from] walkdir::Error),
}

/// Loads projects from disk.
///
/// A project consists of a manifest and every file with the source extension in the directory
/// of the manifest or one of its subdirectories.
#[derive(Debug, Clone)]
pub struct ProjectLoader {
    options: CompilationOptions,
    source_extension: String,
    metadata_references: Vec<MetadataReference>,
}

impl ProjectLoader {
    pub fn new(options: CompilationOptions, source_extension: impl Into<String>) -> Self {
        ProjectLoader {
            options,
            source_extension: source_extension.into(),
            metadata_references: Vec::new(),
        }
    }

    pub fn with_metadata_references(
        mut self,
        references: impl IntoIterator<Item = MetadataReference>,
    ) -> Self {
        self.metadata_references = references.into_iter().collect();
        self
    }

    /// Loads the project described by the manifest at `manifest_path` into a new solution.
    pub fn load(&self, manifest_path: &Path) -> Result<Project, LoadError> {
        self.load_into(&Solution::new(), manifest_path)
    }

    /// Loads the project described by the manifest at `manifest_path` into `solution`.
    pub fn load_into(&self, solution: &Solution, manifest_path: &Path) -> Result<Project, LoadError> {
        let manifest_path = fs::canonicalize(manifest_path)
            .map(AbsPathBuf::assert)
            .map_err(|source| LoadError::InvalidManifestPath {
                path: manifest_path.to_path_buf(),
                source,
            })?;
        let name = manifest_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let directory = manifest_path.parent().unwrap_or_else(|| manifest_path.clone());

        log::info!("loading project '{name}' from {manifest_path}");

        let mut documents = Vec::new();
        for entry in WalkDir::new(&directory).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(self.source_extension.as_str())
            {
                continue;
            }

            let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let path = AbsPathBuf::assert(path);
            let name = directory
                .relative_path_to(&path)
                .map_or_else(|| path.to_string(), |relative| relative.to_string());
            log::trace!("found document {name}");
            documents.push(DocumentInfo::from_text(name, text).with_file_path(path));
        }

        let info = ProjectInfo::new(name, self.options.clone())
            .with_file_path(manifest_path)
            .with_metadata_references(self.metadata_references.iter().cloned())
            .with_documents(documents);
        Ok(solution.add_project(info))
    }
}

/// Finds a manifest with the given extension in `directory` or one of its parents. Within a
/// directory the manifest with the lexicographically smallest name wins.
pub fn find_manifest(directory: &Path, extension: &str) -> Option<PathBuf> {
    let mut current_dir = Some(directory);
    while let Some(dir) = current_dir {
        let mut manifests = fs::read_dir(dir)
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(extension)
            })
            .collect::<Vec<_>>();
        manifests.sort();
        if let Some(manifest) = manifests.into_iter().next() {
            return Some(manifest);
        }
        current_dir = dir.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{find_manifest, ProjectLoader};
    use crate::CompilationOptions;

    #[test]
    fn test_find_manifest() {
        let dir = tempfile::Builder::new()
            .prefix("test_find_manifest")
            .tempdir()
            .unwrap();
        let path = dir.path();
        let manifest_path = path.join("app.sproj");

        assert_eq!(find_manifest(path, "sproj"), None);

        std::fs::write(&manifest_path, "").unwrap();
        assert_eq!(find_manifest(path, "sproj").as_ref(), Some(&manifest_path));

        let subdir_path = path.join("some/random/subdir");
        std::fs::create_dir_all(&subdir_path).unwrap();
        assert_eq!(
            find_manifest(&subdir_path, "sproj").as_ref(),
            Some(&manifest_path)
        );
    }

    #[test]
    fn loads_sources_sorted() {
        let dir = tempfile::Builder::new()
            .prefix("loads_sources_sorted")
            .tempdir()
            .unwrap();
        let path = dir.path();
        std::fs::write(path.join("app.sproj"), "<Project />").unwrap();
        std::fs::create_dir_all(path.join("src")).unwrap();
        std::fs::write(path.join("src/b.sidl"), "type b {}").unwrap();
        std::fs::write(path.join("a.sidl"), "type a {}").unwrap();
        std::fs::write(path.join("notes.txt"), "ignored").unwrap();

        let project = ProjectLoader::new(CompilationOptions::new("snake"), "sidl")
            .load(&path.join("app.sproj"))
            .unwrap();

        assert_eq!(project.name(), "app");
        assert_eq!(
            project
                .documents()
                .map(|document| (document.name().to_owned(), document.text().to_owned()))
                .collect::<Vec<_>>(),
            vec![
                ("a.sidl".to_owned(), "type a {}".to_owned()),
                ("src/b.sidl".to_owned(), "type b {}".to_owned())
            ]
        );
        let directory = project.directory_path().unwrap();
        assert_eq!(
            directory.as_path(),
            std::fs::canonicalize(path).unwrap().as_path()
        );
    }

    #[test]
    fn missing_manifest() {
        let loader = ProjectLoader::new(CompilationOptions::new("snake"), "sidl");
        assert!(loader.load(std::path::Path::new("/does/not/exist.sproj")).is_err());
    }
}
