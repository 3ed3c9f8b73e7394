use std::fs;

use convey_paths::AbsPathBuf;
use convey_project::{CompilationOptions, DocumentInfo, Project, ProjectInfo, Solution};

use crate::Fixture;

/// Creates a project that only exists in memory from a fixture.
///
/// Documents get absolute paths below a directory that does not exist on disk. The project has
/// no manifest, it is part of a solution whose file lives in that same directory.
pub fn in_memory_project(name: &str, options: CompilationOptions, fixture: &str) -> Project {
    let root = AbsPathBuf::assert(std::env::temp_dir())
        .join("convey_test")
        .join(name);
    let project = Solution::from_file_path(root.join(format!("{name}.sln")))
        .add_project(ProjectInfo::new(name, options));
    Fixture::parse(fixture)
        .into_iter()
        .fold(project, |project, fixture| {
            let info = DocumentInfo::from_text(fixture.relative_path.as_str(), fixture.text)
                .with_file_path(root.join(fixture.relative_path.as_str()));
            project.add_document(info).project().clone()
        })
}

/// A fixture written to a temporary directory. The directory is removed when the workspace is
/// dropped.
#[derive(Debug)]
pub struct TestWorkspace {
    _temp_dir: tempfile::TempDir,
    root: AbsPathBuf,
}

impl TestWorkspace {
    pub fn from_fixture(text: &str) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = AbsPathBuf::assert(temp_dir.path().canonicalize().unwrap());
        for fixture in Fixture::parse(text) {
            let path = fixture.relative_path.to_path(&root);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, fixture.text).unwrap();
        }
        TestWorkspace {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// The directory that contains the files of the fixture.
    pub fn root(&self) -> &AbsPathBuf {
        &self.root
    }

    pub fn path(&self, relative_path: &str) -> AbsPathBuf {
        self.root.join(relative_path)
    }

    pub fn read(&self, relative_path: &str) -> String {
        fs::read_to_string(self.path(relative_path)).unwrap()
    }
}
