use std::{
    borrow::Borrow,
    convert::TryFrom,
    fmt,
    ops::Deref,
    path::{Component, Path, PathBuf},
};

use relative_path::RelativePathBuf;

/// An owned path that is known to be absolute.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct AbsPathBuf(PathBuf);

impl AbsPathBuf {
    /// Wraps `path`, panics if the path is not absolute.
    pub fn assert(path: impl Into<PathBuf>) -> AbsPathBuf {
        let path = path.into();
        assert!(path.is_absolute(), "expected an absolute path: {}", path.display());
        AbsPathBuf(path)
    }

    /// Returns the underlying [`Path`].
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns the parent directory, if any.
    pub fn parent(&self) -> Option<AbsPathBuf> {
        self.0.parent().map(|parent| AbsPathBuf(parent.to_path_buf()))
    }

    /// Adjoins `path` to this path. An absolute `path` replaces `self` entirely.
    pub fn join(&self, path: impl AsRef<Path>) -> AbsPathBuf {
        AbsPathBuf(self.0.join(path))
    }

    /// Lexically removes `.` components and resolves `..` components. The file system is not
    /// consulted so symbolic links are not taken into account.
    pub fn normalize(&self) -> AbsPathBuf {
        let mut normalized = PathBuf::new();
        for component in self.0.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
                other => normalized.push(other.as_os_str()),
            }
        }
        AbsPathBuf(normalized)
    }

    /// Returns `path` relative to this directory, or `None` if `path` does not live below it.
    pub fn relative_path_to(&self, path: impl AsRef<Path>) -> Option<RelativePathBuf> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            AbsPathBuf(path.to_path_buf()).normalize()
        } else {
            self.join(path).normalize()
        };
        let stripped = path.0.strip_prefix(self.normalize().0).ok()?;
        RelativePathBuf::from_path(stripped).ok()
    }
}

impl TryFrom<PathBuf> for AbsPathBuf {
    type Error = PathBuf;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        if path.is_absolute() {
            Ok(AbsPathBuf(path))
        } else {
            Err(path)
        }
    }
}

impl From<AbsPathBuf> for PathBuf {
    fn from(path: AbsPathBuf) -> Self {
        path.0
    }
}

impl Deref for AbsPathBuf {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for AbsPathBuf {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Borrow<Path> for AbsPathBuf {
    fn borrow(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for AbsPathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.display(), f)
    }
}
