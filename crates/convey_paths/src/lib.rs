//! Path types shared by the Convey crates.
//!
//! Projects are rooted at an absolute directory while the files they declare are usually
//! referred to relative to that directory. [`AbsPathBuf`] guarantees the former, the
//! [`RelativePath`] types of the `relative-path` crate are used for the latter.

mod abs_path;

pub use abs_path::AbsPathBuf;
pub use relative_path::{RelativePath, RelativePathBuf};
