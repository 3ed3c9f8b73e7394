//! Test support for Convey: projects described by fixtures, either in memory or on disk.

mod fixture;
mod workspace;

pub use crate::{
    fixture::{trim_raw_string_literal, Fixture},
    workspace::{in_memory_project, TestWorkspace},
};
