use std::sync::Arc;

use smol_str::SmolStr;

/// Which members of referenced projects are visible to a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MetadataImport {
    /// Only public members are imported.
    #[default]
    Public,

    /// Public and internal members are imported.
    Internal,

    /// Every member is imported regardless of its visibility.
    All,
}

/// Options that describe how the documents of a project are compiled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CompilationOptions {
    /// The name of the language the documents are written in
    pub language: SmolStr,
    /// The language version declared for the project, if any
    pub language_version: Option<String>,
    /// The namespace that contains every declaration of the project, if any
    pub root_namespace: Option<String>,
    pub metadata_import: MetadataImport,
}

impl CompilationOptions {
    pub fn new(language: impl Into<SmolStr>) -> Self {
        CompilationOptions {
            language: language.into(),
            ..CompilationOptions::default()
        }
    }

    pub fn with_language_version(mut self, version: impl Into<String>) -> Self {
        self.language_version = Some(version.into());
        self
    }

    pub fn with_root_namespace(mut self, root_namespace: impl Into<String>) -> Self {
        self.root_namespace = Some(root_namespace.into());
        self
    }

    pub fn with_metadata_import(mut self, metadata_import: MetadataImport) -> Self {
        self.metadata_import = metadata_import;
        self
    }
}

/// A precompiled library that a project depends on. The library is described by the names of
/// the symbols it exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataReference {
    name: SmolStr,
    exports: Arc<[SmolStr]>,
}

impl MetadataReference {
    pub fn new(
        name: impl Into<SmolStr>,
        exports: impl IntoIterator<Item = impl Into<SmolStr>>,
    ) -> Self {
        MetadataReference {
            name: name.into(),
            exports: exports.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exports(&self) -> &[SmolStr] {
        &self.exports
    }
}
