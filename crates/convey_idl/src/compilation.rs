//! The semantic model of a project: the types it can refer to and the problems found while
//! collecting them.

use std::fmt;

use convey_conversion::TranslationError;
use convey_project::{Document, MetadataImport, Project};
use convey_syntax::SyntaxTree;
use rustc_hash::FxHashMap;

use crate::{
    ast::{type_defs, type_refs, Visibility},
    parse, Dialect,
};

/// Where a symbol was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOrigin {
    /// A document of the compiled project
    Document(String),
    /// A referenced project
    Project(String),
    /// A metadata reference
    Library(String),
}

/// A type that the documents of a compilation can refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The name of the type, spelled in the dialect of the compilation
    pub name: String,
    pub visibility: Visibility,
    pub origin: SymbolOrigin,
}

/// A compiled project.
///
/// Types of referenced projects and metadata references are spelled in the dialect of the
/// compiled project. Restricted types of referenced projects are only visible when the
/// compilation options import more than public members.
#[derive(Debug)]
pub struct IdlCompilation {
    dialect: Dialect,
    symbols: FxHashMap<String, Symbol>,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Diagnostic {
    document: String,
    message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.document, self.message)
    }
}

/// Returns the dialect of the documents of `project`.
pub fn project_dialect(project: &Project) -> Result<Dialect, TranslationError> {
    let language = &project.options().language;
    Dialect::from_language(language).ok_or_else(|| {
        TranslationError::new(format!(
            "project '{}' uses the unsupported language '{language}'",
            project.name()
        ))
    })
}

/// Returns the syntax tree of a document, parsing its text if required, together with the
/// syntax errors found.
fn document_tree(document: &Document, dialect: Dialect) -> (SyntaxTree, Vec<String>) {
    if let Some(tree) = document.syntax_tree() {
        return (tree.clone(), Vec::new());
    }
    let parse = parse(document.text(), dialect);
    let errors = parse.errors().iter().map(ToString::to_string).collect();
    (parse.tree().clone(), errors)
}

impl IdlCompilation {
    pub fn compile(project: &Project) -> Result<IdlCompilation, TranslationError> {
        let dialect = project_dialect(project)?;
        let mut compilation = IdlCompilation {
            dialect,
            symbols: FxHashMap::default(),
            diagnostics: Vec::new(),
        };

        for reference in project.metadata_references() {
            for export in reference.exports() {
                compilation.import(
                    export,
                    Visibility::Public,
                    SymbolOrigin::Library(reference.name().to_owned()),
                );
            }
        }

        for &id in project.project_references() {
            let Some(referenced) = project.solution().project(id) else {
                log::warn!("project '{}' refers to an unknown project", project.name());
                continue;
            };
            let referenced_dialect = project_dialect(&referenced)?;
            for document in referenced.documents() {
                let (tree, _) = document_tree(&document, referenced_dialect);
                for def in type_defs(&tree) {
                    let Some(name) = def.name else { continue };
                    if def.visibility == Visibility::Restricted
                        && project.options().metadata_import == MetadataImport::Public
                    {
                        continue;
                    }
                    compilation.import(
                        &referenced_dialect.canonical(&name),
                        def.visibility,
                        SymbolOrigin::Project(referenced.name().to_owned()),
                    );
                }
            }
        }

        let mut references = Vec::new();
        for document in project.documents() {
            let (tree, errors) = document_tree(&document, dialect);
            for error in errors {
                compilation.report(document.name(), error);
            }
            for def in type_defs(&tree) {
                let Some(name) = def.name else { continue };
                compilation.declare(document.name(), name, def.visibility);
            }
            references.push((document.name().to_owned(), type_refs(&tree, tree.root())));
        }

        for (document, refs) in references {
            for name in refs.into_iter().filter_map(|ty| ty.name) {
                if !compilation.resolves(&name) {
                    compilation.report(&document, format!("unresolved type '{name}'"));
                }
            }
        }

        log::debug!(
            "compiled '{}' with {} symbols and {} diagnostics",
            project.name(),
            compilation.symbols.len(),
            compilation.diagnostics.len()
        );
        Ok(compilation)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Looks up a type by its name as spelled in the dialect of this compilation.
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Returns true if `name` is a builtin type or a known symbol.
    pub fn resolves(&self, name: &str) -> bool {
        self.dialect.builtin(name).is_some() || self.symbols.contains_key(name)
    }

    /// Returns the names of all symbols in alphabetical order.
    pub fn symbol_names(&self) -> Vec<&str> {
        let mut names = self.symbols.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    /// Renders every problem found, prefixed by the name of the document it was found in.
    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    /// Adds a symbol declared outside of this project, unless one with the same name exists.
    fn import(&mut self, canonical: &str, visibility: Visibility, origin: SymbolOrigin) {
        let name = self.dialect.type_name(canonical);
        self.symbols.entry(name.clone()).or_insert(Symbol {
            name,
            visibility,
            origin,
        });
    }

    /// Adds a symbol declared by a document of this project. Such symbols hide imported
    /// symbols with the same name.
    fn declare(&mut self, document: &str, name: String, visibility: Visibility) {
        if let Some(existing) = self.symbols.get(&name) {
            if matches!(existing.origin, SymbolOrigin::Document(_)) {
                self.report(document, format!("duplicate type '{name}'"));
                return;
            }
        }
        self.symbols.insert(
            name.clone(),
            Symbol {
                name,
                visibility,
                origin: SymbolOrigin::Document(document.to_owned()),
            },
        );
    }

    fn report(&mut self, document: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            document: document.to_owned(),
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use convey_project::{
        CompilationOptions, DocumentInfo, MetadataImport, MetadataReference, ProjectInfo,
        Solution,
    };
    use convey_test::in_memory_project;

    use super::{IdlCompilation, SymbolOrigin};

    #[test]
    fn diagnostics() {
        let project = in_memory_project(
            "people",
            CompilationOptions::new("snake"),
            r#"
            //- /person.sidl
            type person { home: address; name: string; }
            //- /other.sidl
            type person { age: int }
            "#,
        );
        let compilation = IdlCompilation::compile(&project).unwrap();
        assert_eq!(
            compilation.diagnostics(),
            vec![
                "other.sidl: expected ';'",
                "other.sidl: duplicate type 'person'",
                "person.sidl: unresolved type 'address'",
            ]
        );
    }

    #[test]
    fn referenced_projects_are_spelled_in_the_compiled_dialect() {
        let solution = Solution::new();
        let library = solution.add_project(
            ProjectInfo::new("library", CompilationOptions::new("snake")).with_documents([
                DocumentInfo::from_text(
                    "library.sidl",
                    "type postal_address {}\nprivate type secret_key {}",
                ),
            ]),
        );
        let library_id = library.id();
        let solution = library.solution().clone();

        let public_only = solution.add_project(
            ProjectInfo::new("public", CompilationOptions::new("pascal"))
                .with_project_references([library_id]),
        );
        let compilation = IdlCompilation::compile(&public_only).unwrap();
        assert_eq!(compilation.symbol_names(), vec!["PostalAddress"]);
        assert_eq!(
            compilation.symbol("PostalAddress").unwrap().origin,
            SymbolOrigin::Project("library".to_owned())
        );

        let everything = public_only.solution().add_project(
            ProjectInfo::new(
                "all",
                CompilationOptions::new("pascal").with_metadata_import(MetadataImport::All),
            )
            .with_project_references([library_id])
            .with_metadata_references([MetadataReference::new("time", ["date_time"])]),
        );
        let compilation = IdlCompilation::compile(&everything).unwrap();
        assert_eq!(
            compilation.symbol_names(),
            vec!["DateTime", "PostalAddress", "SecretKey"]
        );
        assert!(compilation.resolves("Int32"));
        assert!(!compilation.resolves("int"));
    }

    #[test]
    fn unsupported_language_is_an_error() {
        let project = in_memory_project("cobol", CompilationOptions::new("cobol"), "");
        let error = IdlCompilation::compile(&project).unwrap_err();
        assert_eq!(
            error.message(),
            "project 'cobol' uses the unsupported language 'cobol'"
        );
    }
}
