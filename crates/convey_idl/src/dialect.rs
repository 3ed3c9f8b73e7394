use convey_syntax::SyntaxKind;

use crate::{
    names::{to_camel_case, to_pascal_case, to_snake_case},
    syntax_kind::{GLOBAL_KW, INTERNAL_KW, PRIVATE_KW, RECORD_KW, TYPE_KW},
};

/// The builtin types, pairing the snake name with the pascal name.
const BUILTIN_TYPES: [(&str, &str); 4] = [
    ("int", "Int32"),
    ("float", "Double"),
    ("string", "String"),
    ("bool", "Boolean"),
];

/// One of the two record definition languages.
///
/// Names of declarations are compared in their *canonical* form, which is the snake case
/// spelling. Each dialect spells canonical names in its own convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `private type person_id { value: int; }`
    Snake,
    /// `internal record PersonId { value: Int32; }`
    Pascal,
}

impl Dialect {
    /// Returns the dialect identified by the language name of compilation options.
    pub fn from_language(language: &str) -> Option<Dialect> {
        match language {
            "snake" => Some(Dialect::Snake),
            "pascal" => Some(Dialect::Pascal),
            _ => None,
        }
    }

    pub fn language(self) -> &'static str {
        match self {
            Dialect::Snake => "snake",
            Dialect::Pascal => "pascal",
        }
    }

    /// The extension of documents
    pub fn extension(self) -> &'static str {
        match self {
            Dialect::Snake => "sidl",
            Dialect::Pascal => "pidl",
        }
    }

    /// The extension of project manifests
    pub fn manifest_extension(self) -> &'static str {
        match self {
            Dialect::Snake => "sproj",
            Dialect::Pascal => "pproj",
        }
    }

    pub(crate) fn keyword(self, text: &str) -> Option<SyntaxKind> {
        match (self, text) {
            (Dialect::Snake, "type") => Some(TYPE_KW),
            (Dialect::Snake, "private") => Some(PRIVATE_KW),
            (Dialect::Pascal, "record") => Some(RECORD_KW),
            (Dialect::Pascal, "internal") => Some(INTERNAL_KW),
            (Dialect::Pascal, "global") => Some(GLOBAL_KW),
            _ => None,
        }
    }

    /// Returns the canonical name of a builtin type spelled in this dialect.
    pub fn builtin(self, name: &str) -> Option<&'static str> {
        BUILTIN_TYPES.iter().find_map(|&(snake, pascal)| {
            let spelled = match self {
                Dialect::Snake => snake,
                Dialect::Pascal => pascal,
            };
            (spelled == name).then_some(snake)
        })
    }

    /// Spells the canonical name of a builtin type in this dialect.
    pub fn builtin_name(self, canonical: &str) -> Option<&'static str> {
        BUILTIN_TYPES
            .iter()
            .find(|(snake, _)| *snake == canonical)
            .map(|&(snake, pascal)| match self {
                Dialect::Snake => snake,
                Dialect::Pascal => pascal,
            })
    }

    /// Spells a canonical type name in this dialect.
    pub fn type_name(self, canonical: &str) -> String {
        match self {
            Dialect::Snake => canonical.to_owned(),
            Dialect::Pascal => to_pascal_case(canonical),
        }
    }

    /// Spells a canonical field name in this dialect.
    pub fn field_name(self, canonical: &str) -> String {
        match self {
            Dialect::Snake => canonical.to_owned(),
            Dialect::Pascal => to_camel_case(canonical),
        }
    }

    /// Returns the canonical form of a name spelled in this dialect.
    pub fn canonical(self, name: &str) -> String {
        match self {
            Dialect::Snake => name.to_owned(),
            Dialect::Pascal => to_snake_case(name),
        }
    }
}
