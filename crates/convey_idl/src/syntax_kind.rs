//! The kinds of nodes and tokens of both record definition dialects.

use convey_syntax::SyntaxKind;

// Tokens
pub const WHITESPACE: SyntaxKind = SyntaxKind(0);
pub const NEWLINE: SyntaxKind = SyntaxKind(1);
pub const COMMENT: SyntaxKind = SyntaxKind(2);
pub const ERROR: SyntaxKind = SyntaxKind(3);
pub const IDENT: SyntaxKind = SyntaxKind(4);
pub const COLON: SyntaxKind = SyntaxKind(5);
pub const SEMI: SyntaxKind = SyntaxKind(6);
pub const DOT: SyntaxKind = SyntaxKind(7);
pub const L_CURLY: SyntaxKind = SyntaxKind(8);
pub const R_CURLY: SyntaxKind = SyntaxKind(9);
pub const TYPE_KW: SyntaxKind = SyntaxKind(10);
pub const PRIVATE_KW: SyntaxKind = SyntaxKind(11);
pub const RECORD_KW: SyntaxKind = SyntaxKind(12);
pub const INTERNAL_KW: SyntaxKind = SyntaxKind(13);
pub const GLOBAL_KW: SyntaxKind = SyntaxKind(14);
/// Carries the trivia at the end of a file.
pub const EOF: SyntaxKind = SyntaxKind(15);

// Nodes
pub const SOURCE_FILE: SyntaxKind = SyntaxKind(100);
pub const TYPE_DEF: SyntaxKind = SyntaxKind(101);
pub const VISIBILITY: SyntaxKind = SyntaxKind(102);
pub const NAME: SyntaxKind = SyntaxKind(103);
pub const FIELD_LIST: SyntaxKind = SyntaxKind(104);
/// The fields between the curly braces of a field list
pub const FIELDS: SyntaxKind = SyntaxKind(105);
pub const FIELD: SyntaxKind = SyntaxKind(106);
pub const TYPE_REF: SyntaxKind = SyntaxKind(107);
pub const ERROR_NODE: SyntaxKind = SyntaxKind(108);

pub fn is_trivia(kind: SyntaxKind) -> bool {
    matches!(kind, WHITESPACE | NEWLINE | COMMENT)
}

/// Returns a readable name of a kind, used when rendering trees.
pub fn kind_name(kind: SyntaxKind) -> &'static str {
    match kind {
        WHITESPACE => "WHITESPACE",
        NEWLINE => "NEWLINE",
        COMMENT => "COMMENT",
        ERROR => "ERROR",
        IDENT => "IDENT",
        COLON => "COLON",
        SEMI => "SEMI",
        DOT => "DOT",
        L_CURLY => "L_CURLY",
        R_CURLY => "R_CURLY",
        TYPE_KW => "TYPE_KW",
        PRIVATE_KW => "PRIVATE_KW",
        RECORD_KW => "RECORD_KW",
        INTERNAL_KW => "INTERNAL_KW",
        GLOBAL_KW => "GLOBAL_KW",
        EOF => "EOF",
        SOURCE_FILE => "SOURCE_FILE",
        TYPE_DEF => "TYPE_DEF",
        VISIBILITY => "VISIBILITY",
        NAME => "NAME",
        FIELD_LIST => "FIELD_LIST",
        FIELDS => "FIELDS",
        FIELD => "FIELD",
        TYPE_REF => "TYPE_REF",
        ERROR_NODE => "ERROR_NODE",
        _ => "UNKNOWN",
    }
}
