mod classes;
mod cursor;

use convey_syntax::{SyntaxKind, TextSize};

use self::{
    classes::{is_ident_continue, is_ident_start, is_whitespace},
    cursor::Cursor,
};
use crate::{
    syntax_kind::{
        COLON, COMMENT, DOT, ERROR, IDENT, L_CURLY, NEWLINE, R_CURLY, SEMI, WHITESPACE,
    },
    Dialect,
};

/// A token of record definition source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: SyntaxKind,
    pub len: TextSize,
}

/// Breaks a string up into its tokens. Keywords are recognized according to `dialect`.
pub fn tokenize(text: &str, dialect: Dialect) -> Vec<Token> {
    let mut text = text;
    let mut result = Vec::new();
    while !text.is_empty() {
        let token = next_token(text, dialect);
        result.push(token);
        let len: u32 = token.len.into();
        text = &text[len as usize..];
    }
    result
}

/// Gets the next token from a non-empty string.
fn next_token(text: &str, dialect: Dialect) -> Token {
    let mut cursor = Cursor::new(text);
    let kind = match cursor.bump() {
        Some(c) => next_token_inner(c, &mut cursor, dialect),
        None => ERROR,
    };
    Token {
        kind,
        len: cursor.into_len(),
    }
}

fn next_token_inner(c: char, cursor: &mut Cursor<'_>, dialect: Dialect) -> SyntaxKind {
    match c {
        '\n' => return NEWLINE,
        '\r' if cursor.matches('\n') => {
            cursor.bump();
            return NEWLINE;
        }
        '/' if cursor.matches('/') => {
            cursor.bump_while(|c| c != '\n' && c != '\r');
            return COMMENT;
        }
        ':' => return COLON,
        ';' => return SEMI,
        '.' => return DOT,
        '{' => return L_CURLY,
        '}' => return R_CURLY,
        _ => {}
    }

    if is_whitespace(c) {
        cursor.bump_while(is_whitespace);
        return WHITESPACE;
    }

    if is_ident_start(c) {
        return scan_identifier_or_keyword(cursor, dialect);
    }

    ERROR
}

fn scan_identifier_or_keyword(cursor: &mut Cursor<'_>, dialect: Dialect) -> SyntaxKind {
    cursor.bump_while(is_ident_continue);
    dialect
        .keyword(cursor.current_token_text())
        .unwrap_or(IDENT)
}
