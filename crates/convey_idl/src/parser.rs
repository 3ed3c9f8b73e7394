//! A recursive descent parser for both dialects.
//!
//! Parsing never fails. Problems are reported as [`ParseError`]s next to a tree that still
//! contains every character of the input, unexpected tokens end up in error nodes.

use std::mem;

use convey_syntax::{SyntaxKind, SyntaxTree, SyntaxTreeBuilder, TextRange, TextSize, Trivia};
use thiserror::Error;

use crate::{
    lexer::tokenize,
    syntax_kind::{
        is_trivia, COLON, COMMENT, DOT, EOF, ERROR_NODE, FIELD, FIELDS, FIELD_LIST, GLOBAL_KW,
        IDENT, INTERNAL_KW, L_CURLY, NAME, NEWLINE, PRIVATE_KW, RECORD_KW, R_CURLY, SEMI,
        SOURCE_FILE, TYPE_DEF, TYPE_KW, TYPE_REF, VISIBILITY, WHITESPACE,
    },
    Dialect,
};

/// A syntax error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    /// The range of the offending token
    pub range: TextRange,
}

/// The result of parsing a document.
#[derive(Debug, Clone)]
pub struct Parse {
    tree: SyntaxTree,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Returns the tree if no errors were found, otherwise the first error.
    pub fn ok(self) -> Result<SyntaxTree, ParseError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.tree),
        }
    }
}

/// Parses a document written in `dialect`.
pub fn parse(text: &str, dialect: Dialect) -> Parse {
    let mut parser = Parser::new(text, dialect);
    parser.source_file();
    Parse {
        tree: parser.builder.finish(),
        errors: parser.errors,
    }
}

/// A significant token with the trivia it owns.
struct LexedToken<'t> {
    kind: SyntaxKind,
    text: &'t str,
    range: TextRange,
    leading: Vec<Trivia>,
    trailing: Vec<Trivia>,
}

/// Groups the tokens of `text` into significant tokens. A token owns the trivia that follows it
/// up to and including the end of its line, all other trivia belongs to the next token. The
/// last token is always an empty [`EOF`] token.
fn lex(text: &str, dialect: Dialect) -> Vec<LexedToken<'_>> {
    let mut offset = TextSize::from(0);
    let raw = tokenize(text, dialect)
        .into_iter()
        .map(|token| {
            let range = TextRange::at(offset, token.len);
            offset += token.len;
            (token.kind, range, &text[range])
        })
        .collect::<Vec<_>>();

    let mut tokens: Vec<LexedToken<'_>> = Vec::new();
    let mut pending = Vec::new();
    let mut index = 0;
    while index < raw.len() {
        let (kind, range, token_text) = raw[index];
        index += 1;
        if is_trivia(kind) {
            pending.push(to_trivia(kind, token_text));
            continue;
        }

        let mut trailing = Vec::new();
        while let Some(&(kind, _, trivia_text)) = raw.get(index) {
            if !is_trivia(kind) {
                break;
            }
            trailing.push(to_trivia(kind, trivia_text));
            index += 1;
            if kind == NEWLINE {
                break;
            }
        }
        tokens.push(LexedToken {
            kind,
            text: token_text,
            range,
            leading: mem::take(&mut pending),
            trailing,
        });
    }
    tokens.push(LexedToken {
        kind: EOF,
        text: "",
        range: TextRange::empty(offset),
        leading: pending,
        trailing: Vec::new(),
    });
    tokens
}

fn to_trivia(kind: SyntaxKind, text: &str) -> Trivia {
    match kind {
        WHITESPACE => Trivia::whitespace(text),
        COMMENT => Trivia::comment(text),
        _ => Trivia::end_of_line(text),
    }
}

struct Parser<'t> {
    dialect: Dialect,
    tokens: Vec<LexedToken<'t>>,
    pos: usize,
    builder: SyntaxTreeBuilder,
    errors: Vec<ParseError>,
}

impl<'t> Parser<'t> {
    fn new(text: &'t str, dialect: Dialect) -> Self {
        Parser {
            dialect,
            tokens: lex(text, dialect),
            pos: 0,
            builder: SyntaxTreeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn current(&self) -> SyntaxKind {
        self.tokens.get(self.pos).map_or(EOF, |token| token.kind)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_type_def(&self) -> bool {
        matches!(
            self.current(),
            TYPE_KW | RECORD_KW | PRIVATE_KW | INTERNAL_KW
        )
    }

    /// Adds the current token to the tree. The end of file token is only added once.
    fn bump(&mut self) {
        let Some(token) = self.tokens.get_mut(self.pos) else {
            return;
        };
        self.builder.token_with_trivia(
            token.kind,
            token.text,
            mem::take(&mut token.leading),
            mem::take(&mut token.trailing),
        );
        self.pos += 1;
    }

    fn expect(&mut self, kind: SyntaxKind, description: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error(format!("expected {description}"));
            false
        }
    }

    fn error(&mut self, message: String) {
        let range = self
            .tokens
            .get(self.pos)
            .map_or_else(TextRange::default, |token| token.range);
        self.errors.push(ParseError { message, range });
    }

    /// Reports an error and wraps the current token in an error node.
    fn error_bump(&mut self, message: String) {
        self.error(message);
        self.builder.start_node(ERROR_NODE);
        self.bump();
        self.builder.finish_node();
    }

    fn definition_keyword(&self) -> (SyntaxKind, &'static str) {
        match self.dialect {
            Dialect::Snake => (TYPE_KW, "'type'"),
            Dialect::Pascal => (RECORD_KW, "'record'"),
        }
    }

    fn source_file(&mut self) {
        self.builder.start_node(SOURCE_FILE);
        while !self.at(EOF) {
            if self.at_type_def() {
                self.type_def();
            } else {
                let (_, keyword) = self.definition_keyword();
                self.error_bump(format!("expected {keyword}"));
            }
        }
        self.bump();
        self.builder.finish_node();
    }

    fn type_def(&mut self) {
        self.builder.start_node(TYPE_DEF);
        if matches!(self.current(), PRIVATE_KW | INTERNAL_KW) {
            self.builder.start_node(VISIBILITY);
            self.bump();
            self.builder.finish_node();
        }
        let (keyword, description) = self.definition_keyword();
        self.expect(keyword, description);
        if self.at(IDENT) {
            self.name();
        } else {
            self.error("expected a name".to_owned());
        }
        if self.at(L_CURLY) {
            self.field_list();
        } else {
            self.error("expected '{'".to_owned());
        }
        self.builder.finish_node();
    }

    fn name(&mut self) {
        self.builder.start_node(NAME);
        self.bump();
        self.builder.finish_node();
    }

    fn field_list(&mut self) {
        self.builder.start_node(FIELD_LIST);
        self.bump();
        self.builder.start_node(FIELDS);
        while !self.at(R_CURLY) && !self.at(EOF) && !self.at_type_def() {
            if self.at(IDENT) {
                self.field();
            } else {
                self.error_bump("expected a field".to_owned());
            }
        }
        self.builder.finish_node();
        self.expect(R_CURLY, "'}'");
        self.builder.finish_node();
    }

    fn field(&mut self) {
        self.builder.start_node(FIELD);
        self.name();
        self.expect(COLON, "':'");
        if self.at(IDENT) || self.at(GLOBAL_KW) {
            self.type_ref();
        } else {
            self.error("expected a type".to_owned());
        }
        self.expect(SEMI, "';'");
        self.builder.finish_node();
    }

    fn type_ref(&mut self) {
        self.builder.start_node(TYPE_REF);
        if self.at(GLOBAL_KW) {
            self.bump();
            self.expect(DOT, "'.'");
        }
        self.expect(IDENT, "a type name");
        self.builder.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::{syntax_kind::kind_name, Dialect};

    #[test]
    fn parse_preserves_text() {
        let text = "// people\n\nprivate type id { value: int; }\n\ntype person {\n  id: id; // key\n}\n";
        let parse = parse(text, Dialect::Snake);
        assert!(parse.errors().is_empty());
        assert_eq!(parse.tree().to_full_string(), text);
    }

    #[test]
    fn snake_type_definition() {
        let parse = parse("type a {\n  b: int;\n}\n", Dialect::Snake);
        insta::assert_snapshot!(parse.tree().debug_dump(kind_name), @r###"
        SOURCE_FILE@0..21
          TYPE_DEF@0..20
            TYPE_KW@0..4 "type"
            NAME@5..6
              IDENT@5..6 "a"
            FIELD_LIST@7..20
              L_CURLY@7..8 "{"
              FIELDS@11..18
                FIELD@11..18
                  NAME@11..12
                    IDENT@11..12 "b"
                  COLON@12..13 ":"
                  TYPE_REF@14..17
                    IDENT@14..17 "int"
                  SEMI@17..18 ";"
              R_CURLY@19..20 "}"
          EOF@21..21 ""
        "###);
    }

    #[test]
    fn pascal_qualified_type_reference() {
        let parse = parse("internal record A { b: global.B; }", Dialect::Pascal);
        assert!(parse.errors().is_empty());
        insta::assert_snapshot!(parse.tree().debug_dump(kind_name), @r###"
        SOURCE_FILE@0..34
          TYPE_DEF@0..34
            VISIBILITY@0..8
              INTERNAL_KW@0..8 "internal"
            RECORD_KW@9..15 "record"
            NAME@16..17
              IDENT@16..17 "A"
            FIELD_LIST@18..34
              L_CURLY@18..19 "{"
              FIELDS@20..32
                FIELD@20..32
                  NAME@20..21
                    IDENT@20..21 "b"
                  COLON@21..22 ":"
                  TYPE_REF@23..31
                    GLOBAL_KW@23..29 "global"
                    DOT@29..30 "."
                    IDENT@30..31 "B"
                  SEMI@31..32 ";"
              R_CURLY@33..34 "}"
          EOF@34..34 ""
        "###);
    }

    #[test]
    fn errors_are_reported_with_their_range() {
        let text = "type a { b int; } = type";
        let parse = parse(text, Dialect::Snake);
        let errors = parse
            .errors()
            .iter()
            .map(|error| (error.message.as_str(), &text[error.range]))
            .collect::<Vec<_>>();
        assert_eq!(
            errors,
            vec![
                ("expected ':'", "int"),
                ("expected 'type'", "="),
                ("expected a name", ""),
                ("expected '{'", ""),
            ]
        );
        assert_eq!(parse.tree().to_full_string(), text);
    }

    #[test]
    fn keywords_of_the_other_dialect_are_names() {
        let parse = parse("record A {}", Dialect::Snake);
        assert_eq!(parse.errors().len(), 4);
        assert!(parse.ok().is_err());
        assert!(super::parse("record A {}", Dialect::Pascal).ok().is_ok());
    }
}
