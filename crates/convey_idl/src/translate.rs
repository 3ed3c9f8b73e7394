//! Translation of snake documents into the pascal dialect.

use convey_syntax::{
    Annotation, AnnotationKind, Element, ElementId, SyntaxKind, SyntaxTree, SyntaxTreeBuilder,
    TokenData,
};
use rustc_hash::FxHashSet;

use crate::{
    ast::{child_token, type_defs, type_ref},
    syntax_kind::{
        DOT, FIELD, FIELDS, GLOBAL_KW, IDENT, INTERNAL_KW, NAME, PRIVATE_KW, RECORD_KW, TYPE_DEF,
        TYPE_KW, TYPE_REF,
    },
    Dialect, IdlCompilation,
};

/// Translates a snake syntax tree into a pascal syntax tree.
///
/// Type references are resolved through `shadow`, the compilation that shows the project in
/// the pascal dialect. References to types declared in another document are written fully
/// qualified, references that cannot be resolved are annotated with an error. Trivia and
/// annotations are carried over, a selected field list is additionally marked as a selection
/// wrapper so that a single selected field is extracted on its own.
pub(crate) fn translate(tree: &SyntaxTree, shadow: &IdlCompilation) -> SyntaxTree {
    let local_types = type_defs(tree)
        .into_iter()
        .filter_map(|def| def.name)
        .collect();
    let mut translator = Translator {
        source: tree,
        shadow,
        local_types,
        builder: SyntaxTreeBuilder::new(),
    };
    translator.element(tree.root());
    translator.builder.finish()
}

struct Translator<'a> {
    source: &'a SyntaxTree,
    shadow: &'a IdlCompilation,
    /// Snake names of the types declared in the translated document
    local_types: FxHashSet<String>,
    builder: SyntaxTreeBuilder,
}

impl Translator<'_> {
    fn element(&mut self, id: ElementId) -> ElementId {
        let source = self.source;
        let translated = match source.element(id) {
            Element::Token(token) => {
                let (kind, text) = self.translate_token(id, token);
                self.builder.token_with_trivia(
                    kind,
                    text,
                    token.leading_trivia.clone(),
                    token.trailing_trivia.clone(),
                )
            }
            Element::Node(node) if node.kind() == TYPE_REF => self.type_ref(id),
            Element::Node(node) => {
                self.builder.start_node(node.kind());
                for &child in node.children() {
                    self.element(child);
                }
                self.builder.finish_node()
            }
        };

        self.builder.copy_annotations(source, id, translated);
        if source.kind(id) == FIELDS && self.is_selected(id) {
            self.builder
                .annotate(translated, Annotation::selection_wrapper());
        }
        translated
    }

    fn translate_token(&self, id: ElementId, token: &TokenData) -> (SyntaxKind, String) {
        match token.kind {
            TYPE_KW => (RECORD_KW, "record".to_owned()),
            PRIVATE_KW => (INTERNAL_KW, "internal".to_owned()),
            IDENT => {
                let owner = self
                    .source
                    .parent(id)
                    .filter(|&parent| self.source.kind(parent) == NAME)
                    .and_then(|name| self.source.parent(name))
                    .map(|owner| self.source.kind(owner));
                let text = match owner {
                    Some(TYPE_DEF) => Dialect::Pascal.type_name(&token.text),
                    Some(FIELD) => Dialect::Pascal.field_name(&token.text),
                    _ => token.text.to_string(),
                };
                (IDENT, text)
            }
            kind => (kind, token.text.to_string()),
        }
    }

    fn type_ref(&mut self, id: ElementId) -> ElementId {
        let source = self.source;
        let (Some(name), Some(token)) = (
            type_ref(source, id).name,
            child_token(source, id, IDENT).and_then(|token| source.token(token)),
        ) else {
            self.builder.start_node(TYPE_REF);
            for &child in source.children(id) {
                self.element(child);
            }
            return self.builder.finish_node();
        };

        let pascal = Dialect::Pascal.type_name(&name);
        self.builder.start_node(TYPE_REF);
        if let Some(builtin) = Dialect::Snake
            .builtin(&name)
            .and_then(|canonical| Dialect::Pascal.builtin_name(canonical))
        {
            self.ident(token, builtin);
        } else if self.local_types.contains(&name) {
            self.ident(token, &pascal);
        } else if self.shadow.resolves(&pascal) {
            self.builder.token_with_trivia(
                GLOBAL_KW,
                "global",
                token.leading_trivia.clone(),
                Vec::new(),
            );
            self.builder.token(DOT, ".");
            self.builder.token_with_trivia(
                IDENT,
                pascal.as_str(),
                Vec::new(),
                token.trailing_trivia.clone(),
            );
        } else {
            let ident = self.ident(token, &pascal);
            self.builder.annotate(
                ident,
                Annotation::conversion_error(format!("unresolved type '{name}'")),
            );
        }
        self.builder.finish_node()
    }

    fn ident(&mut self, token: &TokenData, text: &str) -> ElementId {
        self.builder.token_with_trivia(
            IDENT,
            text,
            token.leading_trivia.clone(),
            token.trailing_trivia.clone(),
        )
    }

    fn is_selected(&self, id: ElementId) -> bool {
        self.source
            .annotations(id)
            .iter()
            .any(|annotation| annotation.kind() == AnnotationKind::Selection)
    }
}
