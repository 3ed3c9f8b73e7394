//! Tracks the text a user selected through the conversion of a document.
//!
//! Before conversion the node that covers the selection is marked with a selection annotation.
//! Languages carry that annotation to the converted node, which allows the converted code of
//! just the selection to be extracted after the second pass.

use convey_project::Document;
use convey_syntax::{Annotation, AnnotationKind, ElementId, SyntaxTree, TextRange, Trivia};

use crate::{LanguageConversion, TranslationError};

/// Returns a snapshot of `document` in which the node that covers `span` is annotated as the
/// selection. The document is parsed if it was not parsed before.
pub(crate) fn with_annotated_selection<L: LanguageConversion>(
    language: &L,
    document: &Document,
    span: TextRange,
) -> Result<Document, TranslationError> {
    let tree = match document.syntax_tree() {
        Some(tree) => tree.clone(),
        None => language.parse(document)?,
    };
    let node = tree.find_node(span);
    log::trace!("selection {span:?} covered by {:?}", tree.kind(node));
    Ok(document.with_syntax_tree(tree.with_annotation(node, Annotation::selection())))
}

/// Finds the converted counterpart of the selection. A wrapper that was introduced around the
/// selection is replaced by its only meaningful child. Without a selection the whole tree is
/// selected.
pub(crate) fn selected_node<L: LanguageConversion>(language: &L, tree: &SyntaxTree) -> ElementId {
    let Some(&node) = tree.annotated_elements(AnnotationKind::Selection).first() else {
        return tree.root();
    };
    if tree.annotations(node).contains(&Annotation::selection_wrapper()) {
        if let [child] = language.find_single_important_child(tree, node)[..] {
            return child;
        }
    }
    node
}

/// Returns the formatted code of the selection.
///
/// Formatting drops the trivia at the edges of the selection. Trivia that belongs to the
/// neighbouring tokens is put back when it holds more than layout, so comments directly next
/// to the selection survive.
pub(crate) fn extract_selection<L: LanguageConversion>(
    language: &L,
    tree: &SyntaxTree,
) -> SyntaxTree {
    let node = selected_node(language, tree);

    let leading = tree
        .first_token(node)
        .and_then(|token| tree.previous_token(token))
        .and_then(|token| tree.token(token))
        .map(|token| token.trailing_trivia.clone())
        .unwrap_or_default();
    let trailing = tree
        .last_token(node)
        .and_then(|token| tree.next_token(token))
        .and_then(|token| tree.token(token))
        .map(|token| token.leading_trivia.clone())
        .unwrap_or_default();

    let mut selection = language.format(&tree.subtree(node));
    if is_significant(&leading) {
        selection = selection.with_prepended_leading_trivia(&leading);
    }
    if is_significant(&trailing) {
        selection = selection.with_appended_trailing_trivia(&trailing);
    }
    selection
}

fn is_significant(trivia: &[Trivia]) -> bool {
    trivia
        .iter()
        .any(|trivia| !trivia.is_whitespace_or_end_of_line())
}
