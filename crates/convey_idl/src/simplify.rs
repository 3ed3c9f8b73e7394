//! Simplification of fully qualified type references once every document was translated.

use convey_conversion::{EngineFault, TranslationError};
use convey_syntax::{Element, ElementId, SyntaxTree, SyntaxTreeBuilder};

use crate::{
    ast::{child_token, type_ref},
    syntax_kind::{GLOBAL_KW, IDENT, TYPE_REF},
    IdlCompilation, SIMPLIFIER_FAULTS,
};

/// Replaces `global.Name` by `Name` wherever `compilation` knows `Name`. References to types
/// the compilation does not know, such as types of documents that were not converted, stay
/// qualified.
pub(crate) fn simplify(
    tree: &SyntaxTree,
    compilation: &IdlCompilation,
    document: &str,
) -> Result<SyntaxTree, TranslationError> {
    let mut simplifier = Simplifier {
        source: tree,
        compilation,
        builder: SyntaxTreeBuilder::new(),
    };
    simplifier.element(tree.root()).map_err(|fault| {
        let message = format!("{fault} in {document}");
        SIMPLIFIER_FAULTS.report(EngineFault::new(message.clone()));
        TranslationError::new(message)
    })?;
    Ok(simplifier.builder.finish())
}

struct Simplifier<'a> {
    source: &'a SyntaxTree,
    compilation: &'a IdlCompilation,
    builder: SyntaxTreeBuilder,
}

impl Simplifier<'_> {
    fn element(&mut self, id: ElementId) -> Result<ElementId, &'static str> {
        let source = self.source;
        let copied = match source.element(id) {
            Element::Token(_) => return Ok(self.builder.copy_element(source, id)),
            Element::Node(node) if node.kind() == TYPE_REF => self.type_ref(id)?,
            Element::Node(node) => {
                self.builder.start_node(node.kind());
                for &child in node.children() {
                    self.element(child)?;
                }
                self.builder.finish_node()
            }
        };
        self.builder.copy_annotations(source, id, copied);
        Ok(copied)
    }

    fn type_ref(&mut self, id: ElementId) -> Result<ElementId, &'static str> {
        let source = self.source;
        if !type_ref(source, id).is_global {
            self.builder.start_node(TYPE_REF);
            for &child in source.children(id) {
                self.builder.copy_element(source, child);
            }
            return Ok(self.builder.finish_node());
        }

        let qualifier = child_token(source, id, GLOBAL_KW).and_then(|token| source.token(token));
        let name = child_token(source, id, IDENT).and_then(|token| source.token(token));
        let (Some(qualifier), Some(name)) = (qualifier, name) else {
            return Err("qualified type reference without a name");
        };

        self.builder.start_node(TYPE_REF);
        if self.compilation.resolves(&name.text) {
            let leading = qualifier
                .leading_trivia
                .iter()
                .chain(&name.leading_trivia)
                .cloned()
                .collect();
            self.builder.token_with_trivia(
                IDENT,
                name.text.clone(),
                leading,
                name.trailing_trivia.clone(),
            );
        } else {
            log::trace!("keeping global.{} qualified", name.text);
            for &child in source.children(id) {
                self.builder.copy_element(source, child);
            }
        }
        Ok(self.builder.finish_node())
    }
}
