//! Typed views of the nodes of a parsed document.

use convey_syntax::{ElementId, SyntaxKind, SyntaxTree};

use crate::syntax_kind::{
    FIELD, FIELDS, FIELD_LIST, GLOBAL_KW, IDENT, NAME, SOURCE_FILE, TYPE_DEF, TYPE_REF,
    VISIBILITY,
};

/// Whether a declaration is visible outside of its project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    /// `private` in the snake dialect, `internal` in the pascal dialect
    Restricted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub node: ElementId,
    pub name: Option<String>,
    pub visibility: Visibility,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub node: ElementId,
    pub name: String,
    pub ty: Option<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub node: ElementId,
    /// The referenced name as written, without qualifier
    pub name: Option<String>,
    /// True for `global.Name`
    pub is_global: bool,
}

/// Returns every type definition of a document.
pub fn type_defs(tree: &SyntaxTree) -> Vec<TypeDef> {
    let root = tree.root();
    if tree.kind(root) != SOURCE_FILE {
        return Vec::new();
    }
    tree.child_nodes(root)
        .filter(|&node| tree.kind(node) == TYPE_DEF)
        .map(|node| type_def(tree, node))
        .collect()
}

/// Returns every type reference below `node`, in textual order.
pub fn type_refs(tree: &SyntaxTree, node: ElementId) -> Vec<TypeRef> {
    tree.descendants(node)
        .into_iter()
        .filter(|&id| tree.kind(id) == TYPE_REF)
        .map(|id| type_ref(tree, id))
        .collect()
}

pub fn type_def(tree: &SyntaxTree, node: ElementId) -> TypeDef {
    let visibility = match child_node(tree, node, VISIBILITY) {
        Some(_) => Visibility::Restricted,
        None => Visibility::Public,
    };
    let fields = child_node(tree, node, FIELD_LIST)
        .and_then(|list| child_node(tree, list, FIELDS))
        .map(|fields| {
            tree.child_nodes(fields)
                .filter(|&field| tree.kind(field) == FIELD)
                .filter_map(|field| self::field(tree, field))
                .collect()
        })
        .unwrap_or_default();
    TypeDef {
        node,
        name: name_text(tree, node),
        visibility,
        fields,
    }
}

fn field(tree: &SyntaxTree, node: ElementId) -> Option<Field> {
    Some(Field {
        node,
        name: name_text(tree, node)?,
        ty: child_node(tree, node, TYPE_REF).map(|ty| type_ref(tree, ty)),
    })
}

pub fn type_ref(tree: &SyntaxTree, node: ElementId) -> TypeRef {
    TypeRef {
        node,
        name: child_token(tree, node, IDENT).map(|token| token_text(tree, token)),
        is_global: child_token(tree, node, GLOBAL_KW).is_some(),
    }
}

/// The text of the `NAME` child of `node`.
fn name_text(tree: &SyntaxTree, node: ElementId) -> Option<String> {
    let name = child_node(tree, node, NAME)?;
    child_token(tree, name, IDENT).map(|token| token_text(tree, token))
}

pub(crate) fn child_node(tree: &SyntaxTree, node: ElementId, kind: SyntaxKind) -> Option<ElementId> {
    tree.child_nodes(node).find(|&child| tree.kind(child) == kind)
}

pub(crate) fn child_token(
    tree: &SyntaxTree,
    node: ElementId,
    kind: SyntaxKind,
) -> Option<ElementId> {
    tree.children(node)
        .iter()
        .copied()
        .find(|&child| tree.token(child).is_some() && tree.kind(child) == kind)
}

fn token_text(tree: &SyntaxTree, token: ElementId) -> String {
    tree.token(token)
        .map(|token| token.text.to_string())
        .unwrap_or_default()
}
