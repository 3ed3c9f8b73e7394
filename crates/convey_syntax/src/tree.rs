use std::{fmt, fmt::Write, iter::successors, sync::Arc};

use la_arena::{Arena, ArenaMap, Idx};
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::{
    annotation::AnnotationTable, Annotation, AnnotationKind, SyntaxKind, SyntaxTreeBuilder,
    Trivia,
};

/// Identifies a node or token within a [`SyntaxTree`].
pub type ElementId = Idx<Element>;

/// A single element of a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node(NodeData),
    Token(TokenData),
}

/// An inner element of a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) children: Vec<ElementId>,
}

impl NodeData {
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// A leaf of a syntax tree together with the trivia that surrounds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    pub kind: SyntaxKind,
    pub text: SmolStr,
    pub leading_trivia: Vec<Trivia>,
    pub trailing_trivia: Vec<Trivia>,
}

impl TokenData {
    fn leading_len(&self) -> TextSize {
        self.leading_trivia.iter().map(Trivia::len).sum()
    }

    fn trailing_len(&self) -> TextSize {
        self.trailing_trivia.iter().map(Trivia::len).sum()
    }

    fn full_len(&self) -> TextSize {
        self.leading_len() + TextSize::of(self.text.as_str()) + self.trailing_len()
    }

    fn write_full_text(&self, buf: &mut String) {
        for trivia in &self.leading_trivia {
            buf.push_str(trivia.text());
        }
        buf.push_str(&self.text);
        for trivia in &self.trailing_trivia {
            buf.push_str(trivia.text());
        }
    }
}

/// Positional information derived from the elements of a tree.
#[derive(Default)]
struct TreeIndex {
    parents: ArenaMap<ElementId, ElementId>,
    ranges: ArenaMap<ElementId, TextRange>,
    tokens: Vec<ElementId>,
    token_positions: ArenaMap<ElementId, usize>,
}

impl TreeIndex {
    fn build(elements: &Arena<Element>, root: ElementId) -> TreeIndex {
        let mut index = TreeIndex::default();
        let mut offset = TextSize::from(0);
        index.visit(elements, root, None, &mut offset);
        index
    }

    fn visit(
        &mut self,
        elements: &Arena<Element>,
        id: ElementId,
        parent: Option<ElementId>,
        offset: &mut TextSize,
    ) {
        if let Some(parent) = parent {
            self.parents.insert(id, parent);
        }
        let start = *offset;
        match &elements[id] {
            Element::Token(token) => {
                self.token_positions.insert(id, self.tokens.len());
                self.tokens.push(id);
                *offset += token.full_len();
            }
            Element::Node(node) => {
                for &child in &node.children {
                    self.visit(elements, child, Some(id), offset);
                }
            }
        }
        self.ranges.insert(id, TextRange::new(start, *offset));
    }
}

struct TreeData {
    elements: Arena<Element>,
    root: ElementId,
    annotations: AnnotationTable,
    index: TreeIndex,
}

/// An immutable syntax tree. Cloning a tree is cheap, "modifying" a tree returns a new tree.
#[derive(Clone)]
pub struct SyntaxTree {
    data: Arc<TreeData>,
}

impl SyntaxTree {
    pub(crate) fn new(
        elements: Arena<Element>,
        root: ElementId,
        annotations: AnnotationTable,
    ) -> SyntaxTree {
        let index = TreeIndex::build(&elements, root);
        SyntaxTree {
            data: Arc::new(TreeData {
                elements,
                root,
                annotations,
                index,
            }),
        }
    }

    pub fn root(&self) -> ElementId {
        self.data.root
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.data.elements[id]
    }

    pub fn kind(&self, id: ElementId) -> SyntaxKind {
        match self.element(id) {
            Element::Node(node) => node.kind,
            Element::Token(token) => token.kind,
        }
    }

    pub fn node(&self, id: ElementId) -> Option<&NodeData> {
        match self.element(id) {
            Element::Node(node) => Some(node),
            Element::Token(_) => None,
        }
    }

    pub fn token(&self, id: ElementId) -> Option<&TokenData> {
        match self.element(id) {
            Element::Token(token) => Some(token),
            Element::Node(_) => None,
        }
    }

    /// Returns the direct children of an element, tokens have no children.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.node(id).map_or(&[], NodeData::children)
    }

    /// Returns the direct children of an element that are nodes.
    pub fn child_nodes(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.node(child).is_some())
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.data.index.parents.get(id).copied()
    }

    /// Returns the element itself followed by all of its ancestors.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        successors(Some(id), move |&id| self.parent(id))
    }

    /// Returns the element and all its descendants in pre-order.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        result
    }

    /// The range of the element including all of its trivia.
    pub fn full_range(&self, id: ElementId) -> TextRange {
        self.data.index.ranges[id]
    }

    /// The range of the element excluding the leading trivia of its first token and the
    /// trailing trivia of its last token.
    pub fn range(&self, id: ElementId) -> TextRange {
        let full = self.full_range(id);
        let (Some(first), Some(last)) = (self.first_token(id), self.last_token(id)) else {
            return full;
        };
        let start = full.start() + self.token_data(first).leading_len();
        let end = full.end() - self.token_data(last).trailing_len();
        TextRange::new(start, end.max(start))
    }

    /// Returns all tokens of the tree in textual order.
    pub fn tokens(&self) -> &[ElementId] {
        &self.data.index.tokens
    }

    pub fn first_token(&self, id: ElementId) -> Option<ElementId> {
        match self.element(id) {
            Element::Token(_) => Some(id),
            Element::Node(node) => node
                .children
                .iter()
                .find_map(|&child| self.first_token(child)),
        }
    }

    pub fn last_token(&self, id: ElementId) -> Option<ElementId> {
        match self.element(id) {
            Element::Token(_) => Some(id),
            Element::Node(node) => node
                .children
                .iter()
                .rev()
                .find_map(|&child| self.last_token(child)),
        }
    }

    /// Returns the token that precedes `token` in the tree, if any.
    pub fn previous_token(&self, token: ElementId) -> Option<ElementId> {
        let position = *self.data.index.token_positions.get(token)?;
        position
            .checked_sub(1)
            .map(|position| self.data.index.tokens[position])
    }

    /// Returns the token that follows `token` in the tree, if any.
    pub fn next_token(&self, token: ElementId) -> Option<ElementId> {
        let position = *self.data.index.token_positions.get(token)?;
        self.data.index.tokens.get(position + 1).copied()
    }

    /// Returns the full text of an element, including trivia.
    pub fn text(&self, id: ElementId) -> String {
        let mut buf = String::new();
        for token in self.descendants(id) {
            if let Element::Token(token) = self.element(token) {
                token.write_full_text(&mut buf);
            }
        }
        buf
    }

    /// Returns the full text of the tree. Annotations are never part of the text.
    pub fn to_full_string(&self) -> String {
        self.text(self.root())
    }

    /// Finds the node that covers `range`. The deepest covering node is located first, when
    /// several nested nodes span exactly the same text the outermost of those is returned.
    pub fn find_node(&self, range: TextRange) -> ElementId {
        let mut current = self.root();
        if !self.full_range(current).contains_range(range) {
            return current;
        }
        while let Some(child) = self
            .child_nodes(current)
            .find(|&child| self.full_range(child).contains_range(range))
        {
            current = child;
        }
        while let Some(parent) = self.parent(current) {
            if self.full_range(parent) != self.full_range(current) {
                break;
            }
            current = parent;
        }
        current
    }

    pub fn annotations(&self, id: ElementId) -> &[Annotation] {
        self.data.annotations.get(id)
    }

    /// Returns all annotations of the given kind in pre-order of the elements they are
    /// attached to.
    pub fn annotations_of_kind(&self, kind: AnnotationKind) -> Vec<(ElementId, &Annotation)> {
        if self.data.annotations.is_empty() {
            return Vec::new();
        }
        self.descendants(self.root())
            .into_iter()
            .flat_map(|id| {
                self.annotations(id)
                    .iter()
                    .filter(move |annotation| annotation.kind() == kind)
                    .map(move |annotation| (id, annotation))
            })
            .collect()
    }

    /// Returns the elements that carry an annotation of the given kind, in pre-order.
    pub fn annotated_elements(&self, kind: AnnotationKind) -> Vec<ElementId> {
        let mut elements = self
            .annotations_of_kind(kind)
            .into_iter()
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        elements.dedup();
        elements
    }

    /// Returns a tree that is identical to this one except that `annotation` is attached to
    /// `id`. Element ids remain valid in the returned tree.
    pub fn with_annotation(&self, id: ElementId, annotation: Annotation) -> SyntaxTree {
        let mut annotations = self.data.annotations.clone();
        annotations.add(id, annotation);
        SyntaxTree::new(self.data.elements.clone(), self.root(), annotations)
    }

    /// Returns the same tree with all annotations removed.
    pub fn without_annotations(&self) -> SyntaxTree {
        if self.data.annotations.is_empty() {
            return self.clone();
        }
        SyntaxTree::new(
            self.data.elements.clone(),
            self.root(),
            AnnotationTable::default(),
        )
    }

    /// Returns a new tree rooted at a copy of `id`. Annotations of the copied elements are
    /// preserved, element ids are not.
    pub fn subtree(&self, id: ElementId) -> SyntaxTree {
        let mut builder = SyntaxTreeBuilder::new();
        builder.copy_element(self, id);
        builder.finish()
    }

    /// Returns a tree in which every token was passed through `f`, in textual order. The
    /// structure of the tree, its element ids and its annotations are preserved.
    pub fn map_tokens(&self, mut f: impl FnMut(ElementId, &mut TokenData)) -> SyntaxTree {
        let mut elements = self.data.elements.clone();
        for &id in self.tokens() {
            if let Element::Token(token) = &mut elements[id] {
                f(id, token);
            }
        }
        SyntaxTree::new(elements, self.root(), self.data.annotations.clone())
    }

    /// Prepends `trivia` to the leading trivia of the first token of the tree.
    pub fn with_prepended_leading_trivia(&self, trivia: &[Trivia]) -> SyntaxTree {
        let first = self.first_token(self.root());
        self.map_tokens(|id, token| {
            if Some(id) == first {
                token.leading_trivia.splice(0..0, trivia.iter().cloned());
            }
        })
    }

    /// Appends `trivia` to the trailing trivia of the last token of the tree.
    pub fn with_appended_trailing_trivia(&self, trivia: &[Trivia]) -> SyntaxTree {
        let last = self.last_token(self.root());
        self.map_tokens(|id, token| {
            if Some(id) == last {
                token.trailing_trivia.extend(trivia.iter().cloned());
            }
        })
    }

    /// Renders the structure of the tree, `kind_name` maps kinds to readable names.
    pub fn debug_dump(&self, kind_name: impl Fn(SyntaxKind) -> &'static str) -> String {
        let mut buf = String::new();
        self.dump_element(&kind_name, self.root(), 0, &mut buf);
        buf
    }

    fn dump_element(
        &self,
        kind_name: &impl Fn(SyntaxKind) -> &'static str,
        id: ElementId,
        depth: usize,
        buf: &mut String,
    ) {
        let range = self.range(id);
        let _ = write!(
            buf,
            "{:indent$}{}@{}..{}",
            "",
            kind_name(self.kind(id)),
            u32::from(range.start()),
            u32::from(range.end()),
            indent = depth * 2
        );
        if let Some(token) = self.token(id) {
            let _ = write!(buf, " {:?}", token.text.as_str());
        }
        for annotation in self.annotations(id) {
            let _ = write!(buf, " [{annotation:?}]");
        }
        buf.push('\n');
        for &child in self.children(id) {
            self.dump_element(kind_name, child, depth + 1, buf);
        }
    }

    fn token_data(&self, id: ElementId) -> &TokenData {
        match self.element(id) {
            Element::Token(token) => token,
            Element::Node(_) => unreachable!("element is not a token"),
        }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("text", &self.to_full_string())
            .finish_non_exhaustive()
    }
}
