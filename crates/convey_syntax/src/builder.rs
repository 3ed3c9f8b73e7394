use la_arena::Arena;
use smol_str::SmolStr;

use crate::{
    annotation::AnnotationTable,
    tree::{Element, ElementId, NodeData, TokenData},
    Annotation, SyntaxKind, SyntaxTree, Trivia,
};

/// Constructs a [`SyntaxTree`] bottom-up.
///
/// ```
/// # use convey_syntax::{SyntaxKind, SyntaxTreeBuilder};
/// let mut builder = SyntaxTreeBuilder::new();
/// builder.start_node(SyntaxKind(0));
/// builder.token(SyntaxKind(1), "hello");
/// builder.finish_node();
/// assert_eq!(builder.finish().to_full_string(), "hello");
/// ```
#[derive(Default)]
pub struct SyntaxTreeBuilder {
    elements: Arena<Element>,
    annotations: AnnotationTable,
    stack: Vec<(SyntaxKind, Vec<ElementId>)>,
    roots: Vec<ElementId>,
}

impl SyntaxTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new node, all elements added until the matching [`Self::finish_node`] become
    /// its children.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.stack.push((kind, Vec::new()));
    }

    /// Finishes the node that was last started and returns its id.
    pub fn finish_node(&mut self) -> ElementId {
        let (kind, children) = self
            .stack
            .pop()
            .expect("finish_node called without a matching start_node");
        let id = self.elements.alloc(Element::Node(NodeData { kind, children }));
        self.attach(id);
        id
    }

    /// Adds a token without trivia.
    pub fn token(&mut self, kind: SyntaxKind, text: impl Into<SmolStr>) -> ElementId {
        self.token_with_trivia(kind, text, Vec::new(), Vec::new())
    }

    pub fn token_with_trivia(
        &mut self,
        kind: SyntaxKind,
        text: impl Into<SmolStr>,
        leading_trivia: Vec<Trivia>,
        trailing_trivia: Vec<Trivia>,
    ) -> ElementId {
        let id = self.elements.alloc(Element::Token(TokenData {
            kind,
            text: text.into(),
            leading_trivia,
            trailing_trivia,
        }));
        self.attach(id);
        id
    }

    /// Attaches an annotation to an element that was previously added to this builder.
    pub fn annotate(&mut self, id: ElementId, annotation: Annotation) {
        self.annotations.add(id, annotation);
    }

    /// Copies all annotations of `source` in `tree` onto `target` in this builder.
    pub fn copy_annotations(&mut self, tree: &SyntaxTree, source: ElementId, target: ElementId) {
        for annotation in tree.annotations(source) {
            self.annotations.add(target, annotation.clone());
        }
    }

    /// Deep copies the element `id` of `tree`, including its trivia and annotations, as a
    /// child of the node currently being built.
    pub fn copy_element(&mut self, tree: &SyntaxTree, id: ElementId) -> ElementId {
        let copied = match tree.element(id) {
            Element::Token(token) => self.token_with_trivia(
                token.kind,
                token.text.clone(),
                token.leading_trivia.clone(),
                token.trailing_trivia.clone(),
            ),
            Element::Node(node) => {
                self.start_node(node.kind);
                for &child in &node.children {
                    self.copy_element(tree, child);
                }
                self.finish_node()
            }
        };
        self.copy_annotations(tree, id, copied);
        copied
    }

    /// Finishes building. Exactly one top level element must have been added and all started
    /// nodes must have been finished.
    pub fn finish(self) -> SyntaxTree {
        assert!(self.stack.is_empty(), "unfinished nodes in syntax tree builder");
        assert_eq!(self.roots.len(), 1, "a syntax tree must have exactly one root");
        SyntaxTree::new(self.elements, self.roots[0], self.annotations)
    }

    fn attach(&mut self, id: ElementId) {
        match self.stack.last_mut() {
            Some((_, children)) => children.push(id),
            None => self.roots.push(id),
        }
    }
}
