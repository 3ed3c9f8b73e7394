//! Syntax trees shared by every language Convey converts between.
//!
//! A [`SyntaxTree`] is an immutable, cheaply clonable tree of nodes and tokens. Tokens own the
//! trivia (whitespace, line breaks and comments) that surrounds them, so the full text of a
//! tree can always be reproduced from it. Every element of a tree is identified by an
//! [`ElementId`] that stays valid for trees derived through [`SyntaxTree::map_tokens`] and
//! [`SyntaxTree::with_annotation`].
//!
//! Out-of-band information is attached to elements as [`Annotation`]s. Annotations live in a
//! side table next to the tree, they never contribute to the text of the tree and they are
//! carried along when elements are copied into a new tree with the [`SyntaxTreeBuilder`].

mod annotation;
mod builder;
mod format;
mod kind;
mod tree;
mod trivia;

pub use smol_str::SmolStr;
pub use text_size::{TextRange, TextSize};

pub use crate::{
    annotation::{Annotation, AnnotationKind},
    builder::SyntaxTreeBuilder,
    format::format,
    kind::SyntaxKind,
    tree::{Element, ElementId, NodeData, SyntaxTree, TokenData},
    trivia::{Trivia, TriviaKind},
};
