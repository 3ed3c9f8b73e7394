/// The kind of a node or token.
///
/// The numbering is owned by the language that builds the tree, this crate never interprets
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyntaxKind(pub u16);
