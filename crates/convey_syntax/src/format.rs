use crate::{SyntaxTree, Trivia, TriviaKind};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Leading,
    Trailing,
}

enum Piece<'a> {
    Trivia(Side, &'a Trivia),
    Text(&'a str),
}

/// Normalizes the layout of a tree.
///
/// Layout before the first token and at the end of the text is removed, whitespace in front of
/// a line break is removed, indentation is kept and any other run of whitespace is collapsed
/// into a single space. Comments, line breaks, the structure of the tree and its annotations
/// are preserved.
pub fn format(tree: &SyntaxTree) -> SyntaxTree {
    let mut pieces = Vec::new();
    for (position, &id) in tree.tokens().iter().enumerate() {
        let Some(token) = tree.token(id) else {
            continue;
        };
        pieces.extend(
            token
                .leading_trivia
                .iter()
                .map(|trivia| (position, Piece::Trivia(Side::Leading, trivia))),
        );
        pieces.push((position, Piece::Text(token.text.as_str())));
        pieces.extend(
            token
                .trailing_trivia
                .iter()
                .map(|trivia| (position, Piece::Trivia(Side::Trailing, trivia))),
        );
    }

    let mut trivia: Vec<(Vec<Trivia>, Vec<Trivia>)> =
        vec![(Vec::new(), Vec::new()); tree.tokens().len()];
    let mut seen_content = false;
    let mut at_line_start = true;
    let mut after_space = false;
    for (index, (position, piece)) in pieces.iter().enumerate() {
        let (side, current) = match piece {
            Piece::Text(text) => {
                if !text.is_empty() {
                    seen_content = true;
                    at_line_start = false;
                    after_space = false;
                }
                continue;
            }
            Piece::Trivia(side, current) => (*side, *current),
        };

        let replacement = match current.kind() {
            TriviaKind::Comment => {
                seen_content = true;
                at_line_start = false;
                after_space = false;
                Some(current.clone())
            }
            TriviaKind::EndOfLine if seen_content => {
                at_line_start = true;
                after_space = false;
                Some(current.clone())
            }
            TriviaKind::EndOfLine => None,
            TriviaKind::Whitespace => {
                if !seen_content || after_space || ends_line(&pieces[index + 1..]) {
                    None
                } else if at_line_start {
                    after_space = true;
                    Some(current.clone())
                } else {
                    after_space = true;
                    Some(Trivia::whitespace(" "))
                }
            }
        };

        if let Some(replacement) = replacement {
            let (leading, trailing) = &mut trivia[*position];
            match side {
                Side::Leading => leading.push(replacement),
                Side::Trailing => trailing.push(replacement),
            }
        }
    }

    let mut trivia = trivia.into_iter();
    tree.map_tokens(|_, token| {
        if let Some((leading, trailing)) = trivia.next() {
            token.leading_trivia = leading;
            token.trailing_trivia = trailing;
        }
    })
}

/// Returns true if nothing but whitespace separates the current position from a line break or
/// the end of the text.
fn ends_line(rest: &[(usize, Piece<'_>)]) -> bool {
    for (_, piece) in rest {
        match piece {
            Piece::Text(text) if text.is_empty() => {}
            Piece::Trivia(_, trivia) if trivia.kind() == TriviaKind::Whitespace => {}
            Piece::Trivia(_, trivia) => return trivia.kind() == TriviaKind::EndOfLine,
            Piece::Text(_) => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::format;
    use crate::{Annotation, AnnotationKind, SyntaxKind, SyntaxTreeBuilder, Trivia};

    const ROOT: SyntaxKind = SyntaxKind(0);
    const WORD: SyntaxKind = SyntaxKind(1);

    #[test]
    fn normalizes_layout() {
        let mut builder = SyntaxTreeBuilder::new();
        builder.start_node(ROOT);
        builder.token_with_trivia(
            WORD,
            "a",
            vec![Trivia::end_of_line("\n"), Trivia::whitespace("  ")],
            vec![Trivia::whitespace("   ")],
        );
        builder.token_with_trivia(
            WORD,
            "b",
            Vec::new(),
            vec![Trivia::whitespace("  "), Trivia::end_of_line("\n")],
        );
        builder.token_with_trivia(
            WORD,
            "c",
            vec![Trivia::whitespace("    ")],
            vec![
                Trivia::whitespace("\t"),
                Trivia::comment("// done"),
                Trivia::whitespace("  "),
            ],
        );
        builder.token(WORD, "");
        builder.finish_node();
        let tree = builder.finish();

        assert_eq!(format(&tree).to_full_string(), "a b\n    c // done");
    }

    #[test]
    fn preserves_annotations_and_comments_before_content() {
        let mut builder = SyntaxTreeBuilder::new();
        builder.start_node(ROOT);
        let word = builder.token_with_trivia(
            WORD,
            "x",
            vec![
                Trivia::whitespace("  "),
                Trivia::comment("// header"),
                Trivia::end_of_line("\n"),
            ],
            Vec::new(),
        );
        builder.annotate(word, Annotation::selection());
        builder.finish_node();
        let tree = builder.finish();

        let formatted = format(&tree);
        assert_eq!(formatted.to_full_string(), "// header\nx");
        assert_eq!(
            formatted.annotated_elements(AnnotationKind::Selection),
            vec![word]
        );
    }
}
