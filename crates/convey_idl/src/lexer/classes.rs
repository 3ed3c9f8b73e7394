/// Whitespace that does not end a line.
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace() && c != '\n' && c != '\r'
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
