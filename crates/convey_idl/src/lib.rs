//! Two small record definition languages and the conversion between them.
//!
//! The *snake* dialect declares types and fields in `snake_case`:
//!
//! ```text
//! // Where a person lives
//! type address { street: string; number: int; }
//! private type person_id { value: int; }
//! type person { id: person_id; home: address; }
//! ```
//!
//! The *pascal* dialect declares the same in `PascalCase` with `camelCase` fields and its own
//! builtin types:
//!
//! ```text
//! // Where a person lives
//! record Address { street: String; number: Int32; }
//! internal record PersonId { value: Int32; }
//! record Person { id: PersonId; home: Address; }
//! ```
//!
//! [`IdlConversion`] converts snake projects into pascal projects. Types declared in another
//! document are first written fully qualified (`global.Address`) and simplified once every
//! document of the project has been converted.

mod ast;
mod compilation;
mod dialect;
mod language;
mod lexer;
mod names;
mod parser;
mod simplify;
pub mod syntax_kind;
mod translate;


pub use crate::{
    ast::Visibility,
    compilation::{IdlCompilation, Symbol, SymbolOrigin},
    dialect::Dialect,
    language::{IdlConversion, SIMPLIFIER_FAULTS},
    lexer::{tokenize, Token},
    names::{to_camel_case, to_pascal_case, to_snake_case},
    parser::{parse, Parse, ParseError},
};
