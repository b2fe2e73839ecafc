//! gi IR - shared front-end data structures
//!
//! Every phase of the REPL front end speaks in terms of the types defined here:
//! - [`Span`] byte ranges and [`LineIndex`] for turning them into `line:col`
//! - [`Name`] handles produced by the session-owned [`StringInterner`]
//! - [`Token`]/[`TokenList`] as produced by the lexer
//! - the syntax tree in [`ast`], with expressions flattened into an [`ExprArena`]
//! - [`ErrorCode`] numbering shared by parse and type errors
//!
//! Expressions are addressed by [`ExprId`] so that later phases can attach
//! side tables (types, resolutions) without touching the tree.

pub mod ast;
mod error_code;
mod interner;
mod line_index;
mod name;
mod span;
mod token;

pub use ast::{ExprArena, ExprId};
pub use error_code::ErrorCode;
pub use interner::StringInterner;
pub use line_index::{LineCol, LineIndex};
pub use name::Name;
pub use span::Span;
pub use token::{Token, TokenFlags, TokenKind, TokenList};
