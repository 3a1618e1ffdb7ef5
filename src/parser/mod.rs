//! Scanner and parser for Braai documents

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::parse;
pub use lexer::{Scanner, Token, TokenKind};
