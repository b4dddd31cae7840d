//! # Expression Module
//!
//! A small algebraic expression language used to define custom force fields.
//! Energies are written as text over per-particle coordinates (`x`, `y`, `z`)
//! and optional per-particle parameters, e.g.
//!
//! ```text
//! 2*cos(2*sqrt(x^2+y^2)) - 8*exp(-(x^2+y^2)) + 1000.0*z^2
//! ```
//!
//! ## Components
//!
//! - [`ast`] - the expression tree, simplifying constructors and `Display`
//! - `parser` - tokenizer and recursive-descent parser
//! - `derivative` - symbolic differentiation used to derive forces
//! - [`program`] - compilation to a flat postfix program for the hot loop
//!
//! Supported syntax: decimal and scientific literals, identifiers, `+ - * / ^`,
//! unary minus, parentheses, and the functions `sqrt`, `exp`, `log`, `sin`,
//! `cos`. `^` is right-associative and binds tighter than unary minus.

pub mod ast;
mod derivative;
mod parser;
pub mod program;

pub use ast::{BinaryOp, Expr, Function};
pub use program::Program;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("Expression is empty")]
    Empty,

    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("Invalid numeric literal '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("Unexpected token '{found}' at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Unknown function '{name}' at offset {offset}")]
    UnknownFunction { name: String, offset: usize },

    #[error("Unknown variable '{name}'")]
    UnknownVariable { name: String },
}

impl Expr {
    /// Parses an expression from its textual form.
    pub fn parse(source: &str) -> Result<Expr, ExprError> {
        parser::parse(source)
    }
}

impl std::str::FromStr for Expr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expr::parse(s)
    }
}
