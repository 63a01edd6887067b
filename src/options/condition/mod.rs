// SPDX-License-Identifier: MIT

//! Condition evaluation for option trees
//!
//! This module provides the `ConditionExpr` AST used by node visibility,
//! branch edges and impact rules, its evaluator, and a shorthand parser.
//! Shorthand conditions look like:
//! - `finish == 'gloss'`
//! - `addons contains 'foil'`
//! - `truthy(rush) and sides != 1`

mod ast;
mod evaluator;
mod parser;

pub use ast::ConditionExpr;
pub use evaluator::{evaluate, is_truthy, strict_equals};
pub use parser::{parse, ParseError};
