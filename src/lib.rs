// SPDX-License-Identifier: MIT

//! Conditional option-configuration graphs for print products.
//!
//! An [`options::tree::OptionTree`] describes the questions a product asks
//! and how answers branch into further questions. Given the current
//! [`options::selections::LineItemOptionSelections`], the resolver lists the
//! nodes to show, and the validator checks a tree is sound before it is
//! trusted.

pub mod error;
pub mod options;
pub mod server;

pub use error::{OptionTreeError, Result};
