// SPDX-License-Identifier: MIT

//! Option tree graph: document types, visibility resolution and structural
//! validation.

mod resolver;
pub mod types;
mod validator;

pub use resolver::{resolve, resolve_visible_nodes, Resolution};
pub use types::{
    BranchEdge, Choice, Edges, InputConstraints, InputSpec, InputType, NodeKind, OptionNode,
    OptionTree, ProductImage, TreeMeta, UiHints, Visibility, SCHEMA_VERSION,
};
pub use validator::{
    validate_document, validate_option_tree_v2, ValidationError, ValidationReport,
};
