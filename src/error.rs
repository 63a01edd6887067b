// SPDX-License-Identifier: MIT

//! Typed error handling for option-tree-rs
//!
//! Only the document and transport layers can fail. Condition evaluation and
//! visibility resolution are total, and the structural validator reports its
//! findings as data (see [`crate::options::tree::ValidationReport`]).

use thiserror::Error;

use crate::options::condition::ParseError;

/// Top-level error type for option-tree-rs
#[derive(Debug, Error)]
pub enum OptionTreeError {
    /// Configuration errors (bad env vars, bad CLI combinations)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document file has an extension the loader does not understand
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Condition shorthand could not be parsed
    #[error(transparent)]
    Condition(#[from] ParseError),

    /// Tree failed structural validation where a sound tree was required
    #[error("Option tree is invalid: {}", .0.join("; "))]
    InvalidTree(Vec<String>),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl OptionTreeError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an unsupported-format error
    pub fn unsupported_format(what: impl Into<String>) -> Self {
        Self::UnsupportedFormat(what.into())
    }
}

pub type Result<T> = std::result::Result<T, OptionTreeError>;
