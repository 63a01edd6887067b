//! Document loader - JSON and YAML file loading and parsing
//!
//! Trees and selections are stored as JSON by the catalog and order services;
//! hand-authored fixtures are often YAML. The format is picked from the file
//! extension.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{OptionTreeError, Result};
use crate::options::selections::LineItemOptionSelections;
use crate::options::tree::OptionTree;

/// On-disk document encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from the path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(OptionTreeError::unsupported_format(
                path.display().to_string(),
            )),
        }
    }
}

/// Loads option tree and selections documents
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a raw document, for validation before it is trusted
    pub fn load_value<P: AsRef<Path>>(&self, path: P) -> Result<Value> {
        self.load(path)
    }

    /// Load an option tree
    pub fn load_tree<P: AsRef<Path>>(&self, path: P) -> Result<OptionTree> {
        self.load(path)
    }

    /// Load a selections document
    pub fn load_selections<P: AsRef<Path>>(&self, path: P) -> Result<LineItemOptionSelections> {
        self.load(path)
    }

    /// Write a selections document back in the format its extension names
    pub fn save_selections<P: AsRef<Path>>(
        &self,
        path: P,
        selections: &LineItemOptionSelections,
    ) -> Result<()> {
        let path = path.as_ref();
        let content = Self::render(selections, DocumentFormat::from_path(path)?)?;
        fs::write(path, content)?;
        log::info!("Wrote selections to {}", path.display());
        Ok(())
    }

    fn load<T: DeserializeOwned, P: AsRef<Path>>(&self, path: P) -> Result<T> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse a document from a string
    pub fn parse<T: DeserializeOwned>(content: &str, format: DocumentFormat) -> Result<T> {
        let doc = match format {
            DocumentFormat::Json => serde_json::from_str(content)?,
            DocumentFormat::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(doc)
    }

    /// Render a document to a string
    pub fn render<T: Serialize>(doc: &T, format: DocumentFormat) -> Result<String> {
        let content = match format {
            DocumentFormat::Json => serde_json::to_string_pretty(doc)? + "\n",
            DocumentFormat::Yaml => serde_yaml::to_string(doc)?,
        };
        Ok(content)
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}
