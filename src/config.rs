//! Reader configuration file.
//!
//! ```json
//! {
//!   "info": { "title": "Pet Store", "version": "1.0.0" },
//!   "basePath": "/api",
//!   "includeHidden": false,
//!   "consumes": ["application/json"],
//!   "produces": ["application/json"],
//!   "tags": [{ "name": "shared", "description": "Common operations" }],
//!   "parameters": [{ "name": "X-Request-Id", "in": "header" }]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::document::{Document, Info, Parameter, Tag};
use crate::error::LoadError;
use crate::loader::load_json;
use crate::types::{ParameterLocation, ReadOptions};

/// Document metadata and [`ReadOptions`] seeds, as read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderConfig {
    pub info: Option<Info>,
    pub base_path: Option<String>,
    pub include_hidden: bool,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Seed tags attached to every operation.
    pub tags: Vec<Tag>,
    /// Seed parameters attached to every operation.
    pub parameters: Vec<Parameter>,
}

impl ReaderConfig {
    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the file can't be read or doesn't match the
    /// config layout.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let value = load_json(path)?;
        serde_json::from_value(value).map_err(|source| LoadError::InvalidJson { source })
    }

    /// The read options this config describes.
    pub fn read_options(&self) -> ReadOptions {
        let options = ReadOptions::new()
            .include_hidden(self.include_hidden)
            .consumes(self.consumes.iter().cloned())
            .produces(self.produces.iter().cloned());
        let options = self
            .tags
            .iter()
            .cloned()
            .fold(options, ReadOptions::seed_tag);
        self.parameters
            .iter()
            .cloned()
            .map(|mut parameter| {
                // Non-body parameters need an inline type; default to string.
                if parameter.location != ParameterLocation::Body
                    && parameter.parameter_type.is_none()
                    && parameter.schema.is_none()
                {
                    parameter.parameter_type = Some("string".to_string());
                }
                if parameter.location == ParameterLocation::Path {
                    parameter.required = true;
                }
                parameter
            })
            .fold(options, ReadOptions::seed_parameter)
    }

    /// An empty document carrying this config's `info` and `basePath`.
    pub fn document(&self) -> Document {
        let mut document = Document::new();
        document.info = self.info.clone();
        document.base_path = self.base_path.clone();
        document
    }
}
