//! Error types for reading resource definitions and validating payloads.

use std::path::PathBuf;
use thiserror::Error;

/// Errors in a type expression such as `List<ResponseDto>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("empty type expression")]
    Empty,

    #[error("unexpected end of type expression \"{expr}\"")]
    UnexpectedEnd { expr: String },

    #[error("unexpected '{found}' at offset {offset} in type expression \"{expr}\"")]
    UnexpectedChar {
        expr: String,
        found: char,
        offset: usize,
    },

    #[error("type \"{name}\" does not take type arguments")]
    UnsupportedGeneric { name: String },

    #[error("container \"{name}\" expects {expected} type argument(s), got {found}")]
    ContainerArity {
        name: String,
        expected: &'static str,
        found: usize,
    },

    #[error("field \"{field}\" of {owner}: {source}")]
    Field {
        owner: String,
        field: String,
        #[source]
        source: Box<TypeError>,
    },
}

/// Errors while reading resource definitions into a document.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("invalid type in {resource}.{operation}: {source}")]
    InvalidType {
        resource: String,
        operation: String,
        #[source]
        source: TypeError,
    },
}

impl ReadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReadError::InvalidType { .. } => 2,
        }
    }
}

/// Errors while loading manifests, configs, and documents.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::Io { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Errors during payload validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("document has no definition named \"{name}\"")]
    UnknownShape { name: String },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Load(e) => e.exit_code(),
            ValidateError::UnknownShape { .. } | ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
