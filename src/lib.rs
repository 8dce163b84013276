//! Swagger Reader
//!
//! Builds Swagger 2.0 API descriptions from typed resource definitions.
//!
//! A resource is a group of HTTP operations, described as data: an API
//! marker, a base path, and methods carrying an operation marker and a verb.
//! Reading a set of resources produces a [`Document`] with the tags, paths,
//! and data-shape definitions they contribute. Response and body types are
//! resolved against a [`TypeCatalog`], unwrapping containers such as
//! `List<T>` to their element type.
//!
//! # Example
//!
//! ```
//! use swagger_reader::{
//!     read, ApiMarker, HttpMethod, OperationDefinition, OperationMarker, ReadOptions,
//!     ResourceDefinition, TypeCatalog,
//! };
//!
//! let resource = ResourceDefinition::new("PetResource")
//!     .path("/pets")
//!     .api(ApiMarker::new().tag("pets"))
//!     .operation(
//!         OperationDefinition::new("listPets")
//!             .method(HttpMethod::Get)
//!             .operation(OperationMarker::new("List pets"))
//!             .returns("List<Pet>"),
//!     );
//!
//! let document = read(&[resource], &TypeCatalog::new(), None, &ReadOptions::new()).unwrap();
//!
//! assert!(document.tag("pets").is_some());
//! assert!(document.path("/pets").unwrap().get(HttpMethod::Get).is_some());
//! // The element type is registered; the list itself is not.
//! assert_eq!(document.definition_names().collect::<Vec<_>>(), vec!["Pet"]);
//! ```
//!
//! # Inclusion Rules
//!
//! | Declaration | Effect |
//! |-------------|--------|
//! | no API marker | resource contributes nothing |
//! | API marker, `hidden` | skipped unless `include_hidden` |
//! | method without operation marker or verb | no path entry |
//! | operation marker, `hidden` | skipped unless `include_hidden` |
//!
//! # Manifest Format
//!
//! Resources and types are usually loaded from a manifest:
//! ```json
//! {
//!   "resources": [{
//!     "name": "PetResource",
//!     "api": { "tags": ["pets"] },
//!     "path": "/pets",
//!     "operations": [{ "name": "listPets", "method": "get", "operation": {}, "returns": "List<Pet>" }]
//!   }],
//!   "types": [{ "name": "Pet", "fields": [{ "name": "id", "type": "int64", "required": true }] }]
//! }
//! ```

mod config;
mod definition;
mod document;
mod error;
mod linter;
mod loader;
mod reader;
mod resolver;
mod scanner;
mod typeref;
mod types;
mod validator;

pub use config::ReaderConfig;
pub use definition::{
    ApiMarker, FieldDefinition, Manifest, ModelMarker, OperationDefinition, OperationMarker,
    ParameterDefinition, ResourceDefinition, ResponseDefinition, TypeCatalog, TypeDefinition,
};
pub use document::{Document, Info, Model, Operation, Parameter, PathItem, Property, Response, Tag};
pub use error::{LoadError, ReadError, SchemaError, TypeError, ValidateError};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{
    is_url, load_document, load_json, load_manifest, load_manifest_auto, load_manifest_str,
};
pub use reader::{read, Reader};
pub use resolver::TypeResolver;
pub use scanner::{compose_path, scan, ScanResult};
pub use typeref::{ContainerKind, ScalarType, TypeRef};
pub use types::{HttpMethod, ParameterLocation, ReadOptions};
pub use validator::{shape_schema, validate_against_schema, validate_payload};

#[cfg(feature = "remote")]
pub use loader::load_manifest_url;
