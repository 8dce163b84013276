//! Reading resource definitions into a document.
//!
//! A [`Reader`] owns the document it accumulates into, so repeated calls
//! build one description from several resource groups:
//!
//! ```
//! use swagger_reader::{
//!     ApiMarker, HttpMethod, OperationDefinition, OperationMarker, ReadOptions, Reader,
//!     ResourceDefinition, TypeCatalog,
//! };
//!
//! let users = ResourceDefinition::new("UserResource")
//!     .path("/users")
//!     .api(ApiMarker::new().tag("users"))
//!     .operation(
//!         OperationDefinition::new("listUsers")
//!             .method(HttpMethod::Get)
//!             .operation(OperationMarker::new("List users"))
//!             .returns("List<User>"),
//!     );
//! let orders = ResourceDefinition::new("OrderResource")
//!     .path("/orders")
//!     .api(ApiMarker::new().tag("orders"))
//!     .operation(
//!         OperationDefinition::new("listOrders")
//!             .method(HttpMethod::Get)
//!             .operation(OperationMarker::new("List orders")),
//!     );
//!
//! let catalog = TypeCatalog::new();
//! let options = ReadOptions::new();
//! let mut reader = Reader::new(None);
//! reader.read(&[users], &catalog, &options).unwrap();
//! reader.read(&[orders], &catalog, &options).unwrap();
//!
//! let document = reader.into_document();
//! assert!(document.path("/users").is_some());
//! assert!(document.path("/orders").is_some());
//! assert!(document.definition("User").is_some());
//! ```

use tracing::{debug, info};

use crate::definition::{Manifest, ResourceDefinition, TypeCatalog};
use crate::document::Document;
use crate::error::ReadError;
use crate::resolver::TypeResolver;
use crate::scanner::{scan, ScanResult};
use crate::types::ReadOptions;

/// Accumulates scanned resources into one [`Document`].
#[derive(Debug, Clone, Default)]
pub struct Reader {
    document: Document,
}

impl Reader {
    /// Start from `document`, or from an empty document when `None`.
    pub fn new(document: Option<Document>) -> Self {
        Self {
            document: document.unwrap_or_default(),
        }
    }

    /// Scan `resources` and merge what they contribute into the document.
    ///
    /// Every resource is scanned before anything is merged, so an error
    /// leaves the document exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidType` when a resource declares a malformed
    /// type expression.
    pub fn read(
        &mut self,
        resources: &[ResourceDefinition],
        catalog: &TypeCatalog,
        options: &ReadOptions,
    ) -> Result<&Document, ReadError> {
        let known: Vec<String> = self
            .document
            .definition_names()
            .map(str::to_string)
            .collect();
        let mut resolver = TypeResolver::new(catalog).with_known(known);

        let results = resources
            .iter()
            .map(|resource| scan(resource, &mut resolver, options))
            .collect::<Result<Vec<_>, _>>()?;

        let mut included = 0;
        for result in results {
            if !result.is_empty() {
                included += 1;
            }
            self.merge(result);
        }
        info!(
            candidates = resources.len(),
            included, "read resource definitions"
        );

        Ok(&self.document)
    }

    /// Read every resource of a manifest against its own type catalog.
    ///
    /// # Errors
    ///
    /// See [`Reader::read`].
    pub fn read_manifest(
        &mut self,
        manifest: &Manifest,
        options: &ReadOptions,
    ) -> Result<&Document, ReadError> {
        let catalog = manifest.catalog();
        self.read(&manifest.resources, &catalog, options)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    fn merge(&mut self, result: ScanResult) {
        for tag in result.tags {
            self.document.add_tag(tag);
        }
        for (path, item) in result.paths {
            for (method, operation) in item {
                self.document.add_operation(&path, method, operation);
            }
        }
        for (name, model) in result.shapes {
            if !self.document.add_definition(name.as_str(), model) {
                debug!(shape = %name, "definition already registered, keeping the first");
            }
        }
    }
}

/// Read `resources` into `document`, or into a new document when `None`.
///
/// ```
/// use swagger_reader::{read, ReadOptions, ResourceDefinition, TypeCatalog};
///
/// // A resource without an API marker contributes nothing.
/// let plain = ResourceDefinition::new("NotAnnotated").path("/apath");
/// let document = read(&[plain], &TypeCatalog::new(), None, &ReadOptions::new()).unwrap();
/// assert!(document.tags.is_none());
/// assert!(document.paths.is_none());
/// ```
///
/// # Errors
///
/// See [`Reader::read`].
pub fn read(
    resources: &[ResourceDefinition],
    catalog: &TypeCatalog,
    document: Option<Document>,
    options: &ReadOptions,
) -> Result<Document, ReadError> {
    let mut reader = Reader::new(document);
    reader.read(resources, catalog, options)?;
    Ok(reader.into_document())
}
