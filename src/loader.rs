//! Loading manifests and documents from files, strings, and HTTP URLs.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::definition::Manifest;
use crate::document::Document;
use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load any JSON value from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "loaded file");

    serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load a manifest from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, or
/// `LoadError::InvalidJson` if it isn't a valid manifest.
pub fn load_manifest(path: &Path) -> Result<Manifest, LoadError> {
    from_value(load_json(path)?)
}

/// Load a manifest from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't a valid manifest.
pub fn load_manifest_str(content: &str) -> Result<Manifest, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load a manifest from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the response
/// isn't a valid manifest.
#[cfg(feature = "remote")]
pub fn load_manifest_url(url: &str) -> Result<Manifest, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    debug!(%url, "fetching manifest");
    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network_error)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a manifest from a file path or URL.
///
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_manifest_auto(source: &str) -> Result<Manifest, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_manifest_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_manifest(Path::new(source))
    }
}

/// Load a previously generated document.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, or
/// `LoadError::InvalidJson` if it isn't a valid document.
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    from_value(load_json(path)?)
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, LoadError> {
    serde_json::from_value(value).map_err(|source| LoadError::InvalidJson { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MANIFEST: &str = r#"{
        "resources": [{
            "name": "PetResource",
            "api": { "tags": ["pets"] },
            "path": "/pets",
            "operations": [{ "name": "listPets", "method": "get", "operation": { "value": "List pets" } }]
        }],
        "types": [{ "name": "Pet", "fields": [{ "name": "id", "type": "int64" }] }]
    }"#;

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn load_manifest_valid_file() {
        let file = temp_file(MANIFEST);

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.resources.len(), 1);
        assert_eq!(manifest.resources[0].name, "PetResource");
        assert_eq!(manifest.types[0].fields[0].type_expr, "int64");
    }

    #[test]
    fn load_manifest_file_not_found() {
        let result = load_manifest(Path::new("/nonexistent/manifest.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_manifest_invalid_json() {
        let file = temp_file("not valid json");

        let result = load_manifest(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_manifest_wrong_shape() {
        let file = temp_file(r#"{"resources": {"name": "x"}}"#);

        let result = load_manifest(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_manifest_str_empty_object() {
        let manifest = load_manifest_str("{}").unwrap();
        assert!(manifest.resources.is_empty());
        assert!(manifest.types.is_empty());
    }

    #[test]
    fn load_manifest_str_invalid() {
        let result = load_manifest_str("not json");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn is_url_detects_schemes() {
        assert!(is_url("https://example.com/manifest.json"));
        assert!(is_url("http://example.com/manifest.json"));
        assert!(!is_url("/path/to/manifest.json"));
        assert!(!is_url("./manifest.json"));
        assert!(!is_url("manifest.json"));
    }

    #[test]
    fn load_manifest_auto_file() {
        let file = temp_file(MANIFEST);

        let manifest = load_manifest_auto(file.path().to_str().unwrap()).unwrap();
        assert_eq!(manifest.resources.len(), 1);
    }

    #[test]
    fn load_document_round_trips_output() {
        let file = temp_file(
            r##"{
                "swagger": "2.0",
                "basePath": "/api",
                "paths": { "/pets": { "get": { "responses": { "default": { "description": "successful operation" } } } } },
                "definitions": { "Pet": { "type": "object" } }
            }"##,
        );

        let document = load_document(file.path()).unwrap();
        assert_eq!(document.base_path.as_deref(), Some("/api"));
        assert!(document.path("/pets").is_some());
        assert!(document.definition("Pet").is_some());
        assert!(document.tags.is_none());
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_manifest_url_valid() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/manifest.json")
                .with_header("content-type", "application/json")
                .with_body(MANIFEST)
                .create();

            let manifest = load_manifest_url(&format!("{}/manifest.json", server.url())).unwrap();
            assert_eq!(manifest.resources[0].name, "PetResource");
            mock.assert();
        }

        #[test]
        fn load_manifest_url_404() {
            let mut server = mockito::Server::new();
            let _mock = server.mock("GET", "/missing.json").with_status(404).create();

            let result = load_manifest_url(&format!("{}/missing.json", server.url()));
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }

        #[test]
        fn load_manifest_url_invalid_body() {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/broken.json")
                .with_body("not json")
                .create();

            let result = load_manifest_url(&format!("{}/broken.json", server.url()));
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }

        #[test]
        fn load_manifest_auto_url() {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/manifest.json")
                .with_body(MANIFEST)
                .create();

            let result = load_manifest_auto(&format!("{}/manifest.json", server.url()));
            assert!(result.is_ok());
        }
    }
}
