//! Payload validation against the definitions of a generated document.

use serde_json::{json, Map, Value};

use crate::document::Document;
use crate::error::{SchemaError, ValidateError};

// Swagger 2.0 definitions are a subset of draft 4.
const DRAFT4_SCHEMA: &str = "http://json-schema.org/draft-04/schema#";

/// Validate a payload against the definition named `shape`.
///
/// # Errors
///
/// Returns `ValidateError::UnknownShape` if the document has no such
/// definition, or `ValidateError::Invalid` if the payload doesn't match it.
pub fn validate_payload(
    document: &Document,
    shape: &str,
    payload: &Value,
) -> Result<(), ValidateError> {
    let schema = shape_schema(document, shape)?;
    validate_against_schema(&schema, payload)
}

/// Build a standalone JSON Schema for one definition.
///
/// Every definition is embedded so `#/definitions/...` references resolve
/// within the returned schema.
///
/// # Errors
///
/// Returns `ValidateError::UnknownShape` if the document has no such
/// definition.
pub fn shape_schema(document: &Document, shape: &str) -> Result<Value, ValidateError> {
    if document.definition(shape).is_none() {
        return Err(ValidateError::UnknownShape {
            name: shape.to_string(),
        });
    }

    let definitions = match &document.definitions {
        Some(definitions) => serde_json::to_value(definitions).map_err(|e| {
            ValidateError::InvalidSchema {
                message: e.to_string(),
            }
        })?,
        None => Value::Object(Map::new()),
    };

    Ok(json!({
        "$schema": DRAFT4_SCHEMA,
        "allOf": [{ "$ref": format!("#/definitions/{shape}") }],
        "definitions": definitions,
    }))
}

/// Validate a payload against an already-built schema.
///
/// Use this when validating many payloads against one shape.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the schema doesn't compile,
/// or `ValidateError::Invalid` with every violation found.
pub fn validate_against_schema(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(payload)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}
