//! Core types shared by the reader, scanner, and document model.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Parameter, Tag};

/// Swagger version written into every document.
pub const SWAGGER_VERSION: &str = "2.0";

/// Description of the implicit success response.
pub const SUCCESS_DESCRIPTION: &str = "successful operation";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// HTTP verb an operation is bound to.
///
/// Serialized lowercase; deserialization accepts any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    /// All verbs, in document order.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    /// Parse a verb name, ignoring case.
    ///
    /// Returns `None` for names that are not HTTP verbs.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Lowercase key used for this verb inside a path item.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("unknown http method \"{}\"", s))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    FormData,
    Body,
}

/// Options for reading resource definitions.
///
/// Seed tags and parameters are attached to every scanned operation, which
/// lets several resource groups share common metadata such as global headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOptions {
    /// Scan resources marked hidden as if they were visible.
    pub include_hidden: bool,
    /// Media types consumed when neither operation nor resource declares any.
    pub default_consumes: Vec<String>,
    /// Media types produced when neither operation nor resource declares any.
    pub default_produces: Vec<String>,
    /// Tags added to every included resource, keyed by tag name.
    pub seed_tags: IndexMap<String, Tag>,
    /// Parameters attached to every operation, ahead of declared ones.
    pub seed_parameters: Vec<Parameter>,
}

impl ReadOptions {
    /// Create options with hidden resources excluded and no defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether hidden resources are scanned.
    pub fn include_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    /// Set the default consumed media types.
    pub fn consumes<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_consumes = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default produced media types.
    pub fn produces<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_produces = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Add a seed tag. A later tag with the same name replaces the earlier one.
    pub fn seed_tag(mut self, tag: Tag) -> Self {
        self.seed_tags.insert(tag.name.clone(), tag);
        self
    }

    /// Add a seed parameter.
    pub fn seed_parameter(mut self, parameter: Parameter) -> Self {
        self.seed_parameters.push(parameter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_method_parse_ignores_case() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse(" Delete "), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("fetch"), None);
    }

    #[test]
    fn http_method_serializes_lowercase() {
        let json = serde_json::to_string(&HttpMethod::Post).unwrap();
        assert_eq!(json, r#""post""#);
        assert_eq!(HttpMethod::Post.to_string(), "POST");

        let parsed: HttpMethod = serde_json::from_str(r#""PUT""#).unwrap();
        assert_eq!(parsed, HttpMethod::Put);
        assert!(serde_json::from_str::<HttpMethod>(r#""fetch""#).is_err());
    }

    #[test]
    fn parameter_location_uses_swagger_names() {
        let json = serde_json::to_string(&ParameterLocation::FormData).unwrap();
        assert_eq!(json, r#""formData""#);
    }

    #[test]
    fn read_options_builder() {
        let options = ReadOptions::new()
            .include_hidden(true)
            .consumes(["application/json"])
            .produces(["application/json", "application/xml"])
            .seed_tag(Tag::new("shared"))
            .seed_tag(Tag::new("shared").description("replaced"));

        assert!(options.include_hidden);
        assert_eq!(options.default_consumes, vec!["application/json"]);
        assert_eq!(options.default_produces.len(), 2);
        assert_eq!(options.seed_tags.len(), 1);
        assert_eq!(
            options.seed_tags["shared"].description.as_deref(),
            Some("replaced")
        );
    }
}
