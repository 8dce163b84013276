//! The API description document, laid out as Swagger 2.0 JSON.
//!
//! `tags`, `paths`, and `definitions` stay `None` until their first entry is
//! added, so a read that found nothing is distinguishable from one that found
//! resources without operations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::typeref::{ContainerKind, ScalarType, TypeRef};
use crate::types::{HttpMethod, ParameterLocation, SWAGGER_VERSION};

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A grouping label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An inline schema or a reference to a registered definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Property>>,
}

/// Prefix of every definition reference.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

impl Property {
    /// Reference to the definition registered under `name`.
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", DEFINITIONS_PREFIX, name)),
            ..Self::default()
        }
    }

    pub fn scalar(scalar: ScalarType) -> Self {
        let (ty, format) = scalar.type_and_format();
        Self {
            property_type: Some(ty.to_string()),
            format: format.map(String::from),
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self {
            property_type: Some("object".to_string()),
            ..Self::default()
        }
    }

    pub fn array(items: Property, unique: bool) -> Self {
        Self {
            property_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            unique_items: unique.then_some(true),
            ..Self::default()
        }
    }

    pub fn map(values: Property) -> Self {
        Self {
            property_type: Some("object".to_string()),
            additional_properties: Some(Box::new(values)),
            ..Self::default()
        }
    }

    /// Name of the referenced definition, if this is a reference.
    pub fn reference_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(DEFINITIONS_PREFIX))
    }
}

/// A registered data shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "type")]
    pub model_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Model {
    /// An object model with no properties.
    pub fn object() -> Self {
        Self {
            model_type: "object".to_string(),
            description: None,
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::object()
    }
}

/// An operation parameter.
///
/// Body parameters carry a `schema`; all other locations describe their
/// value inline with `type`, `format`, and `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Property>,
}

impl Parameter {
    /// A string-typed parameter; path parameters are always required.
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: location == ParameterLocation::Path,
            parameter_type: Some("string".to_string()),
            format: None,
            items: None,
            schema: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required || self.location == ParameterLocation::Path;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Describe the value inline from a type expression.
    ///
    /// Complex types cannot be expressed inline and are sent as strings.
    pub fn inline_type(mut self, ty: &TypeRef) -> Self {
        let property = inline_property(ty);
        self.parameter_type = property.property_type;
        self.format = property.format;
        self.items = property.items;
        self.schema = None;
        self
    }

    /// Carry the value as a body schema.
    pub fn body_schema(mut self, schema: Property) -> Self {
        self.parameter_type = None;
        self.format = None;
        self.items = None;
        self.schema = Some(schema);
        self
    }

    /// True when `other` names the same parameter slot.
    pub fn same_slot(&self, other: &Parameter) -> bool {
        self.name == other.name && self.location == other.location
    }
}

fn inline_property(ty: &TypeRef) -> Property {
    match ty {
        TypeRef::Scalar(scalar) => Property::scalar(*scalar),
        TypeRef::Array { kind, element } => {
            Property::array(inline_property(element), *kind == ContainerKind::Set)
        }
        TypeRef::Void
        | TypeRef::Any
        | TypeRef::Object
        | TypeRef::Map(_)
        | TypeRef::Named(_) => {
            Property::scalar(ScalarType::String)
        }
    }
}

/// One response of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Property>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            schema: None,
        }
    }

    pub fn schema(mut self, schema: Property) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// One HTTP operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

/// Operations registered under one path, at most one per verb.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathItem {
    operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// Set the operation for `method`, returning the one it replaced.
    pub fn insert(&mut self, method: HttpMethod, operation: Operation) -> Option<Operation> {
        self.operations.insert(method, operation)
    }

    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        self.operations.iter().map(|(method, op)| (*method, op))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl IntoIterator for PathItem {
    type Item = (HttpMethod, Operation);
    type IntoIter = indexmap::map::IntoIter<HttpMethod, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

/// The aggregate root: tags, paths, and data-shape definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub swagger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<IndexMap<String, PathItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<IndexMap<String, Model>>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            swagger: SWAGGER_VERSION.to_string(),
            info: None,
            base_path: None,
            tags: None,
            paths: None,
            definitions: None,
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(mut self, info: Info) -> Self {
        self.info = Some(info);
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.paths.is_none() && self.definitions.is_none()
    }

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.as_ref()?.iter().find(|tag| tag.name == name)
    }

    pub fn path(&self, path: &str) -> Option<&PathItem> {
        self.paths.as_ref()?.get(path)
    }

    pub fn definition(&self, name: &str) -> Option<&Model> {
        self.definitions.as_ref()?.get(name)
    }

    /// Names of all registered definitions.
    pub fn definition_names(&self) -> impl Iterator<Item = &str> {
        self.definitions
            .iter()
            .flat_map(|defs| defs.keys().map(String::as_str))
    }

    /// Add a tag, merging with an existing tag of the same name.
    ///
    /// An existing description is kept; a missing one is filled in.
    pub fn add_tag(&mut self, tag: Tag) {
        let tags = self.tags.get_or_insert_with(Vec::new);
        match tags.iter_mut().find(|existing| existing.name == tag.name) {
            Some(existing) => {
                if existing.description.is_none() {
                    existing.description = tag.description;
                }
            }
            None => tags.push(tag),
        }
    }

    /// Register `operation` under `path` and `method`, replacing any
    /// operation already registered for that pair.
    pub fn add_operation(&mut self, path: &str, method: HttpMethod, operation: Operation) {
        self.paths
            .get_or_insert_with(IndexMap::new)
            .entry(path.to_string())
            .or_default()
            .insert(method, operation);
    }

    /// Register a definition unless one with the same name exists.
    ///
    /// Returns `false` when the name was already taken.
    pub fn add_definition(&mut self, name: impl Into<String>, model: Model) -> bool {
        let definitions = self.definitions.get_or_insert_with(IndexMap::new);
        let name = name.into();
        if definitions.contains_key(&name) {
            return false;
        }
        definitions.insert(name, model);
        true
    }
}
