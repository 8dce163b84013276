//! Resource definitions - the annotated input the reader inspects.
//!
//! A manifest is the declarative form of an annotated service:
//!
//! ```json
//! {
//!   "resources": [{
//!     "name": "AnApi",
//!     "path": "/apath",
//!     "api": { "tags": ["atag"] },
//!     "operations": [{
//!       "name": "getOperation",
//!       "method": "get",
//!       "operation": { "value": "Get a model." },
//!       "returns": "ResponseDto"
//!     }]
//!   }],
//!   "types": [{
//!     "name": "ResponseDto",
//!     "fields": [{ "name": "id", "type": "string", "required": true }]
//!   }]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::typeref::simple_name;
use crate::types::{HttpMethod, ParameterLocation};

/// Marker exposing a resource as part of the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiMarker {
    /// Legacy tag source, used when `tags` is empty.
    pub value: Option<String>,
    pub tags: Vec<String>,
    /// Description given to the resource's own tags.
    pub description: Option<String>,
    pub hidden: bool,
}

impl ApiMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A declared response beyond the implicit success response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseDefinition {
    pub code: u16,
    pub message: String,
    pub response: Option<String>,
    pub response_container: Option<String>,
}

/// Marker turning a method into a documented operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationMarker {
    /// Summary line.
    pub value: String,
    pub notes: Option<String>,
    /// Override response type; takes precedence over the method's return type.
    pub response: Option<String>,
    /// Container wrapped around `response` (`List`, `Set`, `Map`).
    pub response_container: Option<String>,
    pub tags: Vec<String>,
    /// Operation id; the method name is used when absent.
    pub nickname: Option<String>,
    pub hidden: bool,
    /// Verb used when the method carries no verb of its own.
    pub http_method: Option<HttpMethod>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub responses: Vec<ResponseDefinition>,
}

impl OperationMarker {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            value: summary.into(),
            ..Self::default()
        }
    }

    pub fn response(mut self, type_expr: impl Into<String>) -> Self {
        self.response = Some(type_expr.into());
        self
    }

    pub fn response_container(mut self, container: impl Into<String>) -> Self {
        self.response_container = Some(container.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = Some(method);
        self
    }

    pub fn declare_response(mut self, response: ResponseDefinition) -> Self {
        self.responses.push(response);
        self
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(rename = "type", default = "default_parameter_type")]
    pub type_expr: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_parameter_type() -> String {
    "string".to_string()
}

impl ParameterDefinition {
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        type_expr: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            type_expr: type_expr.into(),
            required: false,
            description: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// One method on a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationDefinition {
    /// Method name.
    pub name: String,
    /// Verb annotation on the method.
    pub method: Option<HttpMethod>,
    pub operation: Option<OperationMarker>,
    /// Path segment below the resource's base path.
    pub path: Option<String>,
    /// Natural return type; `None` means `void`.
    pub returns: Option<String>,
    pub parameters: Vec<ParameterDefinition>,
}

impl OperationDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn operation(mut self, marker: OperationMarker) -> Self {
        self.operation = Some(marker);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn returns(mut self, type_expr: impl Into<String>) -> Self {
        self.returns = Some(type_expr.into());
        self
    }

    pub fn parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A resource: a group of related operations under one base path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceDefinition {
    pub name: String,
    /// `None` means the resource is not exposed and is never scanned.
    pub api: Option<ApiMarker>,
    pub path: Option<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub operations: Vec<OperationDefinition>,
}

impl ResourceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn api(mut self, marker: ApiMarker) -> Self {
        self.api = Some(marker);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn operation(mut self, operation: OperationDefinition) -> Self {
        self.operations.push(operation);
        self
    }
}

/// Model metadata on a complex type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelMarker {
    /// Shape name override.
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A field of a complex type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, type_expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expr: type_expr.into(),
            required: false,
            description: None,
            hidden: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// A complex type that operations may return or accept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeDefinition {
    pub name: String,
    pub model: Option<ModelMarker>,
    /// Supertype expression. A container here makes this type a concrete
    /// container subclass (`ResponseDtoList extends ArrayList<ResponseDto>`).
    pub extends: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn model(mut self, marker: ModelMarker) -> Self {
        self.model = Some(marker);
        self
    }

    pub fn extends(mut self, type_expr: impl Into<String>) -> Self {
        self.extends = Some(type_expr.into());
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Name this type registers under.
    pub fn shape_name(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .unwrap_or_else(|| simple_name(&self.name))
    }
}

/// Lookup of complex types by declared name.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: IndexMap<String, TypeDefinition>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type, replacing any type with the same name.
    pub fn insert(&mut self, definition: TypeDefinition) {
        self.types.insert(definition.name.clone(), definition);
    }

    /// Find a type by exact name, falling back to its simple name.
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name).or_else(|| {
            let wanted = simple_name(name);
            self.types
                .values()
                .find(|definition| simple_name(&definition.name) == wanted)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<TypeDefinition> for TypeCatalog {
    fn from_iter<I: IntoIterator<Item = TypeDefinition>>(iter: I) -> Self {
        let mut catalog = TypeCatalog::new();
        for definition in iter {
            catalog.insert(definition);
        }
        catalog
    }
}

/// Resources plus the types they reference, as loaded from one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub resources: Vec<ResourceDefinition>,
    pub types: Vec<TypeDefinition>,
}

impl Manifest {
    pub fn catalog(&self) -> TypeCatalog {
        self.types.iter().cloned().collect()
    }
}
