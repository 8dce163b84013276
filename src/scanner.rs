//! Resource scanning - decides what a resource contributes to the document.

use heck::ToKebabCase;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::definition::{
    ApiMarker, OperationDefinition, OperationMarker, ParameterDefinition, ResourceDefinition,
};
use crate::document::{Model, Operation, Parameter, PathItem, Property, Response, Tag};
use crate::error::{ReadError, TypeError};
use crate::resolver::TypeResolver;
use crate::typeref::TypeRef;
use crate::types::{ParameterLocation, ReadOptions, SUCCESS_DESCRIPTION};

/// Tag used when a resource has neither tags nor a usable name.
const FALLBACK_TAG: &str = "default";

/// What one resource contributes to the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub tags: Vec<Tag>,
    pub paths: IndexMap<String, PathItem>,
    pub shapes: IndexMap<String, Model>,
}

impl ScanResult {
    /// True when the resource contributed nothing.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.paths.is_empty() && self.shapes.is_empty()
    }
}

/// Scan one resource.
///
/// Resources without an API marker, and hidden resources unless
/// `options.include_hidden` is set, yield an empty result. Methods lacking
/// either the operation marker or a verb never become path entries; a method
/// with the marker but no verb still has its response types registered.
///
/// # Errors
///
/// Returns `ReadError::InvalidType` naming the resource and method when a
/// declared type expression is malformed.
pub fn scan(
    resource: &ResourceDefinition,
    resolver: &mut TypeResolver<'_>,
    options: &ReadOptions,
) -> Result<ScanResult, ReadError> {
    let Some(api) = resource.api.as_ref() else {
        debug!(resource = %resource.name, "no api marker, skipping");
        return Ok(ScanResult::default());
    };
    if api.hidden && !options.include_hidden {
        debug!(resource = %resource.name, "resource is hidden, skipping");
        return Ok(ScanResult::default());
    }

    let resource_tags = resource_tags(resource, api);
    let mut result = ScanResult::default();
    for name in &resource_tags {
        let mut tag = Tag::new(name.clone());
        tag.description = api.description.clone();
        add_tag(&mut result.tags, tag);
    }
    for tag in options.seed_tags.values() {
        add_tag(&mut result.tags, tag.clone());
    }

    for method in &resource.operations {
        let Some(marker) = method.operation.as_ref() else {
            debug!(resource = %resource.name, method = %method.name, "no operation marker, skipping");
            continue;
        };
        if marker.hidden && !options.include_hidden {
            debug!(resource = %resource.name, method = %method.name, "operation is hidden, skipping");
            continue;
        }

        let invalid_type = |source: TypeError| ReadError::InvalidType {
            resource: resource.name.clone(),
            operation: method.name.clone(),
            source,
        };

        let responses = build_responses(method, marker, resolver).map_err(invalid_type)?;

        let Some(verb) = method.method.or(marker.http_method) else {
            debug!(resource = %resource.name, method = %method.name, "no http method, skipping path");
            continue;
        };

        let parameters =
            build_parameters(&method.parameters, resolver, options).map_err(invalid_type)?;

        let tags = operation_tags(marker, &resource_tags, options);
        for name in &tags {
            add_tag(&mut result.tags, Tag::new(name.clone()));
        }

        let operation = Operation {
            tags,
            summary: non_empty(&marker.value),
            description: marker.notes.clone(),
            operation_id: marker
                .nickname
                .as_deref()
                .and_then(non_empty)
                .or_else(|| non_empty(&method.name)),
            consumes: first_declared(&marker.consumes, &resource.consumes, &options.default_consumes),
            produces: first_declared(&marker.produces, &resource.produces, &options.default_produces),
            parameters,
            responses,
        };

        let path = compose_path(resource.path.as_deref(), method.path.as_deref());
        debug!(resource = %resource.name, %path, %verb, "registered operation");
        result
            .paths
            .entry(path)
            .or_default()
            .insert(verb, operation);
    }

    result.shapes = resolver.take_shapes();
    Ok(result)
}

/// Join a resource base path and an operation segment into one URL path.
///
/// Slashes are normalized and regex constraints in templates are dropped:
/// `"/users/"` + `"{id: [0-9]+}"` becomes `"/users/{id}"`.
pub fn compose_path(base: Option<&str>, segment: Option<&str>) -> String {
    let mut path = String::from("/");
    for part in [base, segment].into_iter().flatten() {
        let part = strip_template_patterns(part);
        for piece in part.split('/').filter(|piece| !piece.is_empty()) {
            if !path.ends_with('/') {
                path.push('/');
            }
            path.push_str(piece);
        }
    }
    path
}

fn strip_template_patterns(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        out.push(c);
        if c != '{' {
            continue;
        }
        // Copy the variable name, then skip any `: pattern` up to the matching brace.
        let mut depth = 1;
        let mut in_pattern = false;
        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                ':' if depth == 1 => in_pattern = true,
                _ => {}
            }
            if depth == 0 {
                out.push('}');
                break;
            }
            if !in_pattern && !c.is_whitespace() {
                out.push(c);
            }
        }
    }
    out
}

fn resource_tags(resource: &ResourceDefinition, api: &ApiMarker) -> Vec<String> {
    let mut tags = Vec::new();
    for tag in api.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    if !tags.is_empty() {
        return tags;
    }

    if let Some(value) = api
        .value
        .as_deref()
        .map(|v| v.trim().trim_start_matches('/'))
        .filter(|v| !v.is_empty())
    {
        return vec![value.to_string()];
    }

    let derived = resource.name.to_kebab_case();
    if derived.is_empty() {
        vec![FALLBACK_TAG.to_string()]
    } else {
        vec![derived]
    }
}

fn operation_tags(
    marker: &OperationMarker,
    resource_tags: &[String],
    options: &ReadOptions,
) -> Vec<String> {
    let declared: Vec<&str> = marker
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    let base: Vec<&str> = if declared.is_empty() {
        resource_tags.iter().map(String::as_str).collect()
    } else {
        declared
    };

    let mut tags: Vec<String> = Vec::new();
    for name in base
        .into_iter()
        .chain(options.seed_tags.keys().map(String::as_str))
    {
        if !tags.iter().any(|t| t == name) {
            tags.push(name.to_string());
        }
    }
    tags
}

fn add_tag(tags: &mut Vec<Tag>, tag: Tag) {
    match tags.iter_mut().find(|existing| existing.name == tag.name) {
        Some(existing) => {
            if existing.description.is_none() {
                existing.description = tag.description;
            }
        }
        None => tags.push(tag),
    }
}

/// Seed parameters first, minus any a declared parameter shadows, then the
/// declared parameters in declaration order.
fn build_parameters(
    declared: &[ParameterDefinition],
    resolver: &mut TypeResolver<'_>,
    options: &ReadOptions,
) -> Result<Vec<Parameter>, TypeError> {
    let declared = declared
        .iter()
        .map(|definition| build_parameter(definition, resolver))
        .collect::<Result<Vec<_>, _>>()?;

    let mut parameters: Vec<Parameter> = options
        .seed_parameters
        .iter()
        .filter(|seed| !declared.iter().any(|param| param.same_slot(seed)))
        .cloned()
        .collect();
    parameters.extend(declared);
    Ok(parameters)
}

fn build_parameter(
    definition: &ParameterDefinition,
    resolver: &mut TypeResolver<'_>,
) -> Result<Parameter, TypeError> {
    let ty = TypeRef::parse(&definition.type_expr)?;
    let mut parameter =
        Parameter::new(definition.name.clone(), definition.location).required(definition.required);
    parameter.description = definition.description.clone();

    if definition.location == ParameterLocation::Body {
        Ok(parameter.body_schema(resolver.resolve(&ty)?))
    } else {
        Ok(parameter.inline_type(&ty))
    }
}

fn build_responses(
    method: &OperationDefinition,
    marker: &OperationMarker,
    resolver: &mut TypeResolver<'_>,
) -> Result<IndexMap<String, Response>, TypeError> {
    let success = match marker.response.as_deref() {
        Some(expr) => response_schema(expr, marker.response_container.as_deref(), resolver)?,
        None => response_schema(
            method.returns.as_deref().unwrap_or("void"),
            marker.response_container.as_deref(),
            resolver,
        )?,
    };

    let mut responses = IndexMap::new();
    let declares_success = marker.responses.iter().any(|r| r.code == 200);
    if let Some(schema) = success {
        if !declares_success {
            responses.insert(
                "200".to_string(),
                Response::new(SUCCESS_DESCRIPTION).schema(schema),
            );
        }
    }

    for declared in &marker.responses {
        let schema = match declared.response.as_deref() {
            Some(expr) => {
                response_schema(expr, declared.response_container.as_deref(), resolver)?
            }
            None => None,
        };
        responses.insert(
            declared.code.to_string(),
            Response {
                description: declared.message.clone(),
                schema,
            },
        );
    }

    if responses.is_empty() {
        responses.insert("default".to_string(), Response::new(SUCCESS_DESCRIPTION));
    }
    Ok(responses)
}

/// Resolve a response type, wrapped in `container` when one is named.
///
/// `void` and untyped responses carry no schema.
fn response_schema(
    expr: &str,
    container: Option<&str>,
    resolver: &mut TypeResolver<'_>,
) -> Result<Option<Property>, TypeError> {
    let ty = TypeRef::parse(expr)?;
    if ty.is_no_content() {
        return Ok(None);
    }

    let ty = match container.map(str::trim).filter(|c| !c.is_empty()) {
        Some(name) => match ty.clone().wrap_in(name) {
            Some(wrapped) => wrapped,
            None => {
                warn!(container = %name, "unknown response container, ignoring it");
                ty
            }
        },
        None => ty,
    };

    resolver.resolve(&ty).map(Some)
}

fn first_declared(operation: &[String], resource: &[String], default: &[String]) -> Vec<String> {
    [operation, resource, default]
        .into_iter()
        .find(|media_types| !media_types.is_empty())
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
