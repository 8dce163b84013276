//! Type resolution - turns declared types into inline schemas and named
//! data-shape definitions.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::definition::{FieldDefinition, TypeCatalog, TypeDefinition};
use crate::document::{Model, Property};
use crate::error::TypeError;
use crate::typeref::{simple_name, ContainerKind, TypeRef};

/// Resolves type expressions against a catalog, registering every complex
/// type it meets as a named [`Model`].
///
/// A resolver remembers every shape name it has registered, plus any names
/// it was seeded with through [`TypeResolver::with_known`]. A known name
/// resolves to a reference without being expanded again, which keeps
/// self-referential types from recursing forever.
pub struct TypeResolver<'a> {
    catalog: &'a TypeCatalog,
    known: HashSet<String>,
    registered: IndexMap<String, Model>,
    // Catalog types currently being unwrapped through `extends`.
    expanding: HashSet<String>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self {
            catalog,
            known: HashSet::new(),
            registered: IndexMap::new(),
            expanding: HashSet::new(),
        }
    }

    /// Treat `names` as already registered elsewhere (e.g. in an existing document).
    pub fn with_known<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known.extend(names.into_iter().map(Into::into));
        self
    }

    /// Parse and resolve a type expression.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` if the expression, or a field type reached while
    /// expanding it, is malformed.
    pub fn resolve_expr(&mut self, expr: &str) -> Result<Property, TypeError> {
        let ty = TypeRef::parse(expr)?;
        self.resolve(&ty)
    }

    /// Resolve a parsed type.
    ///
    /// Containers resolve to `array` (or `object` with `additionalProperties`
    /// for maps) of their element and are never registered themselves.
    pub fn resolve(&mut self, ty: &TypeRef) -> Result<Property, TypeError> {
        match ty {
            TypeRef::Void | TypeRef::Any | TypeRef::Object => Ok(Property::object()),
            TypeRef::Scalar(scalar) => Ok(Property::scalar(*scalar)),
            TypeRef::Array { kind, element } => {
                let items = self.resolve(element)?;
                Ok(Property::array(items, *kind == ContainerKind::Set))
            }
            TypeRef::Map(value) => Ok(Property::map(self.resolve(value)?)),
            TypeRef::Named(name) => self.resolve_named(name),
        }
    }

    /// Shapes registered since the last call, in registration order.
    pub fn take_shapes(&mut self) -> IndexMap<String, Model> {
        std::mem::take(&mut self.registered)
    }

    fn resolve_named(&mut self, name: &str) -> Result<Property, TypeError> {
        let catalog = self.catalog;
        let definition = catalog.get(name);

        if let Some(definition) = definition {
            if let Some(container) = self.container_supertype(definition)? {
                return self.resolve_container_subclass(definition, &container);
            }
        }

        let shape_name = match definition {
            Some(definition) => definition.shape_name().to_string(),
            None => simple_name(name).to_string(),
        };

        if self.known.contains(&shape_name) {
            trace!(shape = %shape_name, "shape already registered");
            return Ok(Property::reference(&shape_name));
        }

        // Claim the name before expanding fields so cycles resolve to a reference.
        self.known.insert(shape_name.clone());
        self.registered.insert(shape_name.clone(), Model::object());

        let model = match definition {
            Some(definition) => match self.build_model(definition) {
                Ok(model) => model,
                Err(e) => {
                    self.known.remove(&shape_name);
                    self.registered.shift_remove(&shape_name);
                    return Err(e);
                }
            },
            None => {
                debug!(shape = %shape_name, "no type metadata, registering bare shape");
                Model::object()
            }
        };
        debug!(shape = %shape_name, properties = model.properties.len(), "registered shape");
        self.registered.insert(shape_name.clone(), model);

        Ok(Property::reference(&shape_name))
    }

    /// The nearest container among the supertypes of `definition`.
    ///
    /// Follows `extends` through the catalog until it reaches a container,
    /// a type outside the catalog, or a cycle.
    fn container_supertype(
        &self,
        definition: &TypeDefinition,
    ) -> Result<Option<TypeRef>, TypeError> {
        let catalog = self.catalog;
        let mut seen: HashSet<&str> = HashSet::from([definition.name.as_str()]);

        let mut current = definition;
        while let Some(extends) = current.extends.as_deref() {
            let parent = TypeRef::parse(extends).map_err(|source| TypeError::Field {
                owner: current.name.clone(),
                field: "extends".to_string(),
                source: Box::new(source),
            })?;
            if parent.is_container() {
                return Ok(Some(parent));
            }
            let TypeRef::Named(parent_name) = parent else {
                break;
            };
            let Some(next) = catalog.get(&parent_name) else {
                break;
            };
            if !seen.insert(next.name.as_str()) {
                break;
            }
            current = next;
        }
        Ok(None)
    }

    fn resolve_container_subclass(
        &mut self,
        definition: &TypeDefinition,
        container: &TypeRef,
    ) -> Result<Property, TypeError> {
        if !self.expanding.insert(definition.name.clone()) {
            warn!(
                type_name = %definition.name,
                "container type contains itself, describing it as a plain object"
            );
            return Ok(Property::object());
        }
        let resolved = self.resolve(container);
        self.expanding.remove(&definition.name);
        resolved
    }

    fn build_model(&mut self, definition: &TypeDefinition) -> Result<Model, TypeError> {
        let mut model = Model::object();
        model.description = definition
            .model
            .as_ref()
            .and_then(|marker| marker.description.clone());

        let fields = self.collect_fields(definition)?;
        for field in fields {
            if field.hidden {
                continue;
            }
            let mut property =
                self.resolve_expr(&field.type_expr)
                    .map_err(|source| TypeError::Field {
                        owner: definition.name.clone(),
                        field: field.name.clone(),
                        source: Box::new(source),
                    })?;
            if property.reference.is_none() {
                property.description = field.description.clone();
            }
            if field.required && !model.required.contains(&field.name) {
                model.required.push(field.name.clone());
            }
            model.properties.insert(field.name.clone(), property);
        }

        Ok(model)
    }

    /// Fields of `definition`, inherited fields first.
    fn collect_fields(
        &self,
        definition: &TypeDefinition,
    ) -> Result<Vec<FieldDefinition>, TypeError> {
        let catalog = self.catalog;
        let mut chain = vec![definition];
        let mut seen: HashSet<&str> = HashSet::from([definition.name.as_str()]);

        let mut current = definition;
        while let Some(extends) = current.extends.as_deref() {
            let parent_ref = TypeRef::parse(extends).map_err(|source| TypeError::Field {
                owner: current.name.clone(),
                field: "extends".to_string(),
                source: Box::new(source),
            })?;
            let TypeRef::Named(parent_name) = parent_ref else {
                break;
            };
            let Some(parent) = catalog.get(&parent_name) else {
                break;
            };
            if !seen.insert(parent.name.as_str()) {
                warn!(type_name = %definition.name, "inheritance cycle, stopping at {}", parent.name);
                break;
            }
            chain.push(parent);
            current = parent;
        }

        let mut fields: Vec<FieldDefinition> = Vec::new();
        for ancestor in chain.into_iter().rev() {
            for field in &ancestor.fields {
                match fields.iter_mut().find(|f| f.name == field.name) {
                    Some(existing) => *existing = field.clone(),
                    None => fields.push(field.clone()),
                }
            }
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ModelMarker;
    use crate::typeref::ScalarType;

    fn catalog(types: Vec<TypeDefinition>) -> TypeCatalog {
        types.into_iter().collect()
    }

    fn response_dto() -> TypeDefinition {
        TypeDefinition::new("ResponseDto")
            .field(FieldDefinition::new("id", "string").required(true))
            .field(FieldDefinition::new("count", "int32"))
    }

    // === Scalars and containers ===

    #[test]
    fn scalars_resolve_inline() {
        let types = TypeCatalog::new();
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("int64").unwrap();
        assert_eq!(property, Property::scalar(ScalarType::Long));
        assert!(resolver.take_shapes().is_empty());
    }

    #[test]
    fn list_resolves_to_array_of_element() {
        let types = catalog(vec![response_dto()]);
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("List<ResponseDto>").unwrap();
        assert_eq!(property.property_type.as_deref(), Some("array"));
        assert_eq!(
            property.items.as_ref().unwrap().reference_name(),
            Some("ResponseDto")
        );

        let shapes = resolver.take_shapes();
        assert_eq!(shapes.keys().collect::<Vec<_>>(), vec!["ResponseDto"]);
    }

    #[test]
    fn set_marks_unique_items() {
        let types = TypeCatalog::new();
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("Set<string>").unwrap();
        assert_eq!(property.unique_items, Some(true));
    }

    #[test]
    fn map_resolves_additional_properties() {
        let types = catalog(vec![response_dto()]);
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("Map<String, ResponseDto>").unwrap();
        assert_eq!(property.property_type.as_deref(), Some("object"));
        assert_eq!(
            property
                .additional_properties
                .as_ref()
                .unwrap()
                .reference_name(),
            Some("ResponseDto")
        );
    }

    #[test]
    fn container_subclass_unwraps_to_element() {
        let types = catalog(vec![
            response_dto(),
            TypeDefinition::new("ResponseDtoList").extends("ArrayList<ResponseDto>"),
        ]);
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("ResponseDtoList").unwrap();
        assert_eq!(property.property_type.as_deref(), Some("array"));

        let shapes = resolver.take_shapes();
        assert!(shapes.contains_key("ResponseDto"));
        assert!(!shapes.contains_key("ResponseDtoList"));
    }

    #[test]
    fn container_subclass_chain_unwraps_to_element() {
        let types = catalog(vec![
            response_dto(),
            TypeDefinition::new("ResponseDtoList").extends("ArrayList<ResponseDto>"),
            TypeDefinition::new("SpecialList").extends("ResponseDtoList"),
        ]);
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("SpecialList").unwrap();
        assert_eq!(property.property_type.as_deref(), Some("array"));
        assert_eq!(
            property.items.as_ref().unwrap().reference_name(),
            Some("ResponseDto")
        );

        let shapes = resolver.take_shapes();
        assert_eq!(shapes.keys().collect::<Vec<_>>(), vec!["ResponseDto"]);
    }

    #[test]
    fn inheritance_cycle_without_container_registers_model() {
        let types = catalog(vec![
            TypeDefinition::new("A").extends("B"),
            TypeDefinition::new("B").extends("A"),
        ]);
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("A").unwrap();
        assert_eq!(property.reference_name(), Some("A"));
    }

    #[test]
    fn self_containing_container_does_not_recurse() {
        let types = catalog(vec![TypeDefinition::new("Loop").extends("List<Loop>")]);
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("Loop").unwrap();
        assert_eq!(property.property_type.as_deref(), Some("array"));
        assert_eq!(
            property.items.as_ref().unwrap().property_type.as_deref(),
            Some("object")
        );
    }

    // === Named shapes ===

    #[test]
    fn named_type_registers_model() {
        let types = catalog(vec![response_dto()]);
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("ResponseDto").unwrap();
        assert_eq!(property.reference_name(), Some("ResponseDto"));

        let shapes = resolver.take_shapes();
        let model = &shapes["ResponseDto"];
        assert_eq!(model.required, vec!["id"]);
        assert_eq!(
            model.properties["count"].format.as_deref(),
            Some("int32")
        );
    }

    #[test]
    fn resolving_twice_registers_once() {
        let types = catalog(vec![response_dto()]);
        let mut resolver = TypeResolver::new(&types);

        let first = resolver.resolve_expr("ResponseDto").unwrap();
        let second = resolver.resolve_expr("ResponseDto").unwrap();
        assert_eq!(first, second);
        assert_eq!(resolver.take_shapes().len(), 1);

        // Still known after the shapes were handed off
        resolver.resolve_expr("ResponseDto").unwrap();
        assert!(resolver.take_shapes().is_empty());
    }

    #[test]
    fn known_names_are_not_registered_again() {
        let types = catalog(vec![response_dto()]);
        let mut resolver = TypeResolver::new(&types).with_known(["ResponseDto"]);

        let property = resolver.resolve_expr("ResponseDto").unwrap();
        assert_eq!(property.reference_name(), Some("ResponseDto"));
        assert!(resolver.take_shapes().is_empty());
    }

    #[test]
    fn unknown_type_registers_bare_shape() {
        let types = TypeCatalog::new();
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("com.acme.Untracked").unwrap();
        assert_eq!(property.reference_name(), Some("Untracked"));

        let shapes = resolver.take_shapes();
        assert_eq!(shapes["Untracked"], Model::object());
    }

    #[test]
    fn model_marker_renames_and_describes() {
        let types = catalog(vec![TypeDefinition::new("UserEntity").model(ModelMarker {
            name: Some("User".into()),
            description: Some("A user".into()),
        })]);
        let mut resolver = TypeResolver::new(&types);

        let property = resolver.resolve_expr("UserEntity").unwrap();
        assert_eq!(property.reference_name(), Some("User"));
        let shapes = resolver.take_shapes();
        assert_eq!(shapes["User"].description.as_deref(), Some("A user"));
    }

    #[test]
    fn nested_types_register_recursively() {
        let types = catalog(vec![
            TypeDefinition::new("Order").field(FieldDefinition::new("lines", "List<OrderLine>")),
            TypeDefinition::new("OrderLine").field(FieldDefinition::new("product", "Product")),
            TypeDefinition::new("Product").field(FieldDefinition::new("sku", "string")),
        ]);
        let mut resolver = TypeResolver::new(&types);

        resolver.resolve_expr("Order").unwrap();
        let shapes = resolver.take_shapes();
        assert_eq!(
            shapes.keys().collect::<Vec<_>>(),
            vec!["Order", "OrderLine", "Product"]
        );
    }

    #[test]
    fn self_reference_resolves_to_reference() {
        let types = catalog(vec![TypeDefinition::new("Node")
            .field(FieldDefinition::new("value", "string"))
            .field(FieldDefinition::new("children", "List<Node>"))
            .field(FieldDefinition::new("parent", "Node"))]);
        let mut resolver = TypeResolver::new(&types);

        resolver.resolve_expr("Node").unwrap();
        let shapes = resolver.take_shapes();
        assert_eq!(shapes.len(), 1);
        let node = &shapes["Node"];
        assert_eq!(node.properties["parent"].reference_name(), Some("Node"));
        assert_eq!(
            node.properties["children"]
                .items
                .as_ref()
                .unwrap()
                .reference_name(),
            Some("Node")
        );
    }

    #[test]
    fn mutual_cycle_terminates() {
        let types = catalog(vec![
            TypeDefinition::new("A").field(FieldDefinition::new("b", "B")),
            TypeDefinition::new("B").field(FieldDefinition::new("a", "A")),
        ]);
        let mut resolver = TypeResolver::new(&types);

        resolver.resolve_expr("A").unwrap();
        let shapes = resolver.take_shapes();
        assert_eq!(shapes["B"].properties["a"].reference_name(), Some("A"));
    }

    #[test]
    fn inherited_fields_come_first() {
        let types = catalog(vec![
            TypeDefinition::new("Base")
                .field(FieldDefinition::new("id", "uuid").required(true)),
            TypeDefinition::new("Derived")
                .extends("Base")
                .field(FieldDefinition::new("name", "string")),
        ]);
        let mut resolver = TypeResolver::new(&types);

        resolver.resolve_expr("Derived").unwrap();
        let shapes = resolver.take_shapes();
        let derived = &shapes["Derived"];
        assert_eq!(
            derived.properties.keys().collect::<Vec<_>>(),
            vec!["id", "name"]
        );
        assert_eq!(derived.required, vec!["id"]);
        assert!(!shapes.contains_key("Base"));
    }

    #[test]
    fn hidden_fields_are_skipped() {
        let mut secret = FieldDefinition::new("secret", "string");
        secret.hidden = true;
        let types = catalog(vec![TypeDefinition::new("Account")
            .field(FieldDefinition::new("name", "string"))
            .field(secret)]);
        let mut resolver = TypeResolver::new(&types);

        resolver.resolve_expr("Account").unwrap();
        let shapes = resolver.take_shapes();
        assert!(!shapes["Account"].properties.contains_key("secret"));
    }

    // === Errors ===

    #[test]
    fn malformed_field_type_names_the_field() {
        let types = catalog(vec![
            TypeDefinition::new("Broken").field(FieldDefinition::new("items", "List<"))
        ]);
        let mut resolver = TypeResolver::new(&types);

        let result = resolver.resolve_expr("Broken");
        assert!(matches!(
            result,
            Err(TypeError::Field { ref owner, ref field, .. }) if owner == "Broken" && field == "items"
        ));
    }

    #[test]
    fn failed_model_leaves_no_placeholder() {
        let types = catalog(vec![
            response_dto(),
            TypeDefinition::new("Broken")
                .field(FieldDefinition::new("nested", "ResponseDto"))
                .field(FieldDefinition::new("items", "List<")),
        ]);
        let mut resolver = TypeResolver::new(&types);

        assert!(resolver.resolve_expr("Broken").is_err());
        let shapes = resolver.take_shapes();
        assert!(!shapes.contains_key("Broken"));

        // The name is free again, so a later resolution expands it.
        assert!(resolver.resolve_expr("Broken").is_err());
        assert!(!resolver.take_shapes().contains_key("Broken"));
    }
}
