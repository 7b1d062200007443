//! Construction of entity models.
//!
//! An [`EntityModelBuilder`] is created by the [`Mapper`] for exactly one model build. On
//! creation it:
//!
//! - closes over the type hierarchy: the ancestor classes (nearest first, up to but
//!   excluding `Object`) and every interface implemented along the way
//! - computes the generic parameterization of the hierarchy and propagates it, so a type
//!   variable bound several levels down resolves on the ancestor that declares it
//! - resolves the superclass and interface models, building them first if needed
//!
//! [`EntityModelBuilder::build`] then runs the convention pipeline, checks the discriminator,
//! constructs the immutable [`EntityModel`] and validates it.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::descriptor::TypeDescriptor;
use crate::error::{MappingError, MappingResult};
use crate::mapper::Mapper;
use crate::metadata::{Annotation, AnnotationKind, Metadata};
use crate::model::EntityModel;
use crate::property::PropertyBuilder;
use crate::types::{GenericType, TypeArena, TypeKey, TypeKind, TypeNode};

/// Type variable bindings per ancestor, root-most ancestor first.
pub type Parameterization = IndexMap<TypeKey, IndexMap<String, GenericType>>;

/// Collects everything needed to construct one [`EntityModel`].
#[derive(Debug)]
pub struct EntityModelBuilder<'m> {
    mapper: &'m Mapper,
    type_key: TypeKey,
    name: String,
    is_interface: bool,
    metadata: Metadata,
    classes: IndexSet<TypeKey>,
    interfaces: IndexSet<TypeKey>,
    parameterization: Parameterization,
    superclass: Option<Arc<EntityModel>>,
    interface_models: Vec<Arc<EntityModel>>,
    properties: Vec<PropertyBuilder>,
    discriminator_enabled: bool,
    discriminator_key: Option<String>,
    discriminator: Option<String>,
    id_property_name: Option<String>,
    version_property_name: Option<String>,
}

impl<'m> EntityModelBuilder<'m> {
    /// Prepares the construction of the model of `type_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is not mappable or its superclass or interface models
    /// cannot be built.
    pub fn new(mapper: &'m Mapper, type_key: TypeKey) -> MappingResult<Self> {
        let arena = mapper.types();
        let node = arena.get(type_key)?;

        if !arena.is_mappable(type_key) {
            return Err(MappingError::InvalidModel(
                node.name().to_string(),
                "only classes and interfaces can be mapped".to_string(),
            ));
        }

        let mut metadata = node.metadata().clone();
        let mut classes = IndexSet::new();
        let mut current = node.superclass_key();
        while let Some(ancestor) = current {
            if ancestor == TypeKey::OBJECT
                || arena.kind(ancestor) == Some(TypeKind::Enum)
                || !classes.insert(ancestor)
            {
                break;
            }
            let ancestor_node = arena.get(ancestor)?;
            metadata.inherit(ancestor_node.metadata());
            current = ancestor_node.superclass_key();
        }

        let mut interfaces = IndexSet::new();
        collect_interfaces(arena, type_key, &mut interfaces)?;
        for class in &classes {
            collect_interfaces(arena, *class, &mut interfaces)?;
        }
        for interface in &interfaces {
            metadata.inherit(arena.get(*interface)?.metadata());
        }

        let mut parameterization = find_parameterization(arena, type_key)?;
        propagate(&mut parameterization);

        let superclass = match classes.first() {
            Some(parent) => mapper.entity_model(*parent)?,
            None => None,
        };
        let mut interface_models = Vec::new();
        for interface in &interfaces {
            if let Some(model) = mapper.entity_model(*interface)? {
                interface_models.push(model);
            }
        }

        Ok(Self {
            mapper,
            type_key,
            name: node.name().to_string(),
            is_interface: node.is_interface(),
            metadata,
            classes,
            interfaces,
            parameterization,
            superclass,
            interface_models,
            properties: Vec::new(),
            discriminator_enabled: false,
            discriminator_key: None,
            discriminator: None,
            id_property_name: None,
            version_property_name: None,
        })
    }

    pub fn mapper(&self) -> &'m Mapper {
        self.mapper
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_node(&self) -> MappingResult<&'m TypeNode> {
        self.mapper.types().get(self.type_key)
    }

    /// Ancestor classes, nearest first, excluding `Object`.
    pub fn class_hierarchy(&self) -> &IndexSet<TypeKey> {
        &self.classes
    }

    /// Every interface implemented by the type or its ancestors, transitively.
    pub fn interfaces(&self) -> &IndexSet<TypeKey> {
        &self.interfaces
    }

    pub fn parameterization(&self) -> &Parameterization {
        &self.parameterization
    }

    /// Returns the binding of the type variable `name` declared on `declaring`.
    pub fn resolve_variable(&self, declaring: TypeKey, name: &str) -> Option<&GenericType> {
        self.parameterization.get(&declaring)?.get(name)
    }

    /// Entity-level metadata of the type, completed by its ancestors and interfaces.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn annotation(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.metadata.get(kind)
    }

    pub fn has_annotation(&self, kind: &AnnotationKind) -> bool {
        self.metadata.has(kind)
    }

    pub fn superclass_model(&self) -> Option<&Arc<EntityModel>> {
        self.superclass.as_ref()
    }

    pub fn interface_models(&self) -> &[Arc<EntityModel>] {
        &self.interface_models
    }

    /// Registers a new, empty property and returns it for the caller to fill in.
    pub fn add_property(&mut self) -> &mut PropertyBuilder {
        self.properties.push(PropertyBuilder::new());
        let last = self.properties.len() - 1;
        &mut self.properties[last]
    }

    pub fn properties(&self) -> &[PropertyBuilder] {
        &self.properties
    }

    /// Returns the property named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotFound`] if no property has that name.
    pub fn property_by_name(&self, name: &str) -> MappingResult<&PropertyBuilder> {
        self.properties
            .iter()
            .find(|property| property.name() == Some(name))
            .ok_or_else(|| self.missing_property(name))
    }

    /// Mutable variant of [`EntityModelBuilder::property_by_name`].
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotFound`] if no property has that name.
    pub fn property_by_name_mut(&mut self, name: &str) -> MappingResult<&mut PropertyBuilder> {
        let missing = self.missing_property(name);
        self.properties
            .iter_mut()
            .find(|property| property.name() == Some(name))
            .ok_or(missing)
    }

    fn missing_property(&self, name: &str) -> MappingError {
        MappingError::NotFound(format!("property {name} on {}", self.name))
    }

    /// Keeps only the properties for which `keep` returns `true`.
    pub fn retain_properties(&mut self, keep: impl FnMut(&PropertyBuilder) -> bool) {
        self.properties.retain(keep);
    }

    /// Returns the descriptor of a member declared on `declaring`.
    ///
    /// If `declared` is a type variable bound somewhere in the hierarchy, the binding replaces
    /// the base type of `suggested` (or the whole descriptor when the binding has type
    /// arguments). Otherwise `suggested` is returned unchanged.
    pub fn type_descriptor(
        &self,
        declaring: TypeKey,
        suggested: TypeDescriptor,
        declared: &GenericType,
    ) -> TypeDescriptor {
        let arena = self.mapper.types();
        let resolved = declared
            .variable_name()
            .and_then(|name| self.resolve_variable(declaring, name));

        match resolved {
            Some(GenericType::Class { base, args }) if args.is_empty() => {
                suggested.with_base_type(arena, *base)
            }
            Some(binding @ GenericType::Class { .. }) => TypeDescriptor::of(arena, declaring, binding),
            Some(GenericType::Array { erased, .. }) => suggested.with_base_type(arena, *erased),
            Some(GenericType::Variable(_)) | None => suggested,
        }
    }

    pub fn discriminator_enabled(&self) -> bool {
        self.discriminator_enabled
    }

    pub fn set_discriminator_enabled(&mut self, enabled: bool) -> &mut Self {
        self.discriminator_enabled = enabled;
        self
    }

    pub fn discriminator_key(&self) -> Option<&str> {
        self.discriminator_key.as_deref()
    }

    pub fn set_discriminator_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.discriminator_key = Some(key.into());
        self
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn set_discriminator(&mut self, discriminator: impl Into<String>) -> &mut Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn id_property_name(&self) -> Option<&str> {
        self.id_property_name.as_deref()
    }

    pub fn set_id_property_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.id_property_name = Some(name.into());
        self
    }

    pub fn version_property_name(&self) -> Option<&str> {
        self.version_property_name.as_deref()
    }

    pub fn set_version_property_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.version_property_name = Some(name.into());
        self
    }

    /// The explicit collection of the `Entity` metadata, or the collection naming strategy
    /// applied to the type name.
    pub fn collection_name(&self) -> String {
        match self.metadata.get(&AnnotationKind::Entity) {
            Some(Annotation::Entity(entity)) => match entity.collection.as_deref() {
                Some(collection) if !collection.is_empty() => collection.to_string(),
                _ => self.mapper.options().collection_naming().apply(&self.name),
            },
            _ => self.mapper.options().collection_naming().apply(&self.name),
        }
    }

    /// Runs the conventions, constructs the model and validates it.
    ///
    /// The model is staged with the mapper before validation so that rules resolving a
    /// reference back to this type observe it.
    ///
    /// # Errors
    ///
    /// Returns an error if a convention fails, the discriminator is enabled without a key or
    /// value, property logical names collide, or validation finds a fatal violation.
    pub fn build(mut self) -> MappingResult<Arc<EntityModel>> {
        let mapper = self.mapper;

        for convention in mapper.options().conventions() {
            log::trace!("applying {} to {}", convention.name(), self.name);
            convention.apply(mapper, &mut self)?;
        }

        if self.discriminator_enabled {
            if self.discriminator_key.as_deref().is_none_or(str::is_empty) {
                return Err(self.invalid("the discriminator is enabled but no discriminator key is set"));
            }
            if self.discriminator.as_deref().is_none_or(str::is_empty) {
                return Err(self.invalid("the discriminator is enabled but no discriminator value is set"));
            }
        }

        let model = Arc::new(self.into_model()?);
        mapper.stage(&model);
        mapper.options().validator().check(mapper, &model)?;

        Ok(model)
    }

    fn invalid(&self, message: &str) -> MappingError {
        log::error!("cannot build entity model for {}: {message}", self.name);
        MappingError::InvalidModel(self.name.clone(), message.to_string())
    }

    fn into_model(self) -> MappingResult<EntityModel> {
        let collection_name = self.collection_name();
        if collection_name.is_empty() {
            return Err(self.invalid("the collection name is empty"));
        }

        let arena = self.mapper.types();
        let mut names = HashSet::new();
        let mut properties = Vec::with_capacity(self.properties.len());
        for property in self.properties {
            let property = property.build(arena, self.type_key, &self.name)?;
            if !names.insert(property.name().to_string()) {
                return Err(MappingError::InvalidModel(
                    self.name,
                    format!("property {} is discovered more than once", property.name()),
                ));
            }
            properties.push(property);
        }

        let position = |name: &Option<String>| {
            name.as_deref()
                .and_then(|name| properties.iter().position(|property| property.name() == name))
        };
        let id_property = position(&self.id_property_name);
        let version_property = position(&self.version_property_name);

        Ok(EntityModel {
            type_key: self.type_key,
            name: self.name,
            is_interface: self.is_interface,
            metadata: self.metadata,
            properties,
            superclass: self.superclass.as_ref().map(Arc::downgrade),
            interfaces: self.interface_models.iter().map(Arc::downgrade).collect(),
            id_property,
            version_property,
            discriminator_enabled: self.discriminator_enabled,
            discriminator_key: self.discriminator_key,
            discriminator: self.discriminator,
            collection_name,
        })
    }
}

fn collect_interfaces(arena: &TypeArena, key: TypeKey, interfaces: &mut IndexSet<TypeKey>) -> MappingResult<()> {
    for interface in arena.get(key)?.interface_keys() {
        if interfaces.insert(interface) {
            collect_interfaces(arena, interface, interfaces)?;
        }
    }
    Ok(())
}

/// Binds the type parameters of every generic ancestor to the arguments its subclass passes,
/// root-most ancestor first.
fn find_parameterization(arena: &TypeArena, key: TypeKey) -> MappingResult<Parameterization> {
    match arena.get(key)?.superclass() {
        Some(GenericType::Class { base, args }) if *base != TypeKey::OBJECT => {
            let mut parameterization = find_parameterization(arena, *base)?;
            let frame = arena
                .get(*base)?
                .type_params()
                .iter()
                .zip(args)
                .map(|(param, arg)| (param.name().to_string(), arg.clone()))
                .collect();
            parameterization.insert(*base, frame);
            Ok(parameterization)
        }
        _ => Ok(Parameterization::new()),
    }
}

/// Rewrites every binding that is still a type variable with the binding the next frames
/// give that variable, for as many frames as needed.
fn propagate(parameterization: &mut Parameterization) {
    let keys: Vec<TypeKey> = parameterization.keys().copied().collect();

    for (index, key) in keys.iter().enumerate() {
        let names: Vec<String> = parameterization[key].keys().cloned().collect();
        for name in names {
            let mut peek = index + 1;
            while let Some(GenericType::Variable(variable)) = parameterization[key].get(&name).cloned() {
                let Some(next) = keys.get(peek) else {
                    break;
                };
                let Some(binding) = parameterization[next].get(&variable).cloned() else {
                    break;
                };
                if let Some(slot) = parameterization
                    .get_mut(key)
                    .and_then(|frame| frame.get_mut(&name))
                {
                    *slot = binding;
                }
                peek += 1;
            }
        }
    }
}
