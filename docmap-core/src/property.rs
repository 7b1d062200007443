//! Property descriptors and the mutable builders conventions fill in.

use bson::Bson;

use crate::accessor::Accessor;
use crate::descriptor::TypeDescriptor;
use crate::entity::Mappable;
use crate::error::{MappingError, MappingResult};
use crate::metadata::{Annotation, AnnotationKind, Metadata};
use crate::options::MapperOptions;
use crate::types::{TypeArena, TypeKey, TypeKind};

/// The mapped name of every identity property.
pub const ID_KEY: &str = "_id";

/// One mapped property of an entity model.
///
/// Immutable once the model is built.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    mapped_name: String,
    full_name: String,
    type_descriptor: TypeDescriptor,
    normalized_type: TypeKey,
    is_array: bool,
    metadata: Metadata,
    accessor: Accessor,
    owner: TypeKey,
    declaring_type: TypeKey,
}

impl PropertyDescriptor {
    /// The logical name, unique within the owning model.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The document field name this property is stored under.
    pub fn mapped_name(&self) -> &str {
        &self.mapped_name
    }

    /// `Owner.property`, used in diagnostics.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    /// The (boxed) declared type.
    pub fn type_key(&self) -> TypeKey {
        self.type_descriptor.base_type()
    }

    /// The element type for arrays and collections, the value type for maps, otherwise the
    /// declared type.
    pub fn normalized_type(&self) -> TypeKey {
        self.normalized_type
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Returns `true` for arrays, lists and sets.
    pub fn is_multiple_values(&self) -> bool {
        self.is_array || matches!(self.type_key(), TypeKey::LIST | TypeKey::SET)
    }

    pub fn is_map(&self) -> bool {
        self.type_key() == TypeKey::MAP
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn has_annotation(&self, kind: &AnnotationKind) -> bool {
        self.metadata.has(kind)
    }

    pub fn annotation(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.metadata.get(kind)
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    /// The entity model this property belongs to.
    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    /// The type in the hierarchy that declares this property.
    pub fn declaring_type(&self) -> TypeKey {
        self.declaring_type
    }

    /// Reads this property from `instance`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Mapping`] naming this property if the accessor fails.
    pub fn get_value(&self, instance: &dyn Mappable) -> MappingResult<Bson> {
        self.accessor.get(instance).map_err(|err| self.failure(err))
    }

    /// Writes `value` into this property of `instance`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Mapping`] naming this property if the accessor fails.
    pub fn set_value(&self, instance: &mut dyn Mappable, value: Bson) -> MappingResult<()> {
        self.accessor.set(instance, value).map_err(|err| self.failure(err))
    }

    fn failure(&self, err: MappingError) -> MappingError {
        log::error!("accessor of {} failed: {err}", self.full_name);
        MappingError::mapping(&self.full_name, err)
    }
}

/// A property under construction, created by [`EntityModelBuilder::add_property`](crate::builder::EntityModelBuilder::add_property).
#[derive(Debug, Clone, Default)]
pub struct PropertyBuilder {
    name: Option<String>,
    mapped_name: Option<String>,
    type_descriptor: Option<TypeDescriptor>,
    metadata: Metadata,
    accessor: Option<Accessor>,
    declaring_type: Option<TypeKey>,
}

impl PropertyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn mapped_name(&self) -> Option<&str> {
        self.mapped_name.as_deref()
    }

    pub fn set_mapped_name(&mut self, mapped_name: impl Into<String>) -> &mut Self {
        self.mapped_name = Some(mapped_name.into());
        self
    }

    pub fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        self.type_descriptor.as_ref()
    }

    pub fn set_type_descriptor(&mut self, type_descriptor: TypeDescriptor) -> &mut Self {
        self.type_descriptor = Some(type_descriptor);
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: Metadata) -> &mut Self {
        self.metadata = metadata;
        self
    }

    pub fn has_annotation(&self, kind: &AnnotationKind) -> bool {
        self.metadata.has(kind)
    }

    pub fn accessor(&self) -> Option<&Accessor> {
        self.accessor.as_ref()
    }

    pub fn set_accessor(&mut self, accessor: Accessor) -> &mut Self {
        self.accessor = Some(accessor);
        self
    }

    pub fn declaring_type(&self) -> Option<TypeKey> {
        self.declaring_type
    }

    pub fn set_declaring_type(&mut self, declaring_type: TypeKey) -> &mut Self {
        self.declaring_type = Some(declaring_type);
        self
    }

    /// Resolves the mapped name from this property's metadata.
    ///
    /// The first rule that applies wins:
    ///
    /// 1. identity properties map to [`ID_KEY`]
    /// 2. an explicit `Property` name
    /// 3. an explicit `Reference` name
    /// 4. an explicit `Version` name
    /// 5. the configured field naming strategy applied to the logical name
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidModel`] if the logical name is not set yet.
    pub fn discover_mapped_name(&self, options: &MapperOptions) -> MappingResult<String> {
        let name = self.name.as_deref().ok_or_else(|| {
            MappingError::InvalidModel("<property>".to_string(), "property has no name".to_string())
        })?;

        if self.metadata.has(&AnnotationKind::Id) {
            return Ok(ID_KEY.to_string());
        }

        let explicit = [
            AnnotationKind::Property,
            AnnotationKind::Reference,
            AnnotationKind::Version,
        ]
        .iter()
        .filter_map(|kind| self.metadata.get(kind))
        .find_map(Annotation::explicit_name);

        Ok(match explicit {
            Some(explicit) => explicit.to_string(),
            None => options.field_naming().apply(name),
        })
    }

    pub(crate) fn build(
        self,
        arena: &TypeArena,
        owner: TypeKey,
        owner_name: &str,
    ) -> MappingResult<PropertyDescriptor> {
        let incomplete = |what: &str| {
            MappingError::InvalidModel(
                owner_name.to_string(),
                format!("property {} has no {what}", self.name.as_deref().unwrap_or("<unnamed>")),
            )
        };

        let name = self.name.clone().ok_or_else(|| incomplete("name"))?;
        let mapped_name = self.mapped_name.clone().ok_or_else(|| incomplete("mapped name"))?;
        let type_descriptor = self.type_descriptor.clone().ok_or_else(|| incomplete("type"))?;
        let accessor = self.accessor.clone().ok_or_else(|| incomplete("accessor"))?;

        if mapped_name.is_empty() {
            return Err(incomplete("non-empty mapped name"));
        }

        let base = type_descriptor.base_type();
        let component = arena.component_of(base);
        let normalized_type = match component {
            Some(component) => arena.boxed(component),
            None => {
                let parameter = |index: usize| {
                    type_descriptor
                        .parameters()
                        .get(index)
                        .map(TypeDescriptor::base_type)
                        .unwrap_or(TypeKey::OBJECT)
                };
                match base {
                    TypeKey::LIST | TypeKey::SET => parameter(0),
                    TypeKey::MAP => parameter(1),
                    _ => base,
                }
            }
        };
        let is_array = matches!(arena.kind(base), Some(TypeKind::Array { .. }));

        Ok(PropertyDescriptor {
            full_name: format!("{owner_name}.{name}"),
            name,
            mapped_name,
            type_descriptor,
            normalized_type,
            is_array,
            metadata: self.metadata,
            accessor,
            owner,
            declaring_type: self.declaring_type.unwrap_or(owner),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ReferenceAnnotation;
    use crate::naming::NamingStrategy;

    fn builder(name: &str, metadata: Metadata) -> PropertyBuilder {
        let mut builder = PropertyBuilder::new();
        builder.set_name(name).set_metadata(metadata);
        builder
    }

    #[test]
    fn test_identity_wins_over_explicit_names() {
        let options = MapperOptions::default();
        let property = builder(
            "key",
            Metadata::new()
                .with(Annotation::property("renamed"))
                .with(Annotation::Id),
        );

        assert_eq!(property.discover_mapped_name(&options).unwrap(), ID_KEY);
    }

    #[test]
    fn test_explicit_names_in_priority_order() {
        let options = MapperOptions::default();

        let reference = builder(
            "owner",
            Metadata::new()
                .with(Annotation::Property { name: None })
                .with(Annotation::Reference(ReferenceAnnotation::new().with_name("owner_ref")))
                .with(Annotation::Version {
                    name: Some("rev".to_string()),
                }),
        );
        assert_eq!(reference.discover_mapped_name(&options).unwrap(), "owner_ref");

        let version = builder(
            "revision",
            Metadata::new().with(Annotation::Version {
                name: Some("rev".to_string()),
            }),
        );
        assert_eq!(version.discover_mapped_name(&options).unwrap(), "rev");
    }

    #[test]
    fn test_naming_strategy_is_the_fallback() {
        let options = MapperOptions::builder()
            .with_field_naming(NamingStrategy::SnakeCase)
            .build();
        let property = builder("firstName", Metadata::new().with(Annotation::version()));

        assert_eq!(property.discover_mapped_name(&options).unwrap(), "first_name");
        assert!(PropertyBuilder::new().discover_mapped_name(&options).is_err());
    }

    #[test]
    fn test_empty_explicit_names_fall_through() {
        let options = MapperOptions::builder()
            .with_field_naming(NamingStrategy::SnakeCase)
            .build();

        let unnamed = builder("fullName", Metadata::new().with(Annotation::property("")));
        assert_eq!(unnamed.discover_mapped_name(&options).unwrap(), "full_name");

        let versioned = builder(
            "revision",
            Metadata::new()
                .with(Annotation::property(""))
                .with(Annotation::Version {
                    name: Some("rev".to_string()),
                }),
        );
        assert_eq!(versioned.discover_mapped_name(&options).unwrap(), "rev");
    }

    #[test]
    fn test_build_normalizes_collection_types() {
        let arena = crate::schema::SchemaBuilder::new().build().unwrap();
        let string = TypeDescriptor::build(&arena, TypeKey::STRING, Vec::new());
        let int = TypeDescriptor::build(&arena, TypeKey::INT32, Vec::new());

        let mut map = builder("scores", Metadata::new());
        map.set_mapped_name("scores")
            .set_type_descriptor(TypeDescriptor::build(&arena, TypeKey::MAP, vec![string, int]))
            .set_accessor(Accessor::field("scores", 0));
        let map = map.build(&arena, TypeKey::OBJECT, "Player").unwrap();

        assert_eq!(map.normalized_type(), TypeKey::INT32);
        assert_eq!(map.full_name(), "Player.scores");
        assert!(map.is_map());
        assert!(!map.is_multiple_values());

        let mut missing = builder("tags", Metadata::new());
        missing.set_mapped_name("tags");
        assert!(matches!(
            missing.build(&arena, TypeKey::OBJECT, "Player"),
            Err(MappingError::InvalidModel(_, _))
        ));
    }
}
