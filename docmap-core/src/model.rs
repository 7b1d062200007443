//! The immutable per-type entity model.

use std::sync::{Arc, Weak};

use crate::metadata::{Annotation, AnnotationKind, Metadata};
use crate::property::PropertyDescriptor;
use crate::types::TypeKey;

/// Finalized mapping metadata of one type.
///
/// Models are created by [`EntityModelBuilder::build`](crate::builder::EntityModelBuilder::build)
/// and owned by the [`Mapper`](crate::mapper::Mapper); links to the superclass and interface
/// models are weak.
///
/// # Example
///
/// ```ignore
/// let model = mapper.entity_model_of::<Person>()?.expect("Person is mappable");
///
/// assert_eq!(model.collection_name(), "people");
/// assert_eq!(model.id_property().map(|id| id.mapped_name()), Some("_id"));
/// for property in model.properties() {
///     println!("{} -> {}", property.name(), property.mapped_name());
/// }
/// ```
#[derive(Debug)]
pub struct EntityModel {
    pub(crate) type_key: TypeKey,
    pub(crate) name: String,
    pub(crate) is_interface: bool,
    pub(crate) metadata: Metadata,
    pub(crate) properties: Vec<PropertyDescriptor>,
    pub(crate) superclass: Option<Weak<EntityModel>>,
    pub(crate) interfaces: Vec<Weak<EntityModel>>,
    pub(crate) id_property: Option<usize>,
    pub(crate) version_property: Option<usize>,
    pub(crate) discriminator_enabled: bool,
    pub(crate) discriminator_key: Option<String>,
    pub(crate) discriminator: Option<String>,
    pub(crate) collection_name: String,
}

impl EntityModel {
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    /// Entity-level metadata, including what the type inherits.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn has_annotation(&self, kind: &AnnotationKind) -> bool {
        self.metadata.has(kind)
    }

    pub fn annotation(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.metadata.get(kind)
    }

    /// Returns the property with the given logical name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|property| property.name() == name)
    }

    /// Returns the property stored under the given document field name.
    pub fn property_by_mapped_name(&self, mapped_name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|property| property.mapped_name() == mapped_name)
    }

    /// All properties, in discovery order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// The properties carrying an annotation of `kind`.
    pub fn properties_with(&self, kind: &AnnotationKind) -> Vec<&PropertyDescriptor> {
        self.properties
            .iter()
            .filter(|property| property.has_annotation(kind))
            .collect()
    }

    pub fn id_property(&self) -> Option<&PropertyDescriptor> {
        self.id_property.and_then(|index| self.properties.get(index))
    }

    pub fn version_property(&self) -> Option<&PropertyDescriptor> {
        self.version_property.and_then(|index| self.properties.get(index))
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn discriminator_enabled(&self) -> bool {
        self.discriminator_enabled
    }

    pub fn discriminator_key(&self) -> Option<&str> {
        self.discriminator_key.as_deref()
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    /// The model of the direct superclass, if it is mapped and still alive.
    pub fn superclass(&self) -> Option<Arc<EntityModel>> {
        self.superclass.as_ref().and_then(Weak::upgrade)
    }

    /// The models of every interface implemented along the hierarchy.
    pub fn interfaces(&self) -> Vec<Arc<EntityModel>> {
        self.interfaces.iter().filter_map(Weak::upgrade).collect()
    }
}
