//! Conversion between mapped instances and BSON documents.
//!
//! An [`EntityCodec`] pairs a [`Mapper`] with one entity model and uses the model's property
//! descriptors to move values between an instance and a [`Document`]:
//!
//! - the discriminator, when enabled, is written first under its key
//! - every property is written under its mapped name, in discovery order
//! - null values and empty arrays or documents are skipped unless the options say otherwise
//!
//! Decoding writes every property present in the document into an existing instance and
//! leaves the others untouched.

use std::sync::Arc;

use bson::{Bson, Document};

use crate::entity::{Describe, Mappable};
use crate::error::{MappingError, MappingResult};
use crate::mapper::Mapper;
use crate::model::EntityModel;
use crate::types::TypeKey;

/// The update operator used for optimistic-locking increments.
pub const INC_OPERATOR: &str = "$inc";

/// Encodes and decodes instances of one entity model.
#[derive(Debug, Clone)]
pub struct EntityCodec<'m> {
    mapper: &'m Mapper,
    model: Arc<EntityModel>,
}

impl<'m> EntityCodec<'m> {
    pub fn new(mapper: &'m Mapper, model: Arc<EntityModel>) -> Self {
        Self { mapper, model }
    }

    /// Creates the codec of `E`, building its model if needed.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotFound`] if `E` is not registered or cannot be mapped, or any
    /// error raised while building its model.
    pub fn for_type<E: Describe>(mapper: &'m Mapper) -> MappingResult<Self> {
        let model = mapper
            .entity_model_of::<E>()?
            .ok_or_else(|| MappingError::NotFound(format!("entity model of {}", E::type_name())))?;
        Ok(Self::new(mapper, model))
    }

    pub fn model(&self) -> &Arc<EntityModel> {
        &self.model
    }

    /// Encodes `instance` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Mapping`] if a property cannot be read.
    pub fn encode(&self, instance: &dyn Mappable) -> MappingResult<Document> {
        let options = self.mapper.options();
        let mut document = Document::new();

        if self.model.discriminator_enabled() {
            if let (Some(key), Some(value)) = (self.model.discriminator_key(), self.model.discriminator()) {
                document.insert(key, value);
            }
        }

        for property in self.model.properties() {
            let value = property.get_value(instance)?;
            let skip = match &value {
                Bson::Null | Bson::Undefined => !options.store_nulls(),
                Bson::Array(items) => items.is_empty() && !options.store_empties(),
                Bson::Document(nested) => nested.is_empty() && !options.store_empties(),
                _ => false,
            };
            if !skip {
                document.insert(property.mapped_name(), value);
            }
        }

        Ok(document)
    }

    /// Writes every property found in `document` into `instance`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Mapping`] if a property cannot be written.
    pub fn decode_into(&self, document: &Document, instance: &mut dyn Mappable) -> MappingResult<()> {
        if let (Some(key), Some(expected)) = (self.model.discriminator_key(), self.model.discriminator()) {
            match document.get_str(key) {
                Ok(found) if found != expected => log::debug!(
                    "decoding a {found} document as {} ({expected})",
                    self.model.name()
                ),
                _ => {}
            }
        }

        for property in self.model.properties() {
            if let Some(value) = document.get(property.mapped_name()) {
                property.set_value(instance, value.clone())?;
            }
        }

        Ok(())
    }

    /// Adds an increment of the version property to `update`, unless `update` already
    /// increments it. Models without a version property leave `update` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Conversion`] if `update` has an `$inc` entry that is not a
    /// document.
    pub fn version_update(&self, update: &mut Document) -> MappingResult<()> {
        let Some(version) = self.model.version_property() else {
            return Ok(());
        };

        let step = if self.mapper.types().boxed(version.type_key()) == TypeKey::INT32 {
            Bson::Int32(1)
        } else {
            Bson::Int64(1)
        };

        match update.get_mut(INC_OPERATOR) {
            Some(Bson::Document(increments)) => {
                if !increments.contains_key(version.mapped_name()) {
                    increments.insert(version.mapped_name(), step);
                }
            }
            Some(other) => return Err(MappingError::conversion("document", other)),
            None => {
                let mut increments = Document::new();
                increments.insert(version.mapped_name(), step);
                update.insert(INC_OPERATOR, increments);
            }
        }

        Ok(())
    }
}
