//! Mapper configuration.
//!
//! [`MapperOptions`] carries everything a [`Mapper`](crate::mapper::Mapper) consumes from the
//! outside: naming strategies, the discriminator defaults, the ordered convention pipeline and
//! the validator. [`MapperConfig`] is its serializable subset, suitable for configuration files.
//!
//! # Example
//!
//! ```ignore
//! use docmap::options::{MapperConfig, MapperOptions};
//! use docmap::naming::NamingStrategy;
//!
//! let options = MapperOptions::builder()
//!     .with_field_naming(NamingStrategy::SnakeCase)
//!     .with_discriminator_key("className")
//!     .build();
//!
//! let from_file = MapperConfig::from_json(r#"{ "field_naming": "snake_case" }"#)?
//!     .into_builder()
//!     .build();
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::conventions::{Convention, EntityDefaults, FieldDiscovery, MethodDiscovery};
use crate::error::MappingResult;
use crate::naming::{NamingConvention, NamingStrategy};
use crate::validation::Validator;

/// The discriminator key used when an entity does not declare one.
pub const DEFAULT_DISCRIMINATOR_KEY: &str = "_t";

/// Where the default convention pipeline discovers properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyDiscovery {
    /// Declared fields of the type and its ancestors.
    #[default]
    Fields,
    /// Getter/setter pairs of the type and its ancestors.
    Methods,
}

/// Settings consumed by a [`Mapper`](crate::mapper::Mapper).
#[derive(Debug, Clone)]
pub struct MapperOptions {
    field_naming: NamingStrategy,
    collection_naming: NamingStrategy,
    discriminator_naming: NamingStrategy,
    discriminator_key: String,
    property_discovery: PropertyDiscovery,
    store_nulls: bool,
    store_empties: bool,
    conventions: Vec<Arc<dyn Convention>>,
    validator: Arc<Validator>,
}

impl MapperOptions {
    pub fn builder() -> MapperOptionsBuilder {
        MapperOptionsBuilder::new()
    }

    /// Transforms logical property names into mapped names.
    pub fn field_naming(&self) -> &NamingStrategy {
        &self.field_naming
    }

    /// Transforms type names into collection names.
    pub fn collection_naming(&self) -> &NamingStrategy {
        &self.collection_naming
    }

    /// Transforms type names into discriminator values.
    pub fn discriminator_naming(&self) -> &NamingStrategy {
        &self.discriminator_naming
    }

    pub fn discriminator_key(&self) -> &str {
        &self.discriminator_key
    }

    pub fn property_discovery(&self) -> PropertyDiscovery {
        self.property_discovery
    }

    /// Whether the codec writes properties whose value is null.
    pub fn store_nulls(&self) -> bool {
        self.store_nulls
    }

    /// Whether the codec writes empty arrays and documents.
    pub fn store_empties(&self) -> bool {
        self.store_empties
    }

    /// The convention passes, in the order they run.
    pub fn conventions(&self) -> &[Arc<dyn Convention>] {
        &self.conventions
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

impl Default for MapperOptions {
    fn default() -> Self {
        MapperOptionsBuilder::new().build()
    }
}

/// Builder for [`MapperOptions`].
#[derive(Debug, Clone)]
pub struct MapperOptionsBuilder {
    field_naming: NamingStrategy,
    collection_naming: NamingStrategy,
    discriminator_naming: NamingStrategy,
    discriminator_key: String,
    property_discovery: PropertyDiscovery,
    store_nulls: bool,
    store_empties: bool,
    conventions: Option<Vec<Arc<dyn Convention>>>,
    validator: Option<Validator>,
}

impl MapperOptionsBuilder {
    pub fn new() -> Self {
        Self {
            field_naming: NamingStrategy::Identity,
            collection_naming: NamingStrategy::Identity,
            discriminator_naming: NamingStrategy::Identity,
            discriminator_key: DEFAULT_DISCRIMINATOR_KEY.to_string(),
            property_discovery: PropertyDiscovery::Fields,
            store_nulls: false,
            store_empties: false,
            conventions: None,
            validator: None,
        }
    }

    pub fn with_field_naming(mut self, naming: NamingStrategy) -> Self {
        self.field_naming = naming;
        self
    }

    pub fn with_collection_naming(mut self, naming: NamingStrategy) -> Self {
        self.collection_naming = naming;
        self
    }

    pub fn with_discriminator_naming(mut self, naming: NamingStrategy) -> Self {
        self.discriminator_naming = naming;
        self
    }

    pub fn with_discriminator_key(mut self, key: impl Into<String>) -> Self {
        self.discriminator_key = key.into();
        self
    }

    /// Selects the discovery pass of the default pipeline. Ignored when custom conventions
    /// are set.
    pub fn with_property_discovery(mut self, discovery: PropertyDiscovery) -> Self {
        self.property_discovery = discovery;
        self
    }

    pub fn with_store_nulls(mut self, store_nulls: bool) -> Self {
        self.store_nulls = store_nulls;
        self
    }

    pub fn with_store_empties(mut self, store_empties: bool) -> Self {
        self.store_empties = store_empties;
        self
    }

    /// Replaces the default convention pipeline.
    pub fn with_conventions(mut self, conventions: Vec<Arc<dyn Convention>>) -> Self {
        self.conventions = Some(conventions);
        self
    }

    /// Replaces the default validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn build(self) -> MapperOptions {
        let conventions = self.conventions.unwrap_or_else(|| {
            let discovery: Arc<dyn Convention> = match self.property_discovery {
                PropertyDiscovery::Fields => Arc::new(FieldDiscovery),
                PropertyDiscovery::Methods => Arc::new(MethodDiscovery),
            };
            vec![discovery, Arc::new(EntityDefaults)]
        });

        MapperOptions {
            field_naming: self.field_naming,
            collection_naming: self.collection_naming,
            discriminator_naming: self.discriminator_naming,
            discriminator_key: self.discriminator_key,
            property_discovery: self.property_discovery,
            store_nulls: self.store_nulls,
            store_empties: self.store_empties,
            conventions,
            validator: Arc::new(self.validator.unwrap_or_default()),
        }
    }
}

impl Default for MapperOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The serializable subset of [`MapperOptions`].
///
/// Missing keys take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub field_naming: NamingConvention,
    pub collection_naming: NamingConvention,
    pub discriminator_naming: NamingConvention,
    pub discriminator_key: String,
    pub property_discovery: PropertyDiscovery,
    pub store_nulls: bool,
    pub store_empties: bool,
}

impl MapperConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Serialization`](crate::error::MappingError::Serialization) if the
    /// JSON is malformed or has values of the wrong type.
    pub fn from_json(json: &str) -> MappingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Creates an options builder preset with this configuration.
    pub fn into_builder(self) -> MapperOptionsBuilder {
        MapperOptionsBuilder::new()
            .with_field_naming(self.field_naming.into())
            .with_collection_naming(self.collection_naming.into())
            .with_discriminator_naming(self.discriminator_naming.into())
            .with_discriminator_key(self.discriminator_key)
            .with_property_discovery(self.property_discovery)
            .with_store_nulls(self.store_nulls)
            .with_store_empties(self.store_empties)
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            field_naming: NamingConvention::Identity,
            collection_naming: NamingConvention::Identity,
            discriminator_naming: NamingConvention::Identity,
            discriminator_key: DEFAULT_DISCRIMINATOR_KEY.to_string(),
            property_discovery: PropertyDiscovery::Fields,
            store_nulls: false,
            store_empties: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;

    #[test]
    fn test_default_pipeline_follows_discovery_mode() {
        let fields = MapperOptions::default();
        let names: Vec<&str> = fields.conventions().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["FieldDiscovery", "EntityDefaults"]);

        let methods = MapperOptions::builder()
            .with_property_discovery(PropertyDiscovery::Methods)
            .build();
        let names: Vec<&str> = methods.conventions().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["MethodDiscovery", "EntityDefaults"]);
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config = MapperConfig::from_json(
            r#"{ "field_naming": "snake_case", "store_nulls": true }"#,
        )
        .unwrap();

        assert_eq!(config.field_naming, NamingConvention::SnakeCase);
        assert_eq!(config.discriminator_key, DEFAULT_DISCRIMINATOR_KEY);
        assert!(config.store_nulls);

        let options = config.into_builder().build();
        assert_eq!(options.field_naming().apply("lastName"), "last_name");
        assert!(options.store_nulls());
        assert!(!options.store_empties());
    }

    #[test]
    fn test_config_rejects_unknown_conventions() {
        assert!(matches!(
            MapperConfig::from_json(r#"{ "field_naming": "shouting" }"#),
            Err(MappingError::Serialization(_))
        ));
    }
}
