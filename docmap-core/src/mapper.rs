//! The model registry.
//!
//! A [`Mapper`] owns the type arena, the options and every entity model built so far. Models
//! are built on first request and cached for the lifetime of the mapper:
//!
//! - cached models are served under a read lock, so lookups never wait on each other
//! - first-time builds are serialized behind a reentrant lock, so each type is built at most
//!   once even when several threads ask for it together
//! - a build that needs another model (superclass, interface, reference target) re-enters the
//!   lock on the same thread
//!
//! A model that is requested again while it is still being built resolves to its staged
//! placeholder once it exists (during validation), or fails with
//! [`MappingError::CyclicMapping`] before that.
//!
//! # Example
//!
//! ```ignore
//! use docmap::prelude::*;
//!
//! let mut schema = SchemaBuilder::new();
//! schema.register::<Person>().register::<Employee>();
//!
//! let mapper = Mapper::from_schema(schema, MapperOptions::default())?;
//! let employee = mapper.entity_model_of::<Employee>()?.expect("Employee is a class");
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use crate::builder::EntityModelBuilder;
use crate::entity::Describe;
use crate::error::{MappingError, MappingResult};
use crate::model::EntityModel;
use crate::options::MapperOptions;
use crate::schema::SchemaBuilder;
use crate::types::{TypeArena, TypeKey};

#[derive(Debug, Default)]
struct BuildState {
    in_progress: HashSet<TypeKey>,
    staged: HashMap<TypeKey, Arc<EntityModel>>,
}

/// Builds, caches and serves entity models.
pub struct Mapper {
    types: TypeArena,
    options: MapperOptions,
    models: RwLock<HashMap<TypeKey, Arc<EntityModel>>>,
    builds: ReentrantMutex<RefCell<BuildState>>,
}

impl Mapper {
    pub fn new(types: TypeArena, options: MapperOptions) -> Self {
        Self {
            types,
            options,
            models: RwLock::new(HashMap::new()),
            builds: ReentrantMutex::new(RefCell::new(BuildState::default())),
        }
    }

    /// Creates a mapper with the default options.
    pub fn with_defaults(types: TypeArena) -> Self {
        Self::new(types, MapperOptions::default())
    }

    /// Builds the schema and creates a mapper over it.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidSchema`] if the schema is inconsistent.
    pub fn from_schema(schema: SchemaBuilder, options: MapperOptions) -> MappingResult<Self> {
        Ok(Self::new(schema.build()?, options))
    }

    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Returns `true` if entity models can be built for `key`.
    pub fn is_mappable(&self, key: TypeKey) -> bool {
        self.types.is_mappable(key)
    }

    /// Returns the model of `key`, building and caching it on first request.
    ///
    /// Returns `Ok(None)` for types that cannot be mapped, such as scalars and containers.
    ///
    /// # Errors
    ///
    /// Returns an error if the model, or a model it depends on, cannot be built. Nothing is
    /// cached for a failed build.
    pub fn entity_model(&self, key: TypeKey) -> MappingResult<Option<Arc<EntityModel>>> {
        if !self.is_mappable(key) {
            return Ok(None);
        }
        if let Some(model) = self.cached(key) {
            return Ok(Some(model));
        }

        let guard = self.builds.lock();
        if let Some(model) = self.cached(key) {
            return Ok(Some(model));
        }

        {
            let mut state = guard.borrow_mut();
            if state.in_progress.contains(&key) {
                return match state.staged.get(&key) {
                    Some(model) => Ok(Some(Arc::clone(model))),
                    None => Err(MappingError::CyclicMapping(self.types.name(key).to_string())),
                };
            }
            state.in_progress.insert(key);
        }

        let built = EntityModelBuilder::new(self, key).and_then(EntityModelBuilder::build);

        {
            let mut state = guard.borrow_mut();
            state.in_progress.remove(&key);
            state.staged.remove(&key);
        }

        let model = built?;
        self.models.write().insert(key, Arc::clone(&model));
        log::debug!(
            "mapped {} to collection {} with {} properties",
            model.name(),
            model.collection_name(),
            model.properties().len()
        );

        Ok(Some(model))
    }

    /// Returns the model of the type registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotFound`] if no type has that name, or any error of
    /// [`Mapper::entity_model`].
    pub fn entity_model_by_name(&self, name: &str) -> MappingResult<Option<Arc<EntityModel>>> {
        let key = self
            .types
            .lookup(name)
            .ok_or_else(|| MappingError::NotFound(format!("type {name}")))?;
        self.entity_model(key)
    }

    /// Returns the model of `T`.
    ///
    /// # Errors
    ///
    /// See [`Mapper::entity_model_by_name`].
    pub fn entity_model_of<T: Describe>(&self) -> MappingResult<Option<Arc<EntityModel>>> {
        self.entity_model_by_name(T::type_name())
    }

    /// Builds the model of every mappable type, in registration order.
    ///
    /// # Errors
    ///
    /// Stops at the first type whose model cannot be built.
    pub fn map_all(&self) -> MappingResult<Vec<Arc<EntityModel>>> {
        let keys: Vec<TypeKey> = self
            .types
            .iter()
            .map(|node| node.key())
            .filter(|key| self.is_mappable(*key))
            .collect();

        let mut models = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(model) = self.entity_model(key)? {
                models.push(model);
            }
        }
        Ok(models)
    }

    /// Every model built so far.
    pub fn cached_models(&self) -> Vec<Arc<EntityModel>> {
        self.models.read().values().cloned().collect()
    }

    fn cached(&self, key: TypeKey) -> Option<Arc<EntityModel>> {
        self.models.read().get(&key).cloned()
    }

    /// Makes a model that is still being validated visible to re-entrant requests.
    pub(crate) fn stage(&self, model: &Arc<EntityModel>) {
        let guard = self.builds.lock();
        let mut state = guard.borrow_mut();
        if state.in_progress.contains(&model.type_key()) {
            state.staged.insert(model.type_key(), Arc::clone(model));
        }
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("types", &self.types.len())
            .field("options", &self.options)
            .field("models", &self.models.read().len())
            .finish_non_exhaustive()
    }
}
