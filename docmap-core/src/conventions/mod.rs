//! The convention pipeline.
//!
//! Conventions are pluggable passes that populate an [`EntityModelBuilder`]. They run in the
//! order configured on [`MapperOptions`](crate::options::MapperOptions):
//!
//! - [`FieldDiscovery`] - one property per declared field of the type and its ancestors
//! - [`MethodDiscovery`] - one property per getter/setter pair of the type and its ancestors
//! - [`EntityDefaults`] - drops transient properties, picks the id and version properties and
//!   configures the discriminator
//!
//! A later pass never merges with properties discovered by an earlier one; running both
//! discovery passes over a type that exposes the same property as a field and as a method
//! pair fails the build with a duplicate property error.

mod defaults;
mod fields;
mod methods;

use std::fmt::Debug;

use crate::builder::EntityModelBuilder;
use crate::error::MappingResult;
use crate::mapper::Mapper;
use crate::types::TypeKey;

pub use defaults::EntityDefaults;
pub use fields::FieldDiscovery;
pub use methods::MethodDiscovery;

/// A configuration pass applied to every entity model under construction.
///
/// # Example
///
/// ```ignore
/// use docmap::conventions::Convention;
/// use docmap::builder::EntityModelBuilder;
/// use docmap::mapper::Mapper;
/// use docmap::error::MappingResult;
///
/// #[derive(Debug)]
/// struct NoDiscriminators;
///
/// impl Convention for NoDiscriminators {
///     fn name(&self) -> &'static str {
///         "NoDiscriminators"
///     }
///
///     fn apply(&self, _mapper: &Mapper, builder: &mut EntityModelBuilder<'_>) -> MappingResult<()> {
///         builder.set_discriminator_enabled(false);
///         Ok(())
///     }
/// }
/// ```
pub trait Convention: Debug + Send + Sync {
    /// A short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Applies this pass to `builder`.
    ///
    /// # Errors
    ///
    /// Any error aborts the construction of the model.
    fn apply(&self, mapper: &Mapper, builder: &mut EntityModelBuilder<'_>) -> MappingResult<()>;
}

/// Returns the hierarchy of `builder` with accessor depths, root-most ancestor first and the
/// type itself (depth 0) last.
pub(crate) fn discovery_levels(builder: &EntityModelBuilder<'_>) -> Vec<(TypeKey, usize)> {
    let mut levels: Vec<(TypeKey, usize)> = builder
        .class_hierarchy()
        .iter()
        .enumerate()
        .map(|(index, key)| (*key, index + 1))
        .collect();
    levels.reverse();
    levels.push((builder.type_key(), 0));
    levels
}
