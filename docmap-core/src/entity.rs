//! Core traits implemented by mapped types.
//!
//! A mapped type implements two traits, normally through `#[derive(Entity)]`:
//!
//! - [`Describe`] registers the type's structure (fields, parent, metadata) with a
//!   [`SchemaBuilder`]
//! - [`Mappable`] gives accessors name-based access to the type's fields and methods
//!
//! Rust has no inheritance, so a type "extends" another by embedding it and returning it from
//! [`Mappable::parent`]. Accessors of inherited properties walk these parent links.

use bson::{Bson, Document};
use serde_json::Value;

use crate::codec::EntityCodec;
use crate::error::MappingResult;
use crate::mapper::Mapper;
use crate::schema::SchemaBuilder;

/// Name-based access to the state of a mapped instance.
///
/// Every method returns `None` when the instance has no member of that name, and
/// `Some(Err(..))` when the member exists but the value could not be converted.
///
/// # Example
///
/// ```ignore
/// use docmap::{Mappable, BsonValue, bson::Bson, error::MappingResult};
///
/// struct Person {
///     id: i32,
///     name: String,
/// }
///
/// impl Mappable for Person {
///     fn read_field(&self, field: &str) -> Option<MappingResult<Bson>> {
///         match field {
///             "id" => Some(self.id.to_bson()),
///             "name" => Some(self.name.to_bson()),
///             _ => None,
///         }
///     }
///
///     fn write_field(&mut self, field: &str, value: Bson) -> Option<MappingResult<()>> {
///         match field {
///             "id" => Some(i32::from_bson(value).map(|id| self.id = id)),
///             "name" => Some(String::from_bson(value).map(|name| self.name = name)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Mappable {
    /// Reads the field named `field`.
    fn read_field(&self, field: &str) -> Option<MappingResult<Bson>>;

    /// Writes `value` into the field named `field`.
    fn write_field(&mut self, field: &str, value: Bson) -> Option<MappingResult<()>>;

    /// Invokes the no-argument getter named `method`.
    fn call_getter(&self, method: &str) -> Option<MappingResult<Bson>> {
        let _ = method;
        None
    }

    /// Invokes the one-argument setter named `method`.
    fn call_setter(&mut self, method: &str, value: Bson) -> Option<MappingResult<()>> {
        let _ = (method, value);
        None
    }

    /// Returns the embedded part holding the members of the parent type.
    fn parent(&self) -> Option<&dyn Mappable> {
        None
    }

    /// Mutable variant of [`Mappable::parent`].
    fn parent_mut(&mut self) -> Option<&mut dyn Mappable> {
        None
    }
}

/// Registers a type's structure with a schema.
pub trait Describe {
    /// The name the type is registered under.
    fn type_name() -> &'static str;

    /// Defines this type, and any parent it extends, on `schema`.
    fn describe(schema: &mut SchemaBuilder);
}

/// A type that is both described and accessible: everything the codec needs.
pub trait Entity: Mappable + Describe {}

impl<T: Mappable + Describe> Entity for T {}

/// Extension trait converting entities to and from documents through their entity model.
///
/// This trait is automatically implemented for all types that implement [`Entity`].
pub trait EntityExt: Entity + Sized {
    /// Encodes this entity into a BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the type has no entity model or a property cannot be read.
    fn to_document(&self, mapper: &Mapper) -> MappingResult<Document>;

    /// Decodes an entity from a BSON document, starting from `Self::default()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the type has no entity model or a property cannot be written.
    fn from_document(mapper: &Mapper, document: &Document) -> MappingResult<Self>
    where
        Self: Default;

    /// Encodes this entity into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn to_json(&self, mapper: &Mapper) -> MappingResult<Value>;
}

impl<E: Entity> EntityExt for E {
    fn to_document(&self, mapper: &Mapper) -> MappingResult<Document> {
        EntityCodec::for_type::<E>(mapper)?.encode(self)
    }

    fn from_document(mapper: &Mapper, document: &Document) -> MappingResult<Self>
    where
        Self: Default,
    {
        let mut entity = Self::default();
        EntityCodec::for_type::<E>(mapper)?.decode_into(document, &mut entity)?;
        Ok(entity)
    }

    fn to_json(&self, mapper: &Mapper) -> MappingResult<Value> {
        Ok(serde_json::to_value(Bson::Document(self.to_document(mapper)?))?)
    }
}
