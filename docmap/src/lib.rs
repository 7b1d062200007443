//! Object-document mapping for BSON document stores.
//!
//! This crate is the primary entry point of the docmap project. It re-exports the mapping core
//! and the `Entity` derive macro.
//!
//! # Features
//!
//! - **Derived structure** - `#[derive(Entity)]` registers a struct's fields, parent and metadata
//! - **Entity models** - Immutable per-type models with mapped names, identity, version and discriminator
//! - **Inheritance and generics** - Properties of ancestors are inherited and type variables resolved
//! - **Validation** - A pluggable rule catalog checks every model before it is published
//! - **Documents and paths** - Encode and decode instances, translate logical query paths
//!
//! # Quick Start
//!
//! ```ignore
//! use docmap::prelude::*;
//!
//! #[derive(Debug, Default, Entity)]
//! #[entity(collection = "people")]
//! pub struct Person {
//!     #[mapping(id)]
//!     pub id: i32,
//!     pub name: String,
//! }
//!
//! #[derive(Debug, Default, Entity)]
//! pub struct Employee {
//!     #[mapping(parent)]
//!     pub person: Person,
//!     pub dept: String,
//! }
//!
//! let mut schema = SchemaBuilder::new();
//! schema.register::<Employee>();
//! let mapper = Mapper::from_schema(schema, MapperOptions::default())?;
//!
//! let employee = Employee {
//!     person: Person { id: 1, name: "Ada".to_string() },
//!     dept: "R&D".to_string(),
//! };
//! let document = employee.to_document(&mapper)?;
//! // { "_t": "Employee", "_id": 1, "name": "Ada", "dept": "R&D" }
//! ```
//!
//! # Configuration
//!
//! ```ignore
//! use docmap::prelude::*;
//!
//! let options = MapperConfig::from_json(r#"{ "field_naming": "snake_case" }"#)?
//!     .into_builder()
//!     .with_validator(Validator::default())
//!     .build();
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmap;

pub mod prelude;

pub use docmap_core::{
    accessor, builder, codec, conventions, descriptor, entity, error, mapper, metadata, model, naming, options, path,
    property, schema, types, validation, value,
};

pub use docmap_core::bson_value_via_serde;
pub use docmap_core::entity::{Describe, Entity, EntityExt, Mappable};
pub use docmap_core::value::BsonValue;
pub use docmap_macros::Entity;

// Re-export BSON types for convenience and for derived code
pub use bson;
