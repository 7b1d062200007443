//! The object-document mapping core of the docmap project.
//!
//! This crate turns registered type structure into immutable per-type entity models that
//! describe how instances are stored as BSON documents:
//!
//! - **Type structure** ([`types`], [`schema`]) - The type arena and the schema builder that fills it
//! - **Metadata** ([`metadata`]) - Annotations attached to types, fields and methods
//! - **Type descriptors** ([`descriptor`]) - Declared types with their generic parameters resolved
//! - **Properties** ([`property`], [`accessor`]) - Mapped properties and how values are read and written
//! - **Model construction** ([`builder`], [`conventions`]) - The builder and the convention passes that populate it
//! - **Entity models** ([`model`]) - The finished, immutable models
//! - **Validation** ([`validation`]) - Rules run against every model before it is published
//! - **Registry** ([`mapper`]) - Builds each model once and caches it
//! - **Codec and paths** ([`codec`], [`path`]) - Documents from instances, mapped paths from logical ones
//! - **Configuration** ([`options`], [`naming`]) - Naming strategies, discriminators and pipelines
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docmap_core::{mapper::Mapper, metadata::Annotation, options::MapperOptions};
//! use docmap_core::schema::{FieldDef, SchemaBuilder, TypeDef};
//!
//! let mut schema = SchemaBuilder::new();
//! schema
//!     .define(
//!         TypeDef::class("Person")
//!             .field(FieldDef::new("id", "i32").annotate(Annotation::Id))
//!             .field(FieldDef::new("name", "String")),
//!     )
//!     .define(TypeDef::class("Employee").extends("Person").field(FieldDef::new("dept", "String")));
//!
//! let mapper = Mapper::from_schema(schema, MapperOptions::default())?;
//! let employee = mapper.entity_model_by_name("Employee")?.expect("Employee is a class");
//!
//! let names: Vec<&str> = employee.properties().iter().map(|p| p.name()).collect();
//! assert_eq!(names, ["id", "name", "dept"]);
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmap_core;

pub mod accessor;
pub mod builder;
pub mod codec;
pub mod conventions;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod metadata;
pub mod model;
pub mod naming;
pub mod options;
pub mod path;
pub mod property;
pub mod schema;
pub mod types;
pub mod validation;
pub mod value;

// Re-exported for `bson_value_via_serde!` and derived code
pub use bson;
