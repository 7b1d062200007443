//! Convenient re-exports of commonly used types from docmap.
//!
//! ```ignore
//! use docmap::prelude::*;
//! ```

pub use docmap_core::{
    codec::EntityCodec,
    entity::{Describe, Entity, EntityExt, Mappable},
    error::{MappingError, MappingResult},
    mapper::Mapper,
    metadata::{Annotation, AnnotationKind, EntityAnnotation, Metadata, ReferenceAnnotation},
    model::EntityModel,
    naming::NamingStrategy,
    options::{MapperConfig, MapperOptions, PropertyDiscovery},
    path::{PathTarget, translate_filter},
    property::PropertyDescriptor,
    schema::{FieldDef, MethodDef, SchemaBuilder, TypeDef},
    validation::{Severity, Validator},
    value::BsonValue,
};
pub use docmap_macros::Entity;
