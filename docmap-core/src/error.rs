//! Error types and result types for entity mapping operations.
//!
//! Every fallible operation in this crate returns a [`MappingResult<T>`]. Model construction is
//! all-or-nothing: any error raised while discovering, configuring or validating a model is
//! propagated unrecovered to the caller of [`Mapper::entity_model`](crate::mapper::Mapper::entity_model).

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::validation::ValidationFailure;

/// Represents all possible errors that can occur while building or using entity models.
#[derive(Error, Debug)]
pub enum MappingError {
    /// An accessor failed to read or write a property value on an instance.
    /// The `property` is the fully qualified `Type.property` name.
    #[error("Mapping failure on {property}: {message}")]
    Mapping { property: String, message: String },
    /// A BSON value could not be converted into the requested Rust type.
    #[error("Conversion error: {0}")]
    Conversion(String),
    /// The registered type schema is malformed (unknown kinds, arity mismatches, cycles).
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// An entity model could not be constructed.
    /// The first argument is the type name, the second describes the problem.
    #[error("Invalid entity model for {0}: {1}")]
    InvalidModel(String, String),
    /// Validation produced at least one fatal violation. Carries every collected violation.
    #[error("{0}")]
    Validation(ValidationFailure),
    /// The requested element does not exist.
    #[error("No such element: {0}")]
    NotFound(String),
    /// A model was requested again while its own construction had not produced a model yet.
    #[error("Cyclic mapping detected while building {0}")]
    CyclicMapping(String),
    /// Serialization/deserialization error when converting between formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MappingError {
    /// Creates a [`MappingError::Mapping`] for the given fully qualified property name.
    pub fn mapping(property: impl Into<String>, message: impl ToString) -> Self {
        MappingError::Mapping {
            property: property.into(),
            message: message.to_string(),
        }
    }

    /// Creates a [`MappingError::Conversion`] describing an unexpected BSON value.
    pub fn conversion(expected: &str, found: &bson::Bson) -> Self {
        MappingError::Conversion(format!("expected {expected}, found {:?}", found.element_type()))
    }
}

/// A specialized `Result` type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

impl From<BsonError> for MappingError {
    fn from(err: BsonError) -> Self {
        MappingError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for MappingError {
    fn from(err: SerdeJsonError) -> Self {
        MappingError::Serialization(err.to_string())
    }
}
