//! Property accessors.
//!
//! The accessor of a property is chosen once, when the property is discovered, and cached on
//! its descriptor:
//!
//! - [`FieldAccessor`] reads and writes a named field
//! - [`MethodAccessor`] invokes a getter/setter pair
//! - [`ArrayAccessor`] reads and writes an array field, coercing every element to the
//!   array's element type
//!
//! Inherited members live in the embedded parent part of an instance, so every accessor first
//! walks `depth` parent links.

use bson::Bson;

use crate::entity::Mappable;
use crate::error::{MappingError, MappingResult};
use crate::types::ElementKind;
use crate::value::{floating, integral};

fn ancestor(mut instance: &dyn Mappable, depth: usize) -> MappingResult<&dyn Mappable> {
    for level in 1..=depth {
        instance = instance
            .parent()
            .ok_or_else(|| MappingError::NotFound(format!("parent at depth {level}")))?;
    }
    Ok(instance)
}

fn ancestor_mut(mut instance: &mut dyn Mappable, depth: usize) -> MappingResult<&mut dyn Mappable> {
    for level in 1..=depth {
        instance = instance
            .parent_mut()
            .ok_or_else(|| MappingError::NotFound(format!("parent at depth {level}")))?;
    }
    Ok(instance)
}

/// Reads and writes a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccessor {
    field: String,
    depth: usize,
}

impl FieldAccessor {
    pub fn new(field: impl Into<String>, depth: usize) -> Self {
        Self {
            field: field.into(),
            depth,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn get(&self, instance: &dyn Mappable) -> MappingResult<Bson> {
        ancestor(instance, self.depth)?
            .read_field(&self.field)
            .unwrap_or_else(|| Err(MappingError::NotFound(format!("field {}", self.field))))
    }

    fn set(&self, instance: &mut dyn Mappable, value: Bson) -> MappingResult<()> {
        ancestor_mut(instance, self.depth)?
            .write_field(&self.field, value)
            .unwrap_or_else(|| Err(MappingError::NotFound(format!("field {}", self.field))))
    }
}

/// Invokes a getter/setter pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodAccessor {
    getter: String,
    setter: String,
    depth: usize,
}

impl MethodAccessor {
    pub fn new(getter: impl Into<String>, setter: impl Into<String>, depth: usize) -> Self {
        Self {
            getter: getter.into(),
            setter: setter.into(),
            depth,
        }
    }

    pub fn getter(&self) -> &str {
        &self.getter
    }

    pub fn setter(&self) -> &str {
        &self.setter
    }

    fn get(&self, instance: &dyn Mappable) -> MappingResult<Bson> {
        ancestor(instance, self.depth)?
            .call_getter(&self.getter)
            .unwrap_or_else(|| Err(MappingError::NotFound(format!("method {}", self.getter))))
    }

    fn set(&self, instance: &mut dyn Mappable, value: Bson) -> MappingResult<()> {
        ancestor_mut(instance, self.depth)?
            .call_setter(&self.setter, value)
            .unwrap_or_else(|| Err(MappingError::NotFound(format!("method {}", self.setter))))
    }
}

/// A field accessor for arrays that coerces each element to `element`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayAccessor {
    field: FieldAccessor,
    element: ElementKind,
}

impl ArrayAccessor {
    pub fn new(field: FieldAccessor, element: ElementKind) -> Self {
        Self { field, element }
    }

    pub fn element(&self) -> ElementKind {
        self.element
    }

    fn get(&self, instance: &dyn Mappable) -> MappingResult<Bson> {
        self.coerce(self.field.get(instance)?)
    }

    fn set(&self, instance: &mut dyn Mappable, value: Bson) -> MappingResult<()> {
        let value = self.coerce(value)?;
        self.field.set(instance, value)
    }

    fn coerce(&self, value: Bson) -> MappingResult<Bson> {
        match value {
            Bson::Array(items) => Ok(Bson::Array(
                items
                    .into_iter()
                    .map(|item| coerce_element(self.element, item))
                    .collect::<MappingResult<Vec<_>>>()?,
            )),
            Bson::Null => Ok(Bson::Null),
            other => Err(MappingError::conversion("array", &other)),
        }
    }
}

fn coerce_element(element: ElementKind, value: Bson) -> MappingResult<Bson> {
    let coerced = match (&value, element) {
        (Bson::Null, _) | (_, ElementKind::Any) => Some(value.clone()),
        (Bson::Boolean(_), ElementKind::Bool) | (Bson::String(_), ElementKind::String) => {
            Some(value.clone())
        }
        (_, ElementKind::Int32) => integral(&value)
            .and_then(|v| i32::try_from(v).ok())
            .map(Bson::Int32),
        (_, ElementKind::Int64) => integral(&value).map(Bson::Int64),
        (_, ElementKind::Double) => floating(&value).map(Bson::Double),
        _ => None,
    };

    coerced.ok_or_else(|| MappingError::conversion(&format!("{element:?} element"), &value))
}

/// How a property value is read from and written to an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Field(FieldAccessor),
    Method(MethodAccessor),
    Array(ArrayAccessor),
}

impl Accessor {
    pub fn field(name: impl Into<String>, depth: usize) -> Self {
        Accessor::Field(FieldAccessor::new(name, depth))
    }

    pub fn method(getter: impl Into<String>, setter: impl Into<String>, depth: usize) -> Self {
        Accessor::Method(MethodAccessor::new(getter, setter, depth))
    }

    pub fn array(name: impl Into<String>, depth: usize, element: ElementKind) -> Self {
        Accessor::Array(ArrayAccessor::new(FieldAccessor::new(name, depth), element))
    }

    /// Reads the value from `instance`.
    ///
    /// # Errors
    ///
    /// Returns an error if the member or a parent link is missing, or the value cannot be
    /// converted.
    pub fn get(&self, instance: &dyn Mappable) -> MappingResult<Bson> {
        match self {
            Accessor::Field(accessor) => accessor.get(instance),
            Accessor::Method(accessor) => accessor.get(instance),
            Accessor::Array(accessor) => accessor.get(instance),
        }
    }

    /// Writes `value` into `instance`.
    ///
    /// # Errors
    ///
    /// Returns an error if the member or a parent link is missing, or the value cannot be
    /// converted.
    pub fn set(&self, instance: &mut dyn Mappable, value: Bson) -> MappingResult<()> {
        match self {
            Accessor::Field(accessor) => accessor.set(instance, value),
            Accessor::Method(accessor) => accessor.set(instance, value),
            Accessor::Array(accessor) => accessor.set(instance, value),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Accessor::Field(accessor) => accessor.depth,
            Accessor::Method(accessor) => accessor.depth,
            Accessor::Array(accessor) => accessor.field.depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::BsonValue;

    #[derive(Default)]
    struct Base {
        id: i32,
    }

    impl Mappable for Base {
        fn read_field(&self, field: &str) -> Option<MappingResult<Bson>> {
            match field {
                "id" => Some(self.id.to_bson()),
                _ => None,
            }
        }

        fn write_field(&mut self, field: &str, value: Bson) -> Option<MappingResult<()>> {
            match field {
                "id" => Some(i32::from_bson(value).map(|id| self.id = id)),
                _ => None,
            }
        }
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        scores: Vec<i64>,
        label: String,
    }

    impl Mappable for Derived {
        fn read_field(&self, field: &str) -> Option<MappingResult<Bson>> {
            match field {
                "scores" => Some(self.scores.to_bson()),
                _ => None,
            }
        }

        fn write_field(&mut self, field: &str, value: Bson) -> Option<MappingResult<()>> {
            match field {
                "scores" => Some(Vec::<i64>::from_bson(value).map(|scores| self.scores = scores)),
                _ => None,
            }
        }

        fn call_getter(&self, method: &str) -> Option<MappingResult<Bson>> {
            match method {
                "getLabel" => Some(self.label.to_bson()),
                _ => None,
            }
        }

        fn call_setter(&mut self, method: &str, value: Bson) -> Option<MappingResult<()>> {
            match method {
                "setLabel" => Some(String::from_bson(value).map(|label| self.label = label)),
                _ => None,
            }
        }

        fn parent(&self) -> Option<&dyn Mappable> {
            Some(&self.base)
        }

        fn parent_mut(&mut self) -> Option<&mut dyn Mappable> {
            Some(&mut self.base)
        }
    }

    #[test]
    fn test_field_accessor_walks_parents() {
        let mut instance = Derived::default();
        let accessor = Accessor::field("id", 1);

        accessor.set(&mut instance, Bson::Int32(42)).unwrap();

        assert_eq!(instance.base.id, 42);
        assert_eq!(accessor.get(&instance).unwrap(), Bson::Int32(42));
    }

    #[test]
    fn test_missing_members_are_errors() {
        let instance = Derived::default();

        assert!(matches!(
            Accessor::field("missing", 0).get(&instance),
            Err(MappingError::NotFound(_))
        ));
        assert!(matches!(
            Accessor::field("id", 2).get(&instance),
            Err(MappingError::NotFound(_))
        ));
        assert!(Accessor::method("getOther", "setOther", 0).get(&instance).is_err());
    }

    #[test]
    fn test_method_accessor_invokes_pair() {
        let mut instance = Derived::default();
        let accessor = Accessor::method("getLabel", "setLabel", 0);

        accessor
            .set(&mut instance, Bson::String("lead".to_string()))
            .unwrap();

        assert_eq!(instance.label, "lead");
        assert_eq!(accessor.get(&instance).unwrap(), Bson::String("lead".to_string()));
    }

    #[test]
    fn test_array_accessor_coerces_elements() {
        let mut instance = Derived::default();
        let accessor = Accessor::array("scores", 0, ElementKind::Int64);

        accessor
            .set(
                &mut instance,
                Bson::Array(vec![Bson::Int32(1), Bson::Double(2.0), Bson::Int64(3)]),
            )
            .unwrap();
        assert_eq!(instance.scores, vec![1, 2, 3]);

        let rejected = accessor.set(&mut instance, Bson::Array(vec![Bson::Double(2.5)]));
        assert!(matches!(rejected, Err(MappingError::Conversion(_))));

        let not_an_array = accessor.set(&mut instance, Bson::Int32(1));
        assert!(matches!(not_an_array, Err(MappingError::Conversion(_))));
    }
}
