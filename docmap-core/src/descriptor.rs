//! Structural descriptions of (possibly generic) type instantiations.

use std::fmt;

use crate::types::{GenericType, TypeArena, TypeKey};

/// A base type and its ordered type arguments, e.g. `Map<String, List<Int32>>`.
///
/// Primitive base types are replaced by their boxed scalar on construction, so `i32` and
/// `Int32` describe the same type. Equality and hashing are structural.
///
/// # Example
///
/// ```ignore
/// use docmap::descriptor::TypeDescriptor;
/// use docmap::types::TypeKey;
///
/// let list = TypeDescriptor::build(&arena, TypeKey::LIST, vec![
///     TypeDescriptor::build(&arena, TypeKey::STRING, vec![]),
/// ]);
/// assert_eq!(list.display(&arena).to_string(), "List<String>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    base: TypeKey,
    parameters: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Creates a descriptor, boxing a primitive base type.
    pub fn build(arena: &TypeArena, base: TypeKey, parameters: Vec<TypeDescriptor>) -> Self {
        Self {
            base: arena.boxed(base),
            parameters,
        }
    }

    /// Creates the descriptor of a type as declared on `owner`.
    ///
    /// Type variables and arrays are erased; type arguments are described recursively.
    pub fn of(arena: &TypeArena, owner: TypeKey, generic: &GenericType) -> Self {
        match generic {
            GenericType::Class { base, args } => Self::build(
                arena,
                *base,
                args.iter().map(|arg| Self::of(arena, owner, arg)).collect(),
            ),
            other => Self::build(arena, arena.erasure(owner, other), Vec::new()),
        }
    }

    /// Returns a descriptor with the same parameters and a different base type.
    pub fn with_base_type(&self, arena: &TypeArena, base: TypeKey) -> Self {
        Self::build(arena, base, self.parameters.clone())
    }

    pub fn base_type(&self) -> TypeKey {
        self.base
    }

    pub fn parameters(&self) -> &[TypeDescriptor] {
        &self.parameters
    }

    /// Returns a value rendering this descriptor with type names from `arena`.
    pub fn display<'a>(&'a self, arena: &'a TypeArena) -> DisplayDescriptor<'a> {
        DisplayDescriptor {
            descriptor: self,
            arena,
        }
    }
}

/// Renders a [`TypeDescriptor`]. Created by [`TypeDescriptor::display`].
pub struct DisplayDescriptor<'a> {
    descriptor: &'a TypeDescriptor,
    arena: &'a TypeArena,
}

impl fmt::Display for DisplayDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.arena.name(self.descriptor.base))?;
        if !self.descriptor.parameters.is_empty() {
            write!(f, "<")?;
            for (index, parameter) in self.descriptor.parameters.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", parameter.display(self.arena))?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, SchemaBuilder, TypeDef};

    fn arena() -> TypeArena {
        let mut schema = SchemaBuilder::new();
        schema.define(
            TypeDef::class("Box")
                .type_param("T")
                .field(FieldDef::new("items", "Map<String, List<T>>"))
                .field(FieldDef::new("raw", "[T]")),
        );
        schema.build().unwrap()
    }

    #[test]
    fn test_primitives_are_boxed_for_equality() {
        let arena = arena();
        let int = arena.lookup("i32").unwrap();

        let primitive = TypeDescriptor::build(&arena, int, Vec::new());
        let boxed = TypeDescriptor::build(&arena, TypeKey::INT32, Vec::new());

        assert_eq!(primitive, boxed);
        assert_eq!(primitive.base_type(), TypeKey::INT32);
    }

    #[test]
    fn test_parameters_take_part_in_equality() {
        let arena = arena();
        let strings = TypeDescriptor::build(
            &arena,
            TypeKey::LIST,
            vec![TypeDescriptor::build(&arena, TypeKey::STRING, Vec::new())],
        );
        let ints = TypeDescriptor::build(
            &arena,
            TypeKey::LIST,
            vec![TypeDescriptor::build(&arena, TypeKey::INT32, Vec::new())],
        );

        assert_ne!(strings, ints);
        assert_eq!(strings.with_base_type(&arena, TypeKey::SET).parameters(), strings.parameters());
        assert_eq!(strings.with_base_type(&arena, TypeKey::SET).base_type(), TypeKey::SET);
    }

    #[test]
    fn test_declared_types_erase_variables() {
        let arena = arena();
        let owner = arena.lookup("Box").unwrap();
        let node = arena.get(owner).unwrap();

        let items = TypeDescriptor::of(&arena, owner, node.fields()[0].declared_type());
        assert_eq!(items.display(&arena).to_string(), "Map<String, List<Object>>");

        let raw = TypeDescriptor::of(&arena, owner, node.fields()[1].declared_type());
        assert_eq!(raw.display(&arena).to_string(), "[Object]");
    }
}
