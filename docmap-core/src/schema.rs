//! Declarative type registration.
//!
//! A [`SchemaBuilder`] collects [`TypeDef`] declarations and freezes them into a
//! [`TypeArena`]. Declarations refer to other types by name, using the textual
//! [`TypeExpr`] syntax (`List<Address>`, `[i32]`, `Map<String, T>`).
//!
//! # Example
//!
//! ```ignore
//! use docmap::schema::{SchemaBuilder, TypeDef, FieldDef};
//! use docmap::metadata::{Annotation, EntityAnnotation};
//!
//! let mut schema = SchemaBuilder::new();
//! schema
//!     .define(
//!         TypeDef::class("Person")
//!             .annotate(Annotation::Entity(EntityAnnotation::new()))
//!             .field(FieldDef::new("id", "i32").annotate(Annotation::Id))
//!             .field(FieldDef::new("name", "String")),
//!     )
//!     .define(
//!         TypeDef::class("Employee")
//!             .extends("Person")
//!             .field(FieldDef::new("dept", "String")),
//!     );
//!
//! let arena = schema.build()?;
//! ```

use std::collections::{HashMap, HashSet};

use crate::entity::Describe;
use crate::error::{MappingError, MappingResult};
use crate::metadata::{Annotation, Metadata};
use crate::types::{GenericType, MethodShape, NodeContent, TypeArena, TypeExpr, TypeKey, TypeKind, TypeParam};

/// The kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefKind {
    Class,
    Interface,
    Enum,
}

/// A field declaration.
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    ty: String,
    metadata: Metadata,
}

impl FieldDef {
    /// Declares a field named `name` of the type expression `ty`.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.metadata.push(annotation);
        self
    }
}

/// A method declaration.
#[derive(Debug, Clone)]
pub struct MethodDef {
    name: String,
    shape: MethodShape,
    ty: Option<String>,
    metadata: Metadata,
}

impl MethodDef {
    /// Declares a no-argument method returning `returns`.
    pub fn getter(name: impl Into<String>, returns: impl Into<String>) -> Self {
        Self::with_shape(name, MethodShape::Getter, Some(returns.into()))
    }

    /// Declares a one-argument method taking `param`.
    pub fn setter(name: impl Into<String>, param: impl Into<String>) -> Self {
        Self::with_shape(name, MethodShape::Setter, Some(param.into()))
    }

    /// Declares a method of any other shape.
    pub fn other(name: impl Into<String>) -> Self {
        Self::with_shape(name, MethodShape::Other, None)
    }

    fn with_shape(name: impl Into<String>, shape: MethodShape, ty: Option<String>) -> Self {
        Self {
            name: name.into(),
            shape,
            ty,
            metadata: Metadata::new(),
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.metadata.push(annotation);
        self
    }
}

/// The declaration of one class, interface or enum.
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: String,
    kind: TypeDefKind,
    type_params: Vec<(String, Option<String>)>,
    superclass: Option<String>,
    interfaces: Vec<String>,
    metadata: Metadata,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    constructor: Option<Vec<String>>,
}

impl TypeDef {
    fn new(name: impl Into<String>, kind: TypeDefKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            metadata: Metadata::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructor: None,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeDefKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeDefKind::Interface)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, TypeDefKind::Enum)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeDefKind {
        self.kind
    }

    /// Declares an unbounded type parameter.
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push((name.into(), None));
        self
    }

    /// Declares a type parameter whose erasure is `bound`.
    pub fn bounded_type_param(mut self, name: impl Into<String>, bound: impl Into<String>) -> Self {
        self.type_params.push((name.into(), Some(bound.into())));
        self
    }

    /// Sets the generic superclass, e.g. `Base<String>`.
    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.metadata.push(annotation);
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Declares the parameter names of the full constructor.
    pub fn constructor<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constructor = Some(parameters.into_iter().map(Into::into).collect());
        self
    }
}

/// Collects type declarations and freezes them into a [`TypeArena`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    defs: Vec<TypeDef>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration. Defining the same name twice fails at [`SchemaBuilder::build`].
    pub fn define(&mut self, def: TypeDef) -> &mut Self {
        if self.index.contains_key(&def.name) {
            self.duplicates.push(def.name.clone());
        } else {
            self.index.insert(def.name.clone(), self.defs.len());
            self.defs.push(def);
        }
        self
    }

    /// Registers a described type and, through its description, the types it extends.
    ///
    /// Registering a type that is already defined does nothing.
    pub fn register<T: Describe>(&mut self) -> &mut Self {
        if !self.contains(T::type_name()) {
            T::describe(self);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Resolves every declaration and checks the resulting hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidSchema`] if a name is defined twice or shadows a
    /// built-in type, a type expression is malformed, a superclass is not a class, an
    /// implemented type is not an interface, a generic reference has the wrong number of
    /// arguments, or the superclass chain is cyclic.
    pub fn build(self) -> MappingResult<TypeArena> {
        if let Some(name) = self.duplicates.first() {
            return Err(MappingError::InvalidSchema(format!(
                "type {name} is defined more than once"
            )));
        }

        let mut arena = TypeArena::with_builtins();
        let mut keys = Vec::with_capacity(self.defs.len());

        for def in &self.defs {
            if arena.lookup(&def.name).is_some() {
                return Err(MappingError::InvalidSchema(format!(
                    "type {} shadows a built-in type",
                    def.name
                )));
            }
            let kind = match def.kind {
                TypeDefKind::Class => TypeKind::Class,
                TypeDefKind::Interface => TypeKind::Interface,
                TypeDefKind::Enum => TypeKind::Enum,
            };
            keys.push(arena.insert(&def.name, kind));
        }

        for (def, key) in self.defs.into_iter().zip(keys.iter().copied()) {
            let content = resolve_def(&mut arena, def)?;
            arena.fill(key, content);
        }

        for key in keys {
            check_node(&arena, key)?;
        }

        log::debug!("built type arena with {} types", arena.len());

        Ok(arena)
    }
}

fn resolve_source(arena: &mut TypeArena, scope: &[TypeParam], source: &str) -> MappingResult<GenericType> {
    let expr = TypeExpr::parse(source)?;
    arena.resolve(scope, &expr)
}

fn resolve_def(arena: &mut TypeArena, def: TypeDef) -> MappingResult<NodeContent> {
    let mut scope: Vec<TypeParam> = def
        .type_params
        .iter()
        .map(|(name, _)| TypeArena::type_param(name.clone(), None))
        .collect();

    for (index, (name, bound)) in def.type_params.iter().enumerate() {
        if let Some(bound) = bound {
            let resolved = resolve_source(arena, &scope, bound)?;
            if resolved.is_variable() {
                return Err(MappingError::InvalidSchema(format!(
                    "type parameter {name} of {} is bounded by a bare type variable",
                    def.name
                )));
            }
            scope[index] = TypeArena::type_param(name.clone(), Some(resolved));
        }
    }

    let superclass = def
        .superclass
        .as_deref()
        .map(|source| resolve_source(arena, &scope, source))
        .transpose()?;
    let interfaces = def
        .interfaces
        .iter()
        .map(|source| resolve_source(arena, &scope, source))
        .collect::<MappingResult<Vec<_>>>()?;
    let fields = def
        .fields
        .into_iter()
        .map(|field| {
            resolve_source(arena, &scope, &field.ty).map(|declared| (field.name, declared, field.metadata))
        })
        .collect::<MappingResult<Vec<_>>>()?;
    let methods = def
        .methods
        .into_iter()
        .map(|method| -> MappingResult<_> {
            let declared = method
                .ty
                .as_deref()
                .map(|source| resolve_source(arena, &scope, source))
                .transpose()?;
            Ok((method.name, method.shape, declared, method.metadata))
        })
        .collect::<MappingResult<Vec<_>>>()?;

    Ok(NodeContent {
        type_params: scope,
        superclass,
        interfaces,
        metadata: def.metadata,
        fields,
        methods,
        constructor: def.constructor,
    })
}

fn check_node(arena: &TypeArena, key: TypeKey) -> MappingResult<()> {
    let node = arena.get(key)?;
    let invalid = |message: String| MappingError::InvalidSchema(format!("{}: {message}", node.name()));

    if let Some(superclass) = node.superclass() {
        let GenericType::Class { base, .. } = superclass else {
            return Err(invalid("the superclass must be a named class".to_string()));
        };
        if node.is_interface() {
            return Err(invalid("interfaces cannot extend a class".to_string()));
        }
        if arena.kind(*base) != Some(TypeKind::Class) {
            return Err(invalid(format!("superclass {} is not a class", arena.name(*base))));
        }
        check_arity(arena, superclass).map_err(invalid)?;
    }

    for interface in node.interfaces() {
        match interface {
            GenericType::Class { base, .. } if arena.kind(*base) == Some(TypeKind::Interface) => {
                check_arity(arena, interface).map_err(invalid)?;
            }
            _ => return Err(invalid(format!("{interface:?} is not an interface"))),
        }
    }

    for field in node.fields() {
        check_arity(arena, field.declared_type())
            .map_err(|message| invalid(format!("field {}: {message}", field.name())))?;
    }

    let mut visited = HashSet::from([key]);
    let mut current = node.superclass_key();
    while let Some(ancestor) = current {
        if !visited.insert(ancestor) {
            return Err(invalid(format!(
                "cyclic superclass chain through {}",
                arena.name(ancestor)
            )));
        }
        current = arena.get(ancestor)?.superclass_key();
    }

    Ok(())
}

fn check_arity(arena: &TypeArena, generic: &GenericType) -> Result<(), String> {
    match generic {
        GenericType::Class { base, args } => {
            let expected = arena.get(*base).map(|node| node.type_params().len()).unwrap_or(0);
            let opaque = arena.kind(*base) == Some(TypeKind::Opaque);
            if !args.is_empty() && !opaque && args.len() != expected {
                return Err(format!(
                    "{} expects {expected} type arguments, found {}",
                    arena.name(*base),
                    args.len()
                ));
            }
            args.iter().try_for_each(|arg| check_arity(arena, arg))
        }
        GenericType::Array { component, .. } => check_arity(arena, component),
        GenericType::Variable(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(defs: Vec<TypeDef>) -> MappingResult<TypeArena> {
        let mut schema = SchemaBuilder::new();
        for def in defs {
            schema.define(def);
        }
        schema.build()
    }

    #[test]
    fn test_build_resolves_hierarchy() {
        let arena = build(vec![
            TypeDef::class("Base").type_param("T").field(FieldDef::new("value", "T")),
            TypeDef::class("Child").extends("Base<String>"),
        ])
        .unwrap();

        let base = arena.lookup("Base").unwrap();
        let child = arena.get(arena.lookup("Child").unwrap()).unwrap();

        assert_eq!(
            child.superclass(),
            Some(&GenericType::Class {
                base,
                args: vec![GenericType::class(TypeKey::STRING)],
            })
        );
        assert_eq!(
            arena.get(base).unwrap().fields()[0].declared_type(),
            &GenericType::Variable("T".to_string())
        );
    }

    #[test]
    fn test_build_rejects_duplicates_and_builtins() {
        assert!(matches!(
            build(vec![TypeDef::class("A"), TypeDef::class("A")]),
            Err(MappingError::InvalidSchema(_))
        ));
        assert!(matches!(
            build(vec![TypeDef::class("String")]),
            Err(MappingError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_build_rejects_invalid_hierarchies() {
        let cases = vec![
            vec![TypeDef::interface("Named"), TypeDef::class("A").extends("Named")],
            vec![TypeDef::class("A"), TypeDef::class("B").implements("A")],
            vec![TypeDef::class("A").extends("B"), TypeDef::class("B").extends("A")],
            vec![TypeDef::class("A").extends("Missing")],
            vec![TypeDef::class("A").type_param("T"), TypeDef::class("B").extends("A<i32, i64>")],
            vec![TypeDef::class("A").field(FieldDef::new("values", "List<String, String>"))],
            vec![TypeDef::class("A").field(FieldDef::new("broken", "List<"))],
        ];

        for defs in cases {
            let names: Vec<String> = defs.iter().map(|def| def.name().to_string()).collect();
            assert!(
                matches!(build(defs), Err(MappingError::InvalidSchema(_))),
                "accepted {names:?}"
            );
        }
    }

    #[test]
    fn test_bounded_parameters_erase_to_bound() {
        let arena = build(vec![
            TypeDef::class("Shape"),
            TypeDef::class("Canvas")
                .bounded_type_param("S", "Shape")
                .field(FieldDef::new("shapes", "[S]")),
        ])
        .unwrap();

        let shape = arena.lookup("Shape").unwrap();
        let canvas = arena.lookup("Canvas").unwrap();
        let field = &arena.get(canvas).unwrap().fields()[0];

        assert_eq!(
            arena.component_of(arena.erasure(canvas, field.declared_type())),
            Some(shape)
        );
        assert_eq!(
            arena.erasure(canvas, &GenericType::Variable("S".to_string())),
            shape
        );
    }
}
