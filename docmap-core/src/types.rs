//! The type arena: an explicit description of the type hierarchy that entity models are built from.
//!
//! Instead of inspecting live types, every mappable type is registered once through a
//! [`SchemaBuilder`](crate::schema::SchemaBuilder), which freezes into a [`TypeArena`]. The arena
//! holds one [`TypeNode`] per type, addressed by a copyable [`TypeKey`]:
//!
//! - **Built-in types** - the universal root `Object`, primitives (`i32`, `bool`, ...) and their
//!   boxed scalars (`Int32`, `Boolean`, ...), `String`, `ObjectId`, `Uuid`, `DateTime`,
//!   `Document` and the generic containers `List<E>`, `Set<E>` and `Map<K, V>`
//! - **Declared types** - classes, interfaces and enums with type parameters, a generic
//!   superclass, interfaces, fields, methods and metadata
//! - **Array types** - interned on demand, named `[Component]`
//! - **Opaque types** - names referenced by declarations but never declared; never mappable

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{MappingError, MappingResult};
use crate::metadata::Metadata;

/// Identifies a type node within a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(u32);

impl TypeKey {
    pub const OBJECT: TypeKey = TypeKey(0);
    pub const BOOLEAN: TypeKey = TypeKey(1);
    pub const BYTE: TypeKey = TypeKey(2);
    pub const INT16: TypeKey = TypeKey(3);
    pub const INT32: TypeKey = TypeKey(4);
    pub const INT64: TypeKey = TypeKey(5);
    pub const FLOAT: TypeKey = TypeKey(6);
    pub const DOUBLE: TypeKey = TypeKey(7);
    pub const CHAR: TypeKey = TypeKey(8);
    pub const STRING: TypeKey = TypeKey(17);
    pub const OBJECT_ID: TypeKey = TypeKey(18);
    pub const UUID: TypeKey = TypeKey(19);
    pub const DATE_TIME: TypeKey = TypeKey(20);
    pub const DOCUMENT: TypeKey = TypeKey(21);
    pub const LIST: TypeKey = TypeKey(22);
    pub const SET: TypeKey = TypeKey(23);
    pub const MAP: TypeKey = TypeKey(24);

    fn from_index(index: usize) -> Self {
        TypeKey(index as u32)
    }

    /// Returns the position of this key within its arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Primitive type names paired with the boxed scalar they normalize to.
const PRIMITIVES: [(&str, &str); 8] = [
    ("bool", "Boolean"),
    ("u8", "Byte"),
    ("i16", "Int16"),
    ("i32", "Int32"),
    ("i64", "Int64"),
    ("f32", "Float"),
    ("f64", "Double"),
    ("char", "Char"),
];

const SCALARS: [&str; 5] = ["String", "ObjectId", "Uuid", "DateTime", "Document"];

const CONTAINERS: [(&str, &[&str]); 3] = [("List", &["E"]), ("Set", &["E"]), ("Map", &["K", "V"])];

/// The kind of a type node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    /// An unboxed primitive and the scalar it boxes to.
    Primitive { boxed: TypeKey },
    /// A built-in value type stored as a single BSON value.
    Scalar,
    /// A built-in generic collection (`List`, `Set`, `Map`).
    Container,
    /// An array of `component`.
    Array { component: TypeKey },
    /// A referenced but undeclared type.
    Opaque,
}

/// The BSON representation targeted when coercing array elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Bool,
    Int32,
    Int64,
    Double,
    String,
    Any,
}

/// An unresolved, name-based type expression as written in a declaration.
///
/// The textual form accepts generic arguments and arrays:
///
/// ```ignore
/// use docmap::types::TypeExpr;
///
/// let expr: TypeExpr = "Map<String, List<[i32]>>".parse()?;
/// assert_eq!(expr.to_string(), "Map<String, List<[i32]>>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Named { name: String, args: Vec<TypeExpr> },
    Array(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            args,
        }
    }

    pub fn array(component: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(component))
    }

    /// Parses a type expression such as `List<String>` or `[i64]`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidSchema`] if the source is not a well-formed expression.
    pub fn parse(source: &str) -> MappingResult<Self> {
        let tokens = tokenize(source)?;
        let mut parser = ExprParser {
            source,
            tokens,
            position: 0,
        };
        let expr = parser.parse_type()?;

        if parser.position != parser.tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }

        Ok(expr)
    }
}

impl FromStr for TypeExpr {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeExpr::parse(s)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, args } if args.is_empty() => write!(f, "{name}"),
            TypeExpr::Named { name, args } => {
                write!(f, "{name}<")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            TypeExpr::Array(component) => write!(f, "[{component}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Open,
    Close,
    Comma,
    OpenBracket,
    CloseBracket,
}

fn tokenize(source: &str) -> MappingResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '<' => tokens.push(Token::Open),
            '>' => tokens.push(Token::Close),
            ',' => tokens.push(Token::Comma),
            '[' => tokens.push(Token::OpenBracket),
            ']' => tokens.push(Token::CloseBracket),
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !(next.is_alphanumeric() || next == '_') {
                        break;
                    }
                    ident.push(next);
                    chars.next();
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(MappingError::InvalidSchema(format!(
                    "unexpected character '{other}' in type expression '{source}'"
                )));
            }
        }
    }

    Ok(tokens)
}

struct ExprParser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl ExprParser<'_> {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn expect(&mut self, expected: Token) -> MappingResult<()> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            _ => Err(self.error(&format!("expected {expected:?}"))),
        }
    }

    fn error(&self, message: &str) -> MappingError {
        MappingError::InvalidSchema(format!("{message} in type expression '{}'", self.source))
    }

    fn parse_type(&mut self) -> MappingResult<TypeExpr> {
        match self.next() {
            Some(Token::OpenBracket) => {
                let component = self.parse_type()?;
                self.expect(Token::CloseBracket)?;
                Ok(TypeExpr::array(component))
            }
            Some(Token::Ident(name)) => {
                let mut args = Vec::new();
                if self.peek() == Some(&Token::Open) {
                    self.position += 1;
                    loop {
                        args.push(self.parse_type()?);
                        match self.next() {
                            Some(Token::Comma) => continue,
                            Some(Token::Close) => break,
                            _ => return Err(self.error("expected ',' or '>'")),
                        }
                    }
                }
                Ok(TypeExpr::Named { name, args })
            }
            _ => Err(self.error("expected a type name or '['")),
        }
    }
}

/// A declared type resolved against the arena.
///
/// Names listed among the owning type's parameters resolve to [`GenericType::Variable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericType {
    /// A concrete type with (possibly empty) type arguments.
    Class { base: TypeKey, args: Vec<GenericType> },
    /// A type variable of the owning type.
    Variable(String),
    /// An array. `erased` is the interned array type of the erased component.
    Array {
        component: Box<GenericType>,
        erased: TypeKey,
    },
}

impl GenericType {
    /// A non-generic reference to `base`.
    pub fn class(base: TypeKey) -> Self {
        GenericType::Class {
            base,
            args: Vec::new(),
        }
    }

    pub fn variable_name(&self) -> Option<&str> {
        match self {
            GenericType::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, GenericType::Variable(_))
    }
}

/// A type parameter and its optional upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    name: String,
    bound: Option<GenericType>,
}

impl TypeParam {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bound(&self) -> Option<&GenericType> {
        self.bound.as_ref()
    }
}

/// A field declared directly on a type.
#[derive(Debug, Clone)]
pub struct DeclaredField {
    name: String,
    declared: GenericType,
    metadata: Metadata,
}

impl DeclaredField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &GenericType {
        &self.declared
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// The call shape of a declared method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodShape {
    /// Takes no argument and returns a value.
    Getter,
    /// Takes exactly one argument.
    Setter,
    Other,
}

/// A method declared directly on a type.
#[derive(Debug, Clone)]
pub struct DeclaredMethod {
    name: String,
    shape: MethodShape,
    declared: Option<GenericType>,
    metadata: Metadata,
}

impl DeclaredMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> MethodShape {
        self.shape
    }

    /// The return type of a getter or the parameter type of a setter.
    pub fn declared_type(&self) -> Option<&GenericType> {
        self.declared.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// One type of the arena.
#[derive(Debug, Clone)]
pub struct TypeNode {
    key: TypeKey,
    name: String,
    kind: TypeKind,
    type_params: Vec<TypeParam>,
    superclass: Option<GenericType>,
    interfaces: Vec<GenericType>,
    metadata: Metadata,
    fields: Vec<DeclaredField>,
    methods: Vec<DeclaredMethod>,
    constructor: Option<Vec<String>>,
}

impl TypeNode {
    fn new(key: TypeKey, name: String, kind: TypeKind) -> Self {
        Self {
            key,
            name,
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

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn type_params(&self) -> &[TypeParam] {
        &self.type_params
    }

    /// The generic superclass reference, as declared.
    pub fn superclass(&self) -> Option<&GenericType> {
        self.superclass.as_ref()
    }

    /// The erased superclass.
    pub fn superclass_key(&self) -> Option<TypeKey> {
        match &self.superclass {
            Some(GenericType::Class { base, .. }) => Some(*base),
            _ => None,
        }
    }

    pub fn interfaces(&self) -> &[GenericType] {
        &self.interfaces
    }

    pub fn interface_keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.interfaces.iter().filter_map(|interface| match interface {
            GenericType::Class { base, .. } => Some(*base),
            _ => None,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn fields(&self) -> &[DeclaredField] {
        &self.fields
    }

    pub fn methods(&self) -> &[DeclaredMethod] {
        &self.methods
    }

    /// Parameter names of the full constructor, if one was declared.
    pub fn constructor(&self) -> Option<&[String]> {
        self.constructor.as_deref()
    }
}

/// Everything a declared type carries apart from its name and kind.
pub(crate) struct NodeContent {
    pub(crate) type_params: Vec<TypeParam>,
    pub(crate) superclass: Option<GenericType>,
    pub(crate) interfaces: Vec<GenericType>,
    pub(crate) metadata: Metadata,
    pub(crate) fields: Vec<(String, GenericType, Metadata)>,
    pub(crate) methods: Vec<(String, MethodShape, Option<GenericType>, Metadata)>,
    pub(crate) constructor: Option<Vec<String>>,
}

/// A frozen collection of type nodes.
///
/// Created by [`SchemaBuilder::build`](crate::schema::SchemaBuilder::build) and owned by a
/// [`Mapper`](crate::mapper::Mapper).
#[derive(Debug, Clone)]
pub struct TypeArena {
    nodes: Vec<TypeNode>,
    names: HashMap<String, TypeKey>,
    arrays: HashMap<TypeKey, TypeKey>,
}

impl TypeArena {
    /// Creates an arena holding only the built-in types.
    pub(crate) fn with_builtins() -> Self {
        let mut arena = Self {
            nodes: Vec::new(),
            names: HashMap::new(),
            arrays: HashMap::new(),
        };

        arena.insert("Object", TypeKind::Class);
        for (_, boxed) in PRIMITIVES {
            arena.insert(boxed, TypeKind::Scalar);
        }
        for (index, (primitive, _)) in PRIMITIVES.iter().enumerate() {
            let boxed = TypeKey::from_index(TypeKey::BOOLEAN.index() + index);
            arena.insert(primitive, TypeKind::Primitive { boxed });
        }
        for scalar in SCALARS {
            arena.insert(scalar, TypeKind::Scalar);
        }
        for (container, params) in CONTAINERS {
            let key = arena.insert(container, TypeKind::Container);
            arena.nodes[key.index()].type_params = params
                .iter()
                .map(|name| TypeParam {
                    name: name.to_string(),
                    bound: None,
                })
                .collect();
        }

        arena
    }

    pub(crate) fn insert(&mut self, name: &str, kind: TypeKind) -> TypeKey {
        let key = TypeKey::from_index(self.nodes.len());
        self.nodes.push(TypeNode::new(key, name.to_string(), kind));
        self.names.insert(name.to_string(), key);
        key
    }

    pub(crate) fn fill(&mut self, key: TypeKey, content: NodeContent) {
        let node = &mut self.nodes[key.index()];
        node.type_params = content.type_params;
        node.superclass = content.superclass;
        node.interfaces = content.interfaces;
        node.metadata = content.metadata;
        node.fields = content
            .fields
            .into_iter()
            .map(|(name, declared, metadata)| DeclaredField {
                name,
                declared,
                metadata,
            })
            .collect();
        node.methods = content
            .methods
            .into_iter()
            .map(|(name, shape, declared, metadata)| DeclaredMethod {
                name,
                shape,
                declared,
                metadata,
            })
            .collect();
        node.constructor = content.constructor;
    }

    /// Returns the array type of `component`, interning it if needed.
    pub(crate) fn intern_array(&mut self, component: TypeKey) -> TypeKey {
        if let Some(key) = self.arrays.get(&component) {
            return *key;
        }

        let name = format!("[{}]", self.name(component));
        let key = self.insert(&name, TypeKind::Array { component });
        self.arrays.insert(component, key);
        key
    }

    /// Resolves a type expression in the scope of the given type parameters.
    pub(crate) fn resolve(&mut self, scope: &[TypeParam], expr: &TypeExpr) -> MappingResult<GenericType> {
        match expr {
            TypeExpr::Named { name, args } if scope.iter().any(|param| &param.name == name) => {
                if !args.is_empty() {
                    return Err(MappingError::InvalidSchema(format!(
                        "type variable {name} cannot take type arguments"
                    )));
                }
                Ok(GenericType::Variable(name.clone()))
            }
            TypeExpr::Named { name, args } => {
                let base = match self.lookup(name) {
                    Some(key) => key,
                    None => {
                        log::debug!("registering opaque type {name}");
                        self.insert(name, TypeKind::Opaque)
                    }
                };
                let args = args
                    .iter()
                    .map(|arg| self.resolve(scope, arg))
                    .collect::<MappingResult<Vec<_>>>()?;
                Ok(GenericType::Class { base, args })
            }
            TypeExpr::Array(component) => {
                let component = self.resolve(scope, component)?;
                let erased_component = erase_in(scope, &component, self);
                let erased = self.intern_array(erased_component);
                Ok(GenericType::Array {
                    component: Box::new(component),
                    erased,
                })
            }
        }
    }

    pub(crate) fn type_param(name: String, bound: Option<GenericType>) -> TypeParam {
        TypeParam { name, bound }
    }

    /// Returns the node for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotFound`] if the key does not belong to this arena.
    pub fn get(&self, key: TypeKey) -> MappingResult<&TypeNode> {
        self.nodes
            .get(key.index())
            .ok_or_else(|| MappingError::NotFound(format!("type {key}")))
    }

    pub fn lookup(&self, name: &str) -> Option<TypeKey> {
        self.names.get(name).copied()
    }

    /// Returns the name of `key`, or `"?"` for a foreign key.
    pub fn name(&self, key: TypeKey) -> &str {
        self.nodes
            .get(key.index())
            .map(|node| node.name.as_str())
            .unwrap_or("?")
    }

    pub fn kind(&self, key: TypeKey) -> Option<TypeKind> {
        self.nodes.get(key.index()).map(|node| node.kind)
    }

    /// Returns the boxed scalar of a primitive, or `key` itself.
    pub fn boxed(&self, key: TypeKey) -> TypeKey {
        match self.kind(key) {
            Some(TypeKind::Primitive { boxed }) => boxed,
            _ => key,
        }
    }

    /// Returns the interned array type of `component`, if one exists.
    pub fn array_of(&self, component: TypeKey) -> Option<TypeKey> {
        self.arrays.get(&component).copied()
    }

    /// Returns the component type of an array type.
    pub fn component_of(&self, key: TypeKey) -> Option<TypeKey> {
        match self.kind(key) {
            Some(TypeKind::Array { component }) => Some(component),
            _ => None,
        }
    }

    /// Returns the BSON representation array elements of type `key` are coerced to.
    pub fn element_kind(&self, key: TypeKey) -> ElementKind {
        match self.boxed(key) {
            TypeKey::BOOLEAN => ElementKind::Bool,
            TypeKey::BYTE | TypeKey::INT16 | TypeKey::INT32 => ElementKind::Int32,
            TypeKey::INT64 => ElementKind::Int64,
            TypeKey::FLOAT | TypeKey::DOUBLE => ElementKind::Double,
            TypeKey::STRING | TypeKey::CHAR => ElementKind::String,
            _ => ElementKind::Any,
        }
    }

    /// Returns the erased type of `generic` as declared on `owner`.
    ///
    /// Type variables erase to their bound, or to `Object` when unbounded.
    pub fn erasure(&self, owner: TypeKey, generic: &GenericType) -> TypeKey {
        let scope = self
            .nodes
            .get(owner.index())
            .map(|node| node.type_params.as_slice())
            .unwrap_or(&[]);
        erase_in(scope, generic, self)
    }

    /// Returns `true` if entity models can be built for `key`.
    pub fn is_mappable(&self, key: TypeKey) -> bool {
        key != TypeKey::OBJECT
            && matches!(self.kind(key), Some(TypeKind::Class | TypeKind::Interface))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeNode> {
        self.nodes.iter()
    }
}

fn erase_in(scope: &[TypeParam], generic: &GenericType, arena: &TypeArena) -> TypeKey {
    match generic {
        GenericType::Class { base, .. } => *base,
        GenericType::Array { erased, .. } => *erased,
        GenericType::Variable(name) => scope
            .iter()
            .find(|param| &param.name == name)
            .and_then(|param| param.bound.as_ref())
            .map(|bound| erase_in(scope, bound, arena))
            .unwrap_or(TypeKey::OBJECT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys_match_names() {
        let arena = TypeArena::with_builtins();

        assert_eq!(arena.name(TypeKey::OBJECT), "Object");
        assert_eq!(arena.name(TypeKey::CHAR), "Char");
        assert_eq!(arena.name(TypeKey::STRING), "String");
        assert_eq!(arena.name(TypeKey::DOCUMENT), "Document");
        assert_eq!(arena.name(TypeKey::MAP), "Map");
        assert_eq!(arena.lookup("i64").map(|key| arena.boxed(key)), Some(TypeKey::INT64));
        assert_eq!(arena.get(TypeKey::MAP).map(|node| node.type_params().len()).ok(), Some(2));
    }

    #[test]
    fn test_parse_nested_expression() {
        let expr = TypeExpr::parse("Map<String, List<[i32]>>").unwrap();

        assert_eq!(
            expr,
            TypeExpr::generic(
                "Map",
                vec![
                    TypeExpr::named("String"),
                    TypeExpr::generic("List", vec![TypeExpr::array(TypeExpr::named("i32"))]),
                ]
            )
        );
        assert_eq!(expr.to_string(), "Map<String, List<[i32]>>");
    }

    #[test]
    fn test_parse_rejects_malformed_expressions() {
        for source in ["", "List<", "List<>", "[i32", "Map<String,>", "a b", "List<String>>", "Vec<&str>"] {
            assert!(
                matches!(TypeExpr::parse(source), Err(MappingError::InvalidSchema(_))),
                "accepted {source:?}"
            );
        }
    }

    #[test]
    fn test_resolve_variables_and_opaque_names() {
        let mut arena = TypeArena::with_builtins();
        let scope = vec![TypeArena::type_param("T".to_string(), None)];

        let resolved = arena
            .resolve(&scope, &TypeExpr::parse("List<T>").unwrap())
            .unwrap();
        assert_eq!(
            resolved,
            GenericType::Class {
                base: TypeKey::LIST,
                args: vec![GenericType::Variable("T".to_string())],
            }
        );

        let opaque = arena
            .resolve(&scope, &TypeExpr::named("Money"))
            .unwrap();
        let key = arena.lookup("Money").unwrap();
        assert_eq!(opaque, GenericType::class(key));
        assert_eq!(arena.kind(key), Some(TypeKind::Opaque));
        assert!(!arena.is_mappable(key));
    }

    #[test]
    fn test_array_erasure_uses_variable_bound() {
        let mut arena = TypeArena::with_builtins();
        let scope = vec![TypeArena::type_param(
            "N".to_string(),
            Some(GenericType::class(TypeKey::INT64)),
        )];

        let resolved = arena
            .resolve(&scope, &TypeExpr::array(TypeExpr::named("N")))
            .unwrap();

        match resolved {
            GenericType::Array { erased, .. } => {
                assert_eq!(arena.name(erased), "[Int64]");
                assert_eq!(arena.component_of(erased), Some(TypeKey::INT64));
                assert_eq!(arena.array_of(TypeKey::INT64), Some(erased));
            }
            other => panic!("expected an array, got {other:?}"),
        }
    }

    #[test]
    fn test_element_kinds_follow_boxing() {
        let arena = TypeArena::with_builtins();
        let int = arena.lookup("i32").unwrap();

        assert_eq!(arena.element_kind(int), ElementKind::Int32);
        assert_eq!(arena.element_kind(TypeKey::DOUBLE), ElementKind::Double);
        assert_eq!(arena.element_kind(TypeKey::OBJECT_ID), ElementKind::Any);
    }
}
