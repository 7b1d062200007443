//! Declarative mapping metadata attached to types, fields and methods at registration time.
//!
//! Metadata takes the place of runtime annotations: a [`TypeDef`](crate::schema::TypeDef) or a
//! `#[derive(Entity)]` attribute attaches [`Annotation`] values, and the convention pipeline
//! interprets them when an entity model is built.

use std::fmt;

/// Entity-level settings: collection and discriminator configuration.
///
/// # Example
///
/// ```ignore
/// use docmap::metadata::{Annotation, EntityAnnotation};
///
/// let entity = Annotation::Entity(
///     EntityAnnotation::new()
///         .with_collection("people")
///         .with_discriminator("person"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityAnnotation {
    /// Explicit collection name. `None` falls back to the collection naming strategy.
    pub collection: Option<String>,
    /// Explicit discriminator value. `None` falls back to the discriminator naming strategy.
    pub discriminator: Option<String>,
    /// Explicit discriminator key. `None` falls back to the configured key.
    pub discriminator_key: Option<String>,
    /// Whether documents of this entity carry a discriminator.
    pub use_discriminator: bool,
}

impl EntityAnnotation {
    pub fn new() -> Self {
        Self {
            collection: None,
            discriminator: None,
            discriminator_key: None,
            use_discriminator: true,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn with_discriminator_key(mut self, key: impl Into<String>) -> Self {
        self.discriminator_key = Some(key.into());
        self
    }

    pub fn with_use_discriminator(mut self, use_discriminator: bool) -> Self {
        self.use_discriminator = use_discriminator;
        self
    }
}

impl Default for EntityAnnotation {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings of a property that stores a reference to another entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ReferenceAnnotation {
    /// Explicit mapped name of the reference.
    pub name: Option<String>,
    /// Whether the referenced entity is loaded on first access.
    pub lazy: bool,
    /// Whether only the referenced identity is stored.
    pub id_only: bool,
}

impl ReferenceAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn id_only(mut self) -> Self {
        self.id_only = true;
        self
    }
}

/// A single piece of mapping metadata.
///
/// Name-carrying variants use `None` for "no explicit name", in which case the mapped name
/// falls through to the next rule of the naming policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Marks a type as a top-level entity stored in its own collection.
    Entity(EntityAnnotation),
    /// Marks a type as embedded in other documents.
    Embedded,
    /// Marks the identity property. Its mapped name is always `_id`.
    Id,
    /// Overrides the mapped name of a property.
    Property { name: Option<String> },
    /// Marks a reference to another entity.
    Reference(ReferenceAnnotation),
    /// Marks the optimistic-locking version property.
    Version { name: Option<String> },
    /// Excludes a property from mapping.
    Transient,
    /// A user-defined marker, matched by name.
    Tag(String),
}

impl Annotation {
    /// Shorthand for `Annotation::Property { name: Some(name) }`.
    pub fn property(name: impl Into<String>) -> Self {
        Annotation::Property {
            name: Some(name.into()),
        }
    }

    /// Shorthand for a reference with default settings.
    pub fn reference() -> Self {
        Annotation::Reference(ReferenceAnnotation::new())
    }

    /// Shorthand for a lazily loaded reference.
    pub fn lazy_reference() -> Self {
        Annotation::Reference(ReferenceAnnotation::new().lazy())
    }

    /// Shorthand for an unnamed version marker.
    pub fn version() -> Self {
        Annotation::Version { name: None }
    }

    /// Shorthand for a user-defined tag.
    pub fn tag(name: impl Into<String>) -> Self {
        Annotation::Tag(name.into())
    }

    /// Returns the kind of this annotation.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Entity(_) => AnnotationKind::Entity,
            Annotation::Embedded => AnnotationKind::Embedded,
            Annotation::Id => AnnotationKind::Id,
            Annotation::Property { .. } => AnnotationKind::Property,
            Annotation::Reference(_) => AnnotationKind::Reference,
            Annotation::Version { .. } => AnnotationKind::Version,
            Annotation::Transient => AnnotationKind::Transient,
            Annotation::Tag(name) => AnnotationKind::Tag(name.clone()),
        }
    }

    /// Returns the explicit mapped name carried by this annotation, if any.
    ///
    /// An empty name counts as no name.
    pub fn explicit_name(&self) -> Option<&str> {
        let name = match self {
            Annotation::Property { name } | Annotation::Version { name } => name.as_deref(),
            Annotation::Reference(reference) => reference.name.as_deref(),
            _ => None,
        };
        name.filter(|name| !name.is_empty())
    }
}

/// The discriminant of an [`Annotation`], used for lookups and rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationKind {
    Entity,
    Embedded,
    Id,
    Property,
    Reference,
    Version,
    Transient,
    Tag(String),
}

impl AnnotationKind {
    pub fn tag(name: impl Into<String>) -> Self {
        AnnotationKind::Tag(name.into())
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationKind::Entity => write!(f, "Entity"),
            AnnotationKind::Embedded => write!(f, "Embedded"),
            AnnotationKind::Id => write!(f, "Id"),
            AnnotationKind::Property => write!(f, "Property"),
            AnnotationKind::Reference => write!(f, "Reference"),
            AnnotationKind::Version => write!(f, "Version"),
            AnnotationKind::Transient => write!(f, "Transient"),
            AnnotationKind::Tag(name) => write!(f, "Tag({name})"),
        }
    }
}

/// An ordered collection of annotations attached to one type, field or method.
///
/// Lookups by kind return the first annotation of that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    annotations: Vec<Annotation>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an annotation, ignoring exact duplicates.
    pub fn push(&mut self, annotation: Annotation) {
        if !self.annotations.contains(&annotation) {
            self.annotations.push(annotation);
        }
    }

    /// Builder-style variant of [`Metadata::push`].
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.push(annotation);
        self
    }

    /// Returns `true` if an annotation of the given kind is present.
    pub fn has(&self, kind: &AnnotationKind) -> bool {
        self.get(kind).is_some()
    }

    /// Returns the first annotation of the given kind.
    pub fn get(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|annotation| &annotation.kind() == kind)
    }

    /// Adds every annotation of `other`.
    pub fn union(&mut self, other: &Metadata) {
        for annotation in &other.annotations {
            self.push(annotation.clone());
        }
    }

    /// Adds the annotations of `other` whose kind is not present yet.
    pub fn inherit(&mut self, other: &Metadata) {
        for annotation in &other.annotations {
            if !self.has(&annotation.kind()) {
                self.annotations.push(annotation.clone());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

impl FromIterator<Annotation> for Metadata {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for annotation in iter {
            metadata.push(annotation);
        }
        metadata
    }
}
