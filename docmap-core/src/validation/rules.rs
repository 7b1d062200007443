//! The default rule catalog.

use crate::error::MappingError;
use crate::mapper::Mapper;
use crate::metadata::{Annotation, AnnotationKind};
use crate::model::EntityModel;
use crate::property::PropertyDescriptor;
use crate::types::{TypeKey, TypeKind};

use super::{ClassConstraint, ConstraintViolation, PropertyConstraint, Severity};

/// Every parameter of the declared full constructor must name a mapped property.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructorParameterNames;

impl ClassConstraint for ConstructorParameterNames {
    fn check(&self, mapper: &Mapper, model: &EntityModel, violations: &mut Vec<ConstraintViolation>) {
        let Ok(node) = mapper.types().get(model.type_key()) else {
            return;
        };
        let Some(parameters) = node.constructor() else {
            return;
        };

        for parameter in parameters {
            if model.property(parameter).is_none() {
                violations.push(ConstraintViolation::new(
                    Severity::Fatal,
                    model,
                    "ConstructorParameterNames",
                    format!("constructor parameter {parameter} does not match any mapped property"),
                ));
            }
        }
    }
}

fn at_most_one(
    model: &EntityModel,
    kind: AnnotationKind,
    rule: &'static str,
    violations: &mut Vec<ConstraintViolation>,
) {
    let found = model.properties_with(&kind);
    if found.len() > 1 {
        let names: Vec<&str> = found.iter().map(|property| property.name()).collect();
        violations.push(ConstraintViolation::new(
            Severity::Fatal,
            model,
            rule,
            format!("more than one property is marked {kind}: {}", names.join(", ")),
        ));
    }
}

/// At most one property may carry `Id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipleId;

impl ClassConstraint for MultipleId {
    fn check(&self, _mapper: &Mapper, model: &EntityModel, violations: &mut Vec<ConstraintViolation>) {
        at_most_one(model, AnnotationKind::Id, "MultipleId", violations);
    }
}

/// At most one property may carry `Version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipleVersions;

impl ClassConstraint for MultipleVersions {
    fn check(&self, _mapper: &Mapper, model: &EntityModel, violations: &mut Vec<ConstraintViolation>) {
        at_most_one(model, AnnotationKind::Version, "MultipleVersions", violations);
    }
}

/// Warns about top-level entities that cannot be identified.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingIdentity;

impl ClassConstraint for MissingIdentity {
    fn check(&self, _mapper: &Mapper, model: &EntityModel, violations: &mut Vec<ConstraintViolation>) {
        if model.has_annotation(&AnnotationKind::Entity)
            && !model.is_interface()
            && model.id_property().is_none()
        {
            violations.push(ConstraintViolation::new(
                Severity::Warning,
                model,
                "MissingIdentity",
                "entity has no identity property",
            ));
        }
    }
}

/// Two kinds of metadata that must not appear on the same property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContradictingMetadata {
    first: AnnotationKind,
    second: AnnotationKind,
}

impl ContradictingMetadata {
    pub fn new(first: AnnotationKind, second: AnnotationKind) -> Self {
        Self { first, second }
    }
}

impl PropertyConstraint for ContradictingMetadata {
    fn check(
        &self,
        _mapper: &Mapper,
        model: &EntityModel,
        property: &PropertyDescriptor,
        violations: &mut Vec<ConstraintViolation>,
    ) {
        if property.has_annotation(&self.first) && property.has_annotation(&self.second) {
            violations.push(ConstraintViolation::for_property(
                Severity::Fatal,
                model,
                property,
                "ContradictingMetadata",
                format!("a property cannot be both {} and {}", self.first, self.second),
            ));
        }
    }
}

/// Lazy references cannot be stored in arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct LazyReferenceOnArray;

impl PropertyConstraint for LazyReferenceOnArray {
    fn check(
        &self,
        _mapper: &Mapper,
        model: &EntityModel,
        property: &PropertyDescriptor,
        violations: &mut Vec<ConstraintViolation>,
    ) {
        let lazy = matches!(
            property.annotation(&AnnotationKind::Reference),
            Some(Annotation::Reference(reference)) if reference.lazy
        );
        if lazy && property.is_array() {
            violations.push(ConstraintViolation::for_property(
                Severity::Fatal,
                model,
                property,
                "LazyReferenceOnArray",
                "lazy references are not supported on arrays, use a list instead",
            ));
        }
    }
}

/// A reference must point at a type that has an identity property or is an interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceToUnidentifiable;

impl ReferenceToUnidentifiable {
    /// Decides from the declared structure alone, for targets whose model is being built
    /// further up the current build.
    fn identifiable_in_schema(mapper: &Mapper, target: TypeKey) -> bool {
        let arena = mapper.types();
        if arena.kind(target) == Some(TypeKind::Interface) {
            return true;
        }

        let mut current = Some(target);
        while let Some(key) = current {
            let Ok(node) = arena.get(key) else {
                return false;
            };
            let declares_id = node
                .fields()
                .iter()
                .any(|field| field.metadata().has(&AnnotationKind::Id))
                || node
                    .methods()
                    .iter()
                    .any(|method| method.metadata().has(&AnnotationKind::Id));
            if declares_id {
                return true;
            }
            current = node.superclass_key().filter(|parent| *parent != TypeKey::OBJECT);
        }
        false
    }
}

impl PropertyConstraint for ReferenceToUnidentifiable {
    fn check(
        &self,
        mapper: &Mapper,
        model: &EntityModel,
        property: &PropertyDescriptor,
        violations: &mut Vec<ConstraintViolation>,
    ) {
        if !property.has_annotation(&AnnotationKind::Reference) {
            return;
        }

        let target = property.normalized_type();
        let target_name = mapper.types().name(target).to_string();
        let identifiable = if target == model.type_key() {
            Ok(model.id_property().is_some() || model.is_interface())
        } else {
            match mapper.entity_model(target) {
                Ok(Some(target)) => Ok(target.id_property().is_some() || target.is_interface()),
                Ok(None) => Err(format!("{target_name} is not a mappable type")),
                Err(MappingError::CyclicMapping(_)) => Ok(Self::identifiable_in_schema(mapper, target)),
                Err(err) => Err(format!("the model of {target_name} cannot be built: {err}")),
            }
        };

        let message = match identifiable {
            Ok(true) => return,
            Ok(false) => format!("the referenced type {target_name} has no identity property"),
            Err(message) => message,
        };
        violations.push(ConstraintViolation::for_property(
            Severity::Fatal,
            model,
            property,
            "ReferenceToUnidentifiable",
            message,
        ));
    }
}

/// Version properties must be 32 or 64 bit integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionType;

impl PropertyConstraint for VersionType {
    fn check(
        &self,
        mapper: &Mapper,
        model: &EntityModel,
        property: &PropertyDescriptor,
        violations: &mut Vec<ConstraintViolation>,
    ) {
        if !property.has_annotation(&AnnotationKind::Version) {
            return;
        }
        let arena = mapper.types();
        let ty = arena.boxed(property.type_key());
        if ty != TypeKey::INT32 && ty != TypeKey::INT64 {
            violations.push(ConstraintViolation::for_property(
                Severity::Fatal,
                model,
                property,
                "VersionType",
                format!("version properties must be Int32 or Int64, found {}", arena.name(ty)),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EntityAnnotation, ReferenceAnnotation};
    use crate::options::MapperOptions;
    use crate::schema::{FieldDef, SchemaBuilder, TypeDef};
    use crate::validation::{Rule, ValidationFailure, Validator};

    fn mapper(defs: Vec<TypeDef>) -> Mapper {
        let mut schema = SchemaBuilder::new();
        for def in defs {
            schema.define(def);
        }
        Mapper::new(schema.build().unwrap(), MapperOptions::default())
    }

    fn failure(mapper: &Mapper, name: &str) -> ValidationFailure {
        match mapper.entity_model_by_name(name) {
            Err(MappingError::Validation(failure)) => failure,
            other => panic!("expected a validation failure, got {other:?}"),
        }
    }

    fn rules(failure: &ValidationFailure) -> Vec<&'static str> {
        failure.fatal().map(ConstraintViolation::rule).collect()
    }

    #[test]
    fn test_lazy_reference_on_array_is_a_single_fatal_violation() {
        let mapper = mapper(vec![
            TypeDef::class("Target").field(FieldDef::new("id", "i64").annotate(Annotation::Id)),
            TypeDef::class("Holder")
                .field(FieldDef::new("id", "i64").annotate(Annotation::Id))
                .field(FieldDef::new("targets", "[Target]").annotate(Annotation::lazy_reference())),
        ]);

        let failure = failure(&mapper, "Holder");

        assert_eq!(rules(&failure), vec!["LazyReferenceOnArray"]);
        assert_eq!(failure.violations()[0].prefix(), "Holder.targets");
        assert!(mapper.cached_models().iter().all(|model| model.name() != "Holder"));
    }

    #[test]
    fn test_all_violations_are_collected() {
        let mapper = mapper(vec![
            TypeDef::class("Broken")
                .field(FieldDef::new("a", "i64").annotate(Annotation::Id))
                .field(
                    FieldDef::new("b", "i64")
                        .annotate(Annotation::Id)
                        .annotate(Annotation::version()),
                )
                .field(
                    FieldDef::new("c", "String")
                        .annotate(Annotation::version())
                        .annotate(Annotation::property("see")),
                )
                .constructor(["a", "missing"]),
        ]);

        let failure = failure(&mapper, "Broken");
        let found = rules(&failure);

        assert!(found.contains(&"ConstructorParameterNames"));
        assert!(found.contains(&"MultipleId"));
        assert!(found.contains(&"MultipleVersions"));
        assert!(found.contains(&"VersionType"));
        assert!(failure.to_string().starts_with("Mapping validation failed for Broken:"));
    }

    #[test]
    fn test_contradicting_metadata() {
        let mapper = mapper(vec![
            TypeDef::class("Target").field(FieldDef::new("id", "i64").annotate(Annotation::Id)),
            TypeDef::class("Holder")
                .field(FieldDef::new("id", "i64").annotate(Annotation::Id))
                .field(
                    FieldDef::new("target", "Target")
                        .annotate(Annotation::reference())
                        .annotate(Annotation::Embedded),
                ),
        ]);

        let failure = failure(&mapper, "Holder");

        assert_eq!(rules(&failure), vec!["ContradictingMetadata"]);
        assert_eq!(
            failure.violations()[0].render(),
            "ContradictingMetadata complained about Holder.target : a property cannot be both Reference and Embedded"
        );
    }

    #[test]
    fn test_transient_identity_is_a_contradiction() {
        let mapper = mapper(vec![
            TypeDef::class("Session")
                .field(
                    FieldDef::new("id", "i64")
                        .annotate(Annotation::Id)
                        .annotate(Annotation::Transient),
                )
                .field(FieldDef::new("name", "String"))
                .field(FieldDef::new("cache", "String").annotate(Annotation::Transient)),
        ]);

        let failure = failure(&mapper, "Session");

        assert_eq!(rules(&failure), vec!["ContradictingMetadata"]);
        assert_eq!(
            failure.violations()[0].render(),
            "ContradictingMetadata complained about Session.id : a property cannot be both Id and Transient"
        );
    }

    #[test]
    fn test_reference_targets_must_be_identifiable() {
        let mapper = mapper(vec![
            TypeDef::class("Address").field(FieldDef::new("street", "String")),
            TypeDef::interface("Shape"),
            TypeDef::class("Holder")
                .field(FieldDef::new("id", "i64").annotate(Annotation::Id))
                .field(FieldDef::new("shape", "Shape").annotate(Annotation::reference()))
                .field(FieldDef::new("address", "Address").annotate(Annotation::reference())),
            TypeDef::class("Scalar")
                .field(FieldDef::new("id", "i64").annotate(Annotation::Id))
                .field(
                    FieldDef::new("name", "String")
                        .annotate(Annotation::Reference(ReferenceAnnotation::new().id_only())),
                ),
        ]);

        let holder = failure(&mapper, "Holder");
        assert_eq!(rules(&holder), vec!["ReferenceToUnidentifiable"]);
        assert_eq!(holder.violations()[0].property(), Some("address"));

        let scalar = failure(&mapper, "Scalar");
        assert!(scalar.violations()[0].message().contains("not a mappable type"));
    }

    #[test]
    fn test_self_references_are_identifiable() {
        let mapper = mapper(vec![
            TypeDef::class("Node")
                .field(FieldDef::new("id", "i64").annotate(Annotation::Id))
                .field(FieldDef::new("next", "Node").annotate(Annotation::reference()))
                .field(FieldDef::new("children", "List<Node>").annotate(Annotation::reference())),
        ]);

        assert!(mapper.entity_model_by_name("Node").unwrap().is_some());
    }

    #[test]
    fn test_missing_identity_only_warns() {
        let mapper = mapper(vec![
            TypeDef::class("Log")
                .annotate(Annotation::Entity(EntityAnnotation::new()))
                .field(FieldDef::new("line", "String")),
        ]);
        let model = mapper.entity_model_by_name("Log").unwrap().unwrap();

        let violations = Validator::new(vec![Rule::class(MissingIdentity)]).validate(&mapper, &model);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity(), Severity::Warning);
        assert!(Validator::default().check(&mapper, &model).is_ok());
    }
}
