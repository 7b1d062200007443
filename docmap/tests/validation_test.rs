use docmap::prelude::*;
use docmap::validation::{ConstraintViolation, PropertyConstraint, Rule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Entity)]
#[entity]
struct Target {
    #[mapping(id)]
    id: i64,
}

docmap::bson_value_via_serde!(Target);

#[derive(Debug, Default, Entity)]
#[entity]
struct Catalog {
    #[mapping(id)]
    id: i64,
    #[mapping(lazy)]
    featured: Vec<Target>,
    #[mapping(reference, property = "main_ref")]
    main: Option<Target>,
}

#[derive(Debug, Default, Entity)]
#[entity]
struct Shelf {
    #[mapping(id)]
    id: i64,
    #[mapping(lazy)]
    slots: [Target; 2],
}

#[derive(Debug, Default, Entity)]
#[entity]
struct Ledger {
    #[mapping(id)]
    id: i64,
    #[mapping(id)]
    code: String,
    #[mapping(version)]
    revision: String,
}

#[derive(Debug, Default, Entity)]
#[entity(embedded)]
struct Note {
    text: String,
}

#[derive(Debug, Clone, Copy, Default)]
struct ShortNames;

impl PropertyConstraint for ShortNames {
    fn check(
        &self,
        _mapper: &Mapper,
        model: &EntityModel,
        property: &PropertyDescriptor,
        violations: &mut Vec<ConstraintViolation>,
    ) {
        if property.mapped_name().len() > 4 {
            violations.push(ConstraintViolation::for_property(
                Severity::Warning,
                model,
                property,
                "ShortNames",
                "mapped names should not exceed four characters",
            ));
        }
    }
}

fn mapper_with(validator: Validator, register: impl FnOnce(&mut SchemaBuilder)) -> Mapper {
    let mut schema = SchemaBuilder::new();
    register(&mut schema);
    let options = MapperOptions::builder().with_validator(validator).build();
    Mapper::from_schema(schema, options).unwrap()
}

fn failure_of(result: MappingResult<Option<std::sync::Arc<EntityModel>>>) -> docmap::validation::ValidationFailure {
    match result {
        Err(MappingError::Validation(failure)) => failure,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a validation failure"),
    }
}

#[test]
fn test_lazy_references_to_lists_are_accepted() {
    let mapper = mapper_with(Validator::default(), |schema| {
        schema.register::<Catalog>();
    });
    let model = mapper.entity_model_of::<Catalog>().unwrap().unwrap();

    let featured = model.property("featured").unwrap();
    match featured.annotation(&AnnotationKind::Reference) {
        Some(Annotation::Reference(reference)) => assert!(reference.lazy),
        other => panic!("unexpected annotation: {other:?}"),
    }
    assert_eq!(model.property("main").unwrap().mapped_name(), "main_ref");
    assert!(mapper.entity_model_by_name("Target").unwrap().is_some());
}

#[test]
fn test_lazy_references_to_arrays_are_rejected() {
    let mapper = mapper_with(Validator::default(), |schema| {
        schema.register::<Shelf>();
    });

    let failure = failure_of(mapper.entity_model_of::<Shelf>());

    assert_eq!(failure.entity(), "Shelf");
    let rules: Vec<&str> = failure.violations().iter().map(|violation| violation.rule()).collect();
    assert_eq!(rules, ["LazyReferenceOnArray"]);
    assert_eq!(failure.violations()[0].property(), Some("slots"));
    assert!(mapper.cached_models().iter().all(|model| model.name() != "Shelf"));
}

#[test]
fn test_every_fatal_violation_is_reported() {
    let mapper = mapper_with(Validator::default(), |schema| {
        schema.register::<Ledger>();
    });

    let failure = failure_of(mapper.entity_model_of::<Ledger>());

    let mut rules: Vec<&str> = failure.fatal().map(|violation| violation.rule()).collect();
    rules.sort_unstable();
    assert_eq!(rules, ["MultipleId", "VersionType"]);

    let message = failure.to_string();
    assert!(message.starts_with("Mapping validation failed for Ledger:"));
    assert!(message.contains("[FATAL] VersionType complained about Ledger.revision"));
}

#[test]
fn test_failures_surface_through_the_codec() {
    let mapper = mapper_with(Validator::default(), |schema| {
        schema.register::<Shelf>();
    });

    let err = EntityCodec::for_type::<Shelf>(&mapper).unwrap_err();

    assert!(matches!(err, MappingError::Validation(_)));
}

#[test]
fn test_custom_rules_run_after_the_defaults() {
    let validator = Validator::default().with_rule(Rule::property(ShortNames));
    let mapper = mapper_with(validator, |schema| {
        schema.register::<Catalog>();
    });

    let model = mapper.entity_model_of::<Catalog>().unwrap().unwrap();
    let violations = mapper.options().validator().validate(&mapper, &model);

    let flagged: Vec<String> = violations.iter().map(ConstraintViolation::prefix).collect();
    assert_eq!(flagged, ["Catalog.featured", "Catalog.main"]);
    assert!(violations.iter().all(|violation| violation.severity() == Severity::Warning));
}

#[test]
fn test_empty_validator_accepts_anything() {
    let mapper = mapper_with(Validator::empty(), |schema| {
        schema.register::<Shelf>().register::<Ledger>().register::<Note>();
    });

    assert!(mapper.entity_model_of::<Shelf>().unwrap().is_some());
    assert!(mapper.entity_model_of::<Ledger>().unwrap().is_some());
    assert!(mapper.entity_model_of::<Note>().unwrap().is_some());
}
