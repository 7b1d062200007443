use docmap::bson::{Bson, doc};
use docmap::prelude::*;
use docmap::types::TypeKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Entity)]
#[entity(embedded)]
struct Address {
    street: String,
    city: String,
}

docmap::bson_value_via_serde!(Address);

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity(collection = "people")]
struct Person {
    #[mapping(id)]
    id: i32,
    #[mapping(property = "full_name")]
    name: String,
    nickname: Option<String>,
    #[mapping(embedded)]
    address: Address,
    #[mapping(transient)]
    session: String,
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
struct Employee {
    #[mapping(parent)]
    person: Person,
    dept: String,
    tags: Vec<String>,
    #[mapping(version)]
    revision: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity]
struct Wrapper<T> {
    #[mapping(id)]
    id: String,
    value: T,
    history: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity(discriminator = "counter", discriminator_key = "kind")]
struct Counter {
    #[mapping(parent)]
    wrapper: Wrapper<i64>,
    step: i32,
}

fn mapper_for<F: FnOnce(&mut SchemaBuilder)>(register: F) -> Mapper {
    let mut schema = SchemaBuilder::new();
    register(&mut schema);
    Mapper::from_schema(schema, MapperOptions::default()).unwrap()
}

fn ada() -> Employee {
    Employee {
        person: Person {
            id: 7,
            name: "Ada".to_string(),
            nickname: None,
            address: Address {
                street: "Main Street 1".to_string(),
                city: "London".to_string(),
            },
            session: "secret".to_string(),
        },
        dept: "Engines".to_string(),
        tags: Vec::new(),
        revision: 3,
    }
}

#[test]
fn test_inherited_properties_come_first() {
    let mapper = mapper_for(|schema| {
        schema.register::<Employee>();
    });
    let model = mapper.entity_model_of::<Employee>().unwrap().unwrap();

    let names: Vec<&str> = model.properties().iter().map(|property| property.name()).collect();
    assert_eq!(names, ["id", "name", "nickname", "address", "dept", "tags", "revision"]);

    let mapped: Vec<&str> = model.properties().iter().map(|property| property.mapped_name()).collect();
    assert_eq!(mapped, ["_id", "full_name", "nickname", "address", "dept", "tags", "revision"]);

    assert_eq!(model.id_property().map(|property| property.name()), Some("id"));
    assert_eq!(model.version_property().map(|property| property.name()), Some("revision"));
    assert_eq!(model.superclass().map(|parent| parent.name().to_string()), Some("Person".to_string()));
}

#[test]
fn test_entity_metadata_is_inherited_but_discriminator_is_not() {
    let mapper = mapper_for(|schema| {
        schema.register::<Employee>();
    });
    let person = mapper.entity_model_of::<Person>().unwrap().unwrap();
    let employee = mapper.entity_model_of::<Employee>().unwrap().unwrap();

    assert_eq!(person.collection_name(), "people");
    assert_eq!(employee.collection_name(), "people");
    assert_eq!(person.discriminator(), Some("Person"));
    assert_eq!(employee.discriminator(), Some("Employee"));
    assert_eq!(employee.discriminator_key(), Some("_t"));
}

#[test]
fn test_embedded_types_are_registered_with_their_owner() {
    let mapper = mapper_for(|schema| {
        schema.register::<Person>();
    });

    let address = mapper.entity_model_by_name("Address").unwrap().unwrap();
    assert!(address.has_annotation(&AnnotationKind::Embedded));
    assert!(address.id_property().is_none());
}

#[test]
fn test_encode_and_decode_through_the_parent() {
    let mapper = mapper_for(|schema| {
        schema.register::<Employee>();
    });
    let employee = ada();

    let document = employee.to_document(&mapper).unwrap();
    assert_eq!(
        document,
        doc! {
            "_t": "Employee",
            "_id": 7,
            "full_name": "Ada",
            "address": { "street": "Main Street 1", "city": "London" },
            "dept": "Engines",
            "revision": 3_i64,
        }
    );

    let decoded = Employee::from_document(&mapper, &document).unwrap();
    assert_eq!(decoded.person.id, 7);
    assert_eq!(decoded.person.name, "Ada");
    assert_eq!(decoded.person.address.city, "London");
    assert_eq!(decoded.person.session, "");
    assert_eq!(decoded.dept, "Engines");
    assert_eq!(decoded.revision, 3);
}

#[test]
fn test_to_json() {
    let mapper = mapper_for(|schema| {
        schema.register::<Person>();
    });
    let person = ada().person;

    let json = person.to_json(&mapper).unwrap();

    assert_eq!(json["_id"], 7);
    assert_eq!(json["full_name"], "Ada");
    assert_eq!(json["address"]["city"], "London");
    assert!(json.get("session").is_none());
}

#[test]
fn test_conversion_errors_name_the_property() {
    let mapper = mapper_for(|schema| {
        schema.register::<Person>();
    });

    let err = Person::from_document(&mapper, &doc! { "_id": "seven" }).unwrap_err();

    match err {
        MappingError::Mapping { property, .. } => assert_eq!(property, "Person.id"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_generic_parent_binds_type_arguments() {
    let mapper = mapper_for(|schema| {
        schema.register::<Counter>();
    });
    let model = mapper.entity_model_of::<Counter>().unwrap().unwrap();

    assert_eq!(model.property("value").unwrap().type_key(), TypeKey::INT64);
    assert!(model.property("history").unwrap().is_multiple_values());

    assert_eq!(model.discriminator_key(), Some("kind"));
    assert_eq!(model.discriminator(), Some("counter"));

    let counter = Counter {
        wrapper: Wrapper {
            id: "c1".to_string(),
            value: 41,
            history: vec![39, 40],
        },
        step: 1,
    };
    let document = counter.to_document(&mapper).unwrap();
    assert_eq!(
        document,
        doc! { "kind": "counter", "_id": "c1", "value": 41_i64, "history": [39_i64, 40_i64], "step": 1 }
    );
}

#[test]
fn test_version_update_increments_the_version() {
    let mapper = mapper_for(|schema| {
        schema.register::<Employee>();
    });
    let codec = EntityCodec::for_type::<Employee>(&mapper).unwrap();

    let mut update = doc! { "$set": { "dept": "Looms" } };
    codec.version_update(&mut update).unwrap();

    assert_eq!(update.get_document("$inc").unwrap().get("revision"), Some(&Bson::Int64(1)));
}

#[test]
fn test_paths_and_filters_use_mapped_names() {
    let mapper = mapper_for(|schema| {
        schema.register::<Employee>();
    });
    let model = mapper.entity_model_of::<Employee>().unwrap().unwrap();

    let target = PathTarget::resolve(&mapper, &model, "address.city").unwrap();
    assert_eq!(target.translated(), "address.city");
    assert_eq!(target.target().map(|property| property.name()), Some("city"));

    let filter = doc! { "name": "Ada", "$or": [{ "id": 7 }, { "tags": "lead" }] };
    let translated = translate_filter(&mapper, &model, &filter).unwrap();
    assert_eq!(translated, doc! { "full_name": "Ada", "$or": [{ "_id": 7 }, { "tags": "lead" }] });

    assert!(matches!(
        PathTarget::resolve(&mapper, &model, "session"),
        Err(MappingError::NotFound(_))
    ));
}

#[test]
fn test_snake_case_configuration() {
    let config = MapperConfig::from_json(
        r#"{ "field_naming": "snake_case", "collection_naming": "lower_case", "discriminator_key": "type" }"#,
    )
    .unwrap();
    let mut schema = SchemaBuilder::new();
    schema.register::<Counter>();
    let mapper = Mapper::from_schema(schema, config.into_builder().build()).unwrap();

    let wrapper = mapper.entity_model_by_name("Wrapper").unwrap().unwrap();
    assert_eq!(wrapper.collection_name(), "wrapper");
    assert_eq!(wrapper.discriminator_key(), Some("type"));

    let counter = mapper.entity_model_of::<Counter>().unwrap().unwrap();
    assert_eq!(counter.discriminator_key(), Some("kind"));
}

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[entity(use_discriminator = false)]
struct Launch {
    #[mapping(id)]
    id: i64,
    #[mapping(property = "")]
    title: String,
    at: chrono::DateTime<chrono::Utc>,
}

#[test]
fn test_empty_property_names_fall_back_to_the_field_name() {
    let mapper = mapper_for(|schema| {
        schema.register::<Launch>();
    });
    let model = mapper.entity_model_of::<Launch>().unwrap().unwrap();

    assert_eq!(model.property("title").unwrap().mapped_name(), "title");
}

#[test]
fn test_timestamps_round_trip() {
    use chrono::TimeZone;

    let mapper = mapper_for(|schema| {
        schema.register::<Launch>();
    });
    let launch = Launch {
        id: 1,
        title: "Apollo".to_string(),
        at: chrono::Utc.with_ymd_and_hms(1969, 7, 16, 13, 32, 0).unwrap(),
    };

    let document = launch.to_document(&mapper).unwrap();
    assert!(matches!(document.get("at"), Some(Bson::DateTime(_))));
    assert_eq!(Launch::from_document(&mapper, &document).unwrap(), launch);

    let json = launch.to_json(&mapper).unwrap();
    assert_eq!(json["_id"], serde_json::json!(1));
    assert_eq!(json["title"], serde_json::json!("Apollo"));
    assert!(json.get("_t").is_none());
}
