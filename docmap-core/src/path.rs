//! Translation of logical property paths into stored field paths.
//!
//! Queries address properties by their logical names (`address.zipCode`), while documents
//! store them under their mapped names (`address.zip`). [`PathTarget::resolve`] walks a dotted
//! path through the entity models it crosses:
//!
//! - named segments are looked up on the current model and replaced by the mapped name
//! - positional segments (`$`, `$[]`, `$[tag]` and array indexes) pass through unchanged
//! - the segment following a map property is a key and passes through unchanged
//! - once a segment reaches a type without an entity model, the rest passes through
//!
//! [`translate_filter`] applies the same translation to every field of a filter document.

use std::sync::Arc;

use bson::{Bson, Document};

use crate::error::{MappingError, MappingResult};
use crate::mapper::Mapper;
use crate::model::EntityModel;
use crate::property::PropertyDescriptor;

enum Cursor {
    Model(Arc<EntityModel>),
    MapKey(Option<Arc<EntityModel>>),
    Opaque,
}

fn is_positional(segment: &str) -> bool {
    segment.starts_with('$') || (!segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}

/// A resolved property path.
#[derive(Debug, Clone)]
pub struct PathTarget {
    original: String,
    translated: Vec<String>,
    target: Option<PropertyDescriptor>,
}

impl PathTarget {
    /// Resolves `path` against `model`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotFound`] if a named segment matches no property, or any error
    /// raised while building a model the path crosses.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let target = PathTarget::resolve(&mapper, &person, "address.zipCode")?;
    /// assert_eq!(target.translated(), "address.zip");
    /// ```
    pub fn resolve(mapper: &Mapper, model: &Arc<EntityModel>, path: &str) -> MappingResult<Self> {
        let mut cursor = Cursor::Model(Arc::clone(model));
        let mut translated = Vec::new();
        let mut target = None;

        for segment in path.split('.') {
            if is_positional(segment) {
                translated.push(segment.to_string());
                continue;
            }

            cursor = match cursor {
                Cursor::Model(current) => {
                    let property = current
                        .property(segment)
                        .or_else(|| current.property_by_mapped_name(segment))
                        .ok_or_else(|| {
                            MappingError::NotFound(format!(
                                "property {segment} of path {path} on {}",
                                current.name()
                            ))
                        })?;
                    translated.push(property.mapped_name().to_string());

                    let element = mapper.entity_model(property.normalized_type())?;
                    let next = if property.is_map() {
                        Cursor::MapKey(element)
                    } else {
                        element.map_or(Cursor::Opaque, Cursor::Model)
                    };
                    target = Some(property.clone());
                    next
                }
                Cursor::MapKey(value) => {
                    translated.push(segment.to_string());
                    value.map_or(Cursor::Opaque, Cursor::Model)
                }
                Cursor::Opaque => {
                    translated.push(segment.to_string());
                    Cursor::Opaque
                }
            };
        }

        Ok(Self {
            original: path.to_string(),
            translated,
            target,
        })
    }

    /// The path as it was given.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The path with every property replaced by its mapped name.
    pub fn translated(&self) -> String {
        self.translated.join(".")
    }

    /// The last property the path resolved to, if any.
    pub fn target(&self) -> Option<&PropertyDescriptor> {
        self.target.as_ref()
    }
}

/// Rewrites the field names of a filter document into mapped paths.
///
/// Operator keys (`$and`, `$or`, ..) are kept and their operands are translated recursively;
/// operand values under field keys are left as they are.
///
/// # Errors
///
/// Returns [`MappingError::NotFound`] if a field path does not resolve.
pub fn translate_filter(mapper: &Mapper, model: &Arc<EntityModel>, filter: &Document) -> MappingResult<Document> {
    filter
        .iter()
        .map(|(key, value)| {
            if key.starts_with('$') {
                Ok((key.clone(), translate_operand(mapper, model, value)?))
            } else {
                let target = PathTarget::resolve(mapper, model, key)?;
                Ok((target.translated(), value.clone()))
            }
        })
        .collect()
}

fn translate_operand(mapper: &Mapper, model: &Arc<EntityModel>, value: &Bson) -> MappingResult<Bson> {
    match value {
        Bson::Document(nested) => Ok(Bson::Document(translate_filter(mapper, model, nested)?)),
        Bson::Array(items) => Ok(Bson::Array(
            items
                .iter()
                .map(|item| translate_operand(mapper, model, item))
                .collect::<MappingResult<Vec<_>>>()?,
        )),
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Annotation;
    use crate::options::MapperOptions;
    use crate::schema::{FieldDef, SchemaBuilder, TypeDef};
    use bson::doc;

    fn person() -> (Mapper, Arc<EntityModel>) {
        let mut schema = SchemaBuilder::new();
        schema
            .define(
                TypeDef::class("Address")
                    .annotate(Annotation::Embedded)
                    .field(FieldDef::new("street", "String"))
                    .field(FieldDef::new("zipCode", "String").annotate(Annotation::property("zip"))),
            )
            .define(TypeDef::class("Score").field(FieldDef::new("points", "i32").annotate(Annotation::property("pts"))))
            .define(
                TypeDef::class("Person")
                    .field(FieldDef::new("id", "i64").annotate(Annotation::Id))
                    .field(FieldDef::new("fullName", "String").annotate(Annotation::property("name")))
                    .field(FieldDef::new("address", "Address"))
                    .field(FieldDef::new("addresses", "List<Address>"))
                    .field(FieldDef::new("scores", "Map<String, Score>"))
                    .field(FieldDef::new("extra", "Document")),
            );
        let mapper = Mapper::from_schema(schema, MapperOptions::default()).unwrap();
        let model = mapper.entity_model_by_name("Person").unwrap().unwrap();
        (mapper, model)
    }

    fn translate(path: &str) -> MappingResult<String> {
        let (mapper, model) = person();
        PathTarget::resolve(&mapper, &model, path).map(|target| target.translated())
    }

    #[test]
    fn test_named_segments_use_mapped_names() {
        assert_eq!(translate("id").unwrap(), "_id");
        assert_eq!(translate("fullName").unwrap(), "name");
        assert_eq!(translate("address.zipCode").unwrap(), "address.zip");
        assert_eq!(translate("address.zip").unwrap(), "address.zip");
    }

    #[test]
    fn test_positional_segments_and_map_keys_pass_through() {
        assert_eq!(translate("addresses.0.zipCode").unwrap(), "addresses.0.zip");
        assert_eq!(translate("addresses.$.zipCode").unwrap(), "addresses.$.zip");
        assert_eq!(translate("addresses.$[].street").unwrap(), "addresses.$[].street");
        assert_eq!(translate("scores.math.points").unwrap(), "scores.math.pts");
        assert_eq!(translate("extra.anything.goes").unwrap(), "extra.anything.goes");
    }

    #[test]
    fn test_unknown_properties_are_not_found() {
        assert!(matches!(translate("nickname"), Err(MappingError::NotFound(_))));
        assert!(matches!(translate("address.city"), Err(MappingError::NotFound(_))));
    }

    #[test]
    fn test_target_is_the_last_property() {
        let (mapper, model) = person();
        let target = PathTarget::resolve(&mapper, &model, "scores.math").unwrap();

        assert_eq!(target.original(), "scores.math");
        assert_eq!(target.target().map(PropertyDescriptor::name), Some("scores"));
    }

    #[test]
    fn test_translate_filter() {
        let (mapper, model) = person();
        let filter = doc! {
            "fullName": "Ada",
            "$or": [
                { "address.zipCode": { "$in": ["1000", "2000"] } },
                { "scores.math.points": { "$gt": 10 } },
            ],
        };

        let translated = translate_filter(&mapper, &model, &filter).unwrap();

        assert_eq!(
            translated,
            doc! {
                "name": "Ada",
                "$or": [
                    { "address.zip": { "$in": ["1000", "2000"] } },
                    { "scores.math.pts": { "$gt": 10 } },
                ],
            }
        );
    }
}
