use crate::builder::EntityModelBuilder;
use crate::conventions::Convention;
use crate::error::MappingResult;
use crate::mapper::Mapper;
use crate::metadata::{Annotation, AnnotationKind};

/// Applies the entity-level defaults once properties are discovered.
///
/// - removes properties marked [`Annotation::Transient`], unless they are also marked `Id`
/// - selects the first `Id` property and the first `Version` property
/// - enables the discriminator unless the entity opts out, and fills in the key and value
///   from the entity metadata or the mapper options
///
/// The discriminator value is only taken from the type's own `Entity` metadata so that
/// subclasses never inherit their parent's value.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityDefaults;

impl Convention for EntityDefaults {
    fn name(&self) -> &'static str {
        "EntityDefaults"
    }

    fn apply(&self, mapper: &Mapper, builder: &mut EntityModelBuilder<'_>) -> MappingResult<()> {
        // Transient identities stay so that validation reports the contradiction.
        builder.retain_properties(|property| {
            !property.has_annotation(&AnnotationKind::Transient) || property.has_annotation(&AnnotationKind::Id)
        });

        let first_with = |kind: AnnotationKind| {
            builder
                .properties()
                .iter()
                .find(|property| property.has_annotation(&kind))
                .and_then(|property| property.name())
                .map(str::to_string)
        };
        let id = first_with(AnnotationKind::Id);
        let version = first_with(AnnotationKind::Version);
        if let Some(id) = id {
            builder.set_id_property_name(id);
        }
        if let Some(version) = version {
            builder.set_version_property_name(version);
        }

        let options = mapper.options();
        let entity = match builder.annotation(&AnnotationKind::Entity) {
            Some(Annotation::Entity(entity)) => Some(entity.clone()),
            _ => None,
        };
        let own_discriminator = match mapper.types().get(builder.type_key())?.metadata().get(&AnnotationKind::Entity) {
            Some(Annotation::Entity(entity)) => entity.discriminator.clone(),
            _ => None,
        };

        let enabled = entity.as_ref().is_none_or(|entity| entity.use_discriminator);
        let key = entity
            .as_ref()
            .and_then(|entity| entity.discriminator_key.clone())
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| options.discriminator_key().to_string());
        let value = own_discriminator
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| options.discriminator_naming().apply(builder.name()));

        builder.set_discriminator_enabled(enabled);
        if !key.is_empty() {
            builder.set_discriminator_key(key);
        }
        if !value.is_empty() {
            builder.set_discriminator(value);
        }

        Ok(())
    }
}
