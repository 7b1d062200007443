use crate::accessor::Accessor;
use crate::builder::EntityModelBuilder;
use crate::conventions::{Convention, discovery_levels};
use crate::descriptor::TypeDescriptor;
use crate::error::MappingResult;
use crate::mapper::Mapper;
use crate::types::TypeKey;

/// Discovers one property per declared field.
///
/// Non-byte arrays get an [`Accessor::Array`]; every other field an [`Accessor::Field`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldDiscovery;

impl Convention for FieldDiscovery {
    fn name(&self) -> &'static str {
        "FieldDiscovery"
    }

    fn apply(&self, mapper: &Mapper, builder: &mut EntityModelBuilder<'_>) -> MappingResult<()> {
        let arena = mapper.types();

        for (declaring, depth) in discovery_levels(builder) {
            for field in arena.get(declaring)?.fields() {
                let suggested = TypeDescriptor::of(arena, declaring, field.declared_type());
                let descriptor = builder.type_descriptor(declaring, suggested, field.declared_type());
                let accessor = match arena.component_of(descriptor.base_type()) {
                    Some(component) if arena.boxed(component) != TypeKey::BYTE => {
                        Accessor::array(field.name(), depth, arena.element_kind(component))
                    }
                    _ => Accessor::field(field.name(), depth),
                };

                let property = builder.add_property();
                property
                    .set_name(field.name())
                    .set_declaring_type(declaring)
                    .set_type_descriptor(descriptor)
                    .set_metadata(field.metadata().clone())
                    .set_accessor(accessor);
                let mapped_name = property.discover_mapped_name(mapper.options())?;
                property.set_mapped_name(mapped_name);
            }
        }

        Ok(())
    }
}
