use indexmap::IndexMap;

use crate::accessor::Accessor;
use crate::builder::EntityModelBuilder;
use crate::conventions::{Convention, discovery_levels};
use crate::descriptor::TypeDescriptor;
use crate::error::MappingResult;
use crate::mapper::Mapper;
use crate::types::{DeclaredMethod, MethodShape};

/// Discovers one property per getter/setter pair.
///
/// Methods are grouped by the name left after stripping a `get`, `set` or `is` prefix and
/// lower-casing the first remaining character. A group becomes a property only if it consists
/// of exactly one getter (a `get`/`is` method of getter shape) and one setter (a `set` method
/// of setter shape). Groups are visited in order of first declaration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodDiscovery;

impl Convention for MethodDiscovery {
    fn name(&self) -> &'static str {
        "MethodDiscovery"
    }

    fn apply(&self, mapper: &Mapper, builder: &mut EntityModelBuilder<'_>) -> MappingResult<()> {
        let arena = mapper.types();

        for (declaring, depth) in discovery_levels(builder) {
            let mut groups: IndexMap<String, Vec<&DeclaredMethod>> = IndexMap::new();
            for method in arena.get(declaring)?.methods() {
                if let Some(name) = property_name(method.name()) {
                    groups.entry(name).or_default().push(method);
                }
            }

            for (name, methods) in groups {
                let Some((getter, setter)) = accessor_pair(&methods) else {
                    log::trace!(
                        "skipping methods of {name} on {}: no single getter/setter pair",
                        arena.name(declaring)
                    );
                    continue;
                };
                let Some(declared) = getter.declared_type() else {
                    continue;
                };

                let suggested = TypeDescriptor::of(arena, declaring, declared);
                let descriptor = builder.type_descriptor(declaring, suggested, declared);
                let mut metadata = getter.metadata().clone();
                metadata.union(setter.metadata());

                let property = builder.add_property();
                property
                    .set_name(name)
                    .set_declaring_type(declaring)
                    .set_type_descriptor(descriptor)
                    .set_metadata(metadata)
                    .set_accessor(Accessor::method(getter.name(), setter.name(), depth));
                let mapped_name = property.discover_mapped_name(mapper.options())?;
                property.set_mapped_name(mapped_name);
            }
        }

        Ok(())
    }
}

/// Derives the property name of an accessor method, e.g. `getFirstName` to `firstName`.
fn property_name(method: &str) -> Option<String> {
    let stripped = match method.strip_prefix("get").or_else(|| method.strip_prefix("set")) {
        Some(rest) => rest,
        None => method.strip_prefix("is")?,
    };
    let mut chars = stripped.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

fn is_getter(method: &DeclaredMethod) -> bool {
    (method.name().starts_with("get") || method.name().starts_with("is"))
        && method.shape() == MethodShape::Getter
}

fn is_setter(method: &DeclaredMethod) -> bool {
    method.name().starts_with("set") && method.shape() == MethodShape::Setter
}

fn accessor_pair<'a>(methods: &[&'a DeclaredMethod]) -> Option<(&'a DeclaredMethod, &'a DeclaredMethod)> {
    if methods.len() != 2 {
        return None;
    }
    let getter = methods.iter().copied().find(|method| is_getter(method))?;
    let setter = methods.iter().copied().find(|method| is_setter(method))?;
    Some((getter, setter))
}
