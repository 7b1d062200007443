//! Parsing of `#[entity(..)]` and `#[mapping(..)]` attributes.

use syn::{Attribute, Field, LitBool, LitStr, Meta, Result};

/// Container settings from `#[entity(..)]`.
#[derive(Default)]
pub(crate) struct EntityAttrs {
    /// `true` when the struct carries any `#[entity]` attribute.
    pub(crate) present: bool,
    pub(crate) name: Option<String>,
    pub(crate) collection: Option<String>,
    pub(crate) discriminator: Option<String>,
    pub(crate) discriminator_key: Option<String>,
    pub(crate) use_discriminator: Option<bool>,
    pub(crate) embedded: bool,
    pub(crate) implements: Vec<String>,
}

impl EntityAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("entity")) {
            parsed.present = true;
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    parsed.name = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("collection") {
                    parsed.collection = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("discriminator") {
                    parsed.discriminator = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("discriminator_key") {
                    parsed.discriminator_key = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("use_discriminator") {
                    parsed.use_discriminator = Some(meta.value()?.parse::<LitBool>()?.value());
                } else if meta.path.is_ident("embedded") {
                    parsed.embedded = true;
                } else if meta.path.is_ident("implements") {
                    let interfaces = meta.value()?.parse::<LitStr>()?.value();
                    parsed.implements.extend(
                        interfaces
                            .split(',')
                            .map(str::trim)
                            .filter(|name| !name.is_empty())
                            .map(str::to_string),
                    );
                } else {
                    return Err(meta.error("unknown entity attribute"));
                }
                Ok(())
            })?;
        }

        Ok(parsed)
    }

    /// Whether an `Entity` annotation is attached to the type.
    pub(crate) fn is_entity(&self) -> bool {
        self.present && !self.embedded
    }
}

/// Field settings from `#[mapping(..)]`.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) id: bool,
    pub(crate) name: Option<String>,
    pub(crate) property: Option<String>,
    pub(crate) reference: bool,
    pub(crate) lazy: bool,
    pub(crate) id_only: bool,
    pub(crate) version: bool,
    pub(crate) embedded: bool,
    pub(crate) transient: bool,
    pub(crate) tags: Vec<String>,
    pub(crate) parent: bool,
    pub(crate) skip: bool,
    pub(crate) ty: Option<String>,
}

impl FieldAttrs {
    pub(crate) fn parse(field: &Field) -> Result<Self> {
        let mut parsed = Self::default();

        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("mapping")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    parsed.id = true;
                } else if meta.path.is_ident("name") {
                    parsed.name = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("property") {
                    parsed.property = Some(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("reference") {
                    parsed.reference = true;
                } else if meta.path.is_ident("lazy") {
                    parsed.reference = true;
                    parsed.lazy = true;
                } else if meta.path.is_ident("id_only") {
                    parsed.reference = true;
                    parsed.id_only = true;
                } else if meta.path.is_ident("version") {
                    parsed.version = true;
                } else if meta.path.is_ident("embedded") {
                    parsed.embedded = true;
                } else if meta.path.is_ident("transient") {
                    parsed.transient = true;
                } else if meta.path.is_ident("tag") {
                    parsed.tags.push(meta.value()?.parse::<LitStr>()?.value());
                } else if meta.path.is_ident("parent") {
                    parsed.parent = true;
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else if meta.path.is_ident("ty") {
                    parsed.ty = Some(meta.value()?.parse::<LitStr>()?.value());
                } else {
                    return Err(meta.error("unknown mapping attribute"));
                }
                Ok(())
            })?;
        }

        if parsed.parent && (parsed.skip || parsed.id || parsed.reference || parsed.version) {
            return Err(syn::Error::new_spanned(
                field,
                "a parent field cannot carry other mapping attributes",
            ));
        }

        Ok(parsed)
    }
}
