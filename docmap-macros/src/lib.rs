//! Procedural macros for the docmap project.
//!
//! This crate provides `#[derive(Entity)]`, which implements the `Describe` and `Mappable`
//! traits of `docmap` for structs with named fields.
//!
//! # Container attributes
//!
//! `#[entity(..)]` marks the struct as a stored entity. Every key is optional:
//!
//! - `name = "Person"` - the registered type name (defaults to the struct name)
//! - `collection = "people"` - an explicit collection name
//! - `discriminator = "person"`, `discriminator_key = "kind"`, `use_discriminator = false`
//! - `embedded` - marks the struct as embedded instead of a stored entity
//! - `implements = "Named, Audited"` - interfaces defined elsewhere in the schema
//!
//! # Field attributes
//!
//! `#[mapping(..)]` configures one field:
//!
//! - `id`, `version`, `transient`, `embedded`
//! - `reference`, `lazy`, `id_only` - a reference to another entity
//! - `name = ".."` - the logical property name (defaults to the field name)
//! - `property = ".."` - the stored field name
//! - `tag = ".."` - a user-defined marker, repeatable
//! - `ty = ".."` - overrides the schema type expression inferred from the Rust type
//! - `parent` - the embedded value holding the members of the type this struct extends
//! - `skip` - leaves the field out of the mapping
//!
//! Embedded and referenced types, and the parent, are registered along with the struct.
//!
//! # Example
//!
//! ```rust,ignore
//! use docmap::Entity;
//!
//! #[derive(Debug, Default, Entity)]
//! #[entity(collection = "people")]
//! pub struct Person {
//!     #[mapping(id)]
//!     pub id: i32,
//!     pub name: String,
//! }
//!
//! #[derive(Debug, Default, Entity)]
//! pub struct Employee {
//!     #[mapping(parent)]
//!     pub person: Person,
//!     pub dept: String,
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmap_macros;

mod attrs;
mod entity;

use proc_macro::TokenStream;
use syn::{Data, DeriveInput, parse_macro_input};

use crate::entity::generate_entity_for_struct;

/// Derives `Describe` and `Mappable` for a struct with named fields.
///
/// # Errors
///
/// Emits a compile error for enums, unions and tuple structs, and for unknown or conflicting
/// attributes.
#[proc_macro_derive(Entity, attributes(entity, mapping))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let result = match &ast.data {
        Data::Struct(data) => generate_entity_for_struct(&ast, data),
        Data::Enum(_) | Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "Entity can only be derived for structs with named fields",
        )),
    };

    match result {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
