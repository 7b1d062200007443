use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Fields, GenericArgument, Ident, PathArguments, Result, Type, parse_quote};

use crate::attrs::{EntityAttrs, FieldAttrs};

const SCALARS: [&str; 15] = [
    "String", "str", "bool", "u8", "i16", "i32", "i64", "f32", "f64", "char", "ObjectId", "Uuid", "DateTime",
    "Document", "Bson",
];

struct MappedField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    logical: String,
    schema_ty: String,
    annotations: Vec<TokenStream>,
}

pub(crate) fn generate_entity_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(ast, "only structs with named fields are supported"));
    };

    let name = &ast.ident;
    let entity = EntityAttrs::parse(&ast.attrs)?;
    let type_name = entity.name.clone().unwrap_or_else(|| name.to_string());
    let params: Vec<String> = ast.generics.type_params().map(|param| param.ident.to_string()).collect();

    let mut fields = Vec::new();
    let mut parent: Option<(&Ident, &Type)> = None;
    let mut registrations = Vec::new();

    for field in &named.named {
        let attrs = FieldAttrs::parse(field)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        if attrs.skip {
            continue;
        }
        if attrs.parent {
            if parent.is_some() {
                return Err(syn::Error::new_spanned(field, "only one parent field is allowed"));
            }
            parent = Some((ident, &field.ty));
            continue;
        }

        if attrs.embedded || attrs.reference {
            if let Some(element) = element_type(&field.ty, &params) {
                registrations.push(quote! { schema.register::<#element>(); });
            }
        }

        fields.push(MappedField {
            ident,
            ty: &field.ty,
            logical: attrs.name.clone().unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string()),
            schema_ty: attrs.ty.clone().unwrap_or_else(|| schema_type(&field.ty, &params)),
            annotations: field_annotations(&attrs),
        });
    }

    let describe = generate_describe(ast, &entity, &type_name, &params, &fields, parent, &registrations);
    let mappable = generate_mappable(ast, &fields, parent);

    Ok(quote! {
        #describe
        #mappable
    })
}

fn field_annotations(attrs: &FieldAttrs) -> Vec<TokenStream> {
    let mut annotations = Vec::new();

    if attrs.id {
        annotations.push(quote! { ::docmap::metadata::Annotation::Id });
    }

    if attrs.reference {
        let mut reference = quote! { ::docmap::metadata::ReferenceAnnotation::new() };
        if let Some(mapped) = &attrs.property {
            reference = quote! { #reference.with_name(#mapped) };
        }
        if attrs.lazy {
            reference = quote! { #reference.lazy() };
        }
        if attrs.id_only {
            reference = quote! { #reference.id_only() };
        }
        annotations.push(quote! { ::docmap::metadata::Annotation::Reference(#reference) });
    } else if attrs.version {
        let mapped = match &attrs.property {
            Some(mapped) => quote! { ::core::option::Option::Some(#mapped.to_string()) },
            None => quote! { ::core::option::Option::None },
        };
        annotations.push(quote! { ::docmap::metadata::Annotation::Version { name: #mapped } });
    } else if let Some(mapped) = &attrs.property {
        annotations.push(quote! { ::docmap::metadata::Annotation::property(#mapped) });
    }

    if attrs.reference && attrs.version {
        annotations.push(quote! { ::docmap::metadata::Annotation::version() });
    }
    if attrs.embedded {
        annotations.push(quote! { ::docmap::metadata::Annotation::Embedded });
    }
    if attrs.transient {
        annotations.push(quote! { ::docmap::metadata::Annotation::Transient });
    }
    for tag in &attrs.tags {
        annotations.push(quote! { ::docmap::metadata::Annotation::tag(#tag) });
    }

    annotations
}

fn generate_describe(
    ast: &DeriveInput,
    entity: &EntityAttrs,
    type_name: &str,
    params: &[String],
    fields: &[MappedField<'_>],
    parent: Option<(&Ident, &Type)>,
    registrations: &[TokenStream],
) -> TokenStream {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let extends = parent.map(|(_, parent_ty)| {
        let args = type_arguments(parent_ty)
            .iter()
            .map(|arg| schema_type(arg, params))
            .collect::<Vec<_>>()
            .join(", ");
        if args.is_empty() {
            quote! { .extends(<#parent_ty as ::docmap::Describe>::type_name()) }
        } else {
            quote! { .extends(::std::format!("{}<{}>", <#parent_ty as ::docmap::Describe>::type_name(), #args)) }
        }
    });
    let register_parent = parent.map(|(_, parent_ty)| quote! { schema.register::<#parent_ty>(); });

    let mut type_annotations = Vec::new();
    if entity.is_entity() {
        let mut annotation = quote! { ::docmap::metadata::EntityAnnotation::new() };
        if let Some(collection) = &entity.collection {
            annotation = quote! { #annotation.with_collection(#collection) };
        }
        if let Some(discriminator) = &entity.discriminator {
            annotation = quote! { #annotation.with_discriminator(#discriminator) };
        }
        if let Some(key) = &entity.discriminator_key {
            annotation = quote! { #annotation.with_discriminator_key(#key) };
        }
        if let Some(use_discriminator) = entity.use_discriminator {
            annotation = quote! { #annotation.with_use_discriminator(#use_discriminator) };
        }
        type_annotations.push(quote! { ::docmap::metadata::Annotation::Entity(#annotation) });
    }
    if entity.embedded {
        type_annotations.push(quote! { ::docmap::metadata::Annotation::Embedded });
    }

    let implements = &entity.implements;
    let field_defs = fields.iter().map(|field| {
        let logical = &field.logical;
        let schema_ty = &field.schema_ty;
        let annotations = &field.annotations;
        quote! {
            ::docmap::schema::FieldDef::new(#logical, #schema_ty)
                #(.annotate(#annotations))*
        }
    });

    quote! {
        impl #impl_generics ::docmap::Describe for #name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #type_name
            }

            fn describe(schema: &mut ::docmap::schema::SchemaBuilder) {
                let def = ::docmap::schema::TypeDef::class(#type_name)
                    #(.type_param(#params))*
                    #extends
                    #(.implements(#implements))*
                    #(.annotate(#type_annotations))*
                    #(.field(#field_defs))*;
                schema.define(def);
                #register_parent
                #(#registrations)*
            }
        }
    }
}

fn generate_mappable(ast: &DeriveInput, fields: &[MappedField<'_>], parent: Option<(&Ident, &Type)>) -> TokenStream {
    let name = &ast.ident;
    let mut generics = ast.generics.clone();
    let bounded: Vec<Ident> = generics.type_params().map(|param| param.ident.clone()).collect();
    {
        let where_clause = generics.make_where_clause();
        for param in &bounded {
            where_clause.predicates.push(parse_quote! { #param: ::docmap::BsonValue });
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let reads = fields.iter().map(|field| {
        let ident = field.ident;
        let logical = &field.logical;
        quote! { #logical => ::core::option::Option::Some(::docmap::BsonValue::to_bson(&self.#ident)), }
    });
    let writes = fields.iter().map(|field| {
        let ident = field.ident;
        let ty = field.ty;
        let logical = &field.logical;
        quote! {
            #logical => ::core::option::Option::Some(
                <#ty as ::docmap::BsonValue>::from_bson(value).map(|converted| self.#ident = converted)
            ),
        }
    });

    let parent_methods = parent.map(|(ident, _)| {
        quote! {
            fn parent(&self) -> ::core::option::Option<&dyn ::docmap::Mappable> {
                ::core::option::Option::Some(&self.#ident)
            }

            fn parent_mut(&mut self) -> ::core::option::Option<&mut dyn ::docmap::Mappable> {
                ::core::option::Option::Some(&mut self.#ident)
            }
        }
    });

    quote! {
        impl #impl_generics ::docmap::Mappable for #name #ty_generics #where_clause {
            fn read_field(
                &self,
                field: &str,
            ) -> ::core::option::Option<::docmap::error::MappingResult<::docmap::bson::Bson>> {
                match field {
                    #(#reads)*
                    _ => ::core::option::Option::None,
                }
            }

            fn write_field(
                &mut self,
                field: &str,
                value: ::docmap::bson::Bson,
            ) -> ::core::option::Option<::docmap::error::MappingResult<()>> {
                match field {
                    #(#writes)*
                    _ => {
                        let _ = value;
                        ::core::option::Option::None
                    }
                }
            }

            #parent_methods
        }
    }
}

fn type_arguments(ty: &Type) -> Vec<&Type> {
    let Type::Path(path) = ty else {
        return Vec::new();
    };
    let Some(segment) = path.path.segments.last() else {
        return Vec::new();
    };
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return Vec::new();
    };
    arguments
        .args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect()
}

/// Renders a Rust type as a schema type expression.
fn schema_type(ty: &Type, params: &[String]) -> String {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            let Some(segment) = path.path.segments.last() else {
                return "Object".to_string();
            };
            let name = segment.ident.to_string();
            if path.path.segments.len() == 1 && params.contains(&name) {
                return name;
            }

            let args = type_arguments(ty);
            let render = |ty: &Type| schema_type(ty, params);
            match (name.as_str(), args.as_slice()) {
                ("Option" | "Box" | "Arc" | "Rc", [inner]) => render(*inner),
                ("Vec" | "VecDeque" | "LinkedList", [inner]) => format!("List<{}>", render(*inner)),
                ("HashSet" | "BTreeSet" | "IndexSet", [inner]) => format!("Set<{}>", render(*inner)),
                ("HashMap" | "BTreeMap" | "IndexMap", [key, value]) => {
                    format!("Map<{}, {}>", render(*key), render(*value))
                }
                ("String" | "str", _) => "String".to_string(),
                ("DateTime", _) => "DateTime".to_string(),
                ("Bson", _) => "Object".to_string(),
                (_, []) => name,
                (_, args) => format!(
                    "{name}<{}>",
                    args.iter().map(|arg| render(*arg)).collect::<Vec<_>>().join(", ")
                ),
            }
        }
        Type::Array(array) => format!("[{}]", schema_type(&array.elem, params)),
        Type::Slice(slice) => format!("[{}]", schema_type(&slice.elem, params)),
        Type::Reference(reference) => schema_type(&reference.elem, params),
        Type::Paren(paren) => schema_type(&paren.elem, params),
        Type::Group(group) => schema_type(&group.elem, params),
        _ => "Object".to_string(),
    }
}

/// Returns the described type stored by an embedded or referenced field, looking through
/// options, boxes, collections and the values of maps.
fn element_type<'a>(ty: &'a Type, params: &[String]) -> Option<&'a Type> {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            let segment = path.path.segments.last()?;
            let name = segment.ident.to_string();
            let args = type_arguments(ty);
            match (name.as_str(), args.as_slice()) {
                (
                    "Option" | "Box" | "Arc" | "Rc" | "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet"
                    | "IndexSet",
                    [inner],
                ) => element_type(*inner, params),
                ("HashMap" | "BTreeMap" | "IndexMap", [_, value]) => element_type(*value, params),
                _ if SCALARS.contains(&name.as_str()) => None,
                _ if path.path.segments.len() == 1 && params.contains(&name) => None,
                _ => Some(ty),
            }
        }
        Type::Array(array) => element_type(&array.elem, params),
        Type::Slice(slice) => element_type(&slice.elem, params),
        Type::Reference(reference) => element_type(&reference.elem, params),
        Type::Paren(paren) => element_type(&paren.elem, params),
        Type::Group(group) => element_type(&group.elem, params),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(ty: Type) -> String {
        schema_type(&ty, &["T".to_string()])
    }

    #[test]
    fn test_schema_type_rendering() {
        assert_eq!(render(parse_quote!(i32)), "i32");
        assert_eq!(render(parse_quote!(Option<String>)), "String");
        assert_eq!(render(parse_quote!(Vec<Address>)), "List<Address>");
        assert_eq!(render(parse_quote!(std::collections::HashMap<String, Vec<T>>)), "Map<String, List<T>>");
        assert_eq!(render(parse_quote!([f64; 3])), "[f64]");
        assert_eq!(render(parse_quote!(Box<[u8]>)), "[u8]");
        assert_eq!(render(parse_quote!(chrono::DateTime<chrono::Utc>)), "DateTime");
        assert_eq!(render(parse_quote!(Wrapper<T, i64>)), "Wrapper<T, i64>");
    }

    #[test]
    fn test_element_type_looks_through_containers() {
        let params = ["T".to_string()];
        let element = |ty: Type| element_type(&ty, &params).map(|ty| quote!(#ty).to_string());

        assert_eq!(element(parse_quote!(Option<Address>)), Some("Address".to_string()));
        assert_eq!(element(parse_quote!(HashMap<String, Vec<Book>>)), Some("Book".to_string()));
        assert_eq!(element(parse_quote!(Vec<String>)), None);
        assert_eq!(element(parse_quote!(Option<T>)), None);
    }
}
