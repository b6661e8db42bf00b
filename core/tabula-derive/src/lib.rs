//! Tabula Derive: procedural macros for tabula.
//!
//! Provides `#[derive(Model)]`, which registers a struct's property
//! definitions with the adapter.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericArgument, PathArguments, Type, parse_macro_input};

/// Derive macro for model definitions.
///
/// # Example
///
/// ```ignore
/// #[derive(Model)]
/// #[tabula(model_name = "Person")]
/// pub struct User {
///     pub id: Option<String>,
///     pub name: String,
///     #[tabula(datatype = "text")]
///     pub bio: String,
///     pub created_at: DateTime<Utc>,
/// }
/// ```
///
/// Generates an `impl tabula_core::Model` with:
/// - `MODEL_NAME` (the struct name unless overridden)
/// - `definition()` listing every field except `id`
///
/// Datatypes are inferred from field types (`Option` is looked through) and
/// can be overridden per field with `#[tabula(datatype = "...")]`.
#[proc_macro_derive(Model, attributes(tabula))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let model_name = tabula_attr(&input.attrs, "model_name")?.unwrap_or_else(|| name.to_string());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Model can only be derived for structs",
            ));
        }
    };

    let mut properties = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else { continue };
        let field_name = ident.to_string();
        if field_name == "id" {
            continue;
        }
        let datatype = match tabula_attr(&field.attrs, "datatype")? {
            Some(explicit) => datatype_from_name(&explicit).ok_or_else(|| {
                syn::Error::new_spanned(ident, format!("unknown datatype '{explicit}'"))
            })?,
            None => infer_datatype(&field.ty),
        };
        let variant = syn::Ident::new(datatype, ident.span());
        properties.push(quote! {
            .property(#field_name, tabula_core::DataType::#variant)
        });
    }

    Ok(quote! {
        impl tabula_core::Model for #name {
            const MODEL_NAME: &'static str = #model_name;

            fn definition() -> tabula_core::ModelDefinition {
                tabula_core::ModelDefinition::new(#model_name)
                    #(#properties)*
            }
        }
    })
}

/// `#[tabula(key = "value")]`
fn tabula_attr(attrs: &[syn::Attribute], key: &str) -> syn::Result<Option<String>> {
    for attr in attrs {
        if !attr.path().is_ident("tabula") {
            continue;
        }
        let meta = attr.parse_args::<syn::Meta>()?;
        if let syn::Meta::NameValue(nv) = meta
            && nv.path.is_ident(key)
            && let syn::Expr::Lit(lit) = nv.value
            && let syn::Lit::Str(s) = lit.lit
        {
            return Ok(Some(s.value()));
        }
    }
    Ok(None)
}

fn datatype_from_name(name: &str) -> Option<&'static str> {
    match name {
        "string" => Some("String"),
        "text" => Some("Text"),
        "int" => Some("Int"),
        "number" => Some("Number"),
        "boolean" => Some("Boolean"),
        "datetime" => Some("Datetime"),
        "date" => Some("Date"),
        "object" => Some("Object"),
        _ => None,
    }
}

fn infer_datatype(ty: &Type) -> &'static str {
    let Type::Path(path) = ty else {
        return "Object";
    };
    let Some(segment) = path.path.segments.last() else {
        return "Object";
    };
    match segment.ident.to_string().as_str() {
        "Option" => match &segment.arguments {
            PathArguments::AngleBracketed(args) => match args.args.first() {
                Some(GenericArgument::Type(inner)) => infer_datatype(inner),
                _ => "Object",
            },
            _ => "Object",
        },
        "String" | "str" => "String",
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "isize" | "usize" => "Int",
        "f32" | "f64" => "Number",
        "bool" => "Boolean",
        "DateTime" | "NaiveDateTime" => "Datetime",
        "NaiveDate" => "Date",
        _ => "Object",
    }
}
