//! Proc macros for Loreforge entity schemas.
//!
//! Provides `#[derive(Fields)]`, which turns a plain struct into a
//! key-addressed field table so generic code (sorting, filtering, editors,
//! AI field-assist) can read and write any entity by field name.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Fields)]
//! struct Location {
//!     #[field(meta)]
//!     meta: RecordMeta,
//!     /// Name
//!     name: String,
//!     /// Settlement type
//!     #[field(rename = "type")]
//!     kind: String,
//!     /// Population
//!     population: Option<i64>,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Field, Ident, Lit, LitStr, Meta};

/// Derive macro for the `Fields` trait.
///
/// # Attributes
///
/// - `#[field(meta)]` - The `RecordMeta` field (exactly one required)
/// - `#[field(rename = "...")]` - Override the field key (defaults to the camelCase field name)
/// - `#[field(no_assist)]` - Exclude the field from AI field-assist
/// - `#[field(skip)]` - Leave the field out of the table entirely
///
/// The first line of a field's doc comment becomes its display label.
#[proc_macro_derive(Fields, attributes(field))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_fields(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Parsed `#[field(...)]` options for one struct field.
#[derive(Default)]
struct FieldOptions {
    meta: bool,
    skip: bool,
    no_assist: bool,
    rename: Option<String>,
}

fn expand_fields(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Fields derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Fields derive only supports structs",
            ))
        }
    };

    let mut meta_ident: Option<&Ident> = None;
    let mut spec_tokens = Vec::new();
    let mut getter_arms = Vec::new();
    let mut setter_arms = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let options = parse_field_options(field)?;

        if options.meta {
            if meta_ident.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked #[field(meta)]",
                ));
            }
            meta_ident = Some(ident);
            continue;
        }
        if options.skip {
            continue;
        }

        let key = options
            .rename
            .clone()
            .unwrap_or_else(|| to_camel_case(&ident.to_string()));
        let doc = get_doc_comment(&field.attrs);
        let label = if doc.is_empty() { humanize(&key) } else { doc };
        let assist = !options.no_assist;
        let ty = &field.ty;

        spec_tokens.push(quote! {
            ::lore_core::world::FieldSpec {
                key: #key,
                label: #label,
                kind: <#ty as ::lore_core::world::FieldType>::KIND,
                assist: #assist,
            }
        });

        getter_arms.push(quote! {
            #key => Some(::lore_core::world::FieldType::as_value(&self.#ident)),
        });

        setter_arms.push(quote! {
            #key => {
                self.#ident = <#ty as ::lore_core::world::FieldType>::parse(key, value)?;
                Ok(())
            }
        });
    }

    let Some(meta_ident) = meta_ident else {
        return Err(syn::Error::new_spanned(
            &input,
            "Fields derive requires one field marked #[field(meta)]",
        ));
    };

    Ok(quote! {
        impl ::lore_core::world::Fields for #struct_name {
            fn field_specs() -> &'static [::lore_core::world::FieldSpec]
            where
                Self: Sized,
            {
                const SPECS: &[::lore_core::world::FieldSpec] = &[#(#spec_tokens),*];
                SPECS
            }

            fn specs(&self) -> &'static [::lore_core::world::FieldSpec] {
                <Self as ::lore_core::world::Fields>::field_specs()
            }

            fn field(&self, key: &str) -> Option<::lore_core::world::FieldValue<'_>> {
                match key {
                    #(#getter_arms)*
                    _ => None,
                }
            }

            fn set_field(
                &mut self,
                key: &str,
                value: &str,
            ) -> Result<(), ::lore_core::world::FieldError> {
                match key {
                    #(#setter_arms)*
                    _ => Err(::lore_core::world::FieldError::Unknown(key.to_string())),
                }
            }

            fn meta(&self) -> &::lore_core::world::RecordMeta {
                &self.#meta_ident
            }

            fn meta_mut(&mut self) -> &mut ::lore_core::world::RecordMeta {
                &mut self.#meta_ident
            }
        }
    })
}

fn parse_field_options(field: &Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("meta") {
                options.meta = true;
            } else if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("no_assist") {
                options.no_assist = true;
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
            } else {
                return Err(meta.error("unsupported field attribute"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    for attr in attrs {
        if attr.path().is_ident("doc") {
            if let Meta::NameValue(nv) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &nv.value {
                    if let Lit::Str(s) = &expr_lit.lit {
                        let line = s.value().trim().trim_end_matches('.').to_string();
                        if !line.is_empty() {
                            return line;
                        }
                    }
                }
            }
        }
    }
    String::new()
}

fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut upper_next = false;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            result.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// `notableFeatures` -> `Notable features`
fn humanize(key: &str) -> String {
    let mut result = String::new();
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            result.push(c.to_ascii_uppercase());
        } else if c.is_uppercase() {
            result.push(' ');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("name"), "name");
        assert_eq!(to_camel_case("notable_features"), "notableFeatures");
        assert_eq!(to_camel_case("founded_year"), "foundedYear");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("notableFeatures"), "Notable features");
        assert_eq!(humanize("type"), "Type");
    }
}
