#![deny(missing_docs)]

//! # OAS Params Derive
//!
//! `#[derive(ParamRecord)]`: implements `oas_params_core::Record` (field
//! declarations and accessors) and `ParamField` for a struct with named
//! fields.
//!
//! Fields take at most one of:
//! - `#[param("name,in=query,style=form,explode=true,required,omitempty")]`
//! - `#[param("-")]` to skip the field
//! - `#[body("multipart,required")]`
//!
//! Only `pub` fields (any `pub(..)` form) are declared; private fields are
//! left at their default and never touched by the codec.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Derives `Record` and `ParamField` for a struct with named fields.
#[proc_macro_derive(ParamRecord, attributes(param, body))]
pub fn derive_param_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct FieldInfo<'a> {
    ident: &'a syn::Ident,
    ty: &'a syn::Type,
    name: String,
    annotation: TokenStream2,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "ParamRecord does not support generic records",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "ParamRecord can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "ParamRecord requires named fields",
        ));
    };

    let fields = named
        .named
        .iter()
        .filter(|field| !matches!(field.vis, syn::Visibility::Inherited))
        .map(|field| {
            let ident = field
                .ident
                .as_ref()
                .ok_or_else(|| syn::Error::new_spanned(field, "field has no name"))?;
            Ok(FieldInfo {
                ident,
                ty: &field.ty,
                name: ident.unraw().to_string(),
                annotation: annotation(field)?,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let ident = &input.ident;
    let type_name = ident.unraw().to_string();
    let decls = fields.iter().map(|f| {
        let (ty, name, annotation) = (f.ty, &f.name, &f.annotation);
        quote! {
            ::oas_params_core::FieldDecl::of::<#ty>(#name, #annotation)
        }
    });
    let refs = fields.iter().map(|f| {
        let (field, name) = (f.ident, &f.name);
        quote! {
            #name => ::std::option::Option::Some(&self.#field as &dyn ::oas_params_core::ParamField),
        }
    });
    let muts = fields.iter().map(|f| {
        let (field, name) = (f.ident, &f.name);
        quote! {
            #name => ::std::option::Option::Some(&mut self.#field as &mut dyn ::oas_params_core::ParamField),
        }
    });

    Ok(quote! {
        impl ::oas_params_core::Record for #ident {
            fn type_name() -> &'static str {
                #type_name
            }

            fn declare_fields() -> ::std::vec::Vec<::oas_params_core::FieldDecl> {
                ::std::vec![#(#decls),*]
            }

            fn field(&self, name: &str) -> ::std::option::Option<&dyn ::oas_params_core::ParamField> {
                match name {
                    #(#refs)*
                    _ => ::std::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::std::option::Option<&mut dyn ::oas_params_core::ParamField> {
                match name {
                    #(#muts)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        ::oas_params_core::impl_record_field!(#ident);
    })
}

/// The `Annotation` expression for one field.
fn annotation(field: &syn::Field) -> syn::Result<TokenStream2> {
    let mut found: Option<TokenStream2> = None;
    for attr in &field.attrs {
        let variant = if attr.path().is_ident("param") {
            quote!(Param)
        } else if attr.path().is_ident("body") {
            quote!(Body)
        } else {
            continue;
        };
        if found.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "a field takes at most one #[param] or #[body] annotation",
            ));
        }
        let text: LitStr = attr.parse_args()?;
        found = Some(quote!(::oas_params_core::Annotation::#variant(#text)));
    }
    Ok(found.unwrap_or_else(|| quote!(::oas_params_core::Annotation::None)))
}
