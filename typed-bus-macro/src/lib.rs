/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

#![forbid(unsafe_code)]

//! Typed Bus Macro Library
//!
//! Procedural macros for the typed bus.
//!
//! # Contract Macro
//!
//! The [`bus_contract`] attribute declares a type as a bus payload contract:
//!
//! ```ignore
//! // Name defaults to the type identifier, namespace to the module path
//! #[bus_contract]
//! pub struct Ping;
//!
//! // Explicit, stable wire identity
//! #[bus_contract(name = "Person", namespace = "urn:people")]
//! pub struct Person {
//!     pub id: u32,
//! }
//! ```

use proc_macro::TokenStream;

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, LitStr};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.segments.last().is_some_and(|segment| segment.ident == trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Options parsed from `#[bus_contract(...)]`.
#[derive(Default)]
struct ContractConfig {
    name: Option<LitStr>,
    namespace: Option<LitStr>,
}

impl ContractConfig {
    fn parse(attr: TokenStream) -> syn::Result<Self> {
        let mut config = Self::default();
        let parser = syn::meta::parser(|meta| {
            let slot = if meta.path.is_ident("name") {
                &mut config.name
            } else if meta.path.is_ident("namespace") {
                &mut config.namespace
            } else {
                return Err(meta.error("unsupported bus_contract property; expected `name` or `namespace`"));
            };
            let value: LitStr = meta.value()?.parse()?;
            if value.value().is_empty() {
                return Err(syn::Error::new(value.span(), "contract identity must not be empty"));
            }
            *slot = Some(value);
            Ok(())
        });
        syn::parse::Parser::parse(parser, attr)?;
        Ok(config)
    }
}

/// Declares a type as a bus data contract.
///
/// The attribute implements `typed_bus::DataContract` for the type, which gives
/// it the `(name, namespace)` identity stamped on every frame that carries it.
///
/// # Options
///
/// * `name = "..."`: the contract name. Defaults to the type identifier.
/// * `namespace = "..."`: the contract namespace. Defaults to the declaring
///   module path.
///
/// Empty strings are rejected at compile time.
///
/// # Expansion
///
/// - `#[derive(Clone, Debug, Serialize, Deserialize)]` for whichever of these is
///   not already derived; serde is reached through `typed_bus`, so callers need
///   no direct serde dependency.
/// - `impl typed_bus::DataContract`.
/// - A compile-time assertion that the type is `Send + Sync + 'static`.
///
/// ```ignore
/// use typed_bus::prelude::*;
///
/// #[bus_contract(namespace = "urn:people")]
/// pub struct Person {
///     pub id: u32,
/// }
///
/// assert_eq!(<Person as DataContract>::NAME, "Person");
/// ```
#[proc_macro_attribute]
pub fn bus_contract(attr: TokenStream, item: TokenStream) -> TokenStream {
    let config = match ContractConfig::parse(attr) {
        Ok(config) => config,
        Err(e) => return e.to_compile_error().into(),
    };

    let input = parse_macro_input!(item as DeriveInput);

    let ident = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let derives = {
        let mut traits: Vec<TokenStream2> = Vec::new();
        if !has_derive(&input, "Clone") {
            traits.push(quote!(Clone));
        }
        if !has_derive(&input, "Debug") {
            traits.push(quote!(Debug));
        }
        let mut serde_traits: Vec<TokenStream2> = Vec::new();
        if !has_derive(&input, "Serialize") {
            serde_traits.push(quote!(::typed_bus::serde::Serialize));
        }
        if !has_derive(&input, "Deserialize") {
            serde_traits.push(quote!(::typed_bus::serde::Deserialize));
        }
        let serde_crate = if serde_traits.is_empty() {
            quote!()
        } else {
            quote!(#[serde(crate = "::typed_bus::serde")])
        };
        traits.extend(serde_traits);
        if traits.is_empty() {
            quote!(#serde_crate)
        } else {
            quote! {
                #[derive(#(#traits),*)]
                #serde_crate
            }
        }
    };

    let contract_name = config.name.unwrap_or_else(|| {
        let bare = ident.to_string();
        let bare = bare.strip_prefix("r#").unwrap_or(&bare).to_string();
        LitStr::new(&bare, ident.span())
    });
    let contract_namespace = config
        .namespace
        .map_or_else(|| quote!(::core::module_path!()), |namespace| quote!(#namespace));

    let assert_ident = quote::format_ident!("_AssertBusContract_{}", ident);

    let expanded = quote! {
        #derives
        #input

        impl #impl_generics ::typed_bus::DataContract for #ident #ty_generics #where_clause {
            const NAME: &'static str = #contract_name;
            const NAMESPACE: &'static str = #contract_namespace;
        }

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#ident #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
