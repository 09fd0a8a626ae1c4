//! Attribute macros for schema traits.
//!
//! Generation happens in the build script; these macros only validate their
//! arguments and keep the declarations compiling:
//! * `#[record]` / `#[record(designator = Kind)]` - a generation root
//! * `#[schema]` - an ancestor that carries `#[wire]` helpers
//! * `#[variant_type]` - the designator method naming each variant schema

use autojson_schema::attr::{RecordArgs, strip_helpers, wire_name};
use darling::Error as DarlingError;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{ItemTrait, TraitItem, TypeParamBound, parse_macro_input, parse_quote};

/// Marks a trait as a generation root and adds the `Record` supertrait.
///
/// ```ignore
/// #[record(designator = ShapeKind)]
/// pub trait Shape {
///     #[wire(name = "type")]
///     fn kind(&self) -> ShapeKind;
/// }
/// ```
#[proc_macro_attribute]
pub fn record(attr: TokenStream, item: TokenStream) -> TokenStream {
    // Phase 1: arguments.
    if let Err(err) = RecordArgs::from_tokens(attr.into()) {
        return err.write_errors().into();
    }

    // Phase 2: helpers.
    let mut input = parse_macro_input!(item as ItemTrait);
    if let Err(err) = check_helpers(&mut input) {
        return err.write_errors().into();
    }

    // Phase 3: supertrait.
    let bound: TypeParamBound = parse_quote!(::autojson::Record);
    if input.colon_token.is_none() {
        input.colon_token = Some(parse_quote!(:));
    }
    input.supertraits.push(bound);

    quote!(#input).into()
}

/// Marks an ancestor trait; strips `#[wire]` helpers.
#[proc_macro_attribute]
pub fn schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    if !attr.is_empty() {
        return syn::Error::new_spanned(attr, "`#[schema]` takes no arguments")
            .to_compile_error()
            .into();
    }

    let mut input = parse_macro_input!(item as ItemTrait);
    if let Err(err) = check_helpers(&mut input) {
        return err.write_errors().into();
    }

    quote!(#input).into()
}

/// Marks the designator method; read by the build script only.
#[proc_macro_attribute]
pub fn variant_type(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    if !attr.is_empty() {
        let mut out = syn::Error::new_spanned(attr, "`#[variant_type]` takes no arguments").to_compile_error();
        out.extend(TokenStream2::from(item));
        return out.into();
    }

    item
}

// check_helpers
// validates every `#[wire]` helper, then removes them from the trait
fn check_helpers(input: &mut ItemTrait) -> Result<(), DarlingError> {
    let mut errors = DarlingError::accumulator();

    for item in &mut input.items {
        let TraitItem::Fn(method) = item else { continue };

        errors.handle(wire_name(&method.attrs).map_err(DarlingError::from));
        strip_helpers(&mut method.attrs);
    }

    errors.finish()
}
