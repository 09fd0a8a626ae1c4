use crate::{Codegen, param_idents};
use autojson_schema::{naming::constant_name, prelude::*};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

/// Emit the data record for a simple schema.
#[must_use]
pub fn generate(cg: &Codegen<'_>, schema: &RecordSchema) -> TokenStream {
    let ident = cg.record_ident(&schema.def);
    let params = param_idents(&schema.generics);
    let (impl_generics, ty_generics) = if params.is_empty() {
        (quote!(), quote!())
    } else {
        (
            quote!(<#(#params: ::autojson::FieldValue),*>),
            quote!(<#(#params),*>),
        )
    };

    // `FieldValue` already implies the serde bounds; derived ones would be ambiguous
    let serde = if params.is_empty() {
        quote!(#[serde(crate = "::autojson::__reexports::serde")])
    } else {
        quote!(#[serde(crate = "::autojson::__reexports::serde", bound = "")])
    };

    let doc = format!("Record generated from [`{}`].", schema.def);
    let fields = schema.fields.iter().map(field);
    let inherent = inherent(schema);
    let impls = schema
        .impls
        .iter()
        .map(|imp| trait_impl(&ident, imp, &impl_generics, &ty_generics));
    let shape = shape(schema);

    quote! {
        #[doc = #doc]
        #[derive(
            Clone,
            Debug,
            PartialEq,
            ::autojson::__reexports::serde::Serialize,
            ::autojson::__reexports::serde::Deserialize,
        )]
        #serde
        pub struct #ident #impl_generics {
            #(#fields,)*
        }

        impl #impl_generics #ident #ty_generics {
            #inherent
        }

        #(#impls)*

        impl #impl_generics ::autojson::Record for #ident #ty_generics {
            fn schema_name(&self) -> &'static str {
                <Self as ::autojson::RecordShape>::SCHEMA
            }

            fn wire_names(&self) -> &'static [&'static str] {
                <Self as ::autojson::RecordShape>::WIRE_NAMES
            }

            fn to_tree(
                &self,
            ) -> ::core::result::Result<
                ::autojson::__reexports::serde_json::Value,
                ::autojson::__reexports::serde_json::Error,
            > {
                ::autojson::__reexports::serde_json::to_value(self)
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }

        impl #impl_generics ::autojson::RecordShape for #ident #ty_generics {
            #shape
        }
    }
}

// field
// optional fields are defaulted on input and omitted on output when absent
fn field(field: &FieldDescriptor) -> TokenStream {
    let ident = format_ident!("{}", field.ident);
    let ty = &field.ty;
    let wire = &field.wire_name;

    let serde = if field.optional {
        quote!(#[serde(
            rename = #wire,
            default,
            skip_serializing_if = "::core::option::Option::is_none"
        )])
    } else {
        quote!(#[serde(rename = #wire)])
    };

    quote!(#serde #ident: #ty)
}

fn inherent(schema: &RecordSchema) -> TokenStream {
    let consts = schema.fields.iter().map(|field| {
        let constant = format_ident!("{}", constant_name(&field.wire_name));
        let wire = &field.wire_name;
        let doc = format!("Wire name of `{}`.", field.ident);

        quote! {
            #[doc = #doc]
            pub const #constant: &'static str = #wire;
        }
    });

    let idents = schema
        .fields
        .iter()
        .map(|field| format_ident!("{}", field.ident))
        .collect::<Vec<_>>();
    let types = schema.fields.iter().map(|field| &field.ty);

    quote! {
        #(#consts)*

        #[allow(clippy::too_many_arguments)]
        #[must_use]
        pub fn new(#(#idents: #types),*) -> Self {
            Self { #(#idents),* }
        }
    }
}

fn trait_impl(
    ident: &Ident,
    imp: &TraitImpl,
    impl_generics: &TokenStream,
    ty_generics: &TokenStream,
) -> TokenStream {
    let def = &imp.def;
    let args = &imp.args;
    let target = if args.is_empty() {
        quote!(#def)
    } else {
        quote!(#def<#(#args),*>)
    };

    let methods = imp.accessors.iter().map(|accessor| {
        let method = format_ident!("{}", accessor.ident);
        let field = format_ident!("{}", accessor.field);
        let ret = &accessor.ret;
        let body = match accessor.access {
            Access::Borrowed => quote!(&self.#field),
            Access::Owned => quote!(self.#field.clone()),
        };

        quote! {
            fn #method(&self) -> #ret {
                #body
            }
        }
    });

    quote! {
        #[allow(clippy::clone_on_copy)]
        impl #impl_generics #target for #ident #ty_generics {
            #(#methods)*
        }
    }
}

fn shape(schema: &RecordSchema) -> TokenStream {
    let path = schema.def.path();
    let wires = schema.fields.iter().map(|field| &field.wire_name);

    quote! {
        const SCHEMA: &'static str = #path;
        const WIRE_NAMES: &'static [&'static str] = &[#(#wires),*];
    }
}
