use crate::{Codegen, instance_args, param_idents};
use autojson_schema::prelude::*;
use proc_macro2::{Ident, TokenStream};
use quote::quote;

/// Emit the decoder for a resolved schema.
#[must_use]
pub fn generate(cg: &Codegen<'_>, schema: &RecordSchema) -> TokenStream {
    match &schema.kind {
        SchemaKind::Simple => simple(cg, schema),
        SchemaKind::Polymorphic(tag) => polymorphic(cg, schema, tag),
    }
}

/// Emit a no-op decoder for a schema that failed generation.
#[must_use]
pub fn stub(cg: &Codegen<'_>, def: &Def) -> TokenStream {
    let ident = cg.decoder_ident(def);
    let doc = format!("Generation failed for [`{def}`]; this decoder resolves nothing.");

    quote! {
        #[doc = #doc]
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #ident;

        impl #ident {
            #[must_use]
            pub const fn new() -> Self {
                Self
            }
        }

        impl<T: ?Sized> ::autojson::Decode<T> for #ident {
            fn decode(
                &self,
                _tree: &::autojson::__reexports::serde_json::Value,
                _ctx: &::autojson::SerdeContext,
            ) -> ::core::result::Result<
                ::core::option::Option<::std::boxed::Box<T>>,
                ::autojson::DecodeError,
            > {
                ::core::result::Result::Ok(::core::option::Option::None)
            }
        }
    }
}

// simple
// the whole tree is converted straight into the schema's record
fn simple(cg: &Codegen<'_>, schema: &RecordSchema) -> TokenStream {
    let ident = cg.decoder_ident(&schema.def);
    let record = cg.record_ident(&schema.def);
    let params = param_idents(&schema.generics);
    let target = target(&schema.def, &params);
    let record_ty = if params.is_empty() {
        quote!(#record)
    } else {
        quote!(#record<#(#params),*>)
    };

    let body = quote! {
        let record = ctx.tree_to_record::<#record_ty>(tree)?;

        ::core::result::Result::Ok(::core::option::Option::Some(::std::boxed::Box::new(record)))
    };

    decoder(&schema.def, &ident, &params, &target, &body, quote!())
}

// polymorphic
// read the discriminator, convert it to the designator, then convert the
// whole tree into the matching variant's record
fn polymorphic(cg: &Codegen<'_>, schema: &RecordSchema, tag: &PolymorphicTag) -> TokenStream {
    let ident = cg.decoder_ident(&schema.def);
    let target = target(&schema.def, &[]);
    let designator = &tag.designator;
    let designator_path = designator.path();
    let field = &tag.field;

    let arms = tag.variants.iter().map(|variant| {
        let constant = quote::format_ident!("{}", variant.constant);
        let record = cg.record_ident(&variant.schema);
        let record_ty = match cg.schema(&variant.schema).and_then(|s| instance_args(&s.generics)) {
            Some(args) if !args.is_empty() => quote!(#record<#(#args),*>),
            _ => quote!(#record),
        };

        quote! {
            #designator::#constant { .. } => {
                let record = ctx.tree_to_record::<#record_ty>(tree)?;

                ::core::result::Result::Ok(::core::option::Option::Some(::std::boxed::Box::new(record)))
            }
        }
    });

    let body = quote! {
        let ::core::option::Option::Some(node) = tree.get(#field) else {
            return ::core::result::Result::Err(::autojson::DecodeError::MissingDiscriminator {
                designator: #designator_path,
                field: #field,
            });
        };

        let designator = ctx.tree_to_value::<#designator>(node)?;

        match designator {
            #(#arms)*
            _ => ::core::result::Result::Ok(::core::option::Option::None),
        }
    };

    decoder(
        &schema.def,
        &ident,
        &[],
        &target,
        &body,
        quote!(#[allow(unreachable_patterns)]),
    )
}

fn target(def: &Def, params: &[Ident]) -> TokenStream {
    if params.is_empty() {
        quote!(dyn #def)
    } else {
        quote!(dyn #def<#(#params),*>)
    }
}

fn decoder(
    def: &Def,
    ident: &Ident,
    params: &[Ident],
    target: &TokenStream,
    body: &TokenStream,
    attrs: TokenStream,
) -> TokenStream {
    let doc = format!("Decodes [`{def}`] from a JSON tree.");
    let decode = quote! {
        #attrs
        fn decode(
            &self,
            tree: &::autojson::__reexports::serde_json::Value,
            ctx: &::autojson::SerdeContext,
        ) -> ::core::result::Result<
            ::core::option::Option<::std::boxed::Box<#target>>,
            ::autojson::DecodeError,
        > {
            #body
        }
    };

    if params.is_empty() {
        quote! {
            #[doc = #doc]
            #[derive(Clone, Copy, Debug, Default)]
            pub struct #ident;

            impl #ident {
                #[must_use]
                pub const fn new() -> Self {
                    Self
                }
            }

            impl ::autojson::Decode<#target> for #ident {
                #decode
            }
        }
    } else {
        quote! {
            #[doc = #doc]
            #[derive(Debug)]
            pub struct #ident<#(#params),*>(::core::marker::PhantomData<fn() -> (#(#params,)*)>);

            impl<#(#params),*> #ident<#(#params),*> {
                #[must_use]
                pub const fn new() -> Self {
                    Self(::core::marker::PhantomData)
                }
            }

            impl<#(#params: ::autojson::FieldValue),*> ::autojson::Decode<#target> for #ident<#(#params),*> {
                #decode
            }
        }
    }
}
