use crate::{Config, GeneratedArtifact, SourceUnit, instance_args};
use autojson_schema::prelude::*;
use derive_more::{Deref, IntoIterator};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

///
/// Registry
/// Every decoder of one pass plus the global directives, built once from the
/// finished artifact list.
///

#[derive(Clone, Debug, Deref, IntoIterator)]
pub struct Registry {
    #[deref]
    #[into_iterator(owned, ref)]
    entries: Vec<RegistryEntry>,
    function: String,
    fail_on_unknown_fields: bool,
}

///
/// RegistryEntry
/// One decoder registration: the schema, the arguments it is instantiated
/// with, and the decoder type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistryEntry {
    pub schema: Def,
    pub args: Vec<TypeRef>,
    pub decoder: String,
    pub stub: bool,
}

impl Registry {
    #[must_use]
    pub fn build(artifacts: &[GeneratedArtifact], config: &Config) -> Self {
        let mut entries = Vec::with_capacity(artifacts.len());

        for artifact in artifacts {
            let Some(args) = instance_args(&artifact.generics) else {
                tracing::debug!(schema = %artifact.def, "not registered: generic parameter without a bound");
                continue;
            };

            entries.push(RegistryEntry {
                schema: artifact.def.clone(),
                args,
                decoder: artifact.decoder_ident.clone(),
                stub: artifact.is_stub(),
            });
        }

        Self {
            entries,
            function: config.registry_fn.clone(),
            fail_on_unknown_fields: config.fail_on_unknown_fields,
        }
    }

    #[must_use]
    pub fn entry(&self, schema: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|entry| entry.schema.path() == schema)
    }

    #[must_use]
    pub const fn fail_on_unknown_fields(&self) -> bool {
        self.fail_on_unknown_fields
    }

    /// The configuration routine registering every decoder.
    #[must_use]
    pub fn generate(&self) -> TokenStream {
        let function = format_ident!("{}", self.function);
        let fail_on_unknown_fields = self.fail_on_unknown_fields;

        let registrations = self.entries.iter().map(|entry| {
            let schema = &entry.schema;
            let decoder = format_ident!("{}", entry.decoder);
            let args = &entry.args;

            if args.is_empty() {
                quote!(ctx.register::<dyn #schema, _>(#decoder::new());)
            } else {
                quote!(ctx.register::<dyn #schema<#(#args),*>, _>(#decoder::<#(#args),*>::new());)
            }
        });

        quote! {
            /// Register every generated decoder and apply the pass directives.
            pub fn #function(ctx: &mut ::autojson::SerdeContext) {
                #(#registrations)*

                ctx.set_visibility(::autojson::Visibility::ExplicitOnly);
                ctx.fail_on_unknown_fields(#fail_on_unknown_fields);
            }
        }
    }

    #[must_use]
    pub fn render(&self) -> SourceUnit {
        SourceUnit::new("registry.rs", &self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate;
    use autojson_schema::parse::parse_source;

    const SRC: &str = r#"
        #[record]
        pub trait Animal { fn name(&self) -> String; }

        pub trait Holder<T> { fn value(&self) -> T; }

        #[record]
        pub trait Boxed<V = String>: Holder<V> {}

        #[record]
        pub trait Open<V>: Holder<V> {}
    "#;

    fn registry() -> Registry {
        let decls = parse_source(SRC, "crate::zoo").expect("parse");

        generate(&decls, &Config::default()).registry
    }

    #[test]
    fn entries_follow_the_roots() {
        let registry = registry();
        let schemas = registry
            .iter()
            .map(|entry| entry.schema.ident.as_str())
            .collect::<Vec<_>>();

        assert_eq!(schemas, vec!["Animal", "Boxed"], "unbounded roots cannot be registered");
        assert_eq!(registry.entry("crate::zoo::Boxed").expect("entry").args[0].to_string(), "String");
        assert!(!registry.entry("crate::zoo::Animal").expect("entry").stub);
    }

    #[test]
    fn routine_registers_then_applies_directives() {
        let code = registry().generate().to_string();

        let animal = code.find("AnimalDecoder :: new ()").expect("animal registration");
        let visibility = code.find("Visibility :: ExplicitOnly").expect("visibility");
        let unknown = code.find("fail_on_unknown_fields (false)").expect("unknown fields");

        assert!(code.starts_with("# [doc"));
        assert!(code.contains("pub fn configure (ctx : & mut :: autojson :: SerdeContext)"));
        assert!(code.contains("BoxedDecoder :: < String > :: new ()"));
        assert!(animal < visibility && visibility < unknown);
    }

    #[test]
    fn registry_is_iterable_by_reference() {
        let registry = registry();
        let mut count = 0;
        for entry in &registry {
            assert!(!entry.decoder.is_empty());
            count += 1;
        }

        assert_eq!(count, registry.len());
    }
}
