//! ## Crate layout
//! - `config`: `autojson.toml` settings.
//! - `decoder`: simple, polymorphic and stub decoder emitters.
//! - `error`: build-level error type.
//! - `macros`: the `build!` helper for build scripts.
//! - `pass`: one generation pass from sources to source units.
//! - `record`: data record emitter.
//! - `registry`: the registry value and its configuration routine.

mod config;
mod decoder;
mod error;
mod macros;
mod pass;
mod record;
mod registry;

pub use config::{Config, SourceConfig};
pub use error::Error;
pub use pass::{GeneratedArtifact, Output, Pass, SourceUnit, generate};
pub use registry::{Registry, RegistryEntry};

use autojson_schema::{
    naming::{decoder_ident, record_ident},
    prelude::*,
    types::Bindings,
};
use proc_macro2::Ident;
use quote::format_ident;
use std::{collections::BTreeMap, env::var, path::PathBuf};

/// Name of the entry file written to `OUT_DIR`.
pub const ENTRY_FILE: &str = "autojson.rs";

/// Run a whole pass from a build script: load the config relative to the
/// crate root, generate, write every unit to `OUT_DIR` and fail on errors.
pub fn run_build_script(config_file: &str) -> Result<Output, Error> {
    let manifest_dir = PathBuf::from(var("CARGO_MANIFEST_DIR").map_err(|_| Error::Env("CARGO_MANIFEST_DIR"))?);
    let out_dir = PathBuf::from(var("OUT_DIR").map_err(|_| Error::Env("OUT_DIR"))?);

    let config_path = manifest_dir.join(config_file);
    println!("cargo:rerun-if-changed={}", config_path.display());
    let config = Config::load_or_default(&config_path)?;

    let output = Pass::from_config(config, &manifest_dir).run()?;
    for unit in output.sources() {
        println!("cargo:rerun-if-changed={}", unit.display());
    }

    output.write_to(&out_dir)?;
    for warning in output.reporter.warnings() {
        println!("cargo:warning={warning}");
    }
    for (route, message) in output.reporter.error_tree().flatten() {
        println!("cargo:warning=error: {route}: {message}");
    }
    output.check()?;

    Ok(output)
}

///
/// Codegen
/// Shared lookups for the emitters of one pass.
///

pub(crate) struct Codegen<'a> {
    pub config: &'a crate::Config,
    pub schemas: BTreeMap<String, &'a RecordSchema>,
}

impl<'a> Codegen<'a> {
    pub fn new(config: &'a crate::Config, schemas: &'a [RecordSchema]) -> Self {
        let schemas = schemas
            .iter()
            .map(|schema| (schema.def.path(), schema))
            .collect();

        Self { config, schemas }
    }

    pub fn record_ident(&self, def: &Def) -> Ident {
        format_ident!("{}", record_ident(&def.ident, &self.config.record_suffix))
    }

    pub fn decoder_ident(&self, def: &Def) -> Ident {
        format_ident!("{}", decoder_ident(&def.ident, &self.config.decoder_suffix))
    }

    pub fn schema(&self, def: &Def) -> Option<&'a RecordSchema> {
        self.schemas.get(&def.path()).copied()
    }
}

/// Concrete arguments for instantiating a generic schema: each parameter's
/// bound, substituted with the parameters before it. `None` when a parameter
/// has no bound.
pub(crate) fn instance_args(generics: &[GenericParam]) -> Option<Vec<TypeRef>> {
    let mut bindings = Bindings::new();
    let mut args = Vec::with_capacity(generics.len());

    for param in generics {
        let arg = param.bound.as_ref()?.substitute(&bindings);
        bindings.insert(param.name.clone(), arg.clone());
        args.push(arg);
    }

    Some(args)
}

pub(crate) fn param_idents(generics: &[GenericParam]) -> Vec<Ident> {
    generics
        .iter()
        .map(|param| format_ident!("{}", param.name))
        .collect()
}

pub(crate) fn unit_file(ident: &Ident) -> String {
    format!("{}.rs", autojson_schema::naming::unit_stem(&ident.to_string()))
}
