use crate::{
    Codegen, Config, ENTRY_FILE, Error, Registry, decoder, record, unit_file,
};
use autojson_schema::{
    extract::Extractor,
    parse::parse_source,
    prelude::*,
    validate::{Suffixes, validate_pass},
};
use proc_macro2::TokenStream;
use std::{
    collections::BTreeSet,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

///
/// Source
///

#[derive(Clone, Debug)]
enum Source {
    File { path: PathBuf, module: String },
    Text { name: String, text: String, module: String },
}

///
/// Pass
/// One generation pass: every source is parsed into a single declaration
/// arena before any schema is extracted.
///

#[derive(Clone, Debug)]
pub struct Pass {
    config: Config,
    sources: Vec<Source>,
}

impl Pass {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            sources: Vec::new(),
        }
    }

    /// A pass over the sources listed in `config`, relative to `base_dir`.
    #[must_use]
    pub fn from_config(config: Config, base_dir: &Path) -> Self {
        let sources = config
            .sources
            .iter()
            .map(|source| Source::File {
                path: base_dir.join(&source.path),
                module: source.module.clone(),
            })
            .collect();

        Self { config, sources }
    }

    #[must_use]
    pub fn source(mut self, path: impl Into<PathBuf>, module: impl Into<String>) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            module: module.into(),
        });
        self
    }

    #[must_use]
    pub fn source_text(
        mut self,
        name: impl Into<String>,
        text: impl Into<String>,
        module: impl Into<String>,
    ) -> Self {
        self.sources.push(Source::Text {
            name: name.into(),
            text: text.into(),
            module: module.into(),
        });
        self
    }

    /// Parse every source, then generate.
    ///
    /// I/O and syntax errors abort the pass; schema errors are collected in
    /// the returned output.
    pub fn run(self) -> Result<Output, Error> {
        let mut decls = Declarations::new();
        let mut files = Vec::new();

        for source in &self.sources {
            let (name, text, module) = match source {
                Source::File { path, module } => {
                    let text = fs::read_to_string(path).map_err(|source| Error::Io {
                        path: path.clone(),
                        source,
                    })?;
                    files.push(path.clone());

                    (path.display().to_string(), text, module)
                }
                Source::Text { name, text, module } => (name.clone(), text.clone(), module),
            };

            syn::parse_str::<syn::Path>(module).map_err(|source| Error::Module {
                module: module.clone(),
                source,
            })?;

            let parsed =
                parse_source(&text, module).map_err(|source| Error::Parse { name: name.clone(), source })?;
            tracing::debug!(source = %name, module = %module, "parsed schema source");

            decls.extend(parsed);
        }

        let mut output = generate(&decls, &self.config);
        output.sources = files;

        Ok(output)
    }
}

/// Generate every artifact and the registry for an already parsed arena.
#[must_use]
pub fn generate(decls: &Declarations, config: &Config) -> Output {
    let mut reporter = Reporter::new();
    let extractor = Extractor::new(decls);

    // extract
    let mut schemas = Vec::new();
    let mut failed = BTreeSet::new();
    for root in decls.roots() {
        match extractor.extract(root, &mut reporter) {
            Ok(schema) => {
                tracing::debug!(schema = %schema.def, fields = schema.fields.len(), "extracted schema");
                schemas.push(schema);
            }
            Err(errs) => {
                let path = root.def.path();
                let mut tree = ErrorTree::new();
                tree.merge_for(path.clone(), errs);
                reporter.errors(tree);
                failed.insert(path);
            }
        }
    }

    // validate
    let suffixes = Suffixes {
        record: &config.record_suffix,
        decoder: &config.decoder_suffix,
    };
    let errs = validate_pass(&schemas, &failed, suffixes);
    failed.extend(errs.routes().map(ToString::to_string));
    reporter.errors(errs);
    schemas.retain(|schema| !failed.contains(&schema.def.path()));

    // emit
    let cg = Codegen::new(config, &schemas);
    let artifacts = decls
        .roots()
        .map(|root| match cg.schema(&root.def) {
            Some(schema) => GeneratedArtifact::generated(&cg, schema),
            None => GeneratedArtifact::stub(&cg, root),
        })
        .collect::<Vec<_>>();

    // registry last
    let registry = Registry::build(&artifacts, config);

    tracing::info!(
        schemas = artifacts.len(),
        failed = failed.len(),
        registered = registry.len(),
        warnings = reporter.warnings().len(),
        "generation pass finished"
    );

    Output {
        artifacts,
        registry,
        reporter,
        imports: decls.modules().into_iter().collect(),
        sources: Vec::new(),
    }
}

///
/// GeneratedArtifact
/// What one root produced: its record (simple schemas only) and its decoder.
/// A root that failed generation keeps a stub decoder and no schema.
///

#[derive(Clone, Debug)]
pub struct GeneratedArtifact {
    pub def: Def,
    pub generics: Vec<GenericParam>,
    pub schema: Option<RecordSchema>,
    pub record: Option<SourceUnit>,
    pub decoder: SourceUnit,
    pub decoder_ident: String,
}

impl GeneratedArtifact {
    fn generated(cg: &Codegen<'_>, schema: &RecordSchema) -> Self {
        let record = (!schema.is_polymorphic()).then(|| {
            let ident = cg.record_ident(&schema.def);
            SourceUnit::new(unit_file(&ident), &record::generate(cg, schema))
        });
        let ident = cg.decoder_ident(&schema.def);

        Self {
            def: schema.def.clone(),
            generics: schema.generics.clone(),
            schema: Some(schema.clone()),
            record,
            decoder: SourceUnit::new(unit_file(&ident), &decoder::generate(cg, schema)),
            decoder_ident: ident.to_string(),
        }
    }

    fn stub(cg: &Codegen<'_>, root: &TraitDecl) -> Self {
        let ident = cg.decoder_ident(&root.def);

        Self {
            def: root.def.clone(),
            generics: root.generics.clone(),
            schema: None,
            record: None,
            decoder: SourceUnit::new(unit_file(&ident), &decoder::stub(cg, &root.def)),
            decoder_ident: ident.to_string(),
        }
    }

    #[must_use]
    pub const fn is_stub(&self) -> bool {
        self.schema.is_none()
    }
}

///
/// SourceUnit
/// One generated file.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceUnit {
    pub file: String,
    pub code: String,
}

impl SourceUnit {
    #[must_use]
    pub fn new(file: impl Into<String>, tokens: &TokenStream) -> Self {
        Self {
            file: file.into(),
            code: tokens.to_string(),
        }
    }
}

///
/// Output
///

#[derive(Clone, Debug)]
pub struct Output {
    pub artifacts: Vec<GeneratedArtifact>,
    pub registry: Registry,
    pub reporter: Reporter,
    imports: Vec<String>,
    sources: Vec<PathBuf>,
}

impl Output {
    /// Source files read by the pass.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    #[must_use]
    pub fn artifact(&self, path: &str) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|artifact| artifact.def.path() == path)
    }

    /// Every unit in emission order, registry last.
    #[must_use]
    pub fn units(&self) -> Vec<SourceUnit> {
        let mut units = Vec::new();
        for artifact in &self.artifacts {
            units.extend(artifact.record.clone());
            units.push(artifact.decoder.clone());
        }
        units.push(self.registry.render());

        units
    }

    /// The entry file: schema module imports plus one `include!` per unit.
    #[must_use]
    pub fn entry(&self) -> String {
        let mut entry = String::new();
        for module in &self.imports {
            let _ = writeln!(entry, "#[allow(unused_imports)]\nuse {module}::*;");
        }
        for unit in self.units() {
            let _ = writeln!(entry, "include!(concat!(env!(\"OUT_DIR\"), \"/{}\"));", unit.file);
        }

        entry
    }

    /// Every unit concatenated into one source string.
    #[must_use]
    pub fn render(&self) -> String {
        self.units()
            .iter()
            .map(|unit| unit.code.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Write every unit and the entry file into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(), Error> {
        let write = |file: &str, code: &str| {
            let path = dir.join(file);
            fs::write(&path, code).map_err(|source| Error::Io { path, source })
        };

        for unit in self.units() {
            write(&unit.file, &unit.code)?;
        }
        write(ENTRY_FILE, &self.entry())
    }

    /// Fail when any error was reported during the pass.
    pub fn check(&self) -> Result<(), Error> {
        self.reporter.result().map_err(Error::Generation)
    }
}
