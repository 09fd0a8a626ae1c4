use autojson_schema::prelude::ErrorTree;
use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// Error
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum Error {
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("environment variable `{0}` is not set")]
    Env(&'static str),

    #[error("generation failed:\n{0}")]
    Generation(ErrorTree),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid module path `{module}`: {source}")]
    Module { module: String, source: syn::Error },

    #[error("failed to parse {name}: {source}")]
    Parse { name: String, source: syn::Error },
}
