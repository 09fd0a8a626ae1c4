use crate::Error;
use serde::Deserialize;
use std::{fs, path::Path};

///
/// Config
/// Generation settings, read from `autojson.toml` next to the build script.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sources: Vec<SourceConfig>,
    pub record_suffix: String,
    pub decoder_suffix: String,
    pub registry_fn: String,
    pub fail_on_unknown_fields: bool,
}

impl Config {
    pub const FILE_NAME: &'static str = "autojson.toml";

    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&text)
    }

    /// Load `path`, or fall back to the defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, Error> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    #[must_use]
    pub fn with_source(mut self, path: impl Into<String>, module: impl Into<String>) -> Self {
        self.sources.push(SourceConfig {
            path: path.into(),
            module: module.into(),
        });
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![SourceConfig::default()],
            record_suffix: "Record".to_string(),
            decoder_suffix: "Decoder".to_string(),
            registry_fn: "configure".to_string(),
            fail_on_unknown_fields: false,
        }
    }
}

///
/// SourceConfig
/// One schema source file and the module path it is mounted at.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub path: String,
    pub module: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: "src/schema.rs".to_string(),
            module: "crate::schema".to_string(),
        }
    }
}
