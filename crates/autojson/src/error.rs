use thiserror::Error as ThisError;

///
/// DecodeError
/// Decoding is all-or-nothing: any error means no value was produced.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum DecodeError {
    #[error("cannot convert tree to `{target}` at `{path}`: {source}")]
    Convert {
        target: &'static str,
        path: String,
        source: serde_json::Error,
    },

    #[error("missing discriminator `{field}` for designator `{designator}`")]
    MissingDiscriminator {
        designator: &'static str,
        field: &'static str,
    },

    #[error("invalid json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown field `{field}` for `{target}`")]
    UnknownField { target: &'static str, field: String },

    #[error("no decoder registered for `{target}`")]
    Unregistered { target: &'static str },
}

impl DecodeError {
    /// Path of the failing node for conversion errors.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Convert { path, .. } => Some(path),
            _ => None,
        }
    }
}
