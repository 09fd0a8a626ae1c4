//! ## Crate layout
//! - `build`: the generation pass, re-exported for build scripts.
//! - `context`: `SerdeContext`, the decoder registry used at runtime.
//! - `decode`: the `Decode` contract implemented by generated decoders.
//! - `error`: decode-time errors.
//! - `macros`: `#[record]`, `#[schema]` and `#[variant_type]`.
//! - `record`: traits implemented by generated records.
//! - `schema`: declaration model, extraction and validation.
//!
//! A build script runs `autojson::build!()`; the crate then includes the
//! generated `autojson.rs` from `OUT_DIR` and calls its `configure` routine
//! on a `SerdeContext`.

pub use autojson_build as build;
pub use autojson_macros as macros;
pub use autojson_schema as schema;

mod context;
mod decode;
mod error;
mod record;

pub use context::{SerdeContext, Visibility};
pub use decode::Decode;
pub use error::DecodeError;
pub use record::{FieldValue, Record, RecordShape};

/// re-exports
///
/// generated code reaches its dependencies through these, so the user crate
/// does not have to list them in its Cargo.toml
pub mod __reexports {
    pub use serde;
    pub use serde_json;
}

//
// Macros
//

pub use autojson_build::build;
pub use autojson_macros::{record, schema, variant_type};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Decode, DecodeError, Record as _, SerdeContext, Visibility,
        macros::{record, schema, variant_type},
    };
    pub use serde::{Deserialize, Serialize};
}
