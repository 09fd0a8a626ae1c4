//! ## Crate layout
//! - `attr`: attribute argument parsing shared by the front end and the macros.
//! - `error`: route-aware error aggregation and the pass reporter.
//! - `extract`: schema extraction across the supertrait chain.
//! - `naming`: wire names, optionality and generated identifiers.
//! - `node`: declaration input model and resolved schema model.
//! - `parse`: source front end turning Rust items into declarations.
//! - `polymorphic`: designator enum scanning for polymorphic schemas.
//! - `types`: declared types and generic substitution.
//! - `validate`: pass-wide validation over every resolved schema.

pub mod attr;
pub mod error;
pub mod extract;
pub mod naming;
pub mod node;
pub mod parse;
pub mod polymorphic;
pub mod types;
pub mod validate;

/// Accessor prefixes stripped when deriving a wire name.
pub const ACCESSOR_PREFIXES: [&str; 2] = ["get_", "is_"];

/// Erased name of the optional wrapper type.
pub const OPTIONAL_WRAPPER: &str = "Option";

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::{ErrorTree, Reporter, Warning},
        node::*,
        types::{Access, GenericParam, TypeRef},
    };
}
