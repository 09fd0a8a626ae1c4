//! Fixture schemas generated through the build script, exercised by the
//! tests in `tests/`.

pub mod schema;
pub mod shapes;

/// Records, decoders and `configure` generated from `schema` and `shapes`.
#[allow(clippy::all, clippy::pedantic, clippy::nursery)]
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/autojson.rs"));
}

use autojson::SerdeContext;

/// A context with every generated decoder registered.
#[must_use]
pub fn context() -> SerdeContext {
    let mut ctx = SerdeContext::new();
    generated::configure(&mut ctx);

    ctx
}
