use crate::{DecodeError, SerdeContext};
use serde_json::Value;

///
/// Decode
/// Builds a `T` from a JSON tree.
///
/// `Ok(None)` means the decoder recognised no variant for the tree; it is
/// only returned by decoders out of step with their schema.
///

pub trait Decode<T: ?Sized>: Send + Sync {
    fn decode(&self, tree: &Value, ctx: &SerdeContext) -> Result<Option<Box<T>>, DecodeError>;
}
