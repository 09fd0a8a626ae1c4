use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{any::Any, fmt::Debug};

///
/// Record
/// Object-safe surface of every generated record; added as a supertrait to
/// each `#[record]` trait.
///

pub trait Record: Any + Debug + Send + Sync {
    /// Path of the schema the record was generated from.
    fn schema_name(&self) -> &'static str;

    fn wire_names(&self) -> &'static [&'static str];

    /// The record as a JSON tree, optional fields omitted when absent.
    fn to_tree(&self) -> Result<Value, serde_json::Error>;

    fn as_any(&self) -> &dyn Any;
}

///
/// RecordShape
/// Static description of a generated record type.
///

pub trait RecordShape {
    const SCHEMA: &'static str;
    const WIRE_NAMES: &'static [&'static str];
}

///
/// FieldValue
/// Bound on the open generic parameters of generated records.
///

pub trait FieldValue:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> FieldValue for T where
    T: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}
