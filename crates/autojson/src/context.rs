use crate::{Decode, DecodeError, Record, RecordShape};
use derive_more::Display;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

///
/// Visibility
/// Which record properties take part in encoding.
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum Visibility {
    /// Only the wire names declared by the record's schema.
    #[display("explicit-only")]
    ExplicitOnly,

    /// Everything the record serializes.
    #[default]
    #[display("implicit")]
    Implicit,
}

///
/// Registration
///

struct Registration {
    target: &'static str,
    decoder: Box<dyn Any + Send + Sync>,
}

///
/// SerdeContext
/// Decoders keyed by the type they produce, plus the directives the
/// generated `configure` routine applies.
///

pub struct SerdeContext {
    decoders: HashMap<TypeId, Registration>,
    visibility: Visibility,
    fail_on_unknown_fields: bool,
}

impl SerdeContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
            visibility: Visibility::default(),
            fail_on_unknown_fields: true,
        }
    }

    /// Register `decoder` as the decoder for `T`, replacing any previous one.
    pub fn register<T, D>(&mut self, decoder: D) -> &mut Self
    where
        T: ?Sized + 'static,
        D: Decode<T> + 'static,
    {
        let target = type_name::<T>();
        let decoder: Arc<dyn Decode<T>> = Arc::new(decoder);
        let registration = Registration {
            target,
            decoder: Box::new(decoder),
        };

        if self.decoders.insert(TypeId::of::<T>(), registration).is_some() {
            tracing::debug!(target_type = target, "decoder replaced");
        } else {
            tracing::debug!(target_type = target, "decoder registered");
        }

        self
    }

    #[must_use]
    pub fn decoder<T: ?Sized + 'static>(&self) -> Option<Arc<dyn Decode<T>>> {
        self.decoders
            .get(&TypeId::of::<T>())
            .and_then(|registration| registration.decoder.downcast_ref::<Arc<dyn Decode<T>>>())
            .cloned()
    }

    #[must_use]
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.decoders.contains_key(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> &mut Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Strict mode rejects tree fields that no record wire name claims.
    pub fn fail_on_unknown_fields(&mut self, fail: bool) -> &mut Self {
        self.fail_on_unknown_fields = fail;
        self
    }

    #[must_use]
    pub const fn fails_on_unknown_fields(&self) -> bool {
        self.fail_on_unknown_fields
    }

    /// Decode a `T` with its registered decoder.
    pub fn decode<T: ?Sized + 'static>(&self, tree: &Value) -> Result<Option<Box<T>>, DecodeError> {
        let decoder = self.decoder::<T>().ok_or(DecodeError::Unregistered {
            target: type_name::<T>(),
        })?;

        let decoded = decoder.decode(tree, self)?;
        if decoded.is_none() {
            tracing::warn!(target_type = type_name::<T>(), "no variant resolved for tree");
        }

        Ok(decoded)
    }

    /// Parse `text` as JSON, then decode it.
    pub fn decode_str<T: ?Sized + 'static>(&self, text: &str) -> Result<Option<Box<T>>, DecodeError> {
        let tree: Value = serde_json::from_str(text)?;

        self.decode(&tree)
    }

    /// Convert a whole tree into a generated record.
    pub fn tree_to_record<R>(&self, tree: &Value) -> Result<R, DecodeError>
    where
        R: RecordShape + DeserializeOwned,
    {
        if self.fail_on_unknown_fields
            && let Value::Object(map) = tree
            && let Some(field) = map.keys().find(|key| !R::WIRE_NAMES.contains(&key.as_str()))
        {
            return Err(DecodeError::UnknownField {
                target: R::SCHEMA,
                field: field.clone(),
            });
        }

        convert(tree, R::SCHEMA)
    }

    /// Convert a single node, such as a discriminator, into a value.
    pub fn tree_to_value<V: DeserializeOwned>(&self, node: &Value) -> Result<V, DecodeError> {
        convert(node, type_name::<V>())
    }

    /// Encode a record under the current visibility.
    ///
    /// Generated records serialize only their wire names, so
    /// `Visibility::ExplicitOnly` changes nothing for them. The filter only
    /// drops keys from hand-written records whose `to_tree` emits more.
    pub fn encode<R: Record + ?Sized>(&self, record: &R) -> Result<Value, serde_json::Error> {
        let tree = record.to_tree()?;

        Ok(match (self.visibility, tree) {
            (Visibility::ExplicitOnly, Value::Object(map)) => {
                let wire_names = record.wire_names();
                let map = map
                    .into_iter()
                    .filter(|(key, _)| wire_names.contains(&key.as_str()))
                    .collect::<Map<_, _>>();

                Value::Object(map)
            }
            (_, tree) => tree,
        })
    }
}

impl Default for SerdeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SerdeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut targets = self
            .decoders
            .values()
            .map(|registration| registration.target)
            .collect::<Vec<_>>();
        targets.sort_unstable();

        f.debug_struct("SerdeContext")
            .field("decoders", &targets)
            .field("visibility", &self.visibility)
            .field("fail_on_unknown_fields", &self.fail_on_unknown_fields)
            .finish()
    }
}

fn convert<V: DeserializeOwned>(node: &Value, target: &'static str) -> Result<V, DecodeError> {
    serde_path_to_error::deserialize(node).map_err(|err| DecodeError::Convert {
        target,
        path: err.path().to_string(),
        source: err.into_inner(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    trait Named: Record {
        fn name(&self) -> &str;
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    struct NamedRecord {
        #[serde(rename = "name")]
        name: String,
        #[serde(rename = "nick", default, skip_serializing_if = "Option::is_none")]
        nick: Option<String>,
    }

    impl Named for NamedRecord {
        fn name(&self) -> &str {
            &self.name
        }
    }

    impl RecordShape for NamedRecord {
        const SCHEMA: &'static str = "tests::Named";
        const WIRE_NAMES: &'static [&'static str] = &["name", "nick"];
    }

    impl Record for NamedRecord {
        fn schema_name(&self) -> &'static str {
            Self::SCHEMA
        }

        fn wire_names(&self) -> &'static [&'static str] {
            Self::WIRE_NAMES
        }

        fn to_tree(&self) -> Result<Value, serde_json::Error> {
            serde_json::to_value(self)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct NamedDecoder;

    impl Decode<dyn Named> for NamedDecoder {
        fn decode(&self, tree: &Value, ctx: &SerdeContext) -> Result<Option<Box<dyn Named>>, DecodeError> {
            let record = ctx.tree_to_record::<NamedRecord>(tree)?;

            Ok(Some(Box::new(record)))
        }
    }

    #[derive(Debug)]
    struct Extra {
        tree: Value,
    }

    impl Record for Extra {
        fn schema_name(&self) -> &'static str {
            "tests::Extra"
        }

        fn wire_names(&self) -> &'static [&'static str] {
            &["kept"]
        }

        fn to_tree(&self) -> Result<Value, serde_json::Error> {
            Ok(self.tree.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn context() -> SerdeContext {
        let mut ctx = SerdeContext::new();
        ctx.register::<dyn Named, _>(NamedDecoder);
        ctx
    }

    #[test]
    fn registered_decoder_is_found_by_target() {
        let ctx = context();

        assert!(ctx.is_registered::<dyn Named>());
        assert!(!ctx.is_registered::<NamedRecord>());
        assert_eq!(ctx.len(), 1);

        let named = ctx
            .decode::<dyn Named>(&json!({ "name": "Rex" }))
            .expect("decode")
            .expect("some");
        assert_eq!(named.name(), "Rex");
        assert_eq!(named.schema_name(), "tests::Named");
    }

    #[test]
    fn unregistered_target_is_an_error() {
        let err = SerdeContext::new()
            .decode::<dyn Named>(&json!({}))
            .expect_err("unregistered");

        assert!(matches!(err, DecodeError::Unregistered { .. }));
    }

    #[test]
    fn conversion_errors_carry_the_path() {
        let err = context()
            .decode::<dyn Named>(&json!({ "name": 5 }))
            .expect_err("bad type");

        assert!(matches!(err, DecodeError::Convert { target: "tests::Named", .. }));
        assert_eq!(err.path(), Some("name"));
    }

    #[test]
    fn strict_mode_rejects_unknown_fields() {
        let mut ctx = context();
        let tree = json!({ "name": "Rex", "legs": 4 });

        let err = ctx.decode::<dyn Named>(&tree).expect_err("strict");
        assert!(matches!(err, DecodeError::UnknownField { ref field, .. } if field == "legs"));

        ctx.fail_on_unknown_fields(false);
        assert!(ctx.decode::<dyn Named>(&tree).expect("lenient").is_some());
    }

    #[test]
    fn decode_str_reports_bad_json() {
        let err = context().decode_str::<dyn Named>("{ name").expect_err("json");

        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn encode_keeps_only_wire_names_when_explicit() {
        let mut ctx = SerdeContext::new();
        let extra = Extra {
            tree: json!({ "kept": 1, "ambient": 2 }),
        };

        assert_eq!(ctx.encode(&extra).expect("implicit"), json!({ "kept": 1, "ambient": 2 }));

        ctx.set_visibility(Visibility::ExplicitOnly);
        assert_eq!(ctx.encode(&extra).expect("explicit"), json!({ "kept": 1 }));
    }

    #[test]
    fn explicit_visibility_leaves_wire_only_records_alone() {
        let mut ctx = context();
        let named = NamedRecord {
            name: "Rex".to_string(),
            nick: Some("R".to_string()),
        };
        let implicit = ctx.encode(&named).expect("implicit");

        ctx.set_visibility(Visibility::ExplicitOnly);
        assert_eq!(ctx.encode(&named).expect("explicit"), implicit);
        assert_eq!(implicit, json!({ "name": "Rex", "nick": "R" }));
    }

    #[test]
    fn absent_optional_is_omitted_on_encode() {
        let ctx = context();
        let named = ctx
            .decode_str::<dyn Named>(r#"{ "name": "Rex" }"#)
            .expect("decode")
            .expect("some");

        assert_eq!(ctx.encode(named.as_ref()).expect("encode"), json!({ "name": "Rex" }));
        assert_eq!(
            named.as_any().downcast_ref::<NamedRecord>().and_then(|r| r.nick.clone()),
            None
        );
    }
}
