use crate::{
    naming::{decoder_ident, record_ident},
    prelude::*,
    validate::Suffixes,
};
use std::collections::BTreeMap;

/// Generated items share one output file, so their idents must be unique
/// across the pass and must not shadow any schema.
pub fn validate_generated_idents(schemas: &[RecordSchema], suffixes: Suffixes<'_>, errs: &mut ErrorTree) {
    let mut owners: BTreeMap<String, String> = BTreeMap::new();

    for schema in schemas {
        let path = schema.def.path();

        if let Some(prev) = owners.insert(schema.def.ident.clone(), path.clone()) {
            errs.add_for(
                path,
                format!("schema ident '{}' is also used by '{prev}'", schema.def.ident),
            );
        }
    }

    for schema in schemas {
        let path = schema.def.path();
        let generated = [
            record_ident(&schema.def.ident, suffixes.record),
            decoder_ident(&schema.def.ident, suffixes.decoder),
        ];

        for ident in generated {
            if let Some(owner) = owners.get(&ident) {
                errs.add_for(
                    path.clone(),
                    format!("generated ident '{ident}' collides with schema '{owner}'"),
                );
            }
        }
    }
}
