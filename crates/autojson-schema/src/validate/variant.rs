use crate::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Every variant of a polymorphic schema must be a generated simple schema
/// of the same pass that inherits the polymorphic root.
pub fn validate_variants(schemas: &[RecordSchema], failing: &BTreeSet<String>, errs: &mut ErrorTree) {
    let by_path = schemas
        .iter()
        .map(|schema| (schema.def.path(), schema))
        .collect::<BTreeMap<_, _>>();

    for schema in schemas {
        let Some(tag) = schema.tag() else { continue };
        let path = schema.def.path();
        if failing.contains(&path) {
            continue;
        }

        for variant in &tag.variants {
            let target = variant.schema.path();
            let constant = &variant.constant;

            let message = match by_path.get(&target) {
                _ if failing.contains(&target) => {
                    format!("variant '{target}' for '{constant}' failed generation")
                }
                None => format!("variant '{target}' for '{constant}' is not a #[record] schema"),
                Some(variant) if variant.is_polymorphic() => {
                    format!("variant '{target}' for '{constant}' must be a simple schema")
                }
                Some(variant) if !variant.implements(&path) => {
                    format!("variant '{target}' for '{constant}' does not inherit '{path}'")
                }
                Some(_) => continue,
            };

            errs.add_for(path.clone(), message);
        }
    }
}
