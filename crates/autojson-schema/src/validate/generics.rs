use crate::prelude::*;

/// Polymorphic schemas are decoded through one concrete registry entry, so
/// they cannot stay generic; simple roots need a bound for every parameter
/// so the registry can instantiate their decoder.
pub fn validate_generics(schema: &RecordSchema, errs: &mut ErrorTree) {
    let mut local = ErrorTree::new();

    if schema.is_polymorphic() && !schema.generics.is_empty() {
        err!(local, "polymorphic schema must not declare generic parameters");
    } else {
        for param in schema.generics.iter().filter(|p| p.bound.is_none()) {
            err!(
                local,
                "generic parameter `{0}` needs an upper bound (`{0} = Type`) to be registered",
                param.name
            );
        }
    }

    errs.merge_for(schema.def.path(), local);
}
