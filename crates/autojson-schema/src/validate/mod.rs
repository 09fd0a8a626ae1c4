//! Pass-wide validation over every schema resolved in one generation pass.

pub mod generics;
pub mod naming;
pub mod variant;

use crate::prelude::*;
use std::collections::BTreeSet;

///
/// Suffixes
/// Appended to a schema ident to name its generated items.
///

#[derive(Clone, Copy, Debug)]
pub struct Suffixes<'a> {
    pub record: &'a str,
    pub decoder: &'a str,
}

/// Validate the resolved schemas of one pass.
///
/// `failed` holds the paths of roots that already failed extraction. Errors
/// are routed by schema path; a polymorphic schema fails with any of its
/// variants.
#[must_use]
pub fn validate_pass(schemas: &[RecordSchema], failed: &BTreeSet<String>, suffixes: Suffixes<'_>) -> ErrorTree {
    // Phase 1: local invariants.
    let mut errs = ErrorTree::new();
    for schema in schemas {
        generics::validate_generics(schema, &mut errs);
    }

    // Phase 2: invariants that need the whole pass.
    naming::validate_generated_idents(schemas, suffixes, &mut errs);

    // Phase 3: variants, once every simple schema has been judged.
    let mut failing = failed.clone();
    failing.extend(errs.routes().map(ToString::to_string));
    variant::validate_variants(schemas, &failing, &mut errs);

    errs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{extract::Extractor, parse::parse_source};

    pub(super) fn schemas(src: &str) -> (Vec<RecordSchema>, BTreeSet<String>) {
        let decls = parse_source(src, "crate::m").expect("parse");
        let extractor = Extractor::new(&decls);
        let mut reporter = Reporter::new();

        let mut ok = Vec::new();
        let mut failed = BTreeSet::new();
        for root in decls.roots() {
            match extractor.extract(root, &mut reporter) {
                Ok(schema) => ok.push(schema),
                Err(_) => {
                    failed.insert(root.def.path());
                }
            }
        }

        (ok, failed)
    }

    pub(super) const SUFFIXES: Suffixes<'static> = Suffixes {
        record: "Record",
        decoder: "Decoder",
    };

    #[test]
    fn failing_variant_fails_its_polymorphic_root() {
        let (schemas, failed) = schemas(
            r#"
            #[record(designator = Kind)]
            pub trait Shape { fn kind(&self) -> Kind; }

            #[record]
            pub trait Circle: Shape { fn radius(&self, scale: u8) -> i64; }

            pub enum Kind { Circle }
            impl Kind {
                #[variant_type]
                fn schema(&self) -> &'static str { match self { Self::Circle => "Circle" } }
            }
            "#,
        );
        assert!(failed.contains("crate::m::Circle"));

        let errs = validate_pass(&schemas, &failed, SUFFIXES);
        assert_eq!(errs.routes().collect::<Vec<_>>(), vec!["crate::m::Shape"]);
    }

    #[test]
    fn variant_failing_validation_fails_its_root() {
        let (schemas, failed) = schemas(
            r#"
            #[record(designator = Kind)]
            pub trait Shape { fn kind(&self) -> Kind; }

            #[record]
            pub trait Circle: Shape { fn radius(&self) -> i64; }

            #[record]
            pub trait CircleRecord { fn id(&self) -> u64; }

            pub enum Kind { Circle }
            impl Kind {
                #[variant_type]
                fn schema(&self) -> &'static str { match self { Self::Circle => "Circle" } }
            }
            "#,
        );
        assert!(failed.is_empty());

        let errs = validate_pass(&schemas, &failed, SUFFIXES);
        assert_eq!(
            errs.routes().collect::<Vec<_>>(),
            vec!["crate::m::Circle", "crate::m::Shape"]
        );
    }

    #[test]
    fn clean_pass_has_no_errors() {
        let (schemas, failed) = schemas(
            r"
            #[record]
            pub trait Animal { fn name(&self) -> String; }
            ",
        );

        assert!(failed.is_empty());
        assert!(validate_pass(&schemas, &failed, SUFFIXES).is_empty());
    }
}
