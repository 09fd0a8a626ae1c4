use crate::{
    naming::{constant_name, resolve_wire_name},
    polymorphic,
    prelude::*,
    types::Bindings,
};
use std::collections::{BTreeMap, VecDeque, btree_map::Entry};

///
/// Extractor
/// Resolves one generation root into a flat `RecordSchema`.
///
/// Ancestors are walked depth-first from the root. Generic parameters are
/// re-bound at every hop: a positional argument (itself substituted with the
/// bindings in force at that level) wins, otherwise the parameter's declared
/// default is used. When an accessor is declared at several depths the
/// shallowest declaration wins; ties go to the first one visited. A trait's
/// depth is its shortest route from the root, however it was first reached.
///

pub struct Extractor<'a> {
    decls: &'a Declarations,
}

// Visit
// one trait reached during the walk, with the bindings in force there
struct Visit<'a> {
    decl: &'a TraitDecl,
    depth: usize,
    bindings: Bindings,
    args: Vec<TypeRef>,
}

// Candidate
// one declaration of an accessor identity
struct Candidate<'a> {
    accessor: &'a AccessorDecl,
    declared_by: &'a Def,
    depth: usize,
    ret: TypeRef,
}

impl<'a> Extractor<'a> {
    #[must_use]
    pub const fn new(decls: &'a Declarations) -> Self {
        Self { decls }
    }

    pub fn extract(
        &self,
        root: &'a TraitDecl,
        reporter: &mut Reporter,
    ) -> Result<RecordSchema, ErrorTree> {
        let mut errs = ErrorTree::new();

        // walk
        let root_args = root
            .generics
            .iter()
            .map(|param| TypeRef::param(&param.name))
            .collect();
        let depths = self.depths(root);
        let mut visits = Vec::new();
        let mut stack = Vec::new();
        self.walk(root, Bindings::new(), root_args, &depths, &mut stack, &mut visits, &mut errs);

        for visit in &visits {
            errs.merge(visit.decl.errors.clone());
            for accessor in &visit.decl.accessors {
                check_accessor(&visit.decl.def, accessor, &mut errs);
            }
        }
        if !errs.is_empty() {
            return Err(errs);
        }

        let fields = Self::merge(root, &visits, reporter, &mut errs);
        let impls = visits.iter().map(trait_impl).collect();

        let kind = match root.designator() {
            Some(designator) => match polymorphic::scan(self.decls, root, designator, &fields) {
                Ok(tag) => SchemaKind::Polymorphic(tag),
                Err(tree) => {
                    errs.merge(tree);
                    SchemaKind::Simple
                }
            },
            None => SchemaKind::Simple,
        };

        errs.result()?;
        tracing::debug!(
            schema = %root.def,
            fields = fields.len(),
            ancestors = visits.len() - 1,
            polymorphic = root.designator().is_some(),
            "extracted schema"
        );

        Ok(RecordSchema {
            def: root.def.clone(),
            generics: root.generics.clone(),
            fields,
            impls,
            kind,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        &self,
        decl: &'a TraitDecl,
        bindings: Bindings,
        args: Vec<TypeRef>,
        depths: &BTreeMap<String, usize>,
        stack: &mut Vec<String>,
        visits: &mut Vec<Visit<'a>>,
        errs: &mut ErrorTree,
    ) {
        let path = decl.def.path();

        if stack.contains(&path) {
            errs.add_for(path.clone(), format!("inheritance cycle: {} > {path}", stack.join(" > ")));
            return;
        }

        if let Some(seen) = visits.iter().find(|v| v.decl.def == decl.def) {
            if seen.args != args {
                errs.add_for(
                    path,
                    format!(
                        "inherited with conflicting generic arguments <{}> and <{}>",
                        join(&seen.args),
                        join(&args)
                    ),
                );
            }
            return;
        }

        visits.push(Visit {
            decl,
            depth: depths.get(&path).copied().unwrap_or_default(),
            bindings: bindings.clone(),
            args,
        });
        stack.push(path.clone());

        for supertrait in &decl.supertraits {
            let Some(parent) = self
                .decls
                .resolve_trait(&decl.def.module_path, &supertrait.ident)
            else {
                tracing::trace!(schema = %path, supertrait = %supertrait.ident, "skipping foreign supertrait");
                continue;
            };

            match bind(parent, &supertrait.args, &bindings) {
                Ok((parent_bindings, parent_args)) => {
                    self.walk(parent, parent_bindings, parent_args, depths, stack, visits, errs);
                }
                Err(message) => errs.add_for(path.clone(), message),
            }
        }

        stack.pop();
    }

    // depths
    // breadth-first hop count from the root to every reachable ancestor
    fn depths(&self, root: &'a TraitDecl) -> BTreeMap<String, usize> {
        let mut depths = BTreeMap::from([(root.def.path(), 0)]);
        let mut queue = VecDeque::from([(root, 0)]);

        while let Some((decl, depth)) = queue.pop_front() {
            for supertrait in &decl.supertraits {
                let Some(parent) = self
                    .decls
                    .resolve_trait(&decl.def.module_path, &supertrait.ident)
                else {
                    continue;
                };

                if let Entry::Vacant(entry) = depths.entry(parent.def.path()) {
                    entry.insert(depth + 1);
                    queue.push_back((parent, depth + 1));
                }
            }
        }

        depths
    }

    fn merge(
        root: &TraitDecl,
        visits: &[Visit<'a>],
        reporter: &mut Reporter,
        errs: &mut ErrorTree,
    ) -> Vec<FieldDescriptor> {
        // group every declaration of an accessor, keeping first-seen order
        let mut order = Vec::new();
        let mut groups: BTreeMap<&str, Vec<Candidate<'a>>> = BTreeMap::new();

        for visit in visits {
            for accessor in &visit.decl.accessors {
                let Some(ret) = &accessor.ret else { continue };
                let candidate = Candidate {
                    accessor,
                    declared_by: &visit.decl.def,
                    depth: visit.depth,
                    ret: ret.substitute(&visit.bindings),
                };

                match groups.entry(accessor.ident.as_str()) {
                    Entry::Vacant(entry) => {
                        order.push(accessor.ident.as_str());
                        entry.insert(vec![candidate]);
                    }
                    Entry::Occupied(mut entry) => entry.get_mut().push(candidate),
                }
            }
        }

        let mut fields = Vec::new();
        let mut wire_owner: BTreeMap<String, String> = BTreeMap::new();
        let mut const_owner: BTreeMap<String, String> = BTreeMap::new();

        for ident in order {
            let candidates = &groups[ident];
            let Some(winner) = candidates
                .iter()
                .enumerate()
                .min_by_key(|(i, c)| (c.depth, *i))
                .map(|(_, c)| c)
            else {
                continue;
            };

            let route = winner.declared_by.member(ident);
            let (storage, access) = winner.ret.storage();

            for other in candidates.iter().filter(|c| !std::ptr::eq(*c, winner)) {
                let other_route = other.declared_by.member(ident);
                if other.ret.storage().0 != storage {
                    errs.add_for(
                        other_route,
                        format!(
                            "redeclared as `{}` but `{}` declares `{}`",
                            other.ret, winner.declared_by, winner.ret
                        ),
                    );
                } else if other.ret != winner.ret {
                    reporter.warn(
                        other_route,
                        format!("redeclared as `{}`; `{}` from `{}` is kept", other.ret, winner.ret, winner.declared_by),
                    );
                }
                if other.accessor.wire.is_some() && other.accessor.wire != winner.accessor.wire {
                    reporter.warn(
                        other.declared_by.member(ident),
                        "wire name override is shadowed by a more derived declaration",
                    );
                }
            }

            let wire = resolve_wire_name(winner.accessor);
            if !wire.conventional {
                reporter.warn(
                    route.clone(),
                    format!("accessor `{ident}` is not snake_case; using it verbatim as the wire name"),
                );
            }

            if let Some(owner) = wire_owner.insert(wire.name.clone(), ident.to_string()) {
                errs.add_for(
                    root.def.path(),
                    format!("wire name `{}` is used by both `{owner}` and `{ident}`", wire.name),
                );
            }
            if let Some(owner) = const_owner.insert(constant_name(&wire.name), ident.to_string()) {
                errs.add_for(
                    root.def.path(),
                    format!(
                        "wire names of `{owner}` and `{ident}` map to the same constant `{}`",
                        constant_name(&wire.name)
                    ),
                );
            }

            fields.push(FieldDescriptor {
                wire_name: wire.name,
                ident: ident.to_string(),
                optional: storage.is_optional(),
                ty: storage,
                access,
                declared_by: winner.declared_by.clone(),
            });
        }

        fields
    }
}

/// Bind a parent's generic parameters from the arguments written at the
/// supertrait bound, falling back to each parameter's declared default.
fn bind(
    parent: &TraitDecl,
    args: &[TypeRef],
    current: &Bindings,
) -> Result<(Bindings, Vec<TypeRef>), String> {
    if args.len() > parent.generics.len() {
        return Err(format!(
            "`{}` takes {} generic argument(s) but {} were supplied",
            parent.def,
            parent.generics.len(),
            args.len()
        ));
    }

    let mut bindings = Bindings::new();
    let mut resolved = Vec::with_capacity(parent.generics.len());

    for (i, param) in parent.generics.iter().enumerate() {
        let ty = match (args.get(i), &param.bound) {
            (Some(arg), _) => arg.substitute(current),
            (None, Some(bound)) => bound.substitute(&bindings),
            (None, None) => {
                return Err(format!(
                    "generic parameter `{}` of `{}` is unbound and has no upper bound",
                    param.name, parent.def
                ));
            }
        };

        bindings.insert(param.name.clone(), ty.clone());
        resolved.push(ty);
    }

    Ok((bindings, resolved))
}

fn check_accessor(owner: &Def, accessor: &AccessorDecl, errs: &mut ErrorTree) {
    let route = owner.member(&accessor.ident);
    let ident = &accessor.ident;

    if accessor.receiver != Receiver::Ref {
        errs.add_for(
            route.clone(),
            format!("accessor `{ident}` must take `&self`, found {}", accessor.receiver),
        );
    }
    if !accessor.params.is_empty() {
        errs.add_for(
            route.clone(),
            format!("accessor `{ident}` should not have method parameters ({})", accessor.params.join(", ")),
        );
    }
    if !accessor.type_params.is_empty() {
        errs.add_for(
            route.clone(),
            format!("accessor `{ident}` should not have type parameters ({})", accessor.type_params.join(", ")),
        );
    }
    match &accessor.ret {
        None => errs.add_for(route, format!("accessor `{ident}` must return a value")),
        Some(ret) if ret.is_mut_ref() => {
            errs.add_for(route, format!("accessor `{ident}` must not return `&mut`"));
        }
        Some(_) => {}
    }
}

fn trait_impl(visit: &Visit<'_>) -> TraitImpl {
    let accessors = visit
        .decl
        .accessors
        .iter()
        .filter_map(|accessor| {
            let ret = accessor.ret.as_ref()?.substitute(&visit.bindings);
            let (_, access) = ret.storage();

            Some(AccessorImpl {
                ident: accessor.ident.clone(),
                field: accessor.ident.clone(),
                access,
                ret,
            })
        })
        .collect();

    TraitImpl {
        def: visit.decl.def.clone(),
        args: visit.args.clone(),
        accessors,
    }
}

fn join(types: &[TypeRef]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_source;

    fn extract(src: &str, root: &str) -> (Result<RecordSchema, ErrorTree>, Reporter) {
        let decls = parse_source(src, "crate::m").expect("parse");
        let root = decls.get_trait(&format!("crate::m::{root}")).expect("root");
        let mut reporter = Reporter::new();

        (Extractor::new(&decls).extract(root, &mut reporter), reporter)
    }

    fn field_types(schema: &RecordSchema) -> Vec<(String, String)> {
        schema
            .fields
            .iter()
            .map(|f| (f.wire_name.clone(), f.ty.to_string()))
            .collect()
    }

    #[test]
    fn simple_schema_fields_in_declaration_order() {
        let (schema, reporter) = extract(
            r"
            #[record]
            pub trait Animal {
                fn name(&self) -> &str;
                fn age(&self) -> Option<i64>;
            }
            ",
            "Animal",
        );
        let schema = schema.expect("extract");

        assert_eq!(
            field_types(&schema),
            vec![
                ("name".to_string(), "String".to_string()),
                ("age".to_string(), "Option<i64>".to_string()),
            ]
        );
        assert_eq!(schema.fields[0].access, Access::Borrowed);
        assert!(!schema.fields[0].optional);
        assert!(schema.fields[1].optional);
        assert!(!schema.is_polymorphic());
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn ancestor_fields_follow_root_fields() {
        let (schema, _) = extract(
            r"
            pub trait Named { fn name(&self) -> String; }
            pub trait Aged: Named { fn age(&self) -> u32; }
            #[record]
            pub trait Pet: Aged { fn owner(&self) -> String; }
            ",
            "Pet",
        );
        let schema = schema.expect("extract");

        let names = schema.wire_names().collect::<Vec<_>>();
        assert_eq!(names, vec!["owner", "age", "name"]);
        assert_eq!(schema.impls.len(), 3);
        assert!(schema.implements("crate::m::Named"));
    }

    #[test]
    fn binding_is_forwarded_across_hops() {
        let (schema, _) = extract(
            r"
            pub trait Holder<T = i64> { fn value(&self) -> T; fn all(&self) -> Vec<T>; }
            pub trait Middle<U>: Holder<Option<U>> {}
            #[record]
            pub trait Leaf: Middle<String> {}
            ",
            "Leaf",
        );
        let schema = schema.expect("extract");

        assert_eq!(
            field_types(&schema),
            vec![
                ("value".to_string(), "Option<String>".to_string()),
                ("all".to_string(), "Vec<Option<String>>".to_string()),
            ]
        );
        let holder = schema
            .impls
            .iter()
            .find(|i| i.def.ident == "Holder")
            .expect("Holder impl");
        assert_eq!(holder.args[0].to_string(), "Option<String>");
    }

    #[test]
    fn missing_binding_falls_back_to_the_upper_bound() {
        let (schema, _) = extract(
            r"
            pub trait Holder<T = i64> { fn value(&self) -> T; }
            #[record]
            pub trait Plain: Holder {}
            ",
            "Plain",
        );
        let schema = schema.expect("extract");

        assert_eq!(field_types(&schema), vec![("value".to_string(), "i64".to_string())]);
    }

    #[test]
    fn unbound_parameter_without_bound_is_an_error() {
        let (schema, _) = extract(
            r"
            pub trait Holder<T> { fn value(&self) -> T; }
            #[record]
            pub trait Plain: Holder {}
            ",
            "Plain",
        );
        let errs = schema.expect_err("unbound");

        assert!(errs.to_string().contains("is unbound and has no upper bound"));
    }

    #[test]
    fn root_generics_stay_open() {
        let (schema, _) = extract(
            r"
            pub trait Holder<T = i64> { fn value(&self) -> T; }
            #[record]
            pub trait Boxed<V = String>: Holder<V> {}
            ",
            "Boxed",
        );
        let schema = schema.expect("extract");

        assert_eq!(field_types(&schema), vec![("value".to_string(), "V".to_string())]);
        assert_eq!(schema.generics[0].name, "V");
    }

    #[test]
    fn most_derived_declaration_wins() {
        let (schema, reporter) = extract(
            r#"
            pub trait Base {
                fn label(&self) -> String;
                #[wire(name = "base_label")]
                fn tag(&self) -> String;
            }
            #[record]
            pub trait Derived: Base {
                fn label(&self) -> &str;
                #[wire(name = "tagName")]
                fn tag(&self) -> String;
            }
            "#,
            "Derived",
        );
        let schema = schema.expect("extract");

        assert_eq!(schema.wire_names().collect::<Vec<_>>(), vec!["label", "tagName"]);
        assert_eq!(schema.fields[0].declared_by.ident, "Derived");
        assert_eq!(schema.fields[0].access, Access::Borrowed);
        assert_eq!(reporter.warnings().len(), 2);
    }

    #[test]
    fn incompatible_redeclaration_is_an_error() {
        let (schema, _) = extract(
            r"
            pub trait Base { fn count(&self) -> u64; }
            #[record]
            pub trait Derived: Base { fn count(&self) -> u32; }
            ",
            "Derived",
        );

        let errs = schema.expect_err("incompatible");
        assert_eq!(errs.routes().collect::<Vec<_>>(), vec!["crate::m::Base::count"]);
    }

    #[test]
    fn malformed_accessors_are_rejected() {
        let (schema, _) = extract(
            r"
            #[record]
            pub trait Bad {
                fn with_arg(&self, x: u8) -> u8;
                fn generic<T>(&self) -> T;
                fn owned(self) -> u8;
                fn nothing(&self);
            }
            ",
            "Bad",
        );
        let errs = schema.expect_err("malformed");
        let text = errs.to_string();

        assert!(text.contains("should not have method parameters"));
        assert!(text.contains("should not have type parameters"));
        assert!(text.contains("must take `&self`"));
        assert!(text.contains("must return a value"));
        assert_eq!(errs.len(), 4);
    }

    #[test]
    fn duplicate_wire_names_are_rejected() {
        let (schema, _) = extract(
            r#"
            #[record]
            pub trait Clash {
                fn first_name(&self) -> String;
                #[wire(name = "firstName")]
                fn given(&self) -> String;
            }
            "#,
            "Clash",
        );

        assert!(schema.expect_err("clash").to_string().contains("`firstName` is used by both"));
    }

    #[test]
    fn cycles_are_reported() {
        let (schema, _) = extract(
            r"
            pub trait A: B { fn a(&self) -> u8; }
            pub trait B: A { fn b(&self) -> u8; }
            #[record]
            pub trait Root: A {}
            ",
            "Root",
        );

        assert!(schema.expect_err("cycle").to_string().contains("inheritance cycle"));
    }

    #[test]
    fn diamond_with_matching_arguments_is_visited_once() {
        let (schema, _) = extract(
            r"
            pub trait Id { fn id(&self) -> u64; }
            pub trait Left: Id {}
            pub trait Right: Id {}
            #[record]
            pub trait Both: Left + Right {}
            ",
            "Both",
        );
        let schema = schema.expect("extract");

        assert_eq!(schema.wire_names().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(schema.impls.len(), 4);
    }

    #[test]
    fn diamond_with_conflicting_arguments_is_an_error() {
        let (schema, _) = extract(
            r"
            pub trait Holder<T> { fn value(&self) -> T; }
            pub trait Left: Holder<u8> {}
            pub trait Right: Holder<u16> {}
            #[record]
            pub trait Both: Left + Right {}
            ",
            "Both",
        );

        assert!(schema.expect_err("conflict").to_string().contains("conflicting generic arguments"));
    }

    #[test]
    fn unconventional_accessor_is_a_warning() {
        let (schema, reporter) = extract(
            r"
            #[record]
            pub trait Legacy {
                #[allow(non_snake_case)]
                fn getName(&self) -> String;
            }
            ",
            "Legacy",
        );

        assert_eq!(schema.expect("extract").wire_names().collect::<Vec<_>>(), vec!["getName"]);
        assert_eq!(reporter.warnings().len(), 1);
        assert_eq!(reporter.warnings()[0].route, "crate::m::Legacy::getName");
    }

    #[test]
    fn shortest_route_decides_the_depth() {
        // X is first reached through A > L at depth 3 but sits at depth 1
        // directly under Root, so P (2 hops) beats Q (3 hops)
        let (schema, reporter) = extract(
            r#"
            #[record]
            pub trait Root: A + X + M {}
            pub trait A: L {}
            pub trait L: X {}
            pub trait X: P {}
            pub trait P {
                #[wire(name = "fromP")]
                fn v(&self) -> u8;
            }
            pub trait M: N {}
            pub trait N: Q {}
            pub trait Q {
                #[wire(name = "fromQ")]
                fn v(&self) -> u8;
            }
            "#,
            "Root",
        );
        let schema = schema.expect("extract");

        assert_eq!(schema.wire_names().collect::<Vec<_>>(), vec!["fromP"]);
        assert_eq!(schema.fields[0].declared_by.path(), "crate::m::P");
        assert_eq!(reporter.warnings().len(), 1);
        assert_eq!(reporter.warnings()[0].route, "crate::m::Q::v");
    }

    #[test]
    fn attribute_errors_fail_every_root_that_reaches_them() {
        let src = r"
            pub trait Base {
                #[wire(name = 5)]
                fn count(&self) -> u8;
            }
            #[record]
            pub trait Uses: Base {}
            #[record]
            pub trait Apart { fn name(&self) -> String; }
        ";
        let (schema, _) = extract(src, "Uses");
        let errs = schema.expect_err("bad wire");
        assert_eq!(errs.routes().collect::<Vec<_>>(), vec!["crate::m::Base::count"]);

        let (schema, _) = extract(src, "Apart");
        assert!(schema.is_ok());
    }
}
