use crate::prelude::*;

/// Build the polymorphic tag for `root` from its designator enum.
///
/// The root must declare exactly one accessor returning the enum, the enum
/// must have at least one constant, and exactly one of its methods must carry
/// `#[variant_type]` with one arm per constant naming a declared schema.
pub fn scan(
    decls: &Declarations,
    root: &TraitDecl,
    designator: &str,
    fields: &[FieldDescriptor],
) -> Result<PolymorphicTag, ErrorTree> {
    let mut errs = ErrorTree::new();
    let root_route = root.def.path();

    let Some(designator) = decls.resolve_enum(&root.def.module_path, designator) else {
        errs.add_for(root_route, format!("designator enum `{designator}` is not declared"));
        return Err(errs);
    };
    let enum_route = designator.def.path();

    // tag accessor
    let tags = root
        .accessors
        .iter()
        .filter(|accessor| {
            accessor
                .ret
                .as_ref()
                .and_then(|ret| ret.storage().0.erased())
                .is_some_and(|erased| erased == designator.def.ident)
        })
        .collect::<Vec<_>>();

    let tag = match tags.as_slice() {
        [tag] => fields.iter().find(|field| field.ident == tag.ident),
        [] => {
            errs.add_for(
                root_route.clone(),
                format!(
                    "there must be a single accessor returning `{}` inside `{}`",
                    designator.def.ident, root.def.ident
                ),
            );
            None
        }
        many => {
            let idents = many.iter().map(|a| a.ident.as_str()).collect::<Vec<_>>();
            errs.add_for(
                root_route.clone(),
                format!(
                    "there must be a single accessor returning `{}` inside `{}`, found {}",
                    designator.def.ident,
                    root.def.ident,
                    idents.join(", ")
                ),
            );
            None
        }
    };

    if designator.constants.is_empty() {
        errs.add_for(enum_route.clone(), "designator enum must have some values");
    }

    // variant accessor
    let marked = decls
        .enum_methods(&designator.def)
        .filter(|method| method.variant_type)
        .collect::<Vec<_>>();

    let mut variants = Vec::new();
    match marked.as_slice() {
        [method] if !method.errors.is_empty() => {
            for message in &method.errors {
                errs.add_for(designator.def.member(&method.ident), message);
            }
        }
        [method] => {
            for arm in &method.arms {
                if !designator.has_constant(&arm.constant) {
                    errs.add_for(
                        enum_route.clone(),
                        format!("`{}` arm names unknown constant `{}`", method.ident, arm.constant),
                    );
                }
            }

            for constant in &designator.constants {
                let arms = method
                    .arms
                    .iter()
                    .filter(|arm| &arm.constant == constant)
                    .collect::<Vec<_>>();

                let arm = match arms.as_slice() {
                    [arm] => arm,
                    [] => {
                        errs.add_for(
                            designator.def.member(constant),
                            format!("constant has no arm in `{}`", method.ident),
                        );
                        continue;
                    }
                    _ => {
                        errs.add_for(
                            designator.def.member(constant),
                            format!("constant is matched more than once in `{}`", method.ident),
                        );
                        continue;
                    }
                };

                match decls.resolve_trait(&designator.def.module_path, &arm.target) {
                    Some(schema) => variants.push(Variant {
                        constant: constant.clone(),
                        schema: schema.def.clone(),
                    }),
                    None => errs.add_for(
                        designator.def.member(constant),
                        format!("variant schema `{}` is not declared", arm.target),
                    ),
                }
            }
        }
        found => errs.add_for(
            enum_route.clone(),
            format!(
                "there must be a single #[variant_type] method inside `{}`, found {}",
                designator.def.ident,
                found.len()
            ),
        ),
    }

    errs.result()?;

    let Some(tag) = tag else {
        return Err(ErrorTree::from(format!("tag accessor of `{root_route}` did not resolve to a field")));
    };

    Ok(PolymorphicTag {
        field: tag.wire_name.clone(),
        accessor: tag.ident.clone(),
        designator: designator.def.clone(),
        variants,
    })
}
