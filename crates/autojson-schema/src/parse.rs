use crate::{
    attr::{self, RECORD_ATTR, VARIANT_TYPE_ATTR},
    prelude::*,
};
use syn::{
    Expr, ExprLit, FnArg, GenericArgument, GenericParam as SynGenericParam, ImplItem, Item,
    ItemEnum, ItemImpl, ItemTrait, Lit, Pat, PathArguments, ReturnType, Stmt, TraitItem,
    TraitItemFn, Type, TypeParamBound, spanned::Spanned,
};

/// Parse one source file into declarations rooted at `module_path`.
///
/// Only syntax errors fail here. Malformed `#[record]`, `#[wire]` and
/// `#[variant_type]` usage is recorded on the declaration it belongs to.
pub fn parse_source(src: &str, module_path: &str) -> Result<Declarations, syn::Error> {
    let file = syn::parse_file(src)?;
    let mut decls = Declarations::new();

    parse_items(&file.items, module_path, &mut decls);
    tracing::trace!(module = module_path, traits = decls.traits().count(), "parsed source");

    Ok(decls)
}

fn parse_items(items: &[Item], module_path: &str, decls: &mut Declarations) {
    for item in items {
        match item {
            Item::Trait(item) => decls.insert_trait(parse_trait(item, module_path)),
            Item::Enum(item) => decls.insert_enum(parse_enum(item, module_path)),
            Item::Impl(item) if item.trait_.is_none() => {
                if let Some(decl) = parse_impl(item, module_path) {
                    decls.insert_impl(decl);
                }
            }
            Item::Mod(item) => {
                if let Some((_, content)) = &item.content {
                    let nested = Def::new(module_path, item.ident.to_string()).path();
                    parse_items(content, &nested, decls);
                }
            }
            _ => {}
        }
    }
}

//
// traits
//

fn parse_trait(item: &ItemTrait, module_path: &str) -> TraitDecl {
    let mut decl = TraitDecl::new(Def::new(module_path, item.ident.to_string()));

    // a marker with bad arguments still makes a root, which is then stubbed
    decl.marker = match attr::record_args(&item.attrs) {
        Ok(args) => args.map(|args| RecordMarker {
            designator: args.designator_name(),
        }),
        Err(err) => {
            add_errors(&mut decl.errors, &decl.def.path(), err);
            attr::find_attr(&item.attrs, RECORD_ATTR).map(|_| RecordMarker::default())
        }
    };

    for param in &item.generics.params {
        if let SynGenericParam::Type(param) = param {
            let bound = param.default.clone().map(TypeRef::new);
            decl.generics.push(GenericParam::new(param.ident.to_string(), bound));
        }
    }

    for bound in &item.supertraits {
        let TypeParamBound::Trait(bound) = bound else {
            continue;
        };
        let Some(last) = bound.path.segments.last() else {
            continue;
        };

        let args = match &last.arguments {
            PathArguments::AngleBracketed(args) => args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(TypeRef::new(ty.clone())),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        decl.supertraits
            .push(SuperTrait::new(attr::path_to_string(&bound.path), args));
    }

    for trait_item in &item.items {
        if let TraitItem::Fn(method) = trait_item
            && method.default.is_none()
        {
            let accessor = parse_accessor(method, &decl.def, &mut decl.errors);
            decl.accessors.push(accessor);
        }
    }

    decl
}

fn parse_accessor(method: &TraitItemFn, owner: &Def, errors: &mut ErrorTree) -> AccessorDecl {
    let sig = &method.sig;

    let receiver = match sig.receiver() {
        Some(recv) => match (&recv.reference, recv.mutability) {
            (Some(_), None) if recv.colon_token.is_none() => Receiver::Ref,
            (Some(_), Some(_)) => Receiver::RefMut,
            _ => match recv.ty.as_ref() {
                Type::Reference(reference) if reference.mutability.is_some() => Receiver::RefMut,
                Type::Reference(_) => Receiver::Ref,
                _ => Receiver::Value,
            },
        },
        None => Receiver::None,
    };

    let params = sig
        .inputs
        .iter()
        .filter_map(|input| match input {
            FnArg::Typed(typed) => Some(quote::ToTokens::to_token_stream(&typed.pat).to_string()),
            FnArg::Receiver(_) => None,
        })
        .collect();

    let type_params = sig
        .generics
        .params
        .iter()
        .filter_map(|param| match param {
            SynGenericParam::Type(param) => Some(param.ident.to_string()),
            SynGenericParam::Const(param) => Some(param.ident.to_string()),
            SynGenericParam::Lifetime(_) => None,
        })
        .collect();

    let ret = match &sig.output {
        ReturnType::Type(_, ty) => Some(TypeRef::new((**ty).clone())),
        ReturnType::Default => None,
    };

    let wire = attr::wire_name(&method.attrs).unwrap_or_else(|err| {
        add_errors(errors, &owner.member(&sig.ident.to_string()), err);
        None
    });

    AccessorDecl {
        ident: sig.ident.to_string(),
        wire,
        receiver,
        params,
        type_params,
        ret,
    }
}

fn add_errors(errors: &mut ErrorTree, route: &str, err: syn::Error) {
    for err in err {
        errors.add_for(route, err);
    }
}

//
// enums
//

fn parse_enum(item: &ItemEnum, module_path: &str) -> EnumDecl {
    let constants = item
        .variants
        .iter()
        .map(|variant| variant.ident.to_string())
        .collect();

    EnumDecl::new(Def::new(module_path, item.ident.to_string()), constants)
}

fn parse_impl(item: &ItemImpl, module_path: &str) -> Option<ImplDecl> {
    let Type::Path(self_ty) = item.self_ty.as_ref() else {
        return None;
    };
    let self_ident = self_ty.path.segments.last()?.ident.to_string();

    let mut methods = Vec::new();
    for impl_item in &item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let variant_type = attr::find_attr(&method.attrs, VARIANT_TYPE_ATTR).is_some();
        let (arms, errors) = if variant_type {
            match parse_variant_arms(&method.block.stmts, method.span()) {
                Ok(arms) => (arms, Vec::new()),
                Err(err) => (Vec::new(), err.into_iter().map(|e| e.to_string()).collect()),
            }
        } else {
            (Vec::new(), Vec::new())
        };

        methods.push(EnumMethod {
            ident: method.sig.ident.to_string(),
            variant_type,
            arms,
            errors,
        });
    }

    Some(ImplDecl {
        module_path: module_path.to_string(),
        self_ident,
        methods,
    })
}

// The body must end in `match self { Kind::A | Kind::B => "Variant", .. }`.
fn parse_variant_arms(stmts: &[Stmt], span: proc_macro2::Span) -> Result<Vec<VariantArm>, syn::Error> {
    let Some(Stmt::Expr(expr, None)) = stmts.last() else {
        return Err(syn::Error::new(
            span,
            "variant_type method must end in a `match self` over the designator constants",
        ));
    };
    let Expr::Match(expr_match) = strip_expr(expr) else {
        return Err(syn::Error::new_spanned(
            expr,
            "variant_type method must end in a `match self` over the designator constants",
        ));
    };

    let mut arms = Vec::new();
    for arm in &expr_match.arms {
        let target = match strip_expr(&arm.body) {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => lit.value(),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "variant_type arm must be a string literal naming the variant schema",
                ));
            }
        };

        let mut constants = Vec::new();
        collect_constants(&arm.pat, &mut constants)?;
        for constant in constants {
            arms.push(VariantArm::new(constant, target.clone()));
        }
    }

    Ok(arms)
}

fn collect_constants(pat: &Pat, out: &mut Vec<String>) -> Result<(), syn::Error> {
    let path = match pat {
        Pat::Or(or) => {
            for case in &or.cases {
                collect_constants(case, out)?;
            }
            return Ok(());
        }
        Pat::Paren(paren) => return collect_constants(&paren.pat, out),
        Pat::Ident(ident) if ident.subpat.is_none() => {
            out.push(ident.ident.to_string());
            return Ok(());
        }
        Pat::Path(path) => &path.path,
        Pat::TupleStruct(pat) => &pat.path,
        Pat::Struct(pat) => &pat.path,
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "variant_type arms must name designator constants explicitly",
            ));
        }
    };

    if let Some(last) = path.segments.last() {
        out.push(last.ident.to_string());
    }

    Ok(())
}

fn strip_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => strip_expr(&paren.expr),
        Expr::Group(group) => strip_expr(&group.expr),
        Expr::Block(block) if block.block.stmts.len() == 1 => match &block.block.stmts[0] {
            Stmt::Expr(inner, None) => strip_expr(inner),
            _ => expr,
        },
        other => other,
    }
}
