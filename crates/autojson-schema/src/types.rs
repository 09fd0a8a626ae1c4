use crate::OPTIONAL_WRAPPER;
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident};
use std::{collections::BTreeMap, fmt};
use syn::{
    PathArguments, Type, parse_quote,
    visit_mut::{self, VisitMut},
};

/// Generic parameter name to the type it is bound to at one inheritance level.
pub type Bindings = BTreeMap<String, TypeRef>;

///
/// TypeRef
/// A type as written in a declaration, possibly after generic substitution.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TypeRef(Type);

impl TypeRef {
    #[must_use]
    pub const fn new(ty: Type) -> Self {
        Self(ty)
    }

    pub fn parse(src: &str) -> Result<Self, syn::Error> {
        syn::parse_str::<Type>(src).map(Self)
    }

    /// The bare type parameter `name` as a type.
    #[must_use]
    pub fn param(name: &str) -> Self {
        let ident = format_ident!("{name}");

        Self(parse_quote!(#ident))
    }

    #[must_use]
    pub const fn as_type(&self) -> &Type {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Type {
        self.0
    }

    /// Last path segment with generic arguments dropped (`Vec<T>` → `Vec`).
    #[must_use]
    pub fn erased(&self) -> Option<String> {
        match strip_group(&self.0) {
            Type::Path(path) if path.qself.is_none() => path
                .path
                .segments
                .last()
                .map(|segment| segment.ident.to_string()),
            _ => None,
        }
    }

    /// True when the erased type is the optional wrapper.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.erased().as_deref() == Some(OPTIONAL_WRAPPER)
    }

    /// True when this type is exactly the bare type parameter `name`.
    #[must_use]
    pub fn is_param(&self, name: &str) -> bool {
        match strip_group(&self.0) {
            Type::Path(path) if path.qself.is_none() && path.path.leading_colon.is_none() => {
                path.path.segments.len() == 1
                    && path.path.segments[0].ident == name
                    && matches!(path.path.segments[0].arguments, PathArguments::None)
            }
            _ => false,
        }
    }

    /// Replace every bare occurrence of a bound parameter, at any depth.
    #[must_use]
    pub fn substitute(&self, bindings: &Bindings) -> Self {
        if bindings.is_empty() {
            return self.clone();
        }

        let mut ty = self.0.clone();
        Substitute { bindings }.visit_type_mut(&mut ty);

        Self(ty)
    }

    /// True when `&mut` is the outermost layer.
    #[must_use]
    pub const fn is_mut_ref(&self) -> bool {
        matches!(&self.0, Type::Reference(reference) if reference.mutability.is_some())
    }

    /// The owned storage type behind a returned type.
    ///
    /// `&str` is stored as `String`, `&[T]` as `Vec<T>` and `&T` as `T`;
    /// anything else is stored as written.
    #[must_use]
    pub fn storage(&self) -> (Self, Access) {
        let Type::Reference(reference) = &self.0 else {
            return (self.clone(), Access::Owned);
        };

        let owned: Type = match strip_group(&reference.elem) {
            Type::Path(path) if path.qself.is_none() && path.path.is_ident("str") => {
                parse_quote!(String)
            }
            Type::Slice(slice) => {
                let elem = &slice.elem;
                parse_quote!(Vec<#elem>)
            }
            other => other.clone(),
        };

        (Self(owned), Access::Borrowed)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.0.to_token_stream().to_string();
        let tidy = raw
            .replace(" :: ", "::")
            .replace(":: ", "::")
            .replace(" <", "<")
            .replace("< ", "<")
            .replace(" >", ">")
            .replace(" ,", ",")
            .replace("& ", "&");

        f.write_str(&tidy)
    }
}

impl ToTokens for TypeRef {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.0.to_tokens(tokens);
    }
}

fn strip_group(ty: &Type) -> &Type {
    match ty {
        Type::Group(group) => strip_group(&group.elem),
        Type::Paren(paren) => strip_group(&paren.elem),
        other => other,
    }
}

// Substitute
struct Substitute<'a> {
    bindings: &'a Bindings,
}

impl VisitMut for Substitute<'_> {
    fn visit_type_mut(&mut self, ty: &mut Type) {
        if let Type::Path(path) = &*ty
            && path.qself.is_none()
            && path.path.leading_colon.is_none()
            && path.path.segments.len() == 1
            && matches!(path.path.segments[0].arguments, PathArguments::None)
            && let Some(bound) = self
                .bindings
                .get(&path.path.segments[0].ident.to_string())
        {
            *ty = bound.0.clone();
            return;
        }

        visit_mut::visit_type_mut(self, ty);
    }
}

///
/// Access
/// How a generated accessor hands out its field.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[remain::sorted]
pub enum Access {
    /// Returns a reference into the stored value.
    Borrowed,

    /// Returns a clone of the stored value.
    #[default]
    Owned,
}

///
/// GenericParam
/// A declared type parameter; `bound` is the declared default (`T = Bound`),
/// used when an inheriting declaration supplies no argument.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenericParam {
    pub name: String,
    pub bound: Option<TypeRef>,
}

impl GenericParam {
    #[must_use]
    pub fn new(name: impl Into<String>, bound: Option<TypeRef>) -> Self {
        Self {
            name: name.into(),
            bound,
        }
    }
}
