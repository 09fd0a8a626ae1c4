use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use std::fmt;

///
/// Def
/// Qualified identity of a declaration: the module it lives in plus its ident.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Def {
    pub module_path: String,
    pub ident: String,
}

impl Def {
    #[must_use]
    pub fn new(module_path: impl Into<String>, ident: impl Into<String>) -> Self {
        let module_path = module_path.into();

        Self {
            module_path: module_path.trim_start_matches("::").to_string(),
            ident: ident.into(),
        }
    }

    /// Full `module::Ident` path.
    #[must_use]
    pub fn path(&self) -> String {
        if self.module_path.is_empty() {
            self.ident.clone()
        } else {
            format!("{}::{}", self.module_path, self.ident)
        }
    }

    /// Path of a member living inside this declaration (`module::Ident::member`).
    #[must_use]
    pub fn member(&self, member: &str) -> String {
        format!("{}::{member}", self.path())
    }
}

impl fmt::Display for Def {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl ToTokens for Def {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let segments = self
            .path()
            .split("::")
            .map(|segment| format_ident!("{segment}"))
            .collect::<Vec<_>>();

        tokens.extend(quote!(#(#segments)::*));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_joins_module_and_ident() {
        let def = Def::new("crate::model", "Animal");
        assert_eq!(def.path(), "crate::model::Animal");
        assert_eq!(def.member("name"), "crate::model::Animal::name");
        assert_eq!(def.to_token_stream().to_string(), "crate :: model :: Animal");

        let bare = Def::new("", "Animal");
        assert_eq!(bare.path(), "Animal");
    }

    #[test]
    fn leading_colons_are_dropped() {
        assert_eq!(Def::new("::shapes", "Shape").path(), "shapes::Shape");
    }
}
