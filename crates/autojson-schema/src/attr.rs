use darling::{Error as DarlingError, FromMeta, ast::NestedMeta};
use proc_macro2::TokenStream;
use syn::{Attribute, Meta};

/// Generation marker on a trait.
pub const RECORD_ATTR: &str = "record";

/// Marker for ancestor traits that are not generated themselves.
pub const SCHEMA_ATTR: &str = "schema";

/// Wire name override on an accessor.
pub const WIRE_ATTR: &str = "wire";

/// Marks the designator method that names each constant's variant schema.
pub const VARIANT_TYPE_ATTR: &str = "variant_type";

/// Helper attributes consumed by the trait macros and stripped from output.
pub const HELPER_ATTRS: [&str; 1] = [WIRE_ATTR];

///
/// RecordArgs
/// `#[record]` or `#[record(designator = Kind)]`
///

#[derive(Clone, Debug, Default, FromMeta)]
pub struct RecordArgs {
    #[darling(default)]
    pub designator: Option<syn::Path>,
}

impl RecordArgs {
    /// Parse the token list handed to an attribute macro.
    pub fn from_tokens(args: TokenStream) -> Result<Self, DarlingError> {
        if args.is_empty() {
            return Ok(Self::default());
        }

        let items = NestedMeta::parse_meta_list(args)?;

        Self::from_list(&items)
    }

    /// Designator path as written.
    #[must_use]
    pub fn designator_name(&self) -> Option<String> {
        self.designator.as_ref().map(path_to_string)
    }
}

///
/// WireArgs
/// `#[wire(name = "type")]`
///

#[derive(Clone, Debug, FromMeta)]
pub struct WireArgs {
    pub name: String,
}

/// True when the attribute's last path segment is `name`, so both
/// `#[record]` and `#[autojson::record]` match.
#[must_use]
pub fn is_attr(attr: &Attribute, name: &str) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == name)
}

#[must_use]
pub fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| is_attr(attr, name))
}

/// Record arguments when the generation marker is present.
pub fn record_args(attrs: &[Attribute]) -> Result<Option<RecordArgs>, syn::Error> {
    let Some(attr) = find_attr(attrs, RECORD_ATTR) else {
        return Ok(None);
    };

    let args = match &attr.meta {
        Meta::Path(_) => RecordArgs::default(),
        Meta::List(list) => RecordArgs::from_tokens(list.tokens.clone())
            .map_err(|e| syn::Error::new_spanned(attr, e.to_string()))?,
        Meta::NameValue(_) => {
            return Err(syn::Error::new_spanned(
                attr,
                "expected `#[record]` or `#[record(designator = Enum)]`",
            ));
        }
    };

    Ok(Some(args))
}

/// Explicit wire name from a `#[wire(name = "...")]` helper.
pub fn wire_name(attrs: &[Attribute]) -> Result<Option<String>, syn::Error> {
    let Some(attr) = find_attr(attrs, WIRE_ATTR) else {
        return Ok(None);
    };

    let args = WireArgs::from_meta(&attr.meta)
        .map_err(|e| syn::Error::new_spanned(attr, e.to_string()))?;

    if args.name.is_empty() {
        return Err(syn::Error::new_spanned(attr, "wire name must not be empty"));
    }

    Ok(Some(args.name))
}

/// Drop helper attributes so the emitted item compiles without them.
pub fn strip_helpers(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !HELPER_ATTRS.iter().any(|name| is_attr(attr, name)));
}

#[must_use]
pub fn path_to_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use syn::parse_quote;

    #[test]
    fn bare_marker_has_no_designator() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[record])];
        let args = record_args(&attrs).expect("parse").expect("present");

        assert!(args.designator.is_none());
    }

    #[test]
    fn designator_is_a_path() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[autojson::record(designator = kinds::ShapeKind)])];
        let args = record_args(&attrs).expect("parse").expect("present");

        assert_eq!(args.designator_name().as_deref(), Some("kinds::ShapeKind"));
    }

    #[test]
    fn unknown_record_argument_is_rejected() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[record(discriminator = Kind)])];

        assert!(record_args(&attrs).is_err());
        assert!(RecordArgs::from_tokens(quote!(designator = Kind)).is_ok());
    }

    #[test]
    fn wire_override_is_read_and_stripped() {
        let mut attrs: Vec<Attribute> = vec![
            parse_quote!(#[wire(name = "type")]),
            parse_quote!(#[doc = "kind"]),
        ];

        assert_eq!(wire_name(&attrs).expect("parse").as_deref(), Some("type"));

        strip_helpers(&mut attrs);
        assert_eq!(attrs.len(), 1);
        assert!(wire_name(&attrs).expect("parse").is_none());
    }

    #[test]
    fn empty_wire_name_is_rejected() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[wire(name = "")])];

        assert!(wire_name(&attrs).is_err());
    }
}
