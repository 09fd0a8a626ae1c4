use crate::{ACCESSOR_PREFIXES, node::AccessorDecl, types::TypeRef};
use convert_case::{Case, Casing};

///
/// WireName
/// A resolved wire name; `conventional` is false when the accessor ident did
/// not have the expected snake_case shape and was used literally.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WireName {
    pub name: String,
    pub conventional: bool,
}

/// Wire name for an accessor: the explicit override verbatim, else derived
/// from the accessor ident.
#[must_use]
pub fn resolve_wire_name(accessor: &AccessorDecl) -> WireName {
    match &accessor.wire {
        Some(name) => WireName {
            name: name.clone(),
            conventional: true,
        },
        None => wire_name_for(&accessor.ident),
    }
}

/// Strip a `get_`/`is_` prefix and lower-camel-case the rest.
#[must_use]
pub fn wire_name_for(ident: &str) -> WireName {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);

    if ident.is_empty() || ident.to_case(Case::Snake) != ident {
        return WireName {
            name: ident.to_string(),
            conventional: false,
        };
    }

    let stem = ACCESSOR_PREFIXES
        .iter()
        .find_map(|prefix| ident.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(ident);

    WireName {
        name: stem.to_case(Case::Camel),
        conventional: true,
    }
}

#[must_use]
pub fn is_optional(ty: &TypeRef) -> bool {
    ty.is_optional()
}

/// Associated constant name holding a wire name (`firstName` → `FIRST_NAME`).
#[must_use]
pub fn constant_name(wire_name: &str) -> String {
    let constant = wire_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect::<String>()
        .to_case(Case::UpperSnake);

    match constant.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{constant}"),
        None => "_".to_string(),
        Some(_) => constant,
    }
}

#[must_use]
pub fn record_ident(schema_ident: &str, suffix: &str) -> String {
    format!("{schema_ident}{suffix}")
}

#[must_use]
pub fn decoder_ident(schema_ident: &str, suffix: &str) -> String {
    format!("{schema_ident}{suffix}")
}

/// File stem for a generated unit (`AnimalRecord` → `animal_record`).
#[must_use]
pub fn unit_stem(ident: &str) -> String {
    ident.to_case(Case::Snake)
}
