use crate::prelude::*;

///
/// RecordSchema
/// A fully resolved generation unit; fields are flat and already substituted.
///

#[derive(Clone, Debug)]
pub struct RecordSchema {
    pub def: Def,
    pub generics: Vec<GenericParam>,
    pub fields: Vec<FieldDescriptor>,
    pub impls: Vec<TraitImpl>,
    pub kind: SchemaKind,
}

impl RecordSchema {
    #[must_use]
    pub const fn is_polymorphic(&self) -> bool {
        matches!(self.kind, SchemaKind::Polymorphic(_))
    }

    #[must_use]
    pub const fn tag(&self) -> Option<&PolymorphicTag> {
        match &self.kind {
            SchemaKind::Polymorphic(tag) => Some(tag),
            SchemaKind::Simple => None,
        }
    }

    #[must_use]
    pub fn field(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }

    pub fn wire_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.wire_name.as_str())
    }

    /// True when `path` is this schema or one of its resolved ancestors.
    #[must_use]
    pub fn implements(&self, path: &str) -> bool {
        self.impls.iter().any(|i| i.def.path() == path)
    }
}

///
/// SchemaKind
///

#[derive(Clone, Debug)]
pub enum SchemaKind {
    Simple,
    Polymorphic(PolymorphicTag),
}

///
/// FieldDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    pub wire_name: String,
    pub ident: String,
    pub ty: TypeRef,
    pub optional: bool,
    pub access: Access,
    pub declared_by: Def,
}

///
/// TraitImpl
/// One trait the emitted record implements, with its resolved arguments.
///

#[derive(Clone, Debug)]
pub struct TraitImpl {
    pub def: Def,
    pub args: Vec<TypeRef>,
    pub accessors: Vec<AccessorImpl>,
}

///
/// AccessorImpl
/// An accessor body: which field it reads and the signature it satisfies.
///

#[derive(Clone, Debug)]
pub struct AccessorImpl {
    pub ident: String,
    pub field: String,
    pub access: Access,
    pub ret: TypeRef,
}

///
/// PolymorphicTag
///

#[derive(Clone, Debug)]
pub struct PolymorphicTag {
    pub field: String,
    pub accessor: String,
    pub designator: Def,
    pub variants: Vec<Variant>,
}

impl PolymorphicTag {
    #[must_use]
    pub fn variant(&self, constant: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.constant == constant)
    }
}

///
/// Variant
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Variant {
    pub constant: String,
    pub schema: Def,
}
