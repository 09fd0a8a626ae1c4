use crate::prelude::*;
use derive_more::Display;

///
/// TraitDecl
/// A trait as declared in source: a generation root when `marker` is set,
/// otherwise only reachable as an ancestor of one. Malformed helper
/// attributes are kept in `errors` and fail every root that reaches it.
///

#[derive(Clone, Debug)]
pub struct TraitDecl {
    pub def: Def,
    pub generics: Vec<GenericParam>,
    pub supertraits: Vec<SuperTrait>,
    pub accessors: Vec<AccessorDecl>,
    pub marker: Option<RecordMarker>,
    pub errors: ErrorTree,
}

impl TraitDecl {
    #[must_use]
    pub fn new(def: Def) -> Self {
        Self {
            def,
            generics: Vec::new(),
            supertraits: Vec::new(),
            accessors: Vec::new(),
            marker: None,
            errors: ErrorTree::new(),
        }
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.marker.is_some()
    }

    /// Designator enum named by the generation marker, if polymorphic.
    #[must_use]
    pub fn designator(&self) -> Option<&str> {
        self.marker
            .as_ref()
            .and_then(|marker| marker.designator.as_deref())
    }

    #[must_use]
    pub fn accessor(&self, ident: &str) -> Option<&AccessorDecl> {
        self.accessors.iter().find(|a| a.ident == ident)
    }
}

///
/// RecordMarker
/// Presence triggers generation; a designator switches to polymorphic mode.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RecordMarker {
    pub designator: Option<String>,
}

///
/// SuperTrait
/// One supertrait bound, with the generic arguments written at that bound.
///

#[derive(Clone, Debug)]
pub struct SuperTrait {
    pub ident: String,
    pub args: Vec<TypeRef>,
}

impl SuperTrait {
    #[must_use]
    pub fn new(ident: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            ident: ident.into(),
            args,
        }
    }
}

///
/// AccessorDecl
/// A required trait method; valid accessors are `&self` with nothing else.
///

#[derive(Clone, Debug)]
pub struct AccessorDecl {
    pub ident: String,
    pub wire: Option<String>,
    pub receiver: Receiver,
    pub params: Vec<String>,
    pub type_params: Vec<String>,
    pub ret: Option<TypeRef>,
}

impl AccessorDecl {
    /// A well-formed `fn ident(&self) -> ret` accessor.
    #[must_use]
    pub fn new(ident: impl Into<String>, ret: TypeRef) -> Self {
        Self {
            ident: ident.into(),
            wire: None,
            receiver: Receiver::Ref,
            params: Vec::new(),
            type_params: Vec::new(),
            ret: Some(ret),
        }
    }

    #[must_use]
    pub fn with_wire(mut self, wire: impl Into<String>) -> Self {
        self.wire = Some(wire.into());
        self
    }
}

///
/// Receiver
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum Receiver {
    /// associated function without a receiver
    #[display("no receiver")]
    None,
    #[display("&self")]
    Ref,
    #[display("&mut self")]
    RefMut,
    /// `self`, `self: Box<Self>` and friends
    #[display("self")]
    Value,
}

///
/// EnumDecl
///

#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub def: Def,
    pub constants: Vec<String>,
}

impl EnumDecl {
    #[must_use]
    pub fn new(def: Def, constants: Vec<String>) -> Self {
        Self { def, constants }
    }

    #[must_use]
    pub fn has_constant(&self, constant: &str) -> bool {
        self.constants.iter().any(|c| c == constant)
    }
}

///
/// ImplDecl
/// An inherent impl block; its self type is resolved lazily by ident.
///

#[derive(Clone, Debug)]
pub struct ImplDecl {
    pub module_path: String,
    pub self_ident: String,
    pub methods: Vec<EnumMethod>,
}

///
/// EnumMethod
/// A method in an impl of an enum. Only the `#[variant_type]` method carries
/// arms: one `constant => "VariantSchema"` entry per match arm. A body that
/// cannot be read as arms leaves them empty and records why in `errors`.
///

#[derive(Clone, Debug, Default)]
pub struct EnumMethod {
    pub ident: String,
    pub variant_type: bool,
    pub arms: Vec<VariantArm>,
    pub errors: Vec<String>,
}

///
/// VariantArm
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariantArm {
    pub constant: String,
    pub target: String,
}

impl VariantArm {
    #[must_use]
    pub fn new(constant: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            constant: constant.into(),
            target: target.into(),
        }
    }
}
