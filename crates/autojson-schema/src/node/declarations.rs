use crate::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

///
/// Declarations
/// Arena of everything the front end collected in one pass, keyed by path.
///

#[derive(Clone, Debug, Default)]
pub struct Declarations {
    traits: BTreeMap<String, TraitDecl>,
    trait_order: Vec<String>,
    enums: BTreeMap<String, EnumDecl>,
    impls: Vec<ImplDecl>,
}

impl Declarations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_trait(&mut self, decl: TraitDecl) {
        let path = decl.def.path();
        if !self.traits.contains_key(&path) {
            self.trait_order.push(path.clone());
        }

        self.traits.insert(path, decl);
    }

    pub fn insert_enum(&mut self, decl: EnumDecl) {
        self.enums.insert(decl.def.path(), decl);
    }

    pub fn insert_impl(&mut self, decl: ImplDecl) {
        self.impls.push(decl);
    }

    /// Move everything from another arena into this one.
    pub fn extend(&mut self, other: Self) {
        let Self {
            mut traits,
            trait_order,
            enums,
            impls,
        } = other;

        for path in trait_order {
            if let Some(decl) = traits.remove(&path) {
                self.insert_trait(decl);
            }
        }
        self.enums.extend(enums);
        self.impls.extend(impls);
    }

    #[must_use]
    pub fn get_trait(&self, path: &str) -> Option<&TraitDecl> {
        self.traits.get(path)
    }

    /// Every trait in source order.
    pub fn traits(&self) -> impl Iterator<Item = &TraitDecl> {
        self.trait_order
            .iter()
            .filter_map(|path| self.traits.get(path))
    }

    /// Generation roots in source order.
    pub fn roots(&self) -> impl Iterator<Item = &TraitDecl> {
        self.traits().filter(|decl| decl.is_root())
    }

    /// Resolve a trait referenced by ident from inside `module_path`.
    ///
    /// A declaration in the same module wins; otherwise the ident must be
    /// unique across the arena.
    #[must_use]
    pub fn resolve_trait(&self, module_path: &str, ident: &str) -> Option<&TraitDecl> {
        resolve(&self.traits, module_path, ident, |decl| &decl.def)
    }

    #[must_use]
    pub fn resolve_enum(&self, module_path: &str, ident: &str) -> Option<&EnumDecl> {
        resolve(&self.enums, module_path, ident, |decl| &decl.def)
    }

    /// Methods of every inherent impl whose self type resolves to `def`.
    pub fn enum_methods<'a>(&'a self, def: &'a Def) -> impl Iterator<Item = &'a EnumMethod> {
        self.impls
            .iter()
            .filter(move |block| {
                block.self_ident == def.ident
                    && self
                        .resolve_enum(&block.module_path, &block.self_ident)
                        .is_some_and(|decl| decl.def == *def)
            })
            .flat_map(|block| block.methods.iter())
    }

    /// Every module path that holds a trait or an enum.
    #[must_use]
    pub fn modules(&self) -> BTreeSet<String> {
        self.traits
            .values()
            .map(|decl| &decl.def)
            .chain(self.enums.values().map(|decl| &decl.def))
            .map(|def| def.module_path.clone())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty() && self.enums.is_empty()
    }
}

fn resolve<'a, T>(
    map: &'a BTreeMap<String, T>,
    module_path: &str,
    ident: &str,
    def: impl Fn(&T) -> &Def,
) -> Option<&'a T> {
    // qualified reference: absolute, then relative to the current module
    if let Some((prefix, last)) = ident.rsplit_once("::") {
        let prefix = prefix.trim_start_matches("::");
        let relative = match prefix.strip_prefix("self") {
            Some("") => module_path.to_string(),
            Some(rest) if rest.starts_with("::") => Def::new(module_path, &rest[2..]).path(),
            _ => Def::new(module_path, prefix).path(),
        };

        return [Def::new(prefix, last), Def::new(relative, last)]
            .iter()
            .find_map(|def| map.get(&def.path()));
    }

    if let Some(found) = map.get(&Def::new(module_path, ident).path()) {
        return Some(found);
    }

    let mut candidates = map.values().filter(|value| def(value).ident == ident);
    match (candidates.next(), candidates.next()) {
        (Some(found), None) => Some(found),
        _ => None,
    }
}
