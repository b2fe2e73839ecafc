//! The session's top-level symbol table.
//!
//! One flat scope maps names to declarations. Declaring a name that is
//! already bound *replaces* the old declaration: the old entry leaves the
//! scope, the object index, every dependency edge and, for a type name,
//! takes its methods with it. Methods are keyed by (receiver type, method
//! name) inside the receiver's `TypeName`, so redefining a method swaps the
//! entry in place.
//!
//! Every mutation is a single `&mut self` call that validates first and
//! edits second, so a failed call leaves the table untouched.

mod method_set;

pub use method_set::{FieldSelection, Lookup, MethodEntry, MethodSet, MissingMethod};

use crate::{DeclId, DeclKind, Declaration, ObjectInfo, RedeclarationConflict, TypeId, TypePool};
use gi_ir::Name;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct DeclarationTable {
    scope: FxHashMap<Name, DeclId>,
    decls: FxHashMap<DeclId, Declaration>,
    objects: FxHashMap<DeclId, ObjectInfo>,
    next_id: u32,
    next_order: u32,
    /// Memoized method sets, dropped wholesale on every declaration.
    method_sets: FxHashMap<TypeId, MethodSet>,
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, decl: &Declaration) -> DeclId {
        let id = DeclId::new(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            ObjectInfo {
                order: self.next_order,
                span: decl.span,
                deps: FxHashSet::default(),
            },
        );
        self.next_order += 1;
        id
    }

    /// Insert `decl` into the top-level scope, replacing any declaration of
    /// the same name. Returns the new id and the replaced declaration.
    ///
    /// `_` is never inserted: the returned id resolves to nothing.
    pub fn declare(&mut self, decl: Declaration) -> (DeclId, Option<Declaration>) {
        if decl.name.is_blank() {
            let id = DeclId::new(self.next_id);
            self.next_id += 1;
            return (id, None);
        }
        let id = self.alloc(&decl);
        let name = decl.name;
        let kind = decl.kind.describe();
        self.decls.insert(id, decl);
        let replaced = self
            .scope
            .insert(name, id)
            .and_then(|old| self.remove_object(old));
        self.method_sets.clear();
        debug!(
            ?name,
            ?id,
            kind,
            replaced = replaced.is_some(),
            "declared"
        );
        (id, replaced)
    }

    /// Attach method `decl` to the type declared as `receiver`. A method
    /// named `_` is dropped.
    ///
    /// Fails if the receiver's struct type has a field of the same name.
    /// Otherwise any method of the same name on that type is removed from
    /// the method set and the object index before the new one goes in.
    pub fn declare_method(
        &mut self,
        pool: &TypePool,
        receiver: DeclId,
        decl: Declaration,
    ) -> Result<(DeclId, Option<Declaration>), RedeclarationConflict> {
        let method = decl.name;
        if method.is_blank() {
            let id = DeclId::new(self.next_id);
            self.next_id += 1;
            return Ok((id, None));
        }
        if let Some(type_decl) = self.decls.get(&receiver) {
            let fields = pool.struct_fields(type_decl.ty).unwrap_or(&[]);
            if fields.iter().any(|f| f.name == method) {
                return Err(RedeclarationConflict {
                    type_name: type_decl.name,
                    member: method,
                    span: decl.span,
                });
            }
        }

        let id = self.alloc(&decl);
        self.decls.insert(id, decl);
        let old = match self.decls.get_mut(&receiver).map(|d| &mut d.kind) {
            Some(DeclKind::TypeName { methods, .. }) => methods.insert(method, id),
            _ => None,
        };
        let replaced = old.and_then(|old| self.remove_object(old));
        self.method_sets.clear();
        debug!(?method, ?receiver, ?id, replaced = replaced.is_some(), "declared method");
        Ok((id, replaced))
    }

    /// Drop a declaration from the object index and from every dependency
    /// edge. A type name takes its methods along.
    fn remove_object(&mut self, id: DeclId) -> Option<Declaration> {
        let decl = self.decls.remove(&id)?;
        self.objects.remove(&id);
        let mut gone = vec![id];
        if let Some(methods) = decl.methods() {
            for method in methods.values() {
                self.decls.remove(method);
                self.objects.remove(method);
                gone.push(*method);
            }
        }
        for info in self.objects.values_mut() {
            for id in &gone {
                info.deps.remove(id);
            }
        }
        debug!(?id, removed = gone.len(), "removed replaced declaration");
        Some(decl)
    }

    pub fn lookup(&self, name: Name) -> Option<(DeclId, &Declaration)> {
        let id = *self.scope.get(&name)?;
        self.decls.get(&id).map(|decl| (id, decl))
    }

    /// A live declaration by id, methods included.
    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(&id)
    }

    /// Fill in the type of a declaration whose type was not known when it
    /// was declared (aliases, recursive functions).
    pub fn set_type(&mut self, id: DeclId, ty: TypeId) {
        if let Some(decl) = self.decls.get_mut(&id) {
            decl.ty = ty;
        }
    }

    pub fn object(&self, id: DeclId) -> Option<&ObjectInfo> {
        self.objects.get(&id)
    }

    /// Record the declarations `id` referred to. Edges to declarations that
    /// are no longer live are dropped.
    pub fn set_deps(&mut self, id: DeclId, deps: FxHashSet<DeclId>) {
        let deps = deps
            .into_iter()
            .filter(|dep| *dep != id && self.decls.contains_key(dep))
            .collect();
        if let Some(info) = self.objects.get_mut(&id) {
            info.deps = deps;
        }
    }

    /// Live declarations that depend on `id`.
    pub fn dependents(&self, id: DeclId) -> Vec<DeclId> {
        let mut out: Vec<_> = self
            .objects
            .iter()
            .filter(|(_, info)| info.deps.contains(&id))
            .map(|(dep, _)| *dep)
            .collect();
        out.sort();
        out
    }

    /// Top-level names in declaration order.
    pub fn names(&self) -> Vec<Name> {
        let mut entries: Vec<_> = self
            .scope
            .iter()
            .filter_map(|(name, id)| Some((self.objects.get(id)?.order, *name)))
            .collect();
        entries.sort_unstable();
        entries.into_iter().map(|(_, name)| name).collect()
    }

    /// Number of live objects, methods included.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests;
