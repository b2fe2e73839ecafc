//! Method sets and selector lookup over embedded fields.
//!
//! Both walks are breadth-first by embedding depth with a visited set keyed
//! by [`TypeId`], so embedding cycles through pointers terminate and two
//! distinct types that happen to share a name are never confused. A name
//! found at a shallower depth hides the same name deeper down; two hits at
//! the same depth make the name ambiguous.

use super::DeclarationTable;
use crate::{DeclKind, Declaration, Type, TypeId, TypePool};
use gi_ir::Name;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodEntry {
    pub name: Name,
    /// The method's `Func` declaration; `None` for interface methods.
    pub decl: Option<crate::DeclId>,
    /// The method's signature, receiver excluded.
    pub sig: TypeId,
    /// Indices of the embedded fields walked to reach the receiver.
    pub path: Vec<usize>,
    /// A pointer was followed on the way (or the start type was a pointer).
    pub indirect: bool,
    pub pointer_recv: bool,
}

/// The methods callable on a type, promoted ones included. Methods with a
/// pointer receiver are present with `pointer_recv` set; whether they apply
/// depends on the operand, which the caller knows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodSet {
    methods: FxHashMap<Name, MethodEntry>,
}

impl MethodSet {
    pub fn get(&self, name: Name) -> Option<&MethodEntry> {
        self.methods.get(&name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn names(&self) -> Vec<Name> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSelection {
    /// Field indices from the operand's struct down to the field itself.
    pub path: Vec<usize>,
    pub ty: TypeId,
    pub indirect: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Field(FieldSelection),
    Method(MethodEntry),
    Ambiguous,
    NotFound,
}

/// Why a type fails to implement an interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MissingMethod {
    pub name: Name,
    /// The method exists but needs a pointer receiver.
    pub pointer_receiver: bool,
    /// The method exists with a different signature.
    pub wrong_type: bool,
}

struct Candidate {
    ty: TypeId,
    path: Vec<usize>,
    indirect: bool,
}

/// Split off one level of pointer.
fn deref(pool: &TypePool, ty: TypeId) -> (TypeId, bool) {
    match pool.get(ty) {
        Type::Pointer(elem) => (*elem, true),
        _ => (ty, false),
    }
}

fn embedded_candidates(pool: &TypePool, cand: &Candidate, next: &mut Vec<Candidate>) {
    for (i, field) in pool.struct_fields(cand.ty).unwrap_or(&[]).iter().enumerate() {
        if field.embedded {
            let (ty, ptr) = deref(pool, field.ty);
            let mut path = cand.path.clone();
            path.push(i);
            next.push(Candidate {
                ty,
                path,
                indirect: cand.indirect || ptr,
            });
        }
    }
}

impl DeclarationTable {
    /// The method set of `ty`, computed once per table generation.
    pub fn method_set(&mut self, pool: &TypePool, ty: TypeId) -> &MethodSet {
        if !self.method_sets.contains_key(&ty) {
            let set = self.compute_method_set(pool, ty);
            self.method_sets.insert(ty, set);
        }
        &self.method_sets[&ty]
    }

    pub fn lookup_method(
        &mut self,
        pool: &TypePool,
        receiver: TypeId,
        method: Name,
    ) -> Option<MethodEntry> {
        self.method_set(pool, receiver).get(method).cloned()
    }

    fn declared_methods(&self, pool: &TypePool, ty: TypeId) -> Vec<(Name, &Declaration)> {
        let Some(methods) = pool
            .named(ty)
            .and_then(|named| named.decl)
            .and_then(|decl| self.decls.get(&decl))
            .and_then(Declaration::methods)
        else {
            return Vec::new();
        };
        methods
            .iter()
            .filter_map(|(name, id)| Some((*name, self.decls.get(id)?)))
            .collect()
    }

    fn compute_method_set(&self, pool: &TypePool, ty: TypeId) -> MethodSet {
        let (start, indirect) = deref(pool, ty);
        if indirect && (pool.is_interface(start) || pool.pointer_elem(start).is_some()) {
            return MethodSet::default();
        }
        let mut current = vec![Candidate {
            ty: start,
            path: Vec::new(),
            indirect,
        }];
        let mut seen = FxHashSet::default();
        let mut methods: FxHashMap<Name, MethodEntry> = FxHashMap::default();
        let mut hidden: FxHashSet<Name> = FxHashSet::default();

        while !current.is_empty() {
            let mut next = Vec::new();
            let mut level: FxHashMap<Name, (MethodEntry, usize)> = FxHashMap::default();
            let mut level_fields = FxHashSet::default();
            for cand in current {
                if !seen.insert(cand.ty) {
                    continue;
                }
                let mut found = |entry: MethodEntry| {
                    level
                        .entry(entry.name)
                        .and_modify(|(_, count)| *count += 1)
                        .or_insert((entry, 1));
                };
                for (name, decl) in self.declared_methods(pool, cand.ty) {
                    let pointer_recv = matches!(
                        decl.kind,
                        DeclKind::Func { receiver: Some(r) } if r.pointer
                    );
                    found(MethodEntry {
                        name,
                        decl: self.method_id(pool, cand.ty, name),
                        sig: decl.ty,
                        path: cand.path.clone(),
                        indirect: cand.indirect,
                        pointer_recv,
                    });
                }
                match pool.underlying_type(cand.ty) {
                    Type::Interface(iface) => {
                        for m in iface {
                            found(MethodEntry {
                                name: m.name,
                                decl: None,
                                sig: m.sig,
                                path: cand.path.clone(),
                                indirect: cand.indirect,
                                pointer_recv: false,
                            });
                        }
                    }
                    Type::Struct(fields) => {
                        level_fields.extend(fields.iter().map(|f| f.name));
                        embedded_candidates(pool, &cand, &mut next);
                    }
                    _ => {}
                }
            }
            for (name, (entry, count)) in level {
                if hidden.contains(&name) || methods.contains_key(&name) {
                    continue;
                }
                if count > 1 || level_fields.contains(&name) {
                    hidden.insert(name);
                } else {
                    methods.insert(name, entry);
                }
            }
            hidden.extend(level_fields);
            current = next;
        }
        MethodSet { methods }
    }

    fn method_id(&self, pool: &TypePool, ty: TypeId, name: Name) -> Option<crate::DeclId> {
        let decl = pool.named(ty)?.decl?;
        self.decls.get(&decl)?.methods()?.get(&name).copied()
    }

    /// Find field `name` reachable from `ty`, returning it with its depth.
    fn find_field(&self, pool: &TypePool, ty: TypeId, name: Name) -> Option<(Lookup, usize)> {
        let (start, indirect) = deref(pool, ty);
        let mut current = vec![Candidate {
            ty: start,
            path: Vec::new(),
            indirect,
        }];
        let mut seen = FxHashSet::default();
        let mut depth = 0;
        while !current.is_empty() {
            let mut next = Vec::new();
            let mut hits = Vec::new();
            for cand in current {
                if !seen.insert(cand.ty) {
                    continue;
                }
                let fields = pool.struct_fields(cand.ty).unwrap_or(&[]);
                if let Some(i) = fields.iter().position(|f| f.name == name) {
                    let mut path = cand.path.clone();
                    path.push(i);
                    hits.push(FieldSelection {
                        path,
                        ty: fields[i].ty,
                        indirect: cand.indirect,
                    });
                }
                embedded_candidates(pool, &cand, &mut next);
            }
            match hits.len() {
                0 => {}
                1 => return hits.pop().map(|hit| (Lookup::Field(hit), depth)),
                _ => return Some((Lookup::Ambiguous, depth)),
            }
            current = next;
            depth += 1;
        }
        None
    }

    /// Resolve the selector `x.name` for an operand of type `ty`.
    pub fn lookup_field_or_method(&mut self, pool: &TypePool, ty: TypeId, name: Name) -> Lookup {
        let field = self.find_field(pool, ty, name);
        let method = self.lookup_method(pool, ty, name);
        match (field, method) {
            (Some((field, depth)), Some(method)) => match method.path.len().cmp(&depth) {
                std::cmp::Ordering::Less => Lookup::Method(method),
                std::cmp::Ordering::Greater => field,
                std::cmp::Ordering::Equal => Lookup::Ambiguous,
            },
            (Some((field, _)), None) => field,
            (None, Some(method)) => Lookup::Method(method),
            (None, None) => Lookup::NotFound,
        }
    }

    /// Check that `ty` has every method of interface `iface`.
    pub fn implements(
        &mut self,
        pool: &TypePool,
        ty: TypeId,
        iface: TypeId,
    ) -> Result<(), MissingMethod> {
        let required = pool.interface_methods(iface).unwrap_or(&[]).to_vec();
        let is_pointer = pool.pointer_elem(ty).is_some() && !pool.is_named(ty);
        for want in required {
            let missing = MissingMethod {
                name: want.name,
                pointer_receiver: false,
                wrong_type: false,
            };
            let Some(have) = self.lookup_method(pool, ty, want.name) else {
                return Err(missing);
            };
            if have.sig != want.sig {
                return Err(MissingMethod {
                    wrong_type: true,
                    ..missing
                });
            }
            if have.pointer_recv && !have.indirect && !is_pointer {
                return Err(MissingMethod {
                    pointer_receiver: true,
                    ..missing
                });
            }
        }
        Ok(())
    }
}
