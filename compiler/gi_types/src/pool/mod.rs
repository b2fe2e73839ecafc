//! The type pool.
//!
//! An arena of [`Type`]s addressed by [`TypeId`]. Structural types go through
//! an intern map so identical types share an id; named types are appended
//! fresh and get their underlying type filled in once it is resolved, which
//! lets `type Node struct { next *Node }` refer to itself.

mod format;

use crate::{BasicKind, DeclId, InterfaceMethod, Named, Signature, Type, TypeId};
use gi_ir::ast::ChanDir;
use gi_ir::Name;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub struct TypePool {
    types: Vec<Type>,
    interned: FxHashMap<Type, TypeId>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    /// Create a pool holding the predeclared types at their fixed ids.
    ///
    /// `error` is named by the caller through [`TypePool::set_error_name`]
    /// since names belong to the session's interner.
    pub fn new() -> Self {
        let mut pool = TypePool {
            types: Vec::with_capacity(256),
            interned: FxHashMap::default(),
        };
        let basics = [
            BasicKind::Bool,
            BasicKind::Int,
            BasicKind::Int8,
            BasicKind::Int16,
            BasicKind::Int32,
            BasicKind::Int64,
            BasicKind::Uint,
            BasicKind::Uint8,
            BasicKind::Uint16,
            BasicKind::Uint32,
            BasicKind::Uint64,
            BasicKind::Uintptr,
            BasicKind::Float32,
            BasicKind::Float64,
            BasicKind::Complex64,
            BasicKind::Complex128,
            BasicKind::String,
            BasicKind::UntypedBool,
            BasicKind::UntypedInt,
            BasicKind::UntypedRune,
            BasicKind::UntypedFloat,
            BasicKind::UntypedString,
            BasicKind::UntypedNil,
        ];
        pool.intern(Type::Invalid);
        for kind in basics {
            pool.intern(Type::Basic(kind));
        }
        pool.intern(Type::Tuple(Vec::new()));
        pool.intern(Type::Interface(Vec::new()));
        pool.types.push(Type::Named(Named {
            name: Name::EMPTY,
            decl: None,
            underlying: TypeId::INVALID,
        }));
        debug_assert_eq!(pool.types.len(), TypeId::PREDECLARED_COUNT as usize);
        pool
    }

    /// Give the predeclared `error` type its name and its
    /// `interface { Error() string }` underlying type.
    pub fn set_error_name(&mut self, error: Name, error_method: Name) {
        let sig = self.func(Signature {
            params: Vec::new(),
            results: vec![TypeId::STRING],
            variadic: false,
        });
        let iface = self.interface(vec![InterfaceMethod {
            name: error_method,
            sig,
        }]);
        if let Type::Named(named) = &mut self.types[TypeId::ERROR.index()] {
            named.name = error;
            named.underlying = iface;
        }
    }

    fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId::from_raw(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.types.push(ty);
        id
    }

    /// Intern a structural type.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.interned.get(&ty) {
            return id;
        }
        let id = self.push(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        self.types.get(id.index()).unwrap_or(&Type::Invalid)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // === Constructors ===

    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        self.intern(Type::Pointer(elem))
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.intern(Type::Slice(elem))
    }

    pub fn array(&mut self, len: u64, elem: TypeId) -> TypeId {
        self.intern(Type::Array { len, elem })
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(Type::Map { key, value })
    }

    pub fn chan(&mut self, dir: ChanDir, elem: TypeId) -> TypeId {
        self.intern(Type::Chan { dir, elem })
    }

    pub fn func(&mut self, sig: Signature) -> TypeId {
        self.intern(Type::Func(sig))
    }

    pub fn tuple(&mut self, elems: Vec<TypeId>) -> TypeId {
        self.intern(Type::Tuple(elems))
    }

    pub fn structure(&mut self, fields: Vec<crate::Field>) -> TypeId {
        self.intern(Type::Struct(fields))
    }

    /// Intern an interface type; methods are sorted by name first.
    pub fn interface(&mut self, mut methods: Vec<InterfaceMethod>) -> TypeId {
        methods.sort_by_key(|m| m.name);
        methods.dedup_by_key(|m| m.name);
        self.intern(Type::Interface(methods))
    }

    /// A fresh named type whose underlying type is resolved later.
    pub fn new_named(&mut self, name: Name, decl: Option<DeclId>) -> TypeId {
        self.push(Type::Named(Named {
            name,
            decl,
            underlying: TypeId::INVALID,
        }))
    }

    /// `underlying` may itself be named; [`TypePool::underlying`] follows the
    /// chain, so `type A B` works before `B` is resolved.
    pub fn set_underlying(&mut self, named: TypeId, underlying: TypeId) {
        if named == underlying {
            return;
        }
        if let Some(Type::Named(n)) = self.types.get_mut(named.index()) {
            n.underlying = underlying;
        }
    }

    /// Link a named type to the `TypeName` declaration that introduced it.
    pub fn set_decl(&mut self, named: TypeId, decl: DeclId) {
        if let Some(Type::Named(n)) = self.types.get_mut(named.index()) {
            n.decl = Some(decl);
        }
    }

    // === Queries ===

    /// Follow named types to their underlying structural type.
    pub fn underlying(&self, mut id: TypeId) -> TypeId {
        // A chain longer than the pool is a cycle (`type A B; type B A`).
        for _ in 0..=self.types.len() {
            match self.get(id) {
                Type::Named(n) => id = n.underlying,
                _ => return id,
            }
        }
        TypeId::INVALID
    }

    pub fn underlying_type(&self, id: TypeId) -> &Type {
        self.get(self.underlying(id))
    }

    pub fn basic(&self, id: TypeId) -> Option<BasicKind> {
        match self.underlying_type(id) {
            Type::Basic(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn named(&self, id: TypeId) -> Option<&Named> {
        match self.get(id) {
            Type::Named(n) => Some(n),
            _ => None,
        }
    }

    pub fn signature(&self, id: TypeId) -> Option<&Signature> {
        match self.underlying_type(id) {
            Type::Func(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn pointer_elem(&self, id: TypeId) -> Option<TypeId> {
        match self.underlying_type(id) {
            Type::Pointer(elem) => Some(*elem),
            _ => None,
        }
    }

    pub fn struct_fields(&self, id: TypeId) -> Option<&[crate::Field]> {
        match self.underlying_type(id) {
            Type::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn interface_methods(&self, id: TypeId) -> Option<&[InterfaceMethod]> {
        match self.underlying_type(id) {
            Type::Interface(methods) => Some(methods),
            _ => None,
        }
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        self.interface_methods(id).is_some()
    }

    pub fn is_named(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Named(_))
    }

    pub fn is_untyped(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Basic(kind) if kind.is_untyped())
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        self.basic(id).is_some_and(BasicKind::is_integer)
    }

    pub fn is_unsigned(&self, id: TypeId) -> bool {
        self.basic(id).is_some_and(BasicKind::is_unsigned)
    }

    pub fn is_float(&self, id: TypeId) -> bool {
        self.basic(id).is_some_and(BasicKind::is_float)
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.basic(id).is_some_and(BasicKind::is_numeric)
    }

    pub fn is_string(&self, id: TypeId) -> bool {
        self.basic(id).is_some_and(BasicKind::is_string)
    }

    pub fn is_boolean(&self, id: TypeId) -> bool {
        self.basic(id).is_some_and(BasicKind::is_boolean)
    }

    /// Values of these types can be compared with `nil`.
    pub fn is_nillable(&self, id: TypeId) -> bool {
        matches!(
            self.underlying_type(id),
            Type::Pointer(_)
                | Type::Slice(_)
                | Type::Map { .. }
                | Type::Chan { .. }
                | Type::Func(_)
                | Type::Interface(_)
                | Type::Basic(BasicKind::UntypedNil)
        )
    }

    /// Types usable with `==`.
    pub fn is_comparable(&self, id: TypeId) -> bool {
        match self.underlying_type(id) {
            Type::Slice(_) | Type::Map { .. } | Type::Func(_) => false,
            Type::Array { elem, .. } => self.is_comparable(*elem),
            Type::Struct(fields) => fields.iter().all(|f| self.is_comparable(f.ty)),
            _ => true,
        }
    }

    /// The type an untyped constant takes when nothing else decides it.
    pub fn default_type(&self, id: TypeId) -> TypeId {
        match id {
            TypeId::UNTYPED_BOOL => TypeId::BOOL,
            TypeId::UNTYPED_INT => TypeId::INT,
            TypeId::UNTYPED_RUNE => TypeId::RUNE,
            TypeId::UNTYPED_FLOAT => TypeId::FLOAT64,
            TypeId::UNTYPED_STRING => TypeId::STRING,
            _ => id,
        }
    }

    /// Bit width of a sized unsigned integer type.
    pub fn unsigned_bits(&self, id: TypeId) -> Option<u32> {
        Some(match self.basic(id)? {
            BasicKind::Uint8 => 8,
            BasicKind::Uint16 => 16,
            BasicKind::Uint32 => 32,
            BasicKind::Uint | BasicKind::Uint64 | BasicKind::Uintptr => 64,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests;
