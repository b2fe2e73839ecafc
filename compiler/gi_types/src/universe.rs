//! The universe scope: predeclared types, constants and builtins.
//!
//! Consulted after local scopes and the declaration table, so user code may
//! shadow any of these names.

use crate::{ConstValue, TypeId, TypePool};
use gi_ir::{Name, StringInterner};
use rustc_hash::FxHashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Append,
    Cap,
    Close,
    Complex,
    Copy,
    Delete,
    Imag,
    Len,
    Make,
    New,
    Panic,
    Print,
    Println,
    Real,
    Recover,
}

impl Builtin {
    pub const ALL: [Builtin; 15] = [
        Builtin::Append,
        Builtin::Cap,
        Builtin::Close,
        Builtin::Complex,
        Builtin::Copy,
        Builtin::Delete,
        Builtin::Imag,
        Builtin::Len,
        Builtin::Make,
        Builtin::New,
        Builtin::Panic,
        Builtin::Print,
        Builtin::Println,
        Builtin::Real,
        Builtin::Recover,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Append => "append",
            Builtin::Cap => "cap",
            Builtin::Close => "close",
            Builtin::Complex => "complex",
            Builtin::Copy => "copy",
            Builtin::Delete => "delete",
            Builtin::Imag => "imag",
            Builtin::Len => "len",
            Builtin::Make => "make",
            Builtin::New => "new",
            Builtin::Panic => "panic",
            Builtin::Print => "print",
            Builtin::Println => "println",
            Builtin::Real => "real",
            Builtin::Recover => "recover",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UniverseEntry {
    Type(TypeId),
    Const(ConstValue),
    Nil,
    Iota,
    Builtin(Builtin),
}

#[derive(Clone, Debug)]
pub struct Universe {
    entries: FxHashMap<Name, UniverseEntry>,
}

impl Universe {
    /// Build the universe scope. Also names the pool's predeclared `error`.
    pub fn new(interner: &StringInterner, pool: &mut TypePool) -> Self {
        pool.set_error_name(interner.intern("error"), interner.intern("Error"));
        let types = [
            ("bool", TypeId::BOOL),
            ("int", TypeId::INT),
            ("int8", TypeId::INT8),
            ("int16", TypeId::INT16),
            ("int32", TypeId::INT32),
            ("int64", TypeId::INT64),
            ("uint", TypeId::UINT),
            ("uint8", TypeId::UINT8),
            ("uint16", TypeId::UINT16),
            ("uint32", TypeId::UINT32),
            ("uint64", TypeId::UINT64),
            ("uintptr", TypeId::UINTPTR),
            ("float32", TypeId::FLOAT32),
            ("float64", TypeId::FLOAT64),
            ("complex64", TypeId::COMPLEX64),
            ("complex128", TypeId::COMPLEX128),
            ("string", TypeId::STRING),
            ("byte", TypeId::BYTE),
            ("rune", TypeId::RUNE),
            ("error", TypeId::ERROR),
            ("any", TypeId::EMPTY_INTERFACE),
        ];
        let mut entries = FxHashMap::default();
        for (name, ty) in types {
            entries.insert(interner.intern(name), UniverseEntry::Type(ty));
        }
        entries.insert(
            interner.intern("true"),
            UniverseEntry::Const(ConstValue::Bool(true)),
        );
        entries.insert(
            interner.intern("false"),
            UniverseEntry::Const(ConstValue::Bool(false)),
        );
        entries.insert(interner.intern("nil"), UniverseEntry::Nil);
        entries.insert(interner.intern("iota"), UniverseEntry::Iota);
        for builtin in Builtin::ALL {
            entries.insert(
                interner.intern(builtin.name()),
                UniverseEntry::Builtin(builtin),
            );
        }
        Universe { entries }
    }

    pub fn lookup(&self, name: Name) -> Option<&UniverseEntry> {
        self.entries.get(&name)
    }
}
