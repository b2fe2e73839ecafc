//! Type handles.
//!
//! Every type lives in the [`TypePool`](crate::TypePool) and is referred to by
//! a 32-bit [`TypeId`]. Structural types are interned, so two structurally
//! identical types share one id and type identity is an integer comparison.
//! Named types are never interned: each definition gets a fresh id.

use std::fmt;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === Predeclared types (indices 0-25) ===
    // Pre-interned at pool creation in this exact order.

    /// Placeholder for ill-typed expressions. Assignable to and from anything.
    pub const INVALID: Self = Self(0);
    pub const BOOL: Self = Self(1);
    pub const INT: Self = Self(2);
    pub const INT8: Self = Self(3);
    pub const INT16: Self = Self(4);
    pub const INT32: Self = Self(5);
    pub const INT64: Self = Self(6);
    pub const UINT: Self = Self(7);
    pub const UINT8: Self = Self(8);
    pub const UINT16: Self = Self(9);
    pub const UINT32: Self = Self(10);
    pub const UINT64: Self = Self(11);
    pub const UINTPTR: Self = Self(12);
    pub const FLOAT32: Self = Self(13);
    pub const FLOAT64: Self = Self(14);
    pub const COMPLEX64: Self = Self(15);
    pub const COMPLEX128: Self = Self(16);
    pub const STRING: Self = Self(17);
    pub const UNTYPED_BOOL: Self = Self(18);
    pub const UNTYPED_INT: Self = Self(19);
    pub const UNTYPED_RUNE: Self = Self(20);
    pub const UNTYPED_FLOAT: Self = Self(21);
    pub const UNTYPED_STRING: Self = Self(22);
    pub const UNTYPED_NIL: Self = Self(23);
    /// The empty tuple: result type of calls that return nothing.
    pub const VOID: Self = Self(24);
    /// `interface{}`.
    pub const EMPTY_INTERFACE: Self = Self(25);
    /// The predeclared `error` interface.
    pub const ERROR: Self = Self(26);

    /// Number of pre-interned types.
    pub const PREDECLARED_COUNT: u32 = 27;

    /// `byte` is an alias for `uint8`.
    pub const BYTE: Self = Self::UINT8;
    /// `rune` is an alias for `int32`.
    pub const RUNE: Self = Self::INT32;

    #[inline]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_predeclared(self) -> bool {
        self.0 < Self::PREDECLARED_COUNT
    }

    #[inline]
    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}
