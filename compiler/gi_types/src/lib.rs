//! Types, declarations and the checker for the gi REPL.
//!
//! Everything a session has declared lives in two values owned by the
//! caller and threaded through every submission:
//!
//! - [`TypePool`]: interned types addressed by [`TypeId`];
//! - [`DeclarationTable`]: the package-level names, where declaring a name
//!   again replaces the earlier declaration instead of failing.
//!
//! [`check_unit`] checks one parsed unit against them and returns a
//! [`CheckedUnit`] carrying the [`TypeInfo`] the emitter consumes.

mod check;
mod constant;
mod decl;
mod error;
mod idx;
mod info;
mod pool;
mod table;
mod ty;
mod universe;

pub use check::check_unit;
pub use constant::{fold_binary, fold_unary, ConstError, ConstValue};
pub use decl::{DeclId, DeclKind, Declaration, ObjectInfo, Receiver};
pub use error::{RedeclarationConflict, TypeCheckError};
pub use idx::TypeId;
pub use info::{CallKind, CheckedUnit, LocalId, Resolution, Selection, TypeInfo};
pub use pool::TypePool;
pub use table::{
    DeclarationTable, FieldSelection, Lookup, MethodEntry, MethodSet, MissingMethod,
};
pub use ty::{BasicKind, Field, InterfaceMethod, Named, Signature, Type};
pub use universe::{Builtin, Universe, UniverseEntry};

// TypeId is stored in every expression record.
#[cfg(target_pointer_width = "64")]
const _: () = assert!(std::mem::size_of::<TypeId>() == 4);
