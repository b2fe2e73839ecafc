//! Session-owned string interner.
//!
//! Strings are leaked to obtain `'static` lifetimes, so lookups never hold a
//! lock past the call. Identifier vocabularies in a REPL session stay small.

use crate::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

#[derive(Default)]
struct InternTable {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

impl InternTable {
    fn insert(&mut self, s: &'static str) -> Name {
        let index = u32::try_from(self.strings.len()).unwrap_or(u32::MAX);
        let name = Name::from_index(index);
        self.strings.push(s);
        self.map.insert(s, name);
        name
    }
}

/// Maps identifier text to [`Name`] handles and back.
///
/// Interning takes `&self` so the parser can intern while the checker holds
/// other borrows of the session.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut table = InternTable::default();
        table.insert("");
        table.insert("_");
        StringInterner {
            table: RwLock::new(table),
        }
    }

    /// Intern `s`, returning the existing handle when already present.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.table.read().map.get(s) {
            return name;
        }
        let mut table = self.table.write();
        // Another caller may have inserted between the two locks.
        if let Some(&name) = table.map.get(s) {
            return name;
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        table.insert(leaked)
    }

    /// The text behind `name`, or `""` for a handle from another interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
