#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use crate::storage::SharedSymbol;
use crate::storage::SymbolKind;

/// A function symbol with a name and a fixed arity, obtained from
/// [crate::TermStore::symbol].
///
/// Symbols are maximally shared, so two symbols are equal iff they are the
/// same object in the symbol table. Cloning only increments a reference count.
#[derive(Clone)]
pub struct Symbol {
    shared: Arc<SharedSymbol>,
}

impl Symbol {
    pub(crate) fn new(shared: SharedSymbol) -> Self {
        Symbol {
            shared: Arc::new(shared),
        }
    }

    /// Obtain the symbol's name.
    pub fn name(&self) -> &str {
        self.shared.name()
    }

    /// Obtain the symbol's arity.
    pub fn arity(&self) -> usize {
        self.shared.arity()
    }

    /// Returns true iff this is the head symbol of a string term.
    pub fn is_quoted(&self) -> bool {
        self.shared.kind() == SymbolKind::Quoted
    }

    /// Returns a unique index for the symbol within its store.
    pub fn index(&self) -> usize {
        self.shared.index()
    }

    pub(crate) fn kind(&self) -> SymbolKind {
        self.shared.kind()
    }

    pub(crate) fn store_id(&self) -> usize {
        self.shared.store()
    }

    pub(crate) fn shared(&self) -> &SharedSymbol {
        &self.shared
    }

    /// Returns true iff the symbol table holds the only reference.
    pub(crate) fn is_unreferenced(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.shared).hash(state)
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.store_id(), self.index()).cmp(&(other.store_id(), other.index()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_quoted() {
            write!(f, "{:?}", self.name())
        } else {
            write!(f, "{}", self.name())
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self, self.arity())
    }
}
