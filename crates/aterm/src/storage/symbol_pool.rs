#![forbid(unsafe_code)]

use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use equivalent::Equivalent;
use rustc_hash::FxBuildHasher;

use termpool_utilities::debug_trace;

use crate::Symbol;
use crate::SymbolPolicy;
use crate::TermError;

/// Distinguishes the function symbols created by users from the symbols that
/// the store uses internally. Symbols of different kinds never coincide, even
/// when their name and arity are equal.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub(crate) enum SymbolKind {
    /// A user defined function symbol.
    Function,
    /// The head symbol of a string term, its name is the string.
    Quoted,
    /// The list constructor.
    ListCons,
    /// The empty list.
    ListNil,
}

/// Pool for maximal sharing of function symbols. Ensures that function symbols
/// with the same name, arity and kind are the same [SharedSymbol] object.
pub(crate) struct SymbolPool {
    /// Identifier of the owning store.
    store: usize,

    /// Decides whether a name can be used with different arities.
    policy: SymbolPolicy,

    /// Unique table of all function symbols.
    symbols: DashMap<SymbolEntry, (), FxBuildHasher>,

    /// The arity with which every function name was first used. Entries are
    /// never removed, so names remain taken after their symbol is reclaimed.
    names: DashMap<String, usize, FxBuildHasher>,

    /// A map from prefixes to counters that track the next available index for fresh symbols.
    prefix_counters: DashMap<String, Arc<AtomicUsize>, FxBuildHasher>,

    /// The index for the next symbol.
    next_index: AtomicUsize,
}

impl SymbolPool {
    /// Creates a new empty symbol pool.
    pub(crate) fn new(store: usize, policy: SymbolPolicy) -> Self {
        Self {
            store,
            policy,
            symbols: DashMap::with_hasher(FxBuildHasher),
            names: DashMap::with_hasher(FxBuildHasher),
            prefix_counters: DashMap::with_hasher(FxBuildHasher),
            next_index: AtomicUsize::new(0),
        }
    }

    /// Creates or retrieves the function symbol with the given name and arity.
    ///
    /// Under [SymbolPolicy::FixedArity] this fails when the name was used before with another arity.
    pub(crate) fn create(&self, name: &str, arity: usize) -> Result<Symbol, TermError> {
        let declared = self.declare(name, arity);

        if self.policy == SymbolPolicy::FixedArity && declared != arity {
            return Err(TermError::ArityConflict {
                name: name.to_string(),
                declared,
                requested: arity,
            });
        }

        Ok(self.insert(&SymbolLookup {
            name,
            arity,
            kind: SymbolKind::Function,
        }))
    }

    /// Creates or retrieves a symbol that is used internally by the store.
    pub(crate) fn create_internal(&self, name: &str, arity: usize, kind: SymbolKind) -> Symbol {
        debug_assert_ne!(kind, SymbolKind::Function, "Function symbols are created by create");
        self.insert(&SymbolLookup { name, arity, kind })
    }

    /// Creates a function symbol `<prefix><n>` whose name has not been used before in this pool.
    ///
    /// Fails with [TermError::FreshNamesExhausted] when the counter of the prefix cannot be increased any further.
    pub(crate) fn create_fresh(&self, prefix: &str, arity: usize) -> Result<Symbol, TermError> {
        let counter = self.register_prefix(prefix);

        loop {
            let number = counter
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
                .map_err(|_| TermError::FreshNamesExhausted {
                    prefix: prefix.to_string(),
                })?;
            let name = format!("{prefix}{number}");

            // Claiming the name must be atomic, another thread can create the same name concurrently.
            if let Entry::Vacant(entry) = self.names.entry(name.clone()) {
                entry.insert(arity);
                return Ok(self.insert(&SymbolLookup {
                    name: &name,
                    arity,
                    kind: SymbolKind::Function,
                }));
            }
        }
    }

    /// Returns the number of symbols in the pool.
    pub(crate) fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Removes all symbols that are only referenced by the pool itself.
    pub(crate) fn retain_referenced(&self) {
        self.symbols.retain(|entry, _| !entry.0.is_unreferenced());
    }

    /// Returns a counter for the numeric suffixes of fresh symbols with the given
    /// prefix. The counter starts after the largest suffix in use.
    pub(crate) fn register_prefix(&self, prefix: &str) -> Arc<AtomicUsize> {
        let existing = self.prefix_counters.get(prefix).map(|counter| Arc::clone(counter.value()));
        if let Some(counter) = existing {
            return counter;
        }

        let counter = Arc::clone(
            self.prefix_counters
                .entry(prefix.to_string())
                .or_insert_with(|| Arc::new(AtomicUsize::new(0)))
                .value(),
        );

        // Ensure the counter starts at a sufficiently large index.
        for entry in self.names.iter() {
            if let Some(number) = numeric_suffix(entry.key(), prefix) {
                counter.fetch_max(number.saturating_add(1), Ordering::Relaxed);
            }
        }

        counter
    }

    /// Removes a prefix counter from the pool.
    pub(crate) fn remove_prefix(&self, prefix: &str) {
        self.prefix_counters.remove(prefix);
    }

    /// Records the arity of the given function name when it is used for the first time,
    /// and returns the arity that was recorded first.
    fn declare(&self, name: &str, arity: usize) -> usize {
        let existing = self.names.get(name).map(|declared| *declared);
        if let Some(declared) = existing {
            return declared;
        }

        let declared = match self.names.entry(name.to_string()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                entry.insert(arity);
                arity
            }
        };

        self.update_prefix(name);
        declared
    }

    /// Prevents that a newly used name `<prefix><n>` is generated later as a
    /// fresh symbol for a registered prefix.
    fn update_prefix(&self, name: &str) {
        let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());

        if let Ok(number) = name[prefix.len()..].parse::<usize>() {
            if let Some(counter) = self.prefix_counters.get(prefix) {
                counter.fetch_max(number.saturating_add(1), Ordering::Relaxed);
            }
        }
    }

    /// Returns the canonical symbol for the lookup, creating it when it does not exist yet.
    fn insert(&self, lookup: &SymbolLookup<'_>) -> Symbol {
        let existing = self.symbols.get(lookup).map(|entry| entry.key().0.clone());
        if let Some(symbol) = existing {
            return symbol;
        }

        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        let symbol = Symbol::new(SharedSymbol::new(lookup, index, self.store));

        match self.symbols.entry(SymbolEntry(symbol)) {
            Entry::Occupied(entry) => entry.key().0.clone(),
            Entry::Vacant(entry) => {
                let symbol = entry.key().0.clone();
                debug_trace!("Created symbol {symbol:?}");
                entry.insert(());
                symbol
            }
        }
    }
}

/// Returns `n` when the name is of the shape `<prefix><n>`.
fn numeric_suffix(name: &str, prefix: &str) -> Option<usize> {
    let suffix = name.strip_prefix(prefix)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    suffix.parse().ok()
}

/// Represents a function symbol with a name and arity.
#[derive(Debug)]
pub(crate) struct SharedSymbol {
    name: String,
    arity: usize,
    kind: SymbolKind,

    /// Creation index, unique within the store.
    index: usize,
    /// Identifier of the store that owns this symbol.
    store: usize,
}

impl SharedSymbol {
    fn new(lookup: &SymbolLookup<'_>, index: usize, store: usize) -> Self {
        Self {
            name: lookup.name.to_string(),
            arity: lookup.arity,
            kind: lookup.kind,
            index,
            store,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn store(&self) -> usize {
        self.store
    }

    fn lookup(&self) -> SymbolLookup<'_> {
        SymbolLookup {
            name: &self.name,
            arity: self.arity,
            kind: self.kind,
        }
    }
}

/// A cheap way to look up a [SharedSymbol].
#[derive(Hash, PartialEq, Eq)]
struct SymbolLookup<'a> {
    name: &'a str,
    arity: usize,
    kind: SymbolKind,
}

/// An entry in the symbol table, hashed and compared by its [SymbolLookup].
struct SymbolEntry(Symbol);

impl Hash for SymbolEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.shared().lookup().hash(state);
    }
}

impl PartialEq for SymbolEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0.shared().lookup() == other.0.shared().lookup()
    }
}

impl Eq for SymbolEntry {}

impl Equivalent<SymbolEntry> for SymbolLookup<'_> {
    fn equivalent(&self, key: &SymbolEntry) -> bool {
        *self == key.0.shared().lookup()
    }
}
