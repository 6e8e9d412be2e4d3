#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use delegate::delegate;
use log::debug;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

use termpool_utilities::LargeFormatter;
use termpool_utilities::debug_trace;

use crate::ATerm;
use crate::ATermList;
use crate::StoreConfig;
use crate::Symbol;
use crate::TermError;
use crate::storage::SharedTerm;
use crate::storage::SymbolKind;
use crate::storage::SymbolPool;
use crate::storage::TermEntry;
use crate::storage::TermKey;
use crate::storage::TermLookup;

/// Identifiers for stores, so that terms of different stores are never mixed.
static NEXT_STORE_ID: AtomicUsize = AtomicUsize::new(0);

/// The store that owns all terms and symbols, and guarantees that every term
/// exists at most once.
///
/// # Details
///
/// Terms are kept in a concurrent unique table, so a store can be shared
/// between threads, e.g., behind an [Arc]. Constructing a term first looks up
/// its structure without allocating, and only creates a new node when no equal
/// term exists. The store holds one reference to every term, and
/// [TermStore::collect_garbage] removes the terms for which that is the only
/// reference left. Garbage collection excludes concurrent constructions
/// through a readers-writer lock, so a term that is found in the table can not
/// be removed before it is returned.
pub struct TermStore {
    id: usize,
    config: StoreConfig,

    /// Unique table of all terms.
    terms: DashMap<TermEntry, (), FxBuildHasher>,

    symbols: SymbolPool,

    /// Constructions hold the read guard, garbage collection the write guard.
    gc_lock: RwLock<()>,

    /// The index for the next term.
    next_index: AtomicUsize,

    /// Number of terms created, and the number of constructions that returned an existing term.
    inserted: AtomicUsize,
    reused: AtomicUsize,

    automatic_gc: AtomicBool,
    /// Number of terms after which the next automatic garbage collection is performed.
    gc_threshold: AtomicUsize,

    /// The internal list symbols, these are never reclaimed.
    cons_symbol: Symbol,
    nil_symbol: Symbol,
}

impl TermStore {
    /// Creates a store with the default configuration.
    pub fn new() -> TermStore {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a store with the given configuration.
    pub fn with_config(config: StoreConfig) -> TermStore {
        let id = NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed);
        let symbols = SymbolPool::new(id, config.symbol_policy);

        let cons_symbol = symbols.create_internal("<cons>", 2, SymbolKind::ListCons);
        let nil_symbol = symbols.create_internal("<nil>", 0, SymbolKind::ListNil);

        debug!("Created term store {id} with {config:?}");

        TermStore {
            id,
            terms: DashMap::with_hasher(FxBuildHasher),
            symbols,
            gc_lock: RwLock::new(()),
            next_index: AtomicUsize::new(0),
            inserted: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
            automatic_gc: AtomicBool::new(config.automatic_gc),
            gc_threshold: AtomicUsize::new(config.gc_threshold),
            cons_symbol,
            nil_symbol,
            config,
        }
    }

    /// Returns the configuration of this store.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the number of terms in the store.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true iff the store contains no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns true iff the given term is the term stored in this store for its structure.
    ///
    /// This is false for terms of other stores, and for terms that were created
    /// by this store before it was dropped.
    pub fn contains(&self, term: &ATerm) -> bool {
        if term.store_id() != self.id {
            return false;
        }

        self.terms
            .get(&term.shared().lookup())
            .is_some_and(|entry| entry.key().0 == *term)
    }

    /// Returns the function symbol with the given name and arity, creating it when necessary.
    ///
    /// Fails with [TermError::ArityConflict] when the store uses
    /// [crate::SymbolPolicy::FixedArity] and the name was used before with a
    /// different arity.
    pub fn symbol(&self, name: &str, arity: usize) -> Result<Symbol, TermError> {
        self.symbols.create(name, arity)
    }

    delegate! {
        to self.symbols {
            /// Returns a function symbol `<prefix><n>` whose name has never been used in this store.
            ///
            /// Fails with [TermError::FreshNamesExhausted] when no suffix for the prefix is left.
            #[call(create_fresh)]
            pub fn fresh_symbol(&self, prefix: &str, arity: usize) -> Result<Symbol, TermError>;

            /// Returns a counter for the unique numeric suffix of the given prefix.
            pub fn register_prefix(&self, prefix: &str) -> Arc<AtomicUsize>;

            /// Removes the registration of a prefix.
            pub fn remove_prefix(&self, prefix: &str);
        }
    }

    /// Creates the application of the symbol to the given arguments.
    pub fn apply(&self, symbol: &Symbol, arguments: &[ATerm]) -> Result<ATerm, TermError> {
        if symbol.store_id() != self.id || arguments.iter().any(|arg| arg.store_id() != self.id) {
            return Err(TermError::ForeignTerm);
        }

        if symbol.arity() != arguments.len() {
            return Err(TermError::ArityMismatch {
                symbol: symbol.name().to_string(),
                expected: symbol.arity(),
                found: arguments.len(),
            });
        }

        Ok(self.intern(&TermLookup::plain(TermKey::Appl(symbol, arguments))))
    }

    /// The same as [TermStore::apply], but takes the arguments from an iterator.
    pub fn apply_iter<I>(&self, symbol: &Symbol, arguments: I) -> Result<ATerm, TermError>
    where
        I: IntoIterator<Item = ATerm>,
    {
        let arguments: SmallVec<[ATerm; 8]> = arguments.into_iter().collect();
        self.apply(symbol, &arguments)
    }

    /// Creates the constant term for a symbol of arity zero.
    pub fn constant(&self, symbol: &Symbol) -> Result<ATerm, TermError> {
        self.apply(symbol, &[])
    }

    /// Creates an integer term.
    pub fn integer(&self, value: i64) -> ATerm {
        self.intern(&TermLookup::plain(TermKey::Int(value)))
    }

    /// Creates a real term. Reals are compared by their bit pattern.
    pub fn real(&self, value: f64) -> ATerm {
        self.intern(&TermLookup::plain(TermKey::Real(value.to_bits())))
    }

    /// Creates a term holding an opaque sequence of bytes.
    pub fn blob(&self, bytes: &[u8]) -> ATerm {
        self.intern(&TermLookup::plain(TermKey::Blob(bytes)))
    }

    /// Creates a string term, which is a constant with a quoted symbol. String
    /// terms never coincide with constants created through [TermStore::symbol].
    pub fn string(&self, value: &str) -> ATerm {
        let symbol = self.symbols.create_internal(value, 0, SymbolKind::Quoted);
        self.intern(&TermLookup::plain(TermKey::Appl(&symbol, &[])))
    }

    /// Creates the list with the given elements, in order.
    pub fn list<I>(&self, elements: I) -> Result<ATermList, TermError>
    where
        I: IntoIterator<Item = ATerm>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut list = self.empty_list();
        for element in elements.into_iter().rev() {
            list = self.cons(element, list)?;
        }

        Ok(list)
    }

    /// Creates the empty list.
    pub fn empty_list(&self) -> ATermList {
        ATermList::new_unchecked(self.intern(&TermLookup::plain(TermKey::Appl(&self.nil_symbol, &[]))))
    }

    /// Creates the list with the given head, followed by the elements of `tail`.
    pub fn cons(&self, head: ATerm, tail: ATermList) -> Result<ATermList, TermError> {
        let arguments = [head, tail.into()];
        if arguments.iter().any(|arg| arg.store_id() != self.id) {
            return Err(TermError::ForeignTerm);
        }

        Ok(ATermList::new_unchecked(self.intern(&TermLookup::plain(TermKey::Appl(
            &self.cons_symbol,
            &arguments,
        )))))
    }

    /// Returns the given term with its annotations replaced by `annotations`.
    pub fn annotate(&self, term: &ATerm, annotations: &[ATerm]) -> Result<ATerm, TermError> {
        if term.store_id() != self.id || annotations.iter().any(|annotation| annotation.store_id() != self.id) {
            return Err(TermError::ForeignTerm);
        }

        let lookup = TermLookup {
            key: term.shared().lookup().key,
            annotations,
        };

        Ok(self.intern(&lookup))
    }

    /// Returns the given term without annotations.
    pub fn remove_annotations(&self, term: &ATerm) -> Result<ATerm, TermError> {
        if term.annotations().is_empty() && term.store_id() == self.id {
            return Ok(term.clone());
        }

        self.annotate(term, &[])
    }

    /// Enables or disables automatic garbage collection.
    pub fn automatic_garbage_collection(&self, enabled: bool) {
        self.automatic_gc.store(enabled, Ordering::Relaxed);
    }

    /// Removes all terms and symbols that are not referenced outside of the
    /// store, and returns the number of removed terms.
    ///
    /// A term is referenced when a handle to it exists, or when it is a
    /// subterm or annotation of a referenced term. Blocks until all ongoing
    /// constructions are finished.
    pub fn collect_garbage(&self) -> usize {
        let _guard = self.gc_lock.write();
        let collect_time = Instant::now();

        let num_of_terms = self.terms.len();
        let num_of_symbols = self.symbols.len();

        let mut candidates: Vec<_> = self
            .terms
            .iter()
            .map(|entry| (entry.key().0.index(), entry.key().0.downgrade()))
            .collect();

        // Subterms have a smaller index than their parents, so removing the terms
        // with the largest index first releases the subterms before they are visited.
        candidates.sort_unstable_by(|(left, _), (right, _)| right.cmp(left));

        for (_index, weak) in candidates {
            // The table holds the only reference. No construction is running, so
            // nothing can obtain a new reference to it either.
            if weak.strong_count() == 1 {
                if let Some(term) = ATerm::upgrade(&weak) {
                    debug_trace!("Dropping term {_index}: {term:?}");
                    self.terms.remove(&term.shared().lookup());
                }
            }
        }

        self.symbols.retain_referenced();

        let removed = num_of_terms - self.terms.len();
        self.gc_threshold
            .store(self.config.gc_threshold.max(2 * self.terms.len()), Ordering::Relaxed);

        debug!(
            "Garbage collection: collection took {}ms, {} terms and {} symbols removed",
            collect_time.elapsed().as_millis(),
            LargeFormatter(removed),
            LargeFormatter(num_of_symbols - self.symbols.len())
        );
        debug!("{}", self.metrics());

        removed
    }

    /// Returns the metrics of the store, can be formatted and written to output.
    pub fn metrics(&self) -> TermStoreMetrics<'_> {
        TermStoreMetrics(self)
    }

    /// Returns the symbol used for non-empty lists.
    pub(crate) fn cons_symbol(&self) -> &Symbol {
        &self.cons_symbol
    }

    /// Returns the symbol used for the empty list.
    pub(crate) fn nil_symbol(&self) -> &Symbol {
        &self.nil_symbol
    }

    /// Returns the canonical term for the lookup, and triggers automatic garbage collection if necessary.
    fn intern(&self, lookup: &TermLookup<'_>) -> ATerm {
        let term = {
            let _guard = self.gc_lock.read();
            self.find_or_insert(lookup)
        };

        self.trigger_garbage_collection();
        term
    }

    fn find_or_insert(&self, lookup: &TermLookup<'_>) -> ATerm {
        let existing = self.terms.get(lookup).map(|entry| entry.key().0.clone());
        if let Some(term) = existing {
            self.reused.fetch_add(1, Ordering::Relaxed);
            return term;
        }

        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        let term = ATerm::new(SharedTerm::new(lookup, index, self.id));

        match self.terms.entry(TermEntry(term)) {
            Entry::Occupied(entry) => {
                // Another thread inserted the same term in the meantime.
                self.reused.fetch_add(1, Ordering::Relaxed);
                entry.key().0.clone()
            }
            Entry::Vacant(entry) => {
                let term = entry.key().0.clone();
                debug_trace!("Created term {index}: {term:?}");
                entry.insert(());
                self.inserted.fetch_add(1, Ordering::Relaxed);
                term
            }
        }
    }

    fn trigger_garbage_collection(&self) {
        if self.automatic_gc.load(Ordering::Relaxed) && self.terms.len() > self.gc_threshold.load(Ordering::Relaxed) {
            self.collect_garbage();
        }
    }
}

impl Default for TermStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TermStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TermStore {{ id: {}, {} }}", self.id, self.metrics())
    }
}

impl Drop for TermStore {
    fn drop(&mut self) {
        debug!("Dropping term store {}: {}", self.id, self.metrics());
    }
}

/// Performance counters of a [TermStore].
pub struct TermStoreMetrics<'a>(&'a TermStore);

impl TermStoreMetrics<'_> {
    /// Number of terms that were created.
    pub fn inserted(&self) -> usize {
        self.0.inserted.load(Ordering::Relaxed)
    }

    /// Number of constructions that returned an existing term.
    pub fn reused(&self) -> usize {
        self.0.reused.load(Ordering::Relaxed)
    }
}

impl fmt::Display for TermStoreMetrics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "There are {} terms, and {} symbols ({} inserted, {} reused)",
            LargeFormatter(self.0.terms.len()),
            LargeFormatter(self.0.symbols.len()),
            LargeFormatter(self.inserted()),
            LargeFormatter(self.reused())
        )
    }
}
