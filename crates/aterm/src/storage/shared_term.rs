#![forbid(unsafe_code)]

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::mem;

use equivalent::Equivalent;

use crate::ATerm;
use crate::Symbol;

/// The payload of a shared term.
pub(crate) enum TermData {
    Int(i64),
    Real(f64),
    Blob(Box<[u8]>),
    Appl { symbol: Symbol, arguments: Box<[ATerm]> },
}

/// The underlying type of terms that are actually shared.
///
/// # Details
///
/// Every argument and annotation of a shared term refers to a term that was
/// created before it, and therefore has a smaller index. Garbage collection
/// relies on this to reclaim unreachable terms in a single pass.
pub(crate) struct SharedTerm {
    data: TermData,
    annotations: Box<[ATerm]>,

    /// Creation index, unique within the store.
    index: usize,
    /// Identifier of the store that owns this term.
    store: usize,
}

impl SharedTerm {
    /// Constructs a new shared term from the given lookup key.
    pub(crate) fn new(lookup: &TermLookup<'_>, index: usize, store: usize) -> Self {
        let data = match lookup.key {
            TermKey::Int(value) => TermData::Int(value),
            TermKey::Real(bits) => TermData::Real(f64::from_bits(bits)),
            TermKey::Blob(bytes) => TermData::Blob(bytes.into()),
            TermKey::Appl(symbol, arguments) => TermData::Appl {
                symbol: symbol.clone(),
                arguments: arguments.into(),
            },
        };

        Self {
            data,
            annotations: lookup.annotations.into(),
            index,
            store,
        }
    }

    pub(crate) fn data(&self) -> &TermData {
        &self.data
    }

    pub(crate) fn annotations(&self) -> &[ATerm] {
        &self.annotations
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn store(&self) -> usize {
        self.store
    }

    /// Returns the structural key of this term, which is used for hashing and equality in the store.
    pub(crate) fn lookup(&self) -> TermLookup<'_> {
        let key = match &self.data {
            TermData::Int(value) => TermKey::Int(*value),
            TermData::Real(value) => TermKey::Real(value.to_bits()),
            TermData::Blob(bytes) => TermKey::Blob(bytes),
            TermData::Appl { symbol, arguments } => TermKey::Appl(symbol, arguments),
        };

        TermLookup {
            key,
            annotations: &self.annotations,
        }
    }

    /// Moves the arguments and annotations out of this term.
    fn take_subterms(&mut self) -> Vec<ATerm> {
        let mut subterms = match &mut self.data {
            TermData::Appl { arguments, .. } => mem::take(arguments).into_vec(),
            _ => Vec::new(),
        };

        subterms.extend(mem::take(&mut self.annotations).into_vec());
        subterms
    }
}

impl Drop for SharedTerm {
    fn drop(&mut self) {
        // Releasing the last reference to a deep term would otherwise recurse
        // once for every level of the term.
        let mut stack = self.take_subterms();

        while let Some(term) = stack.pop() {
            if let Some(mut shared) = term.into_shared() {
                stack.extend(shared.take_subterms());
            }
        }
    }
}

impl fmt::Debug for SharedTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SharedTerm {{ index: {}, key: {:?}, annotations: {:?} }}",
            self.index,
            self.lookup().key,
            self.annotations
        )
    }
}

/// The structural part of a term, where the arguments are compared by identity.
///
/// Reals are keyed by their bit pattern, so `0.0` and `-0.0` are different
/// terms and every NaN is equal to itself.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub(crate) enum TermKey<'a> {
    Int(i64),
    Real(u64),
    Blob(&'a [u8]),
    Appl(&'a Symbol, &'a [ATerm]),
}

/// A cheap reference to the elements of a shared term that can be used for
/// lookup of terms without allocating.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub(crate) struct TermLookup<'a> {
    pub(crate) key: TermKey<'a>,
    pub(crate) annotations: &'a [ATerm],
}

impl<'a> TermLookup<'a> {
    /// A lookup for a term without annotations.
    pub(crate) fn plain(key: TermKey<'a>) -> Self {
        TermLookup { key, annotations: &[] }
    }
}

/// An entry in the unique table. Hashing and equality are structural, the
/// same as for [TermLookup].
pub(crate) struct TermEntry(pub(crate) ATerm);

impl Hash for TermEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.shared().lookup().hash(state);
    }
}

impl PartialEq for TermEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0.shared().lookup() == other.0.shared().lookup()
    }
}

impl Eq for TermEntry {}

impl Equivalent<TermEntry> for TermLookup<'_> {
    fn equivalent(&self, key: &TermEntry) -> bool {
        *self == key.0.shared().lookup()
    }
}
