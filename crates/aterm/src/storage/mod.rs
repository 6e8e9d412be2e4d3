//! The storage of maximally shared terms.
//!
//! A [TermStore] owns a unique table of terms and a [SymbolPool] of function
//! symbols. Every construction first looks up whether a structurally equal
//! term already exists, so two terms are equal iff they are the same node.
//! Terms that are no longer referenced outside the store are removed by
//! garbage collection.

mod shared_term;
mod symbol_pool;
mod term_store;

pub(crate) use shared_term::*;
pub(crate) use symbol_pool::*;
pub use term_store::*;
