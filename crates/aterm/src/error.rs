#![forbid(unsafe_code)]

use thiserror::Error;

use crate::TermKind;

/// The errors that can occur when constructing or inspecting terms. None of
/// them are fatal, the store is unchanged after a rejected operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TermError {
    #[error("Index {index} is out of range for a term with arity {arity}")]
    IndexOutOfRange { index: i64, arity: usize },

    #[error("Operation {operation} is not applicable to {kind} terms")]
    NotApplicable { operation: &'static str, kind: TermKind },

    #[error("Symbol {symbol} has arity {expected}, but {found} arguments were given")]
    ArityMismatch {
        symbol: String,
        expected: usize,
        found: usize,
    },

    #[error("Symbol {name} was declared with arity {declared}, but requested with arity {requested}")]
    ArityConflict {
        name: String,
        declared: usize,
        requested: usize,
    },

    #[error("The term or symbol belongs to a different term store")]
    ForeignTerm,

    #[error("All fresh names with prefix {prefix} are in use")]
    FreshNamesExhausted { prefix: String },
}
