#![doc = include_str!("../README.md")]

mod aterm;
mod aterm_list;
mod aterm_string;
mod config;
mod error;
mod random_term;
mod symbol;
mod transform;

pub mod storage;

pub use aterm::*;
pub use aterm_list::*;
pub use aterm_string::*;
pub use config::*;
pub use error::*;
pub use random_term::*;
pub use storage::TermStore;
pub use storage::TermStoreMetrics;
pub use symbol::*;
pub use transform::*;
