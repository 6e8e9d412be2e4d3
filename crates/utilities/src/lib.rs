#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod debug_trace;
mod format;
mod test_logger;

pub use format::*;
pub use random_test::*;
pub use test_logger::*;
