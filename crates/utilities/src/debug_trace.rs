//! Trace logging that is compiled away unless the `termpool_debug-trace`
//! feature is enabled.

/// Forwards to [log::trace] when the `termpool_debug-trace` feature is enabled,
/// otherwise expands to nothing.
///
/// # Examples
///
/// ```
/// termpool_utilities::debug_trace!("Interned term {}", 42);
/// ```
#[macro_export]
#[cfg(feature = "termpool_debug-trace")]
macro_rules! debug_trace {
    ($($arg:tt)*) => {
        {
            log::trace!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "termpool_debug-trace"))]
macro_rules! debug_trace {
    ($($arg:tt)*) => {{}};
}
