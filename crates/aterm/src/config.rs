#![forbid(unsafe_code)]

/// Decides how the symbol table treats a name that is used with different arities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SymbolPolicy {
    /// Symbols are identified by their name and arity, so `f/1` and `f/2` are different symbols.
    #[default]
    Overloaded,

    /// The first arity requested for a name is binding. Requesting the name
    /// with another arity fails with [crate::TermError::ArityConflict].
    FixedArity,
}

/// Configuration of a [crate::TermStore].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// How symbols with the same name are identified.
    pub symbol_policy: SymbolPolicy,

    /// Whether the store collects garbage by itself when it grows.
    pub automatic_gc: bool,

    /// The minimum number of terms before automatic garbage collection is triggered.
    pub gc_threshold: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            symbol_policy: SymbolPolicy::default(),
            automatic_gc: true,
            gc_threshold: 10_000,
        }
    }
}

impl StoreConfig {
    pub fn with_symbol_policy(mut self, policy: SymbolPolicy) -> Self {
        self.symbol_policy = policy;
        self
    }

    pub fn with_automatic_gc(mut self, enabled: bool) -> Self {
        self.automatic_gc = enabled;
        self
    }

    pub fn with_gc_threshold(mut self, threshold: usize) -> Self {
        self.gc_threshold = threshold;
        self
    }
}
