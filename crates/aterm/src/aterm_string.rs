#![forbid(unsafe_code)]

use crate::ATerm;
use crate::storage::SymbolKind;

/// Returns true if the term is a string term, created by [crate::TermStore::string].
pub fn is_string_term(term: &ATerm) -> bool {
    term.symbol().is_some_and(|symbol| symbol.kind() == SymbolKind::Quoted)
}

impl ATerm {
    /// Get the value of a string term.
    pub fn as_str(&self) -> Option<&str> {
        if is_string_term(self) {
            self.symbol().map(|symbol| symbol.name())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use termpool_utilities::test_logger;

    use crate::TermStore;

    use super::*;

    #[test]
    fn test_string() {
        test_logger();
        let store = TermStore::new();

        let s = store.string("test");
        assert!(is_string_term(&s));
        assert_eq!(s.as_str(), Some("test"));
        assert_eq!(s.arity(), 0);
        assert_eq!(s.to_string(), "\"test\"");

        let constant = store.constant(&store.symbol("test", 0).unwrap()).unwrap();
        assert!(!is_string_term(&constant));
        assert_eq!(constant.as_str(), None);
        assert_ne!(constant, s);
        assert_eq!(constant.to_string(), "test");
    }

    #[test]
    fn test_string_escapes() {
        test_logger();
        let store = TermStore::new();

        let s = store.string("a \"quoted\"\nline");
        assert_eq!(s.as_str(), Some("a \"quoted\"\nline"));
        assert_eq!(s.to_string(), "\"a \\\"quoted\\\"\\nline\"");
    }
}
