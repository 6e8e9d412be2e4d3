//!
//! Lists of terms.
//!
#![forbid(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;

use delegate::delegate;

use crate::ATerm;
use crate::TermError;
use crate::TermView;
use crate::storage::SymbolKind;

/// Returns true iff the term is a non-empty list.
pub fn is_list_term(term: &ATerm) -> bool {
    term.symbol().is_some_and(|symbol| symbol.kind() == SymbolKind::ListCons)
}

/// Returns true iff the term is an empty list.
pub fn is_empty_list_term(term: &ATerm) -> bool {
    term.symbol().is_some_and(|symbol| symbol.kind() == SymbolKind::ListNil)
}

/// Returns the elements of a list term, in order.
///
/// Fails with [TermError::NotApplicable] when the term is not a list.
pub fn list_elements(term: &ATerm) -> Result<Vec<ATerm>, TermError> {
    Ok(ATermList::try_from(term.clone())?.to_vec())
}

/// Returns true iff no tail of the given list carries annotations, so that
/// the list can be written as `[t1,...,tn]`.
pub(crate) fn has_plain_tails(list: &ATerm) -> bool {
    let mut current = list;
    while is_list_term(current) {
        match current.data() {
            TermView::Appl(_, [_, tail]) => {
                if !tail.annotations().is_empty() {
                    return false;
                }
                current = tail;
            }
            _ => break,
        }
    }

    true
}

/// Represents a list of terms.
///
/// # Details
///
/// Internally, uses two reserved function symbols `<cons>` and `<nil>` to
/// represent lists. The `<cons>` function symbol has arity 2, where the first
/// argument is the head of the list and the second argument is the tail of the
/// list. The `<nil>` function symbol has arity 0 and represents the empty list.
/// Lists are created by [crate::TermStore::list], [crate::TermStore::cons]
/// and [crate::TermStore::empty_list].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ATermList {
    term: ATerm,
}

impl ATermList {
    /// The caller must ensure that the term is a list.
    pub(crate) fn new_unchecked(term: ATerm) -> Self {
        debug_assert!(
            is_list_term(&term) || is_empty_list_term(&term),
            "Term {term:?} is not a list"
        );
        ATermList { term }
    }

    /// Returns true iff the list is empty.
    pub fn is_empty(&self) -> bool {
        is_empty_list_term(&self.term)
    }

    /// Obtain the head, i.e. the first element, of the list.
    pub fn head(&self) -> Option<&ATerm> {
        self.iter().next()
    }

    /// Obtain the tail, i.e. the remainder, of the list.
    pub fn tail(&self) -> Option<ATermList> {
        match self.term.data() {
            TermView::Appl(_, [_, tail]) if !self.is_empty() => Some(ATermList::new_unchecked(tail.clone())),
            _ => None,
        }
    }

    /// Returns the number of elements, which takes time linear in the length of the list.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns an iterator over all elements in the list.
    pub fn iter(&self) -> ATermListIter<'_> {
        ATermListIter::new(&self.term)
    }

    /// Converts the list into a vector.
    pub fn to_vec(&self) -> Vec<ATerm> {
        self.iter().cloned().collect()
    }

    /// Returns the underlying term.
    pub fn as_term(&self) -> &ATerm {
        &self.term
    }

    delegate! {
        to self.term {
            pub fn index(&self) -> usize;
            pub fn annotations(&self) -> &[ATerm];
        }
    }
}

impl TryFrom<ATerm> for ATermList {
    type Error = TermError;

    fn try_from(term: ATerm) -> Result<Self, Self::Error> {
        if is_list_term(&term) || is_empty_list_term(&term) {
            Ok(ATermList { term })
        } else {
            Err(TermError::NotApplicable {
                operation: "list",
                kind: term.kind(),
            })
        }
    }
}

impl From<ATermList> for ATerm {
    fn from(value: ATermList) -> Self {
        value.term
    }
}

impl<'a> IntoIterator for &'a ATermList {
    type Item = &'a ATerm;
    type IntoIter = ATermListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ATermList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)
    }
}

impl fmt::Debug for ATermList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)
    }
}

/// Iterator over the elements of a list, it stops at the first tail that is
/// not a list constructor. Annotations of the tails are ignored.
#[derive(Clone)]
pub struct ATermListIter<'a> {
    current: &'a ATerm,
}

impl<'a> ATermListIter<'a> {
    pub(crate) fn new(list: &'a ATerm) -> Self {
        ATermListIter { current: list }
    }
}

impl<'a> Iterator for ATermListIter<'a> {
    type Item = &'a ATerm;

    fn next(&mut self) -> Option<Self::Item> {
        if !is_list_term(self.current) {
            return None;
        }

        match self.current.data() {
            TermView::Appl(_, [head, tail]) => {
                self.current = tail;
                Some(head)
            }
            _ => None,
        }
    }
}

impl FusedIterator for ATermListIter<'_> {}

#[cfg(test)]
mod tests {
    use termpool_utilities::test_logger;

    use crate::TermKind;
    use crate::TermStore;

    use super::*;

    #[test]
    fn test_list() {
        test_logger();
        let store = TermStore::new();

        let elements = vec![store.integer(1), store.string("two"), store.real(3.0)];
        let list = store.list(elements.clone()).unwrap();

        assert!(!list.is_empty());
        assert_eq!(list.len(), 3);
        assert_eq!(list.head(), Some(&elements[0]));
        assert_eq!(list.to_vec(), elements);
        assert_eq!(list.tail().map(|tail| tail.to_vec()), Some(elements[1..].to_vec()));
        assert_eq!(list.to_string(), "[1,\"two\",3.0]");

        // Lists are terms and therefore shared as well.
        assert_eq!(store.list(elements.clone()).unwrap(), list);
        assert_eq!(list_elements(list.as_term()), Ok(elements));
    }

    #[test]
    fn test_empty_list() {
        test_logger();
        let store = TermStore::new();

        let empty = store.empty_list();
        assert!(empty.is_empty());
        assert_eq!(empty.head(), None);
        assert_eq!(empty.tail(), None);
        assert_eq!(empty.len(), 0);
        assert_eq!(empty, store.list(Vec::new()).unwrap());
        assert_eq!(empty.to_string(), "[]");

        let single = store.cons(store.integer(0), empty.clone()).unwrap();
        assert_eq!(single.tail(), Some(empty));
    }

    #[test]
    fn test_not_a_list() {
        test_logger();
        let store = TermStore::new();

        let a = store.constant(&store.symbol("a", 0).unwrap()).unwrap();
        assert_eq!(
            list_elements(&a),
            Err(TermError::NotApplicable {
                operation: "list",
                kind: TermKind::Appl
            })
        );
        assert_eq!(
            list_elements(&store.integer(1)),
            Err(TermError::NotApplicable {
                operation: "list",
                kind: TermKind::Int
            })
        );

        // A user symbol named like the internal one is not a list.
        let cons = store.symbol("<cons>", 2).unwrap();
        let fake = store.apply(&cons, &[a.clone(), a]).unwrap();
        assert!(!is_list_term(&fake));
    }
}
