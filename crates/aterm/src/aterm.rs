#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::iter::FusedIterator;
use std::slice;
use std::sync::Arc;
use std::sync::Weak;

use itertools::Itertools;

use crate::ATermListIter;
use crate::Symbol;
use crate::TermError;
use crate::aterm_list::has_plain_tails;
use crate::is_empty_list_term;
use crate::is_list_term;
use crate::storage::SharedTerm;
use crate::storage::TermData;

/// The kind of a term, i.e., which variant of [TermView] it is.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum TermKind {
    Int,
    Real,
    Blob,
    Appl,
}

impl TermKind {
    /// Returns true iff terms of this kind can never have arguments.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, TermKind::Appl)
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermKind::Int => write!(f, "integer"),
            TermKind::Real => write!(f, "real"),
            TermKind::Blob => write!(f, "blob"),
            TermKind::Appl => write!(f, "application"),
        }
    }
}

/// A borrowed view on the contents of a term that can be matched exhaustively.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TermView<'a> {
    Int(i64),
    Real(f64),
    Blob(&'a [u8]),
    Appl(&'a Symbol, &'a [ATerm]),
}

/// A handle to a term in a [crate::TermStore].
///
/// Terms are immutable and maximally shared, so comparing two handles is a
/// pointer comparison that coincides with structural equality. Cloning
/// only increments a reference count, and handles can be sent to other
/// threads.
///
/// The textual representation follows the ATerm notation, e.g.
/// `f(1,2.5,"s",[a,b]){c}`, where blobs are printed as `#` followed by their
/// bytes in hexadecimal. Reals that are not finite are printed as `NaN`, `inf`
/// and `-inf`. A list with an annotated tail has no list notation, it is
/// printed as an application of `<cons>`, e.g. `<cons>(1,[]{a})`.
#[derive(Clone)]
pub struct ATerm {
    shared: Arc<SharedTerm>,
}

impl ATerm {
    pub(crate) fn new(shared: SharedTerm) -> Self {
        ATerm {
            shared: Arc::new(shared),
        }
    }

    /// Returns the kind of the term.
    pub fn kind(&self) -> TermKind {
        match self.shared.data() {
            TermData::Int(_) => TermKind::Int,
            TermData::Real(_) => TermKind::Real,
            TermData::Blob(_) => TermKind::Blob,
            TermData::Appl { .. } => TermKind::Appl,
        }
    }

    /// Returns a view on the contents of the term.
    pub fn data(&self) -> TermView<'_> {
        match self.shared.data() {
            TermData::Int(value) => TermView::Int(*value),
            TermData::Real(value) => TermView::Real(*value),
            TermData::Blob(bytes) => TermView::Blob(bytes),
            TermData::Appl { symbol, arguments } => TermView::Appl(symbol, arguments),
        }
    }

    /// Returns the number of arguments, which is zero for integers, reals and blobs.
    pub fn arity(&self) -> usize {
        self.args().len()
    }

    /// Returns the argument at the given zero-based index.
    ///
    /// Fails with [TermError::NotApplicable] for integers, reals and blobs,
    /// and with [TermError::IndexOutOfRange] when `index >= arity`.
    pub fn arg(&self, index: usize) -> Result<&ATerm, TermError> {
        let kind = self.kind();
        if kind.is_scalar() {
            return Err(TermError::NotApplicable {
                operation: "arg",
                kind,
            });
        }

        self.args().get(index).ok_or_else(|| TermError::IndexOutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            arity: self.arity(),
        })
    }

    /// The same as [ATerm::arg], but with a signed index. Negative indices are
    /// out of range.
    pub fn child(&self, index: i64) -> Result<&ATerm, TermError> {
        let kind = self.kind();
        if kind.is_scalar() {
            return Err(TermError::NotApplicable {
                operation: "child",
                kind,
            });
        }

        usize::try_from(index)
            .ok()
            .and_then(|index| self.args().get(index))
            .ok_or(TermError::IndexOutOfRange {
                index,
                arity: self.arity(),
            })
    }

    /// Returns an iterator over the arguments of the term, in order. Every call starts from the first argument.
    pub fn arguments(&self) -> ATermArgs<'_> {
        ATermArgs {
            inner: self.args().iter(),
        }
    }

    /// Returns an iterator over the children of the term, which are its arguments.
    pub fn children(&self) -> ATermArgs<'_> {
        self.arguments()
    }

    /// Returns an iterator over all subterms in preorder, starting with the term itself.
    pub fn iter(&self) -> TermIterator<'_> {
        TermIterator { stack: vec![self] }
    }

    /// Returns the head symbol of an application.
    pub fn symbol(&self) -> Option<&Symbol> {
        match self.shared.data() {
            TermData::Appl { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    /// Returns the value of an integer term.
    pub fn as_int(&self) -> Option<i64> {
        match self.shared.data() {
            TermData::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of a real term.
    pub fn as_real(&self) -> Option<f64> {
        match self.shared.data() {
            TermData::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the bytes of a blob term.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self.shared.data() {
            TermData::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the annotations of the term, which are empty for most terms.
    pub fn annotations(&self) -> &[ATerm] {
        self.shared.annotations()
    }

    /// Returns a unique index of the term within its store. Arguments always have a smaller index than their parent.
    pub fn index(&self) -> usize {
        self.shared.index()
    }

    fn args(&self) -> &[ATerm] {
        match self.shared.data() {
            TermData::Appl { arguments, .. } => arguments,
            _ => &[],
        }
    }

    pub(crate) fn shared(&self) -> &SharedTerm {
        &self.shared
    }

    pub(crate) fn store_id(&self) -> usize {
        self.shared.store()
    }

    pub(crate) fn downgrade(&self) -> Weak<SharedTerm> {
        Arc::downgrade(&self.shared)
    }

    pub(crate) fn upgrade(weak: &Weak<SharedTerm>) -> Option<ATerm> {
        weak.upgrade().map(|shared| ATerm { shared })
    }

    /// Returns the shared term if this was the last reference to it.
    pub(crate) fn into_shared(self) -> Option<SharedTerm> {
        Arc::into_inner(self.shared)
    }
}

impl PartialEq for ATerm {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for ATerm {}

impl Hash for ATerm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.shared).hash(state)
    }
}

impl PartialOrd for ATerm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Terms are ordered by their creation, so arguments precede their parents.
impl Ord for ATerm {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.store_id(), self.index()).cmp(&(other.store_id(), other.index()))
    }
}

impl fmt::Display for ATerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data() {
            TermView::Int(value) => write!(f, "{value}")?,
            TermView::Real(value) => write!(f, "{value:?}")?,
            TermView::Blob(bytes) => {
                write!(f, "#")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
            }
            TermView::Appl(symbol, arguments) => {
                if is_empty_list_term(self) || (is_list_term(self) && has_plain_tails(self)) {
                    write!(f, "[{}]", ATermListIter::new(self).format(","))?;
                } else if arguments.is_empty() {
                    write!(f, "{symbol}")?;
                } else {
                    write!(f, "{symbol}({})", arguments.iter().format(","))?;
                }
            }
        }

        if !self.annotations().is_empty() {
            write!(f, "{{{}}}", self.annotations().iter().format(","))?;
        }

        Ok(())
    }
}

impl fmt::Debug for ATerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl<'a> IntoIterator for &'a ATerm {
    type Item = &'a ATerm;
    type IntoIter = ATermArgs<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.arguments()
    }
}

/// An iterator over the arguments of a term.
#[derive(Clone)]
pub struct ATermArgs<'a> {
    inner: slice::Iter<'a, ATerm>,
}

impl ATermArgs<'_> {
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}

impl<'a> Iterator for ATermArgs<'a> {
    type Item = &'a ATerm;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for ATermArgs<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for ATermArgs<'_> {}

impl FusedIterator for ATermArgs<'_> {}

/// An iterator over all subterms of the given [ATerm] in preorder traversal, i.e.,
/// for f(g(a), b) we visit f(g(a), b), g(a), a, b. Shared subterms are visited
/// once for every occurrence.
#[derive(Clone)]
pub struct TermIterator<'a> {
    stack: Vec<&'a ATerm>,
}

impl<'a> Iterator for TermIterator<'a> {
    type Item = &'a ATerm;

    fn next(&mut self) -> Option<Self::Item> {
        let term = self.stack.pop()?;
        self.stack.extend(term.arguments().rev());
        Some(term)
    }
}

#[cfg(test)]
mod tests {
    use termpool_utilities::test_logger;

    use crate::ATermList;
    use crate::TermStore;

    use super::*;

    #[test]
    fn test_arity_and_children() {
        test_logger();
        let store = TermStore::new();

        let f = store.symbol("f", 2).unwrap();
        let one = store.integer(1);
        let two = store.integer(2);
        let t = store.apply(&f, &[one.clone(), two.clone()]).unwrap();

        assert_eq!(t.arity(), 2);
        assert_eq!(t.kind(), TermKind::Appl);
        assert_eq!(t.symbol(), Some(&f));
        assert_eq!(t.child(0), Ok(&one));
        assert_eq!(t.arg(1), Ok(&two));
        assert_eq!(t.arguments().cloned().collect::<Vec<_>>(), vec![one, two]);
    }

    #[test]
    fn test_child_out_of_range() {
        test_logger();
        let store = TermStore::new();

        let f = store.symbol("f", 2).unwrap();
        let t = store.apply(&f, &[store.integer(1), store.integer(2)]).unwrap();

        for index in [2, 3, 100, i64::MAX, -1, -2, i64::MIN] {
            assert_eq!(t.child(index), Err(TermError::IndexOutOfRange { index, arity: 2 }));
        }

        assert_eq!(t.arg(2), Err(TermError::IndexOutOfRange { index: 2, arity: 2 }));
        assert_eq!(
            t.arg(usize::MAX),
            Err(TermError::IndexOutOfRange {
                index: i64::MAX,
                arity: 2
            })
        );
    }

    #[test]
    fn test_scalars_have_no_children() {
        test_logger();
        let store = TermStore::new();

        for term in [store.integer(5), store.real(1.0), store.blob(&[1, 2, 3])] {
            assert_eq!(term.arity(), 0);
            assert!(term.arguments().is_empty());
            assert_eq!(
                term.child(0),
                Err(TermError::NotApplicable {
                    operation: "child",
                    kind: term.kind()
                })
            );
        }

        // A constant is an application, so indexing it is out of range instead.
        let a = store.constant(&store.symbol("a", 0).unwrap()).unwrap();
        assert_eq!(a.child(0), Err(TermError::IndexOutOfRange { index: 0, arity: 0 }));
    }

    #[test]
    fn test_arguments_are_restartable() {
        test_logger();
        let store = TermStore::new();

        let f = store.symbol("f", 3).unwrap();
        let t = store
            .apply(&f, &[store.integer(1), store.integer(2), store.integer(3)])
            .unwrap();

        let first: Vec<_> = t.arguments().collect();
        let second: Vec<_> = t.arguments().collect();
        assert_eq!(first, second);

        let reversed: Vec<_> = t.arguments().rev().filter_map(|arg| arg.as_int()).collect();
        assert_eq!(reversed, vec![3, 2, 1]);
        assert_eq!(t.arguments().len(), 3);
    }

    #[test]
    fn test_preorder_iterator() {
        test_logger();
        let store = TermStore::new();

        let f = store.symbol("f", 2).unwrap();
        let g = store.symbol("g", 1).unwrap();
        let a = store.constant(&store.symbol("a", 0).unwrap()).unwrap();
        let b = store.constant(&store.symbol("b", 0).unwrap()).unwrap();

        let ga = store.apply(&g, &[a.clone()]).unwrap();
        let t = store.apply(&f, &[ga.clone(), b.clone()]).unwrap();

        let visited: Vec<_> = t.iter().cloned().collect();
        assert_eq!(visited, vec![t.clone(), ga, a, b]);
    }

    #[test]
    fn test_display() {
        test_logger();
        let store = TermStore::new();

        let f = store.symbol("f", 4).unwrap();
        let a = store.constant(&store.symbol("a", 0).unwrap()).unwrap();
        let list = store.list([a.clone(), store.integer(-3)]).unwrap();
        let t = store
            .apply(
                &f,
                &[store.real(2.5), store.string("s\"q"), list.into(), store.blob(&[0x0a, 0xff])],
            )
            .unwrap();

        assert_eq!(t.to_string(), "f(2.5,\"s\\\"q\",[a,-3],#0aff)");

        let annotated = store.annotate(&t, &[a.clone(), store.integer(1)]).unwrap();
        assert_eq!(annotated.to_string(), "f(2.5,\"s\\\"q\",[a,-3],#0aff){a,1}");
        assert_eq!(format!("{:?}", store.real(1.0)), "1.0");
    }

    #[test]
    fn test_display_reals() {
        test_logger();
        let store = TermStore::new();

        assert_eq!(store.real(-0.0).to_string(), "-0.0");
        assert_eq!(store.real(f64::NAN).to_string(), "NaN");
        assert_eq!(store.real(f64::INFINITY).to_string(), "inf");
        assert_eq!(store.real(f64::NEG_INFINITY).to_string(), "-inf");
    }

    #[test]
    fn test_display_annotated_list_tails() {
        test_logger();
        let store = TermStore::new();

        let one = store.integer(1);
        let empty = store.empty_list();
        let annotated_empty = store.annotate(empty.as_term(), &[store.integer(7)]).unwrap();

        let plain = store.cons(one.clone(), empty).unwrap();
        let annotated = store
            .cons(one.clone(), ATermList::try_from(annotated_empty).unwrap())
            .unwrap();

        assert_ne!(plain, annotated);
        assert_eq!(plain.to_string(), "[1]");
        assert_eq!(annotated.to_string(), "<cons>(1,[]{7})");

        // Only the first annotated tail breaks the list notation.
        let longer = store.cons(store.integer(0), annotated).unwrap();
        assert_eq!(longer.to_string(), "<cons>(0,<cons>(1,[]{7}))");

        let outer = store.annotate(plain.as_term(), &[store.integer(2)]).unwrap();
        assert_eq!(outer.to_string(), "[1]{2}");
    }
}
