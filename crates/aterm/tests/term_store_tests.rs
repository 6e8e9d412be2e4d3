use std::sync::Arc;

use test_case::test_case;

use termpool_aterm::ATerm;
use termpool_aterm::StoreConfig;
use termpool_aterm::SymbolPolicy;
use termpool_aterm::TermError;
use termpool_aterm::TermKind;
use termpool_aterm::TermStore;
use termpool_aterm::TermView;
use termpool_aterm::list_elements;
use termpool_aterm::replace;
use termpool_utilities::random_test_threads;
use termpool_utilities::test_logger;

#[test]
fn test_function_application() {
    test_logger();
    let store = TermStore::new();

    let s = store.symbol("f", 2).unwrap();
    let t = store.apply(&s, &[store.integer(1), store.integer(2)]).unwrap();

    assert_eq!(t.arity(), 2);
    assert_eq!(*t.child(0).unwrap(), store.integer(1));
    assert_eq!(t.child(2), Err(TermError::IndexOutOfRange { index: 2, arity: 2 }));
}

#[test]
fn test_wrong_child_count() {
    test_logger();
    let store = TermStore::new();

    let s = store.symbol("f", 2).unwrap();
    assert_eq!(
        store.apply(&s, &[store.integer(1)]),
        Err(TermError::ArityMismatch {
            symbol: "f".to_string(),
            expected: 2,
            found: 1
        })
    );
}

#[test_case(0 ; "nullary")]
#[test_case(1 ; "unary")]
#[test_case(3 ; "ternary")]
#[test_case(17 ; "large")]
fn test_arity_matches_children(arity: usize) {
    test_logger();
    let store = TermStore::new();

    let symbol = store.symbol("f", arity).unwrap();
    let children: Vec<ATerm> = (0..arity as i64).map(|i| store.integer(i)).collect();
    let t = store.apply(&symbol, &children).unwrap();

    assert_eq!(t.arity(), arity);
    assert_eq!(t.children().cloned().collect::<Vec<_>>(), children);
    assert_eq!(t.children().collect::<Vec<_>>(), t.children().collect::<Vec<_>>());

    // Interning is idempotent.
    assert_eq!(store.apply(&symbol, &children).unwrap(), t);
    assert_eq!(store.apply_iter(&symbol, children.iter().cloned()).unwrap(), t);
}

#[test_case(-1 ; "negative")]
#[test_case(2 ; "arity")]
#[test_case(i64::MAX ; "maximum")]
#[test_case(i64::MIN ; "minimum")]
fn test_child_out_of_range(index: i64) {
    test_logger();
    let store = TermStore::new();

    let f = store.symbol("f", 2).unwrap();
    let t = store.apply(&f, &[store.integer(1), store.integer(2)]).unwrap();

    assert_eq!(t.child(index), Err(TermError::IndexOutOfRange { index, arity: 2 }));
}

#[test]
fn test_scalar_terms() {
    test_logger();
    let store = TermStore::new();

    let terms = [store.integer(5), store.real(1.0), store.blob(b"bytes")];
    let kinds = [TermKind::Int, TermKind::Real, TermKind::Blob];

    for (term, kind) in terms.iter().zip(kinds) {
        assert_eq!(term.arity(), 0);
        assert_eq!(term.kind(), kind);
        assert_eq!(term.children().count(), 0);
        assert_eq!(
            term.child(0),
            Err(TermError::NotApplicable {
                operation: "child",
                kind
            })
        );
        assert_eq!(term.symbol(), None);
    }

    match terms[2].data() {
        TermView::Blob(bytes) => assert_eq!(bytes, b"bytes"),
        other => panic!("Expected a blob, found {other:?}"),
    }
}

#[test]
fn test_symbol_policies() {
    test_logger();

    let overloaded = TermStore::new();
    assert!(overloaded.symbol("f", 1).is_ok());
    assert!(overloaded.symbol("f", 2).is_ok());

    let fixed = TermStore::with_config(StoreConfig::default().with_symbol_policy(SymbolPolicy::FixedArity));
    assert!(fixed.symbol("f", 1).is_ok());
    assert_eq!(
        fixed.symbol("f", 2),
        Err(TermError::ArityConflict {
            name: "f".to_string(),
            declared: 1,
            requested: 2
        })
    );

    // Fresh symbols never take a name that is in use.
    let fresh = fixed.fresh_symbol("f", 3).unwrap();
    assert_ne!(fresh.name(), "f");
    assert_eq!(fixed.symbol(fresh.name(), 3).unwrap(), fresh);
}

#[test]
fn test_isolated_stores() {
    test_logger();
    let first = TermStore::new();
    let second = TermStore::new();

    let a = first.integer(1);
    let b = second.integer(1);

    assert_ne!(a, b);
    assert_eq!(a.to_string(), b.to_string());
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
}

#[test]
fn test_terms_outlive_store() {
    test_logger();
    let store = TermStore::new();

    let f = store.symbol("f", 1).unwrap();
    let t = store.apply(&f, &[store.string("s")]).unwrap();
    drop(store);

    assert_eq!(t.to_string(), "f(\"s\")");
    assert_eq!(t.child(0).unwrap().as_str(), Some("s"));
}

#[test]
fn test_lists_and_replace() {
    test_logger();
    let store = TermStore::new();

    let list = store.list((1..=4).map(|i| store.integer(i))).unwrap();
    let doubled = replace(&store, list.as_term(), |store, t| {
        Ok(t.as_int().map(|value| store.integer(2 * value)))
    })
    .unwrap();

    let values: Vec<i64> = list_elements(&doubled)
        .unwrap()
        .iter()
        .filter_map(|t| t.as_int())
        .collect();
    assert_eq!(values, vec![2, 4, 6, 8]);
    assert_eq!(doubled.to_string(), "[2,4,6,8]");
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_concurrent_construction() {
    let store = Arc::new(TermStore::new());

    random_test_threads(
        50,
        8,
        || Arc::clone(&store),
        |rng, store| {
            use rand::Rng;

            let f = store.symbol("f", 2).unwrap();
            let a: i64 = rng.random_range(0..10);
            let b: i64 = rng.random_range(0..10);

            let t = store.apply(&f, &[store.integer(a), store.integer(b)]).unwrap();
            let u = store.apply(&f, &[store.integer(a), store.integer(b)]).unwrap();

            assert_eq!(t, u);
            assert_eq!(t.to_string(), format!("f({a},{b})"));
        },
    );

    // Every distinct term exists exactly once.
    assert!(store.len() <= 10 + 10 * 10);
}
