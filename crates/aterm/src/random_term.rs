#![forbid(unsafe_code)]

use rand::Rng;
use rand::seq::IndexedRandom;
use rustc_hash::FxHashSet;

use crate::ATerm;
use crate::TermError;
use crate::TermKind;
use crate::TermStore;

/// Create a random term consisting of the given symbols and constants. Performs
/// `iterations` number of constructions, where every construction can use the
/// results of the earlier ones as arguments, so subterms are often shared.
///
/// Symbols with arguments are skipped as long as no term exists to use as an
/// argument. Fails with [TermError::NotApplicable] when nothing was constructed
/// at all, e.g., when no constants are given and every symbol has arguments.
pub fn random_term(
    store: &TermStore,
    rng: &mut impl Rng,
    symbols: &[(String, usize)],
    constants: &[String],
    iterations: usize,
) -> Result<ATerm, TermError> {
    let mut subterms = FxHashSet::default();
    for name in constants {
        subterms.insert(store.constant(&store.symbol(name, 0)?)?);
    }

    // A set has no stable order, so the candidates are kept in a vector as well.
    let mut candidates: Vec<ATerm> = subterms.iter().cloned().collect();
    candidates.sort();

    let mut result = candidates.choose(rng).cloned();
    for _ in 0..iterations {
        let Some((name, arity)) = symbols.choose(rng) else {
            break;
        };

        // Without any constants there are no arguments to choose from.
        if *arity > 0 && candidates.is_empty() {
            continue;
        }

        let mut arguments = Vec::with_capacity(*arity);
        for _ in 0..*arity {
            if let Some(argument) = candidates.choose(rng) {
                arguments.push(argument.clone());
            }
        }

        let symbol = store.symbol(name, *arity)?;
        let term = store.apply(&symbol, &arguments)?;

        // Make this term available as another subterm that can be used.
        if subterms.insert(term.clone()) {
            candidates.push(term.clone());
        }

        result = Some(term);
    }

    result.ok_or(TermError::NotApplicable {
        operation: "random_term",
        kind: TermKind::Appl,
    })
}

#[cfg(test)]
mod tests {
    use termpool_utilities::random_test;

    use crate::TermStore;

    use super::*;

    #[test]
    fn test_random_term_uses_symbols() {
        random_test(10, |rng| {
            let store = TermStore::new();
            let term = random_term(&store, rng, &[("f".into(), 2)], &["a".to_string()], 20).unwrap();

            for subterm in term.iter() {
                let name = subterm.symbol().map(|symbol| symbol.name());
                assert!(name == Some("f") || name == Some("a"));
            }
        });
    }

    #[test]
    fn test_random_term_without_constants() {
        random_test(10, |rng| {
            let store = TermStore::new();

            assert_eq!(
                random_term(&store, rng, &[("f".into(), 2), ("g".into(), 1)], &[], 20),
                Err(TermError::NotApplicable {
                    operation: "random_term",
                    kind: TermKind::Appl
                })
            );

            // A constant symbol provides the arguments for the other symbols.
            let term = random_term(&store, rng, &[("c".into(), 0), ("f".into(), 2)], &[], 50).unwrap();
            for subterm in term.iter() {
                let name = subterm.symbol().map(|symbol| symbol.name());
                assert!(name == Some("f") || name == Some("c"));
            }
        });
    }
}
