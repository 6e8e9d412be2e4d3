#![forbid(unsafe_code)]

use std::fmt;

use smallvec::SmallVec;
use termpool_utilities::debug_trace;

use crate::ATerm;
use crate::TermError;
use crate::TermStore;

/// This can be used to construct an [ATerm] from a given input of (inductive) type I
/// without using recursion, as such avoiding system stack overflows. See [TermTransformer::evaluate]
/// for more details.
pub struct TermTransformer<I, C> {
    // The stack of terms
    terms: Vec<Option<ATerm>>,
    configs: Vec<Config<I, C>>,
}

/// Applies the given function to every subterm of the given term using the [TermTransformer].
///     function(subterm) returns:
///         Ok(None)   , in which case subterm is kept and it is recursed into its arguments.
///         Ok(Some(x)), in which case subterm is replaced by x.
///
/// Rebuilt terms keep their annotations. The first error returned by the
/// function, or by the construction of a term, is returned.
pub fn replace<F>(store: &TermStore, term: &ATerm, function: F) -> Result<ATerm, TermError>
where
    F: Fn(&TermStore, &ATerm) -> Result<Option<ATerm>, TermError>,
{
    let mut transformer = TermTransformer::<ATerm, ATerm>::new();

    transformer.evaluate(
        store,
        term.clone(),
        |store, args, t| match function(store, &t)? {
            Some(result) => Ok(Yield::Term(result)),
            None if t.kind().is_scalar() => Ok(Yield::Term(t)),
            None => {
                for arg in t.arguments() {
                    args.push(arg.clone());
                }

                Ok(Yield::Construct(t))
            }
        },
        |store, original, args| {
            let symbol = original.symbol().ok_or(TermError::NotApplicable {
                operation: "replace",
                kind: original.kind(),
            })?;

            let result = store.apply(symbol, args)?;
            if original.annotations().is_empty() {
                Ok(result)
            } else {
                store.annotate(&result, original.annotations())
            }
        },
    )
}

impl<I: fmt::Debug, C: fmt::Debug> TermTransformer<I, C> {
    pub fn new() -> TermTransformer<I, C> {
        TermTransformer {
            terms: vec![],
            configs: vec![],
        }
    }

    /// This can be used to construct a term from a given input of (inductive)
    /// type I, without using the system stack, i.e. recursion.
    ///
    /// The `transformer` function is applied to every instance I, which can
    /// generate more inputs using a so-called argument stack and some
    /// instance C that is used to construct the result term. Alternatively, it
    /// yields a result term directly.
    ///
    /// The `construct` function takes an instance C and the results for the
    /// inputs that were pushed to the argument stack, in the order in which
    /// they were pushed.
    ///
    /// # Example
    ///
    /// [replace] transforms a term into another term using a function `f :
    /// ATerm -> Option<ATerm>`. Then `I` is [ATerm] since that is the input,
    /// and `C` is the original term from which the head symbol and
    /// annotations of the result are taken.
    pub fn evaluate<F, G>(
        &mut self,
        store: &TermStore,
        input: I,
        transformer: F,
        construct: G,
    ) -> Result<ATerm, TermError>
    where
        F: Fn(&TermStore, &mut ArgStack<I, C>, I) -> Result<Yield<C>, TermError>,
        G: Fn(&TermStore, C, &[ATerm]) -> Result<ATerm, TermError>,
    {
        debug_trace!("Transforming {:?}", input);
        self.terms.clear();
        self.configs.clear();

        self.terms.push(None);
        self.configs.push(Config::Apply(input, 0));

        while let Some(config) = self.configs.pop() {
            match config {
                Config::Apply(input, result) => {
                    // Applies the given function to this input, and obtain a number of symbol and arguments.
                    let top_of_stack = self.configs.len();
                    let mut args = ArgStack::new(&mut self.terms, &mut self.configs);

                    match transformer(store, &mut args, input)? {
                        Yield::Construct(input) => {
                            // This occurs before the other constructs.
                            let arity = args.len();
                            self.configs.insert(top_of_stack, Config::Construct(input, arity, result));
                        }
                        Yield::Term(term) => {
                            self.terms[result] = Some(term);
                        }
                    }
                }
                Config::Construct(input, arity, result) => {
                    let first = self.terms.len() - arity;
                    let arguments: SmallVec<[ATerm; 8]> = self.terms.drain(first..).flatten().collect();
                    debug_assert_eq!(arguments.len(), arity, "All arguments must be evaluated");

                    self.terms[result] = Some(construct(store, input, &arguments)?);
                }
            }

            debug_trace!("{:?}", self);
        }

        debug_assert!(self.terms.len() == 1, "Expect exactly one term on the result stack");

        Ok(self
            .terms
            .pop()
            .flatten()
            .expect("The input was transformed into exactly one term"))
    }
}

impl<I: fmt::Debug, C: fmt::Debug> Default for TermTransformer<I, C> {
    fn default() -> Self {
        Self::new()
    }
}

enum Config<I, C> {
    Apply(I, usize),
    Construct(C, usize, usize),
}

pub enum Yield<C> {
    Term(ATerm),  // Yield this term as is.
    Construct(C), // Yield f(args) for every arg push to the argument stack, with the transformer applied to it.
}

/// This struct defines a local argument stack on the global stack.
pub struct ArgStack<'a, I, C> {
    terms: &'a mut Vec<Option<ATerm>>,
    configs: &'a mut Vec<Config<I, C>>,
    top_of_stack: usize,
}

impl<'a, I, C> ArgStack<'a, I, C> {
    fn new(terms: &'a mut Vec<Option<ATerm>>, configs: &'a mut Vec<Config<I, C>>) -> ArgStack<'a, I, C> {
        let top_of_stack = terms.len();
        ArgStack {
            terms,
            configs,
            top_of_stack,
        }
    }

    /// Returns the amount of arguments added.
    pub fn len(&self) -> usize {
        self.terms.len() - self.top_of_stack
    }

    /// Returns true iff no arguments were added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds the input to the argument stack, the transformer is applied to it
    /// before the result is passed to construct.
    pub fn push(&mut self, input: I) {
        self.configs.push(Config::Apply(input, self.terms.len()));
        self.terms.push(None);
    }
}

impl<I: fmt::Debug, C: fmt::Debug> fmt::Debug for TermTransformer<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Terms: [")?;
        for (i, term) in self.terms.iter().enumerate() {
            writeln!(f, "{i}\t{term:?}")?;
        }
        writeln!(f, "]")?;

        writeln!(f, "Configs: [")?;
        for config in &self.configs {
            writeln!(f, "\t{config:?}")?;
        }
        write!(f, "]")
    }
}

impl<I: fmt::Debug, C: fmt::Debug> fmt::Debug for Config<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Config::Apply(x, result) => write!(f, "Apply({x:?}, {result})"),
            Config::Construct(input, arity, result) => {
                write!(f, "Construct({input:?}, {arity}, {result})")
            }
        }
    }
}
