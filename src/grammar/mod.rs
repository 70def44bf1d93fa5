//! This is the grammar engine: the symbol model, normalization into
//! Chomsky normal form and the terminal-adjacency analysis.
//!
//! Use it like so:
//! ```
//! use grammar_testgen::grammar::{ContextFreeGrammar, Relations, BigramMap, Terminal};
//!
//! let mut grammar = ContextFreeGrammar::builder()
//!     .text_source("S -> a S b\nS -> a b").unwrap()
//!     .build().unwrap();
//!
//! // Bring the grammar into Chomsky normal form
//! grammar.convert_to_cnf();
//!
//! // Solve FIRST, LAST, FOLLOW and PRECEDE
//! let relations = Relations::compute(&grammar);
//!
//! // Which terminals may follow which
//! let bigrams = BigramMap::build(&grammar, &relations);
//! assert!(bigrams.contains(&Terminal::new("a"), &Terminal::new("b")));
//! assert!(!bigrams.contains(&Terminal::new("b"), &Terminal::new("a")));
//! ```

mod bigram;
mod builder;
mod cfg;
mod normalize;
mod relations;

pub use bigram::*;
pub use builder::*;
pub use cfg::*;
pub use relations::*;

impl ContextFreeGrammar {
    /// Start building a new grammar.
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }
}
