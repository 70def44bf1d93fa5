//! Decide membership of strings with the Cocke-Younger-Kasami algorithm.
//!
//! Use it like so:
//! ```
//! use grammar_testgen::{grammar::ContextFreeGrammar, cyk::CykRecognizer};
//!
//! let grammar = ContextFreeGrammar::builder()
//!     .text_source("S -> a b c").unwrap()
//!     .normalize(true)
//!     .build().unwrap();
//! let recognizer = CykRecognizer::new(&grammar).unwrap();
//!
//! assert!(recognizer.parse("abc"));
//! assert!(!recognizer.parse("acb"));
//! ```

use ahash::AHashMap;

use crate::{
    error::GrammarError,
    grammar::{ContextFreeGrammar, Symbol},
};

/// A rule `lhs -> left right` with all non-terminals replaced by indices.
#[derive(Debug, Clone, Copy)]
struct BinaryRule {
    lhs: usize,
    left: usize,
    right: usize,
}

/// Membership oracle for a grammar in Chomsky normal form.
///
/// Non-terminals are numbered once on construction so that a table cell
/// is a plain boolean vector.
#[derive(Debug, Clone)]
pub struct CykRecognizer {
    terminal_rules: AHashMap<char, Vec<usize>>,
    binary_rules: Vec<BinaryRule>,
    nonterminal_count: usize,
    entrypoint: usize,
}

impl CykRecognizer {
    /// Prepare a recognizer. Fails if `grammar` is not in Chomsky normal form.
    pub fn new(grammar: &ContextFreeGrammar) -> Result<Self, GrammarError> {
        let mut ids = AHashMap::new();
        ids.insert(grammar.entrypoint().id(), 0);

        for nonterm in grammar.nonterminals() {
            let next = ids.len();
            ids.entry(nonterm.id()).or_insert(next);
        }

        let mut terminal_rules = AHashMap::<char, Vec<usize>>::new();
        let mut binary_rules = Vec::new();

        for rule in grammar.rules() {
            let lhs = match ids.get(rule.lhs().id()) {
                Some(id) => *id,
                None => return Err(GrammarError::MissingNonTerminal(rule.lhs().id().to_string())),
            };

            match rule.rhs() {
                [Symbol::Terminal(term)] => {
                    let mut chars = term.content().chars();

                    match (chars.next(), chars.next()) {
                        (Some(c), None) => terminal_rules.entry(c).or_default().push(lhs),
                        _ => return Err(GrammarError::InvalidTerminal(term.content().to_string())),
                    }
                },
                [Symbol::NonTerminal(left), Symbol::NonTerminal(right)] => {
                    let (Some(left), Some(right)) = (ids.get(left.id()), ids.get(right.id())) else {
                        return Err(GrammarError::NotInCnf(rule.to_string()));
                    };

                    binary_rules.push(BinaryRule {
                        lhs,
                        left: *left,
                        right: *right,
                    });
                },
                _ => return Err(GrammarError::NotInCnf(rule.to_string())),
            }
        }

        Ok(Self {
            terminal_rules,
            binary_rules,
            nonterminal_count: ids.len(),
            entrypoint: 0,
        })
    }

    /// Whether `input` is a word of the language. The empty string never is.
    pub fn parse(&self, input: &str) -> bool {
        let chars: Vec<char> = input.chars().collect();
        let n = chars.len();

        if n == 0 {
            return false;
        }

        let width = self.nonterminal_count;
        // table[(i * n + j) * width + A]: A derives chars[i..=j]
        let mut table = vec![false; n * n * width];
        let cell = |i: usize, j: usize| (i * n + j) * width;

        for (i, c) in chars.iter().enumerate() {
            match self.terminal_rules.get(c) {
                Some(lhss) => {
                    for lhs in lhss {
                        table[cell(i, i) + lhs] = true;
                    }
                },
                None => return false,
            }
        }

        for span in 2..=n {
            for i in 0..=n - span {
                let j = i + span - 1;

                for k in i..j {
                    let left = cell(i, k);
                    let right = cell(k + 1, j);

                    for rule in &self.binary_rules {
                        if table[left + rule.left] && table[right + rule.right] {
                            table[cell(i, j) + rule.lhs] = true;
                        }
                    }
                }
            }
        }

        table[cell(0, n - 1) + self.entrypoint]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer(source: &str) -> CykRecognizer {
        let grammar = ContextFreeGrammar::builder()
            .text_source(source).unwrap()
            .normalize(true)
            .build().unwrap();
        CykRecognizer::new(&grammar).unwrap()
    }

    #[test]
    fn test_simple() {
        let cyk = recognizer("S -> A B\nA -> a\nB -> b");
        assert!(cyk.parse("ab"));
        assert!(!cyk.parse("ba"));
        assert!(!cyk.parse(""));
        assert!(!cyk.parse("aab"));
    }

    #[test]
    fn test_long_rule() {
        let cyk = recognizer("S -> a b c");
        assert!(cyk.parse("abc"));
        assert!(!cyk.parse("acb"));
        assert!(!cyk.parse("ab"));
    }

    #[test]
    fn test_balanced() {
        let cyk = recognizer("S -> a S b\nS -> a b");
        assert!(cyk.parse("ab"));
        assert!(cyk.parse("aaabbb"));
        assert!(!cyk.parse("aabbb"));
        assert!(!cyk.parse("abab"));
    }

    #[test]
    fn test_arithmetic() {
        let grammar = ContextFreeGrammar::builder()
            .text_grammar("test-data/grammars/arithmetic.txt").unwrap()
            .normalize(true)
            .build().unwrap();
        let cyk = CykRecognizer::new(&grammar).unwrap();

        for word in ["1", "1+2", "(1+2)*2", "((2))", "1*2*1+2"] {
            assert!(cyk.parse(word), "{} should be accepted", word);
        }

        for word in ["+", "1+", "(1", "1)(", "12", "1x2"] {
            assert!(!cyk.parse(word), "{} should be rejected", word);
        }
    }

    #[test]
    fn test_single_terminal_start() {
        let cyk = recognizer("S -> a");
        assert!(cyk.parse("a"));
        assert!(!cyk.parse("aa"));
    }

    #[test]
    fn test_not_in_cnf() {
        let grammar = ContextFreeGrammar::builder()
            .text_source("S -> a B\nB -> b").unwrap()
            .build().unwrap();
        assert!(matches!(CykRecognizer::new(&grammar), Err(GrammarError::NotInCnf(_))));
    }

    #[test]
    fn test_empty_language() {
        let cyk = recognizer("S -> a S");
        assert!(!cyk.parse("a"));
        assert!(!cyk.parse("aaaa"));
    }
}
