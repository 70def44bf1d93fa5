use std::collections::BTreeSet;

use ahash::AHashMap;
use itertools::Itertools;
use log::debug;

use crate::grammar::{ContextFreeGrammar, Follower, Relations, Symbol, Terminal};

/// Which terminals may immediately follow which terminal in some string of the language.
///
/// This is an over-approximation: every consecutive pair of a word in the
/// language is contained, but not every path through the map spells a word.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BigramMap {
    successors: AHashMap<Terminal, BTreeSet<Terminal>>,
}

impl BigramMap {
    /// Combine the relations of `grammar` into a bigram map.
    pub fn build(grammar: &ContextFreeGrammar, relations: &Relations) -> Self {
        let mut map = Self {
            successors: grammar.terminals().iter().map(|term| (term.clone(), BTreeSet::new())).collect(),
        };

        // Adjacent terminals in a rule
        for rule in grammar.rules() {
            for (left, right) in rule.rhs().iter().tuple_windows() {
                if let (Symbol::Terminal(t1), Symbol::Terminal(t2)) = (left, right) {
                    map.insert(t1, t2);
                }
            }
        }

        for nt1 in grammar.nonterminals() {
            let (Some(first), Some(last), Some(follow)) = (relations.first(nt1), relations.last(nt1), relations.follow(nt1)) else {
                continue;
            };

            for follower in follow.iter() {
                match follower {
                    // t1 in LAST(N), t2 in FOLLOW(N)
                    Follower::Symbol(Symbol::Terminal(t2)) => {
                        for t1 in last.iter() {
                            map.insert(t1, t2);
                        }
                    },
                    // t1 in LAST(N1), N2 in FOLLOW(N1), t2 in FIRST(N2)
                    Follower::Symbol(Symbol::NonTerminal(nt2)) => {
                        if let Some(first2) = relations.first(nt2) {
                            for (t1, t2) in last.iter().cartesian_product(first2.iter()) {
                                map.insert(t1, t2);
                            }
                        }
                    },
                    Follower::EndOfInput => {},
                }
            }

            // t1 in PRECEDE(N), t2 in FIRST(N)
            if let Some(precede) = relations.precede(&Symbol::NonTerminal(nt1.clone())) {
                for (t1, t2) in precede.iter().cartesian_product(first.iter()) {
                    map.insert(t1, t2);
                }
            }
        }

        debug!(
            "Built bigram map with {} pairs over {} terminals",
            map.successors.values().map(BTreeSet::len).sum::<usize>(),
            map.successors.len()
        );

        map
    }

    fn insert(&mut self, t1: &Terminal, t2: &Terminal) {
        self.successors.entry(t1.clone()).or_default().insert(t2.clone());
    }

    /// The terminals that may follow `term`.
    pub fn successors(&self, term: &Terminal) -> Option<&BTreeSet<Terminal>> {
        self.successors.get(term)
    }

    /// Whether `t2` may follow `t1`.
    pub fn contains(&self, t1: &Terminal, t2: &Terminal) -> bool {
        self.successors.get(t1).is_some_and(|set| set.contains(t2))
    }

    /// All pairs of the map in sorted order.
    pub fn pairs(&self) -> Vec<(&Terminal, &Terminal)> {
        self.successors
            .iter()
            .flat_map(|(t1, set)| set.iter().map(move |t2| (t1, t2)))
            .sorted()
            .collect()
    }
}
