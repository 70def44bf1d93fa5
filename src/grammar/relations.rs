use ahash::{AHashMap, AHashSet};
use log::debug;

use crate::grammar::{ContextFreeGrammar, NonTerminal, Symbol, Terminal};

/// Terminal sets per non-terminal, used for FIRST and LAST.
pub type TerminalSets = AHashMap<NonTerminal, AHashSet<Terminal>>;

/// Something that can come right after a non-terminal.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub enum Follower {
    /// A grammar symbol.
    Symbol(Symbol),
    /// The end of the input, seeded at the entrypoint.
    EndOfInput,
}

/// Inserts every item of `from` into `into`, reporting whether anything was new.
fn extend_changed<'a, T, I>(into: &mut AHashSet<T>, from: I) -> bool
where
    T: Clone + Eq + std::hash::Hash + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut changed = false;

    for item in from {
        if !into.contains(item) {
            into.insert(item.clone());
            changed = true;
        }
    }

    changed
}

/// The four terminal-adjacency relations of a grammar, each solved as a fixed point.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    first: TerminalSets,
    last: TerminalSets,
    follow: AHashMap<NonTerminal, AHashSet<Follower>>,
    precede: AHashMap<Symbol, AHashSet<Terminal>>,
}

impl Relations {
    /// Solve all four relations. The grammar must not contain empty rules,
    /// which the [`GrammarBuilder`](super::GrammarBuilder) guarantees.
    pub fn compute(grammar: &ContextFreeGrammar) -> Self {
        let first = compute_first(grammar);
        let last = compute_last(grammar);
        let follow = compute_follow(grammar, &first);
        let precede = compute_precede(grammar, &last);

        debug!(
            "Solved relations: {} FIRST, {} LAST, {} FOLLOW, {} PRECEDE entries",
            first.values().map(|set| set.len()).sum::<usize>(),
            last.values().map(|set| set.len()).sum::<usize>(),
            follow.values().map(|set| set.len()).sum::<usize>(),
            precede.values().map(|set| set.len()).sum::<usize>(),
        );

        Self {
            first,
            last,
            follow,
            precede,
        }
    }

    /// Terminals that can begin a string derived from `nonterm`.
    pub fn first(&self, nonterm: &NonTerminal) -> Option<&AHashSet<Terminal>> {
        self.first.get(nonterm)
    }

    /// Terminals that can end a string derived from `nonterm`.
    pub fn last(&self, nonterm: &NonTerminal) -> Option<&AHashSet<Terminal>> {
        self.last.get(nonterm)
    }

    /// Symbols that can come right after `nonterm`.
    pub fn follow(&self, nonterm: &NonTerminal) -> Option<&AHashSet<Follower>> {
        self.follow.get(nonterm)
    }

    /// Terminals that can come right before `symbol`.
    pub fn precede(&self, symbol: &Symbol) -> Option<&AHashSet<Terminal>> {
        self.precede.get(symbol)
    }
}

fn empty_sets<T>(grammar: &ContextFreeGrammar) -> AHashMap<NonTerminal, AHashSet<T>> {
    grammar.nonterminals().iter().map(|nonterm| (nonterm.clone(), AHashSet::new())).collect()
}

/// Solve FIRST: only the leftmost symbol of a rule matters since no rule derives the empty string.
pub fn compute_first(grammar: &ContextFreeGrammar) -> TerminalSets {
    compute_edge(grammar, |rhs| &rhs[0])
}

/// Solve LAST, the mirror image of FIRST.
pub fn compute_last(grammar: &ContextFreeGrammar) -> TerminalSets {
    compute_edge(grammar, |rhs| &rhs[rhs.len() - 1])
}

fn compute_edge<F>(grammar: &ContextFreeGrammar, edge: F) -> TerminalSets
where
    F: Fn(&[Symbol]) -> &Symbol,
{
    let mut sets: TerminalSets = empty_sets(grammar);

    loop {
        let mut changed = false;

        for rule in grammar.rules() {
            let additions: Vec<Terminal> = match edge(rule.rhs()) {
                Symbol::Terminal(term) => vec![term.clone()],
                Symbol::NonTerminal(nonterm) => match sets.get(nonterm) {
                    Some(set) => set.iter().cloned().collect(),
                    None => continue,
                },
            };

            let target = sets.entry(rule.lhs().clone()).or_default();
            changed |= extend_changed(target, additions.iter());
        }

        if !changed {
            break;
        }
    }

    sets
}

/// Solve FOLLOW given FIRST.
pub fn compute_follow(grammar: &ContextFreeGrammar, first: &TerminalSets) -> AHashMap<NonTerminal, AHashSet<Follower>> {
    let mut follow: AHashMap<NonTerminal, AHashSet<Follower>> = empty_sets(grammar);

    follow
        .entry(grammar.entrypoint().clone())
        .or_default()
        .insert(Follower::EndOfInput);

    loop {
        let mut changed = false;

        for rule in grammar.rules() {
            let rhs = rule.rhs();

            for (i, symbol) in rhs.iter().enumerate() {
                let Symbol::NonTerminal(nonterm) = symbol else {
                    continue;
                };

                let additions: Vec<Follower> = match rhs.get(i + 1) {
                    None => match follow.get(rule.lhs()) {
                        Some(set) => set.iter().cloned().collect(),
                        None => continue,
                    },
                    Some(next @ Symbol::Terminal(_)) => vec![Follower::Symbol(next.clone())],
                    Some(next @ Symbol::NonTerminal(next_nonterm)) => {
                        let mut additions = vec![Follower::Symbol(next.clone())];

                        if let Some(set) = first.get(next_nonterm) {
                            additions.extend(set.iter().map(|term| Follower::Symbol(Symbol::Terminal(term.clone()))));
                        }

                        additions
                    },
                };

                let target = follow.entry(nonterm.clone()).or_default();
                changed |= extend_changed(target, additions.iter());
            }
        }

        if !changed {
            break;
        }
    }

    follow
}

/// Solve PRECEDE given LAST.
pub fn compute_precede(grammar: &ContextFreeGrammar, last: &TerminalSets) -> AHashMap<Symbol, AHashSet<Terminal>> {
    let mut precede: AHashMap<Symbol, AHashSet<Terminal>> = grammar
        .terminals()
        .iter()
        .map(|term| Symbol::Terminal(term.clone()))
        .chain(grammar.nonterminals().iter().map(|nonterm| Symbol::NonTerminal(nonterm.clone())))
        .map(|symbol| (symbol, AHashSet::new()))
        .collect();

    loop {
        let mut changed = false;

        for rule in grammar.rules() {
            let rhs = rule.rhs();

            for (i, symbol) in rhs.iter().enumerate() {
                let additions: Vec<Terminal> = if i == 0 {
                    match precede.get(&Symbol::NonTerminal(rule.lhs().clone())) {
                        Some(set) => set.iter().cloned().collect(),
                        None => continue,
                    }
                } else {
                    match &rhs[i - 1] {
                        Symbol::Terminal(term) => vec![term.clone()],
                        Symbol::NonTerminal(prev) => match last.get(prev) {
                            Some(set) => set.iter().cloned().collect(),
                            None => continue,
                        },
                    }
                };

                let target = precede.entry(symbol.clone()).or_default();
                changed |= extend_changed(target, additions.iter());
            }
        }

        if !changed {
            break;
        }
    }

    precede
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cnf(source: &str) -> ContextFreeGrammar {
        ContextFreeGrammar::builder()
            .text_source(source).unwrap()
            .normalize(true)
            .build().unwrap()
    }

    fn terms(set: Option<&AHashSet<Terminal>>) -> Vec<String> {
        let mut terms: Vec<String> = set.map(|set| set.iter().map(|term| term.content().to_string()).collect()).unwrap_or_default();
        terms.sort();
        terms
    }

    fn nt(s: &str) -> NonTerminal {
        NonTerminal::new(s)
    }

    #[test]
    fn test_first_last() {
        let grammar = cnf("S -> A B\nA -> a\nA -> c\nB -> b");
        let relations = Relations::compute(&grammar);

        assert_eq!(terms(relations.first(&nt("S"))), vec!["a", "c"]);
        assert_eq!(terms(relations.last(&nt("S"))), vec!["b"]);
        assert_eq!(terms(relations.first(&nt("B"))), vec!["b"]);
        assert_eq!(terms(relations.last(&nt("A"))), vec!["a", "c"]);
    }

    #[test]
    fn test_follow() {
        let grammar = cnf("S -> A B\nA -> a\nB -> b");
        let relations = Relations::compute(&grammar);

        let follow_a = relations.follow(&nt("A")).unwrap();
        assert!(follow_a.contains(&Follower::Symbol(Symbol::non_terminal("B"))));
        assert!(follow_a.contains(&Follower::Symbol(Symbol::terminal("b"))));
        assert!(!follow_a.contains(&Follower::EndOfInput));

        let follow_b = relations.follow(&nt("B")).unwrap();
        assert!(follow_b.contains(&Follower::EndOfInput));
        assert!(relations.follow(&nt("S")).unwrap().contains(&Follower::EndOfInput));
    }

    #[test]
    fn test_precede() {
        let grammar = cnf("S -> A B\nA -> a\nB -> b");
        let relations = Relations::compute(&grammar);

        assert_eq!(terms(relations.precede(&Symbol::non_terminal("B"))), vec!["a"]);
        assert_eq!(terms(relations.precede(&Symbol::terminal("b"))), vec!["a"]);
        assert!(terms(relations.precede(&Symbol::non_terminal("A"))).is_empty());
    }

    #[test]
    fn test_recursive_fixed_point() {
        // a^n b^n, n >= 1
        let grammar = cnf("S -> a S b\nS -> a b");
        let relations = Relations::compute(&grammar);

        assert_eq!(terms(relations.first(&nt("S"))), vec!["a"]);
        assert_eq!(terms(relations.last(&nt("S"))), vec!["b"]);
        assert_eq!(terms(relations.precede(&Symbol::non_terminal("S"))), vec!["a"]);

        let follow_s = relations.follow(&nt("S")).unwrap();
        assert!(follow_s.contains(&Follower::EndOfInput));
        assert!(follow_s.contains(&Follower::Symbol(Symbol::terminal("b"))));
        assert!(!follow_s.contains(&Follower::Symbol(Symbol::terminal("a"))));
    }

    #[test]
    fn test_empty_language() {
        let grammar = cnf("S -> a S");
        let relations = Relations::compute(&grammar);

        assert!(terms(relations.first(grammar.entrypoint())).is_empty());
        assert!(relations.follow(grammar.entrypoint()).unwrap().contains(&Follower::EndOfInput));
    }
}
