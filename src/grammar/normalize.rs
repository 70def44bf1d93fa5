use std::collections::{BTreeMap, BTreeSet};

use ahash::{AHashMap, AHashSet};
use log::{debug, info, warn};
use petgraph::{
    algo::is_cyclic_directed,
    graphmap::DiGraphMap,
    visit::{Bfs, Dfs},
};

use crate::grammar::{ContextFreeGrammar, NonTerminal, ProductionRule, Symbol, Terminal};

fn is_generating(symbol: &Symbol, generating: &AHashSet<&NonTerminal>) -> bool {
    match symbol {
        Symbol::Terminal(_) => true,
        Symbol::NonTerminal(nonterm) => generating.contains(nonterm),
    }
}

impl ContextFreeGrammar {
    /// Mint a non-terminal `<base>'<n>` that does not exist yet and register it.
    fn fresh_nonterminal(&mut self, base: &str) -> NonTerminal {
        loop {
            let candidate = NonTerminal::new(format!("{}'{}", base, self.nonterminal_cursor));
            self.nonterminal_cursor += 1;

            if self.nonterminals.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Split every rule with more than two symbols on its right-hand side
    /// into a chain of rules with exactly two.
    pub fn remove_long_rules(&mut self) {
        let rules = std::mem::take(&mut self.rules);
        let mut new_rules = Vec::with_capacity(rules.len());

        for rule in rules {
            let rhs = rule.rhs();

            if rhs.len() <= 2 {
                new_rules.push(rule);
                continue;
            }

            let mut current = rule.lhs().clone();

            for symbol in &rhs[..rhs.len() - 2] {
                let next = self.fresh_nonterminal(rule.lhs().id());
                new_rules.push(ProductionRule::new(
                    current,
                    vec![symbol.clone(), Symbol::NonTerminal(next.clone())],
                ));
                current = next;
            }

            new_rules.push(ProductionRule::new(current, rhs[rhs.len() - 2..].to_vec()));
        }

        self.rules = new_rules;
    }

    /// Replace every unit rule `A -> B` by the non-unit rules of all non-terminals
    /// reachable from `B` through unit rules.
    pub fn remove_unit_rules(&mut self) {
        let new_rules = {
            let mut graph = DiGraphMap::<&str, ()>::new();

            for rule in &self.rules {
                if let [Symbol::NonTerminal(target)] = rule.rhs() {
                    graph.add_edge(rule.lhs().id(), target.id(), ());
                }
            }

            if graph.edge_count() == 0 {
                return;
            }

            if is_cyclic_directed(&graph) {
                warn!("Grammar contains cyclic unit rules, collapsing them");
            }

            let mut non_unit = AHashMap::<&str, Vec<&ProductionRule>>::new();

            for rule in &self.rules {
                if !rule.is_unit() {
                    non_unit.entry(rule.lhs().id()).or_default().push(rule);
                }
            }

            let mut seen = AHashSet::new();
            let mut new_rules = Vec::with_capacity(self.rules.len());

            for rule in &self.rules {
                let target = match rule.rhs() {
                    [Symbol::NonTerminal(target)] => target,
                    _ => {
                        if seen.insert(rule.clone()) {
                            new_rules.push(rule.clone());
                        }
                        continue;
                    },
                };

                let mut dfs = Dfs::new(&graph, target.id());

                while let Some(nonterm) = dfs.next(&graph) {
                    for borrowed in non_unit.get(nonterm).into_iter().flatten() {
                        let copy = ProductionRule::new(rule.lhs().clone(), borrowed.rhs().to_vec());

                        if seen.insert(copy.clone()) {
                            new_rules.push(copy);
                        }
                    }
                }
            }

            new_rules
        };

        debug!("Unit rule elimination: {} -> {} rules", self.rules.len(), new_rules.len());
        self.rules = new_rules;
        self.entrypoint_first();
    }

    /// Remove all rules that cannot produce a terminal string or cannot be
    /// reached from the entrypoint.
    pub fn remove_useless_symbols(&mut self) {
        let (new_rules, new_nonterminals) = {
            let mut generating = AHashSet::<&NonTerminal>::new();

            loop {
                let mut changed = false;

                for rule in &self.rules {
                    if generating.contains(rule.lhs()) {
                        continue;
                    }

                    if rule.rhs().iter().all(|symbol| is_generating(symbol, &generating)) {
                        generating.insert(rule.lhs());
                        changed = true;
                    }
                }

                if !changed {
                    break;
                }
            }

            let productive: Vec<&ProductionRule> = self.rules
                .iter()
                .filter(|rule| rule.rhs().iter().all(|symbol| is_generating(symbol, &generating)))
                .collect();

            let mut graph = DiGraphMap::<&str, ()>::new();
            graph.add_node(self.entrypoint.id());

            for rule in &productive {
                for symbol in rule.rhs() {
                    if let Symbol::NonTerminal(nonterm) = symbol {
                        graph.add_edge(rule.lhs().id(), nonterm.id(), ());
                    }
                }
            }

            let mut reachable = AHashSet::new();
            let mut bfs = Bfs::new(&graph, self.entrypoint.id());

            while let Some(nonterm) = bfs.next(&graph) {
                reachable.insert(nonterm);
            }

            let new_rules: Vec<ProductionRule> = productive
                .into_iter()
                .filter(|rule| reachable.contains(rule.lhs().id()))
                .cloned()
                .collect();

            // The entrypoint stays even if its language is empty
            let new_nonterminals: BTreeSet<NonTerminal> = self.nonterminals
                .iter()
                .filter(|nonterm| *nonterm == &self.entrypoint || (reachable.contains(nonterm.id()) && generating.contains(nonterm)))
                .cloned()
                .collect();

            (new_rules, new_nonterminals)
        };

        debug!(
            "Useless symbol removal: {} -> {} rules, {} -> {} non-terminals",
            self.rules.len(),
            new_rules.len(),
            self.nonterminals.len(),
            new_nonterminals.len()
        );

        self.rules = new_rules;
        self.nonterminals = new_nonterminals;
    }

    /// Replace terminals in rules with two symbols by non-terminals that
    /// produce exactly that terminal.
    pub fn isolate_terminals(&mut self) {
        let rules = std::mem::take(&mut self.rules);
        let mut new_rules = Vec::with_capacity(rules.len());
        let mut isolated = BTreeMap::<Terminal, NonTerminal>::new();
        let mut extra_rules = Vec::new();

        for rule in rules {
            if rule.rhs().len() < 2 {
                new_rules.push(rule);
                continue;
            }

            let mut rhs = Vec::with_capacity(rule.rhs().len());

            for symbol in rule.rhs() {
                match symbol {
                    Symbol::Terminal(term) => {
                        let nonterm = match isolated.get(term) {
                            Some(nonterm) => nonterm.clone(),
                            None => {
                                let nonterm = self.fresh_nonterminal("T");
                                extra_rules.push(ProductionRule::new(nonterm.clone(), vec![Symbol::Terminal(term.clone())]));
                                isolated.insert(term.clone(), nonterm.clone());
                                nonterm
                            },
                        };
                        rhs.push(Symbol::NonTerminal(nonterm));
                    },
                    Symbol::NonTerminal(_) => rhs.push(symbol.clone()),
                }
            }

            new_rules.push(ProductionRule::new(rule.lhs().clone(), rhs));
        }

        new_rules.append(&mut extra_rules);
        self.rules = new_rules;
    }

    /// Convert this grammar into Chomsky normal form. The generated language stays the same.
    pub fn convert_to_cnf(&mut self) {
        let before = self.rules.len();

        self.remove_long_rules();
        self.remove_unit_rules();
        self.remove_useless_symbols();
        self.isolate_terminals();

        info!(
            "Converted grammar to CNF: {} -> {} rules, {} non-terminals",
            before,
            self.rules.len(),
            self.nonterminals.len()
        );
        debug!("Grammar in CNF:\n{}", self);
    }
}
