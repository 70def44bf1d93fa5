use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;

use crate::{
    error::{GrammarError, ParsingError},
    grammar::{ContextFreeGrammar, NonTerminal, ProductionRule, Symbol, Terminal},
    parser::text::{self, ParsedGrammar},
};

/// The GrammarBuilder collects rules and symbol declarations and returns a validated [`ContextFreeGrammar`].
///
/// Use it like so:
/// ```
/// use grammar_testgen::grammar::ContextFreeGrammar;
///
/// let grammar = ContextFreeGrammar::builder()
///     .text_source("TLIST := a b\nS -> A B\nA -> a\nB -> b").unwrap()
///     // Bring the grammar into Chomsky normal form while building
///     .normalize(true)
///     .build().unwrap();
/// assert!(grammar.is_in_cnf());
/// ```
pub struct GrammarBuilder {
    rules: Vec<ProductionRule>,
    terminals: BTreeSet<Terminal>,
    nonterminals: BTreeSet<NonTerminal>,
    entrypoint: Option<String>,
    normalize: bool,
}

impl GrammarBuilder {
    pub(crate) fn new() -> Self {
        Self {
            rules: Vec::new(),
            terminals: BTreeSet::new(),
            nonterminals: BTreeSet::new(),
            entrypoint: None,
            normalize: false,
        }
    }

    fn check_terminals(&self) -> Option<String> {
        self.terminals
            .iter()
            .find(|term| term.content().chars().count() != 1)
            .map(|term| term.content().to_string())
    }

    fn check_non_terminals(&self) -> Option<String> {
        for rule in &self.rules {
            for symbol in rule.rhs() {
                if let Symbol::NonTerminal(nonterm) = symbol {
                    if !self.nonterminals.contains(nonterm) {
                        return Some(nonterm.id().to_string());
                    }
                }
            }
        }

        None
    }

    fn merge(mut self, parsed: ParsedGrammar) -> Self {
        self.terminals.extend(parsed.terminals);
        self.nonterminals.extend(parsed.nonterminals);
        self.rules.extend(parsed.rules);
        self
    }
}

impl GrammarBuilder {
    /// Load a grammar file from disk in the line-based text format
    /// (`TLIST := ...`, `NTLIST := ...`, `A -> s1 s2 ...`, `END`).
    pub fn text_grammar<P: AsRef<Path>>(self, path: P) -> Result<Self, ParsingError> {
        let parsed = text::parse_file(path.as_ref())?;
        Ok(self.merge(parsed))
    }

    /// Load a grammar in text format from a string.
    pub fn text_source(self, source: &str) -> Result<Self, ParsingError> {
        let parsed = text::parse_str(source)?;
        Ok(self.merge(parsed))
    }

    /// Load a grammar in text format from a reader, e.g. stdin.
    pub fn text_reader<R: BufRead>(self, reader: R) -> Result<Self, ParsingError> {
        let parsed = text::parse_reader(reader, Path::new("<stdin>"))?;
        Ok(self.merge(parsed))
    }

    /// Declare terminals.
    pub fn terminals<I, S>(mut self, terminals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminals.extend(terminals.into_iter().map(Terminal::new));
        self
    }

    /// Declare non-terminals. Declared non-terminals without rules are allowed,
    /// they simply generate nothing.
    pub fn nonterminals<I, S>(mut self, nonterminals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nonterminals.extend(nonterminals.into_iter().map(NonTerminal::new));
        self
    }

    /// Add a single rule. Terminals appearing in it are added to the alphabet.
    pub fn rule(mut self, rule: ProductionRule) -> Self {
        for symbol in rule.rhs() {
            if let Symbol::Terminal(term) = symbol {
                self.terminals.insert(term.clone());
            }
        }
        self.rules.push(rule);
        self
    }

    /// Set the entrypoint of the grammar. Defaults to the left-hand side of the first rule.
    pub fn entrypoint<S: Into<String>>(mut self, entrypoint: S) -> Self {
        self.entrypoint = Some(entrypoint.into());
        self
    }

    /// Convert the grammar into Chomsky normal form before returning it.
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Create a [`ContextFreeGrammar`].
    pub fn build(mut self) -> Result<ContextFreeGrammar, GrammarError> {
        let entrypoint = match self.entrypoint.take().or_else(|| self.rules.first().map(|rule| rule.lhs().id().to_string())) {
            Some(entrypoint) => NonTerminal::new(entrypoint),
            None => return Err(GrammarError::MissingEntrypoint(String::new())),
        };

        if !self.rules.iter().any(|rule| rule.lhs() == &entrypoint) {
            return Err(GrammarError::MissingEntrypoint(entrypoint.id().to_string()));
        }

        if let Some(rule) = self.rules.iter().find(|rule| rule.rhs().is_empty()) {
            return Err(GrammarError::EmptyRule(rule.lhs().id().to_string()));
        }

        for rule in &self.rules {
            self.nonterminals.insert(rule.lhs().clone());
        }

        if let Some(term) = self.check_terminals() {
            return Err(GrammarError::InvalidTerminal(term));
        }

        if let Some(nonterm) = self.check_non_terminals() {
            return Err(GrammarError::MissingNonTerminal(nonterm));
        }

        let mut cfg = ContextFreeGrammar::new(
            self.rules,
            self.terminals,
            self.nonterminals,
            entrypoint,
        );

        if self.normalize {
            cfg.convert_to_cnf();
        }

        Ok(cfg)
    }
}
