use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;

/// A grammar variable, identified by its name.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct NonTerminal(String);

impl NonTerminal {
    /// Create a non-terminal with the given name.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// The name of this non-terminal.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// An element of the alphabet. Terminals that made it into a
/// [`ContextFreeGrammar`] are always a single character.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Terminal(String);

impl Terminal {
    /// Create a terminal with the given content.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// Create a terminal from a single character.
    pub fn from_char(c: char) -> Self {
        Self(c.to_string())
    }

    /// The text of this terminal.
    pub fn content(&self) -> &str {
        &self.0
    }
}

/// Either side of the terminal / non-terminal divide.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum Symbol {
    /// See [`Terminal`].
    Terminal(Terminal),
    /// See [`NonTerminal`].
    NonTerminal(NonTerminal),
}

impl Symbol {
    /// Shorthand for `Symbol::Terminal(Terminal::new(s))`.
    pub fn terminal<S: Into<String>>(s: S) -> Self {
        Symbol::Terminal(Terminal::new(s))
    }

    /// Shorthand for `Symbol::NonTerminal(NonTerminal::new(s))`.
    pub fn non_terminal<S: Into<String>>(s: S) -> Self {
        Symbol::NonTerminal(NonTerminal::new(s))
    }

    /// Returns the inner terminal, if this is one.
    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Symbol::Terminal(term) => Some(term),
            Symbol::NonTerminal(_) => None,
        }
    }

    /// Returns the inner non-terminal, if this is one.
    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(nonterm) => Some(nonterm),
            Symbol::Terminal(_) => None,
        }
    }
}

/// A single production rule `lhs -> rhs`.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct ProductionRule {
    lhs: NonTerminal,
    rhs: Vec<Symbol>,
}

impl ProductionRule {
    /// Create a new rule. The right-hand side is expected to be non-empty.
    pub fn new(lhs: NonTerminal, rhs: Vec<Symbol>) -> Self {
        Self {
            lhs,
            rhs,
        }
    }

    /// The left-hand side.
    pub fn lhs(&self) -> &NonTerminal {
        &self.lhs
    }

    /// The right-hand side.
    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    /// `A -> B` where `B` is a non-terminal.
    pub fn is_unit(&self) -> bool {
        matches!(self.rhs.as_slice(), [Symbol::NonTerminal(_)])
    }

    /// Whether this rule is either `A -> a` or `A -> B C`.
    pub fn is_in_cnf(&self) -> bool {
        matches!(
            self.rhs.as_slice(),
            [Symbol::Terminal(_)] | [Symbol::NonTerminal(_), Symbol::NonTerminal(_)]
        )
    }
}

/// A context-free grammar.
///
/// The first rule always belongs to the [entrypoint](ContextFreeGrammar::entrypoint).
/// Instances are created with the [`GrammarBuilder`](super::GrammarBuilder).
#[derive(Debug, Clone, PartialEq)]
pub struct ContextFreeGrammar {
    pub(crate) rules: Vec<ProductionRule>,
    pub(crate) terminals: BTreeSet<Terminal>,
    pub(crate) nonterminals: BTreeSet<NonTerminal>,
    pub(crate) entrypoint: NonTerminal,
    pub(crate) nonterminal_cursor: usize,
}

impl ContextFreeGrammar {
    pub(crate) fn new(
        rules: Vec<ProductionRule>,
        terminals: BTreeSet<Terminal>,
        nonterminals: BTreeSet<NonTerminal>,
        entrypoint: NonTerminal,
    ) -> Self {
        let mut cfg = Self {
            rules,
            terminals,
            nonterminals,
            entrypoint,
            nonterminal_cursor: 1,
        };
        cfg.entrypoint_first();
        cfg
    }

    /// All production rules.
    pub fn rules(&self) -> &[ProductionRule] {
        &self.rules
    }

    /// The alphabet.
    pub fn terminals(&self) -> &BTreeSet<Terminal> {
        &self.terminals
    }

    /// All non-terminals that are currently in use.
    pub fn nonterminals(&self) -> &BTreeSet<NonTerminal> {
        &self.nonterminals
    }

    /// The start symbol.
    pub fn entrypoint(&self) -> &NonTerminal {
        &self.entrypoint
    }

    /// Whether every rule is either `A -> a` or `A -> B C`.
    pub fn is_in_cnf(&self) -> bool {
        self.rules.iter().all(ProductionRule::is_in_cnf)
    }

    /// Iterate over the rules of a single non-terminal.
    pub fn rules_of<'a>(&'a self, nonterm: &'a NonTerminal) -> impl Iterator<Item = &'a ProductionRule> + 'a {
        self.rules.iter().filter(move |rule| rule.lhs() == nonterm)
    }

    /// Stable-sorts the rules so that the ones of the entrypoint come first.
    pub(crate) fn entrypoint_first(&mut self) {
        let entrypoint = &self.entrypoint;
        self.rules.sort_by_key(|rule| rule.lhs() != entrypoint);
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "'{}'", self.0)
    }
}

impl Display for NonTerminal {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Symbol::Terminal(term) => write!(f, "{}", term),
            Symbol::NonTerminal(nonterm) => write!(f, "{}", nonterm),
        }
    }
}

impl Display for ProductionRule {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{} -> {}", self.lhs, self.rhs.iter().join(" "))
    }
}

impl Display for ContextFreeGrammar {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "Entrypoint: {}", self.entrypoint)?;
        writeln!(f, "Terminals: {}", self.terminals.iter().join(" "))?;
        writeln!(f, "Rules:")?;

        for rule in &self.rules {
            writeln!(f, "  {}", rule)?;
        }

        Ok(())
    }
}
