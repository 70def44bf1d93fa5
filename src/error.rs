//! Error types of this crate.

use std::path::PathBuf;
use thiserror::Error;

/// A grammar description could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub struct ParsingError {
    path: PathBuf,
    line: usize,
    msg: String,
}

impl ParsingError {
    pub(crate) fn new<P: Into<PathBuf>, S: Into<String>>(path: P, line: usize, msg: S) -> Self {
        Self {
            path: path.into(),
            line,
            msg: msg.into(),
        }
    }

    /// The 1-based line the error occurred on. 0 means the whole source.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Description of what went wrong.
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl std::fmt::Display for ParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "ParsingError in {}: {}", self.path.display(), self.msg)
        } else {
            write!(f, "ParsingError in {}:{}: {}", self.path.display(), self.line, self.msg)
        }
    }
}

/// Errors that can appear while building or normalizing a grammar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    /// The entrypoint has no production rule.
    #[error("The grammar does not contain any rule for its entrypoint: {0}")]
    MissingEntrypoint(String),

    /// A right-hand side references an unknown non-terminal.
    #[error("The non-terminal '{0}' is referenced but never declared or defined")]
    MissingNonTerminal(String),

    /// Terminals are single characters.
    #[error("The terminal '{0}' must consist of exactly one character")]
    InvalidTerminal(String),

    /// A rule without any symbol on its right-hand side.
    #[error("The rule for '{0}' has an empty right-hand side")]
    EmptyRule(String),

    /// An operation that needs CNF got something else.
    #[error("The grammar is not in Chomsky normal form: {0}")]
    NotInCnf(String),
}

/// Errors that can appear while generating tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// A percentage outside of 0..=100.
    #[error("A percentage must be between 0 and 100, got {0}")]
    InvalidPercentage(u32),

    /// Positive tests cannot exist.
    #[error("Positive tests were requested but the language of the grammar is empty")]
    EmptyLanguage,

    /// The attempt budget ran out before enough unique tests were found.
    #[error("Gave up after {attempts} attempts: accepted {accepted} of {requested} tests")]
    AttemptsExhausted {
        /// Number of tests asked for.
        requested: usize,
        /// Number of unique tests found.
        accepted: usize,
        /// Number of synthesis attempts made.
        attempts: usize,
    },

    /// The result channel closed early.
    #[error("All workers stopped before generation finished")]
    WorkersDisconnected,
}

/// Errors while loading a generator configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Could not read config {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    /// The file is not a valid config.
    #[error("Invalid config {}: {}", .0.display(), .1)]
    Json(PathBuf, #[source] serde_json::Error),
}

/// Any error this crate produces.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`ParsingError`].
    #[error(transparent)]
    Parsing(#[from] ParsingError),

    /// See [`GrammarError`].
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// See [`GenerateError`].
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tests could not be serialized.
    #[error("Could not serialize tests: {0}")]
    Json(#[from] serde_json::Error),
}
