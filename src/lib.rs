//! This library generates labelled test sets for context-free grammars.
//!
//! A test is a string together with the answer to "does the grammar generate it?".
//! It consists of
//! - __grammar__: Load grammars in a line-based text format, normalize them into Chomsky normal form
//!   and derive which terminals may follow each other.
//! - __cyk__: A membership oracle that labels every synthesized string.
//! - __generator__: Random walks over the terminal bigrams, run on a pool of worker threads,
//!   until enough unique tests of each class are found.
//! - __backends__: Write test sets as plain text or JSON.
//!
//! ## Getting Started
//! The first step always is to load a grammar. To do this use the [`ContextFreeGrammar::builder()`](grammar::ContextFreeGrammar::builder) method
//! that will give you access to a [`GrammarBuilder`](grammar::GrammarBuilder) like this:
//! ```
//! use grammar_testgen::grammar::ContextFreeGrammar;
//!
//! let grammar = ContextFreeGrammar::builder()
//!     // Load a grammar from a string, or use text_grammar() for files
//!     .text_source("TLIST := ( )\nS -> ( S ) S\nS -> ( )").unwrap()
//!     // Set the entrypoint
//!     .entrypoint("S")
//!     .build().unwrap();
//! ```
//! Then, generate tests and write them out with one of the provided backends:
//! ```
//! # use grammar_testgen::grammar::ContextFreeGrammar;
//! use grammar_testgen::{
//!     backends::{TestWriter, json::JsonWriter},
//!     generator::{GeneratorConfig, TestGenerator},
//! };
//!
//! # let grammar = ContextFreeGrammar::builder().text_source("TLIST := ( )\nS -> ( S ) S\nS -> ( )").unwrap().build().unwrap();
//! let generator = TestGenerator::new(grammar, GeneratorConfig::default()).unwrap();
//! let tests = generator.generate(10, 50).unwrap();
//!
//! let mut out = Vec::new();
//! JsonWriter::new().write_tests(&tests, &mut out).unwrap();
//! ```
//! And that's it.

#![deny(missing_docs)]

pub(crate) mod parser;

pub mod backends;
pub mod cyk;
pub mod error;
pub mod generator;
pub mod grammar;

#[cfg(test)]
mod tests;
