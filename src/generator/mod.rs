//! Synthesize labelled test strings for a grammar.
//!
//! Strings are produced by random walks over the [`BigramMap`] and labelled
//! by the [`CykRecognizer`], so every test's answer is exact even though the
//! walk itself only approximates the language.
//!
//! Use it like so:
//! ```
//! use grammar_testgen::{grammar::ContextFreeGrammar, generator::{TestGenerator, GeneratorConfig}};
//!
//! let grammar = ContextFreeGrammar::builder()
//!     .text_source("S -> a S\nS -> b").unwrap()
//!     .build().unwrap();
//! let config = GeneratorConfig {
//!     seed: Some(1),
//!     ..Default::default()
//! };
//! let generator = TestGenerator::new(grammar, config).unwrap();
//!
//! let tests = generator.generate(10, 50).unwrap();
//! assert_eq!(tests.len(), 10);
//! assert_eq!(tests.iter().filter(|test| test.answer).count(), 5);
//! ```

mod collector;
mod config;

pub use config::*;

use ahash::{AHashMap, AHashSet};
use log::info;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    cyk::CykRecognizer,
    error::{GenerateError, GrammarError},
    grammar::{BigramMap, ContextFreeGrammar, Relations, Terminal},
};

/// A question for the membership oracle together with the right answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Test {
    /// The candidate string.
    pub question: String,
    /// Whether the grammar generates `question`.
    pub answer: bool,
}

/// Everything needed to synthesize tests for one grammar, shared read-only by all workers.
#[derive(Debug)]
pub struct TestGenerator {
    grammar: ContextFreeGrammar,
    relations: Relations,
    bigrams: BigramMap,
    recognizer: CykRecognizer,
    config: GeneratorConfig,
    alphabet: Vec<Terminal>,
    initial: Vec<Terminal>,
    finals: AHashSet<Terminal>,
    successors: AHashMap<Terminal, Vec<Terminal>>,
}

impl TestGenerator {
    /// Analyze `grammar`. It is brought into Chomsky normal form first, which also
    /// drops useless rules, so an empty rule set means an empty language.
    pub fn new(mut grammar: ContextFreeGrammar, config: GeneratorConfig) -> Result<Self, GrammarError> {
        grammar.convert_to_cnf();

        let relations = Relations::compute(&grammar);
        let bigrams = BigramMap::build(&grammar, &relations);
        let recognizer = CykRecognizer::new(&grammar)?;

        let alphabet: Vec<Terminal> = if config.use_full_alphabet {
            ('a'..='z').map(Terminal::from_char).collect()
        } else {
            grammar.terminals().iter().cloned().collect()
        };

        // Sorted so that seeded runs are reproducible
        let mut initial: Vec<Terminal> = relations
            .first(grammar.entrypoint())
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        initial.sort();

        let finals = relations.last(grammar.entrypoint()).cloned().unwrap_or_default();

        let successors = grammar
            .terminals()
            .iter()
            .filter_map(|term| {
                let next = bigrams.successors(term)?;
                Some((term.clone(), next.iter().cloned().collect()))
            })
            .collect();

        info!(
            "Prepared generator for {} rules over {} terminals",
            grammar.rules().len(),
            grammar.terminals().len()
        );

        Ok(Self {
            grammar,
            relations,
            bigrams,
            recognizer,
            config,
            alphabet,
            initial,
            finals,
            successors,
        })
    }

    /// The grammar in Chomsky normal form.
    pub fn grammar(&self) -> &ContextFreeGrammar {
        &self.grammar
    }

    /// FIRST, LAST, FOLLOW and PRECEDE of the grammar.
    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    /// The bigram map the random walks follow.
    pub fn bigrams(&self) -> &BigramMap {
        &self.bigrams
    }

    /// The recognizer that labels the tests.
    pub fn recognizer(&self) -> &CykRecognizer {
        &self.recognizer
    }

    /// The active configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate `count` unique tests sorted by question.
    ///
    /// `positive_percentage` of them (rounded) are positive. In hard mode this
    /// holds for the recognizer's answers and results that miss their target
    /// class are retried, otherwise it only holds for the synthesis targets.
    pub fn generate(&self, count: usize, positive_percentage: u32) -> Result<Vec<Test>, GenerateError> {
        if positive_percentage > 100 {
            return Err(GenerateError::InvalidPercentage(positive_percentage));
        }

        self.config.validate()?;

        let positives = (count * positive_percentage as usize + 50) / 100;

        if positives > 0 && self.config.necessary && self.grammar.rules().is_empty() {
            return Err(GenerateError::EmptyLanguage);
        }

        if count == 0 {
            return Ok(Vec::new());
        }

        let tests = collector::collect(self, count, positives)?;

        info!(
            "Generated {} tests, {} positive",
            tests.len(),
            tests.iter().filter(|test| test.answer).count()
        );

        Ok(tests)
    }

    /// Synthesize one labelled string aiming for a member (`positive`) or a non-member.
    ///
    /// Returns `None` if the string came out empty and empty tests are not allowed.
    pub fn synthesize_one<R: Rng>(&self, positive: bool, rng: &mut R) -> Option<Test> {
        let mut question = String::new();
        let mut candidates: &[Terminal] = &self.initial;
        let mut last: Option<&Terminal> = None;

        if !positive && roll(rng, self.config.start_elsewhere_probability) {
            candidates = &self.alphabet;
        }

        for _ in 0..self.config.max_test_length {
            let next = if !positive && roll(rng, self.config.random_jump_probability) {
                self.alphabet.choose(rng)
            } else {
                if let Some(last) = last {
                    if self.should_stop(positive, last, rng) {
                        break;
                    }
                }

                candidates.choose(rng)
            };

            let Some(term) = next else {
                break;
            };

            question.push_str(term.content());
            candidates = self.successors.get(term).map(Vec::as_slice).unwrap_or_default();
            last = Some(term);
        }

        if question.is_empty() && !self.config.allow_empty_tests {
            return None;
        }

        let answer = self.recognizer.parse(&question);
        Some(Test {
            question,
            answer,
        })
    }

    fn should_stop<R: Rng>(&self, positive: bool, last: &Terminal, rng: &mut R) -> bool {
        if positive {
            self.finals.contains(last) && roll(rng, self.config.final_state_stop_probability)
        } else {
            roll(rng, self.config.early_stop_probability)
        }
    }
}

/// True with a chance of `percent` percent.
fn roll<R: Rng>(rng: &mut R, percent: u32) -> bool {
    rng.gen_range(0..100) < percent
}
