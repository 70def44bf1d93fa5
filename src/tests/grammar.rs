use std::collections::BTreeSet;

use ahash::AHashSet;
use itertools::Itertools;
use proptest::prelude::*;

use crate::{
    cyk::CykRecognizer,
    grammar::{BigramMap, ContextFreeGrammar, Relations, Symbol, Terminal},
};

const MAX_LEN: usize = 5;
static SYMBOLS: [&str; 5] = ["S", "A", "B", "a", "b"];

/// All words of at most `max_len` terminals, found by expanding the leftmost
/// non-terminal of every sentential form. No rule shrinks a form, so longer forms are dropped.
fn derive_words(grammar: &ContextFreeGrammar, max_len: usize) -> BTreeSet<String> {
    let start = vec![Symbol::NonTerminal(grammar.entrypoint().clone())];
    let mut seen = AHashSet::new();
    let mut queue = vec![start.clone()];
    let mut words = BTreeSet::new();
    seen.insert(start);

    while let Some(form) = queue.pop() {
        let Some(pos) = form.iter().position(|symbol| matches!(symbol, Symbol::NonTerminal(_))) else {
            words.insert(form.iter().filter_map(Symbol::as_terminal).map(Terminal::content).collect());
            continue;
        };

        let Symbol::NonTerminal(nonterm) = &form[pos] else {
            continue;
        };

        for rule in grammar.rules_of(nonterm) {
            if form.len() - 1 + rule.rhs().len() > max_len {
                continue;
            }

            let next: Vec<Symbol> = form[..pos]
                .iter()
                .chain(rule.rhs())
                .chain(&form[pos + 1..])
                .cloned()
                .collect();

            if seen.insert(next.clone()) {
                queue.push(next);
            }
        }
    }

    words
}

fn all_strings(max_len: usize) -> Vec<String> {
    (1..=max_len)
        .flat_map(|len| {
            std::iter::repeat(["a", "b"])
                .take(len)
                .multi_cartesian_product()
                .map(|chars| chars.concat())
        })
        .collect()
}

fn rhs_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(&SYMBOLS[..]), 1..=3)
}

/// Small random grammars over S, A, B and a, b with at least one rule for S.
fn grammar_strategy() -> impl Strategy<Value = String> {
    (rhs_strategy(), prop::collection::vec((prop::sample::select(&SYMBOLS[..3]), rhs_strategy()), 0..6)).prop_map(
        |(start, rules)| {
            let mut source = String::from("NTLIST := S A B\nTLIST := a b\n");
            source.push_str(&format!("S -> {}\n", start.join(" ")));

            for (lhs, rhs) in rules {
                source.push_str(&format!("{} -> {}\n", lhs, rhs.join(" ")));
            }

            source
        },
    )
}

fn load(source: &str) -> ContextFreeGrammar {
    ContextFreeGrammar::builder()
        .text_source(source).unwrap()
        .entrypoint("S")
        .build().unwrap()
}

#[test]
fn test_fixture_grammars() {
    for path in ["test-data/grammars/arithmetic.txt", "test-data/grammars/palindromes.txt", "test-data/grammars/dyck.txt"] {
        let grammar = ContextFreeGrammar::builder()
            .text_grammar(path).unwrap()
            .normalize(true)
            .build().unwrap();
        assert!(grammar.is_in_cnf(), "{} is not in CNF", path);
        assert!(!grammar.rules().is_empty(), "{} has an empty language", path);
    }
}

#[test]
fn test_derive_words() {
    let grammar = load("S -> a S b\nS -> a b");
    let words: Vec<String> = derive_words(&grammar, 6).into_iter().collect();
    assert_eq!(words, vec!["aaabbb", "aabb", "ab"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_cnf_preserves_language(source in grammar_strategy()) {
        let original = load(&source);
        let expected = derive_words(&original, MAX_LEN);

        let mut cnf = original.clone();
        cnf.convert_to_cnf();
        prop_assert!(cnf.is_in_cnf());

        let cyk = CykRecognizer::new(&cnf).unwrap();

        for word in all_strings(MAX_LEN) {
            prop_assert_eq!(cyk.parse(&word), expected.contains(&word), "word {:?} in grammar\n{}", word, source);
        }
    }

    #[test]
    fn prop_cnf_is_idempotent(source in grammar_strategy()) {
        let mut cnf = load(&source);
        cnf.convert_to_cnf();
        let once = cnf.clone();
        cnf.convert_to_cnf();

        prop_assert_eq!(cnf.rules().len(), once.rules().len());
        prop_assert_eq!(cnf.nonterminals(), once.nonterminals());
    }

    #[test]
    fn prop_bigrams_cover_words(source in grammar_strategy()) {
        let original = load(&source);
        let mut cnf = original.clone();
        cnf.convert_to_cnf();

        let relations = Relations::compute(&cnf);
        let bigrams = BigramMap::build(&cnf, &relations);

        for word in derive_words(&original, MAX_LEN) {
            let terms: Vec<Terminal> = word.chars().map(Terminal::from_char).collect();

            for (t1, t2) in terms.iter().tuple_windows() {
                prop_assert!(bigrams.contains(t1, t2), "{}{} missing for {:?}", t1.content(), t2.content(), word);
            }

            let first = relations.first(cnf.entrypoint()).unwrap();
            let last = relations.last(cnf.entrypoint()).unwrap();
            prop_assert!(first.contains(&terms[0]));
            prop_assert!(last.contains(&terms[terms.len() - 1]));
        }
    }
}
