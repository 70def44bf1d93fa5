use ahash::AHashSet;
use proptest::prelude::*;

use crate::{
    generator::{GeneratorConfig, TestGenerator},
    grammar::ContextFreeGrammar,
};

fn dyck(seed: u64) -> TestGenerator {
    let grammar = ContextFreeGrammar::builder()
        .text_grammar("test-data/grammars/dyck.txt").unwrap()
        .build().unwrap();
    let config = GeneratorConfig {
        seed: Some(seed),
        workers: 2,
        ..Default::default()
    };
    TestGenerator::new(grammar, config).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_generate_counts(count in 1usize..16, percentage in 0u32..=100, seed in any::<u64>()) {
        let generator = dyck(seed);
        let tests = generator.generate(count, percentage).unwrap();

        prop_assert_eq!(tests.len(), count);

        let positives = tests.iter().filter(|test| test.answer).count();
        prop_assert_eq!(positives, (count * percentage as usize + 50) / 100);

        let unique: AHashSet<&str> = tests.iter().map(|test| test.question.as_str()).collect();
        prop_assert_eq!(unique.len(), count);

        for pair in tests.windows(2) {
            prop_assert!(pair[0].question < pair[1].question);
        }

        for test in &tests {
            prop_assert_eq!(generator.recognizer().parse(&test.question), test.answer);
        }
    }
}
