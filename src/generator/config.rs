use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::Path;

use json_comments::{CommentSettings, StripComments};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GenerateError};

/// Tunables of the [`TestGenerator`](super::TestGenerator).
///
/// All probabilities are percentages in `0..=100`.
/// Config files may leave out any field, the defaults fill the rest:
/// ```
/// use grammar_testgen::generator::GeneratorConfig;
///
/// let config = GeneratorConfig::from_json_str(r#"{
///     // only override the length
///     "max_test_length": 8
/// }"#).unwrap();
/// assert_eq!(config.max_test_length, 8);
/// assert!(config.necessary);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Upper bound on the length of a synthesized string.
    pub max_test_length: usize,
    /// Chance that a negative test starts anywhere in the alphabet instead of FIRST(start).
    pub start_elsewhere_probability: u32,
    /// Chance per step that a negative test jumps to a random terminal.
    pub random_jump_probability: u32,
    /// Chance per step that a negative test stops.
    pub early_stop_probability: u32,
    /// Chance that a positive test stops on a terminal in LAST(start).
    pub final_state_stop_probability: u32,
    /// Hard mode: the requested share of positives refers to the recognizer's verdict,
    /// not to the synthesis target.
    pub necessary: bool,
    /// Accept the empty string as a test.
    pub allow_empty_tests: bool,
    /// Random choices draw from `a..=z` instead of the grammar's terminals.
    pub use_full_alphabet: bool,
    /// Number of worker threads, 0 means available parallelism.
    pub workers: usize,
    /// Synthesis attempts allowed per requested test before giving up.
    pub max_attempts_per_test: usize,
    /// Seed for reproducible runs. Worker `i` uses `seed + i`.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_test_length: 100,
            start_elsewhere_probability: 10,
            random_jump_probability: 10,
            early_stop_probability: 10,
            final_state_stop_probability: 50,
            necessary: true,
            allow_empty_tests: false,
            use_full_alphabet: false,
            workers: 0,
            max_attempts_per_test: 1000,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Read a config from a JSON file. C-style comments are allowed.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let reader = StripComments::with_settings(CommentSettings::c_style(), BufReader::new(file));

        serde_json::from_reader(reader).map_err(|e| ConfigError::Json(path.to_path_buf(), e))
    }

    /// Read a config from a JSON string. C-style comments are allowed.
    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        let reader = StripComments::with_settings(CommentSettings::c_style(), source.as_bytes());
        serde_json::from_reader(reader)
    }

    /// Reject probabilities above 100.
    pub fn validate(&self) -> Result<(), GenerateError> {
        for probability in [
            self.start_elsewhere_probability,
            self.random_jump_probability,
            self.early_stop_probability,
            self.final_state_stop_probability,
        ] {
            if probability > 100 {
                return Err(GenerateError::InvalidPercentage(probability));
            }
        }

        Ok(())
    }

    /// The number of threads to spawn for `count` tests.
    pub fn worker_count(&self, count: usize) -> usize {
        let workers = match self.workers {
            0 => std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            n => n,
        };

        workers.min(count).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.max_test_length, 100);
        assert_eq!(config.final_state_stop_probability, 50);
        assert!(config.necessary);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = GeneratorConfig::from_json_str(r#"{
            /* reproducible */
            "seed": 3,
            "workers": 2 // two threads
        }"#).unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.workers, 2);
        assert_eq!(config.early_stop_probability, 10);
    }

    #[test]
    fn test_invalid_probability() {
        let config = GeneratorConfig {
            random_jump_probability: 101,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(GenerateError::InvalidPercentage(101)));
    }

    #[test]
    fn test_worker_count() {
        let config = GeneratorConfig {
            workers: 8,
            ..Default::default()
        };
        assert_eq!(config.worker_count(3), 3);
        assert_eq!(config.worker_count(0), 1);
        assert!(GeneratorConfig::default().worker_count(100) >= 1);
    }

    #[test]
    fn test_config_file() {
        let config = GeneratorConfig::from_json_file("test-data/config.json").unwrap();
        assert_eq!(config.seed, Some(1));
        assert_eq!(config.max_test_length, 20);
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_missing_file() {
        let err = GeneratorConfig::from_json_file("test-data/does-not-exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }
}
