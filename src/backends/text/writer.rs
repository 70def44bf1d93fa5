use std::io::Write;

use crate::{backends::TestWriter, error::Error, generator::Test};

/// Writes one line per test: the question, a space and `1` for members or `0` otherwise.
pub struct TextWriter {}

impl TextWriter {
    /// Create a new TextWriter.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {}
    }
}

impl TestWriter for TextWriter {
    fn write_tests<W: Write>(&self, tests: &[Test], stream: &mut W) -> Result<(), Error> {
        for test in tests {
            writeln!(stream, "{} {}", test.question, u8::from(test.answer))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::write_to_file;

    #[test]
    fn test_writer() {
        let tests = vec![
            Test { question: "".to_string(), answer: false },
            Test { question: "ab".to_string(), answer: true },
            Test { question: "ba".to_string(), answer: false },
        ];

        let mut buf = Vec::new();
        TextWriter::new().write_tests(&tests, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), " 0\nab 1\nba 0\n");
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join(format!("testgen-text-{}.txt", std::process::id()));
        let tests = vec![Test { question: "a".to_string(), answer: true }];

        write_to_file(&TextWriter::new(), &tests, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a 1\n");
        std::fs::remove_file(&path).unwrap();
    }
}
