use std::io::Write;

use serde::ser::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer};

use crate::{backends::TestWriter, error::Error, generator::Test};

/// Serializes tests with serde_json using four spaces of indentation.
pub struct JsonWriter {}

impl JsonWriter {
    /// Create a new JsonWriter.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {}
    }
}

impl TestWriter for JsonWriter {
    fn write_tests<W: Write>(&self, tests: &[Test], stream: &mut W) -> Result<(), Error> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = Serializer::with_formatter(&mut *stream, formatter);
        tests.serialize(&mut ser)?;
        writeln!(stream)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer() {
        let tests = vec![
            Test { question: "(1)".to_string(), answer: true },
            Test { question: "1+".to_string(), answer: false },
        ];

        let mut buf = Vec::new();
        JsonWriter::new().write_tests(&tests, &mut buf).unwrap();

        let parsed: Vec<Test> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, tests);
        assert!(String::from_utf8(buf).unwrap().contains("    {\n        \"question\": \"(1)\""));
    }

    #[test]
    fn test_empty() {
        let mut buf = Vec::new();
        JsonWriter::new().write_tests(&[], &mut buf).unwrap();
        assert_eq!(buf, b"[]\n");
    }
}
