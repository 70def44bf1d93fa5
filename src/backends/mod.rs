//! Output formats for generated test sets.
//!
//! Every backend implements [`TestWriter`]:
//! ```
//! use grammar_testgen::{backends::{TestWriter, text::TextWriter}, generator::Test};
//!
//! let tests = [Test { question: "ab".to_string(), answer: true }];
//! let mut buf = Vec::new();
//! TextWriter::new().write_tests(&tests, &mut buf).unwrap();
//! assert_eq!(buf, b"ab 1\n");
//! ```

pub mod json;
pub mod text;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{error::Error, generator::Test};

/// Serializes a test set into a stream.
pub trait TestWriter {
    /// Write all `tests` into `stream`.
    fn write_tests<W: Write>(&self, tests: &[Test], stream: &mut W) -> Result<(), Error>;
}

/// Create or truncate the file at `path` and write `tests` into it with `writer`.
pub fn write_to_file<T, P>(writer: &T, tests: &[Test], path: P) -> Result<(), Error>
where
    T: TestWriter,
    P: AsRef<Path>,
{
    let mut stream = BufWriter::new(File::create(path)?);
    writer.write_tests(tests, &mut stream)?;
    stream.flush()?;
    Ok(())
}
