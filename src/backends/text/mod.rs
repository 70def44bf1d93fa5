//! Write test sets as plain text, one `<question> <0|1>` line per test.

mod writer;

pub use writer::TextWriter;
