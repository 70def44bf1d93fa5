//! Write test sets as a pretty printed JSON array of `{"question": ..., "answer": ...}` objects.

mod writer;

pub use writer::JsonWriter;
