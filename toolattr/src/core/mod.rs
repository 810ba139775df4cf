//! Deterministic, pure logic shared by the attribute layer.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod path;
pub mod string_list;
pub mod value;
