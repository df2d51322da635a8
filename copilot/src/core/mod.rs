//! Deterministic, pure logic for the generation pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod mock;
pub mod payload;
pub mod prompt;
pub mod request;
pub mod types;
pub mod validator;
