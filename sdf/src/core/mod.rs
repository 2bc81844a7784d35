//! Deterministic, pure logic shared by the profile commands.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod arity;
pub mod engine_args;
pub mod trace_line;
