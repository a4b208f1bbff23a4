//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built `/proc` scenarios (typical,
//! legacy kernel, racing process table, corrupt sources) for exercising the
//! collectors without a Linux `/proc`.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
