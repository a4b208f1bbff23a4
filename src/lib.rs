//! procsnap - point-in-time snapshots of Linux `/proc` metrics.
//!
//! Provides:
//! - `collector`: readers for `/proc/loadavg`, `/proc/meminfo`, `/proc/stat`,
//!   `/proc/diskstats` and the process table, behind a `FileSystem` abstraction
//!   so they can be driven by a mock `/proc` in tests.

pub mod collector;
