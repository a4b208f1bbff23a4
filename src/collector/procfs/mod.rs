//! Collectors for Linux `/proc` filesystem.
//!
//! This module provides parsers and collectors for reading system and process
//! information from the `/proc` virtual filesystem.

pub mod error;
pub mod parser;
pub mod process;
pub mod system;

pub use error::CollectError;
pub use parser::{
    CpuStat, DiskStats, DiskStatsPolicy, DiskStatsSchema, LoadAvg, MemInfo, ParseError,
};
pub use process::{DEFAULT_CMDLINE_LIMIT, ProcessCollector, ProcessInfo};
pub use system::{OsVersion, SystemCollector};
