//! Snapshot collector for Linux `/proc`.
//!
//! Every read goes through the [`FileSystem`] trait, so the same collectors run
//! against the real `/proc` on Linux and against [`MockFs`] fixtures elsewhere.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  ProcessCollector   │   │     SystemCollector         │  │
//! │  │  - /proc/[pid]/     │   │  - /proc/loadavg            │  │
//! │  │    cmdline          │   │  - /proc/meminfo            │  │
//! │  └──────────┬──────────┘   │  - /proc/stat               │  │
//! │             │              │  - /proc/diskstats          │  │
//! │             │              │  - /proc/sys/kernel/*       │  │
//! │             │              └──────────────┬──────────────┘  │
//! │             └──────────────┬──────────────┘                 │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use procsnap::collector::{Collector, RealFs};
//!
//! let collector = Collector::new(RealFs::new(), "/proc");
//! let load = collector.collect_loadavg().unwrap();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use procsnap::collector::{Collector, MockFs, SnapshotKind};
//!
//! let collector = Collector::new(MockFs::typical_system(), "/proc");
//! let snapshot = collector.collect(SnapshotKind::DiskStats).unwrap();
//! assert_eq!(snapshot.record_count(), 3);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::{Collector, CollectorTiming, Snapshot, SnapshotKind, SnapshotSet};
pub use mock::MockFs;
pub use procfs::{
    CollectError, CpuStat, DiskStats, DiskStatsPolicy, DiskStatsSchema, LoadAvg, MemInfo,
    OsVersion, ParseError, ProcessInfo,
};
pub use traits::{FileSystem, RealFs};
