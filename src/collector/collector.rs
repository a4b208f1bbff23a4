//! Main collector that combines process and system collectors.
//!
//! The `Collector` struct is the single entry point consumers use: pick a
//! source, get back either its records or a [`CollectError`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collector::procfs::{
    CollectError, CpuStat, DiskStats, DiskStatsPolicy, LoadAvg, MemInfo, OsVersion,
    ProcessCollector, ProcessInfo, SystemCollector,
};
use crate::collector::traits::FileSystem;

/// Source a snapshot is taken from.
///
/// Serialized with the same names as [`SnapshotKind::as_str`], which are also
/// the CLI subcommand names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotKind {
    #[serde(rename = "loadavg")]
    LoadAvg,
    #[serde(rename = "meminfo")]
    MemInfo,
    #[serde(rename = "stat")]
    CpuStats,
    #[serde(rename = "diskstats")]
    DiskStats,
    #[serde(rename = "pid")]
    Processes,
    #[serde(rename = "os-version")]
    OsVersion,
}

impl SnapshotKind {
    /// Every kind, in the order `collect_all` reads them.
    pub const ALL: [SnapshotKind; 6] = [
        SnapshotKind::LoadAvg,
        SnapshotKind::MemInfo,
        SnapshotKind::CpuStats,
        SnapshotKind::DiskStats,
        SnapshotKind::Processes,
        SnapshotKind::OsVersion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotKind::LoadAvg => "loadavg",
            SnapshotKind::MemInfo => "meminfo",
            SnapshotKind::CpuStats => "stat",
            SnapshotKind::DiskStats => "diskstats",
            SnapshotKind::Processes => "pid",
            SnapshotKind::OsVersion => "os-version",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SnapshotKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown snapshot kind '{}'", s))
    }
}

/// Records read from one source at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records")]
pub enum Snapshot {
    /// Source: `/proc/loadavg`
    #[serde(rename = "loadavg")]
    LoadAvg(LoadAvg),
    /// Source: `/proc/meminfo`
    #[serde(rename = "meminfo")]
    MemInfo(MemInfo),
    /// Source: `/proc/stat` (per-CPU lines only)
    #[serde(rename = "stat")]
    CpuStats(Vec<CpuStat>),
    /// Source: `/proc/diskstats`
    #[serde(rename = "diskstats")]
    DiskStats(Vec<DiskStats>),
    /// Source: `/proc/[pid]/cmdline`
    #[serde(rename = "pid")]
    Processes(Vec<ProcessInfo>),
    /// Source: `/proc/sys/kernel/{ostype,osrelease}`
    #[serde(rename = "os-version")]
    OsVersion(OsVersion),
}

impl Snapshot {
    pub fn kind(&self) -> SnapshotKind {
        match self {
            Snapshot::LoadAvg(_) => SnapshotKind::LoadAvg,
            Snapshot::MemInfo(_) => SnapshotKind::MemInfo,
            Snapshot::CpuStats(_) => SnapshotKind::CpuStats,
            Snapshot::DiskStats(_) => SnapshotKind::DiskStats,
            Snapshot::Processes(_) => SnapshotKind::Processes,
            Snapshot::OsVersion(_) => SnapshotKind::OsVersion,
        }
    }

    /// Number of records in the snapshot (1 for single-record sources).
    pub fn record_count(&self) -> usize {
        match self {
            Snapshot::CpuStats(v) => v.len(),
            Snapshot::DiskStats(v) => v.len(),
            Snapshot::Processes(v) => v.len(),
            Snapshot::LoadAvg(_) | Snapshot::MemInfo(_) | Snapshot::OsVersion(_) => 1,
        }
    }
}

/// Snapshots of every source taken in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSet {
    pub timestamp: DateTime<Utc>,
    pub snapshots: Vec<Snapshot>,
}

/// Timing information for each source read by `collect_all`.
///
/// Used for debugging and performance monitoring.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total collection time.
    pub total: Duration,
    pub loadavg: Duration,
    pub meminfo: Duration,
    pub cpu_stats: Duration,
    pub diskstats: Duration,
    pub processes: Duration,
    pub os_version: Duration,
}

impl CollectorTiming {
    fn slot_mut(&mut self, kind: SnapshotKind) -> &mut Duration {
        match kind {
            SnapshotKind::LoadAvg => &mut self.loadavg,
            SnapshotKind::MemInfo => &mut self.meminfo,
            SnapshotKind::CpuStats => &mut self.cpu_stats,
            SnapshotKind::DiskStats => &mut self.diskstats,
            SnapshotKind::Processes => &mut self.processes,
            SnapshotKind::OsVersion => &mut self.os_version,
        }
    }
}

/// Main collector that reads `/proc` sources on request.
///
/// Holds no per-read state: every call opens and reads its own source.
pub struct Collector<F: FileSystem + Clone> {
    process_collector: ProcessCollector<F>,
    system_collector: SystemCollector<F>,
    /// Timing information from the last collect_all call.
    last_timing: Option<CollectorTiming>,
}

impl<F: FileSystem + Clone> Collector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        let proc_path = proc_path.into();
        Self {
            process_collector: ProcessCollector::new(fs.clone(), &proc_path),
            system_collector: SystemCollector::new(fs, &proc_path),
            last_timing: None,
        }
    }

    /// Sets the maximum number of bytes kept from each process command line.
    pub fn with_cmdline_limit(mut self, limit: usize) -> Self {
        self.process_collector.set_cmdline_limit(limit);
        self
    }

    /// Sets how `/proc/diskstats` lines from older kernels are handled.
    pub fn with_diskstats_policy(mut self, policy: DiskStatsPolicy) -> Self {
        self.system_collector.set_diskstats_policy(policy);
        self
    }

    pub fn collect_loadavg(&self) -> Result<LoadAvg, CollectError> {
        self.system_collector.collect_loadavg()
    }

    pub fn collect_meminfo(&self) -> Result<MemInfo, CollectError> {
        self.system_collector.collect_meminfo()
    }

    pub fn collect_cpu_stats(&self) -> Result<Vec<CpuStat>, CollectError> {
        self.system_collector.collect_cpu_stats()
    }

    pub fn collect_diskstats(&self) -> Result<Vec<DiskStats>, CollectError> {
        self.system_collector.collect_diskstats()
    }

    /// Only a failure to list the proc directory is reported; processes that
    /// vanish mid-scan are skipped.
    pub fn collect_processes(&self) -> Result<Vec<ProcessInfo>, CollectError> {
        self.process_collector.collect_all_processes()
    }

    pub fn collect_os_version(&self) -> Result<OsVersion, CollectError> {
        self.system_collector.collect_os_version()
    }

    /// Returns the raw text of `/proc/<name>`.
    pub fn read_proc_file(&self, name: &str) -> Result<String, CollectError> {
        self.system_collector.read_proc_file(name)
    }

    /// Collects a single source.
    pub fn collect(&self, kind: SnapshotKind) -> Result<Snapshot, CollectError> {
        let snapshot = match kind {
            SnapshotKind::LoadAvg => Snapshot::LoadAvg(self.collect_loadavg()?),
            SnapshotKind::MemInfo => Snapshot::MemInfo(self.collect_meminfo()?),
            SnapshotKind::CpuStats => Snapshot::CpuStats(self.collect_cpu_stats()?),
            SnapshotKind::DiskStats => Snapshot::DiskStats(self.collect_diskstats()?),
            SnapshotKind::Processes => Snapshot::Processes(self.collect_processes()?),
            SnapshotKind::OsVersion => Snapshot::OsVersion(self.collect_os_version()?),
        };
        Ok(snapshot)
    }

    /// Collects every source. The first failing source aborts the pass.
    pub fn collect_all(&mut self) -> Result<SnapshotSet, CollectError> {
        let start = Instant::now();
        let timestamp = Utc::now();
        let mut timing = CollectorTiming::default();
        let mut snapshots = Vec::with_capacity(SnapshotKind::ALL.len());

        for kind in SnapshotKind::ALL {
            let t = Instant::now();
            let snapshot = self.collect(kind)?;
            *timing.slot_mut(kind) = t.elapsed();
            snapshots.push(snapshot);
        }

        timing.total = start.elapsed();
        debug!(total = ?timing.total, "collected all sources");
        self.last_timing = Some(timing);

        Ok(SnapshotSet {
            timestamp,
            snapshots,
        })
    }

    /// Returns timing information from the last `collect_all` call.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    pub fn diskstats_policy(&self) -> DiskStatsPolicy {
        self.system_collector.diskstats_policy()
    }

    pub fn cmdline_limit(&self) -> usize {
        self.process_collector.cmdline_limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_collect_each_kind() {
        let collector = Collector::new(MockFs::typical_system(), "/proc");

        for kind in SnapshotKind::ALL {
            let snapshot = collector.collect(kind).unwrap();
            assert_eq!(snapshot.kind(), kind);
        }

        let disks = collector.collect(SnapshotKind::DiskStats).unwrap();
        assert_eq!(disks.record_count(), 3);
        let procs = collector.collect(SnapshotKind::Processes).unwrap();
        assert_eq!(procs.record_count(), 3);
    }

    #[test]
    fn test_collect_is_idempotent() {
        let collector = Collector::new(MockFs::typical_system(), "/proc");

        for kind in SnapshotKind::ALL {
            assert_eq!(
                collector.collect(kind).unwrap(),
                collector.collect(kind).unwrap()
            );
        }
    }

    #[test]
    fn test_collect_all() {
        let mut collector = Collector::new(MockFs::typical_system(), "/proc");
        assert!(collector.last_timing().is_none());

        let set = collector.collect_all().unwrap();
        let kinds: Vec<SnapshotKind> = set.snapshots.iter().map(Snapshot::kind).collect();
        assert_eq!(kinds, SnapshotKind::ALL.to_vec());

        let timing = collector.last_timing().unwrap();
        assert!(timing.total >= timing.diskstats);
    }

    #[test]
    fn test_collect_all_fails_fast() {
        let mut collector = Collector::new(MockFs::corrupt_sources(), "/proc");
        let err = collector.collect_all().unwrap_err();

        // loadavg is read first
        assert!(err.is_format());
        assert!(collector.last_timing().is_none());
    }

    #[test]
    fn test_builders() {
        let collector = Collector::new(MockFs::legacy_kernel(), "/proc")
            .with_cmdline_limit(64)
            .with_diskstats_policy(DiskStatsPolicy::Strict);

        assert_eq!(collector.cmdline_limit(), 64);
        assert_eq!(collector.diskstats_policy(), DiskStatsPolicy::Strict);
        assert!(collector.collect_diskstats().unwrap_err().is_format());
    }

    #[test]
    fn test_concurrent_callers() {
        let collector = Arc::new(Collector::new(MockFs::typical_system(), "/proc"));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let collector = Arc::clone(&collector);
                thread::spawn(move || collector.collect_cpu_stats().unwrap().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 4);
        }
    }

    #[test]
    fn test_snapshot_kind_from_str() {
        for kind in SnapshotKind::ALL {
            assert_eq!(kind.to_string().parse::<SnapshotKind>().unwrap(), kind);
        }
        assert!("bogus".parse::<SnapshotKind>().is_err());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let collector = Collector::new(MockFs::typical_system(), "/proc");
        let snapshot = collector.collect(SnapshotKind::LoadAvg).unwrap();

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["kind"], "loadavg");
        assert_eq!(json["records"]["last_pid"], 1234);
    }

    #[test]
    fn test_kind_names_agree() {
        let collector = Collector::new(MockFs::typical_system(), "/proc");

        for kind in SnapshotKind::ALL {
            let name = kind.to_string();
            assert_eq!(serde_json::to_value(kind).unwrap(), name.as_str());

            let snapshot = serde_json::to_value(collector.collect(kind).unwrap()).unwrap();
            assert_eq!(snapshot["kind"], name.as_str());
        }
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let collector = Collector::new(MockFs::typical_system(), "/proc");

        for kind in SnapshotKind::ALL {
            let snapshot = collector.collect(kind).unwrap();
            let json = serde_json::to_string(&snapshot).unwrap();
            let back: Snapshot = serde_json::from_str(&json).unwrap();
            assert_eq!(back, snapshot, "{kind}");
        }
    }
}
