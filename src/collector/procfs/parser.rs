//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string inputs.
//!
//! Every parser either returns a fully populated value or a [`ParseError`]
//! naming the offending line or key. There are no partial results: a single
//! malformed line fails the whole source.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}: \"{context}\"")]
pub struct ParseError {
    pub message: String,
    /// Raw line, key label or entry name that failed validation.
    pub context: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            context: context.into(),
        }
    }
}

/// Parses a single whitespace-delimited token, naming the field on failure.
fn parse_token<T: FromStr>(token: Option<&str>, name: &str, line: &str) -> Result<T, ParseError> {
    let token = token.ok_or_else(|| ParseError::new(format!("missing {}", name), line.trim()))?;
    token
        .parse()
        .map_err(|_| ParseError::new(format!("invalid {}", name), line.trim()))
}

/// Parses every token as `u64` into `out`, returning how many were written.
fn parse_counters<'a>(
    tokens: impl Iterator<Item = &'a str>,
    out: &mut [u64],
    line: &str,
) -> Result<usize, ParseError> {
    let mut filled = 0;
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = token.parse().map_err(|_| {
            ParseError::new(
                format!("invalid counter at field {}", filled + 1),
                line.trim(),
            )
        })?;
        filled += 1;
    }
    Ok(filled)
}

/// Decodes raw source content, naming the first line that is not valid UTF-8.
pub fn decode_utf8(bytes: Vec<u8>) -> Result<String, ParseError> {
    String::from_utf8(bytes).map_err(|e| {
        let bytes = e.as_bytes();
        let bad = e.utf8_error().valid_up_to();
        let start = bytes[..bad]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        let end = bytes[bad..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |i| bad + i);
        ParseError::new(
            "invalid UTF-8",
            String::from_utf8_lossy(&bytes[start..end]).trim(),
        )
    })
}

// ============ Load Average Parser ============

/// Parsed data from `/proc/loadavg`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAvg {
    pub loadavg1: f64,
    pub loadavg5: f64,
    pub loadavg15: f64,
    /// Currently runnable scheduling entities.
    pub current_processes: u32,
    /// Scheduling entities that currently exist.
    pub total_processes: u32,
    /// Most recently allocated PID.
    pub last_pid: u32,
}

/// Parses `/proc/loadavg` content.
///
/// Format: `load1 load5 load15 running/total last_pid`. All six values are
/// required; trailing tokens are ignored.
pub fn parse_loadavg(content: &str) -> Result<LoadAvg, ParseError> {
    let line = content.lines().next().unwrap_or("");
    let mut parts = line.split_whitespace();

    let loadavg1 = parse_token(parts.next(), "load1", line)?;
    let loadavg5 = parse_token(parts.next(), "load5", line)?;
    let loadavg15 = parse_token(parts.next(), "load15", line)?;

    // Format: running/total
    let (running, total) = parts
        .next()
        .and_then(|s| s.split_once('/'))
        .ok_or_else(|| ParseError::new("missing running/total pair", line.trim()))?;
    let current_processes = parse_token(Some(running), "running count", line)?;
    let total_processes = parse_token(Some(total), "total count", line)?;

    let last_pid = parse_token(parts.next(), "last pid", line)?;

    Ok(LoadAvg {
        loadavg1,
        loadavg5,
        loadavg15,
        current_processes,
        total_processes,
        last_pid,
    })
}

// ============ Memory Info Parser ============

macro_rules! meminfo_fields {
    ($($(#[$meta:meta])* $field:ident => $label:literal,)+) => {
        /// Parsed data from `/proc/meminfo`.
        ///
        /// Values are in the unit the kernel reports (kB for sizes, pages for
        /// `HugePages_*`). Keys missing from the source stay at zero; use
        /// [`MemInfo::observed`] to tell a missing key from a zero value.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct MemInfo {
            $($(#[$meta])* pub $field: u64,)+
            /// Labels present in the source, serialized so "absent" survives a round trip.
            #[serde(default, with = "observed_labels")]
            observed: BTreeSet<&'static str>,
        }

        impl MemInfo {
            /// Labels recognised in `/proc/meminfo`, trailing colon included.
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            fn slot_mut(&mut self, label: &str) -> Option<(&'static str, &mut u64)> {
                match label {
                    $($label => Some(($label, &mut self.$field)),)+
                    _ => None,
                }
            }

            /// Returns the value stored for a label such as `"MemTotal:"`.
            pub fn get(&self, label: &str) -> Option<u64> {
                match label {
                    $($label => Some(self.$field),)+
                    _ => None,
                }
            }
        }
    };
}

meminfo_fields! {
    mem_total => "MemTotal:",
    mem_free => "MemFree:",
    mem_available => "MemAvailable:",
    buffers => "Buffers:",
    cached => "Cached:",
    swap_cached => "SwapCached:",
    active => "Active:",
    inactive => "Inactive:",
    active_anon => "Active(anon):",
    inactive_anon => "Inactive(anon):",
    active_file => "Active(file):",
    inactive_file => "Inactive(file):",
    unevictable => "Unevictable:",
    mlocked => "Mlocked:",
    swap_total => "SwapTotal:",
    swap_free => "SwapFree:",
    /// Memory waiting to be written back to disk.
    dirty => "Dirty:",
    writeback => "Writeback:",
    anon_pages => "AnonPages:",
    mapped => "Mapped:",
    shmem => "Shmem:",
    k_reclaimable => "KReclaimable:",
    slab => "Slab:",
    s_reclaimable => "SReclaimable:",
    s_unreclaim => "SUnreclaim:",
    kernel_stack => "KernelStack:",
    page_tables => "PageTables:",
    nfs_unstable => "NFS_Unstable:",
    bounce => "Bounce:",
    writeback_tmp => "WritebackTmp:",
    commit_limit => "CommitLimit:",
    committed_as => "Committed_AS:",
    vmalloc_total => "VmallocTotal:",
    vmalloc_used => "VmallocUsed:",
    vmalloc_chunk => "VmallocChunk:",
    percpu => "Percpu:",
    hardware_corrupted => "HardwareCorrupted:",
    anon_huge_pages => "AnonHugePages:",
    shmem_huge_pages => "ShmemHugePages:",
    shmem_pmd_mapped => "ShmemPmdMapped:",
    file_huge_pages => "FileHugePages:",
    file_pmd_mapped => "FilePmdMapped:",
    cma_total => "CmaTotal:",
    cma_free => "CmaFree:",
    /// Size of the huge page pool, in pages.
    huge_pages_total => "HugePages_Total:",
    huge_pages_free => "HugePages_Free:",
    huge_pages_rsvd => "HugePages_Rsvd:",
    huge_pages_surp => "HugePages_Surp:",
    hugepagesize => "Hugepagesize:",
    hugetlb => "Hugetlb:",
}

impl MemInfo {
    /// Returns true if the label was present in the parsed source.
    pub fn observed(&self, label: &str) -> bool {
        self.observed.contains(label)
    }

    /// Labels that were present in the parsed source, in sorted order.
    pub fn observed_labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.observed.iter().copied()
    }
}

/// Serializes the observed set as label strings, mapping them back onto the
/// static label table when deserializing.
mod observed_labels {
    use std::collections::BTreeSet;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::MemInfo;

    pub fn serialize<S: Serializer>(
        labels: &BTreeSet<&'static str>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        labels.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<&'static str>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|label| {
                MemInfo::LABELS
                    .iter()
                    .copied()
                    .find(|known| *known == label.as_str())
                    .ok_or_else(|| D::Error::custom(format!("unknown meminfo label {:?}", label)))
            })
            .collect()
    }
}

/// Parses `/proc/meminfo` content.
///
/// Format is `Label:   value [kB]`, one per line. Lines with an unknown label
/// are skipped so newer kernels keep working; a known label with a missing or
/// non-numeric value is an error naming that label.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();

    for line in content.lines() {
        let Some(colon) = line.find(':') else {
            continue;
        };
        let (label, rest) = line.split_at(colon + 1);
        let Some((key, slot)) = info.slot_mut(label) else {
            continue;
        };

        *slot = rest
            .split_whitespace()
            .next()
            .ok_or_else(|| ParseError::new("missing value for key", key))?
            .parse()
            .map_err(|_| ParseError::new("invalid value for key", key))?;
        info.observed.insert(key);
    }

    Ok(info)
}

// ============ CPU Stat Parser ============

/// Single per-CPU line from `/proc/stat`, in clock ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuStat {
    /// Line label, e.g. `cpu0`.
    pub cpu: String,
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuStat {
    /// Numeric CPU index taken from the label.
    pub fn cpu_index(&self) -> Option<u32> {
        self.cpu.strip_prefix("cpu")?.parse().ok()
    }
}

/// Number of tick counters every per-CPU line must carry.
pub const CPU_STAT_COUNTERS: usize = 8;

/// Returns true for `cpuN` lines, false for the aggregate `cpu` line and
/// everything else in `/proc/stat`.
pub fn is_per_cpu_line(line: &str) -> bool {
    line.strip_prefix("cpu")
        .and_then(|rest| rest.bytes().next())
        .is_some_and(|b| b.is_ascii_digit())
}

/// Parses the per-CPU lines of `/proc/stat`, in file order.
///
/// Format: `cpuN user nice system idle iowait irq softirq steal [guest guest_nice]`.
/// `guest` and `guest_nice` are accepted but not returned.
pub fn parse_cpu_stat(content: &str) -> Result<Vec<CpuStat>, ParseError> {
    let mut cpus = Vec::new();

    for line in content.lines().filter(|l| is_per_cpu_line(l)) {
        let mut parts = line.split_whitespace();
        let cpu = parts.next().unwrap_or_default().to_string();

        let mut values = [0u64; CPU_STAT_COUNTERS];
        let filled = parse_counters(parts, &mut values, line)?;
        if filled < CPU_STAT_COUNTERS {
            return Err(ParseError::new(
                format!(
                    "not enough fields in cpu line: expected {}+, got {}",
                    CPU_STAT_COUNTERS, filled
                ),
                line.trim(),
            ));
        }

        let [user, nice, system, idle, iowait, irq, softirq, steal] = values;
        cpus.push(CpuStat {
            cpu,
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
        });
    }

    Ok(cpus)
}

// ============ Disk Stats Parser ============

/// Layout generation of a `/proc/diskstats` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiskStatsSchema {
    /// 14 fields, kernels before 4.18.
    Base,
    /// 18 fields, discard counters added in 4.18.
    Discard,
    /// 20 fields, flush counters added in 5.5.
    #[default]
    Flush,
}

impl DiskStatsSchema {
    /// Total number of whitespace-separated fields in a line of this layout.
    pub fn field_count(self) -> usize {
        match self {
            DiskStatsSchema::Base => 14,
            DiskStatsSchema::Discard => 18,
            DiskStatsSchema::Flush => 20,
        }
    }

    fn from_field_count(n: usize) -> Option<Self> {
        match n {
            14 => Some(DiskStatsSchema::Base),
            18 => Some(DiskStatsSchema::Discard),
            n if n >= 20 => Some(DiskStatsSchema::Flush),
            _ => None,
        }
    }
}

/// How to treat `/proc/diskstats` lines from older kernels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiskStatsPolicy {
    /// Accept 14, 18 or 20+ fields and zero-fill the missing counters.
    #[default]
    Compatible,
    /// Require all 20 fields on every line.
    Strict,
}

/// Parsed data from `/proc/diskstats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskStats {
    /// Block device major number.
    pub major: u32,
    /// Block device minor number.
    pub minor: u32,
    /// Device name (sda, nvme0n1, etc.)
    pub device: String,
    /// Number of reads completed
    pub reads: u64,
    /// Number of read requests merged
    pub reads_merged: u64,
    /// Number of sectors read
    pub read_sectors: u64,
    /// Time spent reading (ms)
    pub read_time: u64,
    /// Number of writes completed
    pub writes: u64,
    /// Number of write requests merged
    pub writes_merged: u64,
    /// Number of sectors written
    pub write_sectors: u64,
    /// Time spent writing (ms)
    pub write_time: u64,
    /// Number of I/Os currently in progress
    pub io_in_progress: u64,
    /// Time spent doing I/Os (ms)
    pub io_time: u64,
    /// Weighted time spent doing I/Os (ms)
    pub io_weighted_time: u64,
    pub discards: u64,
    pub discards_merged: u64,
    pub discard_sectors: u64,
    /// Time spent discarding (ms)
    pub discard_time: u64,
    pub flushes: u64,
    /// Time spent flushing (ms)
    pub flush_time: u64,
    /// Layout the line was read with; counters beyond it are zero.
    pub schema: DiskStatsSchema,
}

/// Maximum number of counters after `major minor name`.
const DISKSTATS_COUNTERS: usize = 17;

/// Parses one `/proc/diskstats` line.
pub fn parse_diskstats_line(line: &str, policy: DiskStatsPolicy) -> Result<DiskStats, ParseError> {
    let field_count = line.split_whitespace().count();
    let schema = match policy {
        DiskStatsPolicy::Strict if field_count < DiskStatsSchema::Flush.field_count() => None,
        _ => DiskStatsSchema::from_field_count(field_count),
    }
    .ok_or_else(|| {
        ParseError::new(
            format!("number of fields is not corresponding: got {}", field_count),
            line.trim(),
        )
    })?;

    let mut parts = line.split_whitespace();
    let major = parse_token(parts.next(), "major number", line)?;
    let minor = parse_token(parts.next(), "minor number", line)?;
    let device = parts.next().unwrap_or_default().to_string();

    let mut c = [0u64; DISKSTATS_COUNTERS];
    parse_counters(parts, &mut c, line)?;

    Ok(DiskStats {
        major,
        minor,
        device,
        reads: c[0],
        reads_merged: c[1],
        read_sectors: c[2],
        read_time: c[3],
        writes: c[4],
        writes_merged: c[5],
        write_sectors: c[6],
        write_time: c[7],
        io_in_progress: c[8],
        io_time: c[9],
        io_weighted_time: c[10],
        discards: c[11],
        discards_merged: c[12],
        discard_sectors: c[13],
        discard_time: c[14],
        flushes: c[15],
        flush_time: c[16],
        schema,
    })
}

/// Parses `/proc/diskstats` content, one record per non-blank line.
///
/// Format: major minor name reads r_merged r_sectors r_time writes w_merged w_sectors w_time
/// io_pending io_time w_io_time [discards d_merged d_sectors d_time [flushes f_time]]
pub fn parse_diskstats(
    content: &str,
    policy: DiskStatsPolicy,
) -> Result<Vec<DiskStats>, ParseError> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_diskstats_line(line, policy))
        .collect()
}

// ============ Process Directory Entries ============

/// Classifies a `/proc` directory entry name.
///
/// Returns `Ok(None)` for entries that are not process directories (first
/// character is not a digit) and an error for names that start with a digit
/// but are not a valid PID.
pub fn parse_pid_name(name: &str) -> Result<Option<u32>, ParseError> {
    if !name.bytes().next().is_some_and(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    name.parse()
        .map(Some)
        .map_err(|_| ParseError::new("invalid pid directory name", name))
}

// ============ Kernel Identification ============

/// Extracts the first token of a single-value file such as
/// `/proc/sys/kernel/osrelease`.
pub fn parse_os_token(content: &str) -> Result<String, ParseError> {
    content
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| ParseError::new("empty value", content.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_names_offending_line() {
        assert_eq!(decode_utf8(b"cpu0 1 2\n".to_vec()).unwrap(), "cpu0 1 2\n");

        let err = decode_utf8(b"MemTotal: 1 kB\nBad\xc3: 2 kB\nMemFree: 3 kB\n".to_vec())
            .unwrap_err();
        assert_eq!(err.message, "invalid UTF-8");
        assert_eq!(err.context, "Bad\u{fffd}: 2 kB");
    }

    #[test]
    fn test_parse_loadavg() {
        let load = parse_loadavg("0.52 0.58 0.59 2/456 12345\n").unwrap();

        assert!((load.loadavg1 - 0.52).abs() < 0.001);
        assert!((load.loadavg5 - 0.58).abs() < 0.001);
        assert!((load.loadavg15 - 0.59).abs() < 0.001);
        assert_eq!(load.current_processes, 2);
        assert_eq!(load.total_processes, 456);
        assert_eq!(load.last_pid, 12345);
    }

    #[test]
    fn test_parse_loadavg_missing_last_pid() {
        let err = parse_loadavg("0.52 0.58 0.59 2/456\n").unwrap_err();
        assert_eq!(err.message, "missing last pid");
        assert_eq!(err.context, "0.52 0.58 0.59 2/456");
    }

    #[test]
    fn test_parse_loadavg_bad_pair() {
        assert!(parse_loadavg("0.52 0.58 0.59 2-456 12345\n").is_err());
        assert!(parse_loadavg("0.52 0.58 0.59 x/456 12345\n").is_err());
        assert!(parse_loadavg("").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
Active(anon):     100000 kB
Active:           400000 kB
SwapTotal:       4096000 kB
HugePages_Total:       4
Hugepagesize:       2048 kB
";
        let info = parse_meminfo(content).unwrap();

        assert_eq!(info.mem_total, 16384000);
        assert_eq!(info.mem_free, 8192000);
        assert_eq!(info.mem_available, 12000000);
        assert_eq!(info.buffers, 512000);
        assert_eq!(info.cached, 2048000);
        assert_eq!(info.active_anon, 100000);
        assert_eq!(info.active, 400000);
        assert_eq!(info.swap_total, 4096000);
        assert_eq!(info.huge_pages_total, 4);
        assert_eq!(info.hugepagesize, 2048);
        assert_eq!(info.get("Active(anon):"), Some(100000));
    }

    #[test]
    fn test_parse_meminfo_unknown_keys_skipped() {
        let info = parse_meminfo("MemTotal:       16384000 kB\nBogusField: 5\n").unwrap();

        assert_eq!(info.mem_total, 16384000);
        assert_eq!(
            info,
            MemInfo {
                mem_total: 16384000,
                observed: BTreeSet::from(["MemTotal:"]),
                ..MemInfo::default()
            }
        );
    }

    #[test]
    fn test_parse_meminfo_observed_keys() {
        let info = parse_meminfo("MemTotal: 10 kB\nSwapFree: 0 kB\n").unwrap();

        assert!(info.observed("SwapFree:"));
        assert_eq!(info.swap_free, 0);
        assert!(!info.observed("SwapTotal:"));
        assert_eq!(info.swap_total, 0);
        assert_eq!(
            info.observed_labels().collect::<Vec<_>>(),
            vec!["MemTotal:", "SwapFree:"]
        );
    }

    #[test]
    fn test_meminfo_json_keeps_observed_keys() {
        let info = parse_meminfo("MemTotal: 10 kB\nSwapFree: 0 kB\n").unwrap();

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["observed"], serde_json::json!(["MemTotal:", "SwapFree:"]));

        let back: MemInfo = serde_json::from_value(json.clone()).unwrap();
        assert!(back.observed("SwapFree:"));
        assert!(!back.observed("SwapTotal:"));
        assert_eq!(back, info);

        let mut bogus = json;
        bogus["observed"] = serde_json::json!(["Bogus:"]);
        assert!(serde_json::from_value::<MemInfo>(bogus).is_err());
    }

    #[test]
    fn test_parse_meminfo_invalid_value_names_key() {
        let err = parse_meminfo("MemTotal:    abc kB\n").unwrap_err();
        assert_eq!(err.context, "MemTotal:");

        let err = parse_meminfo("MemFree:\n").unwrap_err();
        assert_eq!(err.context, "MemFree:");
    }

    #[test]
    fn test_meminfo_labels_are_distinct() {
        let labels: BTreeSet<_> = MemInfo::LABELS.iter().collect();
        assert_eq!(labels.len(), MemInfo::LABELS.len());
        assert_eq!(MemInfo::LABELS.len(), 50);
        assert!(MemInfo::LABELS.iter().all(|l| l.ends_with(':')));
    }

    #[test]
    fn test_parse_cpu_stat_excludes_aggregate() {
        let content = "\
cpu  100 200 300 400 0 0 0 0
cpu0 50 100 150 200 0 0 0 0
cpu1 50 100 150 200 0 0 0 0
";
        let cpus = parse_cpu_stat(content).unwrap();

        assert_eq!(cpus.len(), 2);
        assert_eq!(cpus[0].cpu, "cpu0");
        assert_eq!(cpus[1].cpu, "cpu1");
        assert_eq!(cpus[0].user, 50);
        assert_eq!(cpus[0].idle, 200);
        assert_eq!(cpus[1].cpu_index(), Some(1));
    }

    #[test]
    fn test_parse_cpu_stat_ignores_guest_and_other_lines() {
        let content = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 7 3 1
intr 1000000 50 0 0
ctxt 500000
cpufreq 1
btime 1700000000
";
        let cpus = parse_cpu_stat(content).unwrap();

        assert_eq!(cpus.len(), 1);
        assert_eq!(cpus[0].steal, 7);
        assert_eq!(cpus[0].softirq, 25);
    }

    #[test]
    fn test_parse_cpu_stat_short_line() {
        let err = parse_cpu_stat("cpu0 1 2 3 4 5 6 7\n").unwrap_err();
        assert_eq!(err.context, "cpu0 1 2 3 4 5 6 7");

        assert!(parse_cpu_stat("cpu0 1 2 3 x 5 6 7 8\n").is_err());
    }

    #[test]
    fn test_parse_diskstats_full_line() {
        let line = "   8       0 sda 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17";
        let disk = parse_diskstats_line(line, DiskStatsPolicy::Strict).unwrap();

        assert_eq!(disk.major, 8);
        assert_eq!(disk.minor, 0);
        assert_eq!(disk.device, "sda");
        let counters = [
            disk.reads,
            disk.reads_merged,
            disk.read_sectors,
            disk.read_time,
            disk.writes,
            disk.writes_merged,
            disk.write_sectors,
            disk.write_time,
            disk.io_in_progress,
            disk.io_time,
            disk.io_weighted_time,
            disk.discards,
            disk.discards_merged,
            disk.discard_sectors,
            disk.discard_time,
            disk.flushes,
            disk.flush_time,
        ];
        assert_eq!(counters, core::array::from_fn(|i| i as u64 + 1));
        assert_eq!(disk.schema, DiskStatsSchema::Flush);
    }

    #[test]
    fn test_parse_diskstats_strict_rejects_short_lines() {
        let content = "   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300 0 0 0 0\n";
        let err = parse_diskstats(content, DiskStatsPolicy::Strict).unwrap_err();

        assert!(err.message.contains("got 18"));
        assert!(err.context.starts_with("8       0 sda"));
    }

    #[test]
    fn test_parse_diskstats_compatible_generations() {
        let content = "\
   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260 7 1 64 2
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 3 0 24 1 77 9
";
        let disks = parse_diskstats(content, DiskStatsPolicy::Compatible).unwrap();

        assert_eq!(disks.len(), 3);

        assert_eq!(disks[0].schema, DiskStatsSchema::Base);
        assert_eq!(disks[0].io_weighted_time, 300);
        assert_eq!(disks[0].discards, 0);
        assert_eq!(disks[0].flushes, 0);

        assert_eq!(disks[1].schema, DiskStatsSchema::Discard);
        assert_eq!(disks[1].discards, 7);
        assert_eq!(disks[1].discard_time, 2);
        assert_eq!(disks[1].flush_time, 0);

        assert_eq!(disks[2].schema, DiskStatsSchema::Flush);
        assert_eq!(disks[2].major, 259);
        assert_eq!(disks[2].io_in_progress, 5);
        assert_eq!(disks[2].flushes, 77);
        assert_eq!(disks[2].flush_time, 9);
    }

    #[test]
    fn test_parse_diskstats_compatible_rejects_truncated() {
        // 16 fields matches no kernel layout
        let line = "8 0 sda 1 2 3 4 5 6 7 8 9 10 11 12 13";
        assert!(parse_diskstats_line(line, DiskStatsPolicy::Compatible).is_err());
        assert!(parse_diskstats_line("8 0 sda 1 2", DiskStatsPolicy::Compatible).is_err());
    }

    #[test]
    fn test_parse_diskstats_non_numeric_fails_whole_file() {
        let content = "\
   8       0 sda 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17
   8       1 sda1 1 2 3 4 5 6 x 8 9 10 11 12 13 14 15 16 17
";
        let err = parse_diskstats(content, DiskStatsPolicy::Compatible).unwrap_err();
        assert!(err.context.contains("sda1"));

        let bad_major = "x 0 sda 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17";
        assert!(parse_diskstats_line(bad_major, DiskStatsPolicy::Strict).is_err());
    }

    #[test]
    fn test_parse_diskstats_record_count_matches_lines() {
        let content = "\
   7       0 loop0 1 0 2 0 0 0 0 0 0 4 0 0 0 0 0 0 0
   8       0 sda 1 0 2 0 0 0 0 0 0 4 0 0 0 0 0 0 0

   8       1 sda1 1 0 2 0 0 0 0 0 0 4 0 0 0 0 0 0 0
";
        let disks = parse_diskstats(content, DiskStatsPolicy::Strict).unwrap();
        assert_eq!(disks.len(), 3);
        assert_eq!(disks, parse_diskstats(content, DiskStatsPolicy::Strict).unwrap());
    }

    #[test]
    fn test_parse_pid_name() {
        assert_eq!(parse_pid_name("1").unwrap(), Some(1));
        assert_eq!(parse_pid_name("4242").unwrap(), Some(4242));
        assert_eq!(parse_pid_name("self").unwrap(), None);
        assert_eq!(parse_pid_name("abc").unwrap(), None);
        assert_eq!(parse_pid_name("").unwrap(), None);

        let err = parse_pid_name("12abc").unwrap_err();
        assert_eq!(err.context, "12abc");
    }

    #[test]
    fn test_parse_os_token() {
        assert_eq!(parse_os_token("Linux\n").unwrap(), "Linux");
        assert_eq!(
            parse_os_token("6.8.0-45-generic\n").unwrap(),
            "6.8.0-45-generic"
        );
        assert!(parse_os_token(" \n").is_err());
    }
}
