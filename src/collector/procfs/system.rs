//! System collector for gathering global system metrics from `/proc/`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::collector::procfs::error::CollectError;
use crate::collector::procfs::parser::{
    CpuStat, DiskStats, DiskStatsPolicy, LoadAvg, MemInfo, decode_utf8, parse_cpu_stat,
    parse_diskstats, parse_loadavg, parse_meminfo, parse_os_token,
};
use crate::collector::traits::FileSystem;

/// Longest name accepted by [`SystemCollector::read_proc_file`].
pub const MAX_PROC_FILE_NAME: usize = 64;

/// Kernel type and release from `/proc/sys/kernel/{ostype,osrelease}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsVersion {
    pub os_type: String,
    pub os_release: String,
}

/// Collects system-wide metrics from `/proc/`.
///
/// Each call opens, reads and closes its own source, so a collector can be
/// shared between threads.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
    diskstats_policy: DiskStatsPolicy,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            diskstats_policy: DiskStatsPolicy::default(),
        }
    }

    /// Sets how `/proc/diskstats` lines from older kernels are handled.
    pub fn set_diskstats_policy(&mut self, policy: DiskStatsPolicy) {
        self.diskstats_policy = policy;
    }

    pub fn diskstats_policy(&self) -> DiskStatsPolicy {
        self.diskstats_policy
    }

    fn read(&self, name: &str) -> Result<(PathBuf, String), CollectError> {
        let path = self.proc_path.join(name);
        trace!(path = %path.display(), "reading");
        let bytes = match self.fs.read(&path) {
            Ok(bytes) => bytes,
            Err(e) => return Err(CollectError::io(path, e)),
        };
        match decode_utf8(bytes) {
            Ok(content) => Ok((path, content)),
            Err(e) => Err(CollectError::format(path, e)),
        }
    }

    /// Collects load average from `/proc/loadavg`.
    pub fn collect_loadavg(&self) -> Result<LoadAvg, CollectError> {
        let (path, content) = self.read("loadavg")?;
        parse_loadavg(&content).map_err(|e| CollectError::format(path, e))
    }

    /// Collects memory information from `/proc/meminfo`.
    pub fn collect_meminfo(&self) -> Result<MemInfo, CollectError> {
        let (path, content) = self.read("meminfo")?;
        let info = parse_meminfo(&content).map_err(|e| CollectError::format(path, e))?;
        debug!(keys = info.observed_labels().count(), "collected meminfo");
        Ok(info)
    }

    /// Collects per-CPU statistics from `/proc/stat`.
    ///
    /// The aggregate `cpu` line is not included.
    pub fn collect_cpu_stats(&self) -> Result<Vec<CpuStat>, CollectError> {
        let (path, content) = self.read("stat")?;
        let cpus = parse_cpu_stat(&content).map_err(|e| CollectError::format(path, e))?;
        debug!(cpus = cpus.len(), "collected cpu stats");
        Ok(cpus)
    }

    /// Collects disk I/O statistics from `/proc/diskstats`.
    pub fn collect_diskstats(&self) -> Result<Vec<DiskStats>, CollectError> {
        let (path, content) = self.read("diskstats")?;
        let disks = parse_diskstats(&content, self.diskstats_policy)
            .map_err(|e| CollectError::format(path, e))?;
        debug!(
            disks = disks.len(),
            policy = ?self.diskstats_policy,
            "collected diskstats"
        );
        Ok(disks)
    }

    /// Collects kernel type and release.
    pub fn collect_os_version(&self) -> Result<OsVersion, CollectError> {
        let read_token = |name: &str| -> Result<String, CollectError> {
            let (path, content) = self.read(name)?;
            parse_os_token(&content).map_err(|e| CollectError::format(path, e))
        };

        Ok(OsVersion {
            os_type: read_token("sys/kernel/ostype")?,
            os_release: read_token("sys/kernel/osrelease")?,
        })
    }

    /// Returns the full text of `/proc/<name>`.
    ///
    /// Names containing `.` or longer than [`MAX_PROC_FILE_NAME`] bytes are
    /// rejected without touching the filesystem.
    pub fn read_proc_file(&self, name: &str) -> Result<String, CollectError> {
        validate_proc_file_name(name)?;
        let (_, content) = self.read(name)?;
        Ok(content)
    }

    /// Base path this collector reads from.
    pub fn proc_path(&self) -> &Path {
        &self.proc_path
    }
}

fn validate_proc_file_name(name: &str) -> Result<(), CollectError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains('.') {
        "relative paths are not allowed"
    } else if name.len() > MAX_PROC_FILE_NAME {
        "name is too long"
    } else if name.starts_with('/') {
        "name must be relative to the proc root"
    } else {
        return Ok(());
    };

    Err(CollectError::InvalidName {
        name: name.to_string(),
        reason,
    })
}
