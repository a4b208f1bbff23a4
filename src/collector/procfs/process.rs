//! Process collector for enumerating live processes from `/proc/[pid]/`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collector::procfs::error::CollectError;
use crate::collector::procfs::parser::parse_pid_name;
use crate::collector::traits::FileSystem;

/// Default cap on bytes read from `/proc/[pid]/cmdline`.
pub const DEFAULT_CMDLINE_LIMIT: usize = 512;

/// One live process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    /// Raw `/proc/[pid]/cmdline` bytes, NUL separators between arguments kept.
    /// Empty for kernel threads and zombies.
    #[serde(with = "lossy_bytes")]
    pub cmdline: Vec<u8>,
}

impl ProcessInfo {
    /// Splits the command line into its NUL-separated arguments.
    pub fn args(&self) -> impl Iterator<Item = &[u8]> {
        self.cmdline
            .split(|&b| b == 0)
            .filter(|arg| !arg.is_empty())
    }

    /// Command line with arguments joined by spaces, for display.
    pub fn cmdline_lossy(&self) -> String {
        self.args()
            .map(String::from_utf8_lossy)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Collects the process table from `/proc/[pid]/` directories.
pub struct ProcessCollector<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
    cmdline_limit: usize,
}

impl<F: FileSystem> ProcessCollector<F> {
    /// Creates a new process collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            cmdline_limit: DEFAULT_CMDLINE_LIMIT,
        }
    }

    /// Sets the maximum number of command-line bytes kept per process.
    pub fn set_cmdline_limit(&mut self, limit: usize) {
        self.cmdline_limit = limit;
    }

    pub fn cmdline_limit(&self) -> usize {
        self.cmdline_limit
    }

    /// Reads the command line of a single process.
    pub fn collect_process(&self, pid: u32) -> Result<ProcessInfo, CollectError> {
        let path = self.proc_path.join(pid.to_string()).join("cmdline");
        let cmdline = self
            .fs
            .read_bytes(&path, self.cmdline_limit)
            .map_err(|e| CollectError::io(path, e))?;
        Ok(ProcessInfo { pid, cmdline })
    }

    /// Collects every process whose command line could be read, sorted by PID.
    ///
    /// Processes that disappear between the directory scan and the read are
    /// skipped. Only a failure to list the proc directory itself is an error.
    pub fn collect_all_processes(&self) -> Result<Vec<ProcessInfo>, CollectError> {
        let entries = self
            .fs
            .read_dir(&self.proc_path)
            .map_err(|e| CollectError::io(&self.proc_path, e))?;

        let mut processes = Vec::new();
        let mut skipped = 0usize;

        for entry in entries {
            let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(pid) =
                parse_pid_name(name).map_err(|e| CollectError::format(&self.proc_path, e))?
            else {
                continue;
            };

            match self.collect_process(pid) {
                Ok(info) => processes.push(info),
                Err(e) => {
                    // Process exited after the directory was listed
                    debug!(pid, error = %e, "skipping process");
                    skipped += 1;
                }
            }
        }

        processes.sort_unstable_by_key(|p| p.pid);
        debug!(processes = processes.len(), skipped, "collected processes");

        Ok(processes)
    }
}

/// Serializes raw bytes as a (lossy) UTF-8 string so JSON output stays readable.
mod lossy_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        String::deserialize(deserializer).map(String::into_bytes)
    }
}
