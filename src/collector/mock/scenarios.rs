//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states
//! for testing various system conditions.

use std::io;

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a typical system on a recent kernel with a few processes.
    ///
    /// Includes: init (PID 1), kthreadd (PID 2) and a bash shell (PID 1000).
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/loadavg", "0.15 0.10 0.05 1/150 1234\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
Active(anon):    1024000 kB
Inactive(anon):   256000 kB
Active(file):    3072000 kB
Inactive(file):  1792000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
Zswap:                 0 kB
Dirty:              1024 kB
Writeback:             0 kB
Slab:             512000 kB
SReclaimable:     256000 kB
SUnreclaim:       256000 kB
HugePages_Total:       0
Hugepagesize:       2048 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 10 0 2048 5 300 40
   8       1 sda1 10000 80 800000 4000 5000 40 400000 2500 0 3500 6500 10 0 2048 5 0 0
 259       0 nvme0n1 50000 200 2000000 10000 30000 150 1500000 8000 5 15000 18000 0 0 0 0 900 120
",
        );
        fs.add_file("/proc/sys/kernel/ostype", "Linux\n");
        fs.add_file("/proc/sys/kernel/osrelease", "6.8.0-45-generic\n");

        fs.add_process(1, "/sbin/init\0splash\0");
        fs.add_process(2, "");
        fs.add_process(1000, "/bin/bash\0--login\0");

        fs
    }

    /// Creates a system running a pre-4.18 kernel (14-field diskstats).
    pub fn legacy_kernel() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/loadavg", "1.00 0.75 0.50 3/212 9876\n");
        fs.add_file(
            "/proc/stat",
            "\
cpu  4000 10 900 50000 300 0 40 0
cpu0 4000 10 900 50000 300 0 40 0
",
        );
        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 4000 20 120000 900 2000 60 80000 700 0 1200 1600
   8       1 sda1 3900 20 118000 880 1990 60 79000 690 0 1150 1570
",
        );
        fs.add_file("/proc/sys/kernel/ostype", "Linux\n");
        fs.add_file("/proc/sys/kernel/osrelease", "4.15.0-213-generic\n");

        fs
    }

    /// Creates a process table where PID 42 exits while being scanned.
    ///
    /// Entries: `1`, `42` (cmdline unreadable), `abc` (not a process), `7`.
    pub fn racing_processes() -> Self {
        let mut fs = Self::new();

        fs.add_process(1, "/sbin/init\0");
        fs.add_dir("/proc/42");
        fs.add_unreadable("/proc/42/cmdline", io::ErrorKind::NotFound);
        fs.add_file("/proc/abc/cmdline", "not-a-process\0");
        fs.add_process(7, "/usr/sbin/sshd\0-D\0");

        fs
    }

    /// Creates a system whose sources are readable but malformed.
    pub fn corrupt_sources() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/loadavg", "0.52 0.58\n");
        fs.add_file("/proc/meminfo", "MemTotal:    abc kB\nMemFree: 100 kB\n");
        fs.add_file(
            "/proc/stat",
            "\
cpu  100 200 300 400 0 0 0 0
cpu0 50 100 150
",
        );
        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17
   8       1 sda1 1 2 3
",
        );

        fs
    }
}
