//! procsnap - point-in-time snapshots of Linux `/proc` metrics.
//!
//! Reads one source (or all of them) and prints the parsed records to stdout.
//! With `--interval` the snapshot is repeated until `--count` is reached or
//! the process receives Ctrl-C.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[cfg(target_os = "linux")]
use procsnap::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use procsnap::collector::mock::MockFs;
use procsnap::collector::procfs::DEFAULT_CMDLINE_LIMIT;
use procsnap::collector::{
    CollectError, Collector, DiskStatsPolicy, FileSystem, MemInfo, Snapshot, SnapshotKind,
};

/// Point-in-time snapshots of Linux /proc metrics.
#[derive(Parser)]
#[command(name = "procsnap", about = "Snapshot Linux /proc metrics", version)]
struct Args {
    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc", global = true)]
    proc_path: String,

    /// Maximum number of bytes kept from each process command line.
    #[arg(long, default_value_t = DEFAULT_CMDLINE_LIMIT, global = true)]
    cmdline_limit: usize,

    /// Reject /proc/diskstats lines with fewer than 20 fields.
    #[arg(long, global = true)]
    strict_diskstats: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    /// Repeat the snapshot every SECS seconds.
    #[arg(short, long, value_name = "SECS", global = true)]
    interval: Option<u64>,

    /// Number of snapshots to take with --interval (default: until Ctrl-C).
    #[arg(short = 'n', long, requires = "interval", global = true)]
    count: Option<u64>,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Load averages from /proc/loadavg.
    Loadavg,
    /// Memory counters from /proc/meminfo.
    Meminfo,
    /// Per-CPU time counters from /proc/stat.
    Stat,
    /// Block device counters from /proc/diskstats.
    Diskstats,
    /// Live processes and their command lines.
    Pid,
    /// Kernel type and release.
    OsVersion,
    /// Every source above in one snapshot.
    All,
    /// Raw contents of /proc/NAME.
    File {
        /// File name relative to the proc root, e.g. "uptime" or "sys/kernel/hostname".
        name: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON document per line.
    Json,
    /// Indented JSON.
    Pretty,
    /// Plain `key value` lines.
    Lines,
}

/// Failure while taking or printing a snapshot.
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so stdout only carries snapshot data.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let policy = if args.strict_diskstats {
        DiskStatsPolicy::Strict
    } else {
        DiskStatsPolicy::Compatible
    };

    #[cfg(target_os = "linux")]
    let mut collector = Collector::new(RealFs::new(), &args.proc_path);
    #[cfg(not(target_os = "linux"))]
    let mut collector = {
        warn!("/proc is only available on Linux, using a mock system");
        Collector::new(MockFs::typical_system(), &args.proc_path)
    };
    collector = collector
        .with_cmdline_limit(args.cmdline_limit)
        .with_diskstats_policy(policy);

    let running = Arc::new(AtomicBool::new(true));
    if args.interval.is_some() {
        let r = running.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            r.store(false, Ordering::SeqCst);
        }) {
            warn!("Failed to set Ctrl-C handler: {}", e);
        }
    }

    match run(&mut collector, &args, &running) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run<F: FileSystem + Clone>(
    collector: &mut Collector<F>,
    args: &Args,
    running: &AtomicBool,
) -> Result<(), RunError> {
    let Some(secs) = args.interval else {
        return snapshot_once(collector, &args.command, args.format, &mut io::stdout().lock());
    };

    let interval = Duration::from_secs(secs);
    let mut taken: u64 = 0;

    while running.load(Ordering::SeqCst) {
        snapshot_once(collector, &args.command, args.format, &mut io::stdout().lock())?;
        taken += 1;
        debug!("Snapshot #{} written", taken);

        if args.count.is_some_and(|count| taken >= count) {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    Ok(())
}

fn snapshot_once<F: FileSystem + Clone, W: Write>(
    collector: &mut Collector<F>,
    command: &Command,
    format: Format,
    out: &mut W,
) -> Result<(), RunError> {
    let kind = match command {
        Command::Loadavg => SnapshotKind::LoadAvg,
        Command::Meminfo => SnapshotKind::MemInfo,
        Command::Stat => SnapshotKind::CpuStats,
        Command::Diskstats => SnapshotKind::DiskStats,
        Command::Pid => SnapshotKind::Processes,
        Command::OsVersion => SnapshotKind::OsVersion,
        Command::All => {
            let set = collector.collect_all()?;
            if let Some(timing) = collector.last_timing() {
                debug!("Collected all sources in {:?}", timing.total);
            }
            match format {
                Format::Lines => {
                    writeln!(out, "timestamp {}", set.timestamp.to_rfc3339())?;
                    for snapshot in &set.snapshots {
                        write_lines(out, snapshot)?;
                    }
                }
                format => write_json(out, &set, format)?,
            }
            out.flush()?;
            return Ok(());
        }
        Command::File { name } => {
            let content = collector.read_proc_file(name)?;
            match format {
                Format::Lines => out.write_all(content.as_bytes())?,
                format => {
                    let doc = serde_json::json!({ "name": name, "content": content });
                    write_json(out, &doc, format)?;
                }
            }
            out.flush()?;
            return Ok(());
        }
    };

    let snapshot = collector.collect(kind)?;
    match format {
        Format::Lines => write_lines(out, &snapshot)?,
        format => write_json(out, &snapshot, format)?,
    }
    out.flush()?;
    Ok(())
}

fn write_json<W: Write, T: Serialize>(
    out: &mut W,
    value: &T,
    format: Format,
) -> Result<(), RunError> {
    if format == Format::Pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Writes a snapshot as `key value` lines, one record per line for
/// multi-record sources.
fn write_lines<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    match snapshot {
        Snapshot::LoadAvg(load) => writeln!(
            out,
            "loadavg {:.2} {:.2} {:.2} {}/{} {}",
            load.loadavg1,
            load.loadavg5,
            load.loadavg15,
            load.current_processes,
            load.total_processes,
            load.last_pid
        ),
        Snapshot::MemInfo(info) => write_meminfo_lines(out, info),
        Snapshot::CpuStats(cpus) => {
            for c in cpus {
                writeln!(
                    out,
                    "{} {} {} {} {} {} {} {} {}",
                    c.cpu, c.user, c.nice, c.system, c.idle, c.iowait, c.irq, c.softirq, c.steal
                )?;
            }
            Ok(())
        }
        Snapshot::DiskStats(disks) => {
            for d in disks {
                writeln!(
                    out,
                    "{} {}:{} reads={} read_sectors={} writes={} write_sectors={} \
                     io_in_progress={} io_time={} discards={} flushes={}",
                    d.device,
                    d.major,
                    d.minor,
                    d.reads,
                    d.read_sectors,
                    d.writes,
                    d.write_sectors,
                    d.io_in_progress,
                    d.io_time,
                    d.discards,
                    d.flushes
                )?;
            }
            Ok(())
        }
        Snapshot::Processes(procs) => {
            for p in procs {
                writeln!(out, "{} {}", p.pid, p.cmdline_lossy())?;
            }
            Ok(())
        }
        Snapshot::OsVersion(v) => writeln!(out, "{} {}", v.os_type, v.os_release),
    }
}

fn write_meminfo_lines<W: Write>(out: &mut W, info: &MemInfo) -> io::Result<()> {
    for label in MemInfo::LABELS.iter().filter(|l| info.observed(l)) {
        if let Some(value) = info.get(label) {
            writeln!(out, "{} {}", label, value)?;
        }
    }
    Ok(())
}
