/*!
 * memprobe - Command Line Entry Point
 *
 * One subcommand per probe. Exit status is 0 on success and 1 on any
 * fatal allocation, file, mapping or fork failure.
 */

use clap::{Parser, Subcommand};
use memprobe::core::limits::{
    COW_BUFFER_MB, DEFAULT_TLB_ENTRIES, MAJOR_FAULT_FILE_MB, MINOR_FAULT_BUFFER_MB, RANDOM_ACCESSES,
    RANDOM_SEED, SEQUENTIAL_ITERATIONS, THRASH_BUFFER_MB, TLB_ARRAY_ELEMENTS,
};
use memprobe::core::types::mib;
use memprobe::probes::{
    AccessPattern, CowProbe, CowSettings, PageFaultProbe, PageFaultSettings, SimulateProbe,
    SimulateSettings, ThrashProbe, ThrashSettings, TlbProbe, TlbSettings,
};
use memprobe::replacement::Policy;
use memprobe::{execute, init_tracing, ProbeConfig, ProbeResult, Reporter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "memprobe", version, about = "Operating-system memory behavior probes")]
struct Cli {
    /// Print one JSON report instead of human-readable lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy-on-write sharing after fork
    Cow {
        /// Shared buffer size in MiB
        #[arg(long, default_value_t = COW_BUFFER_MB)]
        size_mb: usize,

        /// Pause around the child's writes, in milliseconds
        #[arg(long, default_value_t = 0)]
        pause_ms: u64,
    },

    /// Minor faults from anonymous memory, then faults from a file mapping
    PageFaults {
        /// Anonymous buffer size in MiB
        #[arg(long, default_value_t = MINOR_FAULT_BUFFER_MB)]
        anon_size_mb: usize,

        /// Backing file size in MiB
        #[arg(long, default_value_t = MAJOR_FAULT_FILE_MB)]
        file_size_mb: usize,

        /// Backing file path (default: $MEMPROBE_TMPDIR or the system temp dir)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Touch an oversubscribed buffer until Ctrl+C
    Thrash {
        /// Buffer size in MiB
        #[arg(long, default_value_t = THRASH_BUFFER_MB)]
        size_mb: usize,

        /// Stop after this many full passes
        #[arg(long)]
        max_passes: Option<u64>,
    },

    /// Sequential vs. random access timing
    Tlb {
        /// Run only this pattern
        #[arg(value_enum)]
        pattern: Option<AccessPattern>,

        /// Array length in i32 elements
        #[arg(long, default_value_t = TLB_ARRAY_ELEMENTS)]
        elements: usize,

        /// Full passes in the sequential test
        #[arg(long, default_value_t = SEQUENTIAL_ITERATIONS)]
        iterations: usize,

        /// Reads in the random test
        #[arg(long, default_value_t = RANDOM_ACCESSES)]
        random_accesses: usize,

        /// Seed for random indices
        #[arg(long, default_value_t = RANDOM_SEED)]
        seed: u64,
    },

    /// Simulate page replacement policies over a reference string
    Simulate {
        /// Number of physical frames
        #[arg(long)]
        frames: usize,

        /// Number of TLB entries
        #[arg(long, default_value_t = DEFAULT_TLB_ENTRIES)]
        tlb_size: usize,

        /// Simulate only this policy
        #[arg(long, value_enum)]
        policy: Option<Policy>,

        /// Seed for in-page offsets
        #[arg(long, default_value_t = RANDOM_SEED)]
        seed: u64,

        /// Page numbers in reference order
        #[arg(required = true)]
        pages: Vec<u64>,
    },
}

fn run(cli: Cli) -> ProbeResult<()> {
    let config = ProbeConfig::from_env().with_json(cli.json);
    let mut reporter = Reporter::stdout(config.json);

    match cli.command {
        Command::Cow { size_mb, pause_ms } => {
            let settings = CowSettings {
                buffer_bytes: mib(size_mb),
                pause: Duration::from_millis(pause_ms),
            };
            execute(&CowProbe::new(config, settings), &mut reporter)?;
        }
        Command::PageFaults {
            anon_size_mb,
            file_size_mb,
            path,
        } => {
            let settings = PageFaultSettings {
                anon_bytes: mib(anon_size_mb),
                file_bytes: mib(file_size_mb),
                file_path: path,
            };
            execute(&PageFaultProbe::new(config, settings), &mut reporter)?;
        }
        Command::Thrash { size_mb, max_passes } => {
            let settings = ThrashSettings {
                buffer_bytes: mib(size_mb),
                max_passes,
            };
            execute(&ThrashProbe::new(config, settings), &mut reporter)?;
        }
        Command::Tlb {
            pattern,
            elements,
            iterations,
            random_accesses,
            seed,
        } => {
            let settings = TlbSettings {
                elements,
                sequential_iterations: iterations,
                random_accesses,
                seed,
                pattern,
            };
            execute(&TlbProbe::new(config, settings), &mut reporter)?;
        }
        Command::Simulate {
            frames,
            tlb_size,
            policy,
            seed,
            pages,
        } => {
            let settings = SimulateSettings {
                reference: pages,
                frames,
                tlb_entries: tlb_size,
                seed,
                policy,
            };
            execute(&SimulateProbe::new(config, settings), &mut reporter)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(1)
        }
    }
}
