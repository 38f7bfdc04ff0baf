use clap::{Parser, Subcommand};
use ja3_fingerprint::parallel::WorkerPool;
use ja3_fingerprint::{FingerprintRecord, Ja3Analyzer, Ja3Error, PcapFrames, PortFilter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Queue depth per worker when fingerprinting a pcap in parallel
const WORKER_QUEUE_SIZE: usize = 1024;

#[derive(Parser, Debug)]
#[command(version, about = "Extract JA3 fingerprints from TLS ClientHello messages", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Look for ClientHellos on any port instead of just 443
    #[arg(short = 'a', long = "any-port", global = true)]
    any_port: bool,

    /// Additional TCP port to watch (repeatable)
    #[arg(short = 'p', long = "port", global = true)]
    ports: Vec<u16>,

    /// Print out as JSON records for downstream parsing
    #[arg(short = 'j', long, global = true)]
    json: bool,

    /// Also write the JSON records to this file
    #[arg(short = 'o', long, global = true)]
    output: Option<PathBuf>,

    /// Log file path
    #[arg(short = 'l', long = "log-file", global = true)]
    log_file: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fingerprint a pcap file
    Pcap {
        /// The pcap file to process
        file: PathBuf,

        /// Worker threads (1 processes frames inline)
        #[arg(short = 'w', long, default_value_t = 1)]
        workers: usize,
    },
    /// Fingerprint live traffic
    Live {
        /// Network interface name
        #[arg(short = 'i', long)]
        interface: String,
    },
}

/// How fingerprints reach stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    /// One summary line per fingerprint
    Summary,
    /// A single JSON array printed once the capture is exhausted
    JsonArray,
    /// One JSON object per line as fingerprints arrive (live capture never ends on its own)
    JsonLines,
}

impl OutputMode {
    fn select(json: bool, live: bool) -> Self {
        match (json, live) {
            (false, _) => OutputMode::Summary,
            (true, false) => OutputMode::JsonArray,
            (true, true) => OutputMode::JsonLines,
        }
    }

    /// Whether records have to be kept until the end of the run
    fn buffers_records(self, write_file: bool) -> bool {
        write_file || self == OutputMode::JsonArray
    }
}

fn initialize_logging(log_file: Option<String>) {
    let console_writer = std::io::stderr.with_max_level(tracing::Level::INFO);

    let result = match log_file {
        Some(log_file) => {
            let file_appender = RollingFileAppender::new(Rotation::NEVER, ".", log_file)
                .with_max_level(tracing::Level::DEBUG);
            let subscriber = fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(console_writer.and(file_appender))
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => {
            let subscriber = fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(console_writer)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    if let Err(e) = result {
        eprintln!("Failed to set subscriber: {e}");
        std::process::exit(1);
    }
}

fn build_filter(args: &Args) -> PortFilter {
    let filter = PortFilter::default().port_list(args.ports.clone());
    if args.any_port {
        filter.any_port()
    } else {
        filter
    }
}

fn run_pcap_parallel(
    file: PathBuf,
    workers: usize,
    filter: PortFilter,
    sender: mpsc::Sender<FingerprintRecord>,
    cancel: Arc<AtomicBool>,
) -> Result<(), Ja3Error> {
    let frames = PcapFrames::open(&file)?;
    let pool = WorkerPool::new(workers, WORKER_QUEUE_SIZE, filter, sender)?;

    for frame in frames {
        if cancel.load(Ordering::Relaxed) {
            debug!("Cancellation signal received, stopping dispatch");
            break;
        }
        match frame {
            Ok((data, timestamp)) => {
                pool.dispatch_blocking(data, timestamp);
            }
            Err(e) => error!("Failed to read frame: {e}"),
        }
    }

    let stats = pool.join();
    info!("{}", stats);
    Ok(())
}

fn write_json(path: &Path, records: &[FingerprintRecord]) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

fn main() {
    let args = Args::parse();
    initialize_logging(args.log_file.clone());

    let filter = build_filter(&args);
    info!("Starting JA3 extraction, ports: {:?}, any port: {}", filter.ports, filter.any_port);

    let (sender, receiver) = mpsc::channel::<FingerprintRecord>();

    let cancel_signal = Arc::new(AtomicBool::new(false));
    let ctrl_c_signal = cancel_signal.clone();
    let thread_cancel_signal = cancel_signal.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received signal, initiating graceful shutdown...");
        ctrl_c_signal.store(true, Ordering::Relaxed);
    }) {
        error!("Error setting signal handler: {e}");
        return;
    }

    let mode = OutputMode::select(args.json, matches!(args.command, Commands::Live { .. }));
    let buffer_records = mode.buffers_records(args.output.is_some());

    let command = args.command;
    let handle = thread::spawn(move || match command {
        Commands::Pcap { file, workers } if workers > 1 => {
            info!("Fingerprinting {} with {} workers", file.display(), workers);
            run_pcap_parallel(file, workers, filter, sender, thread_cancel_signal)
        }
        Commands::Pcap { file, .. } => {
            info!("Fingerprinting {}", file.display());
            let mut analyzer = Ja3Analyzer::new().with_filter(filter);
            let result =
                analyzer.analyze_pcap(&file, sender, Some(thread_cancel_signal));
            info!("{}", analyzer.stats());
            result
        }
        Commands::Live { interface } => {
            info!("Starting live capture on interface: {}", interface);
            let mut analyzer = Ja3Analyzer::new().with_filter(filter);
            analyzer.analyze_network(&interface, sender, Some(thread_cancel_signal))
        }
    });

    let mut records = Vec::new();
    for record in receiver {
        match mode {
            OutputMode::Summary => println!("{}", record.summary()),
            OutputMode::JsonLines => match serde_json::to_string(&record) {
                Ok(line) => println!("{line}"),
                Err(e) => error!("Failed to serialize record: {e}"),
            },
            OutputMode::JsonArray => {}
        }
        if buffer_records {
            records.push(record);
        }
    }

    match handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("JA3 analysis failed: {e}");
            std::process::exit(1);
        }
        Err(_) => {
            error!("JA3 analysis thread panicked");
            std::process::exit(1);
        }
    }

    if mode == OutputMode::JsonArray {
        match serde_json::to_string_pretty(&records) {
            Ok(json) => println!("{json}"),
            Err(e) => error!("Failed to serialize records: {e}"),
        }
    }

    if let Some(path) = &args.output {
        if let Err(e) = write_json(path, &records) {
            error!("{e}");
            std::process::exit(1);
        }
        info!("Wrote {} records to {}", records.len(), path.display());
    }

    info!("Analysis shutdown completed");
}
