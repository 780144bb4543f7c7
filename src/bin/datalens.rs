use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use datalens::analyzers::{AnalysisKind, AnalyzerRegistry};
use datalens::config::AnalysisConfig;
use datalens::report::{ReportFormat, ReportStore};
use datalens::stream::{Emitter, LogLineSampler, MetricsSampler, Producer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Once;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_parallelism() {
    static START: Once = Once::new();
    START.call_once(|| {
        let n = num_cpus::get();
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    });
}

#[derive(Parser, Debug)]
#[command(name = "datalens", version, about = "Pattern, anomaly, log and threat analysis over in-memory batches")]
struct Cli {
    /// JSON file overriding analysis thresholds
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// Persist every result as a report in this directory
    #[arg(long = "report-dir", global = true)]
    report_dir: Option<PathBuf>,

    #[arg(long = "report-format", value_enum, default_value = "json", global = true)]
    report_format: ReportFormat,

    /// Fixed seed for centroid sampling
    #[arg(long = "seed", global = true)]
    seed: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Data mining over JSON record batches (`-` for stdin). Files run concurrently.
    Mine {
        #[arg(long = "kind", value_enum, default_value = "comprehensive")]
        kind: AnalysisKind,
        #[arg(required = true)]
        input: Vec<String>,
    },
    /// Severity, IP, date and keyword analysis of a CSV, JSON or text log file
    Logs { input: PathBuf },
    /// Content threat scan of an arbitrary file
    Scan { input: PathBuf },
    /// Connection, port-scan and DDoS indicators over a JSON packet array
    Network { input: String },
    /// Emit synthetic keep-alive updates until Ctrl-C or --count
    Stream {
        #[arg(long = "source", value_enum, default_value = "metrics")]
        source: StreamSource,
        /// Seconds between updates (defaults to the configured interval)
        #[arg(long = "interval")]
        interval_secs: Option<u64>,
        #[arg(long = "count")]
        count: Option<usize>,
    },
    /// List stored reports, newest first
    Reports,
    /// Print a stored report by id
    Report { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StreamSource {
    Metrics,
    Logs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MineOutput<'a> {
    file: &'a str,
    analysis_type: AnalysisKind,
    analysis: datalens::AnalysisOutput,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        Ok(s)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {path}"))
    }
}

/// A failed save never discards the analysis; it is logged and printing goes on.
fn persist<T: Serialize>(cli: &Cli, kind: &str, payload: &T) {
    let Some(dir) = cli.report_dir.as_ref() else { return };
    match ReportStore::new(dir).save(kind, payload, cli.report_format) {
        Ok(id) => tracing::info!(report = %id, "report stored"),
        Err(e) => tracing::warn!(error = %e, "could not store report; result still printed"),
    }
}

fn report_store(cli: &Cli) -> ReportStore {
    ReportStore::new(cli.report_dir.clone().unwrap_or_else(|| PathBuf::from("reports")))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_parallelism();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut cfg = match &cli.config {
        Some(path) => AnalysisConfig::from_path(path).with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if cli.seed.is_some() {
        cfg.cluster_seed = cli.seed;
    }

    match &cli.command {
        Command::Mine { kind, input } => {
            let registry = AnalyzerRegistry::new();
            // Each file is an independent batch; analyzers share no state.
            let results: Vec<anyhow::Result<MineOutput>> = input
                .par_iter()
                .map(|path| {
                    let raw = read_input(path)?;
                    let batch = datalens::record::batch_from_str(&raw).with_context(|| format!("parsing batch {path}"))?;
                    Ok(MineOutput { file: path, analysis_type: *kind, analysis: registry.run(*kind, &batch, &cfg) })
                })
                .collect();
            for result in results {
                let out = result?;
                persist(&cli, out.analysis_type.as_str(), &out.analysis);
                print_json(&out)?;
            }
        }
        Command::Logs { input } => {
            let bytes = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
            let name = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let analysis = datalens::logs::analyze_upload(&name, &bytes)?;
            persist(&cli, "logs", &analysis);
            print_json(&analysis)?;
        }
        Command::Scan { input } => {
            let bytes = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
            let name = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let report = datalens::threat::scan_bytes(&name, &bytes, &cfg);
            persist(&cli, "security", &report);
            print_json(&report)?;
        }
        Command::Network { input } => {
            let raw = read_input(input)?;
            let packets = datalens::network::packets_from_str(&raw)?;
            let analysis = datalens::network::analyze_traffic(&packets, &cfg);
            persist(&cli, "network", &analysis);
            print_json(&analysis)?;
        }
        Command::Stream { source, interval_secs, count } => {
            let interval = Duration::from_secs(interval_secs.unwrap_or(cfg.emit_interval_secs).max(1));
            let rng = match cfg.cluster_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            match source {
                StreamSource::Metrics => run_stream(interval, *count, MetricsSampler::new(rng, cfg.error_rate_alert))?,
                StreamSource::Logs => run_stream(interval, *count, LogLineSampler::new(rng))?,
            }
        }
        Command::Reports => {
            print_json(&report_store(&cli).list()?)?;
        }
        Command::Report { id } => {
            print!("{}", report_store(&cli).read(id)?);
        }
    }
    Ok(())
}

fn run_stream<P>(interval: Duration, count: Option<usize>, producer: P) -> anyhow::Result<()>
where
    P: Producer,
    P::Item: Serialize,
{
    let (tx, rx) = mpsc::channel();
    let emitter = Emitter::spawn(interval, producer, tx);
    {
        let flag = emitter.stop_flag();
        let _ = ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst));
    }
    let mut received = 0usize;
    // The channel closes once the emitter thread exits, ending this loop.
    for item in rx.iter() {
        println!("data: {}\n", serde_json::to_string(&item)?);
        received += 1;
        if count.map(|c| received >= c).unwrap_or(false) {
            break;
        }
    }
    let sent = emitter.cancel();
    tracing::info!(sent, received, "stream closed");
    Ok(())
}
