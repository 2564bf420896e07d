use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;

use portprobe::types::{PortStatus, ScanOptions, ScanReport, TargetReport};
use portprobe::{ports, scanner, targets};

/// portprobe — concurrent TCP connect scanner with banner grabbing and service detection.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portprobe",
    version,
    about = "Concurrent TCP connect port scanner with banner grabbing and service detection.",
    long_about = None
)]
struct Cli {
    /// Target host, IP or CIDR (repeatable). If omitted, auto-detect local /24 networks.
    #[arg(short = 'H', long = "host")]
    hosts: Vec<String>,

    /// Ports to scan, e.g. `22,80,443` or `1-1024`. Defaults to all 65535 ports.
    #[arg(short, long)]
    ports: Option<String>,

    /// Scan a built-in list of common ports instead of the full range.
    #[arg(long, conflicts_with = "ports")]
    top: bool,

    /// Per-probe connect and banner timeout in milliseconds.
    #[arg(short = 't', long = "timeout-ms", default_value_t = 2000)]
    timeout_ms: u64,

    /// Number of concurrent probe workers.
    #[arg(short, long, default_value_t = 100)]
    concurrency: usize,

    /// Randomize port scanning order.
    #[arg(short, long)]
    randomize: bool,

    /// Seed for `--randomize`, for a reproducible order.
    #[arg(long, requires = "randomize")]
    seed: Option<u64>,

    /// Delay in milliseconds between consecutive probes of one worker.
    #[arg(short = 'd', long = "delay-ms", default_value_t = 0)]
    delay_ms: u64,

    /// Show closed and filtered ports too.
    #[arg(long = "show-closed")]
    show_closed: bool,

    /// Write all reports as pretty JSON to this path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let hosts: Vec<String> = if cli.hosts.is_empty() {
        let nets = targets::detect_local_networks()?;
        if nets.is_empty() {
            bail!("no --host given and no local IPv4 network detected");
        }
        for net in &nets {
            eprintln!("Auto-detected local network: {net}");
        }
        nets.iter().map(ToString::to_string).collect()
    } else {
        cli.hosts.clone()
    };

    let port_list = match cli.ports.as_deref() {
        Some(spec) if !spec.trim().is_empty() => {
            ports::parse_ports(spec).context("error parsing ports")?
        }
        _ if cli.top => ports::common_ports(),
        _ => {
            eprintln!("Full scan mode: scanning all 65535 ports (this may take a while)");
            ports::all_ports()
        }
    };

    let options = ScanOptions {
        timeout: Duration::from_millis(cli.timeout_ms),
        max_concurrency: cli.concurrency,
        randomize_order: cli.randomize,
        delay_between: Duration::from_millis(cli.delay_ms),
        shuffle_seed: cli.seed,
    };

    print_header(&hosts, port_list.len(), &cli);

    let reports = scanner::scan_targets(&hosts, &port_list, &options).await;
    for report in &reports {
        match &report.outcome {
            Ok(scan) => print_report(&report.target, scan, cli.show_closed),
            Err(e) => eprintln!("Error scanning {}: {e}", report.target),
        }
    }

    if let Some(path) = cli.output.as_deref() {
        write_reports_json(path, &reports)
            .with_context(|| format!("failed to write JSON to {}", path.display()))?;
        println!("Wrote JSON results to {}", path.display());
    }

    Ok(())
}

fn print_header(hosts: &[String], port_count: usize, cli: &Cli) {
    println!("portprobe configuration:");
    println!("  targets      : {}", hosts.join(", "));
    println!("  ports        : {port_count}");
    println!("  timeout_ms   : {}", cli.timeout_ms);
    println!("  concurrency  : {}", cli.concurrency);
    println!("  randomize    : {}", cli.randomize);
    if cli.delay_ms > 0 {
        println!("  delay_ms     : {}", cli.delay_ms);
    }
}

fn print_report(target: &str, report: &ScanReport, show_closed: bool) {
    let mut rows: Vec<_> = report
        .results
        .iter()
        .filter(|r| show_closed || r.status == PortStatus::Open)
        .collect();
    rows.sort_by_key(|r| r.port);

    let snippets: Vec<(String, String)> = rows
        .iter()
        .map(|r| (display_snippet(&r.banner), display_snippet(&r.body)))
        .collect();

    let port_w = 5usize;
    let status_w = 8usize;
    let mut service_w = "service".len();
    let mut banner_w = "banner".len();
    for (r, (b, _)) in rows.iter().zip(&snippets) {
        service_w = service_w.max(r.service.len());
        banner_w = banner_w.max(b.len());
    }

    println!("\nTarget: {target}");
    println!(
        "{:>port_w$}  {:<status_w$}  {:<service_w$}  {:<banner_w$}  body",
        "port", "status", "service", "banner"
    );
    println!(
        "{:-<port_w$}  {:-<status_w$}  {:-<service_w$}  {:-<banner_w$}  {:-<4}",
        "", "", "", "", ""
    );
    for (r, (banner, body)) in rows.iter().zip(&snippets) {
        println!(
            "{:>port_w$}  {:<status_w$}  {:<service_w$}  {:<banner_w$}  {}",
            r.port,
            r.status.to_string(),
            r.service,
            banner,
            body
        );
    }

    let s = &report.stats;
    println!("\nTotal ports scanned : {}", s.total_ports);
    println!("Open ports          : {}", s.open_ports);
    println!("Closed ports        : {}", s.closed_ports);
    println!("Filtered ports      : {}", s.filtered_ports);
    println!("Scan duration       : {:?}", s.elapsed);
    println!("Started at          : {}", s.started_at);
    if s.open_ports == 0 {
        println!("No open ports found");
    }
}

/// Flatten newlines and cap at 60 characters for table display.
fn display_snippet(text: &str) -> String {
    let flat = text.trim().replace('\r', "").replace(['\n', '\t'], " ");
    if flat.len() > 60 {
        // Cleaned banners are ASCII, so byte and char offsets agree.
        format!("{}...", &flat[..60])
    } else {
        flat
    }
}

fn write_reports_json(path: &Path, reports: &[TargetReport]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, reports)?;
    Ok(())
}
