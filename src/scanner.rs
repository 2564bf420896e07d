use ::time::{format_description::well_known, OffsetDateTime};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::{self, Instant};

use crate::error::Result;
use crate::probe::probe_port;
use crate::shuffle::{shuffle, Lcg};
use crate::targets::expand_targets;
use crate::types::{ScanConfig, ScanOptions, ScanReport, ScanResult, ScanStatistics, TargetReport};

/// Scan every port in `config` against its host with a fixed pool of workers.
///
/// - Ports are optionally shuffled first with a seeded LCG.
/// - `max_concurrency` workers share one pre-loaded queue of ports; each worker
///   sleeps `delay_between` before every probe it takes.
/// - Statistics are updated under one mutex as results come in.
///
/// Results are returned in completion order. Per-port failures are data, not
/// errors; only an invalid configuration fails the call.
pub async fn scan(config: ScanConfig) -> Result<ScanReport> {
    let ScanConfig {
        host,
        mut ports,
        options,
    } = config.validated()?;
    let start = Instant::now();

    if options.randomize_order {
        let mut rng = match options.shuffle_seed {
            Some(seed) => Lcg::new(seed),
            None => Lcg::from_clock(),
        };
        shuffle(&mut ports, &mut rng);
    }

    let total = ports.len();
    let workers = options.max_concurrency.min(total);
    info!(
        "scanning {host}: {total} ports, {workers} workers, timeout {:?}",
        options.timeout
    );

    let stats = Arc::new(Mutex::new(ScanStatistics::new(total, now_rfc3339())));

    // Pre-load the whole queue, then drop the sender so workers stop once drained.
    let (port_tx, port_rx) = mpsc::channel::<u16>(total);
    for port in ports {
        if port_tx.send(port).await.is_err() {
            break;
        }
    }
    drop(port_tx);
    let port_rx = Arc::new(Mutex::new(port_rx));

    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<ScanResult>();
    let host: Arc<str> = Arc::from(host);
    let mut set = JoinSet::new();

    for _ in 0..workers {
        let port_rx = port_rx.clone();
        let result_tx = result_tx.clone();
        let stats = stats.clone();
        let host = host.clone();
        let options = options.clone();

        set.spawn(async move {
            loop {
                // Release the queue lock before probing so other workers can dequeue.
                let next = port_rx.lock().await.recv().await;
                let Some(port) = next else { break };

                if !options.delay_between.is_zero() {
                    time::sleep(options.delay_between).await;
                }

                let result = probe_port(&host, port, options.timeout).await;
                stats.lock().await.record(result.status);
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });
    }
    drop(result_tx);

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            warn!("scan worker for {host} ended abnormally: {e}");
        }
    }

    let mut results = Vec::with_capacity(total);
    while let Some(result) = result_rx.recv().await {
        results.push(result);
    }

    let mut stats = stats.lock().await.clone();
    stats.elapsed = start.elapsed();
    info!(
        "finished {host} in {:?}: {} open, {} closed, {} filtered",
        stats.elapsed, stats.open_ports, stats.closed_ports, stats.filtered_ports
    );

    Ok(ScanReport { results, stats })
}

/// Scan each host specifier independently, one after another.
///
/// CIDR specifiers are expanded into one report per address. A specifier that
/// fails to expand, or a host whose scan cannot start, produces an error report
/// for that target only; the remaining targets are still scanned.
pub async fn scan_targets(specs: &[String], ports: &[u16], options: &ScanOptions) -> Vec<TargetReport> {
    let mut reports = Vec::new();
    for spec in specs {
        let hosts = match expand_targets(spec) {
            Ok(hosts) => hosts,
            Err(e) => {
                warn!("skipping target {spec}: {e}");
                reports.push(TargetReport {
                    target: spec.clone(),
                    outcome: Err(e),
                });
                continue;
            }
        };

        for host in hosts {
            let config = ScanConfig::with_options(host.clone(), ports.to_vec(), options.clone());
            let outcome = scan(config).await;
            if let Err(e) = &outcome {
                warn!("scan of {host} failed: {e}");
            }
            reports.push(TargetReport {
                target: host,
                outcome,
            });
        }
    }
    reports
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
