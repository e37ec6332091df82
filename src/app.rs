use anyhow::{Context, Result, bail};
use crossbeam_channel::unbounded;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::output::{self, OutputFormat};
use crate::report::{self, RepoReport};
use crate::scan::{self, RepoResult};

/// Merges positional locators with the optional input file. Blank lines and
/// `#` comments in the file are ignored; a missing file is an error.
pub fn collect_locators(args: &[String], input_file: Option<&Path>) -> Result<Vec<String>> {
    let mut locators: Vec<String> = args.to_vec();

    if let Some(path) = input_file {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        for line in contents.lines() {
            let line = line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                locators.push(line.to_string());
            }
        }
    }

    if locators.is_empty() {
        bail!("No repositories specified; pass locators as arguments or via --input-file");
    }

    Ok(locators)
}

/// Scans every locator on a fixed pool of worker threads. Workers share
/// nothing: each takes indexed jobs from one channel and sends back
/// self-contained results on another, so output order is the input order
/// no matter which repository finishes first.
pub fn scan_all(locators: &[String], jobs: u32, clone_timeout: Duration) -> Vec<RepoResult> {
    let (job_tx, job_rx) = unbounded::<(usize, String)>();
    let (result_tx, result_rx) = unbounded::<(usize, RepoResult)>();

    for (index, locator) in locators.iter().enumerate() {
        let _ = job_tx.send((index, locator.clone()));
    }
    drop(job_tx);

    let worker_count = (jobs as usize).min(locators.len()).max(1);
    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let job_rx = job_rx.clone();
        let result_tx = result_tx.clone();
        handles.push(std::thread::spawn(move || {
            for (index, locator) in job_rx.iter() {
                let result = scan::scan_repository(&locator, clone_timeout);
                if result_tx.send((index, result)).is_err() {
                    // Receiver dropped, stop processing
                    return;
                }
            }
        }));
    }
    drop(result_tx);

    let mut slots: Vec<Option<RepoResult>> = locators.iter().map(|_| None).collect();
    for (index, result) in result_rx.iter() {
        slots[index] = Some(result);
    }
    for handle in handles {
        let _ = handle.join();
    }

    // A slot left empty means its worker died; treat it like a failed repo
    slots.into_iter().map(|slot| slot.unwrap_or_else(RepoResult::failed)).collect()
}

/// Full run: resolve the output format up front, scan in parallel, reduce
/// each named repository to a report, write once at the end.
pub fn run(
    locators: &[String],
    output_path: &Path,
    format: Option<OutputFormat>,
    config: &Config,
) -> Result<()> {
    let format = OutputFormat::resolve(output_path, format)?;
    let clone_timeout = Duration::from_secs(config.clone_timeout_secs);

    info!(
        "Scanning {} repositories using {} parallel jobs",
        locators.len(),
        config.jobs
    );
    let results = scan_all(locators, config.jobs, clone_timeout);

    let mut reports: Vec<RepoReport> = Vec::new();
    for (locator, result) in locators.iter().zip(results) {
        let Some(name) = result.name else {
            continue;
        };
        let total = result.functions.len();
        let report = report::build_report(
            name,
            result.functions,
            config.min_size,
            config.top as usize,
        );
        info!(
            "{}: {} functions found, {} at or above {} lines",
            locator, total, report.summary.count, config.min_size
        );
        for (rank, func) in report.functions.iter().enumerate() {
            info!(
                "  {}. {} ({} lines) - {}",
                rank + 1,
                func.name,
                func.size,
                func.path.display()
            );
        }
        reports.push(report);
    }

    if reports.is_empty() {
        warn!("No results to write; check the repository paths/URLs");
        return Ok(());
    }

    output::write_reports(output_path, format, &reports)
}
