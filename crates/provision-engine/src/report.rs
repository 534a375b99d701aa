use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::provisioner::{DownloadOutcome, FailurePolicy, ProvisionSummary};

#[derive(Debug, Clone, Serialize)]
struct RunReport<'a> {
    destination: &'a Path,
    skip_existing: bool,
    failure_policy: FailurePolicy,
    fetched_count: usize,
    total_bytes: u64,
    nothing_to_do: bool,
    outcomes: &'a [DownloadOutcome],
    ts: String,
}

/// Writes a pretty-printed JSON record of a finished provisioning run.
pub fn write_report(
    path: &Path,
    destination: &Path,
    skip_existing: bool,
    failure_policy: FailurePolicy,
    summary: &ProvisionSummary,
) -> anyhow::Result<()> {
    let report = RunReport {
        destination,
        skip_existing,
        failure_policy,
        fetched_count: summary.fetched_count,
        total_bytes: summary.total_bytes,
        nothing_to_do: summary.nothing_to_do(),
        outcomes: summary.outcomes.as_slice(),
        ts: now_utc_iso(),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
