use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use provision_contracts::models::ModelCatalog;
use provision_contracts::ProvisionError;
use serde::Serialize;

use crate::fetch::{FetchBlob, FetchError, FetchRequest};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// What to do with the rest of the queue after one download fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    FailFast,
    Continue,
}

#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub destination: PathBuf,
    /// Raw tokens as given by the caller; normalized against the catalog.
    pub identifiers: Vec<String>,
    pub skip_existing: bool,
    pub token: Option<String>,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadOutcome {
    Skipped {
        identifier: String,
        path: PathBuf,
        bytes: u64,
    },
    Fetched {
        identifier: String,
        path: PathBuf,
        bytes: u64,
    },
    Failed {
        identifier: String,
        error: String,
    },
}

impl DownloadOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Skipped { identifier, .. }
            | Self::Fetched { identifier, .. }
            | Self::Failed { identifier, .. } => identifier,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionSummary {
    pub outcomes: Vec<DownloadOutcome>,
    pub fetched_count: usize,
    pub total_bytes: u64,
}

impl ProvisionSummary {
    fn record(&mut self, outcome: DownloadOutcome) {
        if let DownloadOutcome::Fetched { bytes, .. } = &outcome {
            self.fetched_count += 1;
            self.total_bytes += bytes;
        }
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> Vec<&DownloadOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, DownloadOutcome::Failed { .. }))
            .collect()
    }

    /// True when nothing was transferred and nothing failed.
    pub fn nothing_to_do(&self) -> bool {
        self.fetched_count == 0 && self.failures().is_empty()
    }

    /// Turns recorded failures (continue policy) into a terminal error.
    pub fn ensure_complete(&self) -> Result<(), ProvisionError> {
        let failures = self.failures();
        if failures.is_empty() {
            return Ok(());
        }
        let identifiers = failures
            .iter()
            .map(|outcome| outcome.identifier())
            .collect::<Vec<&str>>()
            .join(", ");
        let reasons = failures
            .iter()
            .filter_map(|outcome| match outcome {
                DownloadOutcome::Failed { identifier, error } => {
                    Some(format!("{identifier}: {error}"))
                }
                _ => None,
            })
            .collect::<Vec<String>>()
            .join("; ");
        Err(ProvisionError::FetchFailed {
            identifier: identifiers,
            cause: anyhow!(
                "{} of {} downloads failed ({reasons})",
                failures.len(),
                self.outcomes.len()
            ),
        })
    }
}

pub struct ModelProvisioner<F: FetchBlob> {
    catalog: ModelCatalog,
    fetcher: F,
    interrupted: Arc<AtomicBool>,
}

impl<F: FetchBlob> ModelProvisioner<F> {
    pub fn new(catalog: ModelCatalog, fetcher: F, interrupted: Arc<AtomicBool>) -> Self {
        Self {
            catalog,
            fetcher,
            interrupted,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Validates the whole request before touching the filesystem, then
    /// processes identifiers in order. Under [`FailurePolicy::FailFast`] the
    /// first failed transfer aborts the remaining queue.
    pub fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionSummary, ProvisionError> {
        let identifiers = self.catalog.normalize(request.identifiers.as_slice())?;

        fs::create_dir_all(&request.destination)
            .map_err(|err| ProvisionError::io(&request.destination, err))?;

        let mut summary = ProvisionSummary::default();
        for identifier in identifiers {
            if self.interrupted.load(Ordering::SeqCst) {
                return Err(ProvisionError::Interrupted);
            }
            let Some(entry) = self.catalog.get(&identifier) else {
                return Err(ProvisionError::UnknownIdentifier {
                    identifiers: vec![identifier],
                });
            };

            let target = request.destination.join(&entry.filename);
            if request.skip_existing && target.exists() {
                let bytes = file_size(&target)?;
                tracing::info!("Skipping {} (already exists)", describe_file(&target, bytes));
                summary.record(DownloadOutcome::Skipped {
                    identifier,
                    path: target,
                    bytes,
                });
                continue;
            }

            tracing::info!(
                "Downloading {identifier} from {} -> {}",
                entry.repository,
                target.display()
            );
            let fetched = self.fetcher.fetch(&FetchRequest {
                repository: &entry.repository,
                filename: &entry.filename,
                destination: &request.destination,
                token: request.token.as_deref(),
            });
            match fetched {
                Ok(path) => {
                    let bytes = file_size(&path)?;
                    tracing::info!("Downloaded {}", describe_file(&path, bytes));
                    summary.record(DownloadOutcome::Fetched {
                        identifier,
                        path,
                        bytes,
                    });
                }
                Err(FetchError::Interrupted) => return Err(ProvisionError::Interrupted),
                Err(FetchError::Transfer(source)) => match request.failure_policy {
                    FailurePolicy::FailFast => {
                        return Err(ProvisionError::FetchFailed {
                            identifier,
                            cause: source,
                        })
                    }
                    FailurePolicy::Continue => {
                        tracing::warn!("Failed to download {identifier}: {source:#}");
                        summary.record(DownloadOutcome::Failed {
                            identifier,
                            error: format!("{source:#}"),
                        });
                    }
                },
            }
        }

        log_summary(&summary);
        Ok(summary)
    }
}

fn file_size(path: &Path) -> Result<u64, ProvisionError> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|err| ProvisionError::io(path, err))
}

pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

fn describe_file(path: &Path, bytes: u64) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    format!("{name} ({})", format_megabytes(bytes))
}

fn log_summary(summary: &ProvisionSummary) {
    if summary.fetched_count > 0 {
        tracing::info!(
            "Retrieved {} file(s) totalling {}:",
            summary.fetched_count,
            format_megabytes(summary.total_bytes)
        );
        for outcome in &summary.outcomes {
            if let DownloadOutcome::Fetched { path, bytes, .. } = outcome {
                tracing::info!("  - {}", describe_file(path, *bytes));
            }
        }
    } else if summary.nothing_to_do() {
        tracing::info!("No downloads required; all requested files are present.");
    }

    let failures = summary.failures();
    if !failures.is_empty() {
        tracing::warn!("{} download(s) failed", failures.len());
    }
}
