use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::blocking::Client as HttpClient;
use thiserror::Error;

use crate::env::non_empty_env;

pub const DEFAULT_HUB_ENDPOINT: &str = "https://huggingface.co";
pub const HUB_ENDPOINT_ENV: &str = "HF_ENDPOINT";

const CHUNK_SIZE: usize = 32 * 1024;
const INCOMPLETE_SUFFIX: &str = "incomplete";
const ERROR_BODY_MAX_CHARS: usize = 512;

#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub repository: &'a str,
    pub filename: &'a str,
    pub destination: &'a Path,
    pub token: Option<&'a str>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transfer interrupted")]
    Interrupted,
    #[error(transparent)]
    Transfer(#[from] anyhow::Error),
}

/// Retrieves one named file of a registry repository into a local directory.
///
/// Implementations write `destination/filename` and return the path of the
/// written file. They do not retry.
pub trait FetchBlob {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<PathBuf, FetchError>;
}

/// Downloads files from a Hugging Face compatible hub over HTTPS.
pub struct HubFetcher {
    endpoint: String,
    http: HttpClient,
    interrupted: Arc<AtomicBool>,
}

impl HubFetcher {
    pub fn new(interrupted: Arc<AtomicBool>) -> anyhow::Result<Self> {
        let endpoint = non_empty_env(HUB_ENDPOINT_ENV)
            .unwrap_or_else(|| DEFAULT_HUB_ENDPOINT.to_string());
        Self::with_endpoint(&endpoint, interrupted)
    }

    pub fn with_endpoint(endpoint: &str, interrupted: Arc<AtomicBool>) -> anyhow::Result<Self> {
        let http = HttpClient::builder()
            .timeout(None::<Duration>)
            .build()
            .context("create http client")?;
        Ok(Self {
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
            http,
            interrupted,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn file_url(&self, repository: &str, filename: &str) -> String {
        format!(
            "{}/{}/resolve/main/{}",
            self.endpoint,
            repository.trim_matches('/'),
            filename
        )
    }

    fn download(
        &self,
        url: &str,
        request: &FetchRequest<'_>,
        staging: &Path,
    ) -> Result<u64, FetchError> {
        let mut builder = self.http.get(url);
        if let Some(token) = request.token {
            builder = builder.bearer_auth(token);
        }
        let mut response = builder
            .send()
            .with_context(|| format!("request {url}"))?;
        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(anyhow!(
                "hub download failed ({code}) for {url}: {}",
                truncate_text(&body, ERROR_BODY_MAX_CHARS)
            )
            .into());
        }

        let mut file = File::create(staging)
            .with_context(|| format!("create staging file {}", staging.display()))?;
        let mut written = 0u64;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            if self.interrupted.load(Ordering::SeqCst) {
                return Err(FetchError::Interrupted);
            }
            let read = response.read(&mut buffer).context("read download chunk")?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])
                .context("write download chunk")?;
            written += read as u64;
        }
        file.flush().context("flush staging file")?;
        Ok(written)
    }
}

impl FetchBlob for HubFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<PathBuf, FetchError> {
        let url = self.file_url(request.repository, request.filename);
        let target = request.destination.join(request.filename);
        let staging = request
            .destination
            .join(format!("{}.{INCOMPLETE_SUFFIX}", request.filename));

        if let Err(err) = self.download(&url, request, &staging) {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }

        fs::rename(&staging, &target).with_context(|| {
            format!(
                "move {} into place at {}",
                staging.display(),
                target.display()
            )
        })?;
        tracing::debug!(url = %url, path = %target.display(), "hub file stored");
        Ok(target)
    }
}

/// Deletes leftover `*.incomplete` staging files in `directory`.
///
/// Used when a run is torn down without unwinding through [`HubFetcher`].
/// Returns how many files were removed.
pub fn remove_staging_files(directory: &Path) -> usize {
    let Ok(entries) = fs::read_dir(directory) else {
        return 0;
    };
    let suffix = format!(".{INCOMPLETE_SUFFIX}");
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_staging = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&suffix));
        if is_staging && path.is_file() && fs::remove_file(&path).is_ok() {
            tracing::debug!(path = %path.display(), "removed staging file");
            removed += 1;
        }
    }
    removed
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
