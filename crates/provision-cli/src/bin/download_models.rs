use std::io;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use provision_cli::args::DownloadModelsArgs;
use provision_cli::interrupt::install_interrupt_flag;
use provision_cli::logging::init_logging;
use provision_cli::{exit_code_for, print_catalog};
use provision_contracts::models::ModelCatalog;
use provision_engine::{
    remove_staging_files, resolve_token, write_report, FailurePolicy, HubFetcher,
    ModelProvisioner, ProvisionRequest,
};

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("download-models error: {err:#}");
            std::process::exit(exit_code_for(&err));
        }
    }
}

fn run() -> Result<i32> {
    let args = DownloadModelsArgs::parse();
    init_logging(args.verbose, args.quiet);

    let catalog = ModelCatalog::default();
    if args.list {
        print_catalog(&catalog, &mut io::stdout().lock())?;
        return Ok(0);
    }

    let Some(models) = args.models.as_deref() else {
        bail!("--models is required unless --list is provided");
    };
    let identifiers = catalog.normalize_request(models)?;
    tracing::debug!(?identifiers, "normalized model request");

    let token = resolve_token(args.token.as_deref());
    let failure_policy = if args.keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::FailFast
    };

    let staging_dir = args.directory.clone();
    let interrupted = install_interrupt_flag(move || {
        remove_staging_files(&staging_dir);
    })?;
    let fetcher = HubFetcher::new(Arc::clone(&interrupted))?;
    tracing::debug!(endpoint = fetcher.endpoint(), "using hub endpoint");
    let provisioner = ModelProvisioner::new(catalog, fetcher, interrupted);

    let request = ProvisionRequest {
        destination: args.directory.clone(),
        identifiers,
        skip_existing: args.skip_existing,
        token: token.map(|resolved| resolved.value),
        failure_policy,
    };
    let summary = provisioner.provision(&request)?;

    if let Some(path) = args.report.as_deref() {
        write_report(
            path,
            &request.destination,
            request.skip_existing,
            request.failure_policy,
            &summary,
        )
        .with_context(|| format!("write run report {}", path.display()))?;
    }

    summary.ensure_complete()?;
    Ok(0)
}
