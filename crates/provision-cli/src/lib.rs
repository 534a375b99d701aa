use std::io::Write;

use provision_contracts::models::ModelCatalog;
use provision_contracts::ProvisionError;

pub mod args;
pub mod interrupt;
pub mod logging;

/// Exit code for an error surfaced by either binary.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ProvisionError>()
        .map(ProvisionError::exit_code)
        .unwrap_or(1)
}

pub fn print_catalog<W: Write>(catalog: &ModelCatalog, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Available models:")?;
    for entry in catalog.list() {
        writeln!(
            out,
            "- {}: {} -> {}",
            entry.identifier, entry.repository, entry.filename
        )?;
    }
    Ok(())
}
