use std::io;

use anyhow::Result;
use clap::Parser;
use provision_cli::args::SelectSchemeArgs;
use provision_cli::exit_code_for;
use provision_cli::logging::init_logging;
use provision_contracts::schemes::{ExclusionRuleset, SchemeReport, SchemeSelector};

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("select-scheme error: {err:#}");
            std::process::exit(exit_code_for(&err));
        }
    }
}

fn run() -> Result<i32> {
    let args = SelectSchemeArgs::parse();
    init_logging(args.verbose, false);

    let rules = args
        .rules
        .as_deref()
        .map(ExclusionRuleset::from_json_file)
        .transpose()?;
    let selector = SchemeSelector::new(rules);

    let report = SchemeReport::from_reader(io::stdin().lock())?;
    let selection =
        selector.select_reported(&report, Some(args.candidate.as_str()), &mut io::stderr())?;

    for name in &selection.rejected {
        if let Some(hit) = selector.rules.matching_rule(name) {
            tracing::debug!(
                scheme = %name,
                kind = hit.kind.as_str(),
                rule = hit.rule,
                "excluded scheme"
            );
        }
    }
    if selection.from_candidate {
        tracing::debug!(scheme = %selection.scheme, "selected explicit candidate");
    }

    println!("{}", selection.scheme);
    Ok(0)
}
