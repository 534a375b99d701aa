use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_MODELS_DIR: &str = "assets/models";

/// Choose a buildable Xcode scheme from `xcodebuild -list -json` output on stdin.
#[derive(Debug, Parser)]
#[command(name = "select-scheme", version)]
pub struct SelectSchemeArgs {
    /// Preferred scheme name to select when present
    #[arg(long, default_value = "")]
    pub candidate: String,

    /// JSON exclusion ruleset (`exact`, `prefixes`, `contains`) replacing the defaults
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Download GGUF models from the Hugging Face Hub.
#[derive(Debug, Parser)]
#[command(name = "download-models", version)]
pub struct DownloadModelsArgs {
    /// Destination directory for downloaded models
    #[arg(long, default_value = DEFAULT_MODELS_DIR)]
    pub directory: PathBuf,

    /// Comma separated model identifiers or the literal 'all'
    #[arg(long)]
    pub models: Option<String>,

    /// Skip downloads when the destination file already exists
    #[arg(long)]
    pub skip_existing: bool,

    /// Hub token; defaults to HUGGINGFACE_TOKEN or HF_TOKEN when unset
    #[arg(long)]
    pub token: Option<String>,

    /// List available model identifiers and exit
    #[arg(long)]
    pub list: bool,

    /// Keep downloading remaining models after one fails
    #[arg(long)]
    pub keep_going: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}
