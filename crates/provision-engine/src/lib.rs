pub mod env;
pub mod fetch;
pub mod provisioner;
pub mod report;
pub mod token;

pub use fetch::{remove_staging_files, FetchBlob, FetchError, FetchRequest, HubFetcher};
pub use provisioner::{
    DownloadOutcome, FailurePolicy, ModelProvisioner, ProvisionRequest, ProvisionSummary,
};
pub use report::write_report;
pub use token::{resolve_token, ResolvedToken, TokenSource};
