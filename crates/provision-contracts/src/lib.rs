pub mod error;
pub mod models;
pub mod schemes;

pub use error::{ProvisionError, EXIT_INTERRUPTED};
