mod catalog;

pub use catalog::{ModelCatalog, ModelEntry, ALL_MODELS};
