pub mod domain;
pub mod store;

pub use domain::{ConfigDomain, ConfigKey};
pub use store::{ConfigMap, ConfigSchema, resolve_config, validate_config};
