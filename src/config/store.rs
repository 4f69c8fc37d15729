use std::collections::BTreeMap;

use crate::config::domain::ConfigKey;
use crate::core::{BaseError, Result, ValueMap};

/// Config name -> config value.
pub type ConfigMap = ValueMap;

/// Declared config keys of a class, by name.
pub type ConfigSchema = BTreeMap<String, ConfigKey>;

/// Checks every entry of `updates` against its declaration. Nothing is
/// written here; callers apply `updates` only after this returns `Ok`.
pub fn validate_config(schema: &ConfigSchema, updates: &ConfigMap) -> Result<()> {
    for (name, value) in updates {
        let key = schema
            .get(name)
            .ok_or_else(|| BaseError::UnknownConfig(name.clone()))?;
        if !key.accepts(value) {
            return Err(BaseError::InvalidConfigValue {
                key: name.clone(),
                value: value.to_string(),
                expected: key.domain.describe(),
            });
        }
    }
    Ok(())
}

/// Declared defaults with instance overrides on top.
pub fn resolve_config(schema: &ConfigSchema, overrides: &ConfigMap) -> ConfigMap {
    let mut config: ConfigMap = schema
        .iter()
        .map(|(name, key)| (name.clone(), key.default.clone()))
        .collect();
    config.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    config
}
