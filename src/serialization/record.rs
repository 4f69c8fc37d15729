use serde::{Deserialize, Serialize};

use crate::class::{CRATE_VERSION, lookup_class, register_class};
use crate::config::ConfigMap;
use crate::core::{Result, ValueMap};
use crate::object::{BaseObject, Overrides};
use crate::tags::TagMap;

/// Everything needed to bring an object back: its class name, constructor
/// parameters, fitted attributes and instance overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub class: String,
    pub params: ValueMap,
    #[serde(default)]
    pub fitted: ValueMap,
    #[serde(default)]
    pub tags: TagMap,
    #[serde(default)]
    pub config: ConfigMap,
}

impl ObjectRecord {
    /// Snapshot of `object`. Its class is registered so the record can be
    /// restored in this process.
    pub fn capture(object: &dyn BaseObject) -> Result<Self> {
        let class = object.class();
        register_class(class)?;
        let overrides = object.overrides();
        Ok(Self {
            class: class.name().to_string(),
            params: object.params(),
            fitted: object.fitted_state(),
            tags: overrides.tags.clone(),
            config: overrides.config.clone(),
        })
    }

    pub fn restore(self) -> Result<Box<dyn BaseObject>> {
        let class = lookup_class(&self.class)?;
        let mut object = class.construct(self.params)?;
        *object.overrides_mut() = Overrides {
            tags: self.tags,
            config: self.config,
        };
        object.restore_fitted_state(self.fitted)?;
        Ok(object)
    }
}

/// Content of the `_metadata` archive entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub class: String,
    pub crate_version: String,
}

impl ArchiveMetadata {
    pub fn for_class(class: &str) -> Self {
        Self {
            class: class.to_string(),
            crate_version: CRATE_VERSION.to_string(),
        }
    }
}
