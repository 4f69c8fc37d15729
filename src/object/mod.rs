//! The base object protocol.
//!
//! [`BaseObject`] is the object-safe surface every parametric object
//! implements (normally through `#[derive(BaseObject)]`). [`FromParams`] is
//! the construction half that needs `Sized`. All user-facing operations live
//! in the [`ObjectExt`], [`TypedObjectExt`] and [`BaseEstimator`] traits,
//! which are implemented for every base object.

pub mod estimator;
pub mod ext;
pub mod param_type;
pub mod random_state;
pub mod reference;

use std::any::Any;
use std::fmt;

use crate::class::ObjectClass;
use crate::config::ConfigMap;
use crate::core::{BaseError, Result, ValueMap};
use crate::tags::TagMap;

pub use estimator::BaseEstimator;
pub use ext::{ObjectExt, TypedObjectExt};
pub use param_type::ParamType;
pub use random_state::{safe_clone, set_random_state};
pub use reference::ObjectRef;

/// Instance-level tag and config overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub tags: TagMap,
    pub config: ConfigMap,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.config.is_empty()
    }
}

pub trait BaseObject: fmt::Debug + Send + Sync + 'static {
    fn class(&self) -> &'static ObjectClass;

    /// Shallow constructor parameters, by name.
    fn params(&self) -> ValueMap;

    /// Writes the given parameters. Either every entry is applied or none is.
    fn apply_params(&mut self, params: ValueMap) -> Result<()>;

    fn overrides(&self) -> &Overrides;
    fn overrides_mut(&mut self) -> &mut Overrides;

    /// Declared default of every parameter that has one.
    fn get_param_defaults(&self) -> ValueMap {
        self.class().param_defaults()
    }

    /// Fitted attributes that are currently set.
    fn fitted_state(&self) -> ValueMap {
        ValueMap::new()
    }

    fn restore_fitted_state(&mut self, state: ValueMap) -> Result<()> {
        match state.into_keys().next() {
            Some(name) => Err(BaseError::InvalidParameter {
                param: name,
                class: self.class().name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Re-runs construction with the current parameters, dropping fitted
    /// state and any overrides the constructor does not set again.
    fn reset(&mut self) -> Result<()>;

    /// New instance of the same runtime type built from `params`.
    fn rebuild(&self, params: ValueMap) -> Result<Box<dyn BaseObject>>;

    fn as_base(&self) -> &dyn BaseObject;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

pub trait FromParams: BaseObject + Sized {
    /// Builds an instance from named parameters. Missing parameters take
    /// their declared defaults.
    fn from_params(params: ValueMap) -> Result<Self>;

    fn param_names() -> Vec<&'static str>;

    fn param_defaults() -> ValueMap;

    /// Parameter sets for test instances.
    fn test_params() -> Vec<ValueMap> {
        vec![ValueMap::new()]
    }
}
