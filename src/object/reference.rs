use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Result, Value};
use crate::object::{BaseObject, ObjectExt};
use crate::serialization::ObjectRecord;

/// Shared handle to a nested parametric object.
///
/// Handles are immutable; changing a nested object's parameters replaces the
/// handle (see `ObjectExt::set_params`). Equality is structural.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn BaseObject>);

impl ObjectRef {
    pub fn new<T: BaseObject>(object: T) -> Self {
        Self(Arc::new(object))
    }

    pub fn from_boxed(object: Box<dyn BaseObject>) -> Self {
        Self(Arc::from(object))
    }

    pub fn downcast_ref<T: BaseObject>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Independent, unfitted copy of the referenced object.
    pub fn deep_clone(&self) -> Result<Self> {
        Ok(Self::from_boxed(self.0.clone_boxed()?))
    }

    /// Whether both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for ObjectRef {
    type Target = dyn BaseObject;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.equals(other.0.as_base())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&repr(self.as_base()))
    }
}

/// `Name(param=value, ...)`. With `print_changed_only` on, parameters equal
/// to their defaults are left out.
pub fn repr(object: &dyn BaseObject) -> String {
    let changed_only = object
        .get_config()
        .get("print_changed_only")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    let defaults = object.get_param_defaults();
    let params = object
        .params()
        .into_iter()
        .filter(|(name, value)| !changed_only || defaults.get(name) != Some(value))
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({params})", object.class().name())
}

impl Serialize for ObjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ObjectRecord::capture(self.as_base())
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let record = ObjectRecord::deserialize(deserializer)?;
        record.restore().map(Self::from_boxed).map_err(D::Error::custom)
    }
}
