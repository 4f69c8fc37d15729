// ============================================================================
// estibase: tags, configs, parameters and persistence for estimator objects
// ============================================================================

extern crate self as estibase;

pub mod class;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod object;
pub mod serialization;
pub mod tags;
pub mod testing;

pub use class::{
    BASE_ESTIMATOR, BASE_OBJECT, ClassBuilder, ObjectClass, lookup_class, register_class,
    registered_classes,
};
pub use config::{ConfigDomain, ConfigKey, ConfigMap};
pub use core::{BaseError, Result, Value, ValueMap};
pub use diagnostics::{DeprecationNotice, capture_deprecations};
pub use object::{
    BaseEstimator, BaseObject, FromParams, ObjectExt, ObjectRef, Overrides, ParamType,
    TypedObjectExt, safe_clone, set_random_state,
};
pub use serialization::{
    ArchiveHandle, SaveOptions, Saved, SerializationFormat, SerializedObject, load_from_path,
    load_from_reader, load_from_serial,
};
pub use tags::{AliasTable, TagMap};

pub use estibase_derive::BaseObject;

/// Everything needed to declare and use base objects.
pub mod prelude {
    pub use crate::{
        AliasTable, BASE_ESTIMATOR, BASE_OBJECT, BaseEstimator, BaseObject, ConfigDomain,
        ConfigKey, ObjectClass, ObjectExt, ObjectRef, Overrides, SerializationFormat,
        TypedObjectExt, Value, ValueMap, values,
    };
}

#[doc(hidden)]
pub mod __private {
    use crate::class::ObjectClass;
    use crate::core::{BaseError, Result, ValueMap};

    pub fn reject_unknown(params: &ValueMap, allowed: &[&str], class: &ObjectClass) -> Result<()> {
        match params.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(key) => Err(BaseError::InvalidParameter {
                param: key.clone(),
                class: class.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn missing_parameter(param: &str, class: &ObjectClass) -> BaseError {
        BaseError::MissingParameter {
            param: param.to_string(),
            class: class.name().to_string(),
        }
    }
}
