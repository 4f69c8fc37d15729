use lazy_static::lazy_static;

use crate::class::ObjectClass;
use crate::config::{ConfigDomain, ConfigKey};
use crate::core::Value;

pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

lazy_static! {
    /// Root of every class hierarchy.
    pub static ref BASE_OBJECT: ObjectClass = ObjectClass::builder("BaseObject")
        .tag("object_type", "object")
        .tag("crate_version", CRATE_VERSION)
        .config(
            ConfigKey::new("warnings", "on", ConfigDomain::one_of(["on", "off"]))
                .doc("\"on\" emits deprecation notices for aliased tags, \"off\" silences them"),
        )
        .config(
            ConfigKey::new("backend:parallel", Value::Null, parallel_backends())
                .doc("backend used by higher level code to broadcast work; null runs sequentially"),
        )
        .config(
            ConfigKey::new("backend:parallel:params", Value::Null, ConfigDomain::MapOrNull)
                .doc("extra parameters passed to the parallel backend"),
        )
        .config(
            ConfigKey::new("display", "diagram", ConfigDomain::one_of(["diagram", "text"]))
                .doc("how interactive front ends render the object"),
        )
        .config(
            ConfigKey::new("print_changed_only", true, ConfigDomain::Bool)
                .doc("when true, the textual form lists only parameters that differ from their defaults"),
        )
        .build();

    /// Base class of fittable objects.
    pub static ref BASE_ESTIMATOR: ObjectClass = ObjectClass::builder("BaseEstimator")
        .extends(&BASE_OBJECT)
        .tag("object_type", "estimator")
        .build();
}

fn parallel_backends() -> ConfigDomain {
    ConfigDomain::OneOf(vec![
        Value::Null,
        Value::from("loky"),
        Value::from("multiprocessing"),
        Value::from("threading"),
        Value::from("joblib"),
        Value::from("dask"),
        Value::from("ray"),
    ])
}
