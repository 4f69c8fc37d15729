pub mod base;
pub mod object_class;
pub mod registry;

pub use base::{BASE_ESTIMATOR, BASE_OBJECT, CRATE_VERSION};
pub use object_class::{ClassBuilder, ClassLayer, Constructor, ObjectClass};
pub use registry::{lookup_class, register_class, registered_classes};
