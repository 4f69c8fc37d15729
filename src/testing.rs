//! Conformance checks for base object implementations.

use crate::core::{BaseError, Result, ValueMap};
use crate::object::{BaseObject, FromParams, ObjectExt, Overrides, TypedObjectExt};
use crate::serialization::{SerializationFormat, load_from_serial};

/// Runs the base object contract against every test instance of `T`:
/// parameter names match the declaration, clones compare equal, `reset` is
/// idempotent and every available codec round-trips the object.
pub fn check_object_contract<T: FromParams>() -> Result<()> {
    let (instances, names) = T::create_test_instances_and_names()?;
    let mut declared: Vec<String> = T::param_names().into_iter().map(String::from).collect();
    declared.sort();

    for (instance, name) in instances.iter().zip(&names) {
        if instance.get_param_names() != declared {
            return Err(violation(name, "parameter names differ from the declared ones"));
        }

        let clone = instance.clone_object()?;
        if !clone.equals(instance.as_base()) {
            return Err(violation(name, "clone is not equal to the original"));
        }

        let mut reset = instance.clone_object()?;
        reset.reset()?;
        let once = snapshot(&reset);
        reset.reset()?;
        if snapshot(&reset) != once {
            return Err(violation(name, "reset is not idempotent"));
        }

        for format in SerializationFormat::ALL {
            if !format.is_available() {
                continue;
            }
            let saved = instance.save(None, format)?;
            let Some(serial) = saved.as_serial() else {
                return Err(violation(name, "in-memory save returned an archive"));
            };
            let loaded = load_from_serial(&serial.bytes)?;
            if !loaded.equals(instance.as_base()) || loaded.fitted_state() != instance.fitted_state() {
                return Err(violation(
                    name,
                    &format!("{format} round-trip changed the object"),
                ));
            }
        }
    }
    Ok(())
}

fn snapshot(object: &dyn BaseObject) -> (ValueMap, ValueMap, Overrides) {
    (object.params(), object.fitted_state(), object.overrides().clone())
}

fn violation(name: &str, reason: &str) -> BaseError {
    BaseError::ContractViolation {
        class: name.to_string(),
        reason: reason.to_string(),
    }
}
