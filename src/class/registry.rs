//! Process-wide class name -> class snapshot registry.
//!
//! Loading needs to go from a stored class name back to a constructor. Any
//! class an object graph touches during `save` is registered automatically;
//! a fresh process must call [`register_class`] before loading.

use std::collections::HashMap;
use std::ptr;
use std::sync::RwLock;

use lazy_static::lazy_static;

use crate::class::ObjectClass;
use crate::core::{BaseError, Result};

lazy_static! {
    static ref CLASS_REGISTRY: RwLock<HashMap<&'static str, &'static ObjectClass>> =
        RwLock::new(HashMap::new());
}

/// Registers `class` under its name. Registering the same snapshot twice is
/// a no-op; a different snapshot under a taken name is an error.
pub fn register_class(class: &'static ObjectClass) -> Result<()> {
    {
        let registry = CLASS_REGISTRY.read()?;
        if let Some(existing) = registry.get(class.name()) {
            return check_same(existing, class);
        }
    }
    let mut registry = CLASS_REGISTRY.write()?;
    match registry.get(class.name()) {
        Some(existing) => check_same(existing, class),
        None => {
            registry.insert(class.name(), class);
            Ok(())
        }
    }
}

pub fn lookup_class(name: &str) -> Result<&'static ObjectClass> {
    CLASS_REGISTRY
        .read()?
        .get(name)
        .copied()
        .ok_or_else(|| BaseError::UnknownClass(name.to_string()))
}

/// Registered class names, sorted.
pub fn registered_classes() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = match CLASS_REGISTRY.read() {
        Ok(registry) => registry.keys().copied().collect(),
        Err(poisoned) => poisoned.into_inner().keys().copied().collect(),
    };
    names.sort_unstable();
    names
}

fn check_same(existing: &'static ObjectClass, class: &'static ObjectClass) -> Result<()> {
    if ptr::eq(existing, class) {
        Ok(())
    } else {
        Err(BaseError::DuplicateClass(class.name().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref REGISTERED: ObjectClass = ObjectClass::builder("RegistryProbe").build();
        static ref IMPOSTOR: ObjectClass = ObjectClass::builder("RegistryProbe").build();
    }

    #[test]
    fn test_register_and_lookup() {
        register_class(&REGISTERED).unwrap();
        register_class(&REGISTERED).unwrap();
        let found = lookup_class("RegistryProbe").unwrap();
        assert!(ptr::eq(found, &*REGISTERED));
        assert!(registered_classes().contains(&"RegistryProbe"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        register_class(&REGISTERED).unwrap();
        assert!(matches!(
            register_class(&IMPOSTOR),
            Err(BaseError::DuplicateClass(name)) if name == "RegistryProbe"
        ));
    }

    #[test]
    fn test_unknown_class() {
        assert!(matches!(
            lookup_class("NeverRegistered"),
            Err(BaseError::UnknownClass(_))
        ));
    }
}
