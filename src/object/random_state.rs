use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::{Result, Value, ValueMap};
use crate::object::{BaseObject, ObjectExt};

/// Reseeds every `random_state` parameter of `object`, nested ones
/// included, with values drawn from a generator seeded by `seed`.
///
/// Keys are visited in sorted order, so the same seed always yields the
/// same parameters.
pub fn set_random_state<T: BaseObject + ?Sized>(object: &mut T, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let updates: ValueMap = object
        .get_params(true)
        .into_keys()
        .filter(|key| key == "random_state" || key.ends_with("__random_state"))
        .map(|key| (key, Value::Int(rng.gen_range(0..i32::MAX as i64))))
        .collect();
    if !updates.is_empty() {
        object.set_params(updates)?;
    }
    Ok(())
}

/// Clone through the base object protocol.
pub fn safe_clone(object: &dyn BaseObject) -> Result<Box<dyn BaseObject>> {
    object.clone_boxed()
}
