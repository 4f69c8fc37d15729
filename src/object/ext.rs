use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{ConfigMap, resolve_config};
use crate::core::{BaseError, Result, Value, ValueMap, deep_clone_map};
use crate::object::{BaseObject, FromParams, ObjectRef, set_random_state};
use crate::serialization::{self, SaveOptions, Saved, SerializationFormat};
use crate::tags::{TagMap, lookup_tag, merge_tags, validate_tag_name};

/// Tag, config, parameter and persistence operations shared by every base
/// object, including `dyn BaseObject`.
pub trait ObjectExt: BaseObject {
    fn get_class_tags(&self) -> TagMap {
        self.class().get_class_tags()
    }

    /// Like [`ObjectClass::get_class_tag`](crate::ObjectClass::get_class_tag),
    /// with notices gated by this instance's `warnings` config.
    fn get_class_tag(&self, name: &str, default: Option<Value>, raise_error: bool) -> Result<Value> {
        if warnings_enabled(self) {
            self.class().aliases().warn([name]);
        }
        lookup_tag(&self.get_class_tags(), name, default, raise_error)
    }

    /// Class tags with the instance's dynamic tags on top.
    fn get_tags(&self) -> TagMap {
        let class = self.class();
        let merged = merge_tags(&class.get_class_tags(), &self.overrides().tags);
        class.aliases().complete(&merged)
    }

    fn get_tag(&self, name: &str, default: Option<Value>, raise_error: bool) -> Result<Value> {
        if warnings_enabled(self) {
            self.class().aliases().warn([name]);
        }
        lookup_tag(&self.get_tags(), name, default, raise_error)
    }

    /// Stores `tags` as dynamic tags, mirrored across alias pairs.
    fn set_tags(&mut self, tags: TagMap) -> Result<&mut Self> {
        for name in tags.keys() {
            validate_tag_name(name)?;
        }
        let aliases = self.class().aliases();
        if warnings_enabled(&*self) {
            aliases.warn(tags.keys().map(String::as_str));
        }
        let completed = aliases.complete(&tags);
        self.overrides_mut().tags.extend(completed);
        Ok(self)
    }

    /// Copies tags of `source` into this object's dynamic tags. Names that
    /// `source` does not have are skipped.
    fn clone_tags(&mut self, source: &dyn BaseObject, names: Option<&[&str]>) -> Result<&mut Self> {
        let source_tags = source.get_tags();
        let selected: TagMap = match names {
            None => source_tags,
            Some(names) => names
                .iter()
                .filter_map(|name| {
                    source_tags
                        .get(*name)
                        .map(|value| (name.to_string(), value.clone()))
                })
                .collect(),
        };
        self.set_tags(selected)
    }

    fn get_config(&self) -> ConfigMap {
        resolve_config(self.class().config_schema(), &self.overrides().config)
    }

    /// Validates every entry before storing any of them.
    fn set_config(&mut self, config: ConfigMap) -> Result<&mut Self> {
        self.class().validate_config(&config)?;
        self.overrides_mut().config.extend(config);
        Ok(self)
    }

    /// Parameters by name. With `deep`, parameters of nested objects are
    /// added as `component__param`.
    fn get_params(&self, deep: bool) -> ValueMap {
        let shallow = self.params();
        if !deep {
            return shallow;
        }
        let mut params = ValueMap::new();
        for (name, value) in shallow {
            if let Value::Object(nested) = &value {
                for (sub_name, sub_value) in nested.get_params(true) {
                    params.insert(format!("{name}__{sub_name}"), sub_value);
                }
            }
            params.insert(name, value);
        }
        params
    }

    fn get_param_names(&self) -> Vec<String> {
        self.params().into_keys().collect()
    }

    /// Sets parameters and resets the object. `component__param` keys are
    /// routed into the nested object, which is rebuilt with the new values.
    fn set_params(&mut self, params: ValueMap) -> Result<&mut Self> {
        if params.is_empty() {
            return Ok(self);
        }
        let class = self.class().name();
        let current = self.params();

        let mut shallow = ValueMap::new();
        let mut nested: BTreeMap<String, ValueMap> = BTreeMap::new();
        for (key, value) in params {
            match key.split_once("__") {
                Some((component, sub_key)) => {
                    nested
                        .entry(component.to_string())
                        .or_default()
                        .insert(sub_key.to_string(), value);
                }
                None => {
                    shallow.insert(key, value);
                }
            }
        }

        for (component, updates) in nested {
            let target = shallow.get(&component).or_else(|| current.get(&component));
            let Some(Value::Object(object)) = target else {
                let first = updates.keys().next().cloned().unwrap_or_default();
                return Err(BaseError::InvalidParameter {
                    param: format!("{component}__{first}"),
                    class: class.to_string(),
                });
            };
            let mut rebuilt = object.clone_boxed()?;
            rebuilt.set_params(updates)?;
            shallow.insert(component, Value::Object(ObjectRef::from_boxed(rebuilt)));
        }

        self.apply_params(shallow)?;
        self.reset()?;
        Ok(self)
    }

    /// Same runtime type and structurally equal shallow parameters.
    fn equals(&self, other: &dyn BaseObject) -> bool {
        self.as_any().type_id() == other.as_any().type_id() && self.params() == other.params()
    }

    /// Unfitted copy built from deep-cloned parameters. Config overrides are
    /// carried over; dynamic tags are whatever construction sets.
    fn clone_boxed(&self) -> Result<Box<dyn BaseObject>> {
        let mut clone = self.rebuild(deep_clone_map(&self.params())?)?;
        clone
            .overrides_mut()
            .config
            .extend(self.overrides().config.clone());
        Ok(clone)
    }

    fn save(&self, path: Option<&Path>, format: SerializationFormat) -> Result<Saved> {
        self.save_with(path, &SaveOptions::new().format(format))
    }

    fn save_with(&self, path: Option<&Path>, options: &SaveOptions) -> Result<Saved> {
        serialization::save_object(self.as_base(), path, options)
    }
}

impl<T: BaseObject + ?Sized> ObjectExt for T {}

/// Operations that produce a concrete `Self`.
pub trait TypedObjectExt: FromParams {
    fn clone_object(&self) -> Result<Self> {
        downcast_boxed(self.clone_boxed()?)
    }

    /// Clone, then reseed every `random_state` parameter from `seed`.
    fn clone_with_random_state(&self, seed: Option<u64>) -> Result<Self> {
        let mut clone = self.clone_object()?;
        if let Some(seed) = seed {
            set_random_state(&mut clone, seed)?;
        }
        Ok(clone)
    }

    /// Parameter sets for test instances; never empty.
    fn get_test_params() -> Vec<ValueMap> {
        let params = Self::test_params();
        if params.is_empty() {
            vec![ValueMap::new()]
        } else {
            params
        }
    }

    fn create_test_instance() -> Result<Self> {
        let params = Self::get_test_params().into_iter().next().unwrap_or_default();
        Self::from_params(params)
    }

    /// One instance per test parameter set, named `Class` when there is a
    /// single set and `Class-0`, `Class-1`, ... otherwise.
    fn create_test_instances_and_names() -> Result<(Vec<Self>, Vec<String>)> {
        let param_sets = Self::get_test_params();
        let single = param_sets.len() == 1;
        let mut instances = Vec::with_capacity(param_sets.len());
        let mut names = Vec::with_capacity(param_sets.len());
        for (i, params) in param_sets.into_iter().enumerate() {
            let instance = Self::from_params(params)?;
            let class = instance.class().name();
            names.push(if single {
                class.to_string()
            } else {
                format!("{class}-{i}")
            });
            instances.push(instance);
        }
        Ok((instances, names))
    }

    fn load_from_serial_as(bytes: &[u8]) -> Result<Self> {
        downcast_boxed(serialization::load_from_serial(bytes)?)
    }

    fn load_from_path_as(path: &Path) -> Result<Self> {
        downcast_boxed(serialization::load_from_path(path)?)
    }
}

impl<T: FromParams> TypedObjectExt for T {}

pub(crate) fn downcast_boxed<T: BaseObject>(object: Box<dyn BaseObject>) -> Result<T> {
    let found = object.class().name();
    object
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| {
            BaseError::TypeMismatch(format!(
                "expected {}, found {found}",
                std::any::type_name::<T>()
            ))
        })
}

fn warnings_enabled<T: BaseObject + ?Sized>(object: &T) -> bool {
    object.get_config().get("warnings") != Some(&Value::from("off"))
}
