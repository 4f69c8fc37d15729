//! Immutable per-class snapshots.
//!
//! A class is declared once, usually inside a `lazy_static`, by listing its
//! parent and its own tags, config keys and alias table:
//!
//! ```
//! use estibase::{BASE_OBJECT, ObjectClass, Value};
//! use lazy_static::lazy_static;
//!
//! lazy_static! {
//!     static ref FORECASTER: ObjectClass = ObjectClass::builder("Forecaster")
//!         .extends(&BASE_OBJECT)
//!         .tag("requires_fh", true)
//!         .build();
//! }
//!
//! let object_type = FORECASTER.get_class_tag("object_type", None, true).unwrap();
//! assert_eq!(object_type, Value::from("object"));
//! ```
//!
//! The snapshot keeps the ordered list of layer contributions and the merged
//! result. Nothing is recomputed after `build`.

use std::fmt;

use crate::config::{ConfigKey, ConfigMap, ConfigSchema, resolve_config, validate_config};
use crate::core::{BaseError, Result, Value, ValueMap};
use crate::object::{BaseObject, FromParams};
use crate::tags::{AliasTable, TagMap, lookup_tag, merge_tags, validate_tag_name};

pub type Constructor = fn(ValueMap) -> Result<Box<dyn BaseObject>>;
pub type DefaultsFn = fn() -> ValueMap;
pub type TestParamsFn = fn() -> Vec<ValueMap>;

/// Tags declared by one class in a lineage.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLayer {
    pub class: &'static str,
    pub tags: TagMap,
}

pub struct ObjectClass {
    name: &'static str,
    layers: Vec<ClassLayer>,
    tags: TagMap,
    config: ConfigSchema,
    aliases: AliasTable,
    constructor: Option<Constructor>,
    param_defaults: Option<DefaultsFn>,
    test_params: Option<TestParamsFn>,
}

impl ObjectClass {
    pub fn builder(name: &'static str) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Class names from the root ancestor down to this class.
    pub fn lineage(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.class).collect()
    }

    /// Per-class tag declarations, root ancestor first.
    pub fn layers(&self) -> &[ClassLayer] {
        &self.layers
    }

    pub fn is_subclass_of(&self, other: &ObjectClass) -> bool {
        self.layers.iter().any(|layer| layer.class == other.name)
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Class tags of the whole lineage, most derived last, alias-completed.
    pub fn get_class_tags(&self) -> TagMap {
        self.tags.clone()
    }

    pub fn get_class_tag(
        &self,
        name: &str,
        default: Option<Value>,
        raise_error: bool,
    ) -> Result<Value> {
        if self.warnings_enabled() {
            self.aliases.warn([name]);
        }
        lookup_tag(&self.tags, name, default, raise_error)
    }

    pub fn config_schema(&self) -> &ConfigSchema {
        &self.config
    }

    /// Config name -> documentation, for every declared key.
    pub fn config_docs(&self) -> Vec<(&str, &str)> {
        self.config
            .values()
            .map(|key| (key.name.as_str(), key.doc.as_str()))
            .collect()
    }

    pub fn default_config(&self) -> ConfigMap {
        resolve_config(&self.config, &ConfigMap::new())
    }

    pub fn validate_config(&self, updates: &ConfigMap) -> Result<()> {
        validate_config(&self.config, updates)
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Builds a fresh instance of this class from named parameters.
    pub fn construct(&self, params: ValueMap) -> Result<Box<dyn BaseObject>> {
        let constructor = self
            .constructor
            .ok_or_else(|| BaseError::NotConstructible(self.name.to_string()))?;
        constructor(params)
    }

    pub fn param_defaults(&self) -> ValueMap {
        self.param_defaults.map(|f| f()).unwrap_or_default()
    }

    /// Parameter sets used to build test instances; never empty.
    pub fn get_test_params(&self) -> Vec<ValueMap> {
        let params = self.test_params.map(|f| f()).unwrap_or_default();
        if params.is_empty() {
            vec![ValueMap::new()]
        } else {
            params
        }
    }

    pub fn create_test_instance(&self) -> Result<Box<dyn BaseObject>> {
        let params = self
            .get_test_params()
            .into_iter()
            .next()
            .unwrap_or_default();
        self.construct(params)
    }

    fn warnings_enabled(&self) -> bool {
        self.config
            .get("warnings")
            .is_none_or(|key| key.default != Value::from("off"))
    }
}

impl fmt::Debug for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectClass")
            .field("name", &self.name)
            .field("lineage", &self.lineage())
            .field("tags", &self.tags)
            .field("config", &self.config.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases.len())
            .finish()
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Builder
// ============================================================================

pub struct ClassBuilder {
    name: &'static str,
    parent: Option<&'static ObjectClass>,
    tags: TagMap,
    config: Vec<ConfigKey>,
    aliases: Option<AliasTable>,
    constructor: Option<Constructor>,
    param_defaults: Option<DefaultsFn>,
    test_params: Option<TestParamsFn>,
}

impl ClassBuilder {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            parent: None,
            tags: TagMap::new(),
            config: Vec::new(),
            aliases: None,
            constructor: None,
            param_defaults: None,
            test_params: None,
        }
    }

    pub fn extends(mut self, parent: &'static ObjectClass) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn tag(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.tags.insert(name.to_string(), value.into());
        self
    }

    pub fn tags(mut self, tags: TagMap) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Declares a config key, replacing an inherited key of the same name.
    pub fn config(mut self, key: ConfigKey) -> Self {
        self.config.push(key);
        self
    }

    /// Replaces the inherited alias table.
    pub fn aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = Some(aliases);
        self
    }

    /// Makes the class constructible from named parameters as `T`.
    pub fn constructor<T>(mut self) -> Self
    where
        T: BaseObject + FromParams,
    {
        self.constructor = Some(construct_boxed::<T>);
        self.param_defaults = Some(T::param_defaults);
        self.test_params = Some(T::test_params);
        self
    }

    pub fn try_build(self) -> Result<ObjectClass> {
        for name in self.tags.keys() {
            validate_tag_name(name)?;
        }

        let aliases = match (self.aliases, self.parent) {
            (Some(own), _) => own,
            (None, Some(parent)) => parent.aliases.clone(),
            (None, None) => AliasTable::new(),
        };
        aliases.validate()?;

        let mut config = self
            .parent
            .map(|parent| parent.config.clone())
            .unwrap_or_default();
        for key in self.config {
            if !key.accepts(&key.default) {
                return Err(BaseError::InvalidConfigValue {
                    key: key.name.clone(),
                    value: key.default.to_string(),
                    expected: key.domain.describe(),
                });
            }
            config.insert(key.name.clone(), key);
        }

        let (mut layers, inherited) = match self.parent {
            Some(parent) => (parent.layers.clone(), parent.tags.clone()),
            None => (Vec::new(), TagMap::new()),
        };
        let tags = merge_tags(&aliases.complete(&inherited), &aliases.complete(&self.tags));
        layers.push(ClassLayer {
            class: self.name,
            tags: self.tags,
        });

        Ok(ObjectClass {
            name: self.name,
            layers,
            tags,
            config,
            aliases,
            constructor: self.constructor,
            param_defaults: self.param_defaults,
            test_params: self.test_params,
        })
    }

    /// Like [`ClassBuilder::try_build`], for static class declarations.
    ///
    /// # Panics
    /// Panics if the declaration is invalid.
    pub fn build(self) -> ObjectClass {
        let name = self.name;
        match self.try_build() {
            Ok(class) => class,
            Err(err) => panic!("invalid class declaration for {name}: {err}"),
        }
    }
}

fn construct_boxed<T>(params: ValueMap) -> Result<Box<dyn BaseObject>>
where
    T: BaseObject + FromParams,
{
    Ok(Box::new(T::from_params(params)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDomain;
    use crate::diagnostics::capture_deprecations;
    use crate::values;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref ROOT: ObjectClass = ObjectClass::builder("Root")
            .tag("x", 1)
            .tag("shared", "root")
            .config(ConfigKey::new("warnings", "on", ConfigDomain::one_of(["on", "off"])))
            .build();
        static ref CHILD: ObjectClass = ObjectClass::builder("Child")
            .extends(&ROOT)
            .tag("y", 2)
            .tag("shared", "child")
            .aliases(AliasTable::new().rename("old_tag", "new_tag", "2.0.0"))
            .build();
        static ref GRANDCHILD: ObjectClass = ObjectClass::builder("GrandChild")
            .extends(&CHILD)
            .tag("old_tag", 9)
            .build();
    }

    #[test]
    fn test_lineage_and_layers() {
        assert_eq!(GRANDCHILD.lineage(), vec!["Root", "Child", "GrandChild"]);
        assert_eq!(GRANDCHILD.layers()[1].tags, values! { "y" => 2, "shared" => "child" });
        assert!(GRANDCHILD.is_subclass_of(&ROOT));
        assert!(!ROOT.is_subclass_of(&CHILD));
    }

    #[test]
    fn test_most_derived_wins() {
        let tags = CHILD.get_class_tags();
        assert_eq!(tags, values! { "x" => 1, "y" => 2, "shared" => "child" });
    }

    #[test]
    fn test_aliases_are_inherited_and_completed() {
        let tags = GRANDCHILD.get_class_tags();
        assert_eq!(tags["old_tag"], Value::Int(9));
        assert_eq!(tags["new_tag"], Value::Int(9));
    }

    #[test]
    fn test_class_tag_warns_on_deprecated_name() {
        let (value, notices) =
            capture_deprecations(|| GRANDCHILD.get_class_tag("old_tag", None, true).unwrap());
        assert_eq!(value, Value::Int(9));
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].version, "2.0.0");
    }

    #[test]
    fn test_config_inherited() {
        assert_eq!(GRANDCHILD.default_config()["warnings"], Value::from("on"));
    }

    #[test]
    fn test_chain_rejected_at_build() {
        let result = ObjectClass::builder("Bad")
            .aliases(AliasTable::new().rename("a", "b", "1").rename("b", "c", "2"))
            .try_build();
        assert!(matches!(result, Err(BaseError::UnsupportedAliasChain(_))));
    }

    #[test]
    fn test_default_outside_domain_rejected() {
        let result = ObjectClass::builder("Bad")
            .config(ConfigKey::new("mode", "x", ConfigDomain::one_of(["a", "b"])))
            .try_build();
        assert!(matches!(result, Err(BaseError::InvalidConfigValue { .. })));
    }

    #[test]
    fn test_not_constructible_without_constructor() {
        assert!(matches!(
            ROOT.construct(ValueMap::new()),
            Err(BaseError::NotConstructible(name)) if name == "Root"
        ));
        assert_eq!(ROOT.get_test_params(), vec![ValueMap::new()]);
    }
}
