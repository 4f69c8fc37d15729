use crate::core::Value;

/// Set of values a config key accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigDomain {
    /// Exactly one of the listed values.
    OneOf(Vec<Value>),
    Bool,
    /// `null` or a map of backend parameters.
    MapOrNull,
}

impl ConfigDomain {
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Self::OneOf(values) => values.contains(value),
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::MapOrNull => matches!(value, Value::Map(_) | Value::Null),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::OneOf(values) => {
                let listed = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("one of {{{listed}}}")
            }
            Self::Bool => "a boolean".to_string(),
            Self::MapOrNull => "null or a map".to_string(),
        }
    }
}

/// Declaration of one config key: default value, accepted domain and docs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigKey {
    pub name: String,
    pub default: Value,
    pub domain: ConfigDomain,
    pub doc: String,
}

impl ConfigKey {
    pub fn new(name: &str, default: impl Into<Value>, domain: ConfigDomain) -> Self {
        Self {
            name: name.to_string(),
            default: default.into(),
            domain,
            doc: String::new(),
        }
    }

    /// Set the documentation string
    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = doc.to_string();
        self
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.domain.contains(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_of_domain() {
        let domain = ConfigDomain::one_of(["on", "off"]);
        assert!(domain.contains(&Value::from("on")));
        assert!(!domain.contains(&Value::from("maybe")));
        assert_eq!(domain.describe(), "one of {'on', 'off'}");
    }

    #[test]
    fn test_one_of_with_null() {
        let domain = ConfigDomain::OneOf(vec![Value::Null, Value::from("dask")]);
        assert!(domain.contains(&Value::Null));
        assert!(!domain.contains(&Value::from("spark")));
    }

    #[test]
    fn test_map_or_null_domain() {
        let domain = ConfigDomain::MapOrNull;
        assert!(domain.contains(&Value::Null));
        assert!(domain.contains(&Value::Map(Default::default())));
        assert!(!domain.contains(&Value::Int(1)));
    }
}
