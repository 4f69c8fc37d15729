use crate::core::{BaseError, Result, Value, ValueMap};

/// Tag name -> tag value.
pub type TagMap = ValueMap;

/// Tag names are flat strings. Colon segments (`backend:parallel`) are a
/// naming convention only and are never split.
pub fn validate_tag_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(BaseError::InvalidTagName(name.to_string()));
    }
    Ok(())
}

/// Layers `overlay` on top of `base`; overlay wins on key collision.
pub fn merge_tags(base: &TagMap, overlay: &TagMap) -> TagMap {
    let mut merged = base.clone();
    merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Looks a tag up in an already resolved tag map.
pub fn lookup_tag(
    tags: &TagMap,
    name: &str,
    default: Option<Value>,
    raise_error: bool,
) -> Result<Value> {
    match tags.get(name) {
        Some(value) => Ok(value.clone()),
        None if raise_error => Err(BaseError::UnknownTag(name.to_string())),
        None => Ok(default.unwrap_or(Value::Null)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values;

    #[test]
    fn test_merge_overlay_wins() {
        let base = values! { "x" => 1, "y" => 2 };
        let overlay = values! { "y" => 3, "z" => 4 };
        let merged = merge_tags(&base, &overlay);
        assert_eq!(merged, values! { "x" => 1, "y" => 3, "z" => 4 });
    }

    #[test]
    fn test_lookup_default_and_error() {
        let tags = values! { "x" => 1 };
        assert_eq!(lookup_tag(&tags, "x", None, true).unwrap(), Value::Int(1));
        assert_eq!(
            lookup_tag(&tags, "missing", Some(Value::from("d")), false).unwrap(),
            Value::from("d")
        );
        assert_eq!(lookup_tag(&tags, "missing", None, false).unwrap(), Value::Null);
        assert!(matches!(
            lookup_tag(&tags, "missing", Some(Value::Int(0)), true),
            Err(BaseError::UnknownTag(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_tag_name_validation() {
        assert!(validate_tag_name("backend:parallel:params").is_ok());
        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name("has space").is_err());
    }
}
