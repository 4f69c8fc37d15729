//! Tag aliasing during deprecation windows.
//!
//! An alias entry maps a retired tag name to its replacement (or to nothing
//! when the tag is being removed) together with the version in which the old
//! name goes away. While an entry exists both names behave as one slot:
//! writing either name writes both, and every access to the old name emits a
//! [`DeprecationNotice`].
//!
//! Expansion is one hop. A replacement that is itself deprecated (`a -> b`,
//! `b -> c`) is rejected by [`AliasTable::validate`].

use std::collections::BTreeMap;

use crate::core::{BaseError, Result};
use crate::diagnostics::{self, DeprecationNotice};
use crate::tags::store::{TagMap, validate_tag_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// `None` means the tag is removed without a replacement.
    pub replacement: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, AliasEntry>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `old` is renamed to `new` and disappears in `version`.
    pub fn rename(mut self, old: &str, new: &str, version: &str) -> Self {
        self.entries.insert(
            old.to_string(),
            AliasEntry {
                replacement: Some(new.to_string()),
                version: version.to_string(),
            },
        );
        self
    }

    /// `old` is removed in `version` with no replacement.
    pub fn remove(mut self, old: &str, version: &str) -> Self {
        self.entries.insert(
            old.to_string(),
            AliasEntry {
                replacement: None,
                version: version.to_string(),
            },
        );
        self
    }

    /// Builds a table from an alias dict (`old -> new`, empty string for
    /// removal) and a deprecation dict (`old -> version`). Both dicts must
    /// have exactly the same keys.
    pub fn from_dicts(
        alias_dict: &BTreeMap<String, String>,
        deprecate_dict: &BTreeMap<String, String>,
    ) -> Result<Self> {
        if !alias_dict.keys().eq(deprecate_dict.keys()) {
            return Err(BaseError::InvalidAliasTable(
                "alias and deprecation tables must have identical keys".to_string(),
            ));
        }
        let entries = alias_dict
            .iter()
            .map(|(old, new)| {
                let entry = AliasEntry {
                    replacement: (!new.is_empty()).then(|| new.clone()),
                    version: deprecate_dict[old].clone(),
                };
                (old.clone(), entry)
            })
            .collect();
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, old: &str) -> Option<&AliasEntry> {
        self.entries.get(old)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &AliasEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `old -> new`, with an empty string for removed tags.
    pub fn alias_dict(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(old, e)| (old.clone(), e.replacement.clone().unwrap_or_default()))
            .collect()
    }

    /// `old -> version of removal`.
    pub fn deprecate_dict(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(old, e)| (old.clone(), e.version.clone()))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        for (old, entry) in &self.entries {
            validate_tag_name(old)?;
            let Some(new) = &entry.replacement else {
                continue;
            };
            validate_tag_name(new)?;
            if new == old {
                return Err(BaseError::UnsupportedAliasChain(format!(
                    "tag '{old}' cannot alias itself"
                )));
            }
            if self.entries.contains_key(new) {
                return Err(BaseError::UnsupportedAliasChain(format!(
                    "'{old}' -> '{new}' where '{new}' is itself deprecated"
                )));
            }
        }
        Ok(())
    }

    /// Mirrors values between old and new names, one hop.
    ///
    /// Only keys present in `tags` trigger expansion. When both names of a
    /// pair are present the map is left as is for that pair.
    pub fn complete(&self, tags: &TagMap) -> TagMap {
        let mut completed = tags.clone();
        for (old, entry) in &self.entries {
            let old_value = tags.get(old);
            let new_value = entry.replacement.as_ref().and_then(|new| tags.get(new));
            match (old_value, new_value, &entry.replacement) {
                (Some(value), None, Some(new)) => {
                    completed.insert(new.clone(), value.clone());
                }
                (None, Some(value), _) => {
                    completed.insert(old.clone(), value.clone());
                }
                _ => {}
            }
        }
        completed
    }

    /// Notices for every deprecated name among `names`, one per name.
    pub fn notices_for<'a, I>(&self, names: I) -> Vec<DeprecationNotice>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| {
                self.entries.get(name).map(|entry| DeprecationNotice {
                    tag: name.to_string(),
                    version: entry.version.clone(),
                    replacement: entry.replacement.clone(),
                })
            })
            .collect()
    }

    /// Emits the notices of [`AliasTable::notices_for`].
    pub fn warn<'a, I>(&self, names: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for notice in self.notices_for(names) {
            diagnostics::emit(notice);
        }
    }
}
