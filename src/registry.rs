//! The profile registry: parse, validate, look up, enumerate, render.
//!
//! The registry is fully static after load. No entry is created, mutated,
//! or destroyed at runtime, so a shared reference is safe across threads
//! without locking.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::de::{MapAccess, Visitor};
use tracing::debug;

use crate::domain::error::ProfileError;
use crate::domain::profile::NodeProfile;
use crate::domain::template;

/// The authored profile table shipped with the crate.
const BUILTIN_TABLE: &str = include_str!("profiles.yaml");

/// Raw `(name, profile)` pairs in source order.
///
/// The YAML layer must not collapse duplicate keys the way a plain map
/// deserialization would, so this intermediate keeps every entry and
/// leaves duplicate detection to [`ProfileRegistry::from_yaml`], where it
/// can surface as a typed error.
struct ProfileEntries(Vec<(String, NodeProfile)>);

impl<'de> Deserialize<'de> for ProfileEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ProfileEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping of profile name to node profile")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, NodeProfile>()? {
                    entries.push(entry);
                }
                Ok(ProfileEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Read-only mapping from profile name to [`NodeProfile`].
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, NodeProfile>,
}

impl ProfileRegistry {
    /// Parses and validates a profile table from YAML source.
    ///
    /// # Errors
    ///
    /// `Parse` for YAML that does not fit the schema, `DuplicateName`
    /// when two entries share a name, and `InvalidProfile` when an entry
    /// violates a load-time invariant.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        let ProfileEntries(entries) = serde_yaml::from_str(yaml)?;
        let mut profiles = BTreeMap::new();
        for (name, profile) in entries {
            profile.validate(&name)?;
            if profiles.contains_key(&name) {
                return Err(ProfileError::DuplicateName(name));
            }
            profiles.insert(name, profile);
        }
        debug!(profiles = profiles.len(), "loaded profile table");
        Ok(Self { profiles })
    }

    /// Loads a profile table from a YAML file on disk.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, plus everything
    /// [`Self::from_yaml`] reports.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads the table shipped with the crate.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_yaml`]; the built-in table is covered by the
    /// integration suite, so a failure here means the crate itself is
    /// broken.
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::from_yaml(BUILTIN_TABLE)
    }

    /// Looks up one profile by exact name.
    ///
    /// There is no substring or label fallback here: fuzzy matching of
    /// Jenkins node names back to profile names is the consumer's
    /// business, not the table's.
    ///
    /// # Errors
    ///
    /// `NotFound` when no profile has that name.
    pub fn get(&self, name: &str) -> Result<&NodeProfile, ProfileError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    /// Iterates over every `(name, profile)` entry. Iteration order
    /// carries no meaning; treat the result as a set.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeProfile)> {
        self.profiles.iter().map(|(name, p)| (name.as_str(), p))
    }

    /// Iterates over the profile names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Number of profiles in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Renders the bootstrap script of `name` for one concrete instance:
    /// resolves every `{{ ... }}` placeholder from `variables` (defaults
    /// apply where authored), then drops `instance_suffix` into the
    /// script's single `%s` site, yielding a node name of the form
    /// `<profile>__<suffix>` in the registration call.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown profile, `MissingVariable` when a
    /// placeholder has neither a value nor a default, and
    /// `MalformedPlaceholder` for unparseable placeholder text.
    pub fn render_script(
        &self,
        name: &str,
        instance_suffix: &str,
        variables: &HashMap<String, String>,
    ) -> Result<String, ProfileError> {
        let profile = self.get(name)?;
        let rendered = template::render(&profile.script, variables)?;
        Ok(rendered.replacen("%s", instance_suffix, 1))
    }
}
