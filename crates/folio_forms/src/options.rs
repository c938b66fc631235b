use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::FieldValue;

/// Ordered option-key to display-label mapping of a combo or radio control.
///
/// Keeps the order in which the server listed the entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    entries: Vec<(String, String)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts or replaces an entry. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        let key = key.into();
        let label = label.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = label,
            None => self.entries.push((key, label)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, label)| label.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.entries.first().map(|(k, l)| (k.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, l)| (k.as_str(), l.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Copy of the map ordered by label. Ties keep their original order.
    pub fn sorted_by_label(&self) -> OptionMap {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.1.cmp(&b.1));
        OptionMap { entries }
    }
}

impl<K: Into<String>, L: Into<String>> FromIterator<(K, L)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, L)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (key, label) in iter {
            map.insert(key, label);
        }
        map
    }
}

impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, label) in &self.entries {
            map.serialize_entry(key, label)?;
        }
        map.end()
    }
}

struct OptionMapVisitor;

impl<'de> Visitor<'de> for OptionMapVisitor {
    type Value = OptionMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of option keys to labels")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<OptionMap, E> {
        Ok(OptionMap::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OptionMap, A::Error> {
        let mut map = OptionMap::new();
        while let Some((key, label)) = access.next_entry::<String, String>()? {
            map.insert(key, label);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for OptionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<OptionMap, D::Error> {
        deserializer.deserialize_any(OptionMapVisitor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    /// Stored key is present in the dictionary.
    Matched { key: &'a str, label: &'a str },
    /// No stored value; the first presented option is selected.
    Defaulted { key: &'a str, label: &'a str },
    /// Stored key is no longer part of the dictionary.
    Deprecated(String),
    /// No stored value and no options to fall back to.
    Empty,
}

impl<'a> Selection<'a> {
    pub fn resolve(options: &'a OptionMap, value: Option<&FieldValue>) -> Selection<'a> {
        let stored = value.and_then(FieldValue::as_key).unwrap_or("");
        if !stored.is_empty() {
            if let Some((key, label)) = options.iter().find(|(k, _)| *k == stored) {
                return Selection::Matched { key, label };
            }
            return Selection::Deprecated(stored.to_string());
        }
        match options.first() {
            Some((key, label)) => Selection::Defaulted { key, label },
            None => Selection::Empty,
        }
    }

    pub fn option(&self) -> Option<(&'a str, &'a str)> {
        match self {
            Selection::Matched { key, label } | Selection::Defaulted { key, label } => {
                Some((*key, *label))
            }
            _ => None,
        }
    }
}
