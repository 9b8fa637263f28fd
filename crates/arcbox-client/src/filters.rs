//! Structured `filters` query parameter.
//!
//! The daemon accepts filters as one JSON query value mapping every key to a
//! set of values, each value marked `true`:
//!
//! ```text
//! {"dangling":{"true":true},"label":{"label1=foo":true,"label2!=bar":true}}
//! ```

use crate::error::{ClientError, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Multi-valued filter expression.
///
/// Keys and values are kept sorted, so serialization is stable. A key only
/// exists while it holds at least one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    fields: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSet {
    /// Creates an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` under `key`. Adding the same pair twice is a no-op.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields
            .entry(key.into())
            .or_default()
            .insert(value.into());
        self
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// Removes `value` from `key`, dropping the key once it has no values.
    pub fn remove(&mut self, key: &str, value: &str) -> bool {
        let Some(values) = self.fields.get_mut(key) else {
            return false;
        };
        let removed = values.remove(value);
        if values.is_empty() {
            self.fields.remove(key);
        }
        removed
    }

    /// Returns the values under `key` in sorted order.
    pub fn get(&self, key: &str) -> impl Iterator<Item = &str> {
        self.fields
            .get(key)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// Returns true if `key` has at least one value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns true if `value` is present under `key`.
    #[must_use]
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.fields
            .get(key)
            .is_some_and(|values| values.contains(value))
    }

    /// True when `key` is unconstrained or lists `source` among its values.
    #[must_use]
    pub fn exact_match(&self, key: &str, source: &str) -> bool {
        self.fields
            .get(key)
            .map_or(true, |values| values.contains(source))
    }

    /// Iterates over the keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encodes the set for the `filters` query parameter.
    ///
    /// Returns an empty string for an empty set; callers must then leave the
    /// parameter out rather than send `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] if JSON serialization fails.
    pub fn to_json(&self) -> Result<String> {
        if self.is_empty() {
            return Ok(String::new());
        }
        serde_json::to_string(self).map_err(ClientError::Encode)
    }

    /// Parses a `filters` value.
    ///
    /// Accepts the marker-set form (`{"key":{"value":true}}`) and the older
    /// list form (`{"key":["value"]}`). Blank input yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidFilters`] if the input is neither form.
    pub fn from_json(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::new());
        }

        if let Ok(parsed) = serde_json::from_str::<HashMap<String, HashMap<String, bool>>>(raw) {
            let mut filters = Self::new();
            for (key, values) in parsed {
                for (value, enabled) in values {
                    if enabled {
                        filters.add(key.clone(), value);
                    }
                }
            }
            return Ok(filters);
        }

        serde_json::from_str::<HashMap<String, Vec<String>>>(raw)
            .map(|parsed| {
                parsed
                    .into_iter()
                    .flat_map(|(key, values)| values.into_iter().map(move |v| (key.clone(), v)))
                    .collect()
            })
            .map_err(|e| ClientError::InvalidFilters(e.to_string()))
    }
}

impl Serialize for FilterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Markers<'a>(&'a BTreeSet<String>);

        impl Serialize for Markers<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_map(self.0.iter().map(|value| (value, true)))
            }
        }

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, values) in &self.fields {
            map.serialize_entry(key, &Markers(values))?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for FilterSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::new();
        filters.extend(iter);
        filters
    }
}
