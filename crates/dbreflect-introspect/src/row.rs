use std::collections::BTreeMap;

use dbreflect_core::{Error, Result};

/// One loosely-typed row from an introspection result set, keyed by column name.
///
/// Values are coerced to text by the collaborator; `None` is SQL `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: BTreeMap<String, Option<String>>,
}

/// One ordered batch of rows from a multi-result-set call.
pub type ResultSet = Vec<Row>;

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Row::insert`] for non-null values.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.values.insert(key.into(), value);
    }

    /// Whether the row carries the key at all, null or not.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Non-null value for the key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|value| value.as_deref())
    }

    /// Value for a key the row is required to carry; `NULL` reads as empty text.
    pub fn text(&self, key: &str) -> Result<String> {
        match self.values.get(key) {
            Some(value) => Ok(value.clone().unwrap_or_default()),
            None => Err(Error::Contract(format!("row is missing expected key `{key}`"))),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, Option<String>)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}
