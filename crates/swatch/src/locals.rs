//! Component input data.
//!
//! [`Locals`] is the data mapping a caller passes into a component invocation;
//! [`RenderOptions`] carries options through to the implementation untouched.
//! Both keep insertion order, which the source preview relies on to print the
//! invocation the way it was written.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};
use swatch_markup::Markup;

use crate::error::{RenderError, Result};

/// Ordered key/value data passed to a component.
///
/// Values added with [`insert_markup`](Self::insert_markup) keep their
/// fragment status: template components embed them without escaping.
///
/// # Example
///
/// ```rust
/// use swatch::Locals;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Greeting { name: String }
///
/// let locals = Locals::from_serialize(&Greeting { name: "Ada".into() }).unwrap();
/// assert_eq!(locals.get("name").and_then(|v| v.as_str()), Some("Ada"));
///
/// let locals = Locals::new().with("name", "Ada").unwrap().with("age", 36).unwrap();
/// assert_eq!(locals.keys().collect::<Vec<_>>(), vec!["name", "age"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Locals {
    values: Map<String, Value>,
    #[serde(skip)]
    markup: BTreeSet<String>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds locals from any value that serializes to a map.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::SerializationError`] if serialization fails or
    /// the value is not a map. `()` and `None` produce empty locals.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        match serde_json::to_value(data)? {
            Value::Object(map) => Ok(Self::from(map)),
            Value::Null => Ok(Self::new()),
            other => Err(RenderError::SerializationError(format!(
                "locals must serialize to a map, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Inserts a value, serializing it.
    pub fn insert<T: Serialize + ?Sized>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value)?;
        self.markup.remove(&key);
        self.values.insert(key, value);
        Ok(())
    }

    /// Inserts an already-rendered fragment.
    pub fn insert_markup(&mut self, key: impl Into<String>, markup: Markup) {
        let key = key.into();
        self.values.insert(key.clone(), Value::String(markup.into_string()));
        self.markup.insert(key);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Result<Self> {
        self.insert(key, &value)?;
        Ok(self)
    }

    /// Builder-style [`insert_markup`](Self::insert_markup).
    pub fn with_markup(mut self, key: impl Into<String>, markup: Markup) -> Self {
        self.insert_markup(key, markup);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// True if the value under `key` is a fragment.
    pub fn is_markup(&self, key: &str) -> bool {
        self.markup.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merges `other` on top of `self`; keys in `other` win.
    pub fn merge(&mut self, other: Locals) {
        for (key, value) in other.values {
            if other.markup.contains(&key) {
                self.markup.insert(key.clone());
            } else {
                self.markup.remove(&key);
            }
            self.values.insert(key, value);
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl From<Map<String, Value>> for Locals {
    fn from(values: Map<String, Value>) -> Self {
        Self {
            values,
            markup: BTreeSet::new(),
        }
    }
}

impl TryFrom<Value> for Locals {
    type Error = RenderError;

    fn try_from(value: Value) -> Result<Self> {
        Locals::from_serialize(&value)
    }
}

/// Options passed through unmodified to the component implementation.
///
/// The set of recognized keys belongs to each implementation; this layer never
/// reads them. Template components see them as the `options` variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderOptions(Map<String, Value>);

impl RenderOptions {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builds options from any value that serializes to a map.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        Locals::from_serialize(data).map(|locals| Self(locals.values))
    }

    /// Builder-style insert.
    pub fn with<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Result<Self> {
        self.0.insert(key.into(), serde_json::to_value(&value)?);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RenderOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_locals_from_struct_keeps_field_order() {
        #[derive(Serialize)]
        struct Card {
            title: String,
            body: String,
            count: u32,
        }

        let locals = Locals::from_serialize(&Card {
            title: "t".into(),
            body: "b".into(),
            count: 1,
        })
        .unwrap();
        assert_eq!(locals.keys().collect::<Vec<_>>(), vec!["title", "body", "count"]);
    }

    #[test]
    fn test_locals_from_unit_is_empty() {
        assert!(Locals::from_serialize(&()).unwrap().is_empty());
    }

    #[test]
    fn test_locals_from_non_map_fails() {
        let err = Locals::from_serialize(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, RenderError::SerializationError(_)));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_locals_non_string_keys_fail() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let err = Locals::from_serialize(&map).unwrap_err();
        assert!(matches!(err, RenderError::SerializationError(_)));
    }

    #[test]
    fn test_locals_merge_overrides() {
        let mut base = Locals::try_from(json!({"a": 1, "b": 2})).unwrap();
        base.merge(Locals::try_from(json!({"b": 3, "c": 4})).unwrap());
        assert_eq!(serde_json::to_value(&base).unwrap(), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_markup_keys_tracked() {
        let mut locals = Locals::new().with_markup("body", Markup::raw("<b>x</b>"));
        assert!(locals.is_markup("body"));
        assert_eq!(locals.get("body"), Some(&json!("<b>x</b>")));

        locals.insert("body", "plain").unwrap();
        assert!(!locals.is_markup("body"));
    }

    #[test]
    fn test_merge_carries_markup_keys() {
        let mut base = Locals::new().with_markup("a", Markup::raw("<i>")).with("b", 1).unwrap();
        base.merge(Locals::new().with("a", "text").unwrap().with_markup("b", Markup::raw("<u>")));
        assert!(!base.is_markup("a"));
        assert!(base.is_markup("b"));
    }

    #[test]
    fn test_markup_keys_not_serialized() {
        let locals = Locals::new().with_markup("body", Markup::raw("<p>"));
        assert_eq!(serde_json::to_value(&locals).unwrap(), json!({"body": "<p>"}));
    }

    #[test]
    fn test_options_with() {
        let options = RenderOptions::new().with("cache", true).unwrap();
        assert_eq!(options.get("cache"), Some(&json!(true)));
    }
}
