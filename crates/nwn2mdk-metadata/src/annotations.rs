//! Untyped per-object annotations
//!
//! Annotations are the string-keyed values the interchange format carries
//! alongside each object. Values are explicitly tagged; nothing is inferred
//! from the shape of a value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A tagged annotation value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationValue {
    Int(i64),
    Float(f32),
    Text(String),
    /// RGB triple, the only compound value the interchange format carries
    Color([f32; 3]),
}

impl AnnotationValue {
    /// Boolean encoding used by the converters: `1` is true, anything else is false
    pub fn is_one(&self) -> bool {
        match self {
            AnnotationValue::Int(v) => *v == 1,
            AnnotationValue::Float(v) => *v == 1.0,
            _ => false,
        }
    }

    /// Numeric value, if this is an `Int` or a `Float`
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            AnnotationValue::Int(v) => Some(*v as f32),
            AnnotationValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnnotationValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[f32; 3]> {
        match self {
            AnnotationValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Encode a flag the way the exporter does (`0.0` / `1.0`)
    pub fn flag(value: bool) -> Self {
        AnnotationValue::Float(if value { 1.0 } else { 0.0 })
    }

    /// Tag name, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            AnnotationValue::Int(_) => "int",
            AnnotationValue::Float(_) => "float",
            AnnotationValue::Text(_) => "text",
            AnnotationValue::Color(_) => "color",
        }
    }
}

impl From<i64> for AnnotationValue {
    fn from(value: i64) -> Self {
        AnnotationValue::Int(value)
    }
}

impl From<f32> for AnnotationValue {
    fn from(value: f32) -> Self {
        AnnotationValue::Float(value)
    }
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        AnnotationValue::Text(value.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(value: String) -> Self {
        AnnotationValue::Text(value)
    }
}

impl From<[f32; 3]> for AnnotationValue {
    fn from(value: [f32; 3]) -> Self {
        AnnotationValue::Color(value)
    }
}

impl std::fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationValue::Int(v) => write!(f, "{v}"),
            AnnotationValue::Float(v) => write!(f, "{v}"),
            AnnotationValue::Text(s) => write!(f, "{s:?}"),
            AnnotationValue::Color([r, g, b]) => write!(f, "({r}, {g}, {b})"),
        }
    }
}

/// Ordered map of annotations attached to one scene object
///
/// Iteration follows insertion order, which is the order the host or the
/// converter attached the keys in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationMap {
    entries: IndexMap<String, AnnotationValue>,
}

impl AnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnnotationValue> {
        self.entries.get(key)
    }

    /// Set a value, returning the previous one. An existing key keeps its position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AnnotationValue>,
    ) -> Option<AnnotationValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Delete a key, preserving the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<AnnotationValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &AnnotationValue) -> bool) {
        self.entries.retain(|k, v| keep(k, v));
    }
}

impl<K: Into<String>, V: Into<AnnotationValue>> FromIterator<(K, V)> for AnnotationMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = AnnotationMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<AnnotationValue>> Extend<(K, V)> for AnnotationMap {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for AnnotationMap {
    type Item = (String, AnnotationValue);
    type IntoIter = indexmap::map::IntoIter<String, AnnotationValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_one() {
        assert!(AnnotationValue::Int(1).is_one());
        assert!(AnnotationValue::Float(1.0).is_one());
        assert!(!AnnotationValue::Int(2).is_one());
        assert!(!AnnotationValue::Float(0.5).is_one());
        assert!(!AnnotationValue::Text("1".into()).is_one());
        assert!(!AnnotationValue::Color([1.0, 1.0, 1.0]).is_one());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map: AnnotationMap = [("A", 1i64), ("B", 2), ("C", 3)].into_iter().collect();
        map.remove("B");

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(map.remove("missing"), None);
    }

    #[test]
    fn test_insert_existing_keeps_position() {
        let mut map = AnnotationMap::new();
        map.insert("GLOW", 1i64);
        map.insert("HEAD", 0i64);
        let old = map.insert("GLOW", 0.0f32);

        assert_eq!(old, Some(AnnotationValue::Int(1)));
        assert_eq!(map.keys().next(), Some("GLOW"));
        assert_eq!(map.get("GLOW"), Some(&AnnotationValue::Float(0.0)));
    }

    #[test]
    fn test_serde_is_explicitly_tagged() {
        let mut map = AnnotationMap::new();
        map.insert("TINT_MAP", "c_tint01");
        map.insert("GLOW", 1i64);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"TINT_MAP":{"Text":"c_tint01"},"GLOW":{"Int":1}}"#);

        let back: AnnotationMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
