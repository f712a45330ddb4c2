//! Effect parameters.
//!
//! Tags are tuned through a flat string-keyed map of primitives
//! (`chain_count`, `burn_duration`, `baseDamage`, ...). The engine reads
//! them with typed getters that fall back to a documented default.
//!
//! ## ParamValue Types
//!
//! - `Number`: all numeric values (counts are read back as integers)
//! - `Bool`: flags (`can_pass_walls`)
//! - `Text`: modes and names (`origin`, `teleport_type`)

use serde::{Deserialize, Serialize};

/// A single parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Get as a float. Booleans read as 0/1.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            ParamValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Get as an integer, truncating toward zero.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Number(v) => Some(*v != 0.0),
            ParamValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Number(f64::from(v))
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Number(v as f64)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Number(f64::from(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Parameter map.
///
/// Uses an `im` persistent map: the merged config params are cloned for every
/// status application on every target, which is O(1) here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(im::HashMap<String, ParamValue>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter (builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Copy every entry of `other` into `self`; `other` wins on collisions.
    pub fn merge_from(&mut self, other: &Params) {
        for (key, value) in other.0.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Return `self` overlaid with `other`.
    #[must_use]
    pub fn merged_with(&self, other: &Params) -> Params {
        let mut merged = self.clone();
        merged.merge_from(other);
        merged
    }

    /// Float value, or `default` when absent or not numeric.
    #[must_use]
    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get(key)
            .and_then(ParamValue::as_f64)
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    /// First present numeric value among `keys`, else `default`.
    #[must_use]
    pub fn first_f64_or(&self, keys: &[&str], default: f64) -> f64 {
        keys.iter()
            .find_map(|k| self.get(k).and_then(ParamValue::as_f64).filter(|v| v.is_finite()))
            .unwrap_or(default)
    }

    /// Integer value, or `default` when absent or not numeric.
    #[must_use]
    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(ParamValue::as_i64).unwrap_or(default)
    }

    #[must_use]
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(ParamValue::as_bool).unwrap_or(default)
    }

    /// Text value, or `default` when absent or not text.
    #[must_use]
    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(ParamValue::as_text).unwrap_or(default)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let params = Params::new()
            .with("chain_count", 3)
            .with("chain_range", 4.5)
            .with("can_pass_walls", true)
            .with("origin", "source");

        assert_eq!(params.i64_or("chain_count", 2), 3);
        assert_eq!(params.f64_or("chain_range", 5.0), 4.5);
        assert!(params.bool_or("can_pass_walls", false));
        assert_eq!(params.text_or("origin", "target"), "source");

        assert_eq!(params.f64_or("missing", 1.25), 1.25);
        assert_eq!(params.text_or("chain_count", "fallback"), "fallback");
    }

    #[test]
    fn test_merge_override_wins() {
        let defaults = Params::new().with("burn_duration", 3.0).with("burn_dps", 5.0);
        let overrides = Params::new().with("burn_duration", 5.0);

        let merged = defaults.merged_with(&overrides);
        assert_eq!(merged.f64_or("burn_duration", 0.0), 5.0);
        assert_eq!(merged.f64_or("burn_dps", 0.0), 5.0);
        // original untouched
        assert_eq!(defaults.f64_or("burn_duration", 0.0), 3.0);
    }

    #[test]
    fn test_first_f64_or() {
        let params = Params::new().with("radius", 2.0);
        assert_eq!(params.first_f64_or(&["circle_radius", "radius"], 3.0), 2.0);
        assert_eq!(params.first_f64_or(&["circle_radius"], 3.0), 3.0);
    }

    #[test]
    fn test_non_finite_falls_back() {
        let params = Params::new().with("chain_range", f64::NAN);
        assert_eq!(params.f64_or("chain_range", 5.0), 5.0);
    }

    #[test]
    fn test_json_primitives() {
        let params: Params =
            serde_json::from_str(r#"{"baseDamage": 80, "origin": "source", "crit": false}"#).unwrap();
        assert_eq!(params.f64_or("baseDamage", 0.0), 80.0);
        assert_eq!(params.text_or("origin", ""), "source");
        assert!(!params.bool_or("crit", true));
    }
}
