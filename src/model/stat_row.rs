use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One untyped upstream row keyed by column name. Numeric reads of absent or
/// non-numeric columns yield 0.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct StatRow(pub Map<String, Value>);

impl StatRow {
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    #[must_use]
    pub fn num(&self, key: &str) -> f64 {
        match self.0.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            Some(Value::Bool(b)) => f64::from(u8::from(*b)),
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Reads an id column that upstream sends either as a number or a string.
    #[must_use]
    pub fn id(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn set_num(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), Value::from(value));
    }
}

impl From<Map<String, Value>> for StatRow {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[(&str, f64); N]> for StatRow {
    fn from(values: [(&str, f64); N]) -> Self {
        let mut row = Self::new();
        for (key, value) in values {
            row.set_num(key, value);
        }
        row
    }
}
