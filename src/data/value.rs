//! Scalar cell values and named records

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A single cell of a benchmark table.
///
/// Cells read from disk stay as raw text so passthrough columns are written
/// back unchanged. Numbers are only produced by the scorer, codes only by the
/// feature codec.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Text(String),
    Number(f64),
    Code(usize),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Parse the cell as a finite number. Text is trimmed first.
    pub fn to_f64(&self) -> Option<f64> {
        let parsed = match self {
            Value::Missing => return None,
            Value::Number(n) => *n,
            Value::Code(c) => *c as f64,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        parsed.is_finite().then_some(parsed)
    }

    /// Label form of a categorical cell. `Missing` has no label.
    pub fn label(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Code(c) => write!(f, "{}", c),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Missing => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Code(c) => serializer.serialize_u64(*c as u64),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// One row with its column names attached, in column order.
///
/// Used for recommendation queries and results, where a row travels without
/// the table it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces an existing field of the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_f64_parses_trimmed_text() {
        assert_eq!(Value::from(" 1500.5 ").to_f64(), Some(1500.5));
        assert_eq!(Value::Number(3.0).to_f64(), Some(3.0));
        assert_eq!(Value::Missing.to_f64(), None);
        assert_eq!(Value::from("pytorch").to_f64(), None);
    }

    #[test]
    fn test_to_f64_rejects_non_finite() {
        assert_eq!(Value::from("inf").to_f64(), None);
        assert_eq!(Value::from("NaN").to_f64(), None);
        assert_eq!(Value::Number(f64::NAN).to_f64(), None);
    }

    #[test]
    fn test_display_matches_cell_text() {
        assert_eq!(Value::Missing.to_string(), "");
        assert_eq!(Value::Number(1000.0).to_string(), "1000");
        assert_eq!(Value::Number(0.25).to_string(), "0.25");
        assert_eq!(Value::Code(3).to_string(), "3");
        assert_eq!(Value::from("float16").to_string(), "float16");
    }

    #[test]
    fn test_record_insert_replaces() {
        let record = Record::new()
            .with("Memory (MB)", 1500.0)
            .with("Backend", "pytorch")
            .with("Memory (MB)", 2500.0);

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("Memory (MB)"), Some(&Value::Number(2500.0)));
        assert_eq!(record.fields()[1].0, "Backend");
    }

    #[test]
    fn test_record_serializes_in_column_order() {
        let record = Record::new()
            .with("Backend", "pytorch")
            .with("Memory (MB)", 1500.0)
            .with("Kernel", Value::Missing);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Backend":"pytorch","Memory (MB)":1500.0,"Kernel":null}"#);
    }
}
