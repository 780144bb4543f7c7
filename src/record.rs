use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{AnalysisError, Result};

/// One heterogeneous row. Field order is the order keys were first written.
pub type Record = Map<String, Value>;
pub type Batch = Vec<Record>;

/// Accepts a JSON array as a batch. Elements that are not objects become
/// empty records so the record count still matches the input.
pub fn batch_from_value(v: Value) -> Result<Batch> {
    match v {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => map,
                _ => Record::new(),
            })
            .collect()),
        _ => Err(AnalysisError::Input("batch must be a JSON array of records".into())),
    }
}

pub fn batch_from_str(s: &str) -> Result<Batch> {
    let v: Value = serde_json::from_str(s)?;
    batch_from_value(v)
}

/// Finite numbers only. Text, booleans, null and non-finite values are not numeric.
pub fn as_number(v: &Value) -> Option<f64> {
    v.as_f64().filter(|x| x.is_finite())
}

/// Numeric values of `field` paired with the index of the record they came from.
pub fn numeric_series(batch: &[Record], field: &str) -> Vec<(usize, f64)> {
    batch
        .iter()
        .enumerate()
        .filter_map(|(i, rec)| rec.get(field).and_then(as_number).map(|x| (i, x)))
        .collect()
}

/// Stable text key for a scalar, used for frequency tallies and connection keys.
pub fn scalar_key(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            // 10 and 10.0 tally under the same key.
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Counter that remembers first-seen order, so sorting its entries stably
/// breaks ties by insertion.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl Tally {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map(|&pos| self.entries[pos].1).unwrap_or(0)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// Highest counts first; equal counts keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }
}
