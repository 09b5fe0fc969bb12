//! Equipment - Canonical Equipment Rows
//!
//! Rows arrive keyed either by the CSV headers (`"Equipment Name"`) or in
//! snake case (`equipment_name`). They are normalized here, once, so nothing
//! downstream deals with two spellings.

use serde::Serialize;
use serde_json::{Map, Value};

/// A row as delivered by the server, before normalization
pub type RawRow = Map<String, Value>;

/// A single equipment reading
///
/// Fields are `None` when the source row carried neither spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EquipmentRow {
    pub equipment_name: Option<String>,
    pub equipment_type: Option<String>,
    pub flowrate: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
}

impl EquipmentRow {
    /// Normalize a raw row, preferring the CSV header spelling
    pub fn from_raw(raw: &RawRow) -> Self {
        Self {
            equipment_name: text_field(raw, "Equipment Name", "equipment_name"),
            equipment_type: text_field(raw, "Type", "type"),
            flowrate: number_field(raw, "Flowrate", "flowrate"),
            pressure: number_field(raw, "Pressure", "pressure"),
            temperature: number_field(raw, "Temperature", "temperature"),
        }
    }

    /// Normalize every row of a dataset, keeping order
    pub fn from_raw_rows(raw: &[RawRow]) -> Vec<Self> {
        raw.iter().map(Self::from_raw).collect()
    }
}

/// First non-null value under either key
fn lookup<'a>(raw: &'a RawRow, human: &str, snake: &str) -> Option<&'a Value> {
    raw.get(human)
        .filter(|v| !v.is_null())
        .or_else(|| raw.get(snake).filter(|v| !v.is_null()))
}

fn text_field(raw: &RawRow, human: &str, snake: &str) -> Option<String> {
    match lookup(raw, human, snake)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number_field(raw: &RawRow, human: &str, snake: &str) -> Option<f64> {
    match lookup(raw, human, snake)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
