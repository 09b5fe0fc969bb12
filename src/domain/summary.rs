//! Summary - Server-Computed Aggregate Statistics

use hashlink::LinkedHashMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Per-type statistics for one equipment type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeStat {
    #[serde(default, deserialize_with = "de_count")]
    pub count: u64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub avg_temperature: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub avg_pressure: f64,
}

/// Type label -> statistics, in the order the server listed them
pub type TypeStats = LinkedHashMap<String, TypeStat>;

/// Type label -> count, in the order the server listed them
pub type TypeDistribution = LinkedHashMap<String, u64>;

/// Aggregate statistics for one dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Row count (sent as a float by the server)
    #[serde(default, deserialize_with = "de_count")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub avg_flowrate: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub avg_pressure: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub avg_temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_stats: Option<TypeStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_distribution: Option<TypeDistribution>,
}

/// Accepts integers, floats (`3.0`), and null
fn de_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    match value {
        None => Ok(0),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v.round() as u64),
        Some(v) => Err(serde::de::Error::custom(format!("invalid count {v}"))),
    }
}

/// Null (the server's NaN for empty groups) reads as zero
fn number_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}
