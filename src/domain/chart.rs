//! Chart - Chart-Ready Series Derived from a Summary
//!
//! Per-type statistics are the authoritative source. When a summary carries
//! none (older datasets), the plain type distribution still yields a count
//! series, but no temperature or pressure series.

use serde::Serialize;

use crate::constants::CHART_COLORS;

use super::summary::Summary;

/// Which breakdown the series were read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeriesSource {
    TypeStats,
    TypeDistribution,
}

/// Series aligned by index with `labels`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub source: SeriesSource,
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
    /// `None` when the counts sum to zero (share undefined)
    pub percentages: Option<Vec<u64>>,
    pub avg_temperatures: Option<Vec<f64>>,
    pub avg_pressures: Option<Vec<f64>>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Colour for the label at `index`
    pub fn color(&self, index: usize) -> &'static str {
        CHART_COLORS[index % CHART_COLORS.len()]
    }

    /// Whether the share (pie) view has anything to show
    pub fn has_shares(&self) -> bool {
        self.percentages.is_some()
    }
}

/// Result of deriving chart data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartData {
    /// Show a placeholder instead of charts
    NoData,
    Series(ChartSeries),
}

impl ChartData {
    pub fn series(&self) -> Option<&ChartSeries> {
        match self {
            ChartData::NoData => None,
            ChartData::Series(series) => Some(series),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ChartData::NoData)
    }
}

/// Derive chart series from a summary
pub fn derive_chart_series(summary: Option<&Summary>) -> ChartData {
    let Some(summary) = summary else {
        return ChartData::NoData;
    };

    let series = match summary.type_stats.as_ref().filter(|s| !s.is_empty()) {
        Some(stats) => {
            let labels: Vec<String> = stats.keys().cloned().collect();
            let counts: Vec<u64> = stats.values().map(|s| s.count).collect();
            let avg_temperatures: Vec<f64> = stats.values().map(|s| s.avg_temperature).collect();
            let avg_pressures: Vec<f64> = stats.values().map(|s| s.avg_pressure).collect();
            ChartSeries {
                source: SeriesSource::TypeStats,
                percentages: percentages(&counts),
                labels,
                counts,
                avg_temperatures: Some(avg_temperatures),
                avg_pressures: Some(avg_pressures),
            }
        }
        None => {
            let Some(dist) = summary.type_distribution.as_ref().filter(|d| !d.is_empty()) else {
                return ChartData::NoData;
            };
            let labels: Vec<String> = dist.keys().cloned().collect();
            let counts: Vec<u64> = dist.values().copied().collect();
            ChartSeries {
                source: SeriesSource::TypeDistribution,
                percentages: percentages(&counts),
                labels,
                counts,
                avg_temperatures: None,
                avg_pressures: None,
            }
        }
    };

    ChartData::Series(series)
}

/// Share of each count, rounded half away from zero
fn percentages(counts: &[u64]) -> Option<Vec<u64>> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return None;
    }
    Some(
        counts
            .iter()
            .map(|&c| (100.0 * c as f64 / total as f64).round() as u64)
            .collect(),
    )
}
