//! Table - Column Definitions and Cell Formatting for Equipment Rows

use crate::constants::CELL_PLACEHOLDER;

use super::equipment::EquipmentRow;
use super::summary::Summary;

/// Columns of the equipment table, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    EquipmentName,
    Type,
    Flowrate,
    Pressure,
    Temperature,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::EquipmentName,
        Column::Type,
        Column::Flowrate,
        Column::Pressure,
        Column::Temperature,
    ];

    /// Header label
    pub fn label(&self) -> &'static str {
        match self {
            Column::EquipmentName => "Equipment Name",
            Column::Type => "Type",
            Column::Flowrate => "Flowrate",
            Column::Pressure => "Pressure",
            Column::Temperature => "Temperature",
        }
    }

    /// Render the cell for this column, placeholder when absent
    pub fn render_cell(&self, row: &EquipmentRow) -> String {
        match self {
            Column::EquipmentName => text_cell(row.equipment_name.as_deref()),
            Column::Type => text_cell(row.equipment_type.as_deref()),
            Column::Flowrate => number_cell(row.flowrate),
            Column::Pressure => number_cell(row.pressure),
            Column::Temperature => number_cell(row.temperature),
        }
    }
}

/// All cells of a row, in column order
pub fn render_row(row: &EquipmentRow) -> Vec<String> {
    Column::ALL.iter().map(|c| c.render_cell(row)).collect()
}

fn text_cell(value: Option<&str>) -> String {
    value.unwrap_or(CELL_PLACEHOLDER).to_string()
}

/// Whole numbers print without a fraction, everything else as-is
pub fn number_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) if v.is_finite() => v.to_string(),
        _ => CELL_PLACEHOLDER.to_string(),
    }
}

/// Label/value pairs for the summary cards
pub fn summary_cards(summary: &Summary) -> [(&'static str, String); 4] {
    [
        ("Total Equipment Count", summary.total_count.to_string()),
        ("Avg Flowrate", number_cell(Some(summary.avg_flowrate))),
        ("Avg Pressure", number_cell(Some(summary.avg_pressure))),
        ("Avg Temperature", number_cell(Some(summary.avg_temperature))),
    ]
}
