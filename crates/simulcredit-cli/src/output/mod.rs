pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;
use std::io;

/// Schedule columns in export order.
pub const SCHEDULE_COLUMNS: [&str; 5] = [
    "period",
    "payment_total",
    "principal_portion",
    "interest_portion",
    "remaining_balance",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(
    format: &OutputFormat,
    value: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => json::write_json(&mut out, value)?,
        OutputFormat::Table => table::write_table(&mut out, value)?,
        OutputFormat::Csv => csv_out::write_csv(&mut out, value)?,
        OutputFormat::Minimal => minimal::write_minimal(&mut out, value)?,
    }
    Ok(())
}

/// The `result` object of an output envelope, or the value itself.
pub fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Schedule rows of a `schedule` envelope, if present.
pub fn schedule_rows(value: &Value) -> Option<&Vec<Value>> {
    result_of(value).get("schedule").and_then(Value::as_array)
}

/// Render a JSON scalar as plain text. Decimals arrive as strings and are
/// passed through untouched.
pub fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Cells of one schedule row in [`SCHEDULE_COLUMNS`] order.
pub fn row_cells(row: &Value) -> Vec<String> {
    SCHEDULE_COLUMNS
        .iter()
        .map(|c| row.get(*c).map(plain).unwrap_or_default())
        .collect()
}
