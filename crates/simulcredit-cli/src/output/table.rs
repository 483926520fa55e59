use serde_json::Value;
use std::io::Write;
use tabled::{builder::Builder, Table};

use super::{plain, result_of, row_cells, schedule_rows, SCHEDULE_COLUMNS};

/// Format output as tables using the tabled crate.
///
/// Prints the loan summary as a field/value table, then the schedule (if any)
/// in period order, then warnings and methodology from the envelope.
pub fn write_table<W: Write>(
    out: &mut W,
    value: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = result_of(value);
    let summary = result.get("summary").unwrap_or(result);

    if let Value::Object(map) = summary {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &plain(val)]);
        }
        writeln!(out, "{}", Table::from(builder))?;
    } else {
        writeln!(out, "{}", plain(summary))?;
    }

    if let Some(rows) = schedule_rows(value) {
        let mut builder = Builder::default();
        builder.push_record(SCHEDULE_COLUMNS);
        for row in rows {
            builder.push_record(row_cells(row));
        }
        writeln!(out, "\n{}", Table::from(builder))?;
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            writeln!(out, "\nWarnings:")?;
            for w in warnings.iter().filter_map(Value::as_str) {
                writeln!(out, "  - {}", w)?;
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        writeln!(out, "\nMethodology: {}", meth)?;
    }

    Ok(())
}
