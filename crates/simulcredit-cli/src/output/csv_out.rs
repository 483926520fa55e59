use serde_json::Value;
use std::io::Write;

use super::{plain, result_of, row_cells, schedule_rows, SCHEDULE_COLUMNS};

/// Write output as CSV.
///
/// A schedule envelope exports one record per period in schedule order with
/// the figures exactly as emitted by the engine. Anything else is written as
/// two-column `field,value` pairs.
pub fn write_csv<W: Write>(out: &mut W, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(out);

    if let Some(rows) = schedule_rows(value) {
        wtr.write_record(SCHEDULE_COLUMNS)?;
        for row in rows {
            wtr.write_record(row_cells(row))?;
        }
    } else if let Value::Object(map) = result_of(value) {
        wtr.write_record(["field", "value"])?;
        for (key, val) in map {
            wtr.write_record([key.as_str(), &plain(val)])?;
        }
    } else {
        wtr.write_record([plain(value)])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::{render, standard_envelope, zero_rate_envelope};

    #[test]
    fn test_schedule_csv_header_and_order() {
        let value = zero_rate_envelope();
        let text = render(|buf| write_csv(buf, &value));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 13);
        assert_eq!(
            lines[0],
            "period,payment_total,principal_portion,interest_portion,remaining_balance"
        );
        assert_eq!(lines[1], "1,100.00,100.00,0.00,1100.00");
        assert_eq!(lines[12], "12,100.00,100.00,0.00,0.00");
    }

    #[test]
    fn test_schedule_csv_keeps_emitted_precision() {
        let value = standard_envelope();
        let text = render(|buf| write_csv(buf, &value));
        assert_eq!(text.lines().nth(1), Some("1,888.49,788.49,100.00,9211.51"));
    }

    #[test]
    fn test_summary_csv_is_field_value() {
        let value = serde_json::json!({ "result": { "monthly_payment": "888.49" } });
        let text = render(|buf| write_csv(buf, &value));
        assert_eq!(text, "field,value\nmonthly_payment,888.49\n");
    }
}
