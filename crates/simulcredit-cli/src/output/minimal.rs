use serde_json::Value;
use std::io::Write;

use super::{plain, result_of};

/// Print just the headline figure: the monthly payment.
///
/// Looks in `result.summary` (schedule command) and then `result` (summary
/// command), falling back to the first field of the result object.
pub fn write_minimal<W: Write>(
    out: &mut W,
    value: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = result_of(value);
    let summary = result.get("summary").unwrap_or(result);

    if let Some(payment) = summary.get("monthly_payment").filter(|v| !v.is_null()) {
        writeln!(out, "{}", plain(payment))?;
        return Ok(());
    }

    if let Some((key, val)) = summary.as_object().and_then(|m| m.iter().next()) {
        writeln!(out, "{}: {}", key, plain(val))?;
        return Ok(());
    }

    writeln!(out, "{}", plain(summary))?;
    Ok(())
}
