use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use simulcredit_core::amortization::{
    self, AmortizationInput, BalanceCarry, LoanRequest, ScheduleOptions,
};
use simulcredit_core::{ComputationOutput, SimulcreditError};

use crate::input;

/// How the running balance is carried between periods
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum CarryArg {
    /// Round the balance to cents after every period
    #[default]
    Rounded,
    /// Carry the exact balance; round only the printed figures
    FullPrecision,
}

impl From<CarryArg> for BalanceCarry {
    fn from(arg: CarryArg) -> Self {
        match arg {
            CarryArg::Rounded => BalanceCarry::Rounded,
            CarryArg::FullPrecision => BalanceCarry::FullPrecision,
        }
    }
}

/// Arguments shared by the schedule and summary commands
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual nominal rate in percent (12.5 = 12.5%/year)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "months")]
    pub term: Option<u32>,

    /// Balance carry policy
    #[arg(long, value_enum, default_value_t = CarryArg::Rounded)]
    pub balance_carry: CarryArg,
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = resolve_input(args)?;
    schedule_envelope(&loan_input)
}

pub fn run_summary(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = resolve_input(args)?;
    summary_envelope(&loan_input)
}

fn schedule_envelope(loan_input: &AmortizationInput) -> Result<Value, Box<dyn std::error::Error>> {
    let output = amortization::amortize(loan_input)?;
    Ok(serde_json::to_value(output).map_err(SimulcreditError::from)?)
}

fn summary_envelope(loan_input: &AmortizationInput) -> Result<Value, Box<dyn std::error::Error>> {
    let output = amortization::amortize(loan_input)?;
    let summary_only = ComputationOutput {
        result: output.result.summary,
        methodology: output.methodology,
        assumptions: output.assumptions,
        warnings: output.warnings,
        metadata: output.metadata,
    };
    Ok(serde_json::to_value(summary_only).map_err(SimulcreditError::from)?)
}

/// Stdin is only consulted when no input file was given.
fn resolve_input(args: LoanArgs) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    let piped = if args.input.is_none() {
        input::stdin::read_stdin()?
    } else {
        None
    };
    resolve_from(args, piped)
}

/// File input first, then piped JSON, then individual flags.
fn resolve_from(
    args: LoanArgs,
    piped: Option<Value>,
) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        debug!(path = %path, "reading loan input from file");
        return input::file::read_json(path);
    }

    if let Some(data) = piped {
        debug!("reading loan input from stdin");
        return Ok(AmortizationInput::from_value(data)?);
    }

    let loan = LoanRequest {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate_percent: args
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?,
        term_periods: args.term.ok_or("--term is required (or provide --input)")?,
    };

    Ok(AmortizationInput {
        loan,
        options: ScheduleOptions {
            balance_carry: args.balance_carry.into(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    fn flags(principal: Decimal, rate: Decimal, term: Option<u32>) -> LoanArgs {
        LoanArgs {
            input: None,
            principal: Some(principal),
            annual_rate: Some(rate),
            term,
            balance_carry: CarryArg::Rounded,
        }
    }

    fn temp_loan_file(tag: &str, json: &str) -> String {
        let path = std::env::temp_dir().join(format!(
            "simulcredit-{}-{}.json",
            tag,
            std::process::id()
        ));
        fs::write(&path, json).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_flags_build_input() {
        let mut args = flags(dec!(10000), dec!(12), Some(12));
        args.balance_carry = CarryArg::FullPrecision;

        let resolved = resolve_from(args, None).unwrap();
        assert_eq!(
            resolved,
            AmortizationInput {
                loan: LoanRequest {
                    principal: dec!(10000),
                    annual_rate_percent: dec!(12),
                    term_periods: 12,
                },
                options: ScheduleOptions {
                    balance_carry: BalanceCarry::FullPrecision,
                },
            }
        );
    }

    #[test]
    fn test_missing_term_flag_is_error() {
        let err = resolve_from(flags(dec!(10000), dec!(12), None), None).unwrap_err();
        assert_eq!(err.to_string(), "--term is required (or provide --input)");
    }

    #[test]
    fn test_missing_principal_flag_is_error() {
        let mut args = flags(dec!(1), dec!(12), Some(12));
        args.principal = None;
        let err = resolve_from(args, None).unwrap_err();
        assert!(err.to_string().starts_with("--principal is required"));
    }

    #[test]
    fn test_piped_json_beats_flags() {
        let piped = serde_json::json!({
            "principal": "1200",
            "annual_rate_percent": 0,
            "term_periods": 6
        });
        let resolved = resolve_from(flags(dec!(10000), dec!(12), Some(12)), Some(piped)).unwrap();
        assert_eq!(resolved.loan.principal, dec!(1200));
        assert_eq!(resolved.loan.term_periods, 6);
        assert_eq!(resolved.options.balance_carry, BalanceCarry::Rounded);
    }

    #[test]
    fn test_file_beats_piped_json() {
        let path = temp_loan_file(
            "precedence",
            r#"{"principal": "5000", "annual_rate_percent": "7.5", "term_periods": 36}"#,
        );
        let mut args = flags(dec!(10000), dec!(12), Some(12));
        args.input = Some(path.clone());
        let piped = serde_json::json!({
            "principal": "1200",
            "annual_rate_percent": 0,
            "term_periods": 6
        });

        let resolved = resolve_from(args, Some(piped)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(resolved.loan.principal, dec!(5000));
        assert_eq!(resolved.loan.term_periods, 36);
    }

    #[test]
    fn test_malformed_piped_json_is_error() {
        let piped = serde_json::json!({ "principal": "1200" });
        let err = resolve_from(flags(dec!(1), dec!(1), Some(1)), Some(piped)).unwrap_err();
        assert!(err.to_string().starts_with("Serialization error"));
    }

    #[test]
    fn test_run_summary_returns_only_summary() {
        let path = temp_loan_file(
            "summary",
            r#"{"principal": "10000", "annual_rate_percent": 12, "term_periods": 12}"#,
        );
        let args = LoanArgs {
            input: Some(path.clone()),
            principal: None,
            annual_rate: None,
            term: None,
            balance_carry: CarryArg::Rounded,
        };

        let value = run_summary(args).unwrap();
        fs::remove_file(&path).unwrap();

        let result = &value["result"];
        assert_eq!(result["monthly_payment"], "888.49");
        assert_eq!(result["repayment_method"], "annuity");
        assert!(result.get("schedule").is_none());
        assert!(result.get("summary").is_none());
        assert!(value["methodology"].is_string());
    }

    #[test]
    fn test_schedule_envelope_carries_rows() {
        let loan_input = AmortizationInput::new(LoanRequest::new(dec!(1200), dec!(0), 12).unwrap());
        let value = schedule_envelope(&loan_input).unwrap();
        assert_eq!(value["result"]["schedule"].as_array().map(Vec::len), Some(12));
        assert_eq!(value["result"]["summary"]["monthly_payment"], "100.00");
    }

    #[test]
    fn test_invalid_flags_surface_engine_error() {
        let loan_input = AmortizationInput::new(LoanRequest {
            principal: dec!(0),
            annual_rate_percent: dec!(5),
            term_periods: 12,
        });
        let err = summary_envelope(&loan_input).unwrap_err();
        assert!(err.to_string().starts_with("Invalid request: principal"));
    }
}
