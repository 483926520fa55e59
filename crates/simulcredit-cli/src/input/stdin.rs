use serde_json::Value;
use std::io::{self, Read};

/// Read piped JSON from stdin.
/// Returns None when stdin is an interactive terminal or the pipe is empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    parse_piped(&buffer)
}

fn parse_piped(raw: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pipe_is_none() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_piped_loan_json() {
        let value = parse_piped(r#"{"principal": "1200", "annual_rate_percent": 0, "term_periods": 12}"#)
            .unwrap()
            .unwrap();
        assert_eq!(value["term_periods"], 12);
    }

    #[test]
    fn test_malformed_pipe_is_error() {
        assert!(parse_piped("{not json").is_err());
    }
}
