use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulcreditError {
    #[error("Invalid request: {field} — {reason}")]
    InvalidRequest { field: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimulcreditError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SimulcreditError::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A figure derived from the request does not fit the 96-bit decimal range.
    pub(crate) fn out_of_range(quantity: &str) -> Self {
        SimulcreditError::InvalidRequest {
            field: "request".into(),
            reason: format!("{quantity} exceeds the representable decimal range"),
        }
    }
}

impl From<serde_json::Error> for SimulcreditError {
    fn from(e: serde_json::Error) -> Self {
        SimulcreditError::Serialization(e.to_string())
    }
}
