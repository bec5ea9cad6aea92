use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Degenerate state: {0}")]
    DegenerateState(&'static str),

    #[error("Trader {trader} already has a recorded sale")]
    SaleAlreadyRecorded { trader: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;

impl SimulationError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Whether this error only means "this venue cannot take the trade".
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateState(_))
    }
}

/// Rejects negative, NaN and infinite trade amounts.
pub(crate) fn check_amount(name: &'static str, amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(SimulationError::invalid(name, format!("{amount} is not finite")));
    }
    if amount < 0.0 {
        return Err(SimulationError::invalid(name, format!("{amount} is negative")));
    }
    Ok(())
}
