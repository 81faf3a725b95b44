use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error("No historical data for country '{country}'")]
    UnknownCountry { country: String },

    #[error("Kernel bandwidth must be a positive number of days, got {0}")]
    InvalidBandwidth(f64),
}
