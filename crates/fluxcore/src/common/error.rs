use thiserror::Error;

#[derive(Debug, Error)]
pub enum FluxError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
