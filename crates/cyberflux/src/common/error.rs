use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CyberfluxError {
    #[error("Cannot read configuration file {}: {source}", path.display())]
    ConfigFileError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Simulation error: {0}")]
    SimulationError(#[from] fluxcore::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<toml::de::Error> for CyberfluxError {
    fn from(error: toml::de::Error) -> Self {
        Self::DeserializationError(error.to_string())
    }
}
