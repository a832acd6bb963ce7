use smart_sender::SenderError;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read keypair {path}: {reason}")]
    Keypair { path: String, reason: String },

    #[error("Send failed: {0}")]
    Sender(#[from] SenderError),

    #[error("{failed} of {total} transactions were not delivered")]
    DeliveryIncomplete { failed: usize, total: usize },
}
