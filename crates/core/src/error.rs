use thiserror::Error;

#[derive(Error, Debug)]
pub enum GempaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Notification setting not found: {0}")]
    SettingNotFound(String),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("{0}")]
    Other(String),
}
