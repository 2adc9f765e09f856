use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown screen: {0}")]
    UnknownScreen(String),

    #[error("unknown field '{field}' on screen '{screen}'")]
    UnknownField { screen: String, field: String },
}
