use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Agent '{agent_id}' not found")]
    AgentNotFound { agent_id: String },

    #[error("Agent '{agent_id}' is not allowed to {action}")]
    Forbidden { agent_id: String, action: String },

    #[error("Corrupt amount in column '{column}': {value}")]
    CorruptAmount { column: String, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DeskResult<T> = Result<T, DeskError>;
