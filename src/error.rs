use thiserror::Error;

/// Everything that can go wrong talking to the game service.
///
/// The `Display` text is what the player sees in the error notice, so the
/// service's own message is passed through unchanged where there is one.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("could not reach the game server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from the game server: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no game in progress")]
    NoSession,
    #[error("move rejected: {0}")]
    Rejected(String),
    #[error("{0} is not supported by this server")]
    Unsupported(&'static str),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ClientError::Status { status, message: message.into() }
    }
}
