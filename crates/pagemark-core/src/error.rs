use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageMarkError {
    #[error("no active page")]
    NoActivePage,

    #[error("unsupported origin: {0}")]
    UnsupportedOrigin(String),

    #[error("page agent unreachable: {0}")]
    AgentUnreachable(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("handler fault: {0}")]
    HandlerFault(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PageMarkError>;
