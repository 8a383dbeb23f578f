use thiserror::Error;

#[derive(Error, Debug)]
pub enum VantageError {
    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("flow setup failed: {0}")]
    Flow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VantageError>;
