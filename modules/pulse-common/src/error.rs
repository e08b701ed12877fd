use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Summarizer error: {0}")]
    Summarizer(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
