use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("state read failed: {0}")]
    StateRead(anyhow::Error),
    #[error("convergence executor failed: {0}")]
    Execute(anyhow::Error),
}
