use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankScopeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Export error: {0}")]
    Export(String),
}
