use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid census tract '{value}': expected DDDD.DD or 0000NAN")]
    InvalidTract { value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
