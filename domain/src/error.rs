use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: &'static str },
}

pub type DomainResult<T> = Result<T, DomainError>;
