use thiserror::Error;

use crate::{encoding::EncodeError, mapper::MappingError, params::ParameterError};

pub type LocalHashingResult<T> = Result<T, LocalHashingError>;

#[derive(Debug, Error)]
pub enum LocalHashingError {
    #[error(transparent)]
    InvalidParameter(#[from] ParameterError),
    #[error(transparent)]
    IndexMapping(#[from] MappingError),
    #[error(transparent)]
    IndexOutOfRange(#[from] EncodeError),
    #[error("randomness source failed: {0}")]
    Randomness(#[from] rand::Error),
}
