use snip_core::StorageError;
use std::fmt::Display;
use thiserror::Error;

/// A single reason an original URL was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Original url can't be blank")]
    Blank,
    #[error("Original url must be a valid HTTP or HTTPS URL")]
    InvalidFormat,
}

/// Every rule an original URL violated. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Option<Self> {
        (!errors.is_empty()).then_some(Self(errors))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn contains(&self, error: ValidationError) -> bool {
        self.0.contains(&error)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable messages, one per violated rule.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Failure to hand out a fresh short code.
#[derive(Debug, Clone, Error)]
pub enum AllocationError {
    #[error("could not generate a unique short code after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    /// The URL was rejected; the caller supplied bad input.
    #[error("invalid url: {0}")]
    Invalid(#[from] ValidationErrors),
    /// No free code was found within the attempt budget; a server-side failure.
    #[error("could not generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<AllocationError> for EncodeError {
    fn from(value: AllocationError) -> Self {
        match value {
            AllocationError::Exhausted { attempts } => Self::GenerationExhausted { attempts },
            AllocationError::Storage(e) => Self::Storage(e),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    #[error("URL not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
