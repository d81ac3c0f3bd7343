use std::fmt::{Display, Formatter};

use thiserror::Error;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// The remote call a failure belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Banner text used when this operation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Fetch => "Failed to fetch users",
            Operation::Create => "Failed to add user",
            Operation::Update => "Failed to update user",
            Operation::Delete => "Failed to delete user",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// The only failure kind of the remote API: the call did not succeed.
///
/// Network errors, non-2xx statuses and undecodable bodies all collapse into
/// this variant; the message carries whatever detail was available.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("{message}")]
    RequestFailed { operation: Operation, message: String },
}

impl ApiError {
    pub fn request_failed(operation: Operation, detail: impl Display) -> Self {
        ApiError::RequestFailed {
            operation,
            message: format!("{} ({detail})", operation.failure_message()),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ApiError::RequestFailed { operation, .. } => *operation,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::RequestFailed { message, .. } => message,
        }
    }
}

pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

#[derive(Debug)]
pub struct WithContextError {
    pub context: String,
    pub source: DynError,
}

impl Display for WithContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for WithContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(WithContextError {
                context: f(),
                source: e.into(),
            }) as DynError
        })
    }
}

#[derive(Debug)]
pub struct SimpleError(pub String);

impl SimpleError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl Display for SimpleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleError {}

pub fn simple_error(msg: impl Into<String>) -> DynError {
    Box::new(SimpleError::new(msg))
}
