//! Error types for the multiview GL context
//!
//! Every entry point of the context returns a `Result`. The failing variant
//! maps onto a GL error code which the context also records as its sticky
//! error state (see `Context::get_error`).

use std::fmt;

/// Result type for multiview GL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Multiview GL errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Token not accepted by the entry point (or not exposed without its extension)
    InvalidEnum(String),

    /// Malformed numeric argument (negative count, index out of range, ...)
    InvalidValue(String),

    /// Entry point not allowed in the current state
    InvalidOperation(String),

    /// Framebuffer incomplete or in a state the operation cannot use
    InvalidFramebufferOperation(String),

    /// Texel storage could not be allocated
    OutOfMemory,

    /// Driver or context registry misuse
    InitializationFailed(String),
}

/// GL error code reported by `Context::get_error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError,
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
}

impl Error {
    /// GL error code this error is recorded as
    ///
    /// Registry errors never reach a context, they report as `InvalidOperation`.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidEnum(_) => ErrorCode::InvalidEnum,
            Error::InvalidValue(_) => ErrorCode::InvalidValue,
            Error::InvalidOperation(_) => ErrorCode::InvalidOperation,
            Error::InvalidFramebufferOperation(_) => ErrorCode::InvalidFramebufferOperation,
            Error::OutOfMemory => ErrorCode::OutOfMemory,
            Error::InitializationFailed(_) => ErrorCode::InvalidOperation,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidEnum(msg) => write!(f, "Invalid enum: {}", msg),
            Error::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Error::InvalidFramebufferOperation(msg) => {
                write!(f, "Invalid framebuffer operation: {}", msg)
            }
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::NoError => "GL_NO_ERROR",
            ErrorCode::InvalidEnum => "GL_INVALID_ENUM",
            ErrorCode::InvalidValue => "GL_INVALID_VALUE",
            ErrorCode::InvalidOperation => "GL_INVALID_OPERATION",
            ErrorCode::InvalidFramebufferOperation => "GL_INVALID_FRAMEBUFFER_OPERATION",
            ErrorCode::OutOfMemory => "GL_OUT_OF_MEMORY",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
