//! Transport and application error taxonomies.
//!
//! The two are kept apart on purpose: a [`GrpcErrorCode`] says the call did
//! not complete, an [`ErrorInfo`] says it completed and the word failed.

use std::fmt;

use tonic::Code;

/// Transport-level outcome of a call, as seen across the C boundary.
///
/// The discriminants are part of the C ABI and must not change.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrpcErrorCode {
    Ok = 0,
    InvalidArgument = 1,
    NotFound = 2,
    AlreadyExists = 3,
    PermissionDenied = 4,
    ResourceExhausted = 5,
    FailedPrecondition = 6,
    Aborted = 7,
    OutOfRange = 8,
    Unimplemented = 9,
    Internal = 10,
    Unavailable = 11,
    DataLoss = 12,
    Unauthenticated = 13,
    Unknown = 99,
}

impl From<Code> for GrpcErrorCode {
    fn from(code: Code) -> Self {
        match code {
            Code::Ok => GrpcErrorCode::Ok,
            Code::InvalidArgument => GrpcErrorCode::InvalidArgument,
            Code::NotFound => GrpcErrorCode::NotFound,
            Code::AlreadyExists => GrpcErrorCode::AlreadyExists,
            Code::PermissionDenied => GrpcErrorCode::PermissionDenied,
            Code::ResourceExhausted => GrpcErrorCode::ResourceExhausted,
            Code::FailedPrecondition => GrpcErrorCode::FailedPrecondition,
            Code::Aborted => GrpcErrorCode::Aborted,
            Code::OutOfRange => GrpcErrorCode::OutOfRange,
            Code::Unimplemented => GrpcErrorCode::Unimplemented,
            Code::Internal => GrpcErrorCode::Internal,
            Code::Unavailable => GrpcErrorCode::Unavailable,
            Code::DataLoss => GrpcErrorCode::DataLoss,
            Code::Unauthenticated => GrpcErrorCode::Unauthenticated,
            Code::Cancelled | Code::DeadlineExceeded | Code::Unknown => GrpcErrorCode::Unknown,
        }
    }
}

impl From<&tonic::Status> for GrpcErrorCode {
    fn from(status: &tonic::Status) -> Self {
        GrpcErrorCode::from(status.code())
    }
}

/// Map a raw gRPC status number. Values outside the gRPC range are `Unknown`.
pub fn code_from_raw_status(raw: i32) -> GrpcErrorCode {
    GrpcErrorCode::from(Code::from_i32(raw))
}

/// A word that ran in the remote runtime and failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    /// Name of the runtime that raised the error.
    pub runtime: String,
    /// Categorical type, e.g. `UnknownWord`.
    pub error_type: String,
}

impl ErrorInfo {
    pub fn new(
        message: impl Into<String>,
        runtime: impl Into<String>,
        error_type: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            runtime: runtime.into(),
            error_type: error_type.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)?;
        if !self.runtime.is_empty() {
            write!(f, " ({})", self.runtime)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorInfo {}

/// Failures of a client operation that never produced a response.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("gRPC {:?}: {}", .0.code(), .0.message())]
    Transport(#[from] tonic::Status),
    #[error("failed to start client runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl ClientError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ClientError::InvalidArgument(message.into())
    }

    /// Project this error onto the transport taxonomy.
    pub fn code(&self) -> GrpcErrorCode {
        match self {
            ClientError::InvalidArgument(_) => GrpcErrorCode::InvalidArgument,
            ClientError::Transport(status) => GrpcErrorCode::from(status),
            ClientError::Runtime(_) => GrpcErrorCode::Internal,
        }
    }
}
