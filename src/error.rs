//! Application error type.
//!
//! Every fallible operation in the crate returns `AppError`. The `kind` drives
//! the process exit code and lets callers branch on the failure class (e.g. the
//! audit resolver treats every kind as "leave the record pending").

/// Failure classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad argument or configuration value.
    InvalidInput,
    /// EUR/EUR is not a cross-rate.
    InvalidPair,
    /// Currency code outside the supported set.
    UnsupportedCurrency,
    /// A required leg has fewer observations than the model window.
    InsufficientHistory,
    /// No trained model artifact exists for a leg.
    ModelUnavailable,
    /// Transient fetch failure. Never cached; retried on the next call.
    ProviderUnavailable,
    /// Audit store or artifact file I/O failure.
    Storage,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::InvalidPair | ErrorKind::UnsupportedCurrency => 2,
            ErrorKind::InsufficientHistory | ErrorKind::ModelUnavailable => 3,
            ErrorKind::ProviderUnavailable | ErrorKind::Storage => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProviderUnavailable, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::new(ErrorKind::InvalidPair, "x").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::InsufficientHistory, "x").exit_code(), 3);
        assert_eq!(AppError::provider("x").exit_code(), 4);
        assert_eq!(AppError::provider("down").to_string(), "down");
    }
}
