//! Centralized Error Handling Module
//!
//! Every failure carries a unique code so logs can be grepped and monitored.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - LOC_xxx: Location source errors
//! - HISTORY_xxx: History store errors
//! - CFG_xxx: Configuration errors
//!
//! The scoring engine itself never fails; these errors come from the data
//! sources and stores around it, and the monitor turns them into fallbacks.

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Location Errors
    // ============================================
    /// Positioning not supported or permission denied
    LocationUnavailable,
    /// Positioning did not answer in time
    LocationTimeout,

    // ============================================
    // History Errors
    // ============================================
    /// Reading or writing the history file failed
    HistoryIo,
    /// History file exists but is not valid JSON
    HistoryCorrupt,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocationUnavailable => "LOC_UNAVAILABLE",
            Self::LocationTimeout => "LOC_TIMEOUT",
            Self::HistoryIo => "HISTORY_IO",
            Self::HistoryCorrupt => "HISTORY_CORRUPT",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Check if error is transient
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LocationTimeout | Self::HistoryIo)
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Location source unavailable
    pub fn location_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::LocationUnavailable, msg)
    }

    /// Location source timed out
    pub fn location_timeout(after: std::time::Duration) -> Self {
        Self::new(
            ErrorCode::LocationTimeout,
            format!("No location fix within {}s", after.as_secs()),
        )
    }

    /// History file is not valid JSON
    pub fn history_corrupt(source: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::HistoryCorrupt, "History file is not valid JSON", source)
    }

    /// Invalid configuration value
    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {:?}", key, value),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::HistoryIo, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::history_corrupt(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_codes() {
        let err = AppError::location_timeout(Duration::from_secs(10));
        assert_eq!(err.code, ErrorCode::LocationTimeout);
        assert_eq!(err.code_str(), "LOC_TIMEOUT");
        assert_eq!(err.to_string(), "[LOC_TIMEOUT] No location fix within 10s");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::LocationTimeout.is_retryable());
        assert!(ErrorCode::HistoryIo.is_retryable());
        assert!(!ErrorCode::HistoryCorrupt.is_retryable());
        assert!(!ErrorCode::ConfigInvalidValue.is_retryable());
    }

    #[test]
    fn test_io_conversion_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert_eq!(err.code, ErrorCode::HistoryIo);
        assert!(std::error::Error::source(&err).is_some());
    }
}
