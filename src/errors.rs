//! # Application Error Types
//!
//! This module defines the error taxonomy used throughout the assistant bot.
//! Every failure is per-request: it is reported to the originating chat and
//! never terminates the dispatch loop or the scheduler.

use std::fmt;

/// Malformed user input, surfaced to the user as a corrective usage message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// Time of day is not a valid `HH:MM` pair
    TimeFormat(String),
    /// Reminder delay is zero or negative
    Duration(i64),
    /// Notification kind is neither `weather` nor `news`
    Kind(String),
    /// Language code is not in the supported language table
    Language(String),
    /// A numeric argument could not be parsed
    Number(String),
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidInput::TimeFormat(value) => write!(f, "invalid time format: {}", value),
            InvalidInput::Duration(value) => write!(f, "invalid duration: {}", value),
            InvalidInput::Kind(value) => write!(f, "invalid notification kind: {}", value),
            InvalidInput::Language(value) => write!(f, "unsupported language: {}", value),
            InvalidInput::Number(value) => write!(f, "invalid number: {}", value),
        }
    }
}

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Malformed command arguments
    InvalidInput(InvalidInput),
    /// The requested entity does not exist (non-fatal, plain notice)
    NotFound(String),
    /// An external collaborator failed or returned unusable data
    ExternalUnavailable(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::InvalidInput(input) => write!(f, "[INVALID_INPUT] {}", input),
            AppError::NotFound(msg) => write!(f, "[NOT_FOUND] {}", msg),
            AppError::ExternalUnavailable(msg) => write!(f, "[EXTERNAL] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<InvalidInput> for AppError {
    fn from(input: InvalidInput) -> Self {
        AppError::InvalidInput(input)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalUnavailable(err.to_string())
    }
}

impl AppError {
    /// Short, stable label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::ExternalUnavailable(_) => "external_unavailable",
            AppError::Internal(_) => "internal",
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::{error, warn};

    /// Log external provider errors with request context
    pub fn log_external_error(
        error: &impl std::fmt::Display,
        provider: &str,
        operation: &str,
        chat_id: Option<i64>,
    ) {
        error!(
            error = %error,
            provider = %provider,
            operation = %operation,
            chat_id = ?chat_id,
            "External provider call failed"
        );
    }

    /// Log validation errors with input context
    pub fn log_validation_error(
        error: &impl std::fmt::Display,
        operation: &str,
        chat_id: Option<i64>,
        input_value: Option<&str>,
    ) {
        warn!(
            error = %error,
            operation = %operation,
            chat_id = ?chat_id,
            input_value = ?input_value.map(truncate_for_log),
            "Validation failed"
        );
    }

    fn truncate_for_log(value: &str) -> String {
        if value.chars().count() > 100 {
            format!("{}...", value.chars().take(100).collect::<String>())
        } else {
            value.to_string()
        }
    }

    /// Log scheduled job failures
    pub fn log_job_error(error: &impl std::fmt::Display, job_kind: &str, chat_id: i64) {
        error!(
            error = %error,
            job_kind = %job_kind,
            chat_id = %chat_id,
            "Scheduled job failed"
        );
    }

    /// Log internal application errors with component context
    pub fn log_internal_error(
        error: &impl std::fmt::Display,
        component: &str,
        operation: &str,
        chat_id: Option<i64>,
    ) {
        error!(
            error = %error,
            component = %component,
            operation = %operation,
            chat_id = ?chat_id,
            "Internal application error"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}
