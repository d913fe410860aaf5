// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// The taxonomy follows how each error is handled: `Config` aborts the
/// run before any request, `Transport` costs a single page, `Storage`
/// is logged and skipped, `Parse` degrades a single field to null.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration. Fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A page request failed at the transport level (non-200 status or
    /// network failure). Costs that page only.
    #[error("Transport error for {context}: {message}")]
    Transport { context: String, message: String },

    /// Raw archival or output write failed. Non-fatal.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A field was missing or malformed during normalization.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction or request dispatch failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a transport error with context.
    pub fn transport(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
