//! Error types for the bookmark browser.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions up to [`AppError`].
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned from the CLI entry point
//!   - [`LoadError`] - Bookmark fetch/parse failures and worker failures during loading
//!   - [`ValidationError`] - Invalid pagination inputs
//!   - [`WorkerError`] - Worker transport failures
//!   - `DomError` - Document skeleton construction
//!   - `ConfigError` / `LoggingError` - Startup failures
//!
//! # Recovery Strategy
//!
//! - **Load errors** fall back to cached data; only without a cache are they
//!   surfaced, through [`LoadError::user_message`].
//! - **Validation errors** are returned to the immediate caller. UI action
//!   handlers log them and keep the last good state.
//! - **Worker errors** discard the worker; it is recreated lazily on next use.
//!   The in-flight request is not retried.
//! - Render-time document errors never reach this taxonomy: each component
//!   replaces itself with a fallback element instead.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;
use crate::dom::DomError;
use crate::logging::LoggingError;

/// Template for load failures shown to the user. `{}` receives the nested message.
pub const LOAD_ERROR_TEMPLATE: &str = "加载书签数据失败：{}";

/// Top-level application error encompassing all failure modes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bookmark data could not be loaded and no cache was available.
    #[error("Failed to load bookmarks: {0}")]
    Load(#[from] LoadError),

    /// Pagination input rejected.
    #[error("Invalid pagination input: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The search worker failed.
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// The document skeleton could not be built.
    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    /// Terminal output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered while fetching and decoding the bookmark tree.
///
/// Variants carry `String` reasons rather than source errors so they can
/// cross the worker boundary inside a response message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The resource could not be read.
    #[error("cannot read {path}: {reason}")]
    Fetch {
        /// Resource path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        reason: String,
    },

    /// The resource is not a valid bookmark tree.
    ///
    /// Raised for malformed JSON and for JSON of any other shape than an
    /// array of `{title, url?, children?}` nodes.
    #[error("invalid bookmark data: {reason}")]
    Parse {
        /// Decoder message.
        reason: String,
    },

    /// The loader worker reported a failure.
    #[error("loader worker failed: {0}")]
    Worker(String),

    /// The loader worker could not be reached.
    #[error("loader worker unavailable: {0}")]
    Transport(#[from] WorkerError),
}

impl LoadError {
    /// Localized message for the full-screen error panel.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookmark_browser::model::error::LoadError;
    ///
    /// let err = LoadError::Parse { reason: "expected array".to_string() };
    /// assert_eq!(err.user_message(), "加载书签数据失败：invalid bookmark data: expected array");
    /// ```
    pub fn user_message(&self) -> String {
        LOAD_ERROR_TEMPLATE.replace("{}", &self.to_string())
    }
}

/// Rejected pagination inputs.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Item totals cannot be negative.
    #[error("total items must be >= 0 (got {0})")]
    NegativeTotal(i64),

    /// Page size must be positive.
    #[error("items per page must be > 0")]
    ZeroPageSize,

    /// The page window must show at least one page.
    #[error("max visible pages must be > 0")]
    ZeroVisiblePages,

    /// A requested page lies outside the available pages.
    #[error("page {page} is outside 1..={total_pages}")]
    PageOutOfRange {
        /// Requested page.
        page: i64,
        /// Pages available.
        total_pages: usize,
    },
}

/// Worker transport failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkerError {
    /// The worker thread could not be started.
    #[error("failed to spawn worker '{name}': {reason}")]
    Spawn {
        /// Worker name.
        name: String,
        /// OS error.
        reason: String,
    },

    /// The worker went away before answering (panic or early exit).
    #[error("worker '{0}' disconnected")]
    Disconnected(String),

    /// No response within the allotted time.
    #[error("worker '{name}' did not answer within {timeout:?}")]
    Timeout {
        /// Worker name.
        name: String,
        /// Time waited.
        timeout: Duration,
    },
}
