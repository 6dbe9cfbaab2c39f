//! Error types for the Math Club lesson core.
//!
//! This module defines the error hierarchy for every core operation:
//! configuration loading, author input validation, stage navigation,
//! image uploads, lesson generation and snapshot persistence.

use std::path::PathBuf;

/// A specialized `Result` type for lesson core operations.
pub type Result<T> = std::result::Result<T, LessonError>;

/// Errors that can occur while building, navigating or saving a lesson.
///
/// Variants carry an actionable suggestion where one exists so the author
/// surface can show the message inline without further formatting.
#[derive(Debug, thiserror::Error)]
pub enum LessonError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax or an unknown enum value in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your mathclub.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Author Input Errors
    // ========================================================================
    /// Required author input is missing or invalid.
    #[error("{message}")]
    Validation {
        /// Message shown to the author.
        message: String,
    },

    /// A stage index outside the current lesson was addressed.
    #[error("Stage {index} does not exist (lesson has {len} stages)")]
    StageOutOfRange {
        /// The requested zero-based stage index.
        index: usize,
        /// Number of stages in the current lesson.
        len: usize,
    },

    /// Uploaded file is not a PNG or JPG image.
    #[error("Unsupported image '{file_name}'\n\nSuggestion: Upload a .png or .jpg file")]
    UnsupportedImageFormat {
        /// Name of the rejected file.
        file_name: String,
    },

    /// Uploaded image exceeds the configured size limit.
    #[error("Image '{file_name}' is {size} bytes, over the {limit} byte limit\n\nSuggestion: Export a smaller image or raise maxImageSize in mathclub.json")]
    ImageTooLarge {
        /// Name of the rejected file.
        file_name: String,
        /// Actual size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    // ========================================================================
    // Generation Errors
    // ========================================================================
    /// The generation provider did not produce a usable lesson.
    #[error("Lesson generation failed ({provider}): {message}")]
    GenerationFailed {
        /// Name of the provider that failed.
        provider: String,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // State Machine Errors
    // ========================================================================
    /// Invalid state transition attempted.
    #[error("Invalid state transition: cannot go from {from} to {to}")]
    InvalidStateTransition {
        /// The current phase.
        from: String,
        /// The attempted target phase.
        to: String,
    },

    // ========================================================================
    // Snapshot Errors
    // ========================================================================
    /// Failed to write the snapshot or one of its images.
    #[error("Failed to save lesson to '{path}': {message}\n\nSuggestion: Check write permissions and available disk space")]
    SnapshotWriteError {
        /// Path that could not be written.
        path: PathBuf,
        /// Description of the write failure.
        message: String,
    },

    /// Snapshot file exists but cannot be read back.
    #[error("Corrupted lesson snapshot '{path}': {message}\n\nSuggestion: Save the lesson again to overwrite the file")]
    SnapshotCorrupted {
        /// Path to the corrupted snapshot.
        path: PathBuf,
        /// Description of the corruption.
        message: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LessonError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `Validation` error shown inline to the author.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new `StageOutOfRange` error.
    #[must_use]
    pub const fn stage_out_of_range(index: usize, len: usize) -> Self {
        Self::StageOutOfRange { index, len }
    }

    /// Creates a new `UnsupportedImageFormat` error.
    #[must_use]
    pub fn unsupported_image(file_name: impl Into<String>) -> Self {
        Self::UnsupportedImageFormat {
            file_name: file_name.into(),
        }
    }

    /// Creates a new `ImageTooLarge` error.
    #[must_use]
    pub fn image_too_large(file_name: impl Into<String>, size: usize, limit: usize) -> Self {
        Self::ImageTooLarge {
            file_name: file_name.into(),
            size,
            limit,
        }
    }

    /// Creates a new `GenerationFailed` error.
    #[must_use]
    pub fn generation_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GenerationFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidStateTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Creates a new `SnapshotWriteError`.
    #[must_use]
    pub fn snapshot_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SnapshotWriteError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `SnapshotCorrupted` error.
    #[must_use]
    pub fn snapshot_corrupted(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SnapshotCorrupted {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this error is an author input problem.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::StageOutOfRange { .. }
                | Self::UnsupportedImageFormat { .. }
                | Self::ImageTooLarge { .. }
        )
    }

    /// Returns `true` if the session can carry on after this error.
    ///
    /// Only configuration errors, which occur before a session exists,
    /// are unrecoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::ConfigParseError { .. } | Self::ConfigValidationError { .. }
        )
    }
}
