//! Unified error type for the clipshare application.
//!
//! All crates funnel their failures into [`Error`]. Each variant belongs to
//! one [`ErrorKind`], and the kind alone decides the HTTP status code API
//! handlers return via [`Error::http_status`].

use std::fmt;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape or bounds.
    Validation,
    /// A referenced asset or link does not exist.
    NotFound,
    /// A share link is past its expiry.
    Expired,
    /// The transcoder or prober failed.
    ExternalTool,
    /// Missing or wrong credentials.
    Auth,
    /// Anything else. The message never reaches the client.
    Unexpected,
}

/// Unified error type covering all failure modes in clipshare.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The caller did not present a token.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller presented the wrong token.
    #[error("{0}")]
    Forbidden(String),

    /// Request data failed validation.
    #[error("{0}")]
    Validation(String),

    /// Upload extension is not in the allowed set.
    #[error("Invalid file type. Only MP4 and MOV are allowed")]
    InvalidFileType,

    /// Upload exceeds the configured byte ceiling.
    #[error("File too large. Maximum allowed size is {limit_mb} MB")]
    FileTooLarge {
        /// The configured ceiling in megabytes.
        limit_mb: u64,
    },

    /// Probed duration is outside the configured window.
    #[error("Video duration must be between {min} and {max} seconds")]
    DurationOutOfRange {
        /// Inclusive lower bound in seconds.
        min: f64,
        /// Inclusive upper bound in seconds.
        max: f64,
    },

    #[error("Invalid start time. It must be within the video duration")]
    InvalidStartTime,

    #[error("Invalid end time. It must be greater than start time and within the video duration")]
    InvalidEndTime,

    /// At least one requested merge source does not exist.
    #[error("One or more videos not found")]
    AssetsNotFound,

    #[error("Shared link not found")]
    LinkNotFound,

    #[error("Shared link has expired")]
    LinkExpired,

    /// A live link points at a video row that no longer exists.
    #[error("Video associated with the shared link not found")]
    AssetMissing,

    /// An external tool (ffmpeg, ffprobe) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Media probing failed.
    #[error("Probe error: {0}")]
    Probe(String),

    /// Extraction or re-probing of a trimmed clip failed.
    #[error("Trim failed: {0}")]
    TrimFailed(String),

    /// Concatenation or re-probing of a merged clip failed.
    #[error("Merge failed: {0}")]
    MergeFailed(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_)
            | Error::InvalidFileType
            | Error::FileTooLarge { .. }
            | Error::DurationOutOfRange { .. }
            | Error::InvalidStartTime
            | Error::InvalidEndTime => ErrorKind::Validation,
            Error::NotFound { .. }
            | Error::AssetsNotFound
            | Error::LinkNotFound
            | Error::AssetMissing => ErrorKind::NotFound,
            Error::LinkExpired => ErrorKind::Expired,
            Error::Tool { .. }
            | Error::Probe(_)
            | Error::TrimFailed(_)
            | Error::MergeFailed(_) => ErrorKind::ExternalTool,
            Error::Unauthorized(_) | Error::Forbidden(_) => ErrorKind::Auth,
            Error::Database { .. } | Error::Io { .. } | Error::Internal(_) => {
                ErrorKind::Unexpected
            }
        }
    }

    /// Map this error to an HTTP status code.
    ///
    /// Missing assets and links are reported as 400, matching the public
    /// contract clients already depend on.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Unauthorized(_) => 401,
            Error::Forbidden(_) => 403,
            _ => match self.kind() {
                ErrorKind::Unexpected => 500,
                _ => 400,
            },
        }
    }

    /// Stable snake_case code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::Validation(_) => "validation_error",
            Error::InvalidFileType => "invalid_file_type",
            Error::FileTooLarge { .. } => "file_too_large",
            Error::DurationOutOfRange { .. } => "duration_out_of_range",
            Error::InvalidStartTime => "invalid_start_time",
            Error::InvalidEndTime => "invalid_end_time",
            Error::AssetsNotFound => "assets_not_found",
            Error::LinkNotFound => "link_not_found",
            Error::LinkExpired => "link_expired",
            Error::AssetMissing => "asset_missing",
            Error::Tool { .. } => "tool_error",
            Error::Probe(_) => "probe_error",
            Error::TrimFailed(_) => "trim_failed",
            Error::MergeFailed(_) => "merge_failed",
            Error::Database { .. } => "database_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("video", "abc-123");
        assert_eq!(err.to_string(), "video not found: abc-123");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn auth_statuses() {
        let err = Error::Unauthorized("Authorization token is required".into());
        assert_eq!(err.to_string(), "Authorization token is required");
        assert_eq!(err.http_status(), 401);

        let err = Error::Forbidden("Invalid authorization token".into());
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn duration_message_carries_bounds() {
        let err = Error::DurationOutOfRange { min: 1.0, max: 25.0 };
        assert_eq!(
            err.to_string(),
            "Video duration must be between 1 and 25 seconds"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn trim_bound_messages() {
        assert_eq!(
            Error::InvalidStartTime.to_string(),
            "Invalid start time. It must be within the video duration"
        );
        assert!(Error::InvalidEndTime
            .to_string()
            .starts_with("Invalid end time"));
    }

    #[test]
    fn expired_is_its_own_kind() {
        assert_eq!(Error::LinkExpired.kind(), ErrorKind::Expired);
        assert_eq!(Error::LinkExpired.http_status(), 400);
        assert_eq!(Error::LinkExpired.code(), "link_expired");
    }

    #[test]
    fn tool_failures_are_client_visible() {
        let err = Error::tool("ffmpeg", "exit code 1");
        assert_eq!(err.to_string(), "Tool error [ffmpeg]: exit code 1");
        assert_eq!(err.kind(), ErrorKind::ExternalTool);
        assert_eq!(err.http_status(), 400);

        let err = Error::MergeFailed("concat failed".into());
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn database_is_unexpected() {
        let err = Error::database("connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }
}
