use std::io;

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A job was requested with nothing selected.
    #[error("Nothing selected")]
    EmptySelection,

    /// The job-creation collaborator rejected the selection.
    #[error("Job creation failed: {0}")]
    Job(String),
}

/// Message shown when a risky or volume-root listing runs out of time.
pub const RISKY_TIMEOUT_MESSAGE: &str = "Volume may be slow, disconnected, or unavailable";
/// Message shown when an ordinary listing runs out of time.
pub const TIMEOUT_MESSAGE: &str = "Directory listing timed out";
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied (permissions)";
pub const NOT_FOUND_MESSAGE: &str = "Directory not found";
pub const TRANSPORT_MESSAGE: &str = "Browse service unreachable";
pub const UNKNOWN_MESSAGE: &str = "Failed to load directory";

/// Why a single directory listing failed.
///
/// Every variant is terminal for one path and never affects siblings or
/// ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowseError {
    /// The listing exceeded its risk-tier budget (or was cancelled).
    #[error("listing timed out")]
    Timeout { risky: bool },

    #[error("access denied")]
    AccessDenied,

    #[error("not found")]
    NotFound,

    /// The backend could not be reached.
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unknown failure: {0}")]
    Unknown(String),
}

impl BrowseError {
    /// Fixed, user-facing message for this failure. Never empty.
    pub fn user_message(&self) -> String {
        match self {
            BrowseError::Timeout { risky: true } => RISKY_TIMEOUT_MESSAGE.to_string(),
            BrowseError::Timeout { risky: false } => TIMEOUT_MESSAGE.to_string(),
            BrowseError::AccessDenied => ACCESS_DENIED_MESSAGE.to_string(),
            BrowseError::NotFound => NOT_FOUND_MESSAGE.to_string(),
            BrowseError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
            BrowseError::Unknown(detail) => {
                let detail = detail.trim();
                if detail.is_empty() {
                    UNKNOWN_MESSAGE.to_string()
                } else {
                    format!("{}: {}", UNKNOWN_MESSAGE, detail)
                }
            }
        }
    }

    /// Whether this failure puts the path into the `timeout` phase.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowseError::Timeout { .. })
    }

    /// Classify a free-form error string reported by a backend.
    ///
    /// Backends that answer over a wire format only hand back text, so the
    /// common wordings are recognised here.
    pub fn from_backend_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("permission") || lower.contains("access denied") || lower.contains("eacces")
        {
            BrowseError::AccessDenied
        } else if lower.contains("not found")
            || lower.contains("no such file")
            || lower.contains("enoent")
        {
            BrowseError::NotFound
        } else if lower.contains("timed out") || lower.contains("timeout") {
            BrowseError::Timeout { risky: false }
        } else if lower.contains("connection")
            || lower.contains("unreachable")
            || lower.contains("network")
        {
            BrowseError::Transport(message.to_string())
        } else {
            BrowseError::Unknown(message.to_string())
        }
    }
}

impl From<io::Error> for BrowseError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => BrowseError::AccessDenied,
            io::ErrorKind::NotFound => BrowseError::NotFound,
            io::ErrorKind::TimedOut => BrowseError::Timeout { risky: false },
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe => BrowseError::Transport(err.to_string()),
            _ => BrowseError::Unknown(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn invalid_path_error_display() {
        let err = AppError::InvalidPath("/nonexistent".into());
        assert_eq!(err.to_string(), "Invalid path: /nonexistent");
    }

    #[test]
    fn timeout_message_depends_on_risk() {
        assert_eq!(
            BrowseError::Timeout { risky: true }.user_message(),
            "Volume may be slow, disconnected, or unavailable"
        );
        assert_eq!(
            BrowseError::Timeout { risky: false }.user_message(),
            "Directory listing timed out"
        );
    }

    #[test]
    fn access_denied_message() {
        assert_eq!(
            BrowseError::AccessDenied.user_message(),
            "Access denied (permissions)"
        );
    }

    #[test]
    fn unknown_with_empty_detail_is_still_informative() {
        assert_eq!(BrowseError::Unknown("  ".into()).user_message(), UNKNOWN_MESSAGE);
        assert_eq!(
            BrowseError::Unknown("disk on fire".into()).user_message(),
            "Failed to load directory: disk on fire"
        );
    }

    #[test]
    fn every_variant_has_a_message() {
        let all = [
            BrowseError::Timeout { risky: true },
            BrowseError::Timeout { risky: false },
            BrowseError::AccessDenied,
            BrowseError::NotFound,
            BrowseError::Transport(String::new()),
            BrowseError::Unknown(String::new()),
        ];
        for err in all {
            assert!(!err.user_message().is_empty(), "{:?}", err);
        }
    }

    #[test]
    fn io_kinds_are_classified() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(BrowseError::from(denied), BrowseError::AccessDenied);
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(BrowseError::from(missing), BrowseError::NotFound);
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(BrowseError::from(refused), BrowseError::Transport(_)));
        let other = io::Error::new(io::ErrorKind::Other, "weird");
        assert!(matches!(BrowseError::from(other), BrowseError::Unknown(_)));
    }

    #[test]
    fn backend_messages_are_classified() {
        assert_eq!(
            BrowseError::from_backend_message("EACCES: permission denied"),
            BrowseError::AccessDenied
        );
        assert_eq!(
            BrowseError::from_backend_message("ENOENT: no such file or directory"),
            BrowseError::NotFound
        );
        assert!(BrowseError::from_backend_message("operation timed out").is_timeout());
        assert!(matches!(
            BrowseError::from_backend_message("connection refused"),
            BrowseError::Transport(_)
        ));
        assert!(matches!(
            BrowseError::from_backend_message("bad things"),
            BrowseError::Unknown(_)
        ));
    }
}
