use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for Platform client operations
#[derive(Debug)]
pub enum PlatformError {
    /// HTTP request failed before a response arrived
    Http(reqwest::Error),
    /// API returned a non-success response
    Api { status: u16, message: String },
    /// No usable token could be located
    Credential(String),
    /// Malformed remote data reference
    RemoteDataPath(String),
    /// Polled job reached the FAILED state
    JobFailed { job_id: String },
    /// Polled job did not complete in time
    JobTimeout { job_id: String, waited: Duration },
    /// Query field is not in the resource's allowlist
    UnsupportedField { resource: String, field: String },
    /// JSON parsing error
    Json(String),
    /// Local file I/O failed, optionally on a known path
    Io {
        path: Option<PathBuf>,
        source: io::Error,
    },
    /// Configuration error
    Config(String),
    /// Deferred request task did not run to completion
    Task(String),
}

impl PlatformError {
    /// True for both causes of a job execution failure
    pub fn is_job_execution(&self) -> bool {
        matches!(
            self,
            PlatformError::JobFailed { .. } | PlatformError::JobTimeout { .. }
        )
    }

    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::Api { status, .. } => Some(*status),
            PlatformError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Wrap an I/O error raised while working on `path`
    pub fn io_at(path: &Path, source: io::Error) -> Self {
        PlatformError::Io {
            path: Some(path.to_path_buf()),
            source,
        }
    }

    /// Kind of the underlying I/O error
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            PlatformError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Http(e) => write!(f, "HTTP request failed: {}", e),
            PlatformError::Api { status, message } => write!(f, "{}: {}", status, message),
            PlatformError::Credential(msg) => write!(f, "{}", msg),
            PlatformError::RemoteDataPath(msg) => write!(f, "Invalid data reference: {}", msg),
            PlatformError::JobFailed { job_id } => write!(f, "Job '{}' failed", job_id),
            PlatformError::JobTimeout { job_id, waited } => write!(
                f,
                "Maximum wait time exceeded for job '{}' ({}s)",
                job_id,
                waited.as_secs()
            ),
            PlatformError::UnsupportedField { resource, field } => {
                write!(f, "Unsupported field '{}' for {} queries", field, resource)
            }
            PlatformError::Json(msg) => write!(f, "JSON error: {}", msg),
            PlatformError::Io {
                path: Some(path),
                source,
            } => write!(f, "I/O error on {}: {}", path.display(), source),
            PlatformError::Io { path: None, source } => write!(f, "I/O error: {}", source),
            PlatformError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PlatformError::Task(msg) => write!(f, "Deferred request failed: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlatformError::Http(e) => Some(e),
            PlatformError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        PlatformError::Http(err)
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        PlatformError::Json(err.to_string())
    }
}

impl From<io::Error> for PlatformError {
    fn from(err: io::Error) -> Self {
        PlatformError::Io {
            path: None,
            source: err,
        }
    }
}

impl From<tokio::task::JoinError> for PlatformError {
    fn from(err: tokio::task::JoinError) -> Self {
        PlatformError::Task(err.to_string())
    }
}

/// Result type alias for Platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
