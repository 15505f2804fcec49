/// Configuration constants for the Platform API
pub mod api {
    /// Version prefix appended to the token's base URL
    pub const VERSION_PATH: &str = "/v1";

    /// Default production API host
    pub const DEFAULT_BASE_URL: &str = "https://api.voxel51.com";

    /// Resource segments
    pub const DATA: &str = "data";
    pub const JOBS: &str = "jobs";
    pub const ANALYTICS: &str = "analytics";
    pub const STATUS: &str = "status";

    /// Namespace for application-token endpoints
    pub const APPS: &str = "apps";

    /// Batch action endpoint, relative to a resource
    pub const BATCH: &str = "batch";
}

/// Token locations and environment variables
pub mod credentials {
    /// Directory under $HOME holding activated tokens
    pub const DIR_NAME: &str = ".voxel51";

    /// Activated user token file name
    pub const USER_TOKEN_FILE: &str = "api-token.json";

    /// Activated application token file name
    pub const APP_TOKEN_FILE: &str = "app-token.json";

    pub const USER_PRIVATE_KEY_ENV: &str = "VOXEL51_API_PRIVATE_KEY";
    pub const USER_BASE_URL_ENV: &str = "VOXEL51_API_BASE_URL";
    pub const USER_TOKEN_PATH_ENV: &str = "VOXEL51_API_TOKEN";

    pub const APP_PRIVATE_KEY_ENV: &str = "VOXEL51_APP_PRIVATE_KEY";
    pub const APP_BASE_URL_ENV: &str = "VOXEL51_APP_BASE_URL";
    pub const APP_TOKEN_PATH_ENV: &str = "VOXEL51_APP_TOKEN";

    /// Header carrying an application key
    pub const APP_KEY_HEADER: &str = "x-voxel51-application";

    /// Header naming the impersonated application user
    pub const APP_USER_HEADER: &str = "x-voxel51-application-user";
}

/// File transfer tuning
pub mod transfer {
    /// Write buffer used when streaming downloads to disk (32 MiB)
    pub const DOWNLOAD_CHUNK_SIZE: usize = 32 * 1024 * 1024;

    /// Maximum frame read from disk per upload chunk
    pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;
}

/// Job polling defaults
pub mod jobs {
    /// Seconds between job state checks
    pub const POLL_INTERVAL_SECS: u64 = 5;

    /// Seconds before giving up on a job
    pub const MAX_WAIT_SECS: u64 = 600;

    /// File name used for the job request part of an upload
    pub const REQUEST_FILE_NAME: &str = "job.json";
}

/// Default values for CLI
pub mod defaults {
    /// Default log level
    pub const LOG_LEVEL: &str = "warn";

    /// Default number of rows for list commands
    pub const LIST_LIMIT: i64 = 100;

    /// Names longer than this are truncated in tables
    pub const MAX_NAME_WIDTH: usize = 51;

    /// Concurrent requests issued by `map_concurrent` when unspecified
    pub const MAX_WORKERS: usize = 8;
}
