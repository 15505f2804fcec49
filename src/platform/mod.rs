//! Voxel51 Platform API client
//!
//! [`PlatformClient`] owns the authenticated HTTP session. Resource
//! operations are grouped per module as `impl PlatformClient` blocks, next to
//! the models they return and the CLI handlers that drive them.

pub mod analytics;
pub mod apps;
pub mod batch;
pub(crate) mod client;
pub mod credentials;
pub mod data;
pub mod deferred;
pub mod helpers;
pub mod jobs;
pub mod query;
pub mod serializable;
pub mod status;
pub mod transfer;

pub use analytics::{run_analytics_command, Analytic, ImageType};
pub use apps::run_users_command;
pub use batch::{partition_batch, BatchAction, BatchItemResult, BatchResponse};
pub use client::{ClientConfig, PlatformClient};
pub use credentials::{ResolutionPolicy, Token, TokenKind, TokenResolver, TokenSources};
pub use data::{run_data_command, Data, PostDataUrl};
pub use deferred::Deferred;
pub use helpers::{format_ttl, map_concurrent};
pub use jobs::{
    run_jobs_command, Job, JobComputeMode, JobFailureType, JobRequest, JobState, RemoteDataPath,
};
pub use query::{AnalyticsQuery, DataQuery, JobsQuery, Query};
pub use serializable::Serializable;
pub use status::run_status_command;
