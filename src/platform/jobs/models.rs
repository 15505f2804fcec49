//! Job models: requests, data references and server-side job records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{PlatformError, Result};
use crate::platform::serializable::Serializable;

/// Wire key identifying a data reference
pub const DATA_ID_FIELD: &str = "data-id";

/// Compute mode requested for a job
///
/// Values added by the server after this release deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobComputeMode {
    Cpu,
    Gpu,
    Best,
    #[serde(other)]
    Unknown,
}

/// Server-reported job state
///
/// Values added by the server after this release deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Ready,
    Queued,
    Scheduled,
    Running,
    Complete,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Reason recorded for a failed job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobFailureType {
    User,
    Analytic,
    Platform,
    None,
    #[serde(other)]
    Unknown,
}

impl JobComputeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobComputeMode::Cpu => "CPU",
            JobComputeMode::Gpu => "GPU",
            JobComputeMode::Best => "BEST",
            JobComputeMode::Unknown => "UNKNOWN",
        }
    }
}

impl JobState {
    pub const ALL: [JobState; 6] = [
        JobState::Ready,
        JobState::Queued,
        JobState::Scheduled,
        JobState::Running,
        JobState::Complete,
        JobState::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Ready => "READY",
            JobState::Queued => "QUEUED",
            JobState::Scheduled => "SCHEDULED",
            JobState::Running => "RUNNING",
            JobState::Complete => "COMPLETE",
            JobState::Failed => "FAILED",
            JobState::Unknown => "UNKNOWN",
        }
    }

    /// No further transitions will happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Complete | JobState::Failed)
    }
}

impl JobFailureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobFailureType::User => "USER",
            JobFailureType::Analytic => "ANALYTIC",
            JobFailureType::Platform => "PLATFORM",
            JobFailureType::None => "NONE",
            JobFailureType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for JobComputeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for JobFailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobComputeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CPU" => Ok(JobComputeMode::Cpu),
            "GPU" => Ok(JobComputeMode::Gpu),
            "BEST" => Ok(JobComputeMode::Best),
            _ => Err(format!("Unknown compute mode: {}", s)),
        }
    }
}

impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        JobState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown job state: {}", s))
    }
}

/// Reference to data stored on the Platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteDataPath {
    #[serde(rename = "data-id")]
    data_id: String,
}

impl RemoteDataPath {
    /// Fails if `data_id` is empty
    pub fn new(data_id: impl Into<String>) -> Result<Self> {
        let data_id = data_id.into();
        if data_id.is_empty() {
            return Err(PlatformError::RemoteDataPath(
                "data ID must not be empty".to_string(),
            ));
        }
        Ok(Self { data_id })
    }

    pub fn data_id(&self) -> &str {
        &self.data_id
    }

    /// True if `value` parses as a data reference
    pub fn is_remote_path_dict(value: &Value) -> bool {
        Self::from_dict(value).is_ok()
    }
}

impl Serializable for RemoteDataPath {
    fn from_dict(value: &Value) -> Result<Self> {
        match value.get(DATA_ID_FIELD) {
            Some(Value::String(id)) => Self::new(id.clone()),
            Some(other) => Err(PlatformError::RemoteDataPath(format!(
                "'{}' must be a string, got {}",
                DATA_ID_FIELD, other
            ))),
            None => Err(PlatformError::RemoteDataPath(format!(
                "missing '{}' in {}",
                DATA_ID_FIELD, value
            ))),
        }
    }
}

/// Job parameter: either a data reference or a plain JSON value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobParameter {
    Data(RemoteDataPath),
    Value(Value),
}

impl JobParameter {
    fn from_dict(value: &Value) -> Self {
        match RemoteDataPath::from_dict(value) {
            Ok(path) => JobParameter::Data(path),
            Err(_) => JobParameter::Value(value.clone()),
        }
    }
}

/// Request to run an analytic on the Platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequest {
    analytic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compute_mode: Option<JobComputeMode>,
    inputs: BTreeMap<String, RemoteDataPath>,
    parameters: BTreeMap<String, JobParameter>,
}

impl JobRequest {
    /// Fails if `analytic` is empty
    pub fn new(analytic: impl Into<String>) -> Result<Self> {
        let analytic = analytic.into();
        if analytic.is_empty() {
            return Err(PlatformError::Json(
                "job request analytic must not be empty".to_string(),
            ));
        }
        Ok(Self {
            analytic,
            version: None,
            compute_mode: None,
            inputs: BTreeMap::new(),
            parameters: BTreeMap::new(),
        })
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_compute_mode(mut self, mode: JobComputeMode) -> Self {
        self.compute_mode = Some(mode);
        self
    }

    pub fn set_input(&mut self, name: impl Into<String>, path: RemoteDataPath) {
        self.inputs.insert(name.into(), path);
    }

    pub fn set_data_parameter(&mut self, name: impl Into<String>, path: RemoteDataPath) {
        self.parameters
            .insert(name.into(), JobParameter::Data(path));
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.parameters
            .insert(name.into(), JobParameter::Value(value));
    }

    pub fn analytic(&self) -> &str {
        &self.analytic
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn compute_mode(&self) -> Option<JobComputeMode> {
        self.compute_mode
    }

    pub fn inputs(&self) -> &BTreeMap<String, RemoteDataPath> {
        &self.inputs
    }

    pub fn parameters(&self) -> &BTreeMap<String, JobParameter> {
        &self.parameters
    }
}

impl Serializable for JobRequest {
    fn from_dict(value: &Value) -> Result<Self> {
        let analytic = value
            .get("analytic")
            .and_then(Value::as_str)
            .ok_or_else(|| PlatformError::Json("job request is missing 'analytic'".to_string()))?;
        let mut request = JobRequest::new(analytic)?;

        if let Some(version) = value.get("version").and_then(Value::as_str) {
            request.version = Some(version.to_string());
        }
        if let Some(mode) = value.get("compute_mode").filter(|m| !m.is_null()) {
            request.compute_mode = Some(serde_json::from_value(mode.clone())?);
        }

        for (name, input) in object_entries(value, "inputs")? {
            request.set_input(name.clone(), RemoteDataPath::from_dict(input)?);
        }
        for (name, param) in object_entries(value, "parameters")? {
            request
                .parameters
                .insert(name.clone(), JobParameter::from_dict(param));
        }
        Ok(request)
    }
}

impl fmt::Display for JobRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_string() {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "JobRequest({})", self.analytic),
        }
    }
}

fn object_entries<'a>(value: &'a Value, key: &str) -> Result<Vec<(&'a String, &'a Value)>> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => Ok(map.iter().collect()),
        Some(other) => Err(PlatformError::Json(format!(
            "'{}' must be an object, got {}",
            key, other
        ))),
    }
}

/// Job record returned by the jobs endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<JobState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_mode: Option<JobComputeMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_type: Option<JobFailureType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    pub fn state_str(&self) -> &str {
        self.state.as_ref().map(JobState::as_str).unwrap_or("")
    }
}
