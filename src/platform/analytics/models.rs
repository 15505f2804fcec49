//! Analytic models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Analytic record returned by the analytics endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analytic {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_cpu: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_gpu: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Analytic {
    pub fn supports_cpu(&self) -> bool {
        self.supports_cpu.unwrap_or(false)
    }

    pub fn supports_gpu(&self) -> bool {
        self.supports_gpu.unwrap_or(false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.unwrap_or(false)
    }
}

/// Docker image flavour for an analytic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Cpu,
    Gpu,
}

impl ImageType {
    /// Query-string value
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Cpu => "cpu",
            ImageType::Gpu => "gpu",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(ImageType::Cpu),
            "gpu" => Ok(ImageType::Gpu),
            _ => Err(format!("Unknown image type '{}', expected cpu or gpu", s)),
        }
    }
}
