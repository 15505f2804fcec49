//! Data models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Data record returned by the data endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Data {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Data {
    /// File name to use when downloading without an explicit path
    ///
    /// Only the final component of the server-supplied name is kept, so the
    /// result always stays inside the working directory. Falls back to the id.
    pub fn download_name(&self) -> PathBuf {
        let name = self
            .filename
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.name);
        Path::new(name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&self.id))
    }
}

/// Body of a signed-URL data registration
#[derive(Debug, Clone, Serialize)]
pub struct PostDataUrl {
    pub signed_url: String,
    pub filename: String,
    pub mimetype: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_ttl: Option<String>,
}
