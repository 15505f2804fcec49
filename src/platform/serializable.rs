//! JSON (de)serialization contract shared by request DTOs
//!
//! Serialization is derived from the serde attributes on each type, which
//! declare the local-name to wire-name mapping. Parsing is not derived:
//! every implementor writes its own `from_dict`, because wire shapes such as
//! job parameters need type-directed probing a field mapping cannot express.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{PlatformError, Result};

pub trait Serializable: Serialize + Sized {
    /// Build an instance from its JSON representation
    fn from_dict(value: &Value) -> Result<Self>;

    /// JSON representation
    fn to_dict(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Pretty-printed JSON with 4-space indentation
    fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| PlatformError::Json(e.to_string()))
    }

    /// Write to a JSON file, creating the parent directory if needed
    fn to_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_dict(&value)
    }

    fn from_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PlatformError::io_at(path, e))?;
        Self::from_json_str(&content)
    }
}
