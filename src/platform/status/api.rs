//! Platform status API

use serde_json::Value;

use crate::config::api;
use crate::error::Result;
use crate::platform::client::take_field;
use crate::platform::PlatformClient;

impl PlatformClient {
    /// Current status of the Platform services
    pub async fn get_platform_status(&self) -> Result<Value> {
        let url = self.endpoint(&self.scoped(&format!("{}/all", api::STATUS)));
        let value = self.send_json(self.get(&url)).await?;
        take_field(value, "statuses")
    }
}
