use rmcp::schemars;
use serde::{Deserialize, Serialize};
use shortcut_protocol::Capabilities;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct CapabilitiesRequest {}

#[derive(Debug, Serialize)]
pub struct CapabilitiesResult {
    #[serde(flatten)]
    pub capabilities: Capabilities,
}
