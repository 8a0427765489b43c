use rmcp::schemars;
use serde::{Deserialize, Serialize};
use shortcut_export::GenerationStats;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ShortcutStatsRequest {}

#[derive(Debug, Serialize)]
pub struct ShortcutStatsResult {
    pub stats_path: String,
    #[serde(flatten)]
    pub stats: GenerationStats,
}
