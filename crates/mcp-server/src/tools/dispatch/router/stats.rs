use super::super::{CallToolResult, Content, ShortcutService};
use crate::tools::context_doc::ContextDocBuilder;
use crate::tools::schemas::stats::{ShortcutStatsRequest, ShortcutStatsResult};
use shortcut_export::GenerationStats;

use super::error::{attach_structured_content, export_error};

pub(in crate::tools::dispatch) async fn shortcut_stats(
    service: &ShortcutService,
    _request: ShortcutStatsRequest,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let store = &service.state().stats;
    let stats: GenerationStats = match store.load() {
        Ok(stats) => stats,
        Err(err) => return Ok(export_error(&err)),
    };

    let mut doc = ContextDocBuilder::new();
    doc.push_answer(&format!("generated: {}", stats.total_generated));
    for (source, count) in &stats.by_template {
        doc.push_note(&format!("{source}: {count}"));
    }
    if let Some(at) = stats.last_generated_at_ms {
        doc.push_note(&format!("last_generated_at_ms: {at}"));
    }
    doc.push_ref(&store.path().display().to_string(), Some("stats"));

    let result = ShortcutStatsResult {
        stats_path: store.path().display().to_string(),
        stats,
    };
    Ok(attach_structured_content(
        CallToolResult::success(vec![Content::text(doc.finish())]),
        &result,
        "shortcut_stats",
    ))
}
