//! Link graph formatter.

use super::shared::{format_section_heading, to_json};
use crate::error::SitemapError;
use crate::links::{Edge, EdgeOrigin, EdgeStats, EdgeStatus};
use crate::tree::NodeTree;
use crate::types::NodeId;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;

pub fn format_links(
    tree: &NodeTree,
    edges: &[Edge],
    stats: &EdgeStats,
    format: &str,
) -> Result<String, SitemapError> {
    if format == "json" {
        return to_json(&serde_json::json!({ "edges": edges, "stats": stats }));
    }

    let title = |id: &NodeId| tree.get(id).map(|n| n.title.clone()).unwrap_or_default();
    let mut out = format!("{}\n\n", format_section_heading("Links"));
    if edges.is_empty() {
        out.push_str("No links.\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Id", "Source", "Target", "Anchor", "Origin", "Status"]);
        for edge in edges {
            let origin = match edge.origin {
                EdgeOrigin::Ai => "ai",
                EdgeOrigin::Manual => "manual",
            };
            table.add_row(vec![
                edge.id.to_string(),
                title(&edge.source_node_id),
                title(&edge.target_node_id),
                edge.anchor_text.clone().unwrap_or_else(|| "-".to_string()),
                origin.to_string(),
                edge.status.as_str().to_string(),
            ]);
        }
        out.push_str(&format!("{}\n", table));
    }

    let counts: Vec<String> = EdgeStatus::ALL
        .iter()
        .filter(|s| stats.count(**s) > 0)
        .map(|s| format!("{} {}", stats.count(*s), s.as_str()))
        .collect();
    out.push_str(&format!("\nTotal: {}", stats.total));
    if !counts.is_empty() {
        out.push_str(&format!(" ({})", counts.join(", ")));
    }
    Ok(out)
}
