//! Document list and init formatters.

use super::shared::{format_section_heading, to_json};
use crate::error::SitemapError;
use crate::store::DocumentSummary;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;

pub fn format_document_list(docs: &[DocumentSummary], format: &str) -> Result<String, SitemapError> {
    if format == "json" {
        return to_json(docs);
    }
    if docs.is_empty() {
        return Ok("No sitemaps yet. Create one with `sitemap init <name>`.".to_string());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Name", "Pages", "Links", "Saved"]);
    for doc in docs {
        table.add_row(vec![
            doc.id.to_string(),
            doc.name.clone(),
            doc.node_count.to_string(),
            doc.edge_count.to_string(),
            doc.saved_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    Ok(format!("{}\n\n{}", format_section_heading("Sitemaps"), table))
}

pub fn format_init_summary(doc: &DocumentSummary) -> String {
    format!("Created sitemap '{}' ({})", doc.name, doc.id)
}
