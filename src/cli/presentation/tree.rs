//! Page tree formatter.

use super::shared::{format_section_heading, to_json};
use crate::error::SitemapError;
use crate::tree::{GenerationStatus, PublishStatus, TreeEntry, TreeView};
use owo_colors::OwoColorize;

pub fn format_tree(name: &str, view: &TreeView, format: &str) -> Result<String, SitemapError> {
    if format == "json" {
        return to_json(view);
    }
    let mut out = format!("{}\n\n", format_section_heading(name));
    render(&view.root, 0, &mut out);
    if !view.orphans.is_empty() {
        out.push_str(&format!("\n{}\n\n", format_section_heading("Orphans")));
        for orphan in &view.orphans {
            render(orphan, 0, &mut out);
        }
    }
    Ok(out.trim_end().to_string())
}

fn render(entry: &TreeEntry, depth: usize, out: &mut String) {
    let mut line = format!("{}{}  {}", "  ".repeat(depth), entry.title, entry.path.dimmed());
    let badges = badges(entry);
    if !badges.is_empty() {
        line.push_str(&format!("  [{}]", badges.join(", ")));
    }
    line.push_str(&format!("  {}", entry.id.as_str().dimmed()));
    out.push_str(&line);
    out.push('\n');
    for child in &entry.children {
        render(child, depth + 1, out);
    }
}

fn badges(entry: &TreeEntry) -> Vec<&'static str> {
    let mut badges = Vec::new();
    if entry.generation_status != GenerationStatus::None {
        badges.push(entry.generation_status.as_str());
    }
    if entry.publish_status != PublishStatus::None {
        badges.push(entry.publish_status.as_str());
    }
    if entry.is_modified_locally {
        badges.push("modified");
    }
    badges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeDraft, NodeTree};

    #[test]
    fn test_text_tree_lists_orphans_separately() {
        let mut tree = NodeTree::new("Home");
        let root = tree.root_id().clone();
        tree.create_node(Some(&root), NodeDraft::new("About")).unwrap();
        tree.create_node(None, NodeDraft::new("Old Page")).unwrap();

        let text = format_tree("Acme", &tree.view(), "text").unwrap();
        assert!(text.contains("About"));
        assert!(text.contains("Orphans"));
        assert!(text.contains("Old Page"));
    }
}
