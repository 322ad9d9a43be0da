//! CLI route: single route table and run context. Dispatches to the editor and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_document_list, format_init_summary, format_links, format_tree};
use crate::config::{ConfigLoader, EngineConfig};
use crate::document::SitemapDocument;
use crate::editor::SitemapEditor;
use crate::error::{SitemapError, StorageError};
use crate::links::EdgeOrigin;
use crate::store::{DocumentSummary, SitemapStore, SledSitemapStore};
use crate::tree::NodeDraft;
use crate::types::{EdgeId, NodeId, SitemapId};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: loaded config and the document store.
pub struct RunContext {
    config: EngineConfig,
    store: SledSitemapStore,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, SitemapError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        if let Err(errors) = config.validate() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(SitemapError::ConfigError(messages.join("; ")));
        }

        let store_path = config.storage.resolve_store_path(&workspace_root);
        std::fs::create_dir_all(&store_path).map_err(StorageError::IoError)?;
        let store = SledSitemapStore::new(&store_path)?;
        debug!(store = %store_path.display(), "Opened sitemap store");

        Ok(Self {
            config,
            store,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, SitemapError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command.name(),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, SitemapError> {
        match command {
            Commands::Init { name, id } => {
                let id = id
                    .as_deref()
                    .map(SitemapId::from)
                    .unwrap_or_else(SitemapId::generate);
                if self.store.load(&id)?.is_some() {
                    return Err(SitemapError::DocumentExists(id));
                }
                let snapshot = SitemapDocument::new(id, name.clone()).snapshot();
                self.store.save(&snapshot)?;
                self.store.flush()?;
                Ok(format_init_summary(&DocumentSummary::from(&snapshot)))
            }
            Commands::List { format } => format_document_list(&self.store.list()?, format),
            Commands::Tree { sitemap, format } => {
                let editor = self.open(sitemap)?;
                let doc = editor.document().read();
                format_tree(&doc.name, &doc.tree.view(), format)
            }
            Commands::Add {
                sitemap,
                title,
                parent,
                orphan,
                slug,
            } => {
                let editor = self.open(sitemap)?;
                let parent = self.resolve_parent(&editor, parent.as_deref(), *orphan);
                let mut draft = NodeDraft::new(title.clone());
                if let Some(slug) = slug {
                    draft = draft.with_slug(slug.clone());
                }
                let id = editor.create_node(parent.as_ref(), draft)?;
                let path = editor.document().read().tree.path(&id)?;
                self.persist(&editor)?;
                Ok(format!("Added page {} at {}", id, path))
            }
            Commands::Move {
                sitemap,
                node,
                parent,
                orphan,
                index,
            } => {
                let editor = self.open(sitemap)?;
                let parent = self.resolve_parent(&editor, parent.as_deref(), *orphan);
                let node = NodeId::from(node.as_str());
                editor.move_node(&node, parent.as_ref(), index.unwrap_or(usize::MAX))?;
                let path = editor.document().read().tree.path(&node)?;
                self.persist(&editor)?;
                Ok(format!("Moved page {} to {}", node, path))
            }
            Commands::Delete { sitemap, node } => {
                let editor = self.open(sitemap)?;
                let deleted = editor.delete_node(&NodeId::from(node.as_str()))?;
                self.persist(&editor)?;
                Ok(format!(
                    "Deleted {} page(s) and {} link(s)",
                    deleted.nodes.len(),
                    deleted.edges.len()
                ))
            }
            Commands::Link {
                sitemap,
                source,
                target,
                anchor,
            } => {
                let editor = self.open(sitemap)?;
                let edge = editor.add_edge(
                    &NodeId::from(source.as_str()),
                    &NodeId::from(target.as_str()),
                    anchor.clone(),
                    EdgeOrigin::Manual,
                )?;
                self.persist(&editor)?;
                let status = editor.get_edge(&edge)?.status;
                Ok(format!("Link {} ({})", edge, status.as_str()))
            }
            Commands::Approve { sitemap, edge } => {
                let editor = self.open(sitemap)?;
                editor.approve(&EdgeId::from(edge.as_str()))?;
                self.persist(&editor)?;
                Ok(format!("Approved link {}", edge))
            }
            Commands::Reject { sitemap, edge } => {
                let editor = self.open(sitemap)?;
                editor.reject(&EdgeId::from(edge.as_str()))?;
                self.persist(&editor)?;
                Ok(format!("Rejected link {}", edge))
            }
            Commands::Links { sitemap, format } => {
                let editor = self.open(sitemap)?;
                let edges = editor.edges();
                let stats = editor.link_stats();
                let doc = editor.document().read();
                format_links(&doc.tree, &edges, &stats, format)
            }
        }
    }

    fn open(&self, sitemap: &str) -> Result<SitemapEditor, SitemapError> {
        SitemapEditor::load(&self.store, &SitemapId::from(sitemap), &self.config)
    }

    fn persist(&self, editor: &SitemapEditor) -> Result<(), SitemapError> {
        editor.save(&self.store)?;
        self.store.flush()?;
        Ok(())
    }

    /// `None` for orphans; the root when no parent is named.
    fn resolve_parent(&self, editor: &SitemapEditor, parent: Option<&str>, orphan: bool) -> Option<NodeId> {
        if orphan {
            return None;
        }
        Some(match parent {
            Some(parent) => NodeId::from(parent),
            None => editor.document().read().tree.root_id().clone(),
        })
    }
}
