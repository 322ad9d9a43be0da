//! Sitemap Store
//!
//! Persistence collaborator for whole documents. The engine loads a document
//! into memory, edits it there, and saves a snapshot back.

pub mod persistence;

pub use persistence::SledSitemapStore;

use crate::document::DocumentSnapshot;
use crate::error::StorageError;
use crate::types::SitemapId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing entry for a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: SitemapId,
    pub name: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub saved_at: DateTime<Utc>,
}

impl From<&DocumentSnapshot> for DocumentSummary {
    fn from(snapshot: &DocumentSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            node_count: snapshot.nodes.len(),
            edge_count: snapshot.edges.len(),
            saved_at: snapshot.saved_at,
        }
    }
}

/// Document store interface
pub trait SitemapStore: Send + Sync {
    fn load(&self, id: &SitemapId) -> Result<Option<DocumentSnapshot>, StorageError>;

    fn save(&self, snapshot: &DocumentSnapshot) -> Result<(), StorageError>;

    /// Returns whether a document was removed.
    fn delete(&self, id: &SitemapId) -> Result<bool, StorageError>;

    /// Copy a stored document under a new id and name. Node and edge ids are
    /// kept; they are scoped to their document.
    fn duplicate(
        &self,
        id: &SitemapId,
        new_id: &SitemapId,
        new_name: &str,
    ) -> Result<Option<DocumentSnapshot>, StorageError> {
        let Some(mut snapshot) = self.load(id)? else {
            return Ok(None);
        };
        snapshot.id = new_id.clone();
        snapshot.name = new_name.to_string();
        snapshot.saved_at = Utc::now();
        if let Some(root) = snapshot.nodes.iter_mut().find(|n| n.is_root) {
            root.title = new_name.to_string();
        }
        self.save(&snapshot)?;
        Ok(Some(snapshot))
    }

    fn list(&self) -> Result<Vec<DocumentSummary>, StorageError>;
}
