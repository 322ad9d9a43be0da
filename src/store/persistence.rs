//! Persistence layer for the sitemap store

use crate::document::DocumentSnapshot;
use crate::error::StorageError;
use crate::store::{DocumentSummary, SitemapStore};
use crate::types::SitemapId;
use std::path::Path;
use tracing::debug;

const DOCUMENTS_TREE: &str = "documents";

fn io_error(context: &str, err: sled::Error) -> StorageError {
    StorageError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("{}: {}", context, err),
    ))
}

/// Sled-based implementation of SitemapStore
///
/// One bincode-encoded `DocumentSnapshot` per key in the `documents` tree,
/// keyed by sitemap id.
pub struct SledSitemapStore {
    db: sled::Db,
    documents: sled::Tree,
}

impl SledSitemapStore {
    /// Open (or create) the store at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| io_error("Failed to open sled database", e))?;
        let documents = db
            .open_tree(DOCUMENTS_TREE)
            .map_err(|e| io_error("Failed to open documents tree", e))?;
        Ok(Self { db, documents })
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db
            .flush()
            .map_err(|e| io_error("Failed to flush store", e))?;
        Ok(())
    }

    fn decode(id: &str, bytes: &[u8]) -> Result<DocumentSnapshot, StorageError> {
        bincode::deserialize(bytes)
            .map_err(|e| StorageError::Decode(format!("document {}: {}", id, e)))
    }
}

impl SitemapStore for SledSitemapStore {
    fn load(&self, id: &SitemapId) -> Result<Option<DocumentSnapshot>, StorageError> {
        match self
            .documents
            .get(id.as_str().as_bytes())
            .map_err(|e| io_error("Failed to read document", e))?
        {
            Some(bytes) => {
                let snapshot = Self::decode(id.as_str(), &bytes)?;
                if &snapshot.id != id {
                    return Err(StorageError::Corrupt(
                        id.clone(),
                        format!("stored under a different id ({})", snapshot.id),
                    ));
                }
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &DocumentSnapshot) -> Result<(), StorageError> {
        let bytes = bincode::serialize(snapshot).map_err(|e| StorageError::Encode(e.to_string()))?;
        self.documents
            .insert(snapshot.id.as_str().as_bytes(), bytes)
            .map_err(|e| io_error("Failed to write document", e))?;
        debug!(
            sitemap_id = %snapshot.id,
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "Saved document"
        );
        Ok(())
    }

    fn delete(&self, id: &SitemapId) -> Result<bool, StorageError> {
        let removed = self
            .documents
            .remove(id.as_str().as_bytes())
            .map_err(|e| io_error("Failed to delete document", e))?;
        Ok(removed.is_some())
    }

    fn list(&self) -> Result<Vec<DocumentSummary>, StorageError> {
        let mut summaries = Vec::new();
        for item in self.documents.iter() {
            let (key, value) = item.map_err(|e| io_error("Failed to iterate store", e))?;
            let id = String::from_utf8_lossy(&key);
            let snapshot = Self::decode(&id, &value)?;
            summaries.push(DocumentSummary::from(&snapshot));
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.as_str().cmp(b.id.as_str())));
        Ok(summaries)
    }
}
