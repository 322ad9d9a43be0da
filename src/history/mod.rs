//! Command History
//!
//! Undo/redo stacks keyed per sitemap document. Each stack is a list of
//! commands with a cursor: entries below the cursor are applied, entries at
//! or above it form the redo branch. Recording a new command discards the
//! redo branch.

pub mod command;
pub mod edit_buffer;

pub use command::{Command, CommandKind, Direction, PositionChange};
pub use edit_buffer::PendingEdit;

use crate::config::HistoryConfig;
use crate::document::SitemapDocument;
use crate::error::SitemapError;
use crate::types::SitemapId;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub size: usize,
    pub cursor: usize,
}

#[derive(Debug, Default)]
struct Stack {
    entries: Vec<Command>,
    cursor: usize,
}

impl Stack {
    fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.cursor > 0,
            can_redo: self.cursor < self.entries.len(),
            size: self.entries.len(),
            cursor: self.cursor,
        }
    }
}

pub struct CommandHistory {
    stacks: HashMap<SitemapId, Stack>,
    max_depth: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl CommandHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            stacks: HashMap::new(),
            max_depth: config.max_depth.max(1),
        }
    }

    /// Append at the cursor, discarding the redo branch. The oldest entry is
    /// evicted once the stack exceeds the configured depth.
    pub fn record(&mut self, command: Command) {
        let stack = self.stacks.entry(command.sitemap_id.clone()).or_default();
        let discarded = stack.entries.len() - stack.cursor;
        stack.entries.truncate(stack.cursor);
        debug!(
            sitemap_id = %command.sitemap_id,
            command = command.kind.name(),
            label = %command.label,
            discarded,
            "Recorded command"
        );
        stack.entries.push(command);
        stack.cursor += 1;

        if stack.entries.len() > self.max_depth {
            stack.entries.remove(0);
            stack.cursor -= 1;
        }
    }

    /// Invert the command below the cursor. `Ok(None)` at the bottom.
    ///
    /// When the inverse no longer applies, the error is returned and the
    /// cursor stays where it was.
    pub fn undo(&mut self, doc: &mut SitemapDocument) -> Result<Option<String>, SitemapError> {
        let Some(stack) = self.stacks.get_mut(doc.id()) else {
            return Ok(None);
        };
        if stack.cursor == 0 {
            return Ok(None);
        }
        let command = &stack.entries[stack.cursor - 1];
        command.kind.apply(doc, Direction::Backward)?;
        stack.cursor -= 1;
        debug!(sitemap_id = %doc.id(), label = %command.label, "Undo");
        Ok(Some(command.label.clone()))
    }

    /// Re-apply the command at the cursor. `Ok(None)` at the top.
    pub fn redo(&mut self, doc: &mut SitemapDocument) -> Result<Option<String>, SitemapError> {
        let Some(stack) = self.stacks.get_mut(doc.id()) else {
            return Ok(None);
        };
        if stack.cursor == stack.entries.len() {
            return Ok(None);
        }
        let command = &stack.entries[stack.cursor];
        command.kind.apply(doc, Direction::Forward)?;
        stack.cursor += 1;
        debug!(sitemap_id = %doc.id(), label = %command.label, "Redo");
        Ok(Some(command.label.clone()))
    }

    pub fn state(&self, sitemap_id: &SitemapId) -> HistoryState {
        self.stacks
            .get(sitemap_id)
            .map(Stack::state)
            .unwrap_or(HistoryState {
                can_undo: false,
                can_redo: false,
                size: 0,
                cursor: 0,
            })
    }

    /// Labels of applied commands, most recent first.
    pub fn undo_labels(&self, sitemap_id: &SitemapId) -> Vec<String> {
        self.stacks
            .get(sitemap_id)
            .map(|s| {
                s.entries[..s.cursor]
                    .iter()
                    .rev()
                    .map(|c| c.label.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Labels of the redo branch, next first.
    pub fn redo_labels(&self, sitemap_id: &SitemapId) -> Vec<String> {
        self.stacks
            .get(sitemap_id)
            .map(|s| s.entries[s.cursor..].iter().map(|c| c.label.clone()).collect())
            .unwrap_or_default()
    }

    pub fn clear(&mut self, sitemap_id: &SitemapId) {
        self.stacks.remove(sitemap_id);
    }
}
