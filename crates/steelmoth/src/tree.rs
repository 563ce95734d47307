//! The element tree: the builder's primary selection provider.
//!
//! [`ElementTree`] observes a [`SharedDocument`] and owns two pieces of view
//! state the document does not: the currently selected record and a display
//! label per row. It is itself observable; editors and the attribute browser
//! attach to it and refresh whenever the selection changes.
//!
//! # Selection
//!
//! The selection is initially the document root. It always names a record
//! that exists: [`ElementTree::select`] rejects unknown ids, and when a
//! delete removes the selected record the selection falls back to the
//! nearest surviving ancestor before observers are told. The tree keeps the
//! selected record's ancestor chain for that; records never move, so the
//! chain stays accurate for as long as the record lives.
//!
//! # Labels
//!
//! Each row displays a label, initially its id. Labels are view state only;
//! editing one never touches the document.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use steelmoth_core::{
    DocumentStore, ElementHandle, InsertIndex, Observable, Observer, Result,
    SharedDocument, StoreError, Subject, ROOT_ID,
};

use crate::editor::ValueSource;
use crate::logging::targets;

/// One displayed row of the tree, in depth-first pre-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    /// Nesting depth; top-level records are at depth 0.
    pub depth: usize,
    pub id: String,
    pub label: String,
}

#[derive(Debug, Default)]
struct TreeState {
    selection: String,
    /// Ancestors of `selection`, immediate parent first.
    lineage: Vec<String>,
    labels: HashMap<String, String>,
    counters: HashMap<String, u64>,
}

/// Selection provider over the document's record hierarchy.
pub struct ElementTree {
    document: Arc<SharedDocument>,
    state: Mutex<TreeState>,
    subject: Subject,
}

impl ElementTree {
    /// Create a tree view of `document` and attach it as an observer.
    pub fn new(document: Arc<SharedDocument>) -> Arc<Self> {
        let tree = Arc::new(Self {
            document,
            state: Mutex::new(TreeState {
                selection: ROOT_ID.to_string(),
                ..Default::default()
            }),
            subject: Subject::new(),
        });
        tree.document.attach_observer(&tree);
        tree
    }

    /// The document this tree displays.
    pub fn document(&self) -> &Arc<SharedDocument> {
        &self.document
    }

    /// The selected record id. The root id when nothing else is selected.
    pub fn selection(&self) -> String {
        self.state.lock().selection.clone()
    }

    /// Select a record and notify observers.
    ///
    /// Observers are notified even when `id` was already selected.
    pub fn select(&self, id: &str) -> Result<()> {
        let lineage = self.document.ancestors(id)?;
        {
            let mut state = self.state.lock();
            state.selection = id.to_string();
            state.lineage = lineage;
        }
        tracing::debug!(target: targets::TREE, id, "selection changed");
        self.subject.notify();
        Ok(())
    }

    /// The element of the selected record, if it has one.
    pub fn selected_content(&self) -> Option<ElementHandle> {
        self.document.content(&self.selection()).ok().flatten()
    }

    /// The element of a record.
    pub fn content(&self, id: &str) -> Result<Option<ElementHandle>> {
        self.document.content(id)
    }

    /// Generate the next unused id for `kind`, e.g. `label3`.
    ///
    /// Counters are per kind and never reuse a number, even after deletes.
    /// Ids already present in the document are skipped.
    pub fn next_id(&self, kind: &str) -> String {
        let mut state = self.state.lock();
        let counter = state.counters.entry(kind.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{kind}{counter}");
            if !self.document.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Insert an element under `parent_id` with an explicit id.
    ///
    /// The selection is unchanged and the tree does not notify.
    pub fn insert(&self, parent_id: &str, id: &str, content: ElementHandle) -> Result<()> {
        self.document
            .insert(parent_id, InsertIndex::Append, id, Some(content))?;
        tracing::debug!(target: targets::TREE, id, parent = parent_id, "row inserted");
        Ok(())
    }

    /// Insert an element under `parent_id` with a generated id.
    pub fn insert_child(&self, parent_id: &str, content: ElementHandle) -> Result<String> {
        let id = self.next_id(content.kind());
        self.insert(parent_id, &id, content)?;
        Ok(id)
    }

    /// Insert a top-level element under the root and select it.
    pub fn insert_toplevel(&self, id: &str, content: ElementHandle) -> Result<()> {
        self.insert(ROOT_ID, id, content)?;
        self.select(id)
    }

    /// Delete a record and its subtree.
    ///
    /// The selection moves to the deleted record's parent and observers are
    /// notified once. Deleting the root is refused.
    pub fn delete(&self, id: &str) -> Result<()> {
        let parent = self.document.parent(id)?.ok_or(StoreError::RootDeletion)?;
        let lineage = self.document.ancestors(&parent)?;

        // Move the selection first so the store notification finds it valid.
        let previous = {
            let mut state = self.state.lock();
            let selection = std::mem::replace(&mut state.selection, parent.clone());
            (selection, std::mem::replace(&mut state.lineage, lineage))
        };
        if let Err(err) = self.document.delete(id) {
            let (selection, lineage) = previous;
            let mut state = self.state.lock();
            state.selection = selection;
            state.lineage = lineage;
            return Err(err);
        }

        tracing::info!(target: targets::TREE, id, selection = %parent, "row deleted");
        self.subject.notify();
        Ok(())
    }

    /// The display label of a row.
    pub fn label(&self, id: &str) -> Result<String> {
        if !self.document.contains(id) {
            return Err(StoreError::UnknownKey(id.to_string()));
        }
        Ok(self
            .state
            .lock()
            .labels
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string()))
    }

    /// Change the display label of a row. Does not notify.
    pub fn set_label(&self, id: &str, label: &str) -> Result<()> {
        if !self.document.contains(id) {
            return Err(StoreError::UnknownKey(id.to_string()));
        }
        self.state.lock().labels.insert(id.to_string(), label.to_string());
        tracing::trace!(target: targets::TREE, id, label, "label changed");
        Ok(())
    }

    /// All rows below the root, in depth-first pre-order.
    pub fn rows(&self) -> Vec<TreeRow> {
        let ids = self.document.with_read(|store| {
            let mut out = Vec::new();
            collect_rows(store, ROOT_ID, 0, &mut out);
            out
        });
        let state = self.state.lock();
        ids.into_iter()
            .map(|(depth, id)| TreeRow {
                depth,
                label: state.labels.get(&id).cloned().unwrap_or_else(|| id.clone()),
                id,
            })
            .collect()
    }
}

fn collect_rows(store: &DocumentStore, id: &str, depth: usize, out: &mut Vec<(usize, String)>) {
    let Ok(children) = store.children(id) else {
        return;
    };
    for child in children {
        out.push((depth, child.to_string()));
        collect_rows(store, child, depth + 1, out);
    }
}

impl Observable for ElementTree {
    fn subject(&self) -> &Subject {
        &self.subject
    }
}

impl Observer for ElementTree {
    fn update(&self) {
        let fallback = {
            let mut state = self.state.lock();
            state.labels.retain(|id, _| self.document.contains(id));
            if self.document.contains(&state.selection) {
                None
            } else {
                let lineage = std::mem::take(&mut state.lineage);
                let survivor = lineage
                    .iter()
                    .position(|id| self.document.contains(id))
                    .unwrap_or(lineage.len().saturating_sub(1));
                let removed = std::mem::replace(
                    &mut state.selection,
                    lineage
                        .get(survivor)
                        .cloned()
                        .unwrap_or_else(|| ROOT_ID.to_string()),
                );
                state.lineage = lineage.into_iter().skip(survivor + 1).collect();
                Some((removed, state.selection.clone()))
            }
        };

        if let Some((removed, selection)) = fallback {
            tracing::debug!(
                target: targets::TREE,
                %removed,
                %selection,
                "selected row removed, selecting nearest ancestor"
            );
            self.subject.notify();
        }
    }
}

impl ValueSource for ElementTree {
    fn current_key(&self) -> Option<String> {
        Some(self.selection())
    }

    fn value(&self, key: &str) -> Option<String> {
        self.label(key).ok()
    }

    fn write(&self, key: &str, value: &str) -> bool {
        self.set_label(key, value).is_ok()
    }
}

impl std::fmt::Debug for ElementTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementTree")
            .field("selection", &self.selection())
            .field("records", &self.document.len())
            .finish()
    }
}

// Ensure ElementTree is Send + Sync
static_assertions::assert_impl_all!(ElementTree: Send, Sync);
