//! Document store for Steel Moth.
//!
//! Provides the hierarchical record store behind the builder:
//! - Unique string ids for every record, with an implicit root `""`
//! - Arena-based storage with parent-child links held as keys
//! - Cascading delete that destroys each contained element exactly once
//! - Attribute snapshots taken from the element handles
//!
//! # Key Types
//!
//! - [`DocumentStore`] - The arena itself, mutated through `&mut self`
//! - [`SharedDocument`] - Lock-protected wrapper that notifies observers
//! - [`Record`] - An owned snapshot of one record
//! - [`DocumentChange`] - The last mutation, readable by observers
//!
//! # Related Modules
//!
//! - [`crate::element`] - The capability trait held in each record
//! - [`crate::subject`] - Notification channel embedded in [`SharedDocument`]

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use parking_lot::{Mutex, RwLock};
use slotmap::{new_key_type, SlotMap};

use crate::element::{snapshot_attributes, ElementHandle};
use crate::error::{Result, StoreError};
use crate::logging::targets;
use crate::subject::{Observable, Subject};

/// Id of the implicit root record.
pub const ROOT_ID: &str = "";

new_key_type! {
    /// Arena key of a record.
    ///
    /// Keys are internal back-references; the public API speaks in string ids.
    pub struct RecordKey;
}

/// Where a new record goes among its parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertIndex {
    /// After the last child.
    #[default]
    Append,
    /// Before the child currently at this position. `At(len)` appends.
    At(usize),
}

/// Internal data stored in the arena for each record.
struct RecordData {
    id: String,
    content: Option<ElementHandle>,
    parent: Option<RecordKey>,
    children: Vec<RecordKey>,
    /// Display cache; the element stays authoritative.
    attributes: BTreeMap<String, String>,
}

/// An owned snapshot of one record.
#[derive(Clone)]
pub struct Record {
    /// Unique id.
    pub id: String,
    /// Element handle; `None` for the root and for placeholder records.
    pub content: Option<ElementHandle>,
    /// Parent id; `None` only for the root.
    pub parent: Option<String>,
    /// Child ids in display order.
    pub children: Vec<String>,
    /// Attribute snapshot.
    pub attributes: BTreeMap<String, String>,
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("kind", &self.content.as_ref().map(|c| c.kind().to_string()))
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// The result of a cascading delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// The id passed to `delete`.
    pub id: String,
    /// Former parent of `id`.
    pub parent: String,
    /// Every removed id, in post-order (the top-level id last).
    pub removed: Vec<String>,
}

/// The most recent mutation of a [`SharedDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentChange {
    /// A record was inserted under `parent`.
    Inserted {
        /// The new record id.
        id: String,
        /// Its parent id.
        parent: String,
    },
    /// A subtree was removed.
    Removed(Removal),
}

/// The hierarchical keyed record store.
///
/// Uses arena-based storage via SlotMap plus an id index. The root record
/// always exists.
///
/// # Related Types
///
/// - [`SharedDocument`] - Thread-safe, observable wrapper
/// - [`Record`] - Snapshots returned by [`insert`](Self::insert) and [`record`](Self::record)
pub struct DocumentStore {
    records: SlotMap<RecordKey, RecordData>,
    index: HashMap<String, RecordKey>,
    root: RecordKey,
}

impl DocumentStore {
    /// Create a store holding only the root record.
    pub fn new() -> Self {
        let mut records = SlotMap::with_key();
        let root = records.insert(RecordData {
            id: ROOT_ID.to_string(),
            content: None,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        });
        let mut index = HashMap::new();
        index.insert(ROOT_ID.to_string(), root);
        Self {
            records,
            index,
            root,
        }
    }

    fn key(&self, id: &str) -> Result<RecordKey> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| StoreError::UnknownKey(id.to_string()))
    }

    fn data(&self, id: &str) -> Result<&RecordData> {
        let key = self.key(id)?;
        self.records
            .get(key)
            .ok_or_else(|| StoreError::UnknownKey(id.to_string()))
    }

    fn id_of(&self, key: RecordKey) -> &str {
        self.records.get(key).map_or(ROOT_ID, |d| d.id.as_str())
    }

    /// Insert a new record under `parent_id`.
    ///
    /// Validation happens before any mutation, so a failed insert leaves the
    /// store unchanged.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicateKey`] if `id` already exists
    /// - [`StoreError::MissingParent`] if `parent_id` does not exist
    /// - [`StoreError::InvalidIndex`] if `index` is `At(n)` with `n` past the end
    #[tracing::instrument(skip(self, content), target = "steelmoth_core::document", level = "debug")]
    pub fn insert(
        &mut self,
        parent_id: &str,
        index: InsertIndex,
        id: &str,
        content: Option<ElementHandle>,
    ) -> Result<Record> {
        if self.index.contains_key(id) {
            return Err(StoreError::DuplicateKey(id.to_string()));
        }
        let parent_key = self
            .index
            .get(parent_id)
            .copied()
            .ok_or_else(|| StoreError::MissingParent(parent_id.to_string()))?;
        let len = self.records[parent_key].children.len();
        let position = match index {
            InsertIndex::Append => len,
            InsertIndex::At(n) if n <= len => n,
            InsertIndex::At(n) => {
                return Err(StoreError::InvalidIndex {
                    parent: parent_id.to_string(),
                    index: n,
                    len,
                });
            }
        };

        let attributes = content
            .as_deref()
            .map(snapshot_attributes)
            .unwrap_or_default();
        let key = self.records.insert(RecordData {
            id: id.to_string(),
            content,
            parent: Some(parent_key),
            children: Vec::new(),
            attributes,
        });
        self.index.insert(id.to_string(), key);
        self.records[parent_key].children.insert(position, key);
        tracing::debug!(target: targets::DOCUMENT, id, parent = parent_id, position, "record inserted");

        Ok(self.snapshot(key))
    }

    /// Delete a record and its whole subtree.
    ///
    /// Every element in the subtree is destroyed exactly once, in post-order:
    /// children before their parent, each destroyed before its id leaves the
    /// store. The top-level id is then unlinked from its parent.
    ///
    /// # Errors
    ///
    /// - [`StoreError::RootDeletion`] for the root id
    /// - [`StoreError::UnknownKey`] if `id` does not exist
    #[tracing::instrument(skip(self), target = "steelmoth_core::document", level = "debug")]
    pub fn delete(&mut self, id: &str) -> Result<Removal> {
        if id == ROOT_ID {
            return Err(StoreError::RootDeletion);
        }
        let key = self.key(id)?;
        let parent_key = self.records[key].parent.unwrap_or(self.root);
        let order = self.collect_postorder(key);

        let mut removed = Vec::with_capacity(order.len());
        for node in order {
            if let Some(content) = self.records.get(node).and_then(|d| d.content.clone()) {
                content.destroy();
            }
            if let Some(data) = self.records.remove(node) {
                self.index.remove(&data.id);
                removed.push(data.id);
            }
        }

        if let Some(parent) = self.records.get_mut(parent_key) {
            parent.children.retain(|&child| child != key);
        }
        let parent = self.id_of(parent_key).to_string();
        tracing::debug!(target: targets::DOCUMENT, id, parent = %parent, removed_count = removed.len(), "subtree deleted");

        Ok(Removal {
            id: id.to_string(),
            parent,
            removed,
        })
    }

    /// Collect `key` and its descendants, children before parents.
    fn collect_postorder(&self, key: RecordKey) -> Vec<RecordKey> {
        let mut result = Vec::new();
        self.collect_postorder_recursive(key, &mut result);
        result
    }

    fn collect_postorder_recursive(&self, key: RecordKey, result: &mut Vec<RecordKey>) {
        if let Some(data) = self.records.get(key) {
            for &child in &data.children {
                self.collect_postorder_recursive(child, result);
            }
            result.push(key);
        }
    }

    fn snapshot(&self, key: RecordKey) -> Record {
        let data = &self.records[key];
        Record {
            id: data.id.clone(),
            content: data.content.clone(),
            parent: data.parent.map(|p| self.id_of(p).to_string()),
            children: data
                .children
                .iter()
                .map(|&c| self.id_of(c).to_string())
                .collect(),
            attributes: data.attributes.clone(),
        }
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of records, the root included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.records.len() == 1
    }

    /// Get a snapshot of a record.
    pub fn record(&self, id: &str) -> Result<Record> {
        self.key(id).map(|key| self.snapshot(key))
    }

    /// Get the parent id of a record; `None` for the root.
    pub fn parent(&self, id: &str) -> Result<Option<&str>> {
        let data = self.data(id)?;
        Ok(data.parent.map(|p| self.id_of(p)))
    }

    /// Get the child ids of a record in display order.
    pub fn children(&self, id: &str) -> Result<Vec<&str>> {
        let data = self.data(id)?;
        Ok(data.children.iter().map(|&c| self.id_of(c)).collect())
    }

    /// Get the element handle of a record.
    pub fn content(&self, id: &str) -> Result<Option<ElementHandle>> {
        self.data(id).map(|d| d.content.clone())
    }

    /// Get the cached attribute snapshot of a record.
    pub fn attributes(&self, id: &str) -> Result<&BTreeMap<String, String>> {
        self.data(id).map(|d| &d.attributes)
    }

    /// Re-read a record's attributes from its element.
    pub fn refresh_attributes(&mut self, id: &str) -> Result<&BTreeMap<String, String>> {
        let key = self.key(id)?;
        let data = &mut self.records[key];
        data.attributes = data
            .content
            .as_deref()
            .map(snapshot_attributes)
            .unwrap_or_default();
        Ok(&data.attributes)
    }

    /// Get the index of a record among its siblings; `None` for the root.
    pub fn sibling_index(&self, id: &str) -> Result<Option<usize>> {
        let key = self.key(id)?;
        Ok(self.records[key]
            .parent
            .and_then(|p| self.records.get(p))
            .and_then(|parent| parent.children.iter().position(|&c| c == key)))
    }

    /// Get all ancestors of a record from immediate parent to root.
    pub fn ancestors(&self, id: &str) -> Result<Vec<&str>> {
        let mut result = Vec::new();
        let mut current = self.data(id)?.parent;
        while let Some(key) = current {
            result.push(self.id_of(key));
            current = self.records.get(key).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Depth-first pre-order traversal: the record first, then its children.
    pub fn depth_first_preorder(&self, id: &str) -> Result<Vec<&str>> {
        let mut stack = vec![self.key(id)?];
        let mut result = Vec::new();
        while let Some(key) = stack.pop() {
            if let Some(data) = self.records.get(key) {
                result.push(data.id.as_str());
                stack.extend(data.children.iter().rev().copied());
            }
        }
        Ok(result)
    }

    /// Depth-first post-order traversal: children first, then the record.
    pub fn depth_first_postorder(&self, id: &str) -> Result<Vec<&str>> {
        let key = self.key(id)?;
        Ok(self
            .collect_postorder(key)
            .into_iter()
            .map(|k| self.id_of(k))
            .collect())
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A thread-safe, observable wrapper around [`DocumentStore`].
///
/// Mutations take the write lock, record a [`DocumentChange`], release the
/// lock, and only then notify observers, so every observer sees the mutation
/// complete. A delete notifies once for the top-level id, never per
/// descendant.
pub struct SharedDocument {
    inner: RwLock<DocumentStore>,
    last_change: Mutex<Option<DocumentChange>>,
    subject: Subject,
}

impl SharedDocument {
    /// Create a shared store holding only the root record.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(DocumentStore::new()),
            last_change: Mutex::new(None),
            subject: Subject::new(),
        }
    }

    /// Insert a record and notify observers.
    pub fn insert(
        &self,
        parent_id: &str,
        index: InsertIndex,
        id: &str,
        content: Option<ElementHandle>,
    ) -> Result<Record> {
        let record = self.inner.write().insert(parent_id, index, id, content)?;
        *self.last_change.lock() = Some(DocumentChange::Inserted {
            id: record.id.clone(),
            parent: parent_id.to_string(),
        });
        self.subject.notify();
        Ok(record)
    }

    /// Delete a subtree and notify observers once.
    pub fn delete(&self, id: &str) -> Result<()> {
        let removal = self.inner.write().delete(id)?;
        *self.last_change.lock() = Some(DocumentChange::Removed(removal));
        self.subject.notify();
        Ok(())
    }

    /// The most recent successful mutation.
    pub fn last_change(&self) -> Option<DocumentChange> {
        self.last_change.lock().clone()
    }

    /// Run a closure against the store under the read lock.
    ///
    /// Do not call back into this `SharedDocument`'s mutating methods from
    /// inside the closure.
    pub fn with_read<R>(&self, f: impl FnOnce(&DocumentStore) -> R) -> R {
        f(&self.inner.read())
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().contains(id)
    }

    /// Number of records, the root included.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the store holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Get a snapshot of a record.
    pub fn record(&self, id: &str) -> Result<Record> {
        self.inner.read().record(id)
    }

    /// Get the parent id of a record (returns owned String for thread safety).
    pub fn parent(&self, id: &str) -> Result<Option<String>> {
        self.inner
            .read()
            .parent(id)
            .map(|p| p.map(str::to_string))
    }

    /// Get the child ids of a record (returns owned Vec for thread safety).
    pub fn children(&self, id: &str) -> Result<Vec<String>> {
        self.inner
            .read()
            .children(id)
            .map(|c| c.into_iter().map(str::to_string).collect())
    }

    /// Get the element handle of a record.
    pub fn content(&self, id: &str) -> Result<Option<ElementHandle>> {
        self.inner.read().content(id)
    }

    /// Get the cached attribute snapshot of a record.
    pub fn attributes(&self, id: &str) -> Result<BTreeMap<String, String>> {
        self.inner.read().attributes(id).cloned()
    }

    /// Re-read a record's attributes from its element.
    pub fn refresh_attributes(&self, id: &str) -> Result<BTreeMap<String, String>> {
        self.inner.write().refresh_attributes(id).cloned()
    }

    /// Ancestor ids from the immediate parent up to the root.
    pub fn ancestors(&self, id: &str) -> Result<Vec<String>> {
        self.inner
            .read()
            .ancestors(id)
            .map(|ids| ids.into_iter().map(str::to_string).collect())
    }

    /// Depth-first pre-order ids starting at `id`.
    pub fn depth_first_preorder(&self, id: &str) -> Result<Vec<String>> {
        self.inner
            .read()
            .depth_first_preorder(id)
            .map(|ids| ids.into_iter().map(str::to_string).collect())
    }
}

impl Default for SharedDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Observable for SharedDocument {
    fn subject(&self) -> &Subject {
        &self.subject
    }
}
