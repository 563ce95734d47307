//! Core systems for Steel Moth.
//!
//! This crate provides the document/observer synchronization engine behind the
//! Steel Moth builder:
//!
//! - **Subjects**: Ordered, non-owning one-to-many notification channels
//! - **Elements**: The capability interface displayable elements implement
//! - **Document Store**: Hierarchical, uniquely keyed records with cascading delete
//! - **Logging**: Tracing targets and document tree visualization
//!
//! # Example
//!
//! ```
//! use steelmoth_core::{InsertIndex, SharedDocument, StoreError, ROOT_ID};
//!
//! let document = SharedDocument::new();
//! document.insert(ROOT_ID, InsertIndex::Append, "frame1", None)?;
//! document.insert("frame1", InsertIndex::Append, "label1", None)?;
//!
//! // Deleting a record removes its whole subtree.
//! document.delete("frame1")?;
//! assert!(!document.contains("label1"));
//! # Ok::<(), StoreError>(())
//! ```

pub mod document;
pub mod element;
mod error;
pub mod logging;
pub mod subject;

pub use document::{
    DocumentChange, DocumentStore, InsertIndex, Record, RecordKey, Removal, SharedDocument,
    ROOT_ID,
};
pub use element::{snapshot_attributes, sorted_attribute_names, Element, ElementHandle};
pub use error::{AttributeRejected, Result, StoreError};
pub use logging::{DocumentTreeDebug, TreeFormatOptions, TreeStyle};
pub use subject::{Observable, Observer, ObserverId, Subject};
