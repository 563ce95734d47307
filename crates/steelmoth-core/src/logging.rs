//! Logging and debugging facilities for Steel Moth.
//!
//! This module provides:
//! - Target names for the `tracing` instrumentation used across the workspace
//! - Debug visualization for document trees
//!
//! # Tracing Integration
//!
//! Steel Moth uses the `tracing` crate for instrumentation. To see logs, the
//! host application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("steelmoth=debug,steelmoth_core=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Use [`DocumentTreeDebug`] to render the record hierarchy:
//!
//! ```
//! use steelmoth_core::{DocumentStore, DocumentTreeDebug, InsertIndex};
//!
//! let mut store = DocumentStore::new();
//! store.insert("", InsertIndex::Append, "frame1", None).unwrap();
//! println!("{}", DocumentTreeDebug::new().format_all(&store));
//! ```

use std::fmt::Write as FmtWrite;

use crate::document::{DocumentStore, ROOT_ID};
use crate::error::Result;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "steelmoth_core";
    /// Subject/observer fan-out target.
    pub const SUBJECT: &str = "steelmoth_core::subject";
    /// Document store target.
    pub const DOCUMENT: &str = "steelmoth_core::document";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for document tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show element kinds.
    pub show_kinds: bool,
    /// Whether to list cached attributes under each record.
    pub show_attributes: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_kinds: true,
            show_attributes: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_attributes: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_kinds: false,
            show_attributes: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing document trees.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole document, starting at the root.
    pub fn format_all(&self, store: &DocumentStore) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Document ({} records):", store.len());
        if store.is_empty() {
            let _ = writeln!(output, "  (empty)");
            return output;
        }
        // The root id is always present.
        let _ = self.format_subtree_into(store, ROOT_ID, 0, true, &mut output);
        output
    }

    /// Format a subtree starting from a specific record.
    pub fn format_subtree(&self, store: &DocumentStore, id: &str) -> Result<String> {
        let mut output = String::new();
        self.format_subtree_into(store, id, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_subtree_into(
        &self,
        store: &DocumentStore,
        id: &str,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> Result<()> {
        if let Some(max) = self.options.max_depth {
            if depth > max {
                return Ok(());
            }
        }

        let content = store.content(id)?;
        let children = store.children(id)?;

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(if id == ROOT_ID { "(root)" } else { id });
        if self.options.show_kinds {
            if let Some(content) = &content {
                let _ = write!(output, " ({})", content.kind());
            }
        }
        output.push('\n');

        if self.options.show_attributes {
            let prefix = self.build_attribute_prefix(depth);
            for (name, value) in store.attributes(id)? {
                let _ = writeln!(output, "{prefix}  .{name} = {value:?}");
            }
        }

        let child_count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_subtree_into(store, child, depth + 1, i == child_count - 1, output)?;
        }

        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "- ", "- "),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix
    }

    fn build_attribute_prefix(&self, depth: usize) -> String {
        let branch = match self.options.style {
            TreeStyle::Ascii => "|",
            TreeStyle::Unicode => "\u{2502}",
            TreeStyle::Compact => "",
        };
        let mut prefix = String::new();
        for _ in 0..depth {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix
    }
}
