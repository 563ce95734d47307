//! Steel Moth: the core of an interactive UI builder.
//!
//! A builder session keeps a hierarchical document of elements and several
//! views of it that stay in sync through subject/observer notifications:
//!
//! - [`ElementTree`] - the record hierarchy, its selection and row labels
//! - [`AttributeBrowser`] - the attributes of the selected element
//! - [`ValueEditor`] - single-value editors over the tree and the browser
//!
//! [`Workbench`] assembles a session; [`Command`]s drive it.
//!
//! # Example
//!
//! ```
//! use steelmoth::{BuilderConfig, ElementKind, InsertElement, Workbench};
//!
//! let bench = Workbench::new(BuilderConfig::default())?;
//! bench.run(&InsertElement::new(ElementKind::Frame))?;
//! bench.tree().select("frame1")?;
//! bench.run(&InsertElement::new(ElementKind::Label))?;
//!
//! bench.tree().select("label1")?;
//! bench.browser().select("text");
//! assert_eq!(bench.attribute_editor().text(), "label1");
//! # Ok::<(), steelmoth::Error>(())
//! ```

pub mod browser;
pub mod command;
pub mod config;
pub mod editor;
mod error;
pub mod logging;
pub mod tree;
pub mod widget;
pub mod workbench;

pub use browser::{AttributeBrowser, AttributeRow};
pub use command::{
    Command, CommandContext, CommandOutcome, DeleteElement, InsertElement, SetToplevelTitle,
};
pub use config::BuilderConfig;
pub use editor::{AttributeEditor, LabelEditor, Validity, ValueEditor, ValueSource};
pub use error::{ConfigError, Error, Result};
pub use tree::{ElementTree, TreeRow};
pub use widget::{
    AttributeSpec, ElementFactory, ElementKind, HeadlessFactory, UnknownKind, ValueKind, Widget,
};
pub use workbench::Workbench;

pub use steelmoth_core;
