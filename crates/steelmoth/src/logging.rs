//! Tracing targets for the builder views.
//!
//! The document store and subjects log under the targets in
//! [`steelmoth_core::logging::targets`]; the views use these.

/// Target names for log filtering.
pub mod targets {
    /// Element tree (selection provider) target.
    pub const TREE: &str = "steelmoth::tree";
    /// Attribute browser target.
    pub const BROWSER: &str = "steelmoth::browser";
    /// Value editor target.
    pub const EDITOR: &str = "steelmoth::editor";
    /// Headless widget target.
    pub const WIDGET: &str = "steelmoth::widget";
    /// Command execution target.
    pub const COMMAND: &str = "steelmoth::command";
    /// Workbench wiring target.
    pub const WORKBENCH: &str = "steelmoth::workbench";
}
