//! Builder commands.
//!
//! Each menu action is a [`Command`]: it knows whether it applies to the
//! current selection and how to run against a [`CommandContext`]. Commands
//! only go through the [`ElementTree`] and the element capability interface,
//! so every change reaches the views through the usual notifications.

use steelmoth_core::{ElementHandle, ROOT_ID};

use crate::config::BuilderConfig;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::tree::ElementTree;
use crate::widget::{ElementFactory, ElementKind};

/// Everything a command may touch.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub tree: &'a ElementTree,
    pub factory: &'a dyn ElementFactory,
    pub config: &'a BuilderConfig,
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A record was inserted with this id.
    Inserted(String),
    /// A record was deleted; `selection` is the new selection.
    Deleted { id: String, selection: String },
    /// The selected top-level element was retitled.
    Retitled { id: String, title: String },
}

/// A user-invocable builder action.
pub trait Command {
    /// Menu label.
    fn label(&self) -> String;

    /// Whether the command applies to the current selection.
    fn is_enabled(&self, ctx: &CommandContext<'_>) -> bool;

    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disabled`] when not enabled, or the store or element
    /// error that stopped it.
    fn execute(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome>;
}

/// Insert a new element.
///
/// Top-level elements go under the document root. Everything else goes under
/// the selected record, which must be a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertElement {
    pub kind: ElementKind,
}

impl InsertElement {
    pub fn new(kind: ElementKind) -> Self {
        Self { kind }
    }

    fn label_from_id(&self, ctx: &CommandContext<'_>, element: &ElementHandle, id: &str) -> Result<()> {
        if !ctx.config.label_text_from_id {
            return Ok(());
        }
        if self.kind.has_text() {
            element.set("text", id)?;
        } else if self.kind == ElementKind::Toplevel {
            element.set("title", id)?;
        }
        Ok(())
    }

    fn parent(&self, ctx: &CommandContext<'_>) -> Option<String> {
        if self.kind == ElementKind::Toplevel {
            return Some(ROOT_ID.to_string());
        }
        let selection = ctx.tree.selection();
        let content = ctx.tree.content(&selection).ok()??;
        let kind: ElementKind = content.kind().parse().ok()?;
        kind.is_container().then_some(selection)
    }
}

impl Command for InsertElement {
    fn label(&self) -> String {
        let name = self.kind.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("Insert {}{}", first.to_uppercase(), chars.as_str()),
            None => "Insert".to_string(),
        }
    }

    fn is_enabled(&self, ctx: &CommandContext<'_>) -> bool {
        self.parent(ctx).is_some()
    }

    fn execute(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome> {
        let parent = self.parent(ctx).ok_or_else(|| Error::disabled(self.label()))?;
        let parent_content = ctx.tree.content(&parent)?;

        let id = ctx.tree.next_id(self.kind.name());
        let element = ctx.factory.create(self.kind, parent_content.as_ref());
        let placed = self
            .label_from_id(ctx, &element, &id)
            .and_then(|()| Ok(ctx.tree.insert(&parent, &id, element.clone())?));
        if let Err(err) = placed {
            // The store never took the element, so release it here.
            element.destroy();
            tracing::debug!(target: targets::COMMAND, kind = %self.kind, %id, %err, "insert abandoned");
            return Err(err);
        }

        tracing::info!(target: targets::COMMAND, kind = %self.kind, %id, %parent, "element inserted");
        Ok(CommandOutcome::Inserted(id))
    }
}

/// Delete the selected record and its subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteElement;

impl Command for DeleteElement {
    fn label(&self) -> String {
        "Delete".to_string()
    }

    fn is_enabled(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.tree.selection() != ROOT_ID
    }

    fn execute(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome> {
        if !self.is_enabled(ctx) {
            return Err(Error::disabled(self.label()));
        }
        let id = ctx.tree.selection();
        ctx.tree.delete(&id)?;
        Ok(CommandOutcome::Deleted {
            id,
            selection: ctx.tree.selection(),
        })
    }
}

/// Set the title of the selected top-level element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetToplevelTitle {
    pub title: String,
}

impl SetToplevelTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Command for SetToplevelTitle {
    fn label(&self) -> String {
        "Set Toplevel Title".to_string()
    }

    fn is_enabled(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.tree
            .selected_content()
            .is_some_and(|content| content.kind() == ElementKind::Toplevel.name())
    }

    fn execute(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome> {
        let id = ctx.tree.selection();
        let content = ctx
            .tree
            .selected_content()
            .filter(|content| content.kind() == ElementKind::Toplevel.name())
            .ok_or_else(|| Error::disabled(self.label()))?;

        content.set("title", &self.title)?;
        ctx.tree.document().refresh_attributes(&id)?;
        tracing::info!(target: targets::COMMAND, %id, title = %self.title, "toplevel retitled");
        Ok(CommandOutcome::Retitled {
            id,
            title: self.title.clone(),
        })
    }
}
