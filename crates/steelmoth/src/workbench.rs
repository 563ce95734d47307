//! The workbench: one builder session with its views wired together.
//!
//! The notification chain is
//!
//! ```text
//! SharedDocument ──> ElementTree ──┬──> LabelEditor
//!                                  └──> AttributeBrowser ──> AttributeEditor
//! ```
//!
//! Every link is non-owning. The workbench holds the only strong handles, so
//! dropping it tears the whole session down.

use std::sync::Arc;

use steelmoth_core::{DocumentTreeDebug, SharedDocument, TreeFormatOptions, ROOT_ID};

use crate::browser::AttributeBrowser;
use crate::command::{Command, CommandContext, CommandOutcome};
use crate::config::BuilderConfig;
use crate::editor::{AttributeEditor, LabelEditor, ValueEditor};
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::tree::ElementTree;
use crate::widget::{ElementFactory, ElementKind, HeadlessFactory};

/// A builder session.
pub struct Workbench {
    config: BuilderConfig,
    factory: Box<dyn ElementFactory>,
    document: Arc<SharedDocument>,
    tree: Arc<ElementTree>,
    label_editor: Arc<LabelEditor>,
    browser: Arc<AttributeBrowser>,
    attribute_editor: Arc<AttributeEditor>,
}

impl Workbench {
    /// Create a session with headless elements.
    pub fn new(config: BuilderConfig) -> Result<Self> {
        Self::with_factory(config, Box::new(HeadlessFactory))
    }

    /// Create a session that builds elements with `factory`.
    ///
    /// Seeds a top-level element named by [`BuilderConfig::root_id`] and
    /// selects it, so every view starts populated.
    pub fn with_factory(config: BuilderConfig, factory: Box<dyn ElementFactory>) -> Result<Self> {
        let document = Arc::new(SharedDocument::new());
        let tree = ElementTree::new(document.clone());
        let label_editor = ValueEditor::bind(&tree);
        let browser = AttributeBrowser::new(&tree);
        let attribute_editor = ValueEditor::bind(&browser);

        let root = factory.create(ElementKind::Toplevel, None);
        let seeded = root
            .set("title", &config.root_id)
            .map_err(Error::from)
            .and_then(|()| Ok(tree.insert(ROOT_ID, &config.root_id, root.clone())?));
        if let Err(err) = seeded {
            root.destroy();
            return Err(err);
        }
        tree.select(&config.root_id)?;

        tracing::info!(
            target: targets::WORKBENCH,
            title = %config.window_title,
            root = %config.root_id,
            "workbench ready"
        );

        Ok(Self {
            config,
            factory,
            document,
            tree,
            label_editor,
            browser,
            attribute_editor,
        })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Title for the builder window.
    pub fn title(&self) -> &str {
        &self.config.window_title
    }

    pub fn document(&self) -> &Arc<SharedDocument> {
        &self.document
    }

    pub fn tree(&self) -> &Arc<ElementTree> {
        &self.tree
    }

    pub fn label_editor(&self) -> &Arc<LabelEditor> {
        &self.label_editor
    }

    pub fn browser(&self) -> &Arc<AttributeBrowser> {
        &self.browser
    }

    pub fn attribute_editor(&self) -> &Arc<AttributeEditor> {
        &self.attribute_editor
    }

    /// Context for running commands against this session.
    pub fn context(&self) -> CommandContext<'_> {
        CommandContext {
            tree: &self.tree,
            factory: self.factory.as_ref(),
            config: &self.config,
        }
    }

    /// Whether `command` applies to the current selection.
    pub fn is_enabled(&self, command: &dyn Command) -> bool {
        command.is_enabled(&self.context())
    }

    /// Run a command.
    pub fn run(&self, command: &dyn Command) -> Result<CommandOutcome> {
        let ctx = self.context();
        match command.execute(&ctx) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::warn!(target: targets::WORKBENCH, command = %command.label(), %err, "command failed");
                Err(err)
            }
        }
    }

    /// Render the document tree with cached attributes.
    pub fn dump(&self) -> String {
        let debug = DocumentTreeDebug::with_options(TreeFormatOptions::detailed());
        self.document.with_read(|store| debug.format_all(store))
    }
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("config", &self.config)
            .field("tree", &self.tree)
            .field("browser", &self.browser)
            .finish_non_exhaustive()
    }
}
