//! Single-value editors bound to a selection provider.
//!
//! A [`ValueEditor`] shows one value: whatever its [`ValueSource`] reports
//! for the source's current key. It refreshes on every notification from the
//! source and writes user edits straight back through
//! [`ValueSource::write`]. Every edit, accepted or not, updates the editor's
//! [`Validity`]; an edit never triggers a notification of its own.
//!
//! The builder uses two instances:
//!
//! - [`LabelEditor`] edits the display label of the selected tree row
//! - [`AttributeEditor`] edits the selected attribute of the selected element

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use steelmoth_core::{Observable, Observer};

use crate::browser::AttributeBrowser;
use crate::logging::targets;
use crate::tree::ElementTree;

/// A selection provider that exposes one editable value per key.
pub trait ValueSource: Observable + Send + Sync {
    /// The key currently selected, if any.
    fn current_key(&self) -> Option<String>;

    /// The displayed value for `key`.
    fn value(&self, key: &str) -> Option<String>;

    /// Write a value back. Returns `false` if the source rejected it.
    fn write(&self, key: &str, value: &str) -> bool;
}

/// Whether the last edit was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Valid,
    Invalid,
}

#[derive(Debug, Default)]
struct EditorState {
    key: Option<String>,
    text: String,
    validity: Validity,
}

/// A text editor for the current value of a [`ValueSource`].
///
/// The editor holds its source weakly; the source holds the editor weakly
/// through its subject. Whoever assembled the views owns both.
pub struct ValueEditor<S> {
    source: Weak<S>,
    state: Mutex<EditorState>,
}

/// Edits the label of the selected tree row.
pub type LabelEditor = ValueEditor<ElementTree>;

/// Edits the selected attribute of the selected element.
pub type AttributeEditor = ValueEditor<AttributeBrowser>;

impl<S: ValueSource + 'static> ValueEditor<S> {
    /// Create an editor and attach it to `source`.
    ///
    /// The editor stays empty until the source first notifies.
    pub fn bind(source: &Arc<S>) -> Arc<Self> {
        let editor = Arc::new(Self {
            source: Arc::downgrade(source),
            state: Mutex::new(EditorState::default()),
        });
        source.attach_observer(&editor);
        editor
    }

    /// The key whose value is shown.
    pub fn key(&self) -> Option<String> {
        self.state.lock().key.clone()
    }

    /// The text currently in the editor.
    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    pub fn validity(&self) -> Validity {
        self.state.lock().validity
    }

    pub fn is_valid(&self) -> bool {
        self.validity() == Validity::Valid
    }

    /// Apply a user edit and push it to the source.
    ///
    /// The text is kept even when the source rejects it, so the user can
    /// keep typing. Returns whether the source accepted the value.
    pub fn edit(&self, text: &str) -> bool {
        let key = {
            let mut state = self.state.lock();
            state.text = text.to_string();
            state.key.clone()
        };

        let accepted = match (key.as_deref(), self.source.upgrade()) {
            (Some(key), Some(source)) => source.write(key, text),
            _ => false,
        };

        self.state.lock().validity = if accepted {
            Validity::Valid
        } else {
            Validity::Invalid
        };
        tracing::debug!(target: targets::EDITOR, key = ?key, accepted, "value edited");
        accepted
    }
}

impl<S: ValueSource + 'static> Observer for ValueEditor<S> {
    fn update(&self) {
        let Some(source) = self.source.upgrade() else {
            tracing::trace!(target: targets::EDITOR, "source dropped, ignoring update");
            return;
        };
        let key = source.current_key();
        let text = key
            .as_deref()
            .and_then(|key| source.value(key))
            .unwrap_or_default();

        let mut state = self.state.lock();
        state.key = key;
        state.text = text;
        state.validity = Validity::Valid;
    }
}

impl<S> std::fmt::Debug for ValueEditor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueEditor")
            .field("state", &*self.state.lock())
            .finish()
    }
}

// Ensure both editors are Send + Sync
static_assertions::assert_impl_all!(LabelEditor: Send, Sync);
static_assertions::assert_impl_all!(AttributeEditor: Send, Sync);
