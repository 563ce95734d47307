//! The attribute browser: name/value rows for the selected element.
//!
//! [`AttributeBrowser`] observes the [`ElementTree`]. On every tree
//! notification it reads a fresh attribute list from the selected element,
//! rebuilds its rows in sorted name order and tries to keep the previously
//! selected attribute selected. It is a selection provider in its own right:
//! the attribute editor attaches to it and edits the selected attribute.
//!
//! Writes go straight to the element. The displayed value only changes when
//! the element accepts the write.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use steelmoth_core::{sorted_attribute_names, ElementHandle, Observable, Observer, Subject};

use crate::editor::ValueSource;
use crate::logging::targets;
use crate::tree::ElementTree;

/// One displayed attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow {
    pub name: String,
    pub value: String,
}

#[derive(Default)]
struct BrowserState {
    /// Record id and element the rows were read from.
    element: Option<(String, ElementHandle)>,
    rows: Vec<AttributeRow>,
    selection: Option<String>,
}

/// Selection provider over the attributes of the selected element.
pub struct AttributeBrowser {
    tree: Weak<ElementTree>,
    state: Mutex<BrowserState>,
    subject: Subject,
}

impl AttributeBrowser {
    /// Create a browser and attach it to `tree`.
    ///
    /// The browser is empty until the tree first notifies.
    pub fn new(tree: &Arc<ElementTree>) -> Arc<Self> {
        let browser = Arc::new(Self {
            tree: Arc::downgrade(tree),
            state: Mutex::new(BrowserState::default()),
            subject: Subject::new(),
        });
        tree.attach_observer(&browser);
        browser
    }

    /// The record whose attributes are shown.
    pub fn record_id(&self) -> Option<String> {
        self.state.lock().element.as_ref().map(|(id, _)| id.clone())
    }

    /// Attribute names in display order.
    pub fn items(&self) -> Vec<String> {
        self.state
            .lock()
            .rows
            .iter()
            .map(|row| row.name.clone())
            .collect()
    }

    pub fn rows(&self) -> Vec<AttributeRow> {
        self.state.lock().rows.clone()
    }

    /// The selected attribute name.
    pub fn selection(&self) -> Option<String> {
        self.state.lock().selection.clone()
    }

    /// Select an attribute and notify observers.
    ///
    /// Returns `false` without notifying if no such row is shown.
    pub fn select(&self, name: &str) -> bool {
        {
            let mut state = self.state.lock();
            if !state.rows.iter().any(|row| row.name == name) {
                return false;
            }
            state.selection = Some(name.to_string());
        }
        tracing::debug!(target: targets::BROWSER, name, "attribute selected");
        self.subject.notify();
        true
    }

    /// The displayed value of an attribute.
    pub fn get(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.value.clone())
    }

    /// Write an attribute to the selected element.
    ///
    /// The element is only written when `value` differs from its current
    /// value. A rejected write is logged and leaves the display unchanged.
    pub fn set(&self, name: &str, value: &str) -> bool {
        let (record, element) = {
            let state = self.state.lock();
            let Some((record, element)) = state.element.clone() else {
                return false;
            };
            if !state.rows.iter().any(|row| row.name == name) {
                return false;
            }
            (record, element)
        };

        if element.get(name).as_deref() != Some(value) {
            if let Err(err) = element.set(name, value) {
                tracing::warn!(target: targets::BROWSER, record = %record, %err, "attribute write rejected");
                return false;
            }
        }

        let shown = element.get(name).unwrap_or_else(|| value.to_string());
        if let Some(row) = self
            .state
            .lock()
            .rows
            .iter_mut()
            .find(|row| row.name == name)
        {
            row.value = shown;
        }

        if let Some(tree) = self.tree.upgrade() {
            if let Err(err) = tree.document().refresh_attributes(&record) {
                tracing::debug!(target: targets::BROWSER, record = %record, %err, "record gone before attribute refresh");
            }
        }
        tracing::debug!(target: targets::BROWSER, record = %record, name, value, "attribute written");
        true
    }
}

impl Observable for AttributeBrowser {
    fn subject(&self) -> &Subject {
        &self.subject
    }
}

impl Observer for AttributeBrowser {
    fn update(&self) {
        let Some(tree) = self.tree.upgrade() else {
            tracing::trace!(target: targets::BROWSER, "tree dropped, ignoring update");
            return;
        };
        let record = tree.selection();
        let element = tree.content(&record).ok().flatten();

        let rows: Vec<AttributeRow> = element
            .as_deref()
            .map(|element| {
                sorted_attribute_names(element)
                    .into_iter()
                    .map(|name| AttributeRow {
                        value: element.get(&name).unwrap_or_default(),
                        name,
                    })
                    .collect()
            })
            .unwrap_or_default();

        {
            let mut state = self.state.lock();
            let previous = state.selection.take();
            state.selection = previous
                .filter(|name| rows.iter().any(|row| &row.name == name))
                .or_else(|| rows.first().map(|row| row.name.clone()));
            tracing::trace!(
                target: targets::BROWSER,
                record = %record,
                count = rows.len(),
                selection = ?state.selection,
                "attributes reloaded"
            );
            state.rows = rows;
            state.element = element.map(|element| (record, element));
        }

        self.subject.notify();
    }
}

impl ValueSource for AttributeBrowser {
    fn current_key(&self) -> Option<String> {
        self.selection()
    }

    fn value(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    fn write(&self, key: &str, value: &str) -> bool {
        self.set(key, value)
    }
}

impl std::fmt::Debug for AttributeBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AttributeBrowser")
            .field("record", &state.element.as_ref().map(|(id, _)| id))
            .field("rows", &state.rows)
            .field("selection", &state.selection)
            .finish()
    }
}

// Ensure AttributeBrowser is Send + Sync
static_assertions::assert_impl_all!(AttributeBrowser: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{ElementKind, Widget};
    use std::collections::BTreeMap;
    use steelmoth_core::{AttributeRejected, Element, InsertIndex, SharedDocument, ROOT_ID};

    /// An element whose attribute set can grow after it is inserted.
    struct Growing(Mutex<BTreeMap<String, String>>);

    impl Growing {
        fn add(&self, name: &str, value: &str) {
            self.0.lock().insert(name.into(), value.into());
        }
    }

    impl Element for Growing {
        fn kind(&self) -> &str {
            "growing"
        }

        fn destroy(&self) {}

        fn attribute_names(&self) -> Vec<String> {
            self.0.lock().keys().rev().cloned().collect()
        }

        fn get(&self, name: &str) -> Option<String> {
            self.0.lock().get(name).cloned()
        }

        fn set(&self, name: &str, value: &str) -> Result<(), AttributeRejected> {
            self.add(name, value);
            Ok(())
        }
    }

    fn setup() -> (Arc<ElementTree>, Arc<AttributeBrowser>) {
        let tree = ElementTree::new(Arc::new(SharedDocument::new()));
        let browser = AttributeBrowser::new(&tree);
        tree.insert_toplevel("root", Arc::new(Widget::new(ElementKind::Toplevel)))
            .unwrap();
        (tree, browser)
    }

    #[test]
    fn test_rows_follow_tree_selection() {
        let (tree, browser) = setup();
        assert_eq!(browser.record_id().as_deref(), Some("root"));
        assert!(browser.items().contains(&"title".to_string()));

        let label = tree
            .insert_child("root", Arc::new(Widget::new(ElementKind::Label)))
            .unwrap();
        tree.select(&label).unwrap();
        assert_eq!(browser.record_id().as_deref(), Some(label.as_str()));
        assert!(browser.items().contains(&"wraplength".to_string()));
        assert!(!browser.items().contains(&"title".to_string()));
    }

    #[test]
    fn test_names_are_read_from_element_not_record_cache() {
        let (tree, browser) = setup();
        let element = Arc::new(Growing(Mutex::new(BTreeMap::new())));
        element.add("text", "hi");
        tree.document()
            .insert("root", InsertIndex::Append, "custom1", Some(element.clone()))
            .unwrap();
        tree.select("custom1").unwrap();
        assert_eq!(browser.items(), vec!["text"]);

        element.add("zeta", "z");
        element.add("anchor", "w");
        let cached = tree.document().attributes("custom1").unwrap();
        assert!(!cached.contains_key("anchor"));

        tree.select("custom1").unwrap();
        assert_eq!(browser.items(), vec!["anchor", "text", "zeta"]);
        assert_eq!(browser.get("zeta").as_deref(), Some("z"));
        assert_eq!(browser.selection().as_deref(), Some("text"));
    }

    #[test]
    fn test_rows_are_sorted() {
        let (_tree, browser) = setup();
        let items = browser.items();
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(items, sorted);
        assert_eq!(browser.selection(), items.first().cloned());
    }

    #[test]
    fn test_selection_survives_reload_when_present() {
        let (tree, browser) = setup();
        let frame = tree
            .insert_child("root", Arc::new(Widget::new(ElementKind::Frame)))
            .unwrap();
        assert!(browser.select("relief"));

        tree.select(&frame).unwrap();
        assert_eq!(browser.selection().as_deref(), Some("relief"));

        // Buttons have no relief; fall back to the first row.
        let button = tree
            .insert_child(&frame, Arc::new(Widget::new(ElementKind::Button)))
            .unwrap();
        tree.select(&button).unwrap();
        assert_eq!(browser.selection().as_deref(), Some("command"));
    }

    #[test]
    fn test_root_selection_shows_nothing() {
        let (tree, browser) = setup();
        tree.select(ROOT_ID).unwrap();
        assert!(browser.items().is_empty());
        assert_eq!(browser.selection(), None);
        assert!(!browser.set("title", "x"));
    }

    #[test]
    fn test_set_writes_element_and_display() {
        let (tree, browser) = setup();
        assert!(browser.set("title", "Main"));
        assert_eq!(browser.get("title").as_deref(), Some("Main"));

        let element = tree.content("root").unwrap().unwrap();
        assert_eq!(element.get("title").as_deref(), Some("Main"));
        assert_eq!(
            tree.document().attributes("root").unwrap().get("title").map(String::as_str),
            Some("Main")
        );
    }

    #[test]
    fn test_rejected_set_leaves_display() {
        let (_tree, browser) = setup();
        assert!(!browser.set("width", "wide"));
        assert_eq!(browser.get("width").as_deref(), Some("0"));
        assert!(!browser.set("nonexistent", "1"));
    }

    #[test]
    fn test_unchanged_value_is_accepted() {
        let (_tree, browser) = setup();
        assert!(browser.set("relief", "flat"));
        assert_eq!(browser.get("relief").as_deref(), Some("flat"));
    }
}
