//! End-to-end tests of a builder session: store, tree, browser and editors.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use steelmoth::steelmoth_core::{
    AttributeRejected, Element, ElementHandle, InsertIndex, Observable, Observer, SharedDocument,
    ROOT_ID,
};
use steelmoth::{
    AttributeBrowser, BuilderConfig, CommandOutcome, DeleteElement, ElementFactory, ElementKind,
    ElementTree, InsertElement, SetToplevelTitle, Validity, ValueEditor, Widget, Workbench,
};

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("steelmoth=trace,steelmoth_core=debug")
        .with_test_writer()
        .try_init();
}

/// A label-like element with a fixed attribute set. `width` must be numeric.
struct Stub {
    values: parking_lot::Mutex<Vec<(String, String)>>,
}

impl Stub {
    fn with(values: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            values: parking_lot::Mutex::new(
                values
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            ),
        })
    }

    fn new(text: &str) -> Arc<Self> {
        Self::with(&[("width", "0"), ("text", text), ("align", "left")])
    }
}

impl Element for Stub {
    fn kind(&self) -> &str {
        "stub"
    }

    fn destroy(&self) {}

    fn attribute_names(&self) -> Vec<String> {
        self.values.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    fn get(&self, name: &str) -> Option<String> {
        self.values
            .lock()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.clone())
    }

    fn set(&self, name: &str, value: &str) -> Result<(), AttributeRejected> {
        if name == "width" && value.parse::<u32>().is_err() {
            return Err(AttributeRejected::new(name, value, "expected integer"));
        }
        let mut values = self.values.lock();
        match values.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => {
                *slot = value.to_string();
                Ok(())
            }
            None => Err(AttributeRejected::new(name, value, "unknown option")),
        }
    }
}

struct Counter(AtomicUsize);

impl Observer for Counter {
    fn update(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Headless widgets that refuse writes to one attribute and count destroys.
struct Picky {
    inner: Widget,
    refused: &'static str,
    destroyed: Arc<AtomicUsize>,
}

impl Element for Picky {
    fn kind(&self) -> &str {
        self.inner.kind()
    }

    fn destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.inner.destroy();
    }

    fn attribute_names(&self) -> Vec<String> {
        self.inner.attribute_names()
    }

    fn get(&self, name: &str) -> Option<String> {
        self.inner.get(name)
    }

    fn set(&self, name: &str, value: &str) -> Result<(), AttributeRejected> {
        if name == self.refused {
            return Err(AttributeRejected::new(name, value, "read-only"));
        }
        self.inner.set(name, value)
    }
}

struct PickyFactory {
    refused: &'static str,
    created: Arc<AtomicUsize>,
    destroyed: Arc<AtomicUsize>,
}

impl PickyFactory {
    fn new(refused: &'static str) -> Self {
        Self {
            refused,
            created: Arc::new(AtomicUsize::new(0)),
            destroyed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ElementFactory for PickyFactory {
    fn create(&self, kind: ElementKind, _parent: Option<&ElementHandle>) -> ElementHandle {
        self.created.fetch_add(1, Ordering::SeqCst);
        Arc::new(Picky {
            inner: Widget::new(kind),
            refused: self.refused,
            destroyed: self.destroyed.clone(),
        })
    }
}

#[test]
fn attribute_edits_flow_from_editor_to_element() {
    setup();
    let document = Arc::new(SharedDocument::new());
    let tree = ElementTree::new(document.clone());
    let browser = AttributeBrowser::new(&tree);
    let editor = ValueEditor::bind(&browser);

    let label = Stub::new("hi");
    document.insert(ROOT_ID, InsertIndex::Append, "frame1", None).unwrap();
    document
        .insert("frame1", InsertIndex::Append, "label1", Some(label.clone()))
        .unwrap();

    tree.select("label1").unwrap();
    assert_eq!(browser.items(), vec!["align", "text", "width"]);
    assert_eq!(browser.selection().as_deref(), Some("align"));

    assert!(browser.select("text"));
    assert_eq!(editor.text(), "hi");

    assert!(editor.edit("bye"));
    assert_eq!(label.get("text").as_deref(), Some("bye"));
    assert_eq!(browser.get("text").as_deref(), Some("bye"));
    assert_eq!(editor.validity(), Validity::Valid);
}

#[test]
fn rejected_attribute_edit_marks_editor_invalid() {
    setup();
    let document = Arc::new(SharedDocument::new());
    let tree = ElementTree::new(document.clone());
    let browser = AttributeBrowser::new(&tree);
    let editor = ValueEditor::bind(&browser);

    let label = Stub::new("hi");
    document
        .insert(ROOT_ID, InsertIndex::Append, "label1", Some(label.clone()))
        .unwrap();
    tree.select("label1").unwrap();
    browser.select("width");

    assert!(!editor.edit("abc"));
    assert_eq!(editor.validity(), Validity::Invalid);
    assert_eq!(editor.text(), "abc");
    assert_eq!(browser.get("width").as_deref(), Some("0"));
    assert_eq!(label.get("width").as_deref(), Some("0"));
}

#[test]
fn deleting_selected_subtree_selects_parent() {
    setup();
    let bench = Workbench::new(BuilderConfig::default()).unwrap();
    let tree = bench.tree();

    bench.run(&InsertElement::new(ElementKind::Frame)).unwrap();
    tree.select("frame1").unwrap();
    bench.run(&InsertElement::new(ElementKind::Label)).unwrap();
    bench.run(&InsertElement::new(ElementKind::Button)).unwrap();
    tree.select("label1").unwrap();

    let seen = Arc::new(Counter(AtomicUsize::new(0)));
    tree.attach_observer(&seen);

    tree.delete("frame1").unwrap();

    assert_eq!(tree.selection(), "root");
    assert_eq!(seen.0.load(Ordering::SeqCst), 1);
    for id in ["frame1", "label1", "button1"] {
        assert!(!bench.document().contains(id), "{id} still present");
    }
    assert_eq!(bench.label_editor().text(), "root");
    assert_eq!(bench.browser().record_id().as_deref(), Some("root"));
}

#[test]
fn label_editor_renames_rows_without_touching_elements() {
    setup();
    let bench = Workbench::new(BuilderConfig::default()).unwrap();
    bench.run(&InsertElement::new(ElementKind::Label)).unwrap();
    bench.tree().select("label1").unwrap();

    assert_eq!(bench.label_editor().text(), "label1");
    assert!(bench.label_editor().edit("Greeting"));

    assert_eq!(bench.tree().label("label1").unwrap(), "Greeting");
    let element = bench.tree().content("label1").unwrap().unwrap();
    assert_eq!(element.get("text").as_deref(), Some("label1"));
}

#[test]
fn commands_follow_selection() {
    setup();
    let bench = Workbench::new(BuilderConfig::default()).unwrap();

    let retitle = SetToplevelTitle::new("Preferences");
    assert!(bench.is_enabled(&retitle));
    assert_eq!(
        bench.run(&retitle).unwrap(),
        CommandOutcome::Retitled {
            id: "root".into(),
            title: "Preferences".into(),
        }
    );

    let outcome = bench.run(&InsertElement::new(ElementKind::Entry)).unwrap();
    assert_eq!(outcome, CommandOutcome::Inserted("entry1".into()));
    bench.tree().select("entry1").unwrap();
    assert!(!bench.is_enabled(&retitle));
    assert!(!bench.is_enabled(&InsertElement::new(ElementKind::Label)));

    let outcome = bench.run(&DeleteElement).unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Deleted {
            id: "entry1".into(),
            selection: "root".into(),
        }
    );
}

#[test]
fn dropping_the_workbench_releases_every_view() {
    setup();
    let bench = Workbench::new(BuilderConfig::default()).unwrap();
    let tree = Arc::downgrade(bench.tree());
    let browser = Arc::downgrade(bench.browser());
    let editor = Arc::downgrade(bench.attribute_editor());

    drop(bench);
    assert!(tree.upgrade().is_none());
    assert!(browser.upgrade().is_none());
    assert!(editor.upgrade().is_none());
}

#[test]
fn single_text_attribute_scenario() {
    setup();
    let document = Arc::new(SharedDocument::new());
    let tree = ElementTree::new(document.clone());
    let browser = AttributeBrowser::new(&tree);
    let editor = ValueEditor::bind(&browser);

    let label = Stub::with(&[("text", "hi")]);
    document.insert(ROOT_ID, InsertIndex::Append, "frame1", None).unwrap();
    document
        .insert("frame1", InsertIndex::Append, "label1", Some(label.clone()))
        .unwrap();

    tree.select("label1").unwrap();
    assert_eq!(browser.items(), vec!["text"]);
    assert_eq!(browser.selection().as_deref(), Some("text"));
    assert_eq!(editor.text(), "hi");

    assert!(editor.edit("bye"));
    assert_eq!(editor.text(), "bye");
    assert_eq!(browser.get("text").as_deref(), Some("bye"));
    assert_eq!(label.get("text").as_deref(), Some("bye"));
}

#[test]
fn failed_insert_destroys_the_new_element() {
    setup();
    let factory = PickyFactory::new("text");
    let created = factory.created.clone();
    let destroyed = factory.destroyed.clone();
    let bench = Workbench::with_factory(BuilderConfig::default(), Box::new(factory)).unwrap();
    assert_eq!(created.load(Ordering::SeqCst), 1);

    assert!(bench.run(&InsertElement::new(ElementKind::Label)).is_err());
    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    assert!(!bench.document().contains("label1"));

    // Kinds without text are unaffected.
    bench.run(&InsertElement::new(ElementKind::Frame)).unwrap();
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    assert!(bench.document().contains("frame1"));
}

#[test]
fn failed_seeding_destroys_the_root_element() {
    setup();
    let factory = PickyFactory::new("title");
    let created = factory.created.clone();
    let destroyed = factory.destroyed.clone();

    let result = Workbench::with_factory(BuilderConfig::default(), Box::new(factory));
    assert!(result.is_err());
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(destroyed.load(Ordering::SeqCst), 1);
}
