//! Integration tests for the shared document store and its notifications.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use steelmoth_core::{
    AttributeRejected, DocumentChange, Element, ElementHandle, InsertIndex, Observable, Observer,
    SharedDocument, StoreError, ROOT_ID,
};

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("steelmoth_core=trace")
        .with_test_writer()
        .try_init();
}

/// An element that records every destroy call in a shared journal.
struct Tracked {
    name: String,
    destroyed: AtomicUsize,
    journal: Arc<Mutex<Vec<String>>>,
}

impl Tracked {
    fn new(name: &str, journal: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            destroyed: AtomicUsize::new(0),
            journal: journal.clone(),
        })
    }
}

impl Element for Tracked {
    fn kind(&self) -> &str {
        "tracked"
    }

    fn destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().push(self.name.clone());
    }

    fn attribute_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn get(&self, _name: &str) -> Option<String> {
        None
    }

    fn set(&self, name: &str, value: &str) -> Result<(), AttributeRejected> {
        Err(AttributeRejected::new(name, value, "no attributes"))
    }
}

/// Counts notifications and captures the change visible at each one.
struct ChangeLog {
    document: Weak<SharedDocument>,
    seen: Mutex<Vec<Option<DocumentChange>>>,
}

impl Observer for ChangeLog {
    fn update(&self) {
        if let Some(document) = self.document.upgrade() {
            self.seen.lock().push(document.last_change());
        }
    }
}

fn handle(element: &Arc<Tracked>) -> Option<ElementHandle> {
    Some(element.clone())
}

#[test]
fn deleting_parent_destroys_descendants_once_children_first() {
    setup();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let document = SharedDocument::new();

    let p = Tracked::new("P", &journal);
    let x = Tracked::new("X", &journal);
    let y = Tracked::new("Y", &journal);
    let z = Tracked::new("Z", &journal);

    document.insert(ROOT_ID, InsertIndex::Append, "P", handle(&p)).unwrap();
    document.insert("P", InsertIndex::Append, "X", handle(&x)).unwrap();
    document.insert("X", InsertIndex::Append, "Z", handle(&z)).unwrap();
    document.insert("P", InsertIndex::Append, "Y", handle(&y)).unwrap();

    document.delete("P").unwrap();

    for element in [&p, &x, &y, &z] {
        assert_eq!(element.destroyed.load(Ordering::SeqCst), 1, "{}", element.name);
    }
    assert_eq!(*journal.lock(), vec!["Z", "X", "Y", "P"]);
    for id in ["P", "X", "Y", "Z"] {
        assert!(!document.contains(id));
    }
    assert!(document.children(ROOT_ID).unwrap().is_empty());
    assert!(document.is_empty());
}

#[test]
fn delete_notifies_once_for_the_top_level_id() {
    setup();
    let document = Arc::new(SharedDocument::new());
    let log = Arc::new(ChangeLog {
        document: Arc::downgrade(&document),
        seen: Mutex::new(Vec::new()),
    });

    document.insert(ROOT_ID, InsertIndex::Append, "frame1", None).unwrap();
    document.insert("frame1", InsertIndex::Append, "label1", None).unwrap();
    document.insert("frame1", InsertIndex::Append, "label2", None).unwrap();
    document.attach_observer(&log);

    document.delete("frame1").unwrap();

    let seen = log.seen.lock();
    assert_eq!(seen.len(), 1);
    match &seen[0] {
        Some(DocumentChange::Removed(removal)) => {
            assert_eq!(removal.id, "frame1");
            assert_eq!(removal.parent, ROOT_ID);
            assert_eq!(removal.removed, vec!["label1", "label2", "frame1"]);
        }
        other => panic!("unexpected change: {other:?}"),
    }
}

#[test]
fn observers_see_completed_inserts() {
    setup();
    let document = Arc::new(SharedDocument::new());
    let log = Arc::new(ChangeLog {
        document: Arc::downgrade(&document),
        seen: Mutex::new(Vec::new()),
    });
    document.attach_observer(&log);

    document.insert(ROOT_ID, InsertIndex::Append, "frame1", None).unwrap();

    assert_eq!(
        *log.seen.lock(),
        vec![Some(DocumentChange::Inserted {
            id: "frame1".into(),
            parent: ROOT_ID.into(),
        })]
    );
}

#[test]
fn failed_mutations_do_not_notify_or_mutate() {
    setup();
    let document = Arc::new(SharedDocument::new());
    let log = Arc::new(ChangeLog {
        document: Arc::downgrade(&document),
        seen: Mutex::new(Vec::new()),
    });
    document.insert(ROOT_ID, InsertIndex::Append, "a", None).unwrap();
    document.attach_observer(&log);

    assert_eq!(
        document.insert(ROOT_ID, InsertIndex::Append, "a", None).unwrap_err(),
        StoreError::DuplicateKey("a".into())
    );
    assert_eq!(
        document.delete("ghost").unwrap_err(),
        StoreError::UnknownKey("ghost".into())
    );
    assert_eq!(document.delete(ROOT_ID).unwrap_err(), StoreError::RootDeletion);

    assert!(log.seen.lock().is_empty());
    assert_eq!(document.len(), 2);
    assert_eq!(document.children(ROOT_ID).unwrap(), vec!["a"]);
}

#[test]
fn placeholder_records_without_content_delete_cleanly() {
    setup();
    let document = SharedDocument::new();
    document.insert(ROOT_ID, InsertIndex::Append, "singleiid", None).unwrap();

    let record = document.record("singleiid").unwrap();
    assert!(record.content.is_none());
    assert!(record.children.is_empty());
    assert!(record.attributes.is_empty());

    document.delete("singleiid").unwrap();
    assert_eq!(document.len(), 1);
}
