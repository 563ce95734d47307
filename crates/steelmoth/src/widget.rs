//! Element kinds, their attribute schemas and the headless widget.
//!
//! A builder never talks to a toolkit directly. It asks an
//! [`ElementFactory`] for an [`ElementHandle`] of some [`ElementKind`] and
//! then only uses the [`Element`] capability interface. [`HeadlessFactory`]
//! produces [`Widget`]s that validate attribute writes against the kind's
//! schema without displaying anything.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use steelmoth_core::{AttributeRejected, Element, ElementHandle};

use crate::logging::targets;

/// The element kinds a builder can insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Frame,
    Label,
    Button,
    Checkbutton,
    Radiobutton,
    Entry,
    Combobox,
    Toplevel,
}

impl ElementKind {
    /// Every kind, in menu order.
    pub const ALL: [ElementKind; 8] = [
        ElementKind::Frame,
        ElementKind::Label,
        ElementKind::Button,
        ElementKind::Checkbutton,
        ElementKind::Radiobutton,
        ElementKind::Entry,
        ElementKind::Combobox,
        ElementKind::Toplevel,
    ];

    /// Lowercase kind name, also used as the prefix of generated ids.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Frame => "frame",
            ElementKind::Label => "label",
            ElementKind::Button => "button",
            ElementKind::Checkbutton => "checkbutton",
            ElementKind::Radiobutton => "radiobutton",
            ElementKind::Entry => "entry",
            ElementKind::Combobox => "combobox",
            ElementKind::Toplevel => "toplevel",
        }
    }

    /// Whether the kind displays a `text` attribute.
    pub fn has_text(self) -> bool {
        matches!(
            self,
            ElementKind::Label
                | ElementKind::Button
                | ElementKind::Checkbutton
                | ElementKind::Radiobutton
        )
    }

    /// Whether elements of this kind may hold children.
    pub fn is_container(self) -> bool {
        matches!(self, ElementKind::Frame | ElementKind::Toplevel)
    }

    /// The attributes this kind accepts.
    pub fn schema(self) -> &'static [AttributeSpec] {
        match self {
            ElementKind::Frame => FRAME,
            ElementKind::Label => LABEL,
            ElementKind::Button => BUTTON,
            ElementKind::Checkbutton => CHECKBUTTON,
            ElementKind::Radiobutton => RADIOBUTTON,
            ElementKind::Entry => ENTRY,
            ElementKind::Combobox => COMBOBOX,
            ElementKind::Toplevel => TOPLEVEL,
        }
    }

    /// Look up one attribute of this kind's schema.
    pub fn attribute(self, name: &str) -> Option<&'static AttributeSpec> {
        self.schema().iter().find(|spec| spec.name == name)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown element kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ElementKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// How an attribute value is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Any string.
    Text,
    /// A signed integer, or empty for the toolkit default.
    Integer,
    /// A non-negative screen distance in pixels, or empty.
    Pixels,
    /// One of a fixed set of words.
    Choice(&'static [&'static str]),
}

impl ValueKind {
    /// Check a candidate value, returning the reason on rejection.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            ValueKind::Text => Ok(()),
            ValueKind::Integer => {
                if value.is_empty() || value.trim().parse::<i64>().is_ok() {
                    Ok(())
                } else {
                    Err(format!("expected integer but got \"{value}\""))
                }
            }
            ValueKind::Pixels => match value.trim().parse::<i64>() {
                _ if value.is_empty() => Ok(()),
                Ok(n) if n >= 0 => Ok(()),
                Ok(_) => Err(format!("screen distance \"{value}\" must not be negative")),
                Err(_) => Err(format!("bad screen distance \"{value}\"")),
            },
            ValueKind::Choice(options) => {
                if options.iter().any(|option| *option == value) {
                    Ok(())
                } else {
                    Err(format!(
                        "bad value \"{value}\": must be one of {}",
                        options.join(", ")
                    ))
                }
            }
        }
    }
}

/// One entry of a kind's attribute schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub default: &'static str,
}

const fn spec(name: &'static str, kind: ValueKind, default: &'static str) -> AttributeSpec {
    AttributeSpec {
        name,
        kind,
        default,
    }
}

const RELIEFS: &[&str] = &["flat", "raised", "sunken", "groove", "ridge", "solid"];
const JUSTIFY: &[&str] = &["left", "center", "right"];
const ANCHORS: &[&str] = &["", "n", "ne", "e", "se", "s", "sw", "w", "nw", "center"];
const COMPOUND: &[&str] = &[
    "", "none", "text", "image", "center", "top", "bottom", "left", "right",
];
const STATES: &[&str] = &["normal", "disabled", "readonly"];

const FRAME: &[AttributeSpec] = &[
    spec("borderwidth", ValueKind::Pixels, "0"),
    spec("cursor", ValueKind::Text, ""),
    spec("height", ValueKind::Pixels, "0"),
    spec("padding", ValueKind::Text, ""),
    spec("relief", ValueKind::Choice(RELIEFS), "flat"),
    spec("style", ValueKind::Text, ""),
    spec("width", ValueKind::Pixels, "0"),
];

const LABEL: &[AttributeSpec] = &[
    spec("anchor", ValueKind::Choice(ANCHORS), ""),
    spec("compound", ValueKind::Choice(COMPOUND), ""),
    spec("cursor", ValueKind::Text, ""),
    spec("justify", ValueKind::Choice(JUSTIFY), "left"),
    spec("padding", ValueKind::Text, ""),
    spec("relief", ValueKind::Choice(RELIEFS), "flat"),
    spec("style", ValueKind::Text, ""),
    spec("text", ValueKind::Text, ""),
    spec("width", ValueKind::Integer, ""),
    spec("wraplength", ValueKind::Pixels, ""),
];

const BUTTON: &[AttributeSpec] = &[
    spec("command", ValueKind::Text, ""),
    spec("compound", ValueKind::Choice(COMPOUND), ""),
    spec("cursor", ValueKind::Text, ""),
    spec("default", ValueKind::Choice(&["normal", "active", "disabled"]), "normal"),
    spec("padding", ValueKind::Text, ""),
    spec("style", ValueKind::Text, ""),
    spec("text", ValueKind::Text, ""),
    spec("width", ValueKind::Integer, ""),
];

const CHECKBUTTON: &[AttributeSpec] = &[
    spec("command", ValueKind::Text, ""),
    spec("compound", ValueKind::Choice(COMPOUND), ""),
    spec("cursor", ValueKind::Text, ""),
    spec("offvalue", ValueKind::Text, "0"),
    spec("onvalue", ValueKind::Text, "1"),
    spec("style", ValueKind::Text, ""),
    spec("text", ValueKind::Text, ""),
    spec("variable", ValueKind::Text, ""),
    spec("width", ValueKind::Integer, ""),
];

const RADIOBUTTON: &[AttributeSpec] = &[
    spec("command", ValueKind::Text, ""),
    spec("compound", ValueKind::Choice(COMPOUND), ""),
    spec("cursor", ValueKind::Text, ""),
    spec("style", ValueKind::Text, ""),
    spec("text", ValueKind::Text, ""),
    spec("value", ValueKind::Text, ""),
    spec("variable", ValueKind::Text, ""),
    spec("width", ValueKind::Integer, ""),
];

const ENTRY: &[AttributeSpec] = &[
    spec("cursor", ValueKind::Text, ""),
    spec("exportselection", ValueKind::Choice(&["0", "1"]), "1"),
    spec("justify", ValueKind::Choice(JUSTIFY), "left"),
    spec("show", ValueKind::Text, ""),
    spec("state", ValueKind::Choice(STATES), "normal"),
    spec("style", ValueKind::Text, ""),
    spec("textvariable", ValueKind::Text, ""),
    spec("width", ValueKind::Integer, "20"),
];

const COMBOBOX: &[AttributeSpec] = &[
    spec("cursor", ValueKind::Text, ""),
    spec("height", ValueKind::Pixels, "10"),
    spec("justify", ValueKind::Choice(JUSTIFY), "left"),
    spec("state", ValueKind::Choice(STATES), "normal"),
    spec("style", ValueKind::Text, ""),
    spec("textvariable", ValueKind::Text, ""),
    spec("values", ValueKind::Text, ""),
    spec("width", ValueKind::Integer, "20"),
];

const TOPLEVEL: &[AttributeSpec] = &[
    spec("background", ValueKind::Text, ""),
    spec("borderwidth", ValueKind::Pixels, "0"),
    spec("height", ValueKind::Pixels, "0"),
    spec("padx", ValueKind::Pixels, "0"),
    spec("pady", ValueKind::Pixels, "0"),
    spec("relief", ValueKind::Choice(RELIEFS), "flat"),
    spec("title", ValueKind::Text, ""),
    spec("width", ValueKind::Pixels, "0"),
];

/// A headless element that stores schema-validated attribute values.
pub struct Widget {
    kind: ElementKind,
    values: Mutex<BTreeMap<&'static str, String>>,
    destroyed: AtomicBool,
}

impl Widget {
    /// Create a widget with every attribute at its schema default.
    pub fn new(kind: ElementKind) -> Self {
        let values = kind
            .schema()
            .iter()
            .map(|spec| (spec.name, spec.default.to_string()))
            .collect();
        Self {
            kind,
            values: Mutex::new(values),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn element_kind(&self) -> ElementKind {
        self.kind
    }

    /// Whether [`Element::destroy`] has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("kind", &self.kind)
            .field("values", &*self.values.lock())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl Element for Widget {
    fn kind(&self) -> &str {
        self.kind.name()
    }

    fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            tracing::warn!(target: targets::WIDGET, kind = %self.kind, "widget destroyed twice");
        }
    }

    fn attribute_names(&self) -> Vec<String> {
        self.kind
            .schema()
            .iter()
            .map(|spec| spec.name.to_string())
            .collect()
    }

    fn get(&self, name: &str) -> Option<String> {
        self.values.lock().get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<(), AttributeRejected> {
        let Some(spec) = self.kind.attribute(name) else {
            return Err(AttributeRejected::new(
                name,
                value,
                format!("unknown option for {}", self.kind),
            ));
        };
        if self.is_destroyed() {
            return Err(AttributeRejected::new(name, value, "element has been destroyed"));
        }
        spec.kind
            .validate(value)
            .map_err(|reason| AttributeRejected::new(name, value, reason))?;
        self.values.lock().insert(spec.name, value.to_string());
        Ok(())
    }
}

/// Creates displayable elements for the builder.
///
/// A toolkit binding implements this to create real widgets under `parent`.
pub trait ElementFactory: Send + Sync {
    fn create(&self, kind: ElementKind, parent: Option<&ElementHandle>) -> ElementHandle;
}

/// Factory producing [`Widget`]s; nothing is displayed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessFactory;

impl ElementFactory for HeadlessFactory {
    fn create(&self, kind: ElementKind, _parent: Option<&ElementHandle>) -> ElementHandle {
        Arc::new(Widget::new(kind))
    }
}

// Ensure Widget is Send + Sync
static_assertions::assert_impl_all!(Widget: Send, Sync);
