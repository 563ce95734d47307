//! The capability interface for displayable elements.
//!
//! The core never sees concrete widget types. Whatever toolkit creates the
//! elements only has to implement [`Element`]: an element can be destroyed and
//! exposes a bag of named string attributes with validated writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::AttributeRejected;

/// A displayable element owned by an external toolkit.
///
/// Implementations use interior mutability; every method takes `&self` so a
/// handle can be shared between the document store and the views.
pub trait Element: Send + Sync {
    /// Kind name, e.g. `"label"` or `"frame"`. Used to generate display ids.
    fn kind(&self) -> &str;

    /// Release the element.
    ///
    /// The document store calls this exactly once per record, when the record
    /// is deleted.
    fn destroy(&self);

    /// Names of the attributes this element exposes, in any order.
    fn attribute_names(&self) -> Vec<String>;

    /// Current value of an attribute, or `None` if the element has no such
    /// attribute.
    fn get(&self, name: &str) -> Option<String>;

    /// Write an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeRejected`] when the element does not accept the
    /// value (unknown attribute, type or format mismatch).
    fn set(&self, name: &str, value: &str) -> Result<(), AttributeRejected>;
}

/// Shared handle to an element.
pub type ElementHandle = Arc<dyn Element>;

/// Attribute names of `element` in ascending lexicographic order, without
/// duplicates.
pub fn sorted_attribute_names<E: Element + ?Sized>(element: &E) -> Vec<String> {
    let mut names = element.attribute_names();
    names.sort();
    names.dedup();
    names
}

/// Read every attribute of `element` into a sorted map.
pub fn snapshot_attributes<E: Element + ?Sized>(element: &E) -> BTreeMap<String, String> {
    sorted_attribute_names(element)
        .into_iter()
        .filter_map(|name| element.get(&name).map(|value| (name, value)))
        .collect()
}
