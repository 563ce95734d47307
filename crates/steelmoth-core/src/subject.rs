//! Subject/observer notification for Steel Moth.
//!
//! This module provides the one-to-many notification channel that every
//! stateful view is built on. A [`Subject`] keeps an ordered list of
//! non-owning observer references; calling [`Subject::notify`] invokes
//! [`Observer::update`] on each live observer in attachment order.
//!
//! # Key Types
//!
//! - [`Subject`] - The notification channel embedded in stores and views
//! - [`Observer`] - The refresh callback implemented by dependent views
//! - [`ObserverId`] - Identity returned by [`Subject::attach`], used to detach
//! - [`Observable`] - Forwarding trait for types that embed a `Subject`
//!
//! # Ownership
//!
//! A subject never owns its observers. Observers are held as [`Weak`]
//! references and pruned once they are dropped, so a view chain can never
//! form an ownership cycle through its notification links.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use steelmoth_core::{Observer, Subject};
//!
//! struct Counter(AtomicUsize);
//!
//! impl Observer for Counter {
//!     fn update(&self) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let subject = Subject::new();
//! let counter = Arc::new(Counter(AtomicUsize::new(0)));
//! let id = subject.attach_observer(&counter);
//!
//! subject.notify();
//! assert_eq!(counter.0.load(Ordering::SeqCst), 1);
//!
//! subject.detach(id);
//! subject.notify();
//! assert_eq!(counter.0.load(Ordering::SeqCst), 1);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Identity of one observer attachment.
    ///
    /// Returned by [`Subject::attach`] and consumed by [`Subject::detach`].
    /// Attaching the same observer twice yields two distinct ids.
    pub struct ObserverId;
}

/// A view that refreshes itself when the subject it watches notifies.
///
/// Implementations pull whatever state they need from their upstream source;
/// the notification itself carries no payload.
pub trait Observer: Send + Sync {
    /// Refresh from upstream state.
    fn update(&self);
}

/// Internal attachment storage.
///
/// The slot map gives stable ids; `order` preserves attachment order, which
/// slot reuse would otherwise scramble.
#[derive(Default)]
struct Attachments {
    observers: SlotMap<ObserverId, Weak<dyn Observer>>,
    order: Vec<ObserverId>,
}

/// A one-to-many notification channel.
///
/// `Subject` is `Send + Sync`. Its lock is never held while observers run, so
/// an observer may attach or detach (on this or any other subject) from
/// inside [`Observer::update`].
pub struct Subject {
    attachments: Mutex<Attachments>,
    blocked: AtomicBool,
}

impl Default for Subject {
    fn default() -> Self {
        Self::new()
    }
}

impl Subject {
    /// Create a subject with no observers.
    pub fn new() -> Self {
        Self {
            attachments: Mutex::new(Attachments::default()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Append an observer to the notification list.
    pub fn attach(&self, observer: Weak<dyn Observer>) -> ObserverId {
        let mut attachments = self.attachments.lock();
        let id = attachments.observers.insert(observer);
        attachments.order.push(id);
        tracing::trace!(target: targets::SUBJECT, ?id, count = attachments.order.len(), "observer attached");
        id
    }

    /// Attach an observer held in an `Arc` without taking ownership of it.
    pub fn attach_observer<O: Observer + 'static>(&self, observer: &Arc<O>) -> ObserverId {
        let weak: Weak<O> = Arc::downgrade(observer);
        self.attach(weak)
    }

    /// Remove an attachment by identity.
    ///
    /// Returns `true` if the attachment existed.
    pub fn detach(&self, id: ObserverId) -> bool {
        let mut attachments = self.attachments.lock();
        if attachments.observers.remove(id).is_some() {
            attachments.order.retain(|&other| other != id);
            tracing::trace!(target: targets::SUBJECT, ?id, "observer detached");
            true
        } else {
            false
        }
    }

    /// Remove every attachment.
    pub fn detach_all(&self) {
        let mut attachments = self.attachments.lock();
        attachments.observers.clear();
        attachments.order.clear();
    }

    /// Whether `id` is currently attached.
    pub fn is_attached(&self, id: ObserverId) -> bool {
        self.attachments.lock().observers.contains_key(id)
    }

    /// Number of attachments, including observers that were dropped but not
    /// yet pruned by a [`notify`](Self::notify).
    pub fn observer_count(&self) -> usize {
        self.attachments.lock().order.len()
    }

    /// Block notification temporarily.
    ///
    /// While blocked, [`notify`](Self::notify) does nothing. This is useful
    /// while seeding state that observers should only see once complete.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if notification is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Invoke [`Observer::update`] on every live observer, in attachment order.
    ///
    /// The list is snapshotted before dispatch. An observer detached by an
    /// earlier observer during the same fan-out is skipped; one attached during
    /// the fan-out is first notified on the next call. Dropped observers are
    /// pruned.
    #[tracing::instrument(skip_all, target = "steelmoth_core::subject", level = "trace")]
    pub fn notify(&self) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SUBJECT, "subject blocked, skipping notify");
            return;
        }

        let snapshot: Vec<(ObserverId, Weak<dyn Observer>)> = {
            let attachments = self.attachments.lock();
            attachments
                .order
                .iter()
                .filter_map(|&id| attachments.observers.get(id).map(|weak| (id, weak.clone())))
                .collect()
        };
        tracing::trace!(target: targets::SUBJECT, observer_count = snapshot.len(), "notifying observers");

        let mut dropped = Vec::new();
        for (id, weak) in snapshot {
            if !self.is_attached(id) {
                continue;
            }
            match weak.upgrade() {
                Some(observer) => observer.update(),
                None => dropped.push(id),
            }
        }

        if !dropped.is_empty() {
            tracing::trace!(target: targets::SUBJECT, count = dropped.len(), "pruning dropped observers");
            for id in dropped {
                self.detach(id);
            }
        }
    }
}

impl std::fmt::Debug for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("observer_count", &self.observer_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

/// A type that embeds a [`Subject`] and exposes its notification channel.
///
/// Views compose a subject instead of inheriting one; this trait forwards
/// `attach`, `detach` and `notify` to it.
pub trait Observable {
    /// The embedded subject.
    fn subject(&self) -> &Subject;

    /// Forward to [`Subject::attach`].
    fn attach(&self, observer: Weak<dyn Observer>) -> ObserverId {
        self.subject().attach(observer)
    }

    /// Forward to [`Subject::attach_observer`].
    fn attach_observer<O: Observer + 'static>(&self, observer: &Arc<O>) -> ObserverId
    where
        Self: Sized,
    {
        self.subject().attach_observer(observer)
    }

    /// Forward to [`Subject::detach`].
    fn detach(&self, id: ObserverId) -> bool {
        self.subject().detach(id)
    }

    /// Forward to [`Subject::notify`].
    fn notify(&self) {
        self.subject().notify()
    }
}
