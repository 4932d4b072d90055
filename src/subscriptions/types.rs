//! Subscription types: handlers, stored subscriptions, unsubscribe tokens.

use crate::error::Result;
use crate::types::{Context, SubscriptionId};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Closure type behind a [`Handler`].
pub type HandlerFn<A> = dyn Fn(&Context, &A) -> Result<()> + Send + Sync;

/// A shared, identity-bearing event handler.
///
/// Two handlers are the same handler when they share an allocation, which
/// is the case for clones of one `Handler`. Keep a clone around to pass to
/// `off` later.
pub struct Handler<A: ?Sized = [Value]>(Arc<HandlerFn<A>>);

impl<A: ?Sized> Handler<A> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context, &A) -> Result<()> + Send + Sync + 'static,
    {
        Handler(Arc::new(f))
    }

    /// Invoke the handler with `context` as its receiver.
    pub fn call(&self, context: &Context, args: &A) -> Result<()> {
        (self.0)(context, args)
    }

    /// Whether `self` and `other` are the same handler.
    pub fn same(&self, other: &Handler<A>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl<A: ?Sized> Clone for Handler<A> {
    fn clone(&self) -> Self {
        Handler(Arc::clone(&self.0))
    }
}

impl<A: ?Sized> PartialEq for Handler<A> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<A: ?Sized> Eq for Handler<A> {}

impl<A: ?Sized> fmt::Debug for Handler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Arc::as_ptr(&self.0))
    }
}

/// How long a subscription lives.
#[derive(Clone, Debug)]
pub(crate) enum SubscriptionKind {
    /// Stays registered until removed.
    Persistent,
    /// Removes itself on first dispatch. `fired` is shared by every
    /// snapshot of the subscription so it runs at most once.
    Once { fired: Arc<AtomicBool> },
}

impl SubscriptionKind {
    pub fn once() -> Self {
        SubscriptionKind::Once {
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_once(&self) -> bool {
        matches!(self, SubscriptionKind::Once { .. })
    }

    /// Claim the single invocation of a one-shot subscription.
    ///
    /// Always true for persistent subscriptions. For one-shot ones, true
    /// exactly once across all clones.
    pub fn claim(&self) -> bool {
        match self {
            SubscriptionKind::Persistent => true,
            SubscriptionKind::Once { fired } => !fired.swap(true, Ordering::SeqCst),
        }
    }
}

/// A stored (handler, context) pair for one event name.
///
/// The handler is always the caller's original handler, also for one-shot
/// subscriptions, so `off` can match either kind with the same reference.
pub(crate) struct Subscription<A: ?Sized> {
    pub id: SubscriptionId,
    pub handler: Handler<A>,
    pub context: Context,
    pub kind: SubscriptionKind,
}

impl<A: ?Sized> Subscription<A> {
    /// Check if this subscription matches an `off` request.
    pub fn matches(&self, handler: &Handler<A>, context: &Context) -> bool {
        self.context == *context && self.handler.same(handler)
    }
}

impl<A: ?Sized> Clone for Subscription<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: self.handler.clone(),
            context: self.context.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<A: ?Sized> fmt::Debug for Subscription<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("handler", &self.handler)
            .field("context", &self.context)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Token returned by `on` and `once` that removes the subscription it was
/// created for.
///
/// Calling [`Unsubscribe::unsubscribe`] more than once is a no-op, as is
/// calling it after the emitter has been dropped.
#[derive(Clone)]
pub struct Unsubscribe {
    remove: Arc<dyn Fn() + Send + Sync>,
}

impl Unsubscribe {
    pub(crate) fn new(remove: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            remove: Arc::new(remove),
        }
    }

    pub fn unsubscribe(&self) {
        (self.remove)()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").finish_non_exhaustive()
    }
}
