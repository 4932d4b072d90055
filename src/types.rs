//! Core types shared by the registry and the emitter.

use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a subscription.
///
/// Allocated from a monotonically increasing counter, so within one event
/// name the sequence of subscriptions is always sorted by id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The receiver a handler observes when it is invoked.
///
/// Equality decides whether `off` matches a stored subscription:
/// - `None` equals only `None`.
/// - `Value` compares by value.
/// - `Object` compares by identity of the shared allocation, so two
///   separately allocated objects with identical contents are different
///   contexts.
///
/// Different variants are never equal.
#[derive(Clone, Default)]
pub enum Context {
    #[default]
    None,
    Value(Value),
    Object(Arc<dyn Any + Send + Sync>),
}

impl Context {
    /// Allocate `value` and wrap it as an object context.
    ///
    /// Clone the returned context to pass the same identity to `off`.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Context::Object(Arc::new(value))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Context::None)
    }

    /// The JSON value, if this is a value context.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Context::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the object as `T`, if this is an object context of that type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Context::Object(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Context::None, Context::None) => true,
            (Context::Value(a), Context::Value(b)) => a == b,
            (Context::Object(a), Context::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::None => write!(f, "None"),
            Context::Value(v) => write!(f, "Value({})", v),
            Context::Object(obj) => write!(f, "Object({:p})", Arc::as_ptr(obj)),
        }
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Context::Value(value)
    }
}

impl<T: Any + Send + Sync> From<Arc<T>> for Context {
    fn from(obj: Arc<T>) -> Self {
        Context::Object(obj)
    }
}
