//! Subscription registry for named events.
//!
//! This module holds the bookkeeping behind the emitter:
//! - Handlers with reference identity
//! - Persistent and one-shot subscriptions bound to a context
//! - Per-name ordered storage with empty names removed eagerly
//! - Unsubscribe tokens
//!
//! # Example
//!
//! ```ignore
//! let registry: Registry<[Value]> = Registry::new();
//! let handler = Handler::new(|_ctx: &Context, args: &[Value]| {
//!     println!("got {:?}", args);
//!     Ok(())
//! });
//!
//! registry.insert("message", handler.clone(), Context::None, SubscriptionKind::Persistent);
//! for sub in registry.snapshot("message") {
//!     sub.handler.call(&sub.context, &[json!("hi")])?;
//! }
//! registry.remove_matching("message", &handler, &Context::None);
//! ```
//!
//! The registry and stored subscriptions are internal to the crate; only
//! handlers and tokens are reachable from outside:
//!
//! ```compile_fail
//! use herald::subscriptions::{Registry, SubscriptionKind};
//! ```

mod registry;
mod types;

pub(crate) use registry::Registry;
pub(crate) use types::{Subscription, SubscriptionKind};
pub use types::{Handler, HandlerFn, Unsubscribe};
