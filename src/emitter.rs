//! Synchronous named-event emitter.

use crate::error::Result;
use crate::subscriptions::{Handler, Registry, Subscription, SubscriptionKind, Unsubscribe};
use crate::types::{Context, SubscriptionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// How `emit` treats subscriptions added or removed while it is dispatching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Dispatch over a copy taken when `emit` starts. Subscriptions added
    /// during dispatch wait for the next emit; subscriptions removed during
    /// dispatch still run this round unless they are one-shot and already
    /// fired.
    #[default]
    Snapshot,
    /// Walk the live sequence. Removing a subscription that has not run yet
    /// skips it; subscriptions added during dispatch run in the same round.
    Live,
}

/// Configuration for an emitter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Mutation-during-dispatch policy.
    /// Default: Snapshot
    pub dispatch: DispatchPolicy,

    /// Log a warning when a single name collects more subscriptions than
    /// this (None = never warn).
    pub max_listeners: Option<usize>,
}

/// Registry of named-event handlers with synchronous dispatch.
///
/// `A` is the argument payload handed to every handler. It defaults to a
/// slice of JSON values so arbitrary argument lists can be forwarded.
///
/// All methods take `&self`. Internal state is never locked while a handler
/// runs, so handlers may subscribe, unsubscribe and emit re-entrantly.
pub struct Emitter<A: ?Sized + 'static = [Value]> {
    registry: Arc<Registry<A>>,
    config: EmitterConfig,
}

impl<A: ?Sized + 'static> Emitter<A> {
    /// Create an emitter with default configuration.
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Create an emitter with the given configuration.
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            config,
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    // --- Subscribing ---

    /// Subscribe `handler` to `name`, bound to `context`.
    ///
    /// The returned token performs `off(name, handler, context)` with the
    /// values captured here.
    pub fn on(&self, name: &str, handler: Handler<A>, context: Context) -> Unsubscribe {
        let id = self.subscribe(name, handler.clone(), context.clone(), SubscriptionKind::Persistent);
        trace!(event = name, %id, "subscribed");

        let registry = Arc::downgrade(&self.registry);
        let name = name.to_string();
        Unsubscribe::new(move || {
            if let Some(registry) = registry.upgrade() {
                if let Some(id) = registry.remove_matching(&name, &handler, &context) {
                    trace!(event = %name, %id, "unsubscribed by token");
                }
            }
        })
    }

    /// Subscribe a closure to `name` with no context.
    pub fn on_fn<F>(&self, name: &str, f: F) -> Unsubscribe
    where
        F: Fn(&Context, &A) -> Result<()> + Send + Sync + 'static,
    {
        self.on(name, Handler::new(f), Context::None)
    }

    /// Subscribe `handler` to `name` for a single dispatch.
    ///
    /// The subscription removes itself before the handler runs. It can be
    /// removed earlier through the token or through `off` with the same
    /// `handler` and `context`.
    pub fn once(&self, name: &str, handler: Handler<A>, context: Context) -> Unsubscribe {
        let id = self.subscribe(name, handler, context, SubscriptionKind::once());
        trace!(event = name, %id, "subscribed once");

        Self::remove_token(Arc::downgrade(&self.registry), name.to_string(), id)
    }

    fn subscribe(
        &self,
        name: &str,
        handler: Handler<A>,
        context: Context,
        kind: SubscriptionKind,
    ) -> SubscriptionId {
        let (id, count) = self.registry.insert(name, handler, context, kind);

        if let Some(max) = self.config.max_listeners {
            if count > max {
                warn!(
                    event = name,
                    count, max, "listener count exceeds max_listeners; possible leak"
                );
            }
        }

        id
    }

    fn remove_token(registry: Weak<Registry<A>>, name: String, id: SubscriptionId) -> Unsubscribe {
        Unsubscribe::new(move || {
            if let Some(registry) = registry.upgrade() {
                if registry.remove_by_id(&name, id) {
                    trace!(event = %name, %id, "unsubscribed by token");
                }
            }
        })
    }

    // --- Unsubscribing ---

    /// Remove the first subscription for `name` whose handler is `handler`
    /// and whose context equals `context`.
    ///
    /// Does nothing if there is no such subscription.
    pub fn off(&self, name: &str, handler: &Handler<A>, context: &Context) {
        if let Some(id) = self.registry.remove_matching(name, handler, context) {
            trace!(event = name, %id, "unsubscribed");
        }
    }

    /// Remove every subscription for `name`.
    pub fn clear(&self, name: &str) {
        let removed = self.registry.clear(name);
        if removed > 0 {
            debug!(event = name, removed, "cleared subscriptions");
        }
    }

    /// Remove every subscription for every name.
    pub fn clear_all(&self) {
        self.registry.clear_all();
        debug!("cleared all subscriptions");
    }

    // --- Dispatch ---

    /// Invoke every subscription for `name`, in registration order.
    ///
    /// A handler error stops dispatch and is returned as-is; the remaining
    /// handlers do not run for this emit. Emitting a name nobody listens to
    /// is a no-op.
    pub fn emit(&self, name: &str, args: &A) -> Result<()> {
        match self.config.dispatch {
            DispatchPolicy::Snapshot => {
                let subs = self.registry.snapshot(name);
                trace!(event = name, subscribers = subs.len(), "emit");
                for sub in &subs {
                    self.invoke(name, sub, args)?;
                }
            }
            DispatchPolicy::Live => {
                trace!(event = name, "emit");
                let mut last = None;
                while let Some(sub) = self.registry.next_after(name, last) {
                    last = Some(sub.id);
                    self.invoke(name, &sub, args)?;
                }
            }
        }

        Ok(())
    }

    fn invoke(&self, name: &str, sub: &Subscription<A>, args: &A) -> Result<()> {
        if !sub.kind.claim() {
            return Ok(());
        }

        if sub.kind.is_once() {
            self.registry.remove_by_id(name, sub.id);
            debug!(event = name, id = %sub.id, "once subscription removed before dispatch");
        }

        sub.handler.call(&sub.context, args)
    }

    // --- Introspection ---

    /// Number of subscriptions currently registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.registry.len(name)
    }

    pub fn has_listeners(&self, name: &str) -> bool {
        self.listener_count(name) > 0
    }

    /// Whether no name has any subscription.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Names with at least one subscription, sorted.
    pub fn event_names(&self) -> Vec<String> {
        self.registry.names()
    }
}

impl<A: ?Sized + 'static> Default for Emitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized + 'static> fmt::Debug for Emitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("config", &self.config)
            .field("events", &self.registry.names())
            .finish()
    }
}
