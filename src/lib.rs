//! # Herald
//!
//! A minimal synchronous publish/subscribe primitive: handlers subscribe to
//! named events, optionally bound to a context, and `emit` invokes every
//! handler registered under a name with the emit-time arguments.
//!
//! ## Core Concepts
//!
//! - **Handlers**: Shared callables compared by identity
//! - **Context**: The receiver a handler observes when invoked
//! - **Subscriptions**: Persistent or one-shot, dispatched in registration order
//! - **Tokens**: Returned by `on`/`once`, remove exactly what they registered
//!
//! ## Example
//!
//! ```
//! use herald::{Context, Emitter, Handler};
//! use serde_json::{json, Value};
//!
//! let emitter: Emitter = Emitter::new();
//!
//! let greet: Handler = Handler::new(|ctx: &Context, args: &[Value]| {
//!     println!("{:?} says hello to {}", ctx.value(), args[0]);
//!     Ok(())
//! });
//!
//! let token = emitter.on("greet", greet.clone(), Context::from(json!("herald")));
//! emitter.emit("greet", &[json!("world")])?;
//!
//! token.unsubscribe();
//! assert!(!emitter.has_listeners("greet"));
//! # Ok::<(), herald::HandlerError>(())
//! ```

pub mod emitter;
pub mod error;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use emitter::{DispatchPolicy, Emitter, EmitterConfig};
pub use error::{HandlerError, Result};
pub use subscriptions::{Handler, HandlerFn, Unsubscribe};
pub use types::*;
