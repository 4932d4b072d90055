//! Integration tests for subscribing, unsubscribing and dispatch.

use herald::{Context, Emitter, Handler};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_handler() -> (Arc<AtomicUsize>, Handler) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let handler = Handler::new(move |_: &Context, _: &[Value]| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (count, handler)
}

fn recording_handler(log: &Arc<Mutex<Vec<String>>>, label: &str) -> Handler {
    let log = Arc::clone(log);
    let label = label.to_string();
    Handler::new(move |_: &Context, _: &[Value]| {
        log.lock().push(label.clone());
        Ok(())
    })
}

// --- Registration and Dispatch ---

#[test]
fn test_subscribe_and_emit() {
    let emitter: Emitter = Emitter::new();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let c = Arc::clone(&calls);
    let handler: Handler = Handler::new(move |_: &Context, args: &[Value]| {
        c.lock().push(args.to_vec());
        Ok(())
    });

    emitter.on("event", handler, Context::None);
    emitter
        .emit("event", &[json!("some argument"), json!(42)])
        .unwrap();

    assert_eq!(
        *calls.lock(),
        vec![vec![json!("some argument"), json!(42)]]
    );
}

#[test]
fn test_emit_without_subscribers() {
    let emitter: Emitter = Emitter::new();
    emitter.emit("nobody-listens", &[json!(1)]).unwrap();
    assert!(emitter.event_names().is_empty());
}

#[test]
fn test_context_binding() {
    struct Widget {
        value: &'static str,
    }

    let emitter: Emitter = Emitter::new();
    let seen = Arc::new(Mutex::new(None));

    let s = Arc::clone(&seen);
    let handler: Handler = Handler::new(move |ctx: &Context, _: &[Value]| {
        *s.lock() = ctx.downcast_ref::<Widget>().map(|w| w.value);
        Ok(())
    });

    emitter.on("event", handler, Context::object(Widget { value: "bound" }));
    emitter.emit("event", &[]).unwrap();

    assert_eq!(*seen.lock(), Some("bound"));
}

#[test]
fn test_value_context_binding() {
    let emitter: Emitter = Emitter::new();
    let seen = Arc::new(Mutex::new(None));

    let s = Arc::clone(&seen);
    let handler: Handler = Handler::new(move |ctx: &Context, _: &[Value]| {
        *s.lock() = ctx.value().cloned();
        Ok(())
    });

    emitter.on("event", handler, Context::from(json!({"value": 7})));
    emitter.emit("event", &[]).unwrap();

    assert_eq!(*seen.lock(), Some(json!({"value": 7})));
}

// --- Unsubscribing ---

#[test]
fn test_unsubscribe_via_token() {
    let emitter: Emitter = Emitter::new();
    let (count, handler) = counting_handler();

    let token = emitter.on("event", handler, Context::None);
    emitter.emit("event", &[]).unwrap();
    emitter.emit("event", &[]).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);

    token.unsubscribe();
    emitter.emit("event", &[]).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_off_with_handler_and_context() {
    let emitter: Emitter = Emitter::new();
    let (count, handler) = counting_handler();
    let ctx = Context::object(String::from("owner"));

    emitter.on("event", handler.clone(), ctx.clone());

    // Same handler, different context: no match.
    emitter.off("event", &handler, &Context::None);
    emitter.off("event", &handler, &Context::object(String::from("owner")));
    emitter.emit("event", &[]).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    emitter.off("event", &handler, &ctx);
    emitter.emit("event", &[]).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_off_removes_only_first_duplicate() {
    let emitter: Emitter = Emitter::new();
    let (count, handler) = counting_handler();

    emitter.on("event", handler.clone(), Context::None);
    emitter.on("event", handler.clone(), Context::None);

    emitter.off("event", &handler, &Context::None);
    emitter.emit("event", &[]).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(emitter.listener_count("event"), 1);
}

#[test]
fn test_token_removes_first_match_among_duplicates() {
    let emitter: Emitter = Emitter::new();
    let (_, handler) = counting_handler();

    emitter.on("event", handler.clone(), Context::None);
    let second = emitter.on("event", handler, Context::None);

    second.unsubscribe();
    assert_eq!(emitter.listener_count("event"), 1);
    second.unsubscribe();
    assert_eq!(emitter.listener_count("event"), 0);
}

#[test]
fn test_idempotent_unsubscribe() {
    let emitter: Emitter = Emitter::new();
    let (count_a, a) = counting_handler();
    let (count_b, b) = counting_handler();

    let token = emitter.on("event", a.clone(), Context::None);
    emitter.on("event", b, Context::None);

    token.unsubscribe();
    token.unsubscribe();
    emitter.off("event", &a, &Context::None);

    emitter.emit("event", &[]).unwrap();
    assert_eq!(count_a.load(Ordering::SeqCst), 0);
    assert_eq!(count_b.load(Ordering::SeqCst), 1);
}

#[test]
fn test_off_unknown_name_is_noop() {
    let emitter: Emitter = Emitter::new();
    let (_, handler) = counting_handler();

    emitter.off("never-registered", &handler, &Context::None);
    assert!(emitter.event_names().is_empty());
}

// --- Once ---

#[test]
fn test_once_fires_only_once() {
    let emitter: Emitter = Emitter::new();
    let (count, handler) = counting_handler();

    emitter.once("event", handler, Context::None);
    for _ in 0..5 {
        emitter.emit("event", &[json!("x")]).unwrap();
    }

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_once_receives_context_and_args() {
    let emitter: Emitter = Emitter::new();
    let seen = Arc::new(Mutex::new(None));

    let s = Arc::clone(&seen);
    let handler: Handler = Handler::new(move |ctx: &Context, args: &[Value]| {
        *s.lock() = Some((ctx.value().cloned(), args.to_vec()));
        Ok(())
    });

    emitter.once("event", handler, Context::from(json!("ctx")));
    emitter.emit("event", &[json!(1), json!(2)]).unwrap();

    assert_eq!(
        *seen.lock(),
        Some((Some(json!("ctx")), vec![json!(1), json!(2)]))
    );
}

#[test]
fn test_once_removable_by_original_handler() {
    let emitter: Emitter = Emitter::new();
    let (count, handler) = counting_handler();
    let ctx = Context::from(json!("ctx"));

    emitter.once("event", handler.clone(), ctx.clone());
    emitter.off("event", &handler, &ctx);
    emitter.emit("event", &[]).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!emitter.has_listeners("event"));
}

#[test]
fn test_once_removable_by_token() {
    let emitter: Emitter = Emitter::new();
    let (count, handler) = counting_handler();

    let token = emitter.once("event", handler, Context::None);
    token.unsubscribe();
    emitter.emit("event", &[]).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_once_token_leaves_persistent_duplicate() {
    let emitter: Emitter = Emitter::new();
    let (count, handler) = counting_handler();

    emitter.on("event", handler.clone(), Context::None);
    let token = emitter.once("event", handler, Context::None);

    token.unsubscribe();
    emitter.emit("event", &[]).unwrap();
    emitter.emit("event", &[]).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

// --- Ordering ---

#[test]
fn test_handlers_fire_in_registration_order() {
    let emitter: Emitter = Emitter::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    emitter.on("event", recording_handler(&log, "a"), Context::None);
    emitter.on("event", recording_handler(&log, "b"), Context::None);
    emitter.emit("event", &[]).unwrap();

    assert_eq!(*log.lock(), vec!["a", "b"]);
}

#[test]
fn test_once_keeps_its_slot() {
    let emitter: Emitter = Emitter::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    emitter.on("event", recording_handler(&log, "first"), Context::None);
    emitter.once("event", recording_handler(&log, "once"), Context::None);
    emitter.on("event", recording_handler(&log, "last"), Context::None);

    emitter.emit("event", &[]).unwrap();
    emitter.emit("event", &[]).unwrap();

    assert_eq!(
        *log.lock(),
        vec!["first", "once", "last", "first", "last"]
    );
}

#[test]
fn test_multiple_independent_subscribers() {
    let emitter: Emitter = Emitter::new();
    let (count_a, a) = counting_handler();
    let (count_b, b) = counting_handler();

    emitter.on("event", a, Context::None);
    emitter.on("event", b, Context::None);
    emitter.emit("event", &[]).unwrap();

    assert_eq!(count_a.load(Ordering::SeqCst), 1);
    assert_eq!(count_b.load(Ordering::SeqCst), 1);
}

#[test]
fn test_names_are_independent() {
    let emitter: Emitter = Emitter::new();
    let (count_a, a) = counting_handler();
    let (count_b, b) = counting_handler();

    emitter.on("a", a, Context::None);
    emitter.on("b", b, Context::None);
    emitter.emit("a", &[]).unwrap();

    assert_eq!(count_a.load(Ordering::SeqCst), 1);
    assert_eq!(count_b.load(Ordering::SeqCst), 0);
}

// --- Cleanup ---

#[test]
fn test_name_removed_after_off() {
    let emitter: Emitter = Emitter::new();
    let (count, handler) = counting_handler();

    emitter.on("event", handler.clone(), Context::None);
    emitter.off("event", &handler, &Context::None);

    assert!(emitter.event_names().is_empty());
    emitter.emit("event", &[]).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_name_removed_after_once_fires() {
    let emitter: Emitter = Emitter::new();
    let (count, handler) = counting_handler();

    emitter.once("event", handler, Context::None);
    emitter.emit("event", &[]).unwrap();

    assert!(!emitter.has_listeners("event"));
    assert!(emitter.event_names().is_empty());
    emitter.emit("event", &[]).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

// --- Sharing ---

#[test]
fn test_emitter_shared_across_threads() {
    let emitter: Arc<Emitter> = Arc::new(Emitter::new());
    let (count, handler) = counting_handler();
    emitter.on("event", handler, Context::None);

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let emitter = Arc::clone(&emitter);
            std::thread::spawn(move || emitter.emit("event", &[]).unwrap())
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(count.load(Ordering::SeqCst), 4);
}
