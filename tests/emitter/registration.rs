//! Tests for `on` / `prepend_listener` and the `"newListener"` notification.

use std::sync::{Arc, Mutex};

use power_emitter::emitter::NEW_LISTENER;
use power_emitter::{args, Args, EventEmitter, EventId, Listener, ListenerKind};

fn make_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

fn noop() -> Listener {
    Listener::new(|_| {})
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn on_appends_and_prepend_inserts_at_front() {
    let emitter = EventEmitter::new();
    let (a, b, c, d) = (noop(), noop(), noop(), noop());

    emitter.on("x", a.clone());
    emitter.on("x", b.clone());
    emitter.prepend_listener("x", c.clone());
    emitter.on("x", d.clone());

    assert_eq!(emitter.listeners("x"), vec![c, a, b, d]);
}

#[test]
fn prepended_listener_runs_first() {
    let emitter = EventEmitter::new();
    let log = make_log();

    for tag in ["second", "first"] {
        let log = Arc::clone(&log);
        emitter.prepend_listener("x", Listener::new(move |_| log.lock().unwrap().push(tag.to_string())));
    }
    emitter.emit("x", Args::new()).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn registration_creates_the_event_lazily() {
    let emitter = EventEmitter::new();
    assert_eq!(emitter.listener_count("fresh"), 0);

    emitter.on("fresh", noop());

    assert_eq!(emitter.listener_count("fresh"), 1);
    assert!(emitter.event_names().iter().any(|e| e == "fresh"));
}

#[test]
fn same_handle_registered_twice_runs_twice() {
    let emitter = EventEmitter::new();
    let calls = Arc::new(Mutex::new(0));
    let listener = {
        let calls = Arc::clone(&calls);
        Listener::new(move |_| *calls.lock().unwrap() += 1)
    };

    emitter.on("x", listener.clone()).on("x", listener);
    emitter.emit("x", Args::new()).unwrap();

    assert_eq!(*calls.lock().unwrap(), 2);
    assert_eq!(emitter.listener_count("x"), 2);
}

#[test]
fn add_listener_is_an_alias_of_on() {
    let emitter = EventEmitter::new();
    let listener = noop();
    emitter.add_listener("x", listener.clone());
    assert_eq!(
        emitter.raw_listeners("x"),
        vec![(listener, ListenerKind::Persistent)]
    );
}

// ============================================================================
// newListener
// ============================================================================

#[test]
fn new_listener_is_emitted_with_event_and_listener() {
    let emitter = EventEmitter::new();
    let seen: Arc<Mutex<Vec<(EventId, Listener)>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        emitter.on(
            NEW_LISTENER,
            Listener::new(move |args| {
                let event = args.get::<EventId>(0).cloned().unwrap();
                let listener = args.get::<Listener>(1).cloned().unwrap();
                seen.lock().unwrap().push((event, listener));
            }),
        );
    }

    let listener = noop();
    emitter.on("data", listener.clone());

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(EventId::from("data"), listener)]
    );
}

#[test]
fn new_listener_fires_before_the_listener_is_added() {
    let emitter = Arc::new(EventEmitter::new());
    let counts = Arc::new(Mutex::new(Vec::new()));
    {
        let emitter_clone = Arc::clone(&emitter);
        let counts = Arc::clone(&counts);
        emitter.on(
            NEW_LISTENER,
            Listener::new(move |args| {
                let event = args.get::<EventId>(0).unwrap();
                let listener = args.get::<Listener>(1).unwrap();
                let visible = emitter_clone.listeners(event).contains(listener);
                counts
                    .lock()
                    .unwrap()
                    .push((emitter_clone.listener_count(event), visible));
            }),
        );
    }

    emitter.on("x", noop());
    emitter.prepend_listener("x", noop());

    assert_eq!(*counts.lock().unwrap(), vec![(0, false), (1, false)]);
    assert_eq!(emitter.listener_count("x"), 2);
}

#[test]
fn new_listener_is_emitted_once_for_every_registration_variant() {
    let emitter = EventEmitter::new();
    let count = Arc::new(Mutex::new(0));
    {
        let count = Arc::clone(&count);
        emitter.on(NEW_LISTENER, Listener::new(move |_| *count.lock().unwrap() += 1));
    }

    emitter.on("x", noop());
    emitter.prepend_listener("x", noop());
    emitter.once("x", noop());
    emitter.prepend_once_listener("x", noop());

    assert_eq!(*count.lock().unwrap(), 4);
}

#[test]
fn once_registration_announces_the_callers_handle() {
    let emitter = EventEmitter::new();
    let announced = Arc::new(Mutex::new(None));
    {
        let announced = Arc::clone(&announced);
        emitter.on(
            NEW_LISTENER,
            Listener::new(move |args| *announced.lock().unwrap() = args.get::<Listener>(1).cloned()),
        );
    }

    let listener = noop();
    emitter.once("y", listener.clone());

    assert_eq!(*announced.lock().unwrap(), Some(listener));
}

#[test]
fn new_listener_handler_may_register_more_listeners() {
    let emitter = Arc::new(EventEmitter::new());
    let log = make_log();
    {
        let emitter_clone = Arc::clone(&emitter);
        let log = Arc::clone(&log);
        emitter.once(
            NEW_LISTENER,
            Listener::new(move |args| {
                let event = args.get::<EventId>(0).unwrap().clone();
                let log = Arc::clone(&log);
                emitter_clone.on(
                    event,
                    Listener::new(move |_| log.lock().unwrap().push("injected".to_string())),
                );
            }),
        );
    }

    let log_clone = Arc::clone(&log);
    emitter.on(
        "x",
        Listener::new(move |_| log_clone.lock().unwrap().push("own".to_string())),
    );
    emitter.emit("x", args![]).unwrap();

    // The injected listener was added while "x" was being announced, so it
    // lands ahead of the listener that triggered the announcement.
    assert_eq!(*log.lock().unwrap(), vec!["injected", "own"]);
}
