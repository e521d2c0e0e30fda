use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use tether_events::{Event, notify};
use tether_observability::TracingConfig;

fn init_tracing() {
    let _ = tether_observability::tracing::init(&TracingConfig::for_tests());
}

/// Application object that owns its subscription callbacks.
#[derive(Default)]
struct Screen {
    refreshes: AtomicUsize,
}

impl Screen {
    fn refresh(&self, _: &()) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }

    fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[test]
fn persistent_and_one_shot_subscribers() {
    init_tracing();

    let event = Event::<()>::named("settings.changed");
    let s1 = Arc::new(Screen::default());
    let s2 = Arc::new(Screen::default());
    event.add_method(&s1, Screen::refresh);
    event.once_method(&s2, Screen::refresh);

    notify!(event);
    notify!(event);

    assert_eq!(s1.refreshes(), 2);
    assert_eq!(s2.refreshes(), 1);
    assert_eq!(event.subscriber_count(), 1);
}

#[test]
fn destroyed_subscriber_is_skipped_without_failure() {
    init_tracing();

    let event = Event::<()>::new();
    let s1 = Arc::new(Screen::default());
    let counter = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&counter);
    event.add(&s1, move |_: &()| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    notify!(event);
    drop(s1);
    let report = notify!(event);

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(report.invoked, 0);
    assert_eq!(report.pruned, 1);
    assert_eq!(event.subscriber_count(), 0);
}

#[test]
fn remove_then_readd_then_remove_leaks_nothing() {
    init_tracing();

    let event = Event::<()>::new();
    let s = Arc::new(Screen::default());

    event.add_method(&s, Screen::refresh);
    event.remove(&s);
    event.add_method(&s, Screen::refresh);
    event.once_method(&s, Screen::refresh);
    event.remove(&s);

    notify!(event);
    assert_eq!(s.refreshes(), 0);
    assert!(!event.is_subscribed(&s));
}

#[test]
fn forwarding_chain_reaches_every_node_once() {
    init_tracing();

    let (a, b, c) = (Event::<()>::new(), Event::<()>::new(), Event::<()>::new());
    let screens: Vec<Arc<Screen>> = (0..3).map(|_| Arc::new(Screen::default())).collect();
    a.add_method(&screens[0], Screen::refresh);
    b.add_method(&screens[1], Screen::refresh);
    c.add_method(&screens[2], Screen::refresh);
    a.add_forwarding(&b);
    b.add_forwarding(&c);

    notify!(a);
    assert!(screens.iter().all(|s| s.refreshes() == 1));
}

#[test]
fn forwarding_cycle_does_not_hang() {
    init_tracing();

    let (a, b) = (Event::<()>::new(), Event::<()>::new());
    let (sa, sb) = (Arc::new(Screen::default()), Arc::new(Screen::default()));
    a.add_method(&sa, Screen::refresh);
    b.add_method(&sb, Screen::refresh);
    a.add_forwarding(&b);
    b.add_forwarding(&a);

    for _ in 0..3 {
        notify!(a);
    }
    assert_eq!((sa.refreshes(), sb.refreshes()), (3, 3));
}

#[test]
fn panicking_subscriber_propagates_to_notify() {
    init_tracing();

    let event = Event::<()>::new();
    let owner = Arc::new(Screen::default());
    let healthy = Arc::new(Screen::default());
    event.add(&owner, |_: &()| panic!("listener blew up"));
    event.add_method(&healthy, Screen::refresh);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| notify!(event)));
    assert!(result.is_err());
    assert_eq!(healthy.refreshes(), 0);

    // Registry is intact; removing the faulty listener restores delivery.
    event.remove(&owner);
    notify!(event);
    assert_eq!(healthy.refreshes(), 1);
}

#[test]
fn events_are_shareable_across_threads() {
    init_tracing();

    let event = Event::<usize>::new();
    let total = Arc::new(AtomicUsize::new(0));
    event.add_method(&total, |t: &AtomicUsize, n: &usize| {
        t.fetch_add(*n, Ordering::SeqCst);
    });

    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let event = event.clone();
            std::thread::spawn(move || {
                notify!(event, n);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(total.load(Ordering::SeqCst), 10);
}

#[test]
fn one_shot_fires_once_under_concurrent_dispatch() {
    init_tracing();

    for _ in 0..50 {
        let event = Event::<()>::new();
        let screen = Arc::new(Screen::default());
        event.once_method(&screen, Screen::refresh);

        let start = Arc::new(std::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let event = event.clone();
                let start = Arc::clone(&start);
                std::thread::spawn(move || {
                    start.wait();
                    notify!(event).invoked
                })
            })
            .collect();
        let invoked: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(screen.refreshes(), 1);
        assert_eq!(invoked, 1);
        assert_eq!(event.subscriber_count(), 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    /// Property: whatever the forwarding graph, one dispatch reaches exactly
    /// the nodes reachable from the origin, each exactly once.
    #[test]
    fn forwarding_graph_delivers_once_per_reachable_node(
        edges in prop::collection::vec((0..6usize, 0..6usize), 0..20),
        origin in 0..6usize,
    ) {
        let events: Vec<Event<()>> = (0..6).map(|_| Event::new()).collect();
        let screens: Vec<Arc<Screen>> = (0..6).map(|_| Arc::new(Screen::default())).collect();
        for (event, screen) in events.iter().zip(&screens) {
            event.add_method(screen, Screen::refresh);
        }
        for &(from, to) in &edges {
            events[from].add_forwarding(&events[to]);
        }

        // Reference reachability.
        let mut reachable = [false; 6];
        let mut stack = vec![origin];
        while let Some(n) = stack.pop() {
            if reachable[n] {
                continue;
            }
            reachable[n] = true;
            stack.extend(edges.iter().filter(|(f, _)| *f == n).map(|(_, t)| *t));
        }

        let report = events[origin].dispatch(&());

        for (i, screen) in screens.iter().enumerate() {
            prop_assert_eq!(screen.refreshes(), usize::from(reachable[i]));
        }
        prop_assert_eq!(report.events_visited, reachable.iter().filter(|r| **r).count());
    }
}
