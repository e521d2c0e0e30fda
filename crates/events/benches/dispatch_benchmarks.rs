use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tether_events::Event;

fn sink(counter: &AtomicU64, value: &u64) {
    counter.fetch_add(*value, Ordering::Relaxed);
}

/// Fan-out to N live subscribers on one event.
fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");
    for &subscribers in &[1usize, 16, 256] {
        let event = Event::<u64>::new();
        let targets: Vec<Arc<AtomicU64>> =
            (0..subscribers).map(|_| Arc::new(AtomicU64::new(0))).collect();
        for target in &targets {
            event.add_method(target, sink);
        }

        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &event,
            |b, event| b.iter(|| event.dispatch(black_box(&1))),
        );
    }
    group.finish();
}

/// Dispatch through a forwarding chain of N events, one subscriber each.
fn bench_forwarding_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("forwarding_chain");
    for &depth in &[1usize, 8, 64] {
        let events: Vec<Event<u64>> = (0..depth).map(|_| Event::new()).collect();
        let target = Arc::new(AtomicU64::new(0));
        for pair in events.windows(2) {
            pair[0].add_forwarding(&pair[1]);
        }
        for event in &events {
            event.add_method(&target, sink);
        }

        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(depth),
            &events[0],
            |b, head| b.iter(|| head.dispatch(black_box(&1))),
        );
    }
    group.finish();
}

/// Registering and consuming one-shot subscriptions.
fn bench_once_churn(c: &mut Criterion) {
    let event = Event::<u64>::new();
    let target = Arc::new(AtomicU64::new(0));

    c.bench_function("once_register_and_fire", |b| {
        b.iter(|| {
            event.once_method(&target, sink);
            event.dispatch(black_box(&1))
        })
    });
}

criterion_group!(
    benches,
    bench_fan_out,
    bench_forwarding_chain,
    bench_once_churn
);
criterion_main!(benches);
