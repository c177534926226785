//! Criterion benchmark untuk Bounded Ring
//!
//! Run dengan: cargo bench

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use bounded_ring::create;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_single_object(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_object");
    group.throughput(Throughput::Elements(1));

    for (label, single) in [("spsc", true), ("mpmc", false)] {
        group.bench_function(format!("{}_enqueue_dequeue", label), |b| {
            let (mut tx, mut rx) = create::<u64>(65536, single, single).unwrap();
            let mut i = 0u64;
            b.iter(|| {
                let _ = tx.enqueue(black_box(i));
                black_box(rx.dequeue().ok());
                i = i.wrapping_add(1);
            });
        });
    }

    group.finish();
}

fn bench_bulk_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_burst");

    for batch_size in [8usize, 32, 256].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));

        group.bench_function(format!("spsc_bulk_{}", batch_size), |b| {
            let (mut tx, mut rx) = create::<u64>(65536, true, true).unwrap();
            let items: Vec<u64> = (0..*batch_size as u64).collect();
            let mut out = vec![0u64; *batch_size];
            b.iter(|| {
                tx.enqueue_bulk(black_box(&items)).unwrap();
                rx.dequeue_bulk(black_box(&mut out)).unwrap();
            });
        });

        group.bench_function(format!("mpmc_burst_{}", batch_size), |b| {
            let (mut tx, mut rx) = create::<u64>(65536, false, false).unwrap();
            let items: Vec<u64> = (0..*batch_size as u64).collect();
            let mut out = vec![0u64; *batch_size];
            b.iter(|| {
                black_box(tx.enqueue_burst(black_box(&items)));
                black_box(rx.dequeue_burst(&mut out));
            });
        });
    }

    group.finish();
}

fn bench_contended_mpmc(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");
    const BATCH: usize = 32;
    group.throughput(Throughput::Elements(BATCH as u64));

    // Satu producer lain dan satu consumer lain berjalan di background;
    // iterasi yang diukur ikut berebut CAS di kedua sisi
    group.bench_function("mpmc_bulk_32_vs_background", |b| {
        let (tx, rx) = create::<u64>(1024, false, false).unwrap();
        let stop = Arc::new(AtomicBool::new(false));

        let mut bg_tx = tx.try_clone().unwrap();
        let mut bg_rx = rx.try_clone().unwrap();
        let stop_p = stop.clone();
        let producer = thread::spawn(move || {
            let items = [7u64; BATCH];
            while !stop_p.load(Ordering::Relaxed) {
                let _ = bg_tx.enqueue_bulk(&items);
            }
        });
        let stop_c = stop.clone();
        let consumer = thread::spawn(move || {
            let mut out = [0u64; BATCH];
            while !stop_c.load(Ordering::Relaxed) {
                bg_rx.dequeue_burst(&mut out);
            }
        });

        let (mut tx, mut rx) = (tx, rx);
        let items = [1u64; BATCH];
        let mut out = [0u64; BATCH];
        b.iter(|| {
            black_box(tx.enqueue_burst(&items));
            black_box(rx.dequeue_burst(&mut out));
        });

        stop.store(true, Ordering::Relaxed);
        producer.join().unwrap();
        consumer.join().unwrap();
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_object,
    bench_bulk_burst,
    bench_contended_mpmc
);
criterion_main!(benches);
