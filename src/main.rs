//! Bounded Ring - latency demo single-thread
//!
//! Mengukur biaya per operasi untuk tiap jalur (single vs multi, bulk vs
//! burst) tanpa kontensi. Untuk throughput multi-thread lihat
//! `src/bin/ring_throughput.rs`.

use std::time::Instant;

use bounded_ring::{create, BoundedRing, Consumer, Producer};

const ITERATIONS: usize = 1_000_000;
const SLOTS: u32 = 65536;

fn main() {
    bounded_ring::trace::init_tracing();

    println!("🚀 Bounded Ring - Latency Demo");
    println!("==============================\n");
    println!(
        "  Footprint ({} slots of u64): {} KB\n",
        SLOTS,
        BoundedRing::<u64>::bytes_with_slots(SLOTS) / 1024
    );

    for (label, single_producer, single_consumer) in [
        ("SPSC", true, true),
        ("MPMC", false, false),
    ] {
        match create::<u64>(SLOTS, single_producer, single_consumer) {
            Ok((mut tx, mut rx)) => {
                benchmark_single(label, &mut tx, &mut rx);
                for batch in [8usize, 32, 256] {
                    benchmark_bulk(label, &mut tx, &mut rx, batch);
                }
            }
            Err(e) => {
                eprintln!("❌ Failed to create ring: {}", e);
                std::process::exit(1);
            }
        }
    }

    println!("\n✅ All benchmarks complete!");
    println!("\nFor threaded throughput: cargo run --release --bin ring_throughput -- --help");
}

fn benchmark_single(label: &str, tx: &mut Producer<u64>, rx: &mut Consumer<u64>) {
    println!("📊 {} single-object enqueue/dequeue", label);
    println!("-----------------------------------");

    // Warm up
    for i in 0..1000 {
        let _ = tx.enqueue(i);
    }
    while rx.dequeue().is_ok() {}

    let start = Instant::now();
    for i in 0..ITERATIONS {
        if tx.enqueue(i as u64).is_err() {
            let _ = rx.dequeue();
            let _ = tx.enqueue(i as u64);
        }
    }
    let push_duration = start.elapsed();

    let drained = tx.ring().count().max(1) as usize;
    let start = Instant::now();
    while rx.dequeue().is_ok() {}
    let pop_duration = start.elapsed();

    let push_ns = push_duration.as_nanos() as f64 / ITERATIONS as f64;
    let pop_ns = pop_duration.as_nanos() as f64 / drained as f64;

    println!("  Operations:   {}", ITERATIONS);
    println!("  Enqueue:      {:.2} ns/op", push_ns);
    println!("  Dequeue:      {:.2} ns/op", pop_ns);
    println!(
        "  Throughput:   {:.2} M ops/sec\n",
        ITERATIONS as f64 / push_duration.as_secs_f64() / 1_000_000.0
    );
}

fn benchmark_bulk(label: &str, tx: &mut Producer<u64>, rx: &mut Consumer<u64>, batch: usize) {
    let items: Vec<u64> = (0..batch as u64).collect();
    let mut out = vec![0u64; batch];
    let rounds = ITERATIONS / batch;

    let start = Instant::now();
    for _ in 0..rounds {
        let burst = tx.enqueue_burst(&items);
        if burst.count < batch {
            rx.dequeue_burst(&mut out);
        }
        if rx.dequeue_bulk(&mut out).is_err() {
            rx.dequeue_burst(&mut out);
        }
    }
    let duration = start.elapsed();

    let per_obj_ns = duration.as_nanos() as f64 / (rounds * batch) as f64;
    println!(
        "  {} burst/bulk x{:<4} {:.2} ns/obj ({:.2} M objs/sec)",
        label,
        batch,
        per_obj_ns,
        (rounds * batch) as f64 / duration.as_secs_f64() / 1_000_000.0
    );
}
