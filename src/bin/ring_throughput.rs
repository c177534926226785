//! Ring Throughput Driver
//!
//! N producer thread mendorong batch fixed-size (bulk), M consumer thread
//! menguras dengan burst. Rate dicetak tiap detik setelah warm-up.
//!
//! Usage:
//!   cargo run --release --bin ring_throughput -- [OPTIONS]
//!
//! Environment variables:
//!   PRODUCER_CPU=1  Core pertama untuk producer (default: tidak di-pin)
//!   CONSUMER_CPU=3  Core pertama untuk consumer (default: tidak di-pin)

use std::env;
use std::hint;
use std::process;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bounded_ring::affinity::{allowed_cpu_count, pin_current_thread_to_core};
use bounded_ring::{Consumer, Producer, RingConfig, RingError};

/// Tag = producer id di 16 bit atas, sequence di 48 bit bawah
const SEQ_BITS: u32 = 48;
const SEQ_MASK: u64 = (1 << SEQ_BITS) - 1;

/// Konfigurasi driver
struct ThroughputConfig {
    slots: u32,
    producers: usize,
    consumers: usize,
    produce_batch: usize,
    consume_batch: usize,
    watermark: u32,
    warmup_secs: u64,
    measure_secs: u64,
    producer_cpu: Option<usize>,
    consumer_cpu: Option<usize>,
}

impl Default for ThroughputConfig {
    fn default() -> Self {
        Self {
            slots: 256,
            producers: 1,
            consumers: 1,
            produce_batch: 32,
            consume_batch: 32,
            watermark: 0,
            warmup_secs: 1,
            measure_secs: 5,
            producer_cpu: None,
            consumer_cpu: None,
        }
    }
}

/// Counter bersama antar thread
struct DriverStats {
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    quota_signals: AtomicU64,
    full_retries: AtomicU64,
    order_violations: AtomicU64,
}

impl DriverStats {
    fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            dequeued: AtomicU64::new(0),
            quota_signals: AtomicU64::new(0),
            full_retries: AtomicU64::new(0),
            order_violations: AtomicU64::new(0),
        }
    }
}

fn pin(base: Option<usize>, offset: usize, role: &str) {
    if let Some(core) = base {
        let core = core + offset;
        if let Err(e) = pin_current_thread_to_core(core) {
            eprintln!("⚠️ Failed to pin {} to CPU {}: {}", role, core, e);
        }
    }
}

fn run_producer(
    id: usize,
    mut tx: Producer<u64>,
    config: &ThroughputConfig,
    stop: &AtomicBool,
    stats: &DriverStats,
) {
    pin(config.producer_cpu, id, "producer");

    let mut seq: u64 = 0;
    let mut batch = vec![0u64; config.produce_batch];

    while !stop.load(Ordering::Relaxed) {
        for slot in batch.iter_mut() {
            *slot = ((id as u64) << SEQ_BITS) | (seq & SEQ_MASK);
            seq += 1;
        }

        loop {
            match tx.enqueue_bulk(&batch) {
                Ok(quota) => {
                    if quota.is_exceeded() {
                        stats.quota_signals.fetch_add(1, Ordering::Relaxed);
                    }
                    stats
                        .enqueued
                        .fetch_add(batch.len() as u64, Ordering::Relaxed);
                    break;
                }
                Err(RingError::NoBuffer { .. }) => {
                    stats.full_retries.fetch_add(1, Ordering::Relaxed);
                    if stop.load(Ordering::Relaxed) {
                        return;
                    }
                    hint::spin_loop();
                }
                Err(e) => {
                    eprintln!("❌ Producer {} error: {}", id, e);
                    return;
                }
            }
        }
    }
}

fn run_consumer(
    id: usize,
    mut rx: Consumer<u64>,
    config: &ThroughputConfig,
    producers_done: &AtomicBool,
    stats: &DriverStats,
) {
    pin(config.consumer_cpu, id, "consumer");

    let mut batch = vec![0u64; config.consume_batch];
    // Urutan per producer hanya bisa dicek kalau consumer tunggal
    let mut last_seq: Vec<Option<u64>> = vec![None; config.producers];
    let verify = config.consumers == 1;

    loop {
        let n = rx.dequeue_burst(&mut batch);
        if n == 0 {
            // Semua producer sudah join: sisa item pasti sudah di-publish
            if producers_done.load(Ordering::Acquire) && rx.ring().is_empty() {
                break;
            }
            hint::spin_loop();
            continue;
        }

        if verify {
            for &tag in &batch[..n] {
                let producer = (tag >> SEQ_BITS) as usize;
                let seq = tag & SEQ_MASK;
                if let Some(prev) = last_seq.get(producer).copied().flatten() {
                    if seq != prev + 1 {
                        stats.order_violations.fetch_add(1, Ordering::Relaxed);
                    }
                }
                if let Some(entry) = last_seq.get_mut(producer) {
                    *entry = Some(seq);
                }
            }
        }

        stats.dequeued.fetch_add(n as u64, Ordering::Relaxed);
    }
}

fn run(config: ThroughputConfig) -> Result<(), RingError> {
    let (tx, rx) = RingConfig::new(config.slots)
        .single_producer(config.producers == 1)
        .single_consumer(config.consumers == 1)
        .watermark(config.watermark)
        .build::<u64>()?;

    println!("📊 Ring Throughput");
    println!("------------------");
    println!("  Slots:       {}", config.slots);
    println!(
        "  Producers:   {} (batch {})",
        config.producers, config.produce_batch
    );
    println!(
        "  Consumers:   {} (batch {})",
        config.consumers, config.consume_batch
    );
    if let Ok(cpus) = allowed_cpu_count() {
        println!("  CPUs:        {}", cpus);
    }

    // Handle tambahan; try_clone tidak gagal karena mode Multi bila > 1
    let mut producers = vec![tx];
    while producers.len() < config.producers {
        match producers[0].try_clone() {
            Some(p) => producers.push(p),
            None => break,
        }
    }
    let mut consumers = vec![rx];
    while consumers.len() < config.consumers {
        match consumers[0].try_clone() {
            Some(c) => consumers.push(c),
            None => break,
        }
    }

    let config = Arc::new(config);
    let stop = Arc::new(AtomicBool::new(false));
    let producers_done = Arc::new(AtomicBool::new(false));
    let stats = Arc::new(DriverStats::new());

    let mut handles = Vec::new();
    for (id, rx) in consumers.into_iter().enumerate() {
        let (config, done, stats) = (config.clone(), producers_done.clone(), stats.clone());
        handles.push(thread::spawn(move || {
            run_consumer(id, rx, &config, &done, &stats)
        }));
    }
    let mut producer_handles = Vec::new();
    for (id, tx) in producers.into_iter().enumerate() {
        let (config, stop, stats) = (config.clone(), stop.clone(), stats.clone());
        producer_handles.push(thread::spawn(move || {
            run_producer(id, tx, &config, &stop, &stats)
        }));
    }

    thread::sleep(Duration::from_secs(config.warmup_secs));

    let start = Instant::now();
    let mut last = stats.dequeued.load(Ordering::Relaxed);
    let base = last;
    for second in 1..=config.measure_secs {
        thread::sleep(Duration::from_secs(1));
        let now = stats.dequeued.load(Ordering::Relaxed);
        println!(
            "  [{:>3}s] {:.2} M objs/sec",
            second,
            (now - last) as f64 / 1_000_000.0
        );
        last = now;
    }
    let elapsed = start.elapsed();

    stop.store(true, Ordering::Release);
    for h in producer_handles {
        h.join().ok();
    }
    producers_done.store(true, Ordering::Release);
    for h in handles {
        h.join().ok();
    }

    let enqueued = stats.enqueued.load(Ordering::Relaxed);
    let dequeued = stats.dequeued.load(Ordering::Relaxed);
    println!(
        "\n  Average:     {:.2} M objs/sec",
        (last - base) as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );
    println!("  Enqueued:    {}", enqueued);
    println!("  Dequeued:    {}", dequeued);
    println!(
        "  Quota hits:  {}",
        stats.quota_signals.load(Ordering::Relaxed)
    );
    println!(
        "  Full retries: {}",
        stats.full_retries.load(Ordering::Relaxed)
    );

    let violations = stats.order_violations.load(Ordering::Relaxed);
    if enqueued != dequeued || violations > 0 {
        eprintln!(
            "❌ Conservation check failed (lost: {}, order violations: {})",
            enqueued as i64 - dequeued as i64,
            violations
        );
        process::exit(2);
    }
    println!("\n✅ No loss, no duplication");
    Ok(())
}

fn parse_cpu_env(name: &str) -> Option<usize> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

fn parse_args() -> ThroughputConfig {
    let args: Vec<String> = env::args().collect();
    let mut config = ThroughputConfig {
        producer_cpu: parse_cpu_env("PRODUCER_CPU"),
        consumer_cpu: parse_cpu_env("CONSUMER_CPU"),
        ..ThroughputConfig::default()
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--slots" | "-s" => {
                if let Some(v) = value {
                    config.slots = v.parse().unwrap_or(config.slots);
                    i += 1;
                }
            }
            "--producers" | "-p" => {
                if let Some(v) = value {
                    config.producers = v.parse().unwrap_or(1).max(1);
                    i += 1;
                }
            }
            "--consumers" | "-c" => {
                if let Some(v) = value {
                    config.consumers = v.parse().unwrap_or(1).max(1);
                    i += 1;
                }
            }
            "--batch" | "-b" => {
                if let Some(v) = value {
                    let batch = v.parse().unwrap_or(32).max(1);
                    config.produce_batch = batch;
                    config.consume_batch = batch;
                    i += 1;
                }
            }
            "--consume-batch" => {
                if let Some(v) = value {
                    config.consume_batch = v.parse().unwrap_or(32).max(1);
                    i += 1;
                }
            }
            "--watermark" | "-w" => {
                if let Some(v) = value {
                    config.watermark = v.parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--warmup" => {
                if let Some(v) = value {
                    config.warmup_secs = v.parse().unwrap_or(1);
                    i += 1;
                }
            }
            "--seconds" | "-t" => {
                if let Some(v) = value {
                    config.measure_secs = v.parse().unwrap_or(5);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Ring Throughput Driver\n");
                println!("Usage: ring_throughput [OPTIONS]\n");
                println!("Options:");
                println!("  -s, --slots <N>          Ring slots, power of 2 (default: 256)");
                println!("  -p, --producers <N>      Producer threads (default: 1)");
                println!("  -c, --consumers <N>      Consumer threads (default: 1)");
                println!("  -b, --batch <N>          Batch size for both sides (default: 32)");
                println!("      --consume-batch <N>  Consumer burst size (default: 32)");
                println!("  -w, --watermark <N>      Watermark, 0 = disabled (default: 0)");
                println!("      --warmup <SECS>      Warm-up period (default: 1)");
                println!("  -t, --seconds <SECS>     Measurement period (default: 5)");
                println!("  -h, --help               Show this help");
                println!("\nEnv: PRODUCER_CPU / CONSUMER_CPU pin threads starting at that core");
                process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn main() {
    bounded_ring::trace::init_tracing();
    let config = parse_args();

    if config.produce_batch as u64 > u64::from(config.slots.saturating_sub(1)) {
        eprintln!(
            "❌ Batch {} never fits a ring of {} slots (usable {})",
            config.produce_batch,
            config.slots,
            config.slots.saturating_sub(1)
        );
        process::exit(1);
    }

    if let Err(e) = run(config) {
        eprintln!("❌ Throughput error: {}", e);
        process::exit(1);
    }
}
