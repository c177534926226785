//! Property tests untuk ring single-thread.
//!
//! Urutan operasi acak dijalankan di ring dan di model `VecDeque` berkapasitas
//! `slots - 1`. Hasil tiap operasi, isi yang di-dequeue, dan query kapasitas
//! harus selalu sama dengan model.

#![cfg(not(feature = "loom"))]

use std::collections::VecDeque;

use proptest::prelude::*;

use bounded_ring::{create, Quota, RingError};

#[derive(Debug, Clone)]
enum Op {
    EnqueueBulk(Vec<u32>),
    EnqueueBurst(Vec<u32>),
    DequeueBulk(usize),
    DequeueBurst(usize),
    SetWatermark(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let items = prop::collection::vec(any::<u32>(), 0..12);
    prop_oneof![
        items.clone().prop_map(Op::EnqueueBulk),
        items.prop_map(Op::EnqueueBurst),
        (0usize..12).prop_map(Op::DequeueBulk),
        (0usize..12).prop_map(Op::DequeueBurst),
        (0u32..20).prop_map(Op::SetWatermark),
    ]
}

/// Occupancy setelah enqueue menyentuh watermark?
fn expect_quota(after: usize, watermark: u32) -> bool {
    after as u32 >= watermark
}

proptest! {
    #[test]
    fn ring_matches_vecdeque_model(
        slots_log2 in 0u32..5,
        single_producer in any::<bool>(),
        single_consumer in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let slots = 1u32 << slots_log2;
        let usable = (slots - 1) as usize;
        let (mut tx, mut rx) = create::<u32>(slots, single_producer, single_consumer).unwrap();
        let mut model: VecDeque<u32> = VecDeque::new();
        let mut watermark = slots;

        for op in ops {
            match op {
                Op::EnqueueBulk(items) => {
                    let free = usable - model.len();
                    let result = tx.enqueue_bulk(&items);
                    if items.len() > free {
                        prop_assert_eq!(
                            result,
                            Err(RingError::NoBuffer { requested: items.len(), free: free as u32 })
                        );
                    } else {
                        model.extend(items.iter().copied());
                        let quota = if expect_quota(model.len(), watermark) {
                            Quota::Exceeded
                        } else {
                            Quota::Below
                        };
                        prop_assert_eq!(result, Ok(quota));
                    }
                }
                Op::EnqueueBurst(items) => {
                    let free = usable - model.len();
                    let burst = tx.enqueue_burst(&items);
                    let expected = items.len().min(free);
                    prop_assert_eq!(burst.count, expected);
                    model.extend(items[..expected].iter().copied());
                    // Burst kosong tetap melaporkan quota; burst yang tidak
                    // dapat ruang sama sekali tidak
                    if expected > 0 || items.is_empty() {
                        prop_assert_eq!(
                            burst.quota_exceeded,
                            expect_quota(model.len(), watermark)
                        );
                    } else {
                        prop_assert!(!burst.quota_exceeded);
                    }
                }
                Op::DequeueBulk(n) => {
                    let mut out = vec![0u32; n];
                    let result = rx.dequeue_bulk(&mut out);
                    if n > model.len() {
                        prop_assert_eq!(
                            result,
                            Err(RingError::NoEntries { requested: n, available: model.len() as u32 })
                        );
                        prop_assert!(out.iter().all(|&v| v == 0));
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        let expected: Vec<u32> = model.drain(..n).collect();
                        prop_assert_eq!(out, expected);
                    }
                }
                Op::DequeueBurst(n) => {
                    let mut out = vec![0u32; n];
                    let got = rx.dequeue_burst(&mut out);
                    let expected_n = n.min(model.len());
                    prop_assert_eq!(got, expected_n);
                    let expected: Vec<u32> = model.drain(..expected_n).collect();
                    prop_assert_eq!(&out[..got], &expected[..]);
                }
                Op::SetWatermark(k) => {
                    let result = tx.ring().set_watermark(k);
                    if k >= slots {
                        prop_assert_eq!(
                            result,
                            Err(RingError::InvalidWatermark { count: k, slots })
                        );
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        watermark = if k == 0 { slots } else { k };
                    }
                    prop_assert_eq!(tx.ring().watermark(), watermark);
                }
            }

            let ring = rx.ring();
            prop_assert_eq!(ring.count() as usize, model.len());
            prop_assert_eq!(ring.free_count() as usize, usable - model.len());
            prop_assert_eq!(ring.is_empty(), model.is_empty());
            prop_assert_eq!(ring.is_full(), model.len() == usable);
        }
    }
}
