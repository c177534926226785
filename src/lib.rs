//! Bounded Ring - Lock-Free Object Handoff
//!
//! Ring berkapasitas tetap untuk memindahkan referensi objek (handle seukuran
//! pointer) antar thread tanpa lock, dengan transfer bulk/burst dan sinyal
//! watermark opsional.
//!
//! Arsitektur:
//! - Lock-Free: CAS pada head, publish tail berurutan
//! - Cache-Aware: Index producer/consumer di cache line terpisah
//! - Bulk/Burst: Fixed (all-or-nothing) atau Variable (sebanyak yang muat)
//! - Mode tetap: SPSC, SPMC, MPSC, MPMC dipilih saat konstruksi
//!
//! ```
//! let (mut tx, mut rx) = bounded_ring::create::<u64>(4, true, true).unwrap();
//!
//! tx.enqueue_bulk(&[1, 2, 3]).unwrap();
//! assert!(tx.enqueue_bulk(&[4]).is_err()); // kapasitas efektif = slots - 1
//!
//! let mut out = [0u64; 3];
//! rx.dequeue_bulk(&mut out).unwrap();
//! assert_eq!(out, [1, 2, 3]);
//! ```

pub mod affinity;
pub mod core;
mod shim;
pub mod trace;

pub use crate::core::{
    create, Burst, BoundedRing, Consumer, Producer, Quota, RingConfig, RingError, SyncMode,
};
#[cfg(feature = "stats")]
pub use crate::core::StatsSnapshot;
