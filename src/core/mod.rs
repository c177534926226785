//! Core module: Lock-Free Bounded Ring
//!
//! Prinsip desain:
//! - Lock-Free: Hanya atomic operations (CAS + load/store), tidak ada Mutex
//! - No-Allocation: Storage pre-allocated saat init, tidak pernah di-resize
//! - Bulk-First: Enqueue/dequeue banyak item dalam satu reserve index

mod config;
mod error;
mod handle;
mod ring_buffer;
#[cfg_attr(not(feature = "stats"), allow(dead_code))]
mod stats;

pub use config::{RingConfig, SyncMode};
pub use error::{Burst, Quota, RingError};
pub use handle::{create, Consumer, Producer};
pub use ring_buffer::BoundedRing;
#[cfg(feature = "stats")]
pub use stats::StatsSnapshot;
