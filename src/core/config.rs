//! Konfigurasi ring: jumlah slot, multiplicity, dan watermark awal.

use super::error::RingError;
use super::handle::{split, Consumer, Producer};
use super::ring_buffer::BoundedRing;

/// Jumlah thread yang boleh berada di satu sisi ring.
///
/// Dipilih sekali saat konstruksi dan tidak pernah berubah. `Single` melewati
/// CAS dan spin-wait publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Single,
    Multi,
}

impl SyncMode {
    #[inline(always)]
    pub fn from_single(single: bool) -> Self {
        if single {
            SyncMode::Single
        } else {
            SyncMode::Multi
        }
    }
}

/// Builder untuk ring
///
/// ```
/// use bounded_ring::{RingConfig, SyncMode};
///
/// let (mut tx, mut rx) = RingConfig::new(256)
///     .producer(SyncMode::Multi)
///     .consumer(SyncMode::Single)
///     .watermark(192)
///     .build::<usize>()
///     .unwrap();
///
/// tx.enqueue(7).unwrap();
/// assert_eq!(rx.dequeue().unwrap(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    /// Jumlah slot, power of 2
    pub slots: u32,
    pub producer: SyncMode,
    pub consumer: SyncMode,
    /// 0 = watermark mati
    pub watermark: u32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            slots: 1024,
            producer: SyncMode::Multi,
            consumer: SyncMode::Multi,
            watermark: 0,
        }
    }
}

impl RingConfig {
    /// Config default dengan jumlah slot tertentu (harus power of 2)
    pub fn new(slots: u32) -> Self {
        Self {
            slots,
            ..Self::default()
        }
    }

    /// Set mode sisi producer
    pub fn producer(mut self, mode: SyncMode) -> Self {
        self.producer = mode;
        self
    }

    /// Set mode sisi consumer
    pub fn consumer(mut self, mode: SyncMode) -> Self {
        self.consumer = mode;
        self
    }

    /// `true` = satu producer (`SyncMode::Single`)
    pub fn single_producer(self, single: bool) -> Self {
        self.producer(SyncMode::from_single(single))
    }

    /// `true` = satu consumer (`SyncMode::Single`)
    pub fn single_consumer(self, single: bool) -> Self {
        self.consumer(SyncMode::from_single(single))
    }

    /// Watermark awal; 0 = mati
    pub fn watermark(mut self, count: u32) -> Self {
        self.watermark = count;
        self
    }

    /// Alokasi ring dan pecah menjadi handle producer/consumer.
    ///
    /// Gagal dengan `NotPowerOfTwo` atau `InvalidWatermark`.
    pub fn build<T: Copy>(self) -> Result<(Producer<T>, Consumer<T>), RingError> {
        let ring = BoundedRing::new(self.slots, self.producer, self.consumer)?;
        ring.set_watermark(self.watermark)?;
        Ok(split(ring))
    }
}
