//! Handle Producer/Consumer
//!
//! Enqueue dan dequeue hanya bisa lewat handle. Di mode `Single` hanya ada
//! satu handle untuk sisi itu (`try_clone` return `None`), dan semua operasi
//! butuh `&mut self` - jadi jalur tanpa CAS tidak pernah dipanggil paralel.

use std::mem::MaybeUninit;

use super::config::{RingConfig, SyncMode};
use super::error::{Burst, Quota, RingError};
use super::ring_buffer::{as_uninit_mut, Behavior, BoundedRing};
use crate::shim::sync::Arc;

/// Buat ring dengan `slots` slot dan kembalikan sepasang handle.
///
/// `slots` harus power of 2. Watermark awal mati.
pub fn create<T: Copy>(
    slots: u32,
    single_producer: bool,
    single_consumer: bool,
) -> Result<(Producer<T>, Consumer<T>), RingError> {
    RingConfig::new(slots)
        .single_producer(single_producer)
        .single_consumer(single_consumer)
        .build()
}

pub(crate) fn split<T: Copy>(ring: BoundedRing<T>) -> (Producer<T>, Consumer<T>) {
    let ring = Arc::new(ring);
    (
        Producer {
            ring: Arc::clone(&ring),
        },
        Consumer { ring },
    )
}

/// Sisi producer dari ring
pub struct Producer<T> {
    ring: Arc<BoundedRing<T>>,
}

impl<T: Copy> Producer<T> {
    /// Enqueue semua `items` atau tidak sama sekali.
    ///
    /// `Ok(Quota::Exceeded)` berarti item sudah masuk, tapi occupancy sekarang
    /// di atas watermark. Gagal dengan `NoBuffer` tanpa mengubah ring.
    #[inline(always)]
    pub fn enqueue_bulk(&mut self, items: &[T]) -> Result<Quota, RingError> {
        // SAFETY: &mut self + handle unik di mode Single
        let (_, quota) = unsafe { self.ring.enqueue(items, Behavior::Fixed)? };
        Ok(quota)
    }

    /// Enqueue sebanyak mungkin dari `items` (0..=len).
    ///
    /// Ring penuh bukan error - hasilnya `count == 0`.
    #[inline(always)]
    pub fn enqueue_burst(&mut self, items: &[T]) -> Burst {
        // SAFETY: sama dengan enqueue_bulk
        match unsafe { self.ring.enqueue(items, Behavior::Variable) } {
            Ok((count, quota)) => Burst {
                count,
                quota_exceeded: quota.is_exceeded(),
            },
            Err(_) => Burst::empty(),
        }
    }

    /// Enqueue satu objek.
    #[inline(always)]
    pub fn enqueue(&mut self, item: T) -> Result<Quota, RingError> {
        self.enqueue_bulk(std::slice::from_ref(&item))
    }

    /// Handle producer tambahan. `None` kalau ring single-producer.
    pub fn try_clone(&self) -> Option<Self> {
        if self.ring.is_single_producer() {
            return None;
        }
        Some(Self {
            ring: Arc::clone(&self.ring),
        })
    }

    /// Ring di belakang handle ini (untuk query dan watermark)
    #[inline(always)]
    pub fn ring(&self) -> &BoundedRing<T> {
        &self.ring
    }

    pub fn mode(&self) -> SyncMode {
        SyncMode::from_single(self.ring.is_single_producer())
    }
}

/// Sisi consumer dari ring
pub struct Consumer<T> {
    ring: Arc<BoundedRing<T>>,
}

impl<T: Copy> Consumer<T> {
    /// Isi seluruh `out` atau tidak sama sekali.
    ///
    /// Gagal dengan `NoEntries` tanpa mengubah ring.
    #[inline(always)]
    pub fn dequeue_bulk(&mut self, out: &mut [T]) -> Result<(), RingError> {
        // SAFETY: &mut self + handle unik di mode Single; ring hanya menulis
        // nilai T yang sudah di-publish producer
        unsafe { self.ring.dequeue(as_uninit_mut(out), Behavior::Fixed)? };
        Ok(())
    }

    /// Dequeue sebanyak mungkin ke `out`. Return jumlah yang terisi.
    #[inline(always)]
    pub fn dequeue_burst(&mut self, out: &mut [T]) -> usize {
        // SAFETY: sama dengan dequeue_bulk
        unsafe { self.ring.dequeue(as_uninit_mut(out), Behavior::Variable) }.unwrap_or(0)
    }

    /// Dequeue satu objek.
    #[inline(always)]
    pub fn dequeue(&mut self) -> Result<T, RingError> {
        let mut slot = [MaybeUninit::<T>::uninit()];
        // SAFETY: slot hanya dibaca kalau dequeue sukses, dan saat itu sudah
        // terisi penuh
        unsafe {
            self.ring.dequeue(&mut slot, Behavior::Fixed)?;
            Ok(slot[0].assume_init())
        }
    }

    /// Handle consumer tambahan. `None` kalau ring single-consumer.
    pub fn try_clone(&self) -> Option<Self> {
        if self.ring.is_single_consumer() {
            return None;
        }
        Some(Self {
            ring: Arc::clone(&self.ring),
        })
    }

    #[inline(always)]
    pub fn ring(&self) -> &BoundedRing<T> {
        &self.ring
    }

    pub fn mode(&self) -> SyncMode {
        SyncMode::from_single(self.ring.is_single_consumer())
    }
}

impl<T> std::fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer").field("ring", &*self.ring).finish()
    }
}

impl<T> std::fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer").field("ring", &*self.ring).finish()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    #[test]
    fn test_spsc_bulk_roundtrip() {
        let (mut tx, mut rx) = create::<u64>(4, true, true).unwrap();

        assert_eq!(tx.enqueue_bulk(&[1, 2, 3]), Ok(Quota::Below));
        assert_eq!(tx.ring().count(), 3);

        let mut out = [0u64; 3];
        rx.dequeue_bulk(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
        assert!(rx.ring().is_empty());
    }

    #[test]
    fn test_bulk_over_usable_capacity_fails() {
        let (mut tx, _rx) = create::<u64>(4, true, true).unwrap();

        let err = tx.enqueue_bulk(&[1, 2, 3, 4]).unwrap_err();
        assert_eq!(
            err,
            RingError::NoBuffer {
                requested: 4,
                free: 3
            }
        );
        assert_eq!(tx.ring().count(), 0);
        assert!(tx.ring().is_empty());
    }

    #[test]
    fn test_failed_bulk_leaves_contents_intact() {
        let (mut tx, mut rx) = create::<u64>(8, true, true).unwrap();
        tx.enqueue_bulk(&[10, 20, 30, 40, 50]).unwrap();

        assert!(tx.enqueue_bulk(&[60, 70, 80]).is_err());
        assert_eq!(tx.ring().count(), 5);

        let mut big = [0u64; 6];
        assert_eq!(
            rx.dequeue_bulk(&mut big),
            Err(RingError::NoEntries {
                requested: 6,
                available: 5
            })
        );
        assert_eq!(big, [0; 6]);
        assert_eq!(rx.ring().count(), 5);

        let mut out = [0u64; 5];
        rx.dequeue_bulk(&mut out).unwrap();
        assert_eq!(out, [10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_burst_clamps() {
        let (mut tx, mut rx) = create::<u64>(4, false, false).unwrap();

        let burst = tx.enqueue_burst(&[1, 2, 3, 4, 5]);
        assert_eq!(burst.count, 3);
        assert!(!burst.quota_exceeded);
        assert!(tx.ring().is_full());

        assert_eq!(tx.enqueue_burst(&[6]), Burst::empty());

        let mut out = [0u64; 8];
        assert_eq!(rx.dequeue_burst(&mut out), 3);
        assert_eq!(&out[..3], &[1, 2, 3]);
        assert_eq!(rx.dequeue_burst(&mut out), 0);
    }

    #[test]
    fn test_watermark_does_not_affect_data() {
        let (mut tx, mut rx) = create::<u64>(8, true, true).unwrap();
        tx.ring().set_watermark(2).unwrap();

        assert_eq!(tx.enqueue_bulk(&[7, 8, 9]), Ok(Quota::Exceeded));

        let mut out = [0u64; 3];
        rx.dequeue_bulk(&mut out).unwrap();
        assert_eq!(out, [7, 8, 9]);
    }

    #[test]
    fn test_burst_reports_quota() {
        let (mut tx, _rx) = create::<u64>(16, false, true).unwrap();
        tx.ring().set_watermark(10).unwrap();

        let burst = tx.enqueue_burst(&[0; 9]);
        assert_eq!(burst.count, 9);
        assert!(!burst.quota_exceeded);

        let burst = tx.enqueue_burst(&[0; 9]);
        assert_eq!(burst.count, 6);
        assert!(burst.quota_exceeded);
    }

    #[test]
    fn test_single_object_ops() {
        let (mut tx, mut rx) = create::<usize>(2, true, true).unwrap();

        assert_eq!(
            rx.dequeue(),
            Err(RingError::NoEntries {
                requested: 1,
                available: 0
            })
        );
        tx.enqueue(42).unwrap();
        assert!(tx.enqueue(43).is_err());
        assert_eq!(rx.dequeue(), Ok(42));
    }

    #[test]
    fn test_try_clone_respects_mode() {
        let (tx, rx) = create::<u8>(8, true, false).unwrap();
        assert!(tx.try_clone().is_none());
        assert_eq!(tx.mode(), SyncMode::Single);
        assert!(rx.try_clone().is_some());
        assert_eq!(rx.mode(), SyncMode::Multi);

        let (tx, rx) = create::<u8>(8, false, true).unwrap();
        assert!(tx.try_clone().is_some());
        assert!(rx.try_clone().is_none());
    }

    #[test]
    fn test_fifo_order_across_wraps() {
        let (mut tx, mut rx) = create::<u32>(16, true, true).unwrap();
        let mut next_in = 0u32;
        let mut next_out = 0u32;
        let mut out = [0u32; 7];

        for _ in 0..100 {
            let batch: Vec<u32> = (next_in..next_in + 11).collect();
            let pushed = tx.enqueue_burst(&batch).count as u32;
            next_in += pushed;

            let popped = rx.dequeue_burst(&mut out);
            for &v in &out[..popped] {
                assert_eq!(v, next_out);
                next_out += 1;
            }
        }

        while let Ok(v) = rx.dequeue() {
            assert_eq!(v, next_out);
            next_out += 1;
        }
        assert_eq!(next_in, next_out);
    }

    #[test]
    fn test_handles_are_send() {
        fn assert_send<S: Send>() {}
        assert_send::<Producer<usize>>();
        assert_send::<Consumer<u64>>();
    }
}
