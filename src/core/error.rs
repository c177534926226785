//! Error dan hasil bertipe untuk operasi ring.
//!
//! Semua kegagalan dikembalikan ke caller; ring tidak pernah panic, retry atas
//! nama caller, atau abort proses.

use thiserror::Error;

/// Kegagalan operasi ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// Jumlah slot bukan power of 2 (termasuk 0).
    #[error("slot count {slots} is not a power of two")]
    NotPowerOfTwo { slots: u32 },

    /// Watermark di luar `0..slots`. Watermark lama tidak berubah.
    #[error("watermark {count} is out of range for a ring of {slots} slots")]
    InvalidWatermark { count: u32, slots: u32 },

    /// Fixed enqueue tidak muat. Ring tidak berubah sama sekali.
    #[error("not enough room: requested {requested}, free {free}")]
    NoBuffer { requested: usize, free: u32 },

    /// Fixed dequeue kekurangan item. Ring tidak berubah sama sekali.
    #[error("not enough entries: requested {requested}, available {available}")]
    NoEntries { requested: usize, available: u32 },
}

/// Hasil sukses dari enqueue: apakah occupancy sekarang menyentuh watermark.
///
/// `Exceeded` bukan kegagalan - item sudah masuk ring. Ini sinyal backpressure
/// untuk caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Below,
    Exceeded,
}

impl Quota {
    #[inline(always)]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Quota::Exceeded)
    }
}

/// Hasil burst enqueue: jumlah item yang benar-benar masuk plus flag quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Burst {
    pub count: usize,
    pub quota_exceeded: bool,
}

impl Burst {
    #[inline(always)]
    pub(crate) const fn empty() -> Self {
        Self {
            count: 0,
            quota_exceeded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RingError::NotPowerOfTwo { slots: 6 };
        assert_eq!(err.to_string(), "slot count 6 is not a power of two");

        let err = RingError::NoBuffer {
            requested: 4,
            free: 3,
        };
        assert_eq!(err.to_string(), "not enough room: requested 4, free 3");
    }

    #[test]
    fn test_quota_flag() {
        assert!(Quota::Exceeded.is_exceeded());
        assert!(!Quota::Below.is_exceeded());
        assert_eq!(Burst::default(), Burst::empty());
    }
}
