//! Counter operasi ring (feature `stats`)
//!
//! Tiap kategori dihitung dua kali: per panggilan ("bulk") dan per objek
//! ("objs"). Semua counter memakai `Relaxed` - ini angka observasi, bukan
//! bagian dari protokol sinkronisasi.

use crate::shim::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub(crate) struct Counter {
    bulk: AtomicU64,
    objs: AtomicU64,
}

impl Counter {
    #[inline(always)]
    pub(crate) fn record(&self, n: u32) {
        self.bulk.fetch_add(1, Ordering::Relaxed);
        self.objs.fetch_add(u64::from(n), Ordering::Relaxed);
    }

    fn load(&self) -> (u64, u64) {
        (
            self.bulk.load(Ordering::Relaxed),
            self.objs.load(Ordering::Relaxed),
        )
    }
}

/// Counter mentah yang ditanam di dalam ring.
#[derive(Default)]
pub(crate) struct RingStats {
    pub(crate) enq_success: Counter,
    pub(crate) enq_quota: Counter,
    pub(crate) enq_fail: Counter,
    pub(crate) deq_success: Counter,
    pub(crate) deq_fail: Counter,
}

impl RingStats {
    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        let (enq_success_bulk, enq_success_objs) = self.enq_success.load();
        let (enq_quota_bulk, enq_quota_objs) = self.enq_quota.load();
        let (enq_fail_bulk, enq_fail_objs) = self.enq_fail.load();
        let (deq_success_bulk, deq_success_objs) = self.deq_success.load();
        let (deq_fail_bulk, deq_fail_objs) = self.deq_fail.load();

        StatsSnapshot {
            enq_success_bulk,
            enq_success_objs,
            enq_quota_bulk,
            enq_quota_objs,
            enq_fail_bulk,
            enq_fail_objs,
            deq_success_bulk,
            deq_success_objs,
            deq_fail_bulk,
            deq_fail_objs,
        }
    }
}

/// Snapshot counter pada satu titik waktu.
///
/// Enqueue yang menembus watermark dihitung di `enq_quota_*`, bukan di
/// `enq_success_*`. Burst yang tidak memindahkan satu item pun dihitung
/// sebagai gagal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub enq_success_bulk: u64,
    pub enq_success_objs: u64,
    pub enq_quota_bulk: u64,
    pub enq_quota_objs: u64,
    pub enq_fail_bulk: u64,
    pub enq_fail_objs: u64,
    pub deq_success_bulk: u64,
    pub deq_success_objs: u64,
    pub deq_fail_bulk: u64,
    pub deq_fail_objs: u64,
}

impl StatsSnapshot {
    /// Total objek yang berhasil masuk ring (termasuk yang di atas watermark).
    pub fn enqueued_objs(&self) -> u64 {
        self.enq_success_objs + self.enq_quota_objs
    }
}

#[cfg(feature = "stats")]
macro_rules! stat_add {
    ($ring:expr, $counter:ident, $n:expr) => {
        $ring.stats.value.$counter.record($n)
    };
}

#[cfg(not(feature = "stats"))]
macro_rules! stat_add {
    ($($arg:tt)*) => {};
}

pub(crate) use stat_add;
