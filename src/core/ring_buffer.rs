//! Lock-Free Bounded Ring untuk handoff referensi objek antar thread
//!
//! Index producer dan consumer adalah counter 32-bit yang terus naik (mod 2^32);
//! posisi slot didapat dari `index & mask`. Satu slot selalu dibiarkan kosong,
//! jadi kapasitas efektif `slots - 1` dan "penuh" vs "kosong" bisa dibedakan
//! tanpa counter tambahan.
//!
//! Mode multi-producer/consumer memakai CAS pada `head` lalu menunggu giliran
//! publish di `tail`. Mode single melewati CAS, tapi tetap publish `tail`
//! dengan `Release` supaya thread di core lain tidak melihat tail maju sebelum
//! slot-nya selesai ditulis.

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::{self, MaybeUninit};
use std::ptr;

use super::config::SyncMode;
use super::error::{Quota, RingError};
use super::stats::stat_add;
#[cfg(feature = "stats")]
use super::stats::{RingStats, StatsSnapshot};
use crate::shim::atomic::{AtomicU32, Ordering};
use crate::shim::hint;
use crate::trace;

/// Fixed = semua atau tidak sama sekali; Variable = sebanyak yang muat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Fixed,
    Variable,
}

/// Slot dalam ring - layout identik dengan `T`
#[repr(transparent)]
struct Slot<T> {
    data: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    const fn new() -> Self {
        Self {
            data: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// Padding untuk cache line isolation (64 bytes pada x86-64)
#[repr(C, align(64))]
struct CacheLinePadded<T> {
    value: T,
}

impl<T> CacheLinePadded<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

/// Konfigurasi yang hampir selalu read-only.
struct Common {
    slots: u32,
    mask: u32,
    // Boleh diubah kapan saja; hanya dibaca saat menghitung quota
    watermark: AtomicU32,
    producer: SyncMode,
    consumer: SyncMode,
}

/// Pasangan index satu sisi. `head` = sudah di-reserve, `tail` = sudah publish.
struct HeadTail {
    head: AtomicU32,
    tail: AtomicU32,
}

impl HeadTail {
    fn new() -> Self {
        Self {
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
        }
    }

    /// Publish region `[head, next)` yang sudah selesai ditulis/dibaca.
    ///
    /// Di mode multi, tunggu sampai semua pemenang CAS sebelumnya publish
    /// duluan; urutan tail mengikuti urutan CAS.
    #[inline(always)]
    fn publish(&self, head: u32, next: u32, mode: SyncMode) {
        if mode == SyncMode::Multi {
            while self.tail.load(Ordering::Acquire) != head {
                hint::spin_loop();
            }
        }
        self.tail.store(next, Ordering::Release);
    }
}

/// Region index yang sudah dimiliki eksklusif oleh satu pemanggil.
struct Reservation {
    head: u32,
    next: u32,
    n: u32,
    /// `free_entries` (enqueue) atau `entries` (dequeue) saat reserve
    room: u32,
}

/// Berapa item yang diambil untuk permintaan `requested` bila tersedia `room`.
#[inline(always)]
fn fit(requested: u32, room: u32, behavior: Behavior) -> Option<u32> {
    if requested <= room {
        return Some(requested);
    }
    match behavior {
        Behavior::Fixed => None,
        Behavior::Variable if room == 0 => None,
        Behavior::Variable => Some(room),
    }
}

/// Lihat `&mut [T]` sebagai buffer tujuan dequeue.
///
/// # Safety
/// Caller hanya boleh menulis nilai `T` yang valid ke slice hasilnya.
#[inline(always)]
pub(crate) unsafe fn as_uninit_mut<T>(out: &mut [T]) -> &mut [MaybeUninit<T>] {
    &mut *(out as *mut [T] as *mut [MaybeUninit<T>])
}

/// Lock-Free Bounded Ring
///
/// Index producer, index consumer, dan konfigurasi masing-masing di cache line
/// sendiri supaya tidak terjadi false sharing. Storage adalah satu array
/// kontigu berisi `slots` referensi, dialokasikan sekali saat `new`.
///
/// Operasi enqueue/dequeue hanya bisa dipanggil lewat [`Producer`] dan
/// [`Consumer`]; method query di sini aman dipanggil dari thread mana pun.
///
/// [`Producer`]: crate::core::Producer
/// [`Consumer`]: crate::core::Consumer
#[repr(C)]
pub struct BoundedRing<T> {
    common: CacheLinePadded<Common>,
    prod: CacheLinePadded<HeadTail>,
    cons: CacheLinePadded<HeadTail>,
    #[cfg(feature = "stats")]
    stats: CacheLinePadded<RingStats>,
    // Pre-allocated di heap - tidak pernah di-resize
    buffer: Box<[Slot<T>]>,
}

// SAFETY: BoundedRing aman untuk Send/Sync karena:
// - Region slot dimiliki eksklusif oleh pemenang CAS (atau satu-satunya
//   producer/consumer di mode single, dijamin oleh handle)
// - Tail di-publish dengan Release dan dibaca dengan Acquire
unsafe impl<T: Send> Send for BoundedRing<T> {}
unsafe impl<T: Send> Sync for BoundedRing<T> {}

impl<T: Copy> BoundedRing<T> {
    /// Membuat ring baru. `slots` HARUS power of 2 dan > 0.
    ///
    /// Semua index mulai dari 0 dan watermark dimatikan (`= slots`).
    pub(crate) fn new(
        slots: u32,
        producer: SyncMode,
        consumer: SyncMode,
    ) -> Result<Self, RingError> {
        if !slots.is_power_of_two() {
            return Err(RingError::NotPowerOfTwo { slots });
        }

        let buffer: Box<[Slot<T>]> = (0..slots).map(|_| Slot::new()).collect();

        trace::debug!(slots, ?producer, ?consumer, "ring created");

        Ok(Self {
            common: CacheLinePadded::new(Common {
                slots,
                mask: slots - 1,
                watermark: AtomicU32::new(slots),
                producer,
                consumer,
            }),
            prod: CacheLinePadded::new(HeadTail::new()),
            cons: CacheLinePadded::new(HeadTail::new()),
            #[cfg(feature = "stats")]
            stats: CacheLinePadded::new(RingStats::default()),
            buffer,
        })
    }

    /// Ukuran alokasi total untuk ring dengan `slots` slot.
    ///
    /// Header (termasuk padding cache line) ditambah `slots` referensi.
    pub fn bytes_with_slots(slots: u32) -> usize {
        mem::size_of::<Self>() + slots as usize * mem::size_of::<T>()
    }

    /// Enqueue `items` dengan behavior tertentu.
    ///
    /// Return `(jumlah masuk, quota)`. Fixed yang tidak muat gagal dengan
    /// `NoBuffer`; Variable yang tidak dapat ruang sama sekali return 0.
    ///
    /// # Safety
    /// Kalau producer ring ini `SyncMode::Single`, caller harus satu-satunya
    /// thread yang sedang enqueue.
    #[inline(always)]
    pub(crate) unsafe fn enqueue(
        &self,
        items: &[T],
        behavior: Behavior,
    ) -> Result<(usize, Quota), RingError> {
        let requested = u32::try_from(items.len()).unwrap_or(u32::MAX);

        let r = match self.move_prod_head(requested, behavior) {
            Ok(r) => r,
            Err(free) => {
                stat_add!(self, enq_fail, requested);
                return match behavior {
                    Behavior::Fixed => Err(RingError::NoBuffer {
                        requested: items.len(),
                        free,
                    }),
                    Behavior::Variable => Ok((0, Quota::Below)),
                };
            }
        };

        // SAFETY: [r.head, r.next) sudah milik kita sampai tail di-publish
        self.write_slots(r.head, &items[..r.n as usize]);

        // quota_level = slots - free + n = occupancy setelah enqueue + 1,
        // jadi `> watermark` sama dengan occupancy >= watermark
        let quota_level = self.common.value.slots - r.room + r.n;
        let quota = if quota_level > self.common.value.watermark.load(Ordering::Relaxed) {
            stat_add!(self, enq_quota, r.n);
            Quota::Exceeded
        } else {
            stat_add!(self, enq_success, r.n);
            Quota::Below
        };

        self.prod
            .value
            .publish(r.head, r.next, self.common.value.producer);

        Ok((r.n as usize, quota))
    }

    /// Dequeue ke `out` dengan behavior tertentu. Return jumlah item terbaca.
    ///
    /// # Safety
    /// Kalau consumer ring ini `SyncMode::Single`, caller harus satu-satunya
    /// thread yang sedang dequeue.
    #[inline(always)]
    pub(crate) unsafe fn dequeue(
        &self,
        out: &mut [MaybeUninit<T>],
        behavior: Behavior,
    ) -> Result<usize, RingError> {
        let requested = u32::try_from(out.len()).unwrap_or(u32::MAX);

        let r = match self.move_cons_head(requested, behavior) {
            Ok(r) => r,
            Err(available) => {
                stat_add!(self, deq_fail, requested);
                return match behavior {
                    Behavior::Fixed => Err(RingError::NoEntries {
                        requested: out.len(),
                        available,
                    }),
                    Behavior::Variable => Ok(0),
                };
            }
        };

        self.read_slots(r.head, &mut out[..r.n as usize]);

        stat_add!(self, deq_success, r.n);
        self.cons
            .value
            .publish(r.head, r.next, self.common.value.consumer);

        Ok(r.n as usize)
    }

    /// Reserve ruang di sisi producer. `Err(free_entries)` kalau tidak muat.
    #[inline(always)]
    fn move_prod_head(&self, requested: u32, behavior: Behavior) -> Result<Reservation, u32> {
        let mask = self.common.value.mask;
        let prod = &self.prod.value;

        loop {
            let head = prod.head.load(Ordering::Relaxed);
            let cons_tail = self.cons.value.tail.load(Ordering::Acquire);

            // Unsigned 32-bit: hasilnya selalu di [0, slots-1] walau
            // head sudah wrap dan cons_tail belum
            let free = mask.wrapping_add(cons_tail).wrapping_sub(head);

            let n = fit(requested, free, behavior).ok_or(free)?;
            let next = head.wrapping_add(n);

            match self.common.value.producer {
                SyncMode::Single => {
                    prod.head.store(next, Ordering::Relaxed);
                }
                SyncMode::Multi => {
                    if prod
                        .head
                        .compare_exchange_weak(head, next, Ordering::Relaxed, Ordering::Relaxed)
                        .is_err()
                    {
                        continue;
                    }
                }
            }

            return Ok(Reservation {
                head,
                next,
                n,
                room: free,
            });
        }
    }

    /// Reserve item di sisi consumer. `Err(entries)` kalau kurang.
    #[inline(always)]
    fn move_cons_head(&self, requested: u32, behavior: Behavior) -> Result<Reservation, u32> {
        let cons = &self.cons.value;

        loop {
            let head = cons.head.load(Ordering::Relaxed);
            let prod_tail = self.prod.value.tail.load(Ordering::Acquire);

            let entries = prod_tail.wrapping_sub(head);

            let n = fit(requested, entries, behavior).ok_or(entries)?;
            let next = head.wrapping_add(n);

            match self.common.value.consumer {
                SyncMode::Single => {
                    cons.head.store(next, Ordering::Relaxed);
                }
                SyncMode::Multi => {
                    if cons
                        .head
                        .compare_exchange_weak(head, next, Ordering::Relaxed, Ordering::Relaxed)
                        .is_err()
                    {
                        continue;
                    }
                }
            }

            return Ok(Reservation {
                head,
                next,
                n,
                room: entries,
            });
        }
    }

    #[inline(always)]
    fn base_ptr(&self) -> *mut T {
        // Slot dan MaybeUninit sama-sama transparent terhadap T
        UnsafeCell::raw_get(self.buffer.as_ptr().cast::<UnsafeCell<MaybeUninit<T>>>()).cast::<T>()
    }

    /// Salin `items` ke slot mulai dari `head`, dipecah di batas wraparound.
    ///
    /// # Safety
    /// Region `[head, head + items.len())` harus milik caller.
    #[inline(always)]
    unsafe fn write_slots(&self, head: u32, items: &[T]) {
        let slots = self.buffer.len();
        let idx = (head & self.common.value.mask) as usize;
        let base = self.base_ptr();

        let first = (slots - idx).min(items.len());
        ptr::copy_nonoverlapping(items.as_ptr(), base.add(idx), first);

        if first < items.len() {
            ptr::copy_nonoverlapping(items.as_ptr().add(first), base, items.len() - first);
        }
    }

    /// Salin slot mulai dari `head` ke `out`, dipecah di batas wraparound.
    ///
    /// # Safety
    /// Region `[head, head + out.len())` harus milik caller dan sudah di-publish
    /// oleh producer.
    #[inline(always)]
    unsafe fn read_slots(&self, head: u32, out: &mut [MaybeUninit<T>]) {
        let slots = self.buffer.len();
        let idx = (head & self.common.value.mask) as usize;
        let base = self.base_ptr();
        let dst = out.as_mut_ptr().cast::<T>();

        let first = (slots - idx).min(out.len());
        ptr::copy_nonoverlapping(base.add(idx), dst, first);

        if first < out.len() {
            ptr::copy_nonoverlapping(base, dst.add(first), out.len() - first);
        }
    }
}

impl<T> BoundedRing<T> {
    /// Set watermark. `0` mematikan watermark (kembali ke `slots`).
    ///
    /// Hanya berlaku untuk operasi berikutnya. Nilai `>= slots` ditolak dan
    /// watermark lama tidak berubah.
    pub fn set_watermark(&self, count: u32) -> Result<(), RingError> {
        let slots = self.common.value.slots;
        if count >= slots {
            return Err(RingError::InvalidWatermark { count, slots });
        }

        let watermark = if count == 0 { slots } else { count };
        self.common
            .value
            .watermark
            .store(watermark, Ordering::Relaxed);

        trace::debug!(watermark, slots, "watermark updated");
        Ok(())
    }

    /// Watermark aktif (`capacity()` berarti mati)
    #[inline(always)]
    pub fn watermark(&self) -> u32 {
        self.common.value.watermark.load(Ordering::Relaxed)
    }

    /// Jumlah slot (power of 2)
    #[inline(always)]
    pub fn capacity(&self) -> u32 {
        self.common.value.slots
    }

    /// Jumlah item maksimum yang bisa ditampung sekaligus: `slots - 1`
    #[inline(always)]
    pub fn usable_capacity(&self) -> u32 {
        self.common.value.mask
    }

    /// `true` kalau ring dibuat dengan producer `SyncMode::Single`
    #[inline(always)]
    pub fn is_single_producer(&self) -> bool {
        self.common.value.producer == SyncMode::Single
    }

    /// `true` kalau ring dibuat dengan consumer `SyncMode::Single`
    #[inline(always)]
    pub fn is_single_consumer(&self) -> bool {
        self.common.value.consumer == SyncMode::Single
    }

    #[inline(always)]
    fn tails(&self) -> (u32, u32) {
        let cons_tail = self.cons.value.tail.load(Ordering::Acquire);
        let prod_tail = self.prod.value.tail.load(Ordering::Acquire);
        (prod_tail, cons_tail)
    }

    /// Jumlah item dalam ring (snapshot, bisa langsung basi)
    #[inline(always)]
    pub fn count(&self) -> u32 {
        let (prod_tail, cons_tail) = self.tails();
        prod_tail.wrapping_sub(cons_tail) & self.common.value.mask
    }

    /// Jumlah slot kosong yang bisa diisi (snapshot)
    #[inline(always)]
    pub fn free_count(&self) -> u32 {
        let (prod_tail, cons_tail) = self.tails();
        cons_tail.wrapping_sub(prod_tail).wrapping_sub(1) & self.common.value.mask
    }

    /// Cek apakah ring penuh (snapshot)
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.free_count() == 0
    }

    /// Cek apakah ring kosong (snapshot)
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        let (prod_tail, cons_tail) = self.tails();
        prod_tail == cons_tail
    }

    /// Snapshot counter operasi sejak ring dibuat.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.value.snapshot()
    }
}

impl<T> fmt::Debug for BoundedRing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedRing")
            .field("slots", &self.common.value.slots)
            .field("watermark", &self.watermark())
            .field("producer", &self.common.value.producer)
            .field("consumer", &self.common.value.consumer)
            .field("count", &self.count())
            .finish()
    }
}
