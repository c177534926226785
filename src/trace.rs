//! Tracing untuk event konfigurasi ring.
//!
//! Aktif dengan `--features tracing`. Tanpa feature itu semua macro di sini
//! jadi no-op, jadi hot path tidak menanggung biaya apa pun.

/// Pasang tracing subscriber dengan timestamp uptime.
///
/// Panggil di awal binary atau test. Tidak melakukan apa-apa kalau feature
/// `tracing` tidak aktif.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bounded_ring=debug"));

    // try_init: binary dan test boleh memanggil lebih dari sekali
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::debug;

#[cfg(not(feature = "tracing"))]
macro_rules! debug_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use debug_noop as debug;
