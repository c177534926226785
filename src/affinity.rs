//! CPU affinity untuk thread producer/consumer
//!
//! Throughput ring sangat sensitif terhadap migrasi core (cache line index
//! pindah-pindah). Binary throughput memakai ini untuk mengunci thread ke core
//! tertentu.
//!
//! - **Linux**: `pthread_setaffinity_np` lewat `libc`
//! - **Lainnya**: return `ErrorKind::Unsupported`, tidak diam-diam sukses

use std::io;

/// Jumlah CPU maksimum yang bisa direpresentasikan `cpu_set_t`.
#[cfg(target_os = "linux")]
pub const CPU_SET_CAPACITY: usize = std::mem::size_of::<libc::cpu_set_t>() * 8;

#[cfg(not(target_os = "linux"))]
pub const CPU_SET_CAPACITY: usize = 1024;

#[inline]
fn validate_core(core: usize) -> io::Result<()> {
    if core >= CPU_SET_CAPACITY {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "core index {} exceeds CPU_SET_CAPACITY ({})",
                core, CPU_SET_CAPACITY
            ),
        ));
    }
    Ok(())
}

/// Kunci thread saat ini ke `core`.
///
/// # Errors
/// - `core >= CPU_SET_CAPACITY`
/// - core tidak termasuk cpuset proses (cgroup/taskset)
/// - platform tidak mendukung affinity per-thread
#[cfg(target_os = "linux")]
pub fn pin_current_thread_to_core(core: usize) -> io::Result<()> {
    validate_core(core)?;

    // SAFETY:
    // - cpu_set_t valid dalam keadaan zeroed
    // - core < CPU_SET_CAPACITY, jadi CPU_SET tidak keluar batas
    // - pthread_setaffinity_np return kode error langsung (bukan errno)
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(core, &mut set);

        let rc = libc::pthread_setaffinity_np(
            libc::pthread_self(),
            std::mem::size_of::<libc::cpu_set_t>(),
            &set,
        );
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread_to_core(core: usize) -> io::Result<()> {
    validate_core(core)?;
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "CPU affinity is not supported on this platform",
    ))
}

/// Jumlah CPU yang boleh dipakai proses ini (menghormati cgroup/taskset).
#[cfg(target_os = "linux")]
pub fn allowed_cpu_count() -> io::Result<usize> {
    // SAFETY: buffer cpu_set_t zeroed diisi oleh kernel
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        let rc = libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set);
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(libc::CPU_COUNT(&set) as usize)
    }
}

#[cfg(not(target_os = "linux"))]
pub fn allowed_cpu_count() -> io::Result<usize> {
    std::thread::available_parallelism().map(|n| n.get())
}
