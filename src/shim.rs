//! Shim antara primitive `std` dan `loom`.
//!
//! Build normal memakai `std::sync::atomic`; dengan feature `loom` semua atomic
//! dan spin hint diganti versi loom supaya interleaving bisa di-model-check.

#[cfg(not(feature = "loom"))]
pub(crate) mod atomic {
    pub use std::sync::atomic::*;
}

#[cfg(feature = "loom")]
pub(crate) mod atomic {
    pub use loom::sync::atomic::*;
}

#[cfg(not(feature = "loom"))]
pub(crate) mod sync {
    pub use std::sync::Arc;
}

#[cfg(feature = "loom")]
pub(crate) mod sync {
    pub use loom::sync::Arc;
}

#[cfg(not(feature = "loom"))]
pub(crate) mod hint {
    pub use std::hint::spin_loop;
}

#[cfg(feature = "loom")]
pub(crate) mod hint {
    pub use loom::hint::spin_loop;
}
