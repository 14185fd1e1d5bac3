/// Source of the "memory now" reading used by the resource guard.
///
/// Only deltas matter: the guard subtracts the reading captured at trace start.
pub trait MemoryProbe {
    /// Bytes currently attributed to the process by this probe.
    fn current_bytes(&self) -> i64;
}

impl<F> MemoryProbe for F
where
    F: Fn() -> i64,
{
    fn current_bytes(&self) -> i64 {
        self()
    }
}

/// Whether [`AllocProbe`] reports real numbers in this build.
pub const ALLOC_TRACKING: bool = cfg!(feature = "alloc-track");

#[cfg(feature = "alloc-track")]
mod imp {
    use stats_alloc::{INSTRUMENTED_SYSTEM, Region, StatsAlloc};
    use std::alloc::System;

    #[global_allocator]
    static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;

    pub(crate) struct AllocRegion {
        region: Region<'static, System>,
    }

    impl AllocRegion {
        pub(crate) fn new() -> Self {
            Self {
                region: Region::new(GLOBAL),
            }
        }

        pub(crate) fn net_bytes(&self) -> i64 {
            let s = self.region.change();
            (s.bytes_allocated as i64) - (s.bytes_deallocated as i64) + (s.bytes_reallocated as i64)
        }
    }
}

#[cfg(not(feature = "alloc-track"))]
mod imp {
    pub(crate) struct AllocRegion;

    impl AllocRegion {
        pub(crate) fn new() -> Self {
            Self
        }

        pub(crate) fn net_bytes(&self) -> i64 {
            0
        }
    }
}

/// Memory probe backed by the instrumented global allocator (`alloc-track` feature).
///
/// Without the feature every reading is 0, so memory budgets never trip.
pub struct AllocProbe {
    region: imp::AllocRegion,
}

impl AllocProbe {
    /// Start measuring from now.
    pub fn new() -> Self {
        Self {
            region: imp::AllocRegion::new(),
        }
    }
}

impl Default for AllocProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for AllocProbe {
    fn current_bytes(&self) -> i64 {
        self.region.net_bytes()
    }
}
