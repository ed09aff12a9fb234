//! Thread pinning for measured invocations.
//!
//! Linux pins through `sched_setaffinity`; elsewhere pinning is a no-op and
//! [`CpuPinGuard::is_pinned`] reports `false`.

#[cfg(target_os = "linux")]
mod platform {
    /// Cores in the thread's current affinity mask
    pub fn allowed_cores() -> Option<Vec<usize>> {
        let set = current_affinity()?;
        let cores: Vec<usize> = (0..libc::CPU_SETSIZE as usize)
            // SAFETY: `c` is below CPU_SETSIZE
            .filter(|&c| unsafe { libc::CPU_ISSET(c, &set) })
            .collect();
        (!cores.is_empty()).then_some(cores)
    }

    pub fn current_affinity() -> Option<libc::cpu_set_t> {
        // SAFETY: the set is zero-initialized and sized for the call
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            (libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set) == 0)
                .then_some(set)
        }
    }

    pub fn pin(core_id: usize) -> bool {
        // SAFETY: CPU_SET bounds are checked by libc against the set size
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(core_id, &mut set);
            libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) == 0
        }
    }

    pub fn restore(set: &libc::cpu_set_t) {
        // SAFETY: `set` was filled by sched_getaffinity
        unsafe {
            libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), set);
        }
    }

    pub type Saved = libc::cpu_set_t;
}

#[cfg(not(target_os = "linux"))]
mod platform {
    pub type Saved = ();

    pub fn allowed_cores() -> Option<Vec<usize>> {
        let n = std::thread::available_parallelism().ok()?.get();
        Some((0..n).collect())
    }

    pub fn current_affinity() -> Option<Saved> {
        None
    }

    pub fn pin(_core_id: usize) -> bool {
        false
    }

    pub fn restore(_set: &Saved) {}
}

/// Ids of the cores this process may run on
pub fn get_core_ids() -> Option<Vec<usize>> {
    platform::allowed_cores()
}

/// Pins the current thread to one core until dropped, then restores the
/// previous affinity mask
pub struct CpuPinGuard {
    pinned_core: Option<usize>,
    saved: Option<platform::Saved>,
}

impl CpuPinGuard {
    pub fn with_core(core_id: usize) -> Self {
        let saved = platform::current_affinity();
        let pinned = saved.is_some() && platform::pin(core_id);
        Self {
            pinned_core: pinned.then_some(core_id),
            saved,
        }
    }

    pub fn core_id(&self) -> Option<usize> {
        self.pinned_core
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_core.is_some()
    }
}

impl Drop for CpuPinGuard {
    fn drop(&mut self) {
        if let (Some(_), Some(saved)) = (self.pinned_core, &self.saved) {
            platform::restore(saved);
        }
    }
}
