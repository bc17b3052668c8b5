// src/metrics.rs

//! Peak memory sampling for child processes.
//!
//! Memory is polled with `sysinfo` on a background thread while the child
//! runs. Sampling is best-effort:
//! - Short-lived spikes between samples are missed.
//! - If the PID cannot be inspected the tracker reports `None`.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use sysinfo::{Pid, System};

/// Interval between RSS samples.
pub const SAMPLE_EVERY: Duration = Duration::from_millis(20);

/// Tracks peak RSS of one child process until stopped.
pub struct MemoryTracker {
    stop: Arc<AtomicBool>,
    peak_kb: Arc<AtomicU64>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MemoryTracker {
    pub fn start(pid: u32, sample_every: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let peak_kb = Arc::new(AtomicU64::new(0));

        let handle = {
            let stop = Arc::clone(&stop);
            let peak_kb = Arc::clone(&peak_kb);

            thread::spawn(move || {
                let pid = Pid::from_u32(pid);
                let mut system = System::new();

                while !stop.load(Ordering::Relaxed) {
                    if !system.refresh_process(pid) {
                        break;
                    }
                    let Some(process) = system.process(pid) else {
                        break;
                    };

                    // sysinfo 0.30 reports bytes
                    peak_kb.fetch_max(process.memory() / 1024, Ordering::Relaxed);

                    thread::sleep(sample_every);
                }
            })
        };

        Self {
            stop,
            peak_kb,
            handle: Some(handle),
        }
    }

    /// Stop sampling and return the peak RSS in KB, if any sample landed.
    ///
    /// The sampler may be mid-sleep, so it is joined on the blocking pool.
    pub async fn finish(mut self) -> Option<u64> {
        self.stop.store(true, Ordering::Relaxed);

        if let Some(handle) = self.handle.take() {
            let _ = tokio::task::spawn_blocking(move || handle.join()).await;
        }

        match self.peak_kb.load(Ordering::Relaxed) {
            0 => None,
            kb => Some(kb),
        }
    }
}

impl Drop for MemoryTracker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
