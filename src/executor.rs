//! Task execution against a module instance.
//!
//! One invocation allocates a parameter buffer inside the module, writes the
//! encoded params, times the `run_task` call and samples memory afterwards.
//! Invocations with a budget run on a worker thread raced against a
//! timer; a module that times out is abandoned and never reused.

use crate::error::{BenchError, Result};
use crate::module::{ModuleLoader, TaskModule};
use crate::params::TaskKind;
use crate::utils::cpu_affinity::CpuPinGuard;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Telemetry of one successful call
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub hash: u32,
    pub elapsed: Duration,
    pub memory_used: u64,
}

impl Measurement {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Run one invocation to completion on the calling thread
pub fn invoke(module: &mut dyn TaskModule, payload: &[u8]) -> Result<Measurement> {
    let requested = u32::try_from(payload.len()).map_err(|_| BenchError::Allocation { requested: u32::MAX })?;
    let ptr = module.alloc(requested)?;
    if ptr == 0 {
        return Err(BenchError::Allocation { requested });
    }
    module.write_memory(ptr, payload)?;

    let start = Instant::now();
    let hash = module.run_task(ptr)?;
    let elapsed = start.elapsed();

    Ok(Measurement {
        hash: std::hint::black_box(hash),
        elapsed,
        memory_used: module.memory_size(),
    })
}

/// Run one invocation on a worker thread, giving up after `timeout`.
///
/// Returns the module alongside the outcome when the call finished in time.
/// On timeout the module stays with its thread and is dropped once the
/// call eventually returns; modules that support interruption are told to stop.
pub fn invoke_with_timeout(
    mut module: Box<dyn TaskModule>,
    payload: Vec<u8>,
    timeout: Duration,
    pin_core: Option<usize>,
) -> (Option<Box<dyn TaskModule>>, Result<Measurement>) {
    let interrupt = module.interrupt_handle();
    let (tx, rx) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name(format!("run-{}-{}", module.task(), module.language()))
        .spawn(move || {
            let _pin = pin_core.map(CpuPinGuard::with_core);
            let outcome = invoke(module.as_mut(), &payload);
            // The receiver is gone after a timeout
            let _ = tx.send((module, outcome));
        });
    if let Err(e) = spawned {
        return (None, Err(BenchError::execution(format!("failed to spawn worker: {e}"))));
    }

    match rx.recv_timeout(timeout) {
        Ok((module, outcome)) => (Some(module), outcome),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            if let Some(interrupt) = interrupt {
                interrupt();
            }
            let duration_ms = timeout.as_millis() as u64;
            warn!(duration_ms, "task invocation timed out, discarding module");
            (None, Err(BenchError::Timeout { duration_ms }))
        }
        // The worker panicked before sending
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            (None, Err(BenchError::execution("task panicked")))
        }
    }
}

/// Runs the invocations of one task x language series, reloading the
/// module whenever the previous instance had to be discarded
pub struct SeriesRunner<'a, L: ModuleLoader + ?Sized> {
    loader: &'a L,
    task: TaskKind,
    language: String,
    seed: u32,
    timeout: Duration,
    pin_core: Option<usize>,
    module: Option<Box<dyn TaskModule>>,
}

impl<'a, L: ModuleLoader + ?Sized> SeriesRunner<'a, L> {
    pub fn new(loader: &'a L, task: TaskKind, language: &str, seed: u32, timeout: Duration) -> Self {
        Self {
            loader,
            task,
            language: language.to_string(),
            seed,
            timeout,
            pin_core: None,
            module: None,
        }
    }

    /// Pin worker threads to one core during calls
    pub fn with_pin_core(mut self, core: Option<usize>) -> Self {
        self.pin_core = core;
        self
    }

    fn module(&mut self) -> Result<Box<dyn TaskModule>> {
        match self.module.take() {
            Some(module) => Ok(module),
            None => {
                let mut module = self.loader.load(self.task, &self.language)?;
                module.init(self.seed)?;
                debug!(task = %self.task, language = %self.language, "module ready");
                Ok(module)
            }
        }
    }

    /// One timed invocation with `payload`
    pub fn run(&mut self, payload: &[u8]) -> Result<Measurement> {
        let module = self.module()?;
        let (module, outcome) = invoke_with_timeout(module, payload.to_vec(), self.timeout, self.pin_core);
        self.module = module;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::module::{NativeLoader, NativeModule};
    use crate::params::MatrixMulParams;

    fn slow_task(_params: &[u8]) -> u32 {
        thread::sleep(Duration::from_millis(300));
        7
    }

    struct SlowLoader;

    impl ModuleLoader for SlowLoader {
        fn load(&self, task: TaskKind, language: &str) -> Result<Box<dyn TaskModule>> {
            Ok(Box::new(NativeModule::new(task, language, slow_task)))
        }
    }

    #[test]
    fn test_invoke_reports_hash_and_memory() {
        let mut module = NativeModule::new(
            TaskKind::MatrixMul,
            "rust",
            crate::tasks::matrix_mul::matrix_mul_run_task,
        );
        let payload = codec::encode(&MatrixMulParams { dimension: 2, seed: 12345 }.into());
        let m = invoke(&mut module, &payload).unwrap();
        assert_eq!(m.hash, 1_708_139_940);
        assert!(m.memory_used > 0);
        assert!(m.elapsed_ms() >= 0.0);
    }

    #[test]
    fn test_empty_payload_is_allocation_failure() {
        let mut module = NativeModule::new(TaskKind::MatrixMul, "rust", slow_task);
        match invoke(&mut module, &[]) {
            Err(BenchError::Allocation { requested: 0 }) => {}
            other => panic!("expected allocation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout_discards_module() {
        let module = SlowLoader.load(TaskKind::Mandelbrot, "slow").unwrap();
        let (module, outcome) = invoke_with_timeout(module, vec![0; 40], Duration::from_millis(20), None);
        assert!(module.is_none());
        assert!(matches!(outcome, Err(BenchError::Timeout { duration_ms: 20 })));
    }

    #[test]
    fn test_series_runner_keeps_module_between_runs() {
        let loader = NativeLoader::default();
        let payload = codec::encode(&MatrixMulParams { dimension: 2, seed: 12345 }.into());
        let mut series = SeriesRunner::new(&loader, TaskKind::MatrixMul, "rust", 1, Duration::from_secs(10));
        let first = series.run(&payload).unwrap();
        let second = series.run(&payload).unwrap();
        assert_eq!(first.hash, second.hash);
        assert!(series.module.is_some());
    }

    #[test]
    fn test_series_runner_reloads_after_timeout() {
        let mut series = SeriesRunner::new(&SlowLoader, TaskKind::Mandelbrot, "slow", 1, Duration::from_millis(20));
        assert!(series.run(&[0; 40]).is_err());
        assert!(series.module.is_none());
        series.timeout = Duration::from_secs(10);
        assert_eq!(series.run(&[0; 40]).unwrap().hash, 7);
    }

    #[test]
    fn test_unknown_language_fails_to_load() {
        let loader = NativeLoader::default();
        let mut series = SeriesRunner::new(&loader, TaskKind::MatrixMul, "zig", 1, Duration::from_secs(1));
        let err = series.run(&[0; 8]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ModuleLoad);
    }
}
