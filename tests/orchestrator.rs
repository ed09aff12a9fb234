use crosslang_bench::config::BenchConfig;
use crosslang_bench::datagen::Scale;
use crosslang_bench::error::{ErrorKind, Result};
use crosslang_bench::module::{InterruptHandle, ModuleLoader, NativeLoader, TaskModule};
use crosslang_bench::orchestrator::{Orchestrator, OrchestratorState};
use crosslang_bench::params::TaskKind;
use crosslang_bench::stats;
use crosslang_bench::verify::validate_results;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Module whose calls hang for the invocation numbers in `hang_on`
struct ScriptedModule {
    calls: Arc<AtomicUsize>,
    hang_on: &'static [usize],
    interrupted: Arc<AtomicBool>,
    memory: Vec<u8>,
}

impl TaskModule for ScriptedModule {
    fn task(&self) -> TaskKind {
        TaskKind::MatrixMul
    }

    fn language(&self) -> &str {
        "scripted"
    }

    fn init(&mut self, _seed: u32) -> Result<()> {
        Ok(())
    }

    fn alloc(&mut self, n_bytes: u32) -> Result<u32> {
        self.memory.resize(8 + n_bytes as usize, 0);
        Ok(8)
    }

    fn write_memory(&mut self, ptr: u32, bytes: &[u8]) -> Result<()> {
        let start = ptr as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn read_memory(&mut self, ptr: u32, len: u32) -> Result<Vec<u8>> {
        Ok(self.memory[ptr as usize..(ptr + len) as usize].to_vec())
    }

    fn run_task(&mut self, _ptr: u32) -> Result<u32> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_on.contains(&call) {
            std::thread::sleep(Duration::from_millis(400));
        }
        Ok(42)
    }

    fn memory_size(&mut self) -> u64 {
        self.memory.len() as u64
    }

    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        let flag = self.interrupted.clone();
        Some(Box::new(move || flag.store(true, Ordering::SeqCst)))
    }
}

struct ScriptedLoader {
    calls: Arc<AtomicUsize>,
    loads: AtomicUsize,
    hang_on: &'static [usize],
    interrupted: Arc<AtomicBool>,
}

impl ScriptedLoader {
    fn new(hang_on: &'static [usize]) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            loads: AtomicUsize::new(0),
            hang_on,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl ModuleLoader for ScriptedLoader {
    fn load(&self, _task: TaskKind, _language: &str) -> Result<Box<dyn TaskModule>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedModule {
            calls: self.calls.clone(),
            hang_on: self.hang_on,
            interrupted: self.interrupted.clone(),
            memory: Vec::new(),
        }))
    }
}

fn scripted_config(measure_runs: u32) -> BenchConfig {
    BenchConfig {
        tasks: vec![TaskKind::MatrixMul],
        languages: vec!["scripted".to_string()],
        scales: vec![Scale::Micro],
        warmup_runs: 0,
        measure_runs,
        timeout_ms: 100,
        pin_cpu: false,
        ..BenchConfig::default()
    }
}

#[test]
fn timeouts_are_recorded_without_aborting() {
    let loader = Arc::new(ScriptedLoader::new(&[2, 5, 8]));
    let mut orch = Orchestrator::new(scripted_config(10), loader.clone());
    orch.initialize().unwrap();
    let summary = orch.execute().unwrap();

    assert_eq!(summary.state, OrchestratorState::Completed);
    assert_eq!(summary.total, 10);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.succeeded, 7);

    let results = orch.results();
    let timed_out: Vec<u32> = results
        .iter()
        .filter(|r| r.error_type == Some(ErrorKind::Timeout))
        .map(|r| r.iteration)
        .collect();
    assert_eq!(timed_out, vec![2, 5, 8]);
    assert!(results.iter().filter(|r| r.success).all(|r| r.result_hash == 42));

    // Every timeout discards the module, so three reloads follow the first load
    assert_eq!(loader.loads.load(Ordering::SeqCst), 4);
    assert!(loader.interrupted.load(Ordering::SeqCst));
}

#[test]
fn failure_threshold_aborts_the_run() {
    let loader = ScriptedLoader::new(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    let config = BenchConfig {
        failure_threshold: 0.5,
        failure_check_min_runs: 4,
        ..scripted_config(12)
    };
    let mut orch = Orchestrator::new(config, loader);
    orch.initialize().unwrap();
    let err = orch.execute().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Execution);
    assert_eq!(orch.state(), OrchestratorState::Error);
    // Dispatch stops as soon as the threshold is crossed
    assert_eq!(orch.results().len(), 4);
}

#[test]
fn native_languages_agree_end_to_end() {
    let registry_languages = NativeLoader::default()
        .registry()
        .find(TaskKind::MatrixMul)
        .map(|t| t.available_languages())
        .unwrap_or_default();
    let config = BenchConfig {
        tasks: TaskKind::ALL.to_vec(),
        languages: registry_languages.iter().map(|l| l.to_string()).collect(),
        scales: vec![Scale::Micro],
        warmup_runs: 1,
        measure_runs: 4,
        pin_cpu: false,
        ..BenchConfig::default()
    };
    let mut orch = Orchestrator::new(config.clone(), NativeLoader::default());
    orch.initialize().unwrap();
    let summary = orch.execute().unwrap();
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total, orch.expected_runs());

    let validation = validate_results(orch.results(), config.seed);
    assert!(validation.consistency_issues.is_empty());
    assert!(validation.is_clean(), "{:?}", validation.mismatches);

    let reports = stats::assess_quality(orch.results(), &config.qc);
    assert_eq!(reports.len(), config.combinations());
    assert!(reports.iter().all(|r| r.successful_runs == 4));
}
