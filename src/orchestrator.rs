//! Benchmark orchestration.
//!
//! The orchestrator walks every task x language x scale series of a
//! [`BenchConfig`], sequentially or on a bounded pool of worker threads.
//! Each series performs its warmup invocations, then records one
//! [`ExecutionResult`] per measured invocation, in invocation order.
//!
//! State machine: `Idle -> Initializing -> Running -> Completed | Cancelled | Error`.

use crate::config::BenchConfig;
use crate::datagen::{Scale, TestDataGenerator};
use crate::error::{BenchError, ErrorKind, Result};
use crate::executor::SeriesRunner;
use crate::module::ModuleLoader;
use crate::params::TaskKind;
use crate::results::ExecutionResult;
use crate::utils::cpu_affinity;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Idle,
    Initializing,
    Running,
    Completed,
    Cancelled,
    Error,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Cooperative cancellation flag, checked between invocations
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One task x language x scale series
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combination {
    pub task: TaskKind,
    pub language: String,
    pub scale: Scale,
}

/// Counters shared by all workers of one run
struct Progress {
    completed: AtomicUsize,
    failed: AtomicUsize,
    aborted: AtomicBool,
    threshold: f64,
    min_runs: usize,
}

impl Progress {
    fn new(config: &BenchConfig) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            aborted: AtomicBool::new(false),
            threshold: config.failure_threshold,
            min_runs: config.failure_check_min_runs,
        }
    }

    fn record(&self, success: bool) {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let failed = if success {
            self.failed.load(Ordering::SeqCst)
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst) + 1
        };
        if completed >= self.min_runs && failed as f64 / completed as f64 > self.threshold {
            self.aborted.store(true, Ordering::SeqCst);
        }
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    fn failure_rate(&self) -> f64 {
        let completed = self.completed.load(Ordering::SeqCst);
        if completed == 0 {
            return 0.0;
        }
        self.failed.load(Ordering::SeqCst) as f64 / completed as f64
    }
}

/// Counts for a finished run
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub state: OrchestratorState,
    pub expected_runs: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64
        }
    }
}

pub struct Orchestrator<L: ModuleLoader> {
    config: BenchConfig,
    loader: L,
    state: OrchestratorState,
    cancel: CancelToken,
    expected_runs: usize,
    results: Vec<ExecutionResult>,
}

impl<L: ModuleLoader> Orchestrator<L> {
    pub fn new(config: BenchConfig, loader: L) -> Self {
        Self {
            config,
            loader,
            state: OrchestratorState::Idle,
            cancel: CancelToken::default(),
            expected_runs: 0,
            results: Vec::new(),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Token that stops dispatch of further invocations when cancelled
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Measured runs the configuration asks for, known after `initialize`
    pub fn expected_runs(&self) -> usize {
        self.expected_runs
    }

    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ExecutionResult> {
        self.results
    }

    /// Validate the configuration and compute the expected run count
    pub fn initialize(&mut self) -> Result<()> {
        if self.state != OrchestratorState::Idle {
            return Err(BenchError::InvalidState {
                state: format!("initialize called while {}", self.state),
            });
        }
        self.state = OrchestratorState::Initializing;
        if let Err(e) = self.config.validate() {
            self.state = OrchestratorState::Error;
            return Err(e);
        }
        self.expected_runs = self.config.total_runs();
        info!(
            combinations = self.config.combinations(),
            expected_runs = self.expected_runs,
            parallel = self.config.parallel,
            "benchmark initialized"
        );
        Ok(())
    }

    /// Series in dispatch order
    pub fn schedule(&self) -> Vec<Combination> {
        let mut schedule = Vec::with_capacity(self.config.combinations());
        for &task in &self.config.tasks {
            for language in &self.config.languages {
                for &scale in &self.config.scales {
                    schedule.push(Combination {
                        task,
                        language: language.clone(),
                        scale,
                    });
                }
            }
        }
        if self.config.randomize_order {
            schedule.shuffle(&mut StdRng::seed_from_u64(self.config.seed as u64));
        }
        schedule
    }

    /// Run every series. Failed invocations become failed results; the run
    /// only aborts when the failure rate crosses the configured threshold.
    pub fn execute(&mut self) -> Result<RunSummary> {
        if self.state != OrchestratorState::Initializing {
            return Err(BenchError::InvalidState {
                state: format!("execute called while {}", self.state),
            });
        }
        self.state = OrchestratorState::Running;

        let schedule = self.schedule();
        let progress = Progress::new(&self.config);
        let cores = if self.config.pin_cpu {
            cpu_affinity::get_core_ids().unwrap_or_default()
        } else {
            Vec::new()
        };

        let ctx = SeriesContext {
            config: &self.config,
            loader: &self.loader,
            cancel: &self.cancel,
            progress: &progress,
        };
        self.results = if self.config.parallel && self.config.max_parallel > 1 {
            run_parallel(&ctx, &schedule, &cores)
        } else {
            let core = cores.first().copied();
            schedule.iter().flat_map(|combo| ctx.run_series(combo, core)).collect()
        };

        let summary = self.summary();
        if progress.is_aborted() {
            self.state = OrchestratorState::Error;
            let rate = progress.failure_rate();
            warn!(failure_rate = rate, threshold = self.config.failure_threshold, "aborting run");
            return Err(BenchError::execution(format!(
                "failure rate {:.1}% exceeded threshold {:.1}%",
                rate * 100.0,
                self.config.failure_threshold * 100.0
            )));
        }
        self.state = if self.cancel.is_cancelled() {
            OrchestratorState::Cancelled
        } else {
            OrchestratorState::Completed
        };

        let summary = RunSummary {
            state: self.state,
            ..summary
        };
        info!(
            state = %summary.state,
            total = summary.total,
            failed = summary.failed,
            "benchmark finished"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        let failed = self.results.iter().filter(|r| !r.success).count();
        RunSummary {
            state: self.state,
            expected_runs: self.expected_runs,
            total: self.results.len(),
            succeeded: self.results.len() - failed,
            failed,
        }
    }
}

/// Borrowed state every series needs
struct SeriesContext<'a, L: ModuleLoader> {
    config: &'a BenchConfig,
    loader: &'a L,
    cancel: &'a CancelToken,
    progress: &'a Progress,
}

impl<L: ModuleLoader> SeriesContext<'_, L> {
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.progress.is_aborted()
    }

    /// Warmup then measured invocations of one series
    fn run_series(&self, combo: &Combination, core: Option<usize>) -> Vec<ExecutionResult> {
        let Combination { task, language, scale } = combo;
        let (task, scale) = (*task, *scale);
        let mut results = Vec::new();
        if self.should_stop() {
            return results;
        }

        // Same params for every language of a task x scale
        let payload = TestDataGenerator::new(self.config.seed).payload(task, scale);
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let mut series =
            SeriesRunner::new(self.loader, task, language, self.config.seed, timeout).with_pin_core(core);
        debug!(task = %task, language, scale = %scale, "series started");

        for _ in 0..self.config.warmup_runs {
            if self.should_stop() {
                return results;
            }
            if let Err(e) = series.run(&payload) {
                if e.kind() == ErrorKind::ModuleLoad {
                    warn!(task = %task, language, error = %e, "skipping series");
                    self.progress.record(false);
                    results.push(ExecutionResult::failure(task, language.as_str(), scale, 0, &e));
                    return results;
                }
                debug!(task = %task, language, error = %e, "warmup invocation failed");
            }
        }

        for iteration in 0..self.config.measure_runs {
            if self.should_stop() {
                break;
            }
            let result = match series.run(&payload) {
                Ok(m) => ExecutionResult::success(
                    task,
                    language.as_str(),
                    scale,
                    iteration,
                    m.elapsed_ms(),
                    m.memory_used,
                    m.hash,
                ),
                Err(e) => {
                    warn!(task = %task, language, scale = %scale, iteration, error = %e, "invocation failed");
                    ExecutionResult::failure(task, language.as_str(), scale, iteration, &e)
                }
            };
            self.progress.record(result.success);
            let load_failed = result.error_type == Some(ErrorKind::ModuleLoad);
            results.push(result);
            if load_failed {
                break;
            }
        }
        debug!(task = %task, language, scale = %scale, runs = results.len(), "series finished");
        results
    }
}

/// Bounded pool: at most `max_parallel` series run at once, each with its own
/// module instances. Output keeps schedule order.
fn run_parallel<L: ModuleLoader>(
    ctx: &SeriesContext<'_, L>,
    schedule: &[Combination],
    cores: &[usize],
) -> Vec<ExecutionResult> {
    let workers = ctx.config.max_parallel.min(schedule.len()).max(1);
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    std::thread::scope(|s| {
        for slot in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let core = (!cores.is_empty()).then(|| cores[slot % cores.len()]);
            s.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(combo) = schedule.get(index) else {
                    break;
                };
                // The receiver outlives the scope
                let _ = tx.send((index, ctx.run_series(combo, core)));
            });
        }
    });
    drop(tx);

    let mut batches: Vec<(usize, Vec<ExecutionResult>)> = rx.into_iter().collect();
    batches.sort_by_key(|(index, _)| *index);
    batches.into_iter().flat_map(|(_, results)| results).collect()
}
