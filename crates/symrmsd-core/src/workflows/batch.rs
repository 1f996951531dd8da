use crate::core::matching::assignment::{AssignmentSolver, Hungarian};
use crate::core::matching::isomorphism::{GraphMatcher, Vf2Matcher};
use crate::core::models::molecule::MolecularStructure;
use crate::engine::cancel::CancelFlag;
use crate::engine::config::BatchConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of one reference/target pair. Unavailable results are never dropped from a
/// batch and never read as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RmsdResult {
    Value(f64),
    Unavailable,
}

impl RmsdResult {
    /// The RMSD, or NaN when unavailable.
    pub fn as_f64(&self) -> f64 {
        match self {
            RmsdResult::Value(v) => *v,
            RmsdResult::Unavailable => f64::NAN,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            RmsdResult::Value(v) => Some(*v),
            RmsdResult::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, RmsdResult::Value(_))
    }
}

/// Lifecycle of a pair within a batch: `Pending`, then `Running`, then one of the
/// terminal states.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed(f64),
    TimedOut,
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed(_) | JobStatus::TimedOut | JobStatus::Failed(_)
        )
    }

    pub fn result(&self) -> RmsdResult {
        match self {
            JobStatus::Completed(v) => RmsdResult::Value(*v),
            _ => RmsdResult::Unavailable,
        }
    }
}

/// Final status of every pair, in target order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub statuses: Vec<JobStatus>,
}

impl BatchReport {
    pub fn results(&self) -> Vec<RmsdResult> {
        self.statuses.iter().map(JobStatus::result).collect()
    }

    /// Results as plain numbers, with NaN marking unavailable pairs.
    pub fn values(&self) -> Vec<f64> {
        self.statuses
            .iter()
            .map(|status| status.result().as_f64())
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Completed(_)))
    }

    pub fn timed_out_count(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::TimedOut))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, JobStatus::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&JobStatus) -> bool) -> usize {
        self.statuses.iter().filter(|s| predicate(s)).count()
    }
}

/// One reference compared against many targets, with the strategies used for symmetry
/// correction.
pub struct BatchJob<M: ?Sized> {
    reference: Arc<M>,
    targets: Vec<Arc<M>>,
    config: BatchConfig,
    matcher: Arc<dyn GraphMatcher>,
    solver: Arc<dyn AssignmentSolver>,
}

impl<M> BatchJob<M>
where
    M: MolecularStructure + Send + Sync + ?Sized + 'static,
{
    /// Creates a job using the VF2 matcher (with the configured label policy) and the
    /// Hungarian solver.
    pub fn new(reference: Arc<M>, targets: Vec<Arc<M>>, config: BatchConfig) -> Self {
        let matcher = Arc::new(Vf2Matcher::new(config.label_policy));
        Self {
            reference,
            targets,
            config,
            matcher,
            solver: Arc::new(Hungarian),
        }
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn GraphMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_solver(mut self, solver: Arc<dyn AssignmentSolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn num_targets(&self) -> usize {
        self.targets.len()
    }

    fn execute_pair(&self, index: usize) -> JobStatus {
        let (sender, receiver) = mpsc::channel();
        let cancel = CancelFlag::new();

        let reference = Arc::clone(&self.reference);
        let target = Arc::clone(&self.targets[index]);
        let matcher = Arc::clone(&self.matcher);
        let solver = Arc::clone(&self.solver);
        let settings = self.config.rmsd;
        let thread_cancel = cancel.clone();

        // Never joined: a pair that outlives its timeout is abandoned and stops at its next
        // cancellation check.
        let spawned = thread::Builder::new()
            .name(format!("rmsd-pair-{index}"))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    tasks::compare_pair(
                        &*reference,
                        &*target,
                        &settings,
                        &*matcher,
                        &*solver,
                        &thread_cancel,
                    )
                }));
                let _ = sender.send(outcome);
            });
        if let Err(e) = spawned {
            return JobStatus::Failed(format!("could not start execution thread: {e}"));
        }

        let received = match self.config.timeout {
            Some(limit) => receiver.recv_timeout(limit),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(Ok(Ok(rmsd))) => JobStatus::Completed(rmsd),
            Ok(Ok(Err(e))) => JobStatus::Failed(e.to_string()),
            Ok(Err(payload)) => JobStatus::Failed(panic_message(payload.as_ref())),
            Err(RecvTimeoutError::Timeout) => {
                cancel.cancel();
                JobStatus::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                JobStatus::Failed("execution thread exited without a result".to_string())
            }
        }
    }

    fn process_slot(&self, index: usize, slot: &mut JobStatus, reporter: &ProgressReporter) {
        *slot = JobStatus::Running;
        *slot = self.execute_pair(index);
        match slot {
            JobStatus::Completed(rmsd) => debug!(index, rmsd = *rmsd, "Pair completed."),
            JobStatus::TimedOut => {
                warn!(index, "Pair exceeded the timeout and was abandoned.");
                reporter.report(Progress::PairUnavailable {
                    index,
                    reason: "timed out".to_string(),
                });
            }
            JobStatus::Failed(reason) => {
                warn!(index, %reason, "Pair failed.");
                reporter.report(Progress::PairUnavailable {
                    index,
                    reason: reason.clone(),
                });
            }
            JobStatus::Pending | JobStatus::Running => {}
        }
        reporter.report(Progress::TaskIncrement);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("computation panicked: {detail}")
}

/// Compares the reference against every target on a fixed pool of `num_workers` threads.
///
/// Each pair runs on its own execution thread so that a pair exceeding the configured
/// timeout can be abandoned; its slot becomes [`JobStatus::TimedOut`] and the remaining
/// pairs are unaffected. Errors of a single pair likewise only mark that slot as
/// [`JobStatus::Failed`]. The report lists one status per target, in target order.
///
/// # Errors
///
/// Returns [`EngineError`] if the configuration is invalid or the worker pool cannot be
/// built.
#[instrument(skip_all, name = "batch_rmsd_workflow")]
pub fn run<M>(job: BatchJob<M>, reporter: &ProgressReporter) -> Result<BatchReport, EngineError>
where
    M: MolecularStructure + Send + Sync + ?Sized + 'static,
{
    job.config.validate()?;
    let total = job.num_targets();
    info!(
        targets = total,
        workers = job.config.num_workers,
        symmetry = ?job.config.rmsd.symmetry,
        timeout = ?job.config.timeout,
        "Starting batch RMSD computation."
    );
    reporter.report(Progress::TaskStart {
        total_steps: total as u64,
    });

    let mut statuses = vec![JobStatus::Pending; total];

    #[cfg(feature = "parallel")]
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(job.config.num_workers)
            .thread_name(|i| format!("rmsd-worker-{i}"))
            .build()
            .map_err(|e| EngineError::WorkerPool(e.to_string()))?;
        pool.install(|| {
            statuses
                .par_iter_mut()
                .enumerate()
                .for_each(|(index, slot)| job.process_slot(index, slot, reporter));
        });
    }

    #[cfg(not(feature = "parallel"))]
    {
        statuses
            .iter_mut()
            .enumerate()
            .for_each(|(index, slot)| job.process_slot(index, slot, reporter));
    }

    reporter.report(Progress::TaskFinish);
    let report = BatchReport { statuses };
    info!(
        completed = report.completed_count(),
        timed_out = report.timed_out_count(),
        failed = report.failed_count(),
        "Batch RMSD computation finished."
    );
    Ok(report)
}

/// Convenience entry point: RMSD of `reference` against each of `targets` under `config`.
pub fn batch_rmsd<M>(
    reference: &M,
    targets: &[M],
    config: &BatchConfig,
) -> Result<Vec<RmsdResult>, EngineError>
where
    M: MolecularStructure + Clone + Send + Sync + 'static,
{
    let job = BatchJob::new(
        Arc::new(reference.clone()),
        targets.iter().cloned().map(Arc::new).collect(),
        config.clone(),
    );
    Ok(run(job, &ProgressReporter::new())?.results())
}
