//! Job activation and dispatch loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use engine_client::{ActivateJobsRequest, ActivatedJob, EngineClient, EngineError};
use tokio::task::JoinSet;

use crate::config::RuntimeConfig;
use crate::outcome::Outcome;
use crate::registry::HandlerRegistry;

/// Activates jobs for every registered job type and runs them concurrently.
///
/// This is the only place where handler outcomes become engine commands.
/// A `JobNotFound` answer to a command means the job was cancelled or
/// already answered by an earlier delivery and is not treated as an error.
pub struct JobWorkerRuntime<E>
where
    E: EngineClient,
{
    engine: E,
    registry: Arc<HandlerRegistry>,
    config: RuntimeConfig,
}

impl<E> JobWorkerRuntime<E>
where
    E: EngineClient + Clone + 'static,
{
    /// Creates a new runtime.
    pub fn new(engine: E, registry: HandlerRegistry, config: RuntimeConfig) -> Self {
        Self {
            engine,
            registry: Arc::new(registry),
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Runs one job to completion and sends the resulting command.
    ///
    /// Returns the handler's outcome, or the engine error if the command
    /// could not be delivered.
    pub async fn dispatch(&self, job: ActivatedJob) -> Result<Outcome, EngineError> {
        dispatch_job(&self.engine, &self.registry, job).await
    }

    /// Activates up to `max_jobs_active` jobs of each registered job type
    /// and waits for all of them to be answered.
    ///
    /// Each job type has its own budget, so a backlog of one type never
    /// holds back the others. Returns the number of jobs handled. If
    /// activation fails, jobs that were already started still finish before
    /// the error is returned.
    #[tracing::instrument(skip(self), fields(worker = %self.config.worker_name))]
    pub async fn poll_once(&self) -> Result<usize, EngineError> {
        let mut tasks = JoinSet::new();
        let mut activation_error = None;

        for job_type in self.registry.job_types() {
            let request = ActivateJobsRequest::new(
                job_type,
                self.config.worker_name.clone(),
                self.config.max_jobs_active,
                self.config.job_timeout,
            );
            let jobs = match self.engine.activate_jobs(request).await {
                Ok(jobs) => jobs,
                Err(e) => {
                    metrics::counter!("worker_activation_errors_total").increment(1);
                    activation_error = Some(e);
                    break;
                }
            };

            metrics::counter!("worker_jobs_activated_total", "job_type" => job_type)
                .increment(jobs.len() as u64);

            for job in jobs {
                let engine = self.engine.clone();
                let registry = Arc::clone(&self.registry);
                tasks.spawn(async move { dispatch_job(&engine, &registry, job).await });
            }
        }

        let mut handled = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(_)) => handled += 1,
                Ok(Err(e)) => {
                    handled += 1;
                    tracing::warn!(error = %e, "job command not delivered, engine will redeliver");
                }
                Err(e) => tracing::error!(error = %e, "job task aborted"),
            }
        }

        match activation_error {
            Some(e) => Err(e),
            None => Ok(handled),
        }
    }

    /// Polls until `shutdown` resolves. Jobs in flight when the shutdown
    /// signal arrives are finished first.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            worker = %self.config.worker_name,
            job_types = ?self.registry,
            "job worker started"
        );
        tokio::pin!(shutdown);
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = interval.tick() => {
                    match self.poll_once().await {
                        Ok(0) => {}
                        Ok(handled) => tracing::debug!(handled, "poll finished"),
                        Err(e) => tracing::warn!(error = %e, "job activation failed"),
                    }
                }
            }
        }
        tracing::info!("job worker stopped");
    }
}

#[tracing::instrument(
    skip_all,
    fields(job_key = %job.key, job_type = %job.job_type, process_instance_key = %job.process_instance_key)
)]
async fn dispatch_job<E>(
    engine: &E,
    registry: &HandlerRegistry,
    job: ActivatedJob,
) -> Result<Outcome, EngineError>
where
    E: EngineClient + ?Sized,
{
    tracing::info!(variables = %job.variables.to_value(), retries = job.retries, "job received");
    let started = Instant::now();

    let outcome = match registry.get(&job.job_type) {
        Some(handler) => handler.execute(&job).await,
        None => Outcome::technical_failure(
            0,
            format!("no handler registered for job type '{}'", job.job_type),
        ),
    };

    metrics::histogram!("worker_job_duration_seconds", "job_type" => job.job_type.clone())
        .record(started.elapsed().as_secs_f64());
    metrics::counter!(
        "worker_job_outcomes_total",
        "job_type" => job.job_type.clone(),
        "outcome" => outcome.label()
    )
    .increment(1);

    match &outcome {
        Outcome::Completed { .. } => tracing::info!("job completed"),
        Outcome::BusinessError { code, message } => {
            tracing::warn!(%code, %message, "job raised business error")
        }
        Outcome::TechnicalFailure { retries, message } => {
            tracing::error!(retries, %message, "job failed")
        }
    }

    match outcome.clone().into_command(job.key).send(engine).await {
        Ok(()) => Ok(outcome),
        Err(e) if e.is_job_not_found() => {
            tracing::info!("job no longer exists, command ignored");
            Ok(outcome)
        }
        Err(e) => {
            metrics::counter!("worker_commands_failed_total").increment(1);
            Err(e)
        }
    }
}
