use chrono::Local;
use std::{
    fmt::Display,
    future::Future,
};
use support_stats_config::Cadence;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Completed,
    Failed,
    /// The previous execution was still running.
    Skipped,
}

/// Runs a job now and then on every cadence boundary until cancelled.
#[derive(Debug)]
pub struct Scheduler {
    cadence: Cadence,
    cancellation_token: CancellationToken,
    running: Mutex<()>,
}

impl Scheduler {
    pub fn new(cadence: Cadence, cancellation_token: CancellationToken) -> Self {
        Self {
            cadence,
            cancellation_token,
            running: Mutex::new(()),
        }
    }

    pub async fn run<F, Fut, T, E>(&self, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        info!(cadence = %self.cadence, "running initial collection");
        self.tick(job()).await;

        loop {
            let now = Local::now();
            let next = self.cadence.next_after(&now);
            let delay = (next - now).to_std().unwrap_or_default();
            debug!(next = %next, "waiting for next collection");

            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            self.tick(job()).await;
        }

        info!("scheduler stopped");
    }

    /// Runs one execution unless another one is still in flight.
    pub async fn tick<Fut, T, E>(&self, job: Fut) -> TickOutcome
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let Ok(_running) = self.running.try_lock() else {
            warn!("previous collection still running, skipping this tick");
            return TickOutcome::Skipped;
        };

        match job.await {
            Ok(_) => TickOutcome::Completed,
            Err(err) => {
                error!("collection failed: {err}");
                TickOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
    };
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn tick_reports_the_job_result() {
        let scheduler = Scheduler::new(Cadence::Hourly, CancellationToken::new());
        assert_eq!(
            scheduler.tick(async { Ok::<_, String>(()) }).await,
            TickOutcome::Completed
        );
        assert_eq!(
            scheduler.tick(async { Err::<(), _>("boom".to_string()) }).await,
            TickOutcome::Failed
        );
    }

    #[tokio::test]
    async fn overlapping_ticks_are_skipped() {
        let scheduler = Scheduler::new(Cadence::Hourly, CancellationToken::new());
        let (release, released) = oneshot::channel::<()>();

        let slow = scheduler.tick(async move {
            let _ = released.await;
            Ok::<_, String>(())
        });
        let fast = async {
            let outcome = scheduler.tick(async { Ok::<_, String>(()) }).await;
            let _ = release.send(());
            outcome
        };

        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow, TickOutcome::Completed);
        assert_eq!(fast, TickOutcome::Skipped);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_on_each_boundary_until_cancelled() {
        let token = CancellationToken::new();
        let scheduler = Scheduler::new(Cadence::Hourly, token.clone());
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler
            .run(|| {
                let runs = runs.clone();
                let token = token.clone();
                async move {
                    if runs.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                        token.cancel();
                    }
                    Ok::<_, String>(())
                }
            })
            .await;

        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_loop() {
        let token = CancellationToken::new();
        let scheduler = Scheduler::new(Cadence::Daily, token.clone());
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler
            .run(|| {
                let runs = runs.clone();
                let token = token.clone();
                async move {
                    let run = runs.fetch_add(1, Ordering::SeqCst) + 1;
                    if run == 2 {
                        token.cancel();
                    }
                    Err::<(), _>(format!("run {run} failed"))
                }
            })
            .await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
