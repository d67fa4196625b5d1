use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::models::ArticleChange;

use super::Stage;

/// How late a scheduled tick may fire before it is reported as past due.
const PAST_DUE_TOLERANCE: Duration = Duration::from_secs(60);

async fn invoke(stage: &dyn Stage) {
    match stage.run().await {
        Ok(written) => debug!(stage = stage.name(), written, "Stage invocation finished"),
        Err(e) => error!(stage = stage.name(), error = %e, "Stage invocation failed"),
    }
}

/// Runs `stage` every `period` until shutdown. Without `run_on_startup` the
/// first run happens one full period after start. A late tick is only logged.
pub async fn run_on_schedule(
    stage: Arc<dyn Stage>,
    period: Duration,
    run_on_startup: bool,
    mut shutdown: watch::Receiver<bool>,
) {
    let first = if run_on_startup {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut ticker = interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(stage = stage.name(), period_secs = period.as_secs(), "Schedule started");
    loop {
        tokio::select! {
            scheduled = ticker.tick() => {
                let lag = Instant::now().saturating_duration_since(scheduled);
                if lag > PAST_DUE_TOLERANCE {
                    info!(stage = stage.name(), lag_secs = lag.as_secs(), "The timer is past due");
                }
                invoke(stage.as_ref()).await;
            }
            _ = shutdown.changed() => break,
        }
    }
    debug!(stage = stage.name(), "Schedule stopped");
}

/// Runs `stage` whenever the store reports a committed change, and at least
/// every `poll` so missed notifications (or writers in other processes) are
/// still picked up. Invocations never overlap.
pub async fn run_on_change(
    stage: Arc<dyn Stage>,
    mut changes: broadcast::Receiver<ArticleChange>,
    poll: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut fallback = interval(poll);
    fallback.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(stage = stage.name(), poll_secs = poll.as_secs(), "Change trigger started");
    loop {
        tokio::select! {
            change = changes.recv() => match change {
                Ok(change) => debug!(stage = stage.name(), ?change, "Change notification"),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(stage = stage.name(), skipped, "Change feed lagged")
                }
                Err(RecvError::Closed) => break,
            },
            _ = fallback.tick() => {}
            _ = shutdown.changed() => break,
        }
        invoke(stage.as_ref()).await;
    }
    debug!(stage = stage.name(), "Change trigger stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use crate::error::{AppError, Result};

    /// Reports each invocation on a channel; the first `fail_first` runs error.
    struct Probe {
        calls: mpsc::UnboundedSender<usize>,
        fail_first: usize,
        count: std::sync::atomic::AtomicUsize,
    }

    impl Probe {
        fn new(fail_first: usize) -> (Arc<Self>, mpsc::UnboundedReceiver<usize>) {
            let (calls, rx) = mpsc::unbounded_channel();
            let probe = Arc::new(Self {
                calls,
                fail_first,
                count: Default::default(),
            });
            (probe, rx)
        }
    }

    #[async_trait]
    impl Stage for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        async fn run(&self) -> Result<usize> {
            let n = self.count.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            self.calls.send(n).ok();
            if n <= self.fail_first {
                Err(AppError::Summarize("boom".to_string()))
            } else {
                Ok(0)
            }
        }
    }

    const LONG: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn change_notifications_trigger_runs() {
        let (probe, mut calls) = Probe::new(0);
        let (changes_tx, changes_rx) = broadcast::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);

        let worker = tokio::spawn(run_on_change(probe, changes_rx, LONG, stop_rx));

        // The fallback ticks once immediately.
        assert_eq!(calls.recv().await, Some(1));

        changes_tx.send(ArticleChange::Inserted(3)).unwrap();
        assert_eq!(calls.recv().await, Some(2));

        stop_tx.send(true).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn failed_invocation_does_not_stop_the_trigger() {
        let (probe, mut calls) = Probe::new(1);
        let (changes_tx, changes_rx) = broadcast::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);

        let worker = tokio::spawn(run_on_change(probe, changes_rx, LONG, stop_rx));
        assert_eq!(calls.recv().await, Some(1));

        changes_tx.send(ArticleChange::Summarized(1)).unwrap();
        assert_eq!(calls.recv().await, Some(2));

        stop_tx.send(true).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn closed_change_feed_ends_the_trigger() {
        let (probe, mut calls) = Probe::new(0);
        let (changes_tx, changes_rx) = broadcast::channel::<ArticleChange>(8);
        let (_stop_tx, stop_rx) = watch::channel(false);

        let worker = tokio::spawn(run_on_change(probe, changes_rx, LONG, stop_rx));
        assert_eq!(calls.recv().await, Some(1));

        drop(changes_tx);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn schedule_runs_immediately_when_asked() {
        let (probe, mut calls) = Probe::new(0);
        let (stop_tx, stop_rx) = watch::channel(false);

        let worker = tokio::spawn(run_on_schedule(probe, LONG, true, stop_rx));
        assert_eq!(calls.recv().await, Some(1));

        stop_tx.send(true).unwrap();
        worker.await.unwrap();
        assert!(calls.try_recv().is_err());
    }

    #[tokio::test]
    async fn schedule_waits_a_full_period_by_default() {
        let (probe, mut calls) = Probe::new(0);
        let (stop_tx, stop_rx) = watch::channel(false);

        let worker = tokio::spawn(run_on_schedule(probe, LONG, false, stop_rx));
        tokio::time::sleep(Duration::from_millis(50)).await;

        stop_tx.send(true).unwrap();
        worker.await.unwrap();
        assert!(calls.try_recv().is_err());
    }

    /// Records when each run starts; the first run takes `first_run` to finish.
    struct SlowStage {
        starts: mpsc::UnboundedSender<Instant>,
        first_run: Duration,
        count: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Stage for SlowStage {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn run(&self) -> Result<usize> {
            self.starts.send(Instant::now()).ok();
            if self.count.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                tokio::time::sleep(self.first_run).await;
            }
            Ok(0)
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn late_tick_is_logged_and_runs_once() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let hour = Duration::from_secs(3600);
        let (starts_tx, mut starts) = mpsc::unbounded_channel();
        let stage = Arc::new(SlowStage {
            starts: starts_tx,
            first_run: 3 * hour,
            count: Default::default(),
        });
        let (stop_tx, stop_rx) = watch::channel(false);
        let began = Instant::now();

        let worker = tokio::spawn(run_on_schedule(stage, hour, false, stop_rx));
        let first = starts.recv().await.unwrap();
        let second = starts.recv().await.unwrap();
        let third = starts.recv().await.unwrap();
        stop_tx.send(true).unwrap();
        worker.await.unwrap();

        let slack = Duration::from_secs(1);
        assert!(first - began >= hour && first - began < hour + slack);
        // The overdue tick fires as soon as the slow run ends, with no catch-up burst.
        assert!(second - first >= 3 * hour && second - first < 3 * hour + slack);
        assert!(third - second >= hour - slack && third - second < hour + slack);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("The timer is past due").count(), 1);
    }
}
