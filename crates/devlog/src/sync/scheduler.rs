//! Periodic auto-sync.
//!
//! The loop waits on a [`Ticker`] obtained from a [`Scheduler`] and calls
//! [`SyncOrchestrator::trigger_sync`] on every tick, the same entry point a
//! manual trigger uses. Auto-sync being switched off only silences ticks; the
//! loop keeps running so switching it back on needs no restart. When the
//! configured interval changes the ticker is rebuilt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::entries::EntryStore;
use crate::source::EventSource;

use super::orchestrator::SyncOrchestrator;
use super::progress::SyncProgress;

/// A stream of trigger instants.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick. Returns `false` once no more ticks will come.
    async fn tick(&mut self) -> bool;
}

/// Hands out tickers for a period.
pub trait Scheduler: Send + Sync {
    type Ticker: Ticker;

    fn every(&self, period: Duration) -> Self::Ticker;
}

impl<T: Scheduler + ?Sized> Scheduler for Arc<T> {
    type Ticker = T::Ticker;

    fn every(&self, period: Duration) -> T::Ticker {
        (**self).every(period)
    }
}

/// Ticks every period on the tokio clock. The first tick is one period out.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// [`Scheduler`] backed by [`tokio::time::interval_at`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    type Ticker = IntervalTicker;

    fn every(&self, period: Duration) -> IntervalTicker {
        IntervalTicker::new(period)
    }
}

/// Scheduler whose ticks are fired by hand through a [`ManualTrigger`].
///
/// Every ticker it hands out shares one channel, so rebuilding the ticker
/// after an interval change keeps the same trigger working.
pub struct ManualScheduler {
    ticks: Arc<Mutex<mpsc::Receiver<()>>>,
    periods: std::sync::Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn channel() -> (ManualTrigger, Self) {
        let (tx, rx) = mpsc::channel(16);
        let scheduler = Self {
            ticks: Arc::new(Mutex::new(rx)),
            periods: std::sync::Mutex::new(Vec::new()),
        };
        (ManualTrigger { tx }, scheduler)
    }

    /// Periods requested so far, in order.
    pub fn periods(&self) -> Vec<Duration> {
        self.periods
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Scheduler for ManualScheduler {
    type Ticker = ManualTicker;

    fn every(&self, period: Duration) -> ManualTicker {
        self.periods
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(period);
        ManualTicker {
            ticks: Arc::clone(&self.ticks),
        }
    }
}

/// Fires ticks for a [`ManualScheduler`]. Dropping every trigger ends the schedule.
#[derive(Clone)]
pub struct ManualTrigger {
    tx: mpsc::Sender<()>,
}

impl ManualTrigger {
    /// Fire one tick. Returns `false` if the schedule is gone.
    pub async fn fire(&self) -> bool {
        self.tx.send(()).await.is_ok()
    }
}

pub struct ManualTicker {
    ticks: Arc<Mutex<mpsc::Receiver<()>>>,
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        self.ticks.lock().await.recv().await.is_some()
    }
}

/// Drive `orchestrator` from `scheduler` until `shutdown` changes or the
/// ticker ends.
pub async fn run_auto_sync<S, E, Sch>(
    orchestrator: Arc<SyncOrchestrator<S, E>>,
    scheduler: Sch,
    mut shutdown: watch::Receiver<bool>,
) where
    S: EventSource,
    E: EntryStore,
    Sch: Scheduler,
{
    let mut period = orchestrator.settings().interval();
    let mut ticker = scheduler.every(period);
    tracing::debug!(period_secs = period.as_secs(), "Auto-sync scheduled");

    loop {
        let ticked = tokio::select! {
            biased;
            _ = shutdown.changed() => false,
            ticked = ticker.tick() => ticked,
        };
        if !ticked {
            break;
        }

        let settings = orchestrator.settings();
        if settings.auto_sync_enabled {
            orchestrator.trigger_sync().await;
        } else {
            tracing::debug!("Auto-sync disabled, ignoring tick");
            orchestrator.emit(SyncProgress::AutoSyncPaused);
        }

        let next = orchestrator.settings().interval();
        if next != period {
            tracing::info!(
                from_secs = period.as_secs(),
                to_secs = next.as_secs(),
                "Sync interval changed"
            );
            period = next;
            ticker = scheduler.every(period);
        }
    }

    tracing::debug!("Auto-sync stopped");
}

/// Spawn [`run_auto_sync`] on the current runtime.
pub fn spawn_auto_sync<S, E, Sch>(
    orchestrator: Arc<SyncOrchestrator<S, E>>,
    scheduler: Sch,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: EventSource + 'static,
    E: EntryStore + 'static,
    Sch: Scheduler + 'static,
    Sch::Ticker: 'static,
{
    tokio::spawn(run_auto_sync(orchestrator, scheduler, shutdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SyncSettings;
    use crate::source::Identity;
    use crate::sync::testing::{MemoryStore, ScriptedSource, commit};
    use crate::sync::types::PipelineConfig;

    fn pipeline(
        source: &Arc<ScriptedSource>,
        settings: SyncSettings,
    ) -> Arc<SyncOrchestrator<Arc<ScriptedSource>, MemoryStore>> {
        let config = PipelineConfig::new("octocat", Identity::new("octocat", None));
        Arc::new(SyncOrchestrator::new(
            Arc::clone(source),
            MemoryStore::new(),
            config,
            settings,
        ))
    }

    #[tokio::test]
    async fn test_each_tick_triggers_a_sync() {
        let source = Arc::new(ScriptedSource::new());
        source.push_ok(vec![commit("c1", "org/app", "feat: one", 10)]);
        let orchestrator = pipeline(&source, SyncSettings::default());
        let (trigger, scheduler) = ManualScheduler::channel();
        let (_stop, shutdown) = watch::channel(false);

        let handle = spawn_auto_sync(Arc::clone(&orchestrator), scheduler, shutdown);
        assert!(trigger.fire().await);
        assert!(trigger.fire().await);
        drop(trigger);
        handle.await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(orchestrator.drafts().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_auto_sync_ignores_ticks() {
        let source = Arc::new(ScriptedSource::new());
        let settings = SyncSettings {
            auto_sync_enabled: false,
            ..Default::default()
        };
        let orchestrator = pipeline(&source, settings);
        let (trigger, scheduler) = ManualScheduler::channel();
        let (_stop, shutdown) = watch::channel(false);

        let handle = spawn_auto_sync(Arc::clone(&orchestrator), scheduler, shutdown);
        trigger.fire().await;
        trigger.fire().await;
        drop(trigger);
        handle.await.unwrap();

        assert_eq!(source.calls(), 0);
        assert!(orchestrator.last_sync_time().is_none());
    }

    #[tokio::test]
    async fn test_interval_change_rebuilds_ticker() {
        let source = Arc::new(ScriptedSource::new());
        let orchestrator = pipeline(&source, SyncSettings::default());
        let (trigger, scheduler) = ManualScheduler::channel();
        let scheduler = Arc::new(scheduler);
        let (_stop, shutdown) = watch::channel(false);

        let handle = spawn_auto_sync(Arc::clone(&orchestrator), Arc::clone(&scheduler), shutdown);
        tokio::task::yield_now().await;
        orchestrator.update_settings(SyncSettings {
            sync_interval_minutes: 2,
            ..Default::default()
        });
        trigger.fire().await;
        drop(trigger);
        handle.await.unwrap();

        assert_eq!(
            scheduler.periods(),
            vec![Duration::from_secs(600), Duration::from_secs(120)]
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let source = Arc::new(ScriptedSource::new());
        let orchestrator = pipeline(&source, SyncSettings::default());
        let (_trigger, scheduler) = ManualScheduler::channel();
        let (stop, shutdown) = watch::channel(false);

        let handle = spawn_auto_sync(Arc::clone(&orchestrator), scheduler, shutdown);
        stop.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticker_skips_immediate_tick() {
        let start = Instant::now();
        let mut ticker = TokioScheduler.every(Duration::from_secs(60));

        assert!(ticker.tick().await);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }
}
