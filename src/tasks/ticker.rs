//! Cancellable repeating tick task

use std::{ops::ControlFlow, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::debug;

/// Period between display recomputations
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns at most one repeating tick task
///
/// Starting replaces any task already running, and cancelling aborts it
/// before returning. Dropping the ticker cancels too.
#[derive(Debug)]
pub struct Ticker {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
    starts: u64,
}

impl Ticker {
    pub fn new(name: &'static str) -> Self {
        Self { name, handle: None, starts: 0 }
    }

    /// Call `on_tick` every `period` until it breaks or the ticker is cancelled.
    ///
    /// The first call happens one full period after starting.
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        self.cancel();

        let name = self.name;
        self.starts += 1;
        debug!("Starting {} ticker", name);
        self.handle = Some(tokio::spawn(async move {
            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    debug!("{} ticker finished", name);
                    break;
                }
            }
        }));
    }

    /// Stop the tick task, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                debug!("Cancelling {} ticker", self.name);
            }
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// How many tasks this ticker has spawned
    pub fn starts(&self) -> u64 {
        self.starts
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    fn counting(count: &Arc<AtomicUsize>, stop_after: usize) -> impl FnMut() -> ControlFlow<()> + Send + 'static {
        let count = Arc::clone(count);
        move || {
            if count.fetch_add(1, Ordering::SeqCst) + 1 >= stop_after {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut ticker = Ticker::new("test");
        ticker.start(TICK_PERIOD, counting(&count, usize::MAX));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(ticker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_the_task() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut ticker = Ticker::new("test");
        ticker.start(TICK_PERIOD, counting(&count, 2));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!ticker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticking_immediately() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut ticker = Ticker::new("test");
        ticker.start(TICK_PERIOD, counting(&count, usize::MAX));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        ticker.cancel();
        assert!(!ticker.is_active());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_keeps_a_single_task() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut ticker = Ticker::new("test");
        ticker.start(TICK_PERIOD, counting(&count, usize::MAX));
        ticker.start(TICK_PERIOD, counting(&count, usize::MAX));
        assert_eq!(ticker.starts(), 2);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
