//! Off-thread battery queries for async front-ends.
//!
//! The query itself is blocking HID I/O. The poller runs it on tokio's
//! blocking pool and hands the finished reading back, so an event loop is
//! never stalled by a device open or a read timeout.

use crate::engine::BatteryQueryEngine;
use crate::reading::BatteryReading;
use crate::transport::HidBackend;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub struct BatteryPoller<B: HidBackend + 'static> {
    engine: Arc<BatteryQueryEngine<B>>,
}

impl<B: HidBackend + 'static> Clone for BatteryPoller<B> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<B: HidBackend + 'static> BatteryPoller<B> {
    pub fn new(engine: BatteryQueryEngine<B>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &BatteryQueryEngine<B> {
        &self.engine
    }

    /// Run one query off-thread. Waits behind a query already in flight.
    pub async fn read(&self) -> BatteryReading {
        let engine = Arc::clone(&self.engine);
        match tokio::task::spawn_blocking(move || engine.query()).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, "Battery worker failed");
                BatteryReading::unavailable(e.to_string())
            }
        }
    }

    /// Run one query off-thread unless one is already in flight.
    pub async fn try_read(&self) -> Option<BatteryReading> {
        let engine = Arc::clone(&self.engine);
        match tokio::task::spawn_blocking(move || engine.try_query()).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, "Battery worker failed");
                Some(BatteryReading::unavailable(e.to_string()))
            }
        }
    }

    /// Query now and then once per `period` until `on_reading` breaks.
    pub async fn watch<F>(&self, period: Duration, mut on_reading: F)
    where
        F: FnMut(&BatteryReading) -> ControlFlow<()>,
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let reading = self.read().await;
            if on_reading(&reading).is_break() {
                debug!("Battery watch stopped");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Outcome;
    use crate::transport::mock::{descriptor, MockBackend, MockDevice};
    use crate::{pids, HP_VID};

    fn poller(value: u8) -> BatteryPoller<MockBackend> {
        let backend = MockBackend::new().with_device(
            descriptor("ii", HP_VID, pids::HP_CLOUD_II, 1, 0xFF00),
            MockDevice::new("HP", "HyperX Cloud II Wireless").battery_at(7, value),
        );
        BatteryPoller::new(BatteryQueryEngine::new(backend))
    }

    #[tokio::test]
    async fn read_hands_back_reading() {
        let p = poller(88);
        let r = p.read().await;
        assert_eq!(r.outcome, Outcome::Success { percent: 88 });
    }

    #[tokio::test]
    async fn try_read_when_idle_runs() {
        let p = poller(12);
        assert_eq!(p.try_read().await.and_then(|r| r.percent()), Some(12));
    }

    #[tokio::test]
    async fn overlapping_reads_balance_sessions() {
        let p = poller(40);
        let q = p.clone();
        let (a, b) = tokio::join!(p.read(), q.read());
        assert_eq!(a.percent(), Some(40));
        assert_eq!(b.percent(), Some(40));
        let backend = p.engine().backend();
        assert_eq!(backend.successful_open_count(), backend.close_count());
    }

    #[tokio::test]
    async fn watch_stops_on_break() {
        let p = poller(55);
        let mut seen = Vec::new();
        p.watch(Duration::from_millis(5), |r| {
            seen.push(r.percent());
            if seen.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await;
        assert_eq!(seen, vec![Some(55); 3]);
        assert_eq!(p.engine().backend().close_count(), 3);
    }
}
