//! Periodic `schedule` events.

use std::time::Duration;

use atelier_postgres::types::EventType;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{Event, EventBus, TRACING_TARGET_SCHEDULE};

/// Publishes a `schedule` event every `interval` until cancelled.
///
/// The payload is `{"fired_at": <RFC 3339>, "tick": n}` with `n` starting
/// at 1. The first event fires one full interval after start.
#[derive(Debug, Clone)]
pub struct ScheduleDriver {
    bus: EventBus,
    interval: Duration,
}

impl ScheduleDriver {
    pub fn new(bus: EventBus, interval: Duration) -> Self {
        Self { bus, interval }
    }

    /// Runs until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            target: TRACING_TARGET_SCHEDULE,
            interval_secs = self.interval.as_secs_f64(),
            "Schedule driver started"
        );

        let mut tick: u64 = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tick += 1;
                    let fired_at = jiff::Timestamp::now().to_string();
                    tracing::debug!(target: TRACING_TARGET_SCHEDULE, tick, "Schedule tick");

                    self.bus.publish(Event::new(
                        EventType::Schedule,
                        json!({ "fired_at": fired_at, "tick": tick }),
                    ));
                }
            }
        }

        tracing::info!(target: TRACING_TARGET_SCHEDULE, ticks = tick, "Schedule driver stopped");
    }

    /// Spawns the driver onto the current runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
