use crate::state::messages::RunRequest;
use log::{debug, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

/// Periodic ingestion trigger. The first tick fires at startup, then once
/// per `period`.
pub struct PeriodicRefresher {
    run_requests: mpsc::Sender<RunRequest>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(run_requests: mpsc::Sender<RunRequest>, period: Duration) -> Self {
        Self { run_requests, period }
    }

    pub async fn run(self) {
        let mut ticks = interval(self.period);
        // Missed ticks while a run is slow are delayed, not replayed.
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            debug!("scheduled run due");
            if self.run_requests.send(RunRequest::Scheduled).await.is_err() {
                warn!("Run worker gone, stopping scheduler");
                break;
            }
        }
    }
}
