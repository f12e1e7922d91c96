use crate::ingest::{Ingestor, RunSummary};
use crate::leagues::LeagueConfig;
use crate::state::messages::RunRequest;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

/// Summary of the most recent completed run, shared with the HTTP listener.
pub type LastRun = Arc<RwLock<Option<RunSummary>>>;

/// Drains run requests one at a time, so scheduled and manual triggers
/// never overlap.
pub struct RunWorker {
    ingestor: Ingestor,
    leagues: &'static [LeagueConfig],
    requests: mpsc::Receiver<RunRequest>,
    last_run: LastRun,
}

impl RunWorker {
    pub fn new(
        ingestor: Ingestor,
        leagues: &'static [LeagueConfig],
        requests: mpsc::Receiver<RunRequest>,
        last_run: LastRun,
    ) -> Self {
        Self { ingestor, leagues, requests, last_run }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            info!("Starting {} run", request_label(request));
            let report = self.ingestor.run(self.leagues).await;
            *self.last_run.write().await = Some(report.summary());
            debug!("run request complete");
        }
        debug!("run request channel closed, worker exiting");
    }
}

fn request_label(request: RunRequest) -> &'static str {
    match request {
        RunRequest::Scheduled => "scheduled",
        RunRequest::Manual => "manual",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leagues::{LEAGUES, League};
    use crate::store::SqliteRingStore;
    use espn_api::client::EspnApi;
    use mockito::Matcher;

    #[tokio::test]
    async fn records_summary_of_each_run() {
        let mut server = mockito::Server::new_async().await;
        let _nba = server
            .mock("GET", "/basketball/nba/scoreboard")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"events":[]}"#)
            .create_async()
            .await;

        let store = Arc::new(SqliteRingStore::open_in_memory().unwrap());
        let ingestor = Ingestor::new(EspnApi::new().with_base_url(server.url()), store);
        let last_run = LastRun::default();
        let (tx, rx) = mpsc::channel(4);

        tx.send(RunRequest::Manual).await.unwrap();
        drop(tx);
        RunWorker::new(ingestor, &LEAGUES, rx, last_run.clone()).run().await;

        let summary = last_run.read().await.clone().unwrap();
        assert_eq!(summary.leagues.len(), LEAGUES.len());
        let nba = summary.leagues.iter().find(|l| l.league == League::Nba).unwrap();
        assert!(nba.error.is_none());
        // Unmocked leagues get a 501 from the test server: recoverable.
        assert!(summary.leagues.iter().all(|l| l.recoverable));
    }
}
