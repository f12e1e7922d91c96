//! HTTP listener: manual run trigger plus the read API over the store.

use crate::leagues::{League, UnknownLeague};
use crate::state::messages::RunRequest;
use crate::state::worker::LastRun;
use crate::store::{
    ChampionshipStore, LeagueTeams, RingStore, StoreError, Team, TeamRegistry, TimelineEntry,
};
use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

pub const MANUAL_TRIGGER_BODY: &str = "Cron triggered manually";

#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn RingStore>,
    pub run_requests: mpsc::Sender<RunRequest>,
    pub last_run: LastRun,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Store(e) => {
                error!("Store error while serving request: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type ServerResult<T> = Result<Json<T>, ServerError>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct IdsQuery {
    ids: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LogoQuery {
    league: Option<String>,
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TimelineQuery {
    team_ids: Option<String>,
    since: Option<String>,
}

pub fn make_app(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/run", get(trigger_run).post(trigger_run))
        .route("/runs/last", get(last_run))
        .route("/teams", get(teams))
        .route("/teams/by-id", get(teams_by_id))
        .route("/championships", get(championships_won))
        .route("/championships/losses", get(championships_lost))
        .route("/logo", get(logo))
        .with_state(ctx)
}

pub async fn serve(ctx: AppContext, bind: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding HTTP listener on {bind}"))?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, make_app(ctx)).await.context("HTTP server failed")
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Enqueue a run and answer immediately; the worker picks it up in order.
async fn trigger_run(State(ctx): State<AppContext>) -> Response {
    match ctx.run_requests.try_send(RunRequest::Manual) {
        Ok(()) => info!("Manual run queued"),
        Err(TrySendError::Full(_)) => info!("Run queue full, manual trigger folded into pending run"),
        Err(TrySendError::Closed(_)) => {
            error!("Run worker is not running, dropping manual trigger");
            return (StatusCode::SERVICE_UNAVAILABLE, "Run worker unavailable").into_response();
        }
    }
    (StatusCode::OK, MANUAL_TRIGGER_BODY).into_response()
}

async fn last_run(State(ctx): State<AppContext>) -> Response {
    match ctx.last_run.read().await.clone() {
        Some(summary) => Json(summary).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no run has completed yet" })),
        )
            .into_response(),
    }
}

async fn teams(State(ctx): State<AppContext>) -> ServerResult<Vec<LeagueTeams>> {
    Ok(Json(ctx.store.teams_by_league()?))
}

async fn teams_by_id(
    State(ctx): State<AppContext>,
    Query(query): Query<IdsQuery>,
) -> ServerResult<Vec<Team>> {
    let ids = parse_ids(query.ids.as_deref())?;
    Ok(Json(ctx.store.teams_by_ids(&ids)?))
}

async fn championships_won(
    State(ctx): State<AppContext>,
    Query(query): Query<TimelineQuery>,
) -> ServerResult<Vec<TimelineEntry>> {
    let (ids, since) = query.parse()?;
    Ok(Json(ctx.store.championships_won(&ids, since)?))
}

async fn championships_lost(
    State(ctx): State<AppContext>,
    Query(query): Query<TimelineQuery>,
) -> ServerResult<Vec<TimelineEntry>> {
    let (ids, since) = query.parse()?;
    Ok(Json(ctx.store.championships_lost(&ids, since)?))
}

/// Sends the client to ESPN's CDN for a team or league logo.
async fn logo(Query(query): Query<LogoQuery>) -> Result<Redirect, ServerError> {
    let raw = query
        .league
        .as_deref()
        .ok_or_else(|| ServerError::BadRequest("missing league parameter".into()))?;
    let league: League = raw
        .parse()
        .map_err(|e: UnknownLeague| ServerError::BadRequest(e.to_string()))?;
    let id = query.id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    Ok(Redirect::temporary(&league.logo_url(id)))
}

impl TimelineQuery {
    /// Absent `since` means no lower bound.
    fn parse(&self) -> Result<(Vec<i64>, NaiveDate), ServerError> {
        let ids = parse_ids(self.team_ids.as_deref())?;
        let since = match self.since.as_deref().map(str::trim) {
            None | Some("") => NaiveDate::MIN,
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ServerError::BadRequest(format!("invalid since date {raw:?}, expected YYYY-MM-DD")))?,
        };
        Ok((ids, since))
    }
}

/// Comma-separated integer ids. Empty entries are ignored.
fn parse_ids(raw: Option<&str>) -> Result<Vec<i64>, ServerError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ServerError::BadRequest(format!("invalid team id {s:?}")))
        })
        .collect()
}
