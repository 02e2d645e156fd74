use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::{Duration, sleep};

pub const PATH_INDEX: &str = "/";
pub const PATH_SEARCH: &str = "/api/v1/search";
pub const PATH_MEDIA_ITEMS: &str = "/api/v1/media_items";
pub const PATH_EPG: &str = "/api/v1/epg";

/// What every API endpoint answers with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseMode {
    /// `200` with the regular `{ total_items, items }` JSON envelope.
    #[default]
    Ok,
    /// `500` with a plain-text body.
    ServerError,
    /// `200` with a body that is not JSON.
    Malformed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TestServerOptions {
    /// Fixed delay applied before answering any API request.
    pub delay: Duration,
    pub mode: ResponseMode,
}

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    search_total: Arc<AtomicU64>,
    media_items_total: Arc<AtomicU64>,
    epg_total: Arc<AtomicU64>,
}

impl TestServerStats {
    pub fn search_total(&self) -> u64 {
        self.search_total.load(Ordering::Relaxed)
    }

    pub fn media_items_total(&self) -> u64 {
        self.media_items_total.load(Ordering::Relaxed)
    }

    pub fn epg_total(&self) -> u64 {
        self.epg_total.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
struct AppState {
    stats: TestServerStats,
    opts: TestServerOptions,
}

impl AppState {
    async fn finish(&self, ok: Response) -> Response {
        if !self.opts.delay.is_zero() {
            sleep(self.opts.delay).await;
        }

        match self.opts.mode {
            ResponseMode::Ok => ok,
            ResponseMode::ServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
            ResponseMode::Malformed => (StatusCode::OK, "<html>oops</html>").into_response(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    limit: usize,
    #[serde(default)]
    offset: usize,
    #[serde(default)]
    query: Option<String>,
}

impl ListQuery {
    /// `limit=0` means "no limit".
    fn page<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let rest = items.iter().skip(self.offset).cloned();
        if self.limit == 0 {
            rest.collect()
        } else {
            rest.take(self.limit).collect()
        }
    }
}

#[derive(Debug, Serialize)]
struct ListResponse<T> {
    total_items: usize,
    items: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
struct MediaItem {
    id: u32,
    name: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    year: &'static str,
    rating: f64,
}

#[derive(Debug, Clone, Serialize)]
struct Epg {
    id: u32,
    name: &'static str,
    start_time: u64,
    end_time: u64,
    genre: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct SearchItem {
    #[serde(rename = "type")]
    kind: &'static str,
    media_item: MediaItem,
}

fn media_items() -> Vec<MediaItem> {
    const NAMES: [(&str, &str, &str, f64); 6] = [
        ("Long Term Plans", "film", "2014", 7.1),
        ("Terminal Velocity", "film", "1994", 5.4),
        ("Night Shift", "series", "2019", 6.8),
        ("Short Term Memory", "series", "2021", 7.9),
        ("Harbor Lights", "film", "2008", 6.2),
        ("Quiet Valley", "film", "2017", 7.4),
    ];

    NAMES
        .iter()
        .zip(1u32..)
        .map(|(&(name, kind, year, rating), id)| MediaItem {
            id,
            name,
            kind,
            year,
            rating,
        })
        .collect()
}

fn epgs() -> Vec<Epg> {
    const SHOWS: [(&str, &str); 4] = [
        ("Morning News", "news"),
        ("Cooking Hour", "lifestyle"),
        ("Match Day", "sports"),
        ("Late Movie", "film"),
    ];

    SHOWS
        .iter()
        .zip(0u64..)
        .map(|(&(name, genre), idx)| Epg {
            id: (idx + 1) as u32,
            name,
            start_time: 1_500_000_000 + idx * 3600,
            end_time: 1_500_000_000 + (idx + 1) * 3600,
            genre,
        })
        .collect()
}

async fn handle_index() -> &'static str {
    "Oops!"
}

async fn handle_search(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Response {
    state.stats.search_total.fetch_add(1, Ordering::Relaxed);

    let needle = q.query.as_deref().unwrap_or("").to_ascii_lowercase();
    let matched: Vec<SearchItem> = media_items()
        .into_iter()
        .filter(|m| m.name.to_ascii_lowercase().contains(&needle))
        .map(|media_item| SearchItem {
            kind: "media_item",
            media_item,
        })
        .collect();

    let res = ListResponse {
        total_items: matched.len(),
        items: q.page(&matched),
    };
    state.finish(Json(res).into_response()).await
}

async fn handle_media_items(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Response {
    state.stats.media_items_total.fetch_add(1, Ordering::Relaxed);

    let all = media_items();
    let res = ListResponse {
        total_items: all.len(),
        items: q.page(&all),
    };
    state.finish(Json(res).into_response()).await
}

async fn handle_epg(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Response {
    state.stats.epg_total.fetch_add(1, Ordering::Relaxed);

    let all = epgs();
    let res = ListResponse {
        total_items: all.len(),
        items: q.page(&all),
    };
    state.finish(Json(res).into_response()).await
}

pub fn router(stats: TestServerStats, opts: TestServerOptions) -> Router {
    Router::new()
        .route(PATH_INDEX, get(handle_index))
        .route(PATH_SEARCH, get(handle_search))
        .route(PATH_MEDIA_ITEMS, get(handle_media_items))
        .route(PATH_EPG, get(handle_epg))
        .with_state(AppState { stats, opts })
}

pub struct TestServer {
    base_url: String,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(TestServerOptions::default()).await
    }

    pub async fn start_with(opts: TestServerOptions) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::default();
        let app = router(stats.clone(), opts);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}
