use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;

const SERVER_READY_TIMEOUT: Duration = Duration::from_secs(60);

/// How long `/slow` takes to answer.
pub const SLOW_DELAY: Duration = Duration::from_millis(200);

/// What the target server observed.
#[derive(Default)]
pub struct Observed {
    pub hits: AtomicU64,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub bodies: Mutex<Vec<serde_json::Value>>,
    pub headers: Mutex<Vec<HeaderMap>>,
}

impl Observed {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// Tracks one request for its whole lifetime.
struct InFlight(Arc<Observed>);

impl InFlight {
    fn enter(observed: &Arc<Observed>) -> Self {
        observed.hits.fetch_add(1, Ordering::SeqCst);
        let now = observed.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        observed.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(observed))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Routes:
/// - `GET /ok` answers 200 immediately
/// - `GET /slow` answers 200 after [`SLOW_DELAY`]
/// - `GET /status/:code` answers with `code`
/// - `GET /hang` never answers in any reasonable time
/// - `POST /echo` records headers and JSON body, answers with the body
pub fn router(observed: Arc<Observed>) -> Router {
    Router::new()
        .route("/ok", get(handle_ok))
        .route("/slow", get(handle_slow))
        .route("/status/:code", get(handle_status))
        .route("/hang", get(handle_hang))
        .route("/echo", post(handle_echo))
        .with_state(observed)
}

async fn handle_ok(State(observed): State<Arc<Observed>>) -> &'static str {
    let _guard = InFlight::enter(&observed);
    "ok"
}

async fn handle_slow(State(observed): State<Arc<Observed>>) -> &'static str {
    let _guard = InFlight::enter(&observed);
    tokio::time::sleep(SLOW_DELAY).await;
    "slow"
}

async fn handle_status(State(observed): State<Arc<Observed>>, Path(code): Path<u16>) -> StatusCode {
    let _guard = InFlight::enter(&observed);
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn handle_hang(State(observed): State<Arc<Observed>>) -> &'static str {
    let _guard = InFlight::enter(&observed);
    tokio::time::sleep(Duration::from_secs(3600)).await;
    "too late"
}

async fn handle_echo(
    State(observed): State<Arc<Observed>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let _guard = InFlight::enter(&observed);
    observed.headers.lock().unwrap().push(headers);
    observed.bodies.lock().unwrap().push(body.clone());
    Json(body)
}

/// Bind the target server on an ephemeral port and return its base URL.
pub async fn start_target() -> (String, Arc<Observed>) {
    let observed = Arc::new(Observed::default());
    let app = router(Arc::clone(&observed));
    let (ready_tx, ready_rx) = oneshot::channel::<SocketAddr>();

    tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
        ready_tx.send(listener.local_addr().expect("no local addr")).ok();
        axum::serve(listener, app).await.expect("target server failed");
    });

    let addr = timeout(SERVER_READY_TIMEOUT, ready_rx)
        .await
        .expect("target server did not start within 60 seconds")
        .expect("target server ready signal dropped");

    (format!("http://{addr}"), observed)
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let port = listener.local_addr().expect("no local addr").port();
    drop(listener);
    port
}
