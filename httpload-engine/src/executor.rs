use httpload_common::{ErrorKind, LoadTestError, Outcome, Result, Sample};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::aggregator::ResultAggregator;
use crate::config::RequestSpec;

/// One attempt at the request under test.
///
/// Implementations never fail: anything that goes wrong is reported as an
/// [`Outcome::Error`]. Each call is attempted exactly once, without retry.
pub trait Dispatch: Send + Sync + 'static {
    fn dispatch(&self) -> impl Future<Output = Outcome> + Send;
}

/// Issues the configured [`RequestSpec`] over HTTP.
pub struct HttpDispatcher {
    spec: RequestSpec,
    http_client: reqwest::Client,
}

impl HttpDispatcher {
    /// `timeout` bounds each request from send until the body is fully read.
    pub fn new(spec: RequestSpec, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadTestError::HttpClient(e.to_string()))?;
        Ok(Self { spec, http_client })
    }

    fn build_request(&self) -> reqwest::RequestBuilder {
        let request = self
            .http_client
            .request(self.spec.method(), self.spec.url().clone())
            .headers(self.spec.headers().clone());
        match self.spec.payload() {
            Some(payload) => request.json(payload),
            None => request,
        }
    }
}

impl Dispatch for HttpDispatcher {
    fn dispatch(&self) -> impl Future<Output = Outcome> + Send {
        let request = self.build_request();
        async move {
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => return Outcome::Error(classify_error(&e)),
            };
            let status = response.status().as_u16();
            // Latency runs to the end of the body, so drain it before reporting.
            match response.bytes().await {
                Ok(_) => Outcome::Status(status),
                Err(e) => Outcome::Error(classify_error(&e)),
            }
        }
    }
}

/// Map a reqwest failure onto the error classes reported in samples.
pub fn classify_error(error: &reqwest::Error) -> ErrorKind {
    if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_connect() || error.is_request() || error.is_body() {
        ErrorKind::ConnectionError
    } else {
        ErrorKind::Other
    }
}

/// Bounded pool running at most `concurrency` dispatches at once.
///
/// A slot must be taken with [`WorkerPool::acquire`] before [`WorkerPool::spawn`];
/// the slot is released the moment that dispatch finishes, before its sample
/// is recorded.
pub struct WorkerPool<D> {
    dispatcher: Arc<D>,
    aggregator: Arc<ResultAggregator>,
    slots: Arc<Semaphore>,
    concurrency: usize,
    tasks: JoinSet<()>,
}

impl<D: Dispatch> WorkerPool<D> {
    pub fn new(dispatcher: D, concurrency: usize, aggregator: Arc<ResultAggregator>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            aggregator,
            slots: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            tasks: JoinSet::new(),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Number of dispatches currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.concurrency - self.slots.available_permits()
    }

    /// Wait for a free slot. Returns `None` only if the pool has been shut down.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.slots).acquire_owned().await.ok()
    }

    /// Run one dispatch in the background, recording its sample against
    /// `dispatched_at` (offset from test start).
    pub fn spawn(&mut self, slot: OwnedSemaphorePermit, dispatched_at: Duration) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let aggregator = Arc::clone(&self.aggregator);
        self.tasks.spawn(async move {
            let sent = Instant::now();
            let outcome = dispatcher.dispatch().await;
            let latency = sent.elapsed();
            drop(slot);
            aggregator.record(Sample { dispatched_at, latency, outcome });
        });
    }

    /// Wait for every spawned dispatch to finish.
    pub async fn drain(&mut self) {
        tracing::debug!(outstanding = self.tasks.len(), "draining in-flight requests");
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "worker task failed");
            }
        }
    }
}
