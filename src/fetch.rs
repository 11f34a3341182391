//! The request lifecycle behind the search inputs.
//!
//! Every parameter change starts a new cycle: wait for the debounce delay,
//! send one request with a deadline, publish one outcome. Starting a cycle
//! cancels the previous one, and a cancelled cycle never publishes, so the
//! outcome always belongs to the latest parameters.

use crate::client::GeocoderClient;
use crate::params::SearchParameters;
use crate::query::QueryBuilder;
use crate::results::{GeocoderResult, parse_response};
use log::{debug, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const TIMEOUT_MESSAGE: &str = "Request timeout";

/// What the last completed cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FetchOutcome {
  Success { results: Vec<GeocoderResult> },
  Failure { status_code: u16, message: String },
}

impl FetchOutcome {
  #[must_use]
  pub fn empty() -> Self {
    FetchOutcome::Success {
      results: Vec::new(),
    }
  }

  pub fn failure(status_code: u16, message: impl Into<String>) -> Self {
    FetchOutcome::Failure {
      status_code,
      message: message.into(),
    }
  }

  /// The results of a successful cycle, empty on failure.
  #[must_use]
  pub fn results(&self) -> &[GeocoderResult] {
    match self {
      FetchOutcome::Success { results } => results,
      FetchOutcome::Failure { .. } => &[],
    }
  }
}

impl Default for FetchOutcome {
  fn default() -> Self {
    Self::empty()
  }
}

/// Where the current cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
  Idle,
  Pending,
  InFlight,
}

struct Cycle {
  token: CancellationToken,
  task: JoinHandle<()>,
}

impl Cycle {
  fn cancel(self) {
    self.token.cancel();
    self.task.abort();
  }
}

struct Shared {
  outcome: watch::Sender<FetchOutcome>,
  query_url: String,
  phase: FetchPhase,
  active: Option<Cycle>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
  shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the debounce timer and the in-flight request of one search session.
pub struct FetchController {
  client: Arc<dyn GeocoderClient>,
  builder: QueryBuilder,
  debounce: Duration,
  timeout: Duration,
  shared: Arc<Mutex<Shared>>,
}

impl FetchController {
  pub fn new(client: Arc<dyn GeocoderClient>, builder: QueryBuilder) -> Self {
    let (outcome, _) = watch::channel(FetchOutcome::default());
    Self {
      client,
      builder,
      debounce: DEFAULT_DEBOUNCE,
      timeout: DEFAULT_TIMEOUT,
      shared: Arc::new(Mutex::new(Shared {
        outcome,
        query_url: String::new(),
        phase: FetchPhase::Idle,
        active: None,
      })),
    }
  }

  #[must_use]
  pub fn with_timing(mut self, debounce: Duration, timeout: Duration) -> Self {
    self.debounce = debounce;
    self.timeout = timeout;
    self
  }

  pub fn builder(&self) -> &QueryBuilder {
    &self.builder
  }

  /// Abandons the running cycle and schedules a new one for `params`.
  ///
  /// Has to be called from within a tokio runtime.
  pub fn update(&self, params: &SearchParameters) {
    let token = CancellationToken::new();
    let mut shared = lock(&self.shared);
    if let Some(previous) = shared.active.take() {
      debug!("Cancelling previous search cycle");
      previous.cancel();
    }

    let task = tokio::spawn(run_cycle(CycleContext {
      params: params.clone(),
      builder: self.builder.clone(),
      client: Arc::clone(&self.client),
      shared: Arc::clone(&self.shared),
      token: token.clone(),
      debounce: self.debounce,
      timeout: self.timeout,
    }));
    shared.active = Some(Cycle { token, task });
    shared.phase = FetchPhase::Pending;
  }

  /// Cancels the running cycle, leaving the last outcome in place.
  pub fn shutdown(&self) {
    let mut shared = lock(&self.shared);
    if let Some(active) = shared.active.take() {
      active.cancel();
    }
    shared.phase = FetchPhase::Idle;
  }

  #[must_use]
  pub fn outcome(&self) -> FetchOutcome {
    lock(&self.shared).outcome.borrow().clone()
  }

  /// A receiver notified on every published outcome.
  #[must_use]
  pub fn subscribe(&self) -> watch::Receiver<FetchOutcome> {
    lock(&self.shared).outcome.subscribe()
  }

  /// The URL of the most recently sent request.
  #[must_use]
  pub fn query_url(&self) -> String {
    lock(&self.shared).query_url.clone()
  }

  #[must_use]
  pub fn phase(&self) -> FetchPhase {
    lock(&self.shared).phase
  }
}

impl Drop for FetchController {
  fn drop(&mut self) {
    self.shutdown();
  }
}

struct CycleContext {
  params: SearchParameters,
  builder: QueryBuilder,
  client: Arc<dyn GeocoderClient>,
  shared: Arc<Mutex<Shared>>,
  token: CancellationToken,
  debounce: Duration,
  timeout: Duration,
}

impl CycleContext {
  /// Publishes `outcome` unless this cycle has been superseded.
  fn commit(&self, outcome: FetchOutcome) {
    let mut shared = lock(&self.shared);
    if self.token.is_cancelled() {
      debug!("Discarding outcome of a cancelled cycle");
      return;
    }
    shared.outcome.send_replace(outcome);
    shared.phase = FetchPhase::Idle;
    shared.active = None;
  }
}

async fn run_cycle(ctx: CycleContext) {
  tokio::select! {
    () = ctx.token.cancelled() => return,
    () = tokio::time::sleep(ctx.debounce) => {}
  }

  if ctx.params.is_primary_input_empty() {
    debug!("Nothing to search for in {} mode", ctx.params.mode);
    ctx.commit(FetchOutcome::empty());
    return;
  }

  let url = ctx.builder.build_url(&ctx.params, ctx.params.mode);
  {
    let mut shared = lock(&ctx.shared);
    if ctx.token.is_cancelled() {
      return;
    }
    shared.query_url.clone_from(&url);
    shared.phase = FetchPhase::InFlight;
  }

  debug!("Requesting {url}");
  let outcome = tokio::select! {
    () = ctx.token.cancelled() => {
      debug!("Aborted request to {url}");
      return;
    }
    outcome = request(ctx.client.as_ref(), &url, ctx.timeout) => outcome,
  };
  ctx.commit(outcome);
}

async fn request(client: &dyn GeocoderClient, url: &str, timeout: Duration) -> FetchOutcome {
  match tokio::time::timeout(timeout, client.get(url)).await {
    Err(_) => {
      warn!("Request to {url} timed out after {timeout:?}");
      FetchOutcome::failure(0, TIMEOUT_MESSAGE)
    }
    Ok(Err(e)) => {
      warn!("Request to {url} failed: {e}");
      FetchOutcome::failure(0, e.to_string())
    }
    Ok(Ok(response)) if !response.is_success() => {
      warn!("Geocoder answered {} {}", response.status, response.status_text);
      FetchOutcome::failure(response.status, response.status_text)
    }
    Ok(Ok(response)) => match parse_response(&response.body) {
      Ok(results) => {
        debug!("Got {} results", results.len());
        FetchOutcome::Success { results }
      }
      Err(e) => {
        warn!("Could not process geocoder response: {e}");
        FetchOutcome::failure(0, format!("Failed to process response: {e}"))
      }
    },
  }
}
