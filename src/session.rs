use crate::client::GeocoderClient;
use crate::environment::{Environment, HostProvider};
use crate::fetch::{FetchController, FetchOutcome, FetchPhase};
use crate::params::{SearchMode, SearchParameters};
use crate::query::QueryBuilder;
use crate::url_state::{AddressBar, UrlStateSync, decode};
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// One open harness: the parameters, the address bar mirroring them and the
/// request cycle running for them.
pub struct SearchSession<A: AddressBar> {
  params: SearchParameters,
  host: Arc<dyn HostProvider>,
  url_state: UrlStateSync<A>,
  fetch: FetchController,
  request_key: Option<String>,
}

impl<A: AddressBar> SearchSession<A> {
  /// Restores the parameters from `query` and starts the first cycle.
  ///
  /// Has to be called from within a tokio runtime.
  pub fn new(
    query: &str,
    host: Arc<dyn HostProvider>,
    address_bar: A,
    client: Arc<dyn GeocoderClient>,
    builder: QueryBuilder,
  ) -> Self {
    Self::with_controller(
      query,
      host,
      address_bar,
      FetchController::new(client, builder),
    )
  }

  pub fn with_controller(
    query: &str,
    host: Arc<dyn HostProvider>,
    address_bar: A,
    fetch: FetchController,
  ) -> Self {
    let params = decode(query, host.as_ref());
    debug!("Session starts with {params:?}");
    let mut session = Self {
      params,
      host,
      url_state: UrlStateSync::new(address_bar),
      fetch,
      request_key: None,
    };
    session.url_state.apply(&session.params, session.host.as_ref());
    session.request_key = session.request_key_for(&session.params);
    session.fetch.update(&session.params);
    session
  }

  /// Like [`SearchSession::new`] with custom debounce and timeout.
  pub fn with_timing(
    query: &str,
    host: Arc<dyn HostProvider>,
    address_bar: A,
    client: Arc<dyn GeocoderClient>,
    builder: QueryBuilder,
    debounce: Duration,
    timeout: Duration,
  ) -> Self {
    let fetch = FetchController::new(client, builder).with_timing(debounce, timeout);
    Self::with_controller(query, host, address_bar, fetch)
  }

  /// Applies an edit, mirrors it to the address bar and restarts the request
  /// cycle if the request it leads to changed.
  pub fn edit(&mut self, edit: impl FnOnce(&mut SearchParameters)) {
    let before = self.params.clone();
    edit(&mut self.params);
    if before == self.params {
      return;
    }
    self.url_state.apply(&self.params, self.host.as_ref());

    let request_key = self.request_key_for(&self.params);
    if request_key != self.request_key {
      self.request_key = request_key;
      self.fetch.update(&self.params);
    }
  }

  /// The request the parameters lead to, `None` when nothing will be sent.
  fn request_key_for(&self, params: &SearchParameters) -> Option<String> {
    (!params.is_primary_input_empty()).then(|| self.fetch.builder().build_url(params, params.mode))
  }

  pub fn set_mode(&mut self, mode: SearchMode) {
    self.edit(|p| p.mode = mode);
  }

  pub fn set_environment(&mut self, environment: Environment) {
    self.edit(|p| p.environment = environment);
  }

  pub fn set_search_term(&mut self, term: &str) {
    self.edit(|p| p.search_term = term.to_string());
  }

  pub fn set_lat(&mut self, raw: &str) {
    self.edit(|p| p.set_lat(raw));
  }

  pub fn set_lon(&mut self, raw: &str) {
    self.edit(|p| p.set_lon(raw));
  }

  pub fn set_focus_lat(&mut self, raw: &str) {
    self.edit(|p| p.set_focus_lat(raw));
  }

  pub fn set_focus_lon(&mut self, raw: &str) {
    self.edit(|p| p.set_focus_lon(raw));
  }

  pub fn set_focus_from_click(&mut self, lat: f64, lon: f64) {
    self.edit(|p| p.set_focus_from_click(lat, lon));
  }

  pub fn set_point_from_click(&mut self, lat: f64, lon: f64) {
    self.edit(|p| p.set_point_from_click(lat, lon));
  }

  pub fn clear_focus(&mut self) {
    self.edit(SearchParameters::clear_focus);
  }

  pub fn set_size(&mut self, size: &str) {
    self.edit(|p| p.size = size.to_string());
  }

  pub fn set_layers(&mut self, layers: &str) {
    self.edit(|p| p.layers = layers.to_string());
  }

  pub fn set_sources(&mut self, sources: &str) {
    self.edit(|p| p.sources = sources.to_string());
  }

  pub fn set_multi_modal(&mut self, multi_modal: &str) {
    self.edit(|p| p.multi_modal = multi_modal.to_string());
  }

  pub fn set_boundary_radius(&mut self, radius: &str) {
    self.edit(|p| p.boundary_radius = radius.to_string());
  }

  pub fn params(&self) -> &SearchParameters {
    &self.params
  }

  pub fn address_bar(&self) -> &A {
    self.url_state.address_bar()
  }

  #[must_use]
  pub fn outcome(&self) -> FetchOutcome {
    self.fetch.outcome()
  }

  #[must_use]
  pub fn subscribe(&self) -> watch::Receiver<FetchOutcome> {
    self.fetch.subscribe()
  }

  #[must_use]
  pub fn query_url(&self) -> String {
    self.fetch.query_url()
  }

  #[must_use]
  pub fn phase(&self) -> FetchPhase {
    self.fetch.phase()
  }

  #[must_use]
  pub fn override_active(&self) -> bool {
    self.fetch.builder().override_active()
  }

  #[must_use]
  pub fn override_endpoint(&self) -> Option<&str> {
    self.fetch.builder().override_endpoint()
  }

  /// Stops the running cycle. Dropping the session does the same.
  pub fn close(&self) {
    self.fetch.shutdown();
  }
}
