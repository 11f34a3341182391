//! Mirrors the search parameters into the address bar query string and back.
//!
//! Only values that differ from their defaults are written, so a fresh
//! harness has a bare path and a shared link carries just what was changed.
//! The default environment depends on the host the harness is served from,
//! and it is looked up on every encode.

use crate::environment::{Environment, HostProvider};
use crate::params::{DEFAULT_SIZE, SearchMode, SearchParameters};
use log::{debug, trace};
use std::borrow::Cow;

pub const KEY_MODE: &str = "mode";
pub const KEY_QUERY: &str = "q";
pub const KEY_LAT: &str = "lat";
pub const KEY_LON: &str = "lon";
pub const KEY_ENV: &str = "env";
pub const KEY_SIZE: &str = "size";
pub const KEY_FOCUS_LAT: &str = "focus_lat";
pub const KEY_FOCUS_LON: &str = "focus_lon";
pub const KEY_LAYERS: &str = "layers";
pub const KEY_SOURCES: &str = "sources";
pub const KEY_MULTI_MODAL: &str = "multiModal";
pub const KEY_BOUNDARY_RADIUS: &str = "boundary.circle.radius";

/// Reads search parameters from a query string, with or without leading `?`.
///
/// Unknown keys are ignored, the first occurrence of a key wins, and missing,
/// empty or unrecognized values fall back to their defaults.
#[must_use]
pub fn decode(query: &str, host: &dyn HostProvider) -> SearchParameters {
  let mut params = SearchParameters::new(host.default_environment());
  let mut seen: Vec<String> = Vec::new();

  for (key, value) in parse_pairs(query) {
    if seen.contains(&key) {
      continue;
    }
    seen.push(key.clone());
    if value.is_empty() {
      continue;
    }
    match key.as_str() {
      KEY_MODE => match value.parse::<SearchMode>() {
        Ok(mode) => params.mode = mode,
        Err(e) => debug!("{e}, keeping {}", params.mode),
      },
      KEY_ENV => match value.parse::<Environment>() {
        Ok(env) => params.environment = env,
        Err(e) => debug!("{e}"),
      },
      KEY_QUERY => params.search_term = value,
      KEY_LAT => params.lat = value,
      KEY_LON => params.lon = value,
      KEY_SIZE => params.size = value,
      KEY_FOCUS_LAT => params.focus_lat = value,
      KEY_FOCUS_LON => params.focus_lon = value,
      KEY_LAYERS => params.layers = value,
      KEY_SOURCES => params.sources = value,
      KEY_MULTI_MODAL => params.multi_modal = value,
      KEY_BOUNDARY_RADIUS => params.boundary_radius = value,
      _ => trace!("Ignoring unknown query key {key}"),
    }
  }
  params
}

/// Writes the non-default parameters as a query string without leading `?`.
#[must_use]
pub fn encode(params: &SearchParameters, host: &dyn HostProvider) -> String {
  let mut pairs: Vec<(&str, &str)> = Vec::new();

  if params.mode != SearchMode::Autocomplete {
    pairs.push((KEY_MODE, params.mode.name()));
  }
  if params.environment != host.default_environment() {
    pairs.push((KEY_ENV, params.environment.name()));
  }

  match params.mode {
    SearchMode::Autocomplete => push_non_empty(&mut pairs, KEY_QUERY, &params.search_term),
    SearchMode::Reverse => {
      push_non_empty(&mut pairs, KEY_LAT, &params.lat);
      push_non_empty(&mut pairs, KEY_LON, &params.lon);
    }
  }

  if params.size != DEFAULT_SIZE {
    push_non_empty(&mut pairs, KEY_SIZE, &params.size);
  }
  if params.has_focus() {
    pairs.push((KEY_FOCUS_LAT, params.focus_lat.as_str()));
    pairs.push((KEY_FOCUS_LON, params.focus_lon.as_str()));
  }

  push_non_empty(&mut pairs, KEY_LAYERS, &params.layers);
  push_non_empty(&mut pairs, KEY_SOURCES, &params.sources);
  push_non_empty(&mut pairs, KEY_MULTI_MODAL, &params.multi_modal);
  push_non_empty(&mut pairs, KEY_BOUNDARY_RADIUS, &params.boundary_radius);

  pairs
    .iter()
    .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
    .collect::<Vec<_>>()
    .join("&")
}

/// The address bar location for a path and an encoded query.
#[must_use]
pub fn location_for(path: &str, query: &str) -> String {
  if query.is_empty() {
    path.to_string()
  } else {
    format!("{path}?{query}")
  }
}

fn push_non_empty<'a>(pairs: &mut Vec<(&'a str, &'a str)>, key: &'a str, value: &'a str) {
  if !value.is_empty() {
    pairs.push((key, value));
  }
}

fn parse_pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
  query
    .strip_prefix('?')
    .unwrap_or(query)
    .split('&')
    .filter(|pair| !pair.is_empty())
    .map(|pair| {
      let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
      (form_decode(key), form_decode(value))
    })
}

fn form_encode(value: &str) -> Cow<'_, str> {
  urlencoding::encode(value)
}

fn form_decode(value: &str) -> String {
  let spaced = value.replace('+', " ");
  match urlencoding::decode(&spaced) {
    Ok(decoded) => decoded.into_owned(),
    Err(_) => spaced,
  }
}

/// The place the encoded parameters are written to, e.g. the browser history.
pub trait AddressBar: Send {
  /// The path part of the current location.
  fn path(&self) -> String;

  /// Replaces the current location without adding a history entry.
  fn replace_location(&mut self, location: &str);
}

/// An address bar kept in memory, used by the terminal front-end and tests.
#[derive(Debug, Clone)]
pub struct MemoryAddressBar {
  path: String,
  location: String,
  replacements: usize,
}

impl MemoryAddressBar {
  #[must_use]
  pub fn new(path: impl Into<String>) -> Self {
    let path = path.into();
    Self {
      location: path.clone(),
      path,
      replacements: 0,
    }
  }

  #[must_use]
  pub fn location(&self) -> &str {
    &self.location
  }

  /// The query part of the current location, without `?`.
  #[must_use]
  pub fn query(&self) -> &str {
    self.location.split_once('?').map_or("", |(_, query)| query)
  }

  #[must_use]
  pub fn replacements(&self) -> usize {
    self.replacements
  }
}

impl Default for MemoryAddressBar {
  fn default() -> Self {
    Self::new("/")
  }
}

impl AddressBar for MemoryAddressBar {
  fn path(&self) -> String {
    self.path.clone()
  }

  fn replace_location(&mut self, location: &str) {
    self.location = location.to_string();
    self.replacements += 1;
  }
}

/// Keeps an address bar in step with the parameters it was last given.
pub struct UrlStateSync<A: AddressBar> {
  address_bar: A,
  applied: Option<SearchParameters>,
}

impl<A: AddressBar> UrlStateSync<A> {
  pub fn new(address_bar: A) -> Self {
    Self {
      address_bar,
      applied: None,
    }
  }

  /// Writes `params` to the address bar if any tracked field changed since
  /// the last call. Returns whether the location was replaced.
  pub fn apply(&mut self, params: &SearchParameters, host: &dyn HostProvider) -> bool {
    if self.applied.as_ref() == Some(params) {
      return false;
    }
    let location = location_for(&self.address_bar.path(), &encode(params, host));
    debug!("Replacing address bar location with {location}");
    self.address_bar.replace_location(&location);
    self.applied = Some(params.clone());
    true
  }

  pub fn address_bar(&self) -> &A {
    &self.address_bar
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::environment::StaticHost;

  fn localhost() -> StaticHost {
    StaticHost::default()
  }

  #[test]
  fn defaults_encode_to_empty_query() {
    let params = SearchParameters::default();
    assert_eq!(encode(&params, &localhost()), "");
  }

  #[test]
  fn decode_of_empty_query_gives_defaults() {
    assert_eq!(decode("", &localhost()), SearchParameters::default());
    assert_eq!(decode("?", &localhost()), SearchParameters::default());
  }

  #[test]
  fn decode_reads_recognized_keys() {
    let params = decode(
      "?mode=reverse&lat=59.91&lon=10.75&env=prod&size=5&boundary.circle.radius=2&unknown=1",
      &localhost(),
    );
    assert_eq!(params.mode, SearchMode::Reverse);
    assert_eq!(params.lat, "59.91");
    assert_eq!(params.lon, "10.75");
    assert_eq!(params.environment, Environment::Prod);
    assert_eq!(params.size, "5");
    assert_eq!(params.boundary_radius, "2");
  }

  #[test]
  fn decode_falls_back_on_bad_values() {
    let params = decode("mode=sideways&env=moon&size=", &localhost());
    assert_eq!(params, SearchParameters::default());
  }

  #[test]
  fn decode_handles_form_encoding() {
    let params = decode("q=Oslo+S%C3%B8r&layers=venue%2Caddress", &localhost());
    assert_eq!(params.search_term, "Oslo Sør");
    assert_eq!(params.layers, "venue,address");
  }

  #[test]
  fn first_occurrence_wins() {
    let params = decode("q=first&q=second", &localhost());
    assert_eq!(params.search_term, "first");
  }

  #[test]
  fn term_is_only_written_in_autocomplete_mode() {
    let mut params = SearchParameters::default();
    params.search_term = "Bergen".to_string();
    params.lat = "60.39".to_string();
    params.lon = "5.32".to_string();
    assert_eq!(encode(&params, &localhost()), "q=Bergen");

    params.mode = SearchMode::Reverse;
    assert_eq!(encode(&params, &localhost()), "mode=reverse&lat=60.39&lon=5.32");
  }

  #[test]
  fn focus_is_only_written_as_a_pair() {
    let mut params = SearchParameters::default();
    params.focus_lat = "62.47".to_string();
    assert_eq!(encode(&params, &localhost()), "");
    params.focus_lon = "6.15".to_string();
    assert_eq!(encode(&params, &localhost()), "focus_lat=62.47&focus_lon=6.15");
  }

  #[test]
  fn environment_is_omitted_when_it_matches_the_host() {
    let mut params = SearchParameters::new(Environment::Prod);
    assert_eq!(encode(&params, &StaticHost::new("api.entur.io")), "");
    assert_eq!(encode(&params, &localhost()), "env=prod");

    params.environment = Environment::Dev;
    assert_eq!(encode(&params, &StaticHost::new("api.entur.io")), "env=dev");
  }

  #[test]
  fn encode_escapes_values() {
    let mut params = SearchParameters::default();
    params.search_term = "a&b=c d+e".to_string();
    let query = encode(&params, &localhost());
    assert_eq!(query, "q=a%26b%3Dc%20d%2Be");
    assert_eq!(decode(&query, &localhost()).search_term, "a&b=c d+e");
  }

  #[test]
  fn sync_replaces_only_on_change() {
    let host = localhost();
    let mut sync = UrlStateSync::new(MemoryAddressBar::new("/geocoder"));
    let mut params = SearchParameters::default();

    assert!(sync.apply(&params, &host));
    assert_eq!(sync.address_bar().location(), "/geocoder");
    assert!(!sync.apply(&params, &host));

    params.search_term = "Oslo".to_string();
    assert!(sync.apply(&params, &host));
    assert_eq!(sync.address_bar().location(), "/geocoder?q=Oslo");
    assert_eq!(sync.address_bar().query(), "q=Oslo");
    assert_eq!(sync.address_bar().replacements(), 2);
  }
}
