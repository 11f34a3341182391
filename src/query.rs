use crate::params::{SearchMode, SearchParameters};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const LANGUAGE: &str = "no";
pub const FOCUS_WEIGHT: &str = "18";
pub const FOCUS_SCALE: &str = "200km";
pub const FOCUS_FUNCTION: &str = "exp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeocoderVersion {
  V1,
  #[default]
  V2,
}

impl GeocoderVersion {
  #[must_use]
  pub fn name(&self) -> &'static str {
    match self {
      GeocoderVersion::V1 => "v1",
      GeocoderVersion::V2 => "v2",
    }
  }
}

impl Display for GeocoderVersion {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// Builds geocoder request URLs from search parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
  version: GeocoderVersion,
  v2_override: Option<String>,
}

impl QueryBuilder {
  #[must_use]
  pub fn new(version: GeocoderVersion, v2_override: Option<String>) -> Self {
    Self {
      version,
      v2_override: v2_override.filter(|url| !url.trim().is_empty()),
    }
  }

  /// Whether the configured override replaces the environment hosts.
  #[must_use]
  pub fn override_active(&self) -> bool {
    self.version == GeocoderVersion::V2 && self.v2_override.is_some()
  }

  #[must_use]
  pub fn override_endpoint(&self) -> Option<&str> {
    self.v2_override.as_deref()
  }

  /// The geocoder base URL, without endpoint and query.
  #[must_use]
  pub fn base_url(&self, params: &SearchParameters) -> String {
    match &self.v2_override {
      Some(url) if self.version == GeocoderVersion::V2 => url.trim_end_matches('/').to_string(),
      _ => format!(
        "https://{}/geocoder/{}",
        params.environment.api_host(),
        self.version
      ),
    }
  }

  #[must_use]
  pub fn build_url(&self, params: &SearchParameters, mode: SearchMode) -> String {
    let mut query = vec![
      ("lang", LANGUAGE.to_string()),
      ("size", params.size_value().to_string()),
    ];

    match mode {
      SearchMode::Autocomplete => {
        query.push(("text", encode(&params.search_term)));
        if params.has_focus() {
          query.push(("focus.point.lat", encode(&params.focus_lat)));
          query.push(("focus.point.lon", encode(&params.focus_lon)));
          query.push(("focus.weight", FOCUS_WEIGHT.to_string()));
          query.push(("focus.scale", FOCUS_SCALE.to_string()));
          query.push(("focus.function", FOCUS_FUNCTION.to_string()));
        }
      }
      SearchMode::Reverse => {
        query.push(("point.lat", encode(&params.lat)));
        query.push(("point.lon", encode(&params.lon)));
        if !params.boundary_radius.is_empty() {
          query.push(("boundary.circle.radius", encode(&params.boundary_radius)));
        }
      }
    }

    for (key, value) in [
      ("layers", &params.layers),
      ("sources", &params.sources),
      ("multiModal", &params.multi_modal),
    ] {
      if !value.is_empty() {
        query.push((key, encode(value)));
      }
    }

    let query = query
      .iter()
      .map(|(key, value)| format!("{key}={value}"))
      .collect::<Vec<_>>()
      .join("&");
    format!("{}/{}?{query}", self.base_url(params), mode.endpoint())
  }
}

fn encode(value: &str) -> String {
  urlencoding::encode(value).into_owned()
}
