use crate::coordinates::{format_clicked, sanitize};
use crate::environment::Environment;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub const DEFAULT_SIZE: &str = "30";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
  #[default]
  Autocomplete,
  Reverse,
}

impl SearchMode {
  #[must_use]
  pub fn name(&self) -> &'static str {
    match self {
      SearchMode::Autocomplete => "autocomplete",
      SearchMode::Reverse => "reverse",
    }
  }

  /// The endpoint path below the geocoder base URL.
  #[must_use]
  pub fn endpoint(&self) -> &'static str {
    self.name()
  }
}

impl Display for SearchMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for SearchMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "autocomplete" => Ok(SearchMode::Autocomplete),
      "reverse" => Ok(SearchMode::Reverse),
      _ => Err(format!("Unknown search mode: {s}")),
    }
  }
}

/// Everything that shapes a geocoder query. Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
  pub mode: SearchMode,
  pub search_term: String,
  pub lat: String,
  pub lon: String,
  pub size: String,
  pub focus_lat: String,
  pub focus_lon: String,
  pub layers: String,
  pub sources: String,
  pub multi_modal: String,
  pub boundary_radius: String,
  pub environment: Environment,
}

impl SearchParameters {
  /// Default parameters for the given environment.
  #[must_use]
  pub fn new(environment: Environment) -> Self {
    Self {
      mode: SearchMode::default(),
      search_term: String::new(),
      lat: String::new(),
      lon: String::new(),
      size: DEFAULT_SIZE.to_string(),
      focus_lat: String::new(),
      focus_lon: String::new(),
      layers: String::new(),
      sources: String::new(),
      multi_modal: String::new(),
      boundary_radius: String::new(),
      environment,
    }
  }

  #[must_use]
  pub fn has_focus(&self) -> bool {
    !self.focus_lat.is_empty() && !self.focus_lon.is_empty()
  }

  #[must_use]
  pub fn has_point(&self) -> bool {
    !self.lat.is_empty() && !self.lon.is_empty()
  }

  /// Whether the input the current mode needs is missing, in which case no
  /// request is worth sending.
  #[must_use]
  pub fn is_primary_input_empty(&self) -> bool {
    match self.mode {
      SearchMode::Autocomplete => self.search_term.is_empty(),
      SearchMode::Reverse => !self.has_point(),
    }
  }

  /// The requested result count read from the leading digits of `size`,
  /// so `"12.5"` gives 12. Falls back to the default when there are no
  /// leading digits or they read as zero.
  #[must_use]
  pub fn size_value(&self) -> u32 {
    let size = self.size.trim_start();
    let digits = size
      .find(|c: char| !c.is_ascii_digit())
      .map_or(size, |end| &size[..end]);
    digits
      .parse::<u32>()
      .ok()
      .filter(|size| *size > 0)
      .unwrap_or(30)
  }

  pub fn set_lat(&mut self, raw: &str) {
    self.lat = sanitize(raw);
  }

  pub fn set_lon(&mut self, raw: &str) {
    self.lon = sanitize(raw);
  }

  pub fn set_focus_lat(&mut self, raw: &str) {
    self.focus_lat = sanitize(raw);
  }

  pub fn set_focus_lon(&mut self, raw: &str) {
    self.focus_lon = sanitize(raw);
  }

  pub fn set_focus_from_click(&mut self, lat: f64, lon: f64) {
    self.focus_lat = format_clicked(lat);
    self.focus_lon = format_clicked(lon);
  }

  pub fn set_point_from_click(&mut self, lat: f64, lon: f64) {
    self.lat = format_clicked(lat);
    self.lon = format_clicked(lon);
  }

  pub fn clear_focus(&mut self) {
    self.focus_lat.clear();
    self.focus_lon.clear();
  }
}

impl Default for SearchParameters {
  fn default() -> Self {
    Self::new(Environment::default())
  }
}
