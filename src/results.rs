use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizeError {
  #[error("Feature {index} has neither a label nor a name.")]
  MissingName { index: usize },
}

#[derive(Error, Debug)]
pub enum ResponseError {
  #[error("Unexpected response body: {0}")]
  Body(#[from] serde_json::Error),
  #[error(transparent)]
  Normalize(#[from] NormalizeError),
}

/// The body of a geocoder response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
  pub features: Vec<GeoJsonFeature>,
}

/// A feature as delivered by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
  pub properties: Map<String, Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub geometry: Option<Geometry>,
}

/// A GeoJSON geometry, kept as delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
  #[serde(rename = "type")]
  pub kind: String,
  /// `[lon, lat]` or `[lon, lat, altitude]` for points.
  #[serde(default, skip_serializing_if = "Value::is_null")]
  pub coordinates: Value,
  /// Every other member, e.g. `bbox`.
  #[serde(flatten)]
  pub members: Map<String, Value>,
}

impl Geometry {
  /// `(lat, lon)` of a point geometry.
  #[must_use]
  pub fn position(&self) -> Option<(f64, f64)> {
    if self.kind != "Point" {
      return None;
    }
    let lon = self.coordinates.get(0)?.as_f64()?;
    let lat = self.coordinates.get(1)?.as_f64()?;
    Some((lat, lon))
  }
}

/// A place returned by the geocoder, in the shape the front-end renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocoderResult {
  pub name: String,
  pub layer: Option<String>,
  pub categories: Vec<String>,
  pub properties: Map<String, Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub geometry: Option<Geometry>,
}

impl Display for GeocoderResult {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name)?;
    if let Some(layer) = &self.layer {
      write!(f, " [{layer}]")?;
    }
    if !self.categories.is_empty() {
      write!(f, " ({})", self.categories.join(", "))?;
    }
    if let Some((lat, lon)) = self.geometry.as_ref().and_then(Geometry::position) {
      write!(f, " @ {lat:.5}, {lon:.5}")?;
    }
    Ok(())
  }
}

/// Maps geocoder features one to one onto results, keeping their order.
///
/// A feature without `label` and `name` breaks the response contract and
/// fails the whole batch.
pub fn normalize(features: Vec<GeoJsonFeature>) -> Result<Vec<GeocoderResult>, NormalizeError> {
  features
    .into_iter()
    .enumerate()
    .map(|(index, feature)| {
      let Some(name) = ["label", "name"]
        .iter()
        .find_map(|key| feature.properties.get(*key).and_then(Value::as_str))
        .map(std::string::ToString::to_string)
      else {
        return Err(NormalizeError::MissingName { index });
      };
      let layer = feature
        .properties
        .get("layer")
        .and_then(Value::as_str)
        .map(std::string::ToString::to_string);
      let categories = feature
        .properties
        .get("category")
        .and_then(Value::as_array)
        .map(|categories| {
          categories
            .iter()
            .filter_map(Value::as_str)
            .map(std::string::ToString::to_string)
            .collect()
        })
        .unwrap_or_default();
      Ok(GeocoderResult {
        name,
        layer,
        categories,
        properties: feature.properties,
        geometry: feature.geometry,
      })
    })
    .collect()
}

/// Parses a geocoder response body and normalizes its features.
pub fn parse_response(body: &str) -> Result<Vec<GeocoderResult>, ResponseError> {
  let collection: FeatureCollection = serde_json::from_str(body)?;
  Ok(normalize(collection.features)?)
}
