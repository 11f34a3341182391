#![allow(dead_code)]

use geoprobe::client::{ClientError, GeocoderClient, HttpResponse};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A geocoder answering every request with a single feature whose label is
/// the request URL.
pub struct MockGeocoder {
  calls: Mutex<Vec<String>>,
  delay: Duration,
}

impl MockGeocoder {
  pub fn new(delay: Duration) -> Arc<Self> {
    Arc::new(Self {
      calls: Mutex::new(Vec::new()),
      delay,
    })
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait::async_trait]
impl GeocoderClient for MockGeocoder {
  async fn get(&self, url: &str) -> Result<HttpResponse, ClientError> {
    self.calls.lock().unwrap().push(url.to_string());
    tokio::time::sleep(self.delay).await;
    Ok(HttpResponse {
      status: 200,
      status_text: "OK".to_string(),
      body: serde_json::json!({
        "features": [{
          "properties": { "label": url, "layer": "venue" },
          "geometry": { "type": "Point", "coordinates": [10.75, 59.91] }
        }]
      })
      .to_string(),
    })
  }
}

/// A geocoder failing every request at the transport level.
pub struct UnreachableGeocoder;

#[async_trait::async_trait]
impl GeocoderClient for UnreachableGeocoder {
  async fn get(&self, _url: &str) -> Result<HttpResponse, ClientError> {
    Err(ClientError::Transport("dns error: failed to lookup address".to_string()))
  }
}

/// A geocoder answering with features that break the response contract.
pub struct NamelessGeocoder;

#[async_trait::async_trait]
impl GeocoderClient for NamelessGeocoder {
  async fn get(&self, _url: &str) -> Result<HttpResponse, ClientError> {
    Ok(HttpResponse {
      status: 200,
      status_text: "OK".to_string(),
      body: r#"{"features":[{"properties":{"label":"Oslo"}},{"properties":{"layer":"address"}}]}"#
        .to_string(),
    })
  }
}
