use log::{debug, error};
use surf::http::Method;
use surf::{RequestBuilder, Url};
use thiserror::Error;

/// Identifies the harness towards the geocoder.
pub const DEFAULT_CLIENT_NAME: &str = "entur-ror-bau";
pub const CLIENT_NAME_HEADER: &str = "ET-Client-Name";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
  #[error("Invalid request URL {url}: {reason}")]
  InvalidUrl { url: String, reason: String },
  #[error("{0}")]
  Transport(String),
}

/// The parts of a geocoder response the harness looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
  pub status: u16,
  /// The canonical reason phrase for `status`. surf does not expose the
  /// phrase the server sent.
  pub status_text: String,
  /// Only read for successful responses.
  pub body: String,
}

impl HttpResponse {
  #[must_use]
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Sends GET requests to the geocoder.
#[async_trait::async_trait]
pub trait GeocoderClient: Send + Sync {
  async fn get(&self, url: &str) -> Result<HttpResponse, ClientError>;
}

/// The geocoder client backed by `surf`.
pub struct SurfClient {
  client_name: String,
  client: surf::Client,
}

impl SurfClient {
  #[must_use]
  pub fn new(client_name: impl Into<String>) -> Self {
    Self {
      client_name: client_name.into(),
      client: surf::Client::new(),
    }
  }
}

impl Default for SurfClient {
  fn default() -> Self {
    Self::new(DEFAULT_CLIENT_NAME)
  }
}

#[async_trait::async_trait]
impl GeocoderClient for SurfClient {
  async fn get(&self, url: &str) -> Result<HttpResponse, ClientError> {
    let parsed = Url::parse(url).map_err(|e| ClientError::InvalidUrl {
      url: url.to_string(),
      reason: e.to_string(),
    })?;
    let request = RequestBuilder::new(Method::Get, parsed)
      .header(CLIENT_NAME_HEADER, self.client_name.as_str())
      .build();

    let mut response = self
      .client
      .send(request)
      .await
      .inspect_err(|e| error!("Geocoder request failed: {e}"))
      .map_err(|e| ClientError::Transport(e.to_string()))?;

    let status = response.status();
    debug!("Geocoder answered {status} for {url}");
    let body = if status.is_success() {
      response
        .body_string()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?
    } else {
      String::new()
    };

    Ok(HttpResponse {
      status: status.into(),
      status_text: status_text(status),
      body,
    })
  }
}

/// surf reports the status code only, so the text is its canonical phrase.
fn status_text(status: surf::StatusCode) -> String {
  status.canonical_reason().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn success_range() {
    let mut response = HttpResponse {
      status: 200,
      status_text: "OK".to_string(),
      body: String::new(),
    };
    assert!(response.is_success());
    response.status = 204;
    assert!(response.is_success());
    response.status = 304;
    assert!(!response.is_success());
    response.status = 503;
    assert!(!response.is_success());
  }

  #[test]
  fn status_text_is_the_canonical_phrase() {
    assert_eq!(status_text(surf::StatusCode::Ok), "OK");
    assert_eq!(
      status_text(surf::StatusCode::ServiceUnavailable),
      "Service Unavailable"
    );
    assert_eq!(status_text(surf::StatusCode::NotFound), "Not Found");
  }

  #[tokio::test]
  async fn invalid_url_is_reported_without_sending() {
    let client = SurfClient::default();
    let err = client.get("not a url/autocomplete?text=x").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl { .. }));
  }
}
