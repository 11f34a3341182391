use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown environment: {0}. Expected one of dev, staging, prod.")]
pub struct UnknownEnvironment(pub String);

/// The geocoder deployments the harness can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  #[default]
  Dev,
  Staging,
  Prod,
}

impl Environment {
  #[must_use]
  pub fn name(&self) -> &'static str {
    match self {
      Environment::Dev => "dev",
      Environment::Staging => "staging",
      Environment::Prod => "prod",
    }
  }

  /// The API host serving this environment.
  #[must_use]
  pub fn api_host(&self) -> &'static str {
    match self {
      Environment::Dev => "api.dev.entur.io",
      Environment::Staging => "api.staging.entur.io",
      Environment::Prod => "api.entur.io",
    }
  }

  /// Maps the hostname the harness is served from to its environment.
  /// Unknown hosts, e.g. localhost, default to dev.
  #[must_use]
  pub fn from_hostname(hostname: &str) -> Self {
    Self::all()
      .iter()
      .copied()
      .find(|env| env.api_host() == hostname)
      .unwrap_or_default()
  }

  #[must_use]
  pub fn all() -> &'static [Environment] {
    &[Environment::Dev, Environment::Staging, Environment::Prod]
  }
}

impl Display for Environment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for Environment {
  type Err = UnknownEnvironment;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::all()
      .iter()
      .copied()
      .find(|env| env.name() == s)
      .ok_or_else(|| UnknownEnvironment(s.to_string()))
  }
}

/// Supplies the hostname the harness is currently served from.
pub trait HostProvider: Send + Sync {
  fn hostname(&self) -> String;

  /// The environment used when none is given explicitly.
  fn default_environment(&self) -> Environment {
    Environment::from_hostname(&self.hostname())
  }
}

/// A host provider returning a fixed hostname.
#[derive(Debug, Clone)]
pub struct StaticHost(pub String);

impl StaticHost {
  #[must_use]
  pub fn new(hostname: impl Into<String>) -> Self {
    Self(hostname.into())
  }
}

impl Default for StaticHost {
  fn default() -> Self {
    Self::new("localhost")
  }
}

impl HostProvider for StaticHost {
  fn hostname(&self) -> String {
    self.0.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[rstest]
  #[case("api.entur.io", Environment::Prod)]
  #[case("api.staging.entur.io", Environment::Staging)]
  #[case("api.dev.entur.io", Environment::Dev)]
  #[case("localhost", Environment::Dev)]
  #[case("geocoder-test.example.org", Environment::Dev)]
  fn resolves_environment_from_hostname(#[case] host: &str, #[case] expected: Environment) {
    assert_eq!(StaticHost::new(host).default_environment(), expected);
  }

  #[test]
  fn parses_names() {
    for env in Environment::all() {
      assert_eq!(env.name().parse::<Environment>(), Ok(*env));
    }
    assert!("production".parse::<Environment>().is_err());
  }
}
