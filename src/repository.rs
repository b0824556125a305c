//! Rule artifact repository client
//!
//! Thin wrapper over an unauthenticated, plaintext HTTP client that asks a
//! Nexus-style Maven repository whether an artifact exists:
//!
//! ```text
//! GET http://<nexus_name>:<nexus_port>/nexus/service/local/artifact/maven/resolve
//!     ?r=releases&g=<groupId>&a=<artifactId>&v=<version>
//! ```

use crate::config::ConfigError;
use crate::policy::ArtifactCoordinate;
use crate::validators::ValidatorConfig;
use reqwest::{StatusCode, Url};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Path of the Maven artifact service below the repository root
pub const ARTIFACT_SERVICE_PATH: &str = "nexus/service/local/artifact/maven";

/// Repository queried for released artifacts
const RELEASES_REPOSITORY: &str = "releases";

/// Repository coordinates taken from a policy validator's config block
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositorySettings {
    /// Repository host name
    #[serde(default)]
    pub nexus_name: String,

    /// Repository port, given either as an integer or a numeric string
    #[serde(default, deserialize_with = "deserialize_port")]
    pub nexus_port: Option<u16>,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let port = match Option::<PortValue>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(PortValue::Number(number)) => u16::try_from(number)
            .map_err(|_| format!("nexus_port must be a port number, got {}", number)),
        Some(PortValue::Text(text)) => text
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("nexus_port must be a port number, got \"{}\"", text)),
    };
    port.map(Some).map_err(de::Error::custom)
}

impl RepositorySettings {
    pub fn new(nexus_name: impl Into<String>, nexus_port: u16) -> Self {
        Self {
            nexus_name: nexus_name.into(),
            nexus_port: Some(nexus_port),
            timeout_seconds: default_timeout(),
        }
    }

    /// Read and check settings from a validator's `config` block
    ///
    /// Field names in errors are relative to the validator section, e.g.
    /// `config.nexus_name`.
    pub fn from_validator_config(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        let settings: RepositorySettings = if config.config.is_null() {
            serde_json::from_value(serde_json::json!({}))
        } else {
            serde_json::from_value(config.config.clone())
        }
        .map_err(|e| ConfigError::Invalid {
            field: "config".to_string(),
            reason: e.to_string(),
        })?;

        settings.validate().map_err(|e| e.within("config"))?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nexus_name.trim().is_empty() {
            return Err(ConfigError::MissingField("nexus_name".to_string()));
        }
        match self.nexus_port {
            None => return Err(ConfigError::MissingField("nexus_port".to_string())),
            Some(0) => {
                return Err(ConfigError::Invalid {
                    field: "nexus_port".to_string(),
                    reason: "port must be greater than 0".to_string(),
                })
            }
            Some(_) => {}
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_seconds".to_string(),
                reason: "timeout must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Answer to a single resolve request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// 200 - the artifact exists
    Found,
    /// 404 - the artifact does not exist
    Missing,
    /// Any other status, with the raw response body
    Unexpected { status: u16, body: String },
}

/// Failures talking to the repository
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("invalid repository address '{url}': {reason}")]
    InvalidAddress { url: String, reason: String },

    #[error("could not build repository client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("repository request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// HTTP client bound to one repository
#[derive(Debug, Clone)]
pub struct RepositoryClient {
    client: reqwest::Client,
    resolve_url: Url,
}

impl RepositoryClient {
    /// Build a client for the configured repository
    pub fn new(settings: &RepositorySettings) -> Result<Self, RepositoryError> {
        let port = settings.nexus_port.map(|p| p.to_string()).unwrap_or_default();
        let root = format!(
            "http://{}:{}/{}/",
            settings.nexus_name, port, ARTIFACT_SERVICE_PATH
        );
        let invalid = |reason: &str| RepositoryError::InvalidAddress {
            url: root.clone(),
            reason: reason.to_string(),
        };

        if settings.nexus_name.trim().is_empty() {
            return Err(invalid("host is blank"));
        }
        if port.is_empty() {
            return Err(invalid("port is missing"));
        }

        let base = Url::parse(&root).map_err(|e| invalid(&e.to_string()))?;
        let resolve_url = base.join("resolve").map_err(|e| invalid(&e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(RepositoryError::Client)?;

        Ok(Self {
            client,
            resolve_url,
        })
    }

    /// Endpoint used for resolve requests
    pub fn resolve_url(&self) -> &Url {
        &self.resolve_url
    }

    /// Ask the repository whether `coordinate` has been released
    pub async fn resolve(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<ResolveOutcome, RepositoryError> {
        debug!("Resolving rule artifact {} at {}", coordinate, self.resolve_url);

        let response = self
            .client
            .get(self.resolve_url.clone())
            .query(&[
                ("r", RELEASES_REPOSITORY),
                ("g", coordinate.group_id.as_str()),
                ("a", coordinate.artifact_id.as_str()),
                ("v", coordinate.version.as_str()),
            ])
            .send()
            .await
            .map_err(RepositoryError::Transport)?;

        let status = response.status();
        match status {
            StatusCode::OK => Ok(ResolveOutcome::Found),
            StatusCode::NOT_FOUND => Ok(ResolveOutcome::Missing),
            other => {
                let body = response.text().await.map_err(RepositoryError::Transport)?;
                debug!("Repository answered {} for {}: {}", other, coordinate, body);
                Ok(ResolveOutcome::Unexpected {
                    status: other.as_u16(),
                    body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeRepository;

    fn coordinate(artifact_id: &str) -> ArtifactCoordinate {
        ArtifactCoordinate {
            group_id: "org.onap.rules".to_string(),
            artifact_id: artifact_id.to_string(),
            version: "1.0.0".to_string(),
        }
    }

    #[test]
    fn test_resolve_url_layout() {
        let client = RepositoryClient::new(&RepositorySettings::new("nexus", 8081)).unwrap();
        assert_eq!(
            client.resolve_url().as_str(),
            "http://nexus:8081/nexus/service/local/artifact/maven/resolve"
        );
    }

    #[test]
    fn test_blank_host_is_rejected() {
        let err = RepositoryClient::new(&RepositorySettings::new(" ", 8081)).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_resolve_outcomes() {
        let repository = FakeRepository::start().await;
        let client = RepositoryClient::new(&repository.settings()).unwrap();

        assert_eq!(client.resolve(&coordinate("rules")).await.unwrap(), ResolveOutcome::Found);
        assert_eq!(
            client.resolve(&coordinate(FakeRepository::MISSING)).await.unwrap(),
            ResolveOutcome::Missing
        );
        assert_eq!(
            client.resolve(&coordinate(FakeRepository::BROKEN)).await.unwrap(),
            ResolveOutcome::Unexpected {
                status: 500,
                body: "boom".to_string()
            }
        );
        assert_eq!(repository.hits(), 3);
    }

    #[tokio::test]
    async fn test_resolve_sends_coordinate_as_query() {
        let repository = FakeRepository::start().await;
        let client = RepositoryClient::new(&repository.settings()).unwrap();

        client.resolve(&coordinate("rules")).await.unwrap();

        let query = repository.last_query().unwrap();
        assert_eq!(query["r"], "releases");
        assert_eq!(query["g"], "org.onap.rules");
        assert_eq!(query["a"], "rules");
        assert_eq!(query["v"], "1.0.0");
    }

    #[tokio::test]
    async fn test_unreachable_repository_is_transport_error() {
        let settings = FakeRepository::unreachable_settings().await;
        let client = RepositoryClient::new(&settings).unwrap();

        let err = client.resolve(&coordinate("rules")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Transport(_)));
    }

    #[test]
    fn test_settings_from_validator_config() {
        let config = ValidatorConfig::new("policy", "default").with_config(serde_json::json!({
            "nexus_name": "nexus.local",
            "nexus_port": 8081
        }));
        let settings = RepositorySettings::from_validator_config(&config).unwrap();
        assert_eq!(settings, RepositorySettings::new("nexus.local", 8081));
    }

    #[test]
    fn test_settings_missing_fields() {
        let config = ValidatorConfig::new("policy", "default");
        let err = RepositorySettings::from_validator_config(&config).unwrap_err();
        assert_eq!(err.to_string(), "config.nexus_name must be specified");

        let config = config.with_config(serde_json::json!({"nexus_name": "nexus"}));
        let err = RepositorySettings::from_validator_config(&config).unwrap_err();
        assert_eq!(err.to_string(), "config.nexus_port must be specified");
    }

    #[test]
    fn test_port_accepts_numeric_string() {
        let config = ValidatorConfig::new("policy", "default").with_config(serde_json::json!({
            "nexus_name": "nexus.local",
            "nexus_port": " 8081 "
        }));
        let settings = RepositorySettings::from_validator_config(&config).unwrap();
        assert_eq!(settings.nexus_port, Some(8081));
    }

    #[test]
    fn test_port_out_of_range() {
        for (port, shown) in [
            (serde_json::json!(70000), "70000"),
            (serde_json::json!("http"), "\"http\""),
        ] {
            let config = ValidatorConfig::new("policy", "default")
                .with_config(serde_json::json!({"nexus_name": "nexus", "nexus_port": port}));
            let err = RepositorySettings::from_validator_config(&config).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("config is invalid: nexus_port must be a port number, got {}", shown)
            );
        }
    }
}
