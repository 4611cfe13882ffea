//! Entity-linking enrichment client.
//!
//! Talks to an external disambiguation service that maps a surface form to
//! a knowledge-base identifier. The service is an opaque enrichment step:
//! callers treat any failure as a degradation signal, never as a tagging
//! failure.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use entigraph_core::{EngineError, LinkingConfig, Result};

/// HTTP client for the disambiguation service
#[derive(Debug)]
pub struct LinkingClient {
    client: Client,
    base_url: String,
    language: String,
}

#[derive(Debug, Serialize)]
struct DisambiguateRequest<'a> {
    #[serde(rename = "shortText")]
    short_text: &'a str,
    language: LanguageSpec<'a>,
}

#[derive(Debug, Serialize)]
struct LanguageSpec<'a> {
    lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct DisambiguateResponse {
    #[serde(default)]
    entities: Vec<LinkedEntity>,
}

#[derive(Debug, Deserialize)]
struct LinkedEntity {
    #[serde(rename = "wikidataId")]
    wikidata_id: Option<String>,
}

/// Errors from the linking service. Absorbed by the backend; they degrade
/// output quality rather than propagate.
#[derive(Debug, thiserror::Error)]
pub enum LinkingError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service returned status {status}")]
    Service { status: u16 },
}

impl LinkingClient {
    /// Build a client from configuration.
    ///
    /// Client construction failure is fatal here, like any other
    /// initialization error.
    pub fn new(config: &LinkingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::ModelInit(format!("linking client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        })
    }

    /// Resolve a surface form to a knowledge-base identifier, if the
    /// service knows one.
    pub async fn link(&self, text: &str) -> std::result::Result<Option<String>, LinkingError> {
        let request = DisambiguateRequest {
            short_text: text,
            language: LanguageSpec {
                lang: &self.language,
            },
        };

        let response = self
            .client
            .post(format!("{}/disambiguate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LinkingError::Service {
                status: response.status().as_u16(),
            });
        }

        let parsed: DisambiguateResponse = response.json().await?;
        Ok(parsed.entities.into_iter().find_map(|e| e.wikidata_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let client = LinkingClient::new(&LinkingConfig::default()).unwrap();
        assert_eq!(client.base_url, "http://nerd.huma-num.fr/nerd/service");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = LinkingConfig {
            base_url: "http://localhost:8090/service/".to_string(),
            ..Default::default()
        };
        let client = LinkingClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8090/service");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"entities": [{"rawName": "Apple", "wikidataId": "Q312"}]}"#;
        let parsed: DisambiguateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.entities[0].wikidata_id.as_deref(), Some("Q312"));

        let empty: DisambiguateResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.entities.is_empty());
    }
}
