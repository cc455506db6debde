//! Async REST client for the unit hierarchy and AAR backend
//!
//! The engine only reads rosters and preset tactics, and writes round
//! outcomes. Unit health is owned by the backend; nothing here writes it.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::api::records::{EngagementRecord, TacticsRecord, UnitRecord};
use crate::core::config::ApiConfig;
use crate::core::error::{EngageError, Result};
use crate::core::types::{SectionId, UnitId};
use crate::engagement::tactics::TacticsAnswers;

/// The REST boundary as seen by an engagement session
#[allow(async_fn_in_trait)]
pub trait EngagementApi {
    /// `GET units-by-section`
    async fn friendly_units(&self, section: SectionId) -> Result<Vec<UnitRecord>>;

    /// `GET enemy-units-by-section`
    async fn enemy_units(&self, section: SectionId) -> Result<Vec<UnitRecord>>;

    /// `GET unit-tactics/{id}`
    async fn unit_tactics(&self, unit: UnitId) -> Result<TacticsAnswers>;

    /// `POST engagements`
    async fn post_engagement(&self, record: &EngagementRecord) -> Result<()>;

    /// `POST tactics`
    async fn post_tactics(&self, record: &TacticsRecord) -> Result<()>;
}

/// reqwest-backed implementation of `EngagementApi`
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with explicit configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).query(query).send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "request failed");
            EngageError::from(e)
        })?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<()> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "request failed");
            EngageError::from(e)
        })?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), %body, "API error");
        Err(EngageError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

impl EngagementApi for ApiClient {
    async fn friendly_units(&self, section: SectionId) -> Result<Vec<UnitRecord>> {
        self.get_json("units-by-section", &[("SectionID", section.to_string())])
            .await
    }

    async fn enemy_units(&self, section: SectionId) -> Result<Vec<UnitRecord>> {
        self.get_json("enemy-units-by-section", &[("SectionID", section.to_string())])
            .await
    }

    async fn unit_tactics(&self, unit: UnitId) -> Result<TacticsAnswers> {
        self.get_json(&format!("unit-tactics/{}", unit.0), &[]).await
    }

    async fn post_engagement(&self, record: &EngagementRecord) -> Result<()> {
        self.post_json("engagements", record).await
    }

    async fn post_tactics(&self, record: &TacticsRecord) -> Result<()> {
        self.post_json("tactics", record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://aar.example.com/api/".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://aar.example.com/api");
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        assert_eq!(client.url("unit-tactics/4"), "http://localhost:8080/api/unit-tactics/4");
        assert_eq!(client.url("/engagements"), "http://localhost:8080/api/engagements");
    }
}
