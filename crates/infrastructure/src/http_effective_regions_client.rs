use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use regiongate_application::EffectiveRegionsSource;
use regiongate_core::{AppError, AppResult, UserId};
use regiongate_domain::RegionName;

#[cfg(test)]
mod tests;

#[derive(Debug, Deserialize)]
struct EffectiveRegionEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EffectiveRegionsResponse {
    success: bool,
    #[serde(default)]
    regions: Vec<EffectiveRegionEntry>,
    #[serde(default)]
    message: Option<String>,
}

impl EffectiveRegionsResponse {
    fn into_regions(self) -> AppResult<BTreeSet<RegionName>> {
        if !self.success {
            return Err(AppError::Internal(format!(
                "effective regions endpoint reported failure: {}",
                self.message.as_deref().unwrap_or("no message")
            )));
        }

        self.regions
            .into_iter()
            .map(|entry| {
                RegionName::new(entry.name).map_err(|error| {
                    AppError::Internal(format!(
                        "effective regions endpoint returned an invalid region: {error}"
                    ))
                })
            })
            .collect()
    }
}

/// Fetches effective regions from the API over HTTP.
pub struct HttpEffectiveRegionsClient {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl HttpEffectiveRegionsClient {
    /// Creates a client for the given API base URL and bearer token.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            access_token: access_token.into(),
        }
    }

    fn endpoint(&self, user_id: UserId) -> String {
        format!(
            "{}/region-access/effective-regions?userId={user_id}",
            self.base_url
        )
    }
}

#[async_trait]
impl EffectiveRegionsSource for HttpEffectiveRegionsClient {
    async fn fetch_effective_regions(&self, user_id: UserId) -> AppResult<BTreeSet<RegionName>> {
        let response = self
            .http_client
            .get(self.endpoint(user_id))
            .bearer_auth(self.access_token.as_str())
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("effective regions request failed: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "effective regions request failed with status {status}: {body}"
            )));
        }

        let regions = response
            .json::<EffectiveRegionsResponse>()
            .await
            .map_err(|error| {
                AppError::Internal(format!("invalid effective regions response: {error}"))
            })?
            .into_regions()?;

        debug!(user_id = %user_id, region_count = regions.len(), "fetched effective regions");
        Ok(regions)
    }
}
