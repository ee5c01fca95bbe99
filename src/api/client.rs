//! Blocking HTTP client for the inventory backend

use serde::Serialize;
use std::time::Duration;

use crate::api::types::{AssetPayload, BulkCreateResponse, NewOptionsReport};
use crate::api::{ApiError, InventoryApi};
use crate::core::Config;

#[derive(Serialize)]
struct BulkRequest<'a> {
    assets: &'a [AssetPayload],
    mode: &'a str,
}

#[derive(Serialize)]
struct PrecheckRequest<'a> {
    assets: &'a [AssetPayload],
}

/// JSON-over-HTTP implementation of [`InventoryApi`].
pub struct HttpInventoryApi {
    base_url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpInventoryApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.api_url(), config.api_token.clone())
    }

    fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| status.to_string());
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

impl InventoryApi for HttpInventoryApi {
    fn bulk_create(
        &self,
        assets: &[AssetPayload],
        mode: &str,
    ) -> Result<BulkCreateResponse, ApiError> {
        let response = self.post("/assets/bulk", &BulkRequest { assets, mode })?;
        response
            .json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    fn precheck_new_options(&self, assets: &[AssetPayload]) -> Result<NewOptionsReport, ApiError> {
        let response = self.post("/assets/bulk/precheck", &PrecheckRequest { assets })?;
        response
            .json()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
