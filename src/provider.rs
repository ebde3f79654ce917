//! Configuration service client.
//!
//! The service answers `GET <base_url><store>` with a JSON array of
//! `{"network": {...}}` records. Only the first record is used.

use crate::config::{NetworkInfo, StoreRecord};
use crate::config_loader::ApiSettings;
use crate::error::AssignError;
use std::time::Duration;

/// Source of the per-store network document
pub trait ConfigProvider {
    fn fetch(&self, store: &str) -> Result<NetworkInfo, AssignError>;
}

impl<P: ConfigProvider + ?Sized> ConfigProvider for &P {
    fn fetch(&self, store: &str) -> Result<NetworkInfo, AssignError> {
        (**self).fetch(store)
    }
}

/// Decode a service response body into a validated [`NetworkInfo`]
pub fn parse_store_response(body: &str) -> Result<NetworkInfo, AssignError> {
    let records: Vec<StoreRecord> = serde_json::from_str(body)
        .map_err(|e| AssignError::ConfigFetch(format!("parsing JSON: {}", e)))?;

    if records.len() > 1 {
        log::debug!("Response holds {} records, using the first", records.len());
    }

    let info = records
        .into_iter()
        .next()
        .map(|record| record.network)
        .ok_or_else(|| AssignError::ConfigFetch("no data received from API".to_string()))?;

    info.validate()?;
    Ok(info)
}

/// Fetches the network document over HTTP with an API key header
pub struct HttpConfigProvider {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl HttpConfigProvider {
    pub fn new(settings: &ApiSettings) -> Self {
        Self::with_timeout(&settings.base_url, &settings.api_key, settings.timeout)
    }

    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        HttpConfigProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Request URL for `store`
    pub fn url(&self, store: &str) -> String {
        format!("{}{}", self.base_url, store)
    }
}

impl ConfigProvider for HttpConfigProvider {
    fn fetch(&self, store: &str) -> Result<NetworkInfo, AssignError> {
        let url = self.url(store);
        log::info!("Fetching network configuration from {}", url);

        let response = self
            .agent
            .get(&url)
            .set("X-API-KEY", &self.api_key)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => AssignError::ConfigFetch(format!("{} answered HTTP {}", url, code)),
                ureq::Error::Transport(t) => AssignError::ConfigFetch(format!("making request to {}: {}", url, t)),
            })?;

        let body = response
            .into_string()
            .map_err(|e| AssignError::ConfigFetch(format!("reading response body: {}", e)))?;

        parse_store_response(&body)
    }
}
