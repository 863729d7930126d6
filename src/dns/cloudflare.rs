use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::{debug, info};

use super::{DnsSync, SyncError};

const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";
const AUTOMATIC_TTL: u32 = 1;

/// Keeps node records in a Cloudflare zone up to date through the v4 API.
pub struct CloudflareDnsSync {
    client: Client,
    api_base: String,
    api_token: String,
    zone_id: String,
    base_domain: String,
    proxied: bool,
}

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct DnsRecord {
    id: String,
}

#[derive(Serialize)]
struct DnsRecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

impl CloudflareDnsSync {
    pub fn new(api_token: String, zone_id: String, base_domain: String, proxied: bool) -> Self {
        Self {
            client: Client::new(),
            api_base: CLOUDFLARE_API_BASE.to_string(),
            api_token,
            zone_id,
            base_domain,
            proxied,
        }
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, self.zone_id)
    }

    fn unwrap_envelope<T>(status: reqwest::StatusCode, envelope: ApiEnvelope<T>) -> Result<Option<T>, SyncError> {
        if status.is_success() && envelope.success {
            return Ok(envelope.result);
        }
        let details = envelope
            .errors
            .iter()
            .map(|e| format!("{} ({})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ");
        Err(SyncError::Api(format!("status {status}: {details}")))
    }

    async fn find_record(&self, record_type: &str, name: &str) -> Result<Option<DnsRecord>, SyncError> {
        let response = self
            .client
            .get(self.records_url())
            .bearer_auth(&self.api_token)
            .query(&[("type", record_type), ("name", name)])
            .send()
            .await?;
        let status = response.status();
        let envelope: ApiEnvelope<Vec<DnsRecord>> = response.json().await?;
        let records = Self::unwrap_envelope(status, envelope)?.unwrap_or_default();
        Ok(records.into_iter().next())
    }
}

pub(crate) fn record_type_for(address: &str) -> Result<&'static str, SyncError> {
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => Ok("A"),
        Ok(IpAddr::V6(_)) => Ok("AAAA"),
        Err(_) => Err(SyncError::InvalidAddress(address.to_string())),
    }
}

#[async_trait]
impl DnsSync for CloudflareDnsSync {
    async fn upsert_record(&self, label: &str, address: &str) -> Result<(), SyncError> {
        let record_type = record_type_for(address)?;
        let name = format!("{label}.{}", self.base_domain);
        let payload = DnsRecordPayload {
            record_type,
            name: &name,
            content: address,
            ttl: AUTOMATIC_TTL,
            proxied: self.proxied,
        };

        let request = match self.find_record(record_type, &name).await? {
            Some(existing) => {
                debug!(record = %name, record_id = %existing.id, "Updating existing DNS record.");
                self.client.put(format!("{}/{}", self.records_url(), existing.id))
            }
            None => {
                debug!(record = %name, "Creating DNS record.");
                self.client.post(self.records_url())
            }
        };

        let response = request
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let envelope: ApiEnvelope<serde_json::Value> = response.json().await?;
        Self::unwrap_envelope(status, envelope)?;

        info!(record = %name, address, "DNS record synchronised.");
        Ok(())
    }
}
