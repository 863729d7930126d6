//! Propagation of node addresses to DNS records.

use async_trait::async_trait;
use thiserror::Error;

pub mod cloudflare;

pub use cloudflare::CloudflareDnsSync;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("DNS provider rejected the request: {0}")]
    Api(String),
    #[error("Not an IP address: {0}")]
    InvalidAddress(String),
}

/// Points `<label>.<base domain>` at a literal address, creating the record if needed.
#[async_trait]
pub trait DnsSync: Send + Sync {
    async fn upsert_record(&self, label: &str, address: &str) -> Result<(), SyncError>;
}

/// The part of `server` in front of `.<base_domain>`. A server outside the base
/// domain is used whole.
pub fn subdomain_label<'a>(server: &'a str, base_domain: &str) -> &'a str {
    let suffix = format!(".{base_domain}");
    match server.find(&suffix) {
        Some(end) => &server[..end],
        None => server,
    }
}
