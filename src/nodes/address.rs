//! Decides which literal address a node is stored with.
//!
//! An operator may pin the address explicitly. Otherwise the address is derived
//! from the node's `server` through a [`HostResolver`]. Either way the result is a
//! literal IPv4/IPv6 address; a hostname is never handed back.

use async_trait::async_trait;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No server address given")]
    EmptyHost,
    #[error("Failed to resolve {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} did not resolve to any address")]
    NoAddress(String),
}

/// Hostname resolution capability.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Resolves through the operating system resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|source| ResolveError::Lookup {
                host: host.to_string(),
                source,
            })?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Returns the trimmed input when it is a syntactically valid IP literal.
pub fn ip_literal(candidate: &str) -> Option<&str> {
    let trimmed = candidate.trim();
    trimmed.parse::<IpAddr>().ok().map(|_| trimmed)
}

#[derive(Clone)]
pub struct AddressResolver {
    resolver: Arc<dyn HostResolver>,
}

impl AddressResolver {
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self { resolver }
    }

    /// A valid `explicit_override` wins verbatim. Anything else (absent, blank or
    /// not an IP literal) falls through to `server`.
    pub async fn resolve(
        &self,
        server: &str,
        explicit_override: Option<&str>,
    ) -> Result<String, ResolveError> {
        if let Some(literal) = explicit_override.and_then(ip_literal) {
            return Ok(literal.to_string());
        }

        let host = server.trim();
        if host.is_empty() {
            return Err(ResolveError::EmptyHost);
        }
        if let Some(literal) = ip_literal(host) {
            return Ok(literal.to_string());
        }

        let addrs = self.resolver.lookup(host).await?;
        // Prefer IPv4 when the name has both families.
        let chosen = addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .ok_or_else(|| ResolveError::NoAddress(host.to_string()))?;
        debug!(host, address = %chosen, "Resolved node server address.");
        Ok(chosen.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticResolver;

    fn resolver_with(entries: &[(&str, &[&str])]) -> AddressResolver {
        AddressResolver::new(Arc::new(StaticResolver::new(entries)))
    }

    #[tokio::test]
    async fn valid_override_is_used_verbatim_regardless_of_server() {
        let resolver = resolver_with(&[("relay.example.com", &["203.0.113.9"])]);
        for literal in ["1.2.3.4", "2001:db8::1", "::1", "10.0.0.254"] {
            for server in ["relay.example.com", "", "unknown.invalid", "198.51.100.1"] {
                let resolved = resolver.resolve(server, Some(literal)).await.unwrap();
                assert_eq!(resolved, literal);
            }
        }
    }

    #[tokio::test]
    async fn override_is_trimmed() {
        let resolver = resolver_with(&[]);
        let resolved = resolver.resolve("relay.example.com", Some("  192.0.2.7 \n")).await.unwrap();
        assert_eq!(resolved, "192.0.2.7");
    }

    #[tokio::test]
    async fn invalid_override_falls_back_to_server() {
        let resolver = resolver_with(&[("relay.example.com", &["203.0.113.9"])]);
        for bad in ["", "   ", "relay.example.com", "1.2.3", "999.1.1.1"] {
            let resolved = resolver.resolve("relay.example.com", Some(bad)).await.unwrap();
            assert_eq!(resolved, "203.0.113.9");
        }
        let resolved = resolver.resolve(" relay.example.com ", None).await.unwrap();
        assert_eq!(resolved, "203.0.113.9");
    }

    #[tokio::test]
    async fn literal_server_needs_no_lookup() {
        let resolver = resolver_with(&[]);
        assert_eq!(resolver.resolve("198.51.100.1", None).await.unwrap(), "198.51.100.1");
    }

    #[tokio::test]
    async fn prefers_ipv4_when_both_families_resolve() {
        let resolver = resolver_with(&[("dual.example.com", &["2001:db8::5", "192.0.2.5"])]);
        assert_eq!(resolver.resolve("dual.example.com", None).await.unwrap(), "192.0.2.5");

        let resolver = resolver_with(&[("v6.example.com", &["2001:db8::6"])]);
        assert_eq!(resolver.resolve("v6.example.com", None).await.unwrap(), "2001:db8::6");
    }

    #[tokio::test]
    async fn unresolvable_hosts_are_errors_not_hostnames() {
        let resolver = resolver_with(&[("empty.example.com", &[])]);
        assert!(matches!(
            resolver.resolve("missing.example.com", None).await,
            Err(ResolveError::Lookup { .. })
        ));
        assert!(matches!(
            resolver.resolve("empty.example.com", None).await,
            Err(ResolveError::NoAddress(_))
        ));
        assert!(matches!(resolver.resolve("  ", None).await, Err(ResolveError::EmptyHost)));
    }
}
