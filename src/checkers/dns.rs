//! DNS checker
//!
//! Issues an A-record lookup for the service's request hostname against the
//! nameserver named by the service's connection target. The first returned
//! address is compared exactly against the expected IP string.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use tracing::debug;

use super::{Outcome, ServiceChecker};
use crate::storage::Service;

const DNS_PORT: u16 = 53;

pub struct DnsChecker {
    timeout: Duration,
}

impl DnsChecker {
    /// `timeout` bounds both the single query and the whole lookup
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn resolve_first_a(&self, server: &str, name: &str) -> Result<String> {
        let ip: IpAddr = server
            .parse()
            .with_context(|| format!("invalid nameserver address: {server}"))?;

        let mut resolver_config = ResolverConfig::new();
        resolver_config.add_name_server(NameServerConfig::new(
            SocketAddr::new(ip, DNS_PORT),
            Protocol::Udp,
        ));

        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = 1;

        let resolver = TokioAsyncResolver::tokio(resolver_config, opts);

        // opts.timeout caps one query; the outer timeout caps the lookup's
        // total lifetime at the same bound.
        let lookup = tokio::time::timeout(self.timeout, resolver.ipv4_lookup(name))
            .await
            .context("lookup exceeded lifetime bound")?
            .context("resolution failed")?;

        let first = lookup.iter().next().context("empty answer section")?;
        Ok(first.to_string())
    }
}

#[async_trait]
impl ServiceChecker for DnsChecker {
    async fn check(&self, service: &Service) -> Outcome {
        let observed = match self
            .resolve_first_a(&service.connection, &service.request)
            .await
        {
            Ok(observed) => observed,
            Err(e) => {
                debug!("dns probe for {} failed: {e:#}", service.name);
                return Outcome::fail(format!(
                    "DNS Timeout on request for: {} using server: {}",
                    service.request, service.connection
                ));
            }
        };

        if observed == service.expected {
            Outcome::pass(observed)
        } else {
            let diagnostic = format!(
                "DNS Request result: {observed} did not match expected: {}",
                service.expected
            );
            Outcome::mismatch(observed, diagnostic)
        }
    }
}
