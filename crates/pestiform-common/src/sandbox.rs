use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::config::PestiformConfig;
use crate::error::PestiformError;

/// An HTTP client that only allows requests to approved hosts.
///
/// Every request inherits the client-wide timeout, so a stalled remote
/// service cannot hold a request open indefinitely.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client restricted to `hosts` with a per-request `timeout`.
    pub fn new<I, S>(hosts: I, timeout: Duration) -> Result<Self, PestiformError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowlist = hosts.into_iter().map(Into::into).collect();

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("pestiform/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PestiformError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Client allowed to reach the resolver and PubChem hosts named in `config`.
    pub fn from_config(config: &PestiformConfig) -> Result<Self, PestiformError> {
        Self::new(
            config.allowed_hosts(),
            Duration::from_secs(config.services.http_timeout_secs),
        )
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        // Exact match or a subdomain of an allowed host
        self.allowlist
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed)))
    }

    /// Guarded GET request builder.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, PestiformError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    /// Guarded POST request builder.
    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, PestiformError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }

    fn check(&self, url: &str) -> Result<(), PestiformError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(PestiformError::SecurityError(format!(
                "Outbound request blocked: host not in allowlist for URL {}",
                url
            )))
        }
    }
}
