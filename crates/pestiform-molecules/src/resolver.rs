//! Chemical name → SMILES resolution.
//!
//! Backed by the NCI/CADD Chemical Identifier Resolver:
//!   GET {base}/{identifier}/smiles  →  plain-text SMILES
//!
//! The identifier is percent-encoded as a single path segment, so names
//! containing `/`, spaces or brackets reach the service intact.

use async_trait::async_trait;
use pestiform_common::{PestiformError, SandboxClient};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("identifier is empty")]
    EmptyIdentifier,

    #[error("resolver has no structure for {0:?}")]
    NotFound(String),

    #[error("resolver returned HTTP {0}")]
    Status(u16),

    #[error("resolver returned an empty body")]
    EmptyResponse,

    #[error("resolver request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid resolver URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Client(#[from] PestiformError),
}

/// Anything that turns a free-text chemical identifier into SMILES.
#[async_trait]
pub trait StructureResolver: Send + Sync {
    async fn resolve(&self, identifier: &str) -> Result<String, ResolveError>;
}

/// Chemical Identifier Resolver client.
#[derive(Debug, Clone)]
pub struct CactusResolver {
    client: SandboxClient,
    base_url: String,
}

impl CactusResolver {
    pub fn new(client: SandboxClient, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    /// `{base}/{encoded identifier}/smiles`
    pub fn lookup_url(&self, identifier: &str) -> Result<Url, ResolveError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| ResolveError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(identifier)
            .push("smiles");
        Ok(url)
    }
}

#[async_trait]
impl StructureResolver for CactusResolver {
    #[instrument(skip(self))]
    async fn resolve(&self, identifier: &str) -> Result<String, ResolveError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ResolveError::EmptyIdentifier);
        }

        let url = self.lookup_url(identifier)?;
        debug!(%url, "Resolving chemical identifier");

        let resp = self.client.get(url.as_str())?.send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound(identifier.to_string()));
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "Resolver request failed");
            return Err(ResolveError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        // The resolver may list several structures, one per line; take the first
        let smiles = body.lines().map(str::trim).find(|l| !l.is_empty()).ok_or(ResolveError::EmptyResponse)?;
        debug!(smiles, "Resolved");
        Ok(smiles.to_string())
    }
}
