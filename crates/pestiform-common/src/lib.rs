//! pestiform-common: Shared errors, configuration and the outbound HTTP client.

pub mod config;
pub mod error;
pub mod sandbox;

// Re-export commonly used types
pub use config::PestiformConfig;
pub use error::{PestiformError, Result};
pub use sandbox::SandboxClient;
