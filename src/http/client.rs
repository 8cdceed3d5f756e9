//! Transport client acquisition strategies.
//!
//! Both engines receive a [`ClientProvider`] value instead of reaching for a
//! hidden global, so the lifecycle of the pooled transport client is explicit
//! and testable. The default strategy memoizes one process-wide client; the
//! initialization races through a single critical section, so concurrent
//! first calls cannot construct two clients.

use std::sync::OnceLock;

use reqwest::Client;
use tracing::debug;

static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Strategy for obtaining the transport client used by a dispatch or
/// download engine.
///
/// The library deliberately imposes no request timeout of its own; it
/// delegates to whatever the transport client is configured with. Callers
/// needing timeouts build their own `reqwest::Client` and inject it via
/// [`ClientProvider::Custom`].
#[derive(Debug, Clone, Default)]
pub enum ClientProvider {
    /// Reuse one lazily-initialized process-wide client (connection pooling
    /// shared across all calls).
    #[default]
    Shared,
    /// Build a fresh client for every call; nothing is cached.
    PerCall,
    /// Use the supplied, caller-configured client.
    Custom(Client),
}

impl ClientProvider {
    /// Returns a client handle according to this strategy.
    ///
    /// `reqwest::Client` is internally reference-counted, so the returned
    /// handle shares the underlying pool with its source.
    #[must_use]
    pub fn client(&self) -> Client {
        match self {
            Self::Shared => SHARED_CLIENT.get_or_init(build_default_client).clone(),
            Self::PerCall => {
                debug!("building fresh transport client for single call");
                build_default_client()
            }
            Self::Custom(client) => client.clone(),
        }
    }
}

/// Builds the default transport client.
///
/// # Panics
///
/// Panics if the client builder fails with the static configuration. This
/// should never happen in practice.
#[allow(clippy::expect_used)]
fn build_default_client() -> Client {
    Client::builder()
        .gzip(true)
        .user_agent(default_user_agent())
        .build()
        .expect("failed to build transport client with static configuration")
}

/// Default User-Agent identifying the library (good citizenship; RFC 9308).
fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("netkit/{version}")
}
