//! Provider identities, the client seam, the fallback manager and key health.

pub mod client;
pub mod credential_hash;
pub mod http;
pub mod key_monitor;
pub mod logging;
pub mod manager;
pub mod provider;
pub mod response;
pub mod token;

pub use client::{LlmClient, ProviderClient};
pub use key_monitor::{KeyStatusMonitor, ProviderStatus};
pub use manager::{Answer, ProviderConfigUpdate, ProviderManager, ProviderSummary};
pub use provider::ProviderId;
pub use response::{CallOptions, KeyStatus, LlmResponse};
