//! Client configuration loaded from environment variables.

use crate::errors::{LedgerError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of the authoritative backend
    pub rpc_url: String,
    /// Address of the crowdfunding program on that backend
    pub program_id: String,
    /// How long to wait for a backend round trip before treating the call
    /// as failed (the mutation may still land later; see the repository's
    /// read-after-write contract)
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(rpc_url: impl Into<String>, program_id: impl Into<String>) -> Self {
        ClientConfig {
            rpc_url: rpc_url.into(),
            program_id: program_id.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(ClientConfig {
            rpc_url: env_var("RPC_URL")
                .unwrap_or_else(|_| "https://api.devnet.solana.com".to_string()),
            program_id: env_var("PROGRAM_ID").map_err(|_| {
                LedgerError::Config("PROGRAM_ID environment variable is required".to_string())
            })?,
            request_timeout_secs: env_var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| LedgerError::Config("Invalid REQUEST_TIMEOUT_SECS".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| LedgerError::Config(format!("Missing env var: {key}")))
}
