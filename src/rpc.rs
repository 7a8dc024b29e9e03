//! JSON-RPC adapters for the authoritative backends.
//!
//! [`RpcBackend`] speaks to the gateway fronting the on-chain
//! crowdfunding program; [`RpcStreamProvider`] to the streaming-payment
//! provider.  Both share the same envelope handling: numeric error codes
//! in the response map 1:1 onto domain error kinds, transport failures
//! surface as `BackendUnavailable`.
//!
//! No automatic retry happens here.  Domain rejections must reach the
//! caller unchanged, and `BackendUnavailable` is the caller's retry
//! decision — a timed-out mutation may still land, so callers reconcile
//! by re-fetching, not by assuming failure means no-op.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use async_trait::async_trait;

use crate::backend::{CampaignBackend, StreamProvider};
use crate::config::ClientConfig;
use crate::errors::{LedgerError, Result};
use crate::types::{CampaignRecord, CreateStreamParams, Pledge, StreamRecord};

// ─────────────────────────────────────────────────────────
// JSON-RPC envelope
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

async fn call(client: &Client, url: &str, method: &str, params: Value) -> Result<Value> {
    debug!("rpc call {method}");

    let response = client
        .post(url)
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LedgerError::BackendUnavailable(format!(
            "HTTP {status} from {method}"
        )));
    }

    let body: RpcResponse = response.json().await?;

    if let Some(err) = body.error {
        return Err(LedgerError::from_code(err.code, &err.message));
    }

    body.result
        .ok_or_else(|| LedgerError::BackendUnavailable(format!("empty result from {method}")))
}

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(LedgerError::from)
}

// ─────────────────────────────────────────────────────────
// Campaign backend
// ─────────────────────────────────────────────────────────

/// Authoritative campaign backend over JSON-RPC.
pub struct RpcBackend {
    client: Client,
    url: String,
    program_id: String,
}

impl RpcBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(RpcBackend {
            client: build_client(config.request_timeout_secs)?,
            url: config.rpc_url.clone(),
            program_id: config.program_id.clone(),
        })
    }

    async fn call(&self, method: &str, mut params: Value) -> Result<Value> {
        params["programId"] = json!(self.program_id);
        call(&self.client, &self.url, method, params).await
    }
}

#[async_trait]
impl CampaignBackend for RpcBackend {
    async fn create_campaign(
        &self,
        title: &str,
        description: &str,
        goal: u64,
        duration_secs: i64,
        creator: &str,
    ) -> Result<String> {
        let result = self
            .call(
                "createCampaign",
                json!({
                    "title": title,
                    "description": description,
                    "goal": goal,
                    "durationSeconds": duration_secs,
                    "creator": creator,
                }),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn pledge(&self, campaign_id: &str, amount: u64, backer: &str) -> Result<String> {
        let result = self
            .call(
                "pledge",
                json!({
                    "campaignAddress": campaign_id,
                    "amount": amount,
                    "backer": backer,
                }),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn end_campaign(&self, campaign_id: &str, creator: &str) -> Result<String> {
        let result = self
            .call(
                "endCampaign",
                json!({ "campaignAddress": campaign_id, "creator": creator }),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn cancel_campaign(&self, campaign_id: &str, creator: &str) -> Result<String> {
        let result = self
            .call(
                "cancelCampaign",
                json!({ "campaignAddress": campaign_id, "creator": creator }),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn withdraw_funds(&self, campaign_id: &str, creator: &str) -> Result<String> {
        let result = self
            .call(
                "withdrawFunds",
                json!({ "campaignAddress": campaign_id, "creator": creator }),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn fetch_campaign(&self, campaign_id: &str) -> Result<CampaignRecord> {
        let result = self
            .call("fetchCampaign", json!({ "campaignAddress": campaign_id }))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn fetch_all_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        let result = self.call("fetchAllCampaigns", json!({})).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn fetch_pledges_by_backer(&self, backer: &str) -> Result<Vec<Pledge>> {
        let result = self
            .call("fetchPledgesByBacker", json!({ "backer": backer }))
            .await?;
        Ok(serde_json::from_value(result)?)
    }
}

// ─────────────────────────────────────────────────────────
// Stream provider
// ─────────────────────────────────────────────────────────

/// Streaming-payment provider over JSON-RPC.
pub struct RpcStreamProvider {
    client: Client,
    url: String,
}

impl RpcStreamProvider {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(RpcStreamProvider {
            client: build_client(timeout_secs)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl StreamProvider for RpcStreamProvider {
    async fn create_stream(&self, params: &CreateStreamParams, sender: &str) -> Result<String> {
        let result = call(
            &self.client,
            &self.url,
            "createStream",
            json!({
                "campaignId": params.campaign_id,
                "recipient": params.recipient,
                "amount": params.total_amount,
                "startTime": params.start_time,
                "endTime": params.end_time,
                "sender": sender,
            }),
        )
        .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn cancel_stream(&self, stream_id: &str, sender: &str) -> Result<String> {
        let result = call(
            &self.client,
            &self.url,
            "cancelStream",
            json!({ "streamId": stream_id, "sender": sender }),
        )
        .await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn list_streams_by_sender(&self, sender: &str) -> Result<Vec<StreamRecord>> {
        let result = call(
            &self.client,
            &self.url,
            "listStreamsBySender",
            json!({ "sender": sender }),
        )
        .await?;
        Ok(serde_json::from_value(result)?)
    }
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
