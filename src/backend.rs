//! Backend contracts — the narrow interfaces through which entity state
//! is read and mutated.
//!
//! All implementations must satisfy:
//! - A successful mutating call is visible to an immediately following
//!   fetch on the same instance (no read-after-write anomaly).  No such
//!   guarantee holds across instances — a mirror may lag the chain.
//! - A failed mutation leaves entity state exactly as before the call.
//! - Domain rejections surface as their error kind unchanged; transport
//!   failures surface as `BackendUnavailable`, never as a domain kind.

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{CampaignRecord, CreateStreamParams, Pledge, StreamRecord};

/// System of record for campaigns.
///
/// Implemented by [`RpcBackend`](crate::rpc::RpcBackend), which forwards
/// to the authoritative on-chain program, and by
/// [`MirrorBackend`](crate::mirror::MirrorBackend), which emulates it in
/// memory.  Callers depend only on this trait, never on which variant is
/// behind it.
#[async_trait]
pub trait CampaignBackend: Send + Sync {
    /// Register a new campaign.  Returns its backend-assigned address.
    async fn create_campaign(
        &self,
        title: &str,
        description: &str,
        goal: u64,
        duration_secs: i64,
        creator: &str,
    ) -> Result<String>;

    /// Contribute `amount` to a campaign.  Returns a transaction reference.
    async fn pledge(&self, campaign_id: &str, amount: u64, backer: &str) -> Result<String>;

    /// Deactivate a campaign without canceling it.
    async fn end_campaign(&self, campaign_id: &str, creator: &str) -> Result<String>;

    /// Cancel a campaign.
    async fn cancel_campaign(&self, campaign_id: &str, creator: &str) -> Result<String>;

    /// Withdraw the raised funds to the creator.
    async fn withdraw_funds(&self, campaign_id: &str, creator: &str) -> Result<String>;

    async fn fetch_campaign(&self, campaign_id: &str) -> Result<CampaignRecord>;

    /// All campaigns known to the backend.  Order is unspecified.
    async fn fetch_all_campaigns(&self) -> Result<Vec<CampaignRecord>>;

    /// Pledge records made by `backer`, for dashboard-style queries.
    async fn fetch_pledges_by_backer(&self, backer: &str) -> Result<Vec<Pledge>>;
}

/// Streaming-payment provider.
///
/// The accrual engine operates purely on the returned [`StreamRecord`]
/// fields, whichever provider supplied them.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Open a stream from `sender`.  Returns its provider-assigned id.
    async fn create_stream(&self, params: &CreateStreamParams, sender: &str) -> Result<String>;

    /// Cancel a stream, freezing accrual at the cancellation instant.
    /// Returns a transaction reference.
    async fn cancel_stream(&self, stream_id: &str, sender: &str) -> Result<String>;

    async fn list_streams_by_sender(&self, sender: &str) -> Result<Vec<StreamRecord>>;
}
