//! Action dispatcher — serializes mutating actions per entity and
//! returns accrual-consistent snapshots.
//!
//! One logical actor per client session: at most one mutating action may
//! be in flight for a given entity id at a time.  A second call for the
//! same id is rejected locally with `ActionInProgress` rather than
//! forwarded; unrelated ids proceed independently.  Once an action has
//! been dispatched it is not cancellable — a timeout is the transport's
//! concern, and reconciliation happens by re-fetching.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::accrual::{percent_funded, stream_status, streamed_amount, time_left, TimeLeft};
use crate::backend::{CampaignBackend, StreamProvider};
use crate::errors::{LedgerError, Result};
use crate::lifecycle::CampaignAction;
use crate::repository::{LedgerRepository, StreamLedger};
use crate::types::{Campaign, CreateCampaignParams, CreateStreamParams, Stream, StreamStatus};

/// A campaign together with its derived accrual fields, computed at a
/// single instant so the snapshot is internally consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignView {
    pub campaign: Campaign,
    pub percent_funded: f64,
    pub time_left: TimeLeft,
}

impl CampaignView {
    pub fn at(campaign: Campaign, now: i64) -> Result<Self> {
        let percent = percent_funded(campaign.goal, campaign.raised)?;
        let left = time_left(now, campaign.ends_at);
        Ok(CampaignView {
            campaign,
            percent_funded: percent,
            time_left: left,
        })
    }
}

/// A stream with its derived amount and status at a single instant.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamView {
    pub stream: Stream,
    pub streamed_amount: f64,
    pub status: StreamStatus,
}

impl StreamView {
    pub fn at(stream: Stream, now: i64) -> Result<Self> {
        let amount = streamed_amount(now, &stream)?;
        let status = stream_status(now, &stream);
        Ok(StreamView {
            stream,
            streamed_amount: amount,
            status,
        })
    }
}

/// Releases the in-flight slot when the action completes, success or
/// failure.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.lock().expect("lock poisoned").remove(&self.id);
    }
}

/// Sequences user-initiated actions: local input check → repository
/// mutation → accrual re-derivation.  Failures pass through unchanged.
pub struct ActionDispatcher<B: CampaignBackend, P: StreamProvider> {
    campaigns: LedgerRepository<B>,
    streams: StreamLedger<P>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<B: CampaignBackend, P: StreamProvider> ActionDispatcher<B, P> {
    pub fn new(backend: Arc<B>, provider: Arc<P>) -> Self {
        ActionDispatcher {
            campaigns: LedgerRepository::new(backend),
            streams: StreamLedger::new(provider),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn campaigns(&self) -> &LedgerRepository<B> {
        &self.campaigns
    }

    pub fn streams(&self) -> &StreamLedger<P> {
        &self.streams
    }

    fn acquire(&self, id: &str) -> Result<InFlightGuard> {
        let mut set = self.in_flight.lock().expect("lock poisoned");
        if !set.insert(id.to_string()) {
            return Err(LedgerError::ActionInProgress(id.to_string()));
        }
        Ok(InFlightGuard {
            set: Arc::clone(&self.in_flight),
            id: id.to_string(),
        })
    }

    /// Create a campaign and return its first snapshot.
    pub async fn create_campaign(
        &self,
        params: &CreateCampaignParams,
        creator: &str,
    ) -> Result<CampaignView> {
        let id = self.campaigns.create(params, creator).await?;
        let campaign = self.campaigns.get(&id).await?;
        CampaignView::at(campaign, Utc::now().timestamp())
    }

    /// Dispatch a mutating campaign action and return the re-derived
    /// snapshot of the updated entity.
    pub async fn dispatch(
        &self,
        id: &str,
        action: CampaignAction,
        caller: &str,
    ) -> Result<CampaignView> {
        let _guard = self.acquire(id)?;
        let updated = self.campaigns.apply_action(id, &action, caller).await?;
        CampaignView::at(updated, Utc::now().timestamp())
    }

    /// Open a stream and return its first snapshot.
    pub async fn create_stream(
        &self,
        params: &CreateStreamParams,
        sender: &str,
    ) -> Result<StreamView> {
        params.validate()?;
        let id = self.streams.create(params, sender).await?;
        let stream = self.streams.get(&id, sender).await?;
        StreamView::at(stream, Utc::now().timestamp())
    }

    /// Cancel a stream and return its frozen snapshot.
    pub async fn cancel_stream(&self, stream_id: &str, sender: &str) -> Result<StreamView> {
        let _guard = self.acquire(stream_id)?;
        self.streams.cancel(stream_id, sender).await?;
        let stream = self.streams.get(stream_id, sender).await?;
        StreamView::at(stream, Utc::now().timestamp())
    }
}
