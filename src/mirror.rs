//! In-memory mirror backend.
//!
//! Emulates the on-chain crowdfunding program and the streaming provider
//! closely enough for offline development and tests: same guards, same
//! error kinds, same event emissions.  State lives behind a single
//! `tokio::sync::Mutex`, so a successful mutation is always visible to
//! the next fetch on this instance.  The mirror is advisory, never
//! authoritative.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use async_trait::async_trait;

use crate::backend::{CampaignBackend, StreamProvider};
use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::lifecycle::{check_action, CampaignAction};
use crate::types::{
    Campaign, CampaignRecord, CreateCampaignParams, CreateStreamParams, Pledge, Stream,
    StreamRecord,
};

#[derive(Default)]
struct MirrorState {
    campaigns: HashMap<String, Campaign>,
    pledges: Vec<Pledge>,
    streams: HashMap<String, Stream>,
    events: Vec<LedgerEvent>,
    now_override: Option<i64>,
    next_pledge: u64,
    next_stream: u64,
    next_tx: u64,
}

impl MirrorState {
    fn now(&self) -> i64 {
        self.now_override.unwrap_or_else(|| Utc::now().timestamp())
    }

    fn next_tx_ref(&mut self) -> String {
        self.next_tx += 1;
        format!("tx{:08}", self.next_tx)
    }
}

/// Deterministic campaign address, the mirror's stand-in for the
/// program's seeded account address: same (creator, title) always derives
/// the same address, so a duplicate create collides.
fn derive_address(creator: &str, title: &str) -> String {
    let mut hasher = DefaultHasher::new();
    "campaign".hash(&mut hasher);
    creator.hash(&mut hasher);
    title.hash(&mut hasher);
    format!("CF{:016x}", hasher.finish())
}

pub struct MirrorBackend {
    state: Mutex<MirrorState>,
}

impl MirrorBackend {
    pub fn new() -> Self {
        MirrorBackend {
            state: Mutex::new(MirrorState::default()),
        }
    }

    /// Pin the mirror's clock.  Tests use this to simulate the passage of
    /// time; unset, the wall clock applies.
    pub async fn set_now(&self, now: i64) {
        self.state.lock().await.now_override = Some(now);
    }

    /// Everything recorded so far, oldest first.
    pub async fn events(&self) -> Vec<LedgerEvent> {
        self.state.lock().await.events.clone()
    }
}

impl Default for MirrorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CampaignBackend for MirrorBackend {
    async fn create_campaign(
        &self,
        title: &str,
        description: &str,
        goal: u64,
        duration_secs: i64,
        creator: &str,
    ) -> Result<String> {
        CreateCampaignParams {
            title: title.to_string(),
            description: description.to_string(),
            goal,
            duration_secs,
        }
        .validate()?;

        let mut state = self.state.lock().await;
        let id = derive_address(creator, title);
        if state.campaigns.contains_key(&id) {
            // Address collision: the program would fail to init the account.
            return Err(LedgerError::InvalidInput);
        }

        let now = state.now();
        let campaign = Campaign {
            id: id.clone(),
            creator: creator.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            goal,
            raised: 0,
            backers: 0,
            created_at: now,
            ends_at: now + duration_secs,
            active: true,
            canceled: false,
            funds_withdrawn: false,
        };
        state.campaigns.insert(id.clone(), campaign);
        info!("campaign created: {id} (goal {goal})");
        Ok(id)
    }

    async fn pledge(&self, campaign_id: &str, amount: u64, backer: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let now = state.now();

        let campaign = state
            .campaigns
            .get(campaign_id)
            .ok_or_else(|| LedgerError::NotFound(campaign_id.to_string()))?;
        check_action(campaign, &CampaignAction::Pledge { amount }, backer)?;

        let raised = campaign
            .raised
            .checked_add(amount)
            .ok_or(LedgerError::InvalidInput)?;
        let goal = campaign.goal;

        state.next_pledge += 1;
        let pledge = Pledge {
            id: format!("pledge{}", state.next_pledge),
            campaign_id: campaign_id.to_string(),
            backer: backer.to_string(),
            amount,
            date: now,
        };
        state.pledges.push(pledge);

        // The program emits the goal-reached event before the pledge event.
        let goal_reached = raised >= goal;
        if goal_reached {
            state.events.push(LedgerEvent::GoalReached {
                campaign_id: campaign_id.to_string(),
                goal,
                raised,
            });
            info!("campaign {campaign_id} reached its goal ({raised}/{goal})");
        }
        state.events.push(LedgerEvent::Pledge {
            campaign_id: campaign_id.to_string(),
            backer: backer.to_string(),
            amount,
        });

        let campaign = state
            .campaigns
            .get_mut(campaign_id)
            .ok_or_else(|| LedgerError::NotFound(campaign_id.to_string()))?;
        campaign.raised = raised;
        campaign.backers += 1;
        if goal_reached {
            campaign.active = false;
        }

        Ok(state.next_tx_ref())
    }

    async fn end_campaign(&self, campaign_id: &str, creator: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let campaign = state
            .campaigns
            .get_mut(campaign_id)
            .ok_or_else(|| LedgerError::NotFound(campaign_id.to_string()))?;
        check_action(campaign, &CampaignAction::End, creator)?;
        campaign.active = false;
        Ok(state.next_tx_ref())
    }

    async fn cancel_campaign(&self, campaign_id: &str, creator: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let campaign = state
            .campaigns
            .get_mut(campaign_id)
            .ok_or_else(|| LedgerError::NotFound(campaign_id.to_string()))?;
        check_action(campaign, &CampaignAction::Cancel, creator)?;
        campaign.active = false;
        campaign.canceled = true;
        state.events.push(LedgerEvent::Canceled {
            campaign_id: campaign_id.to_string(),
        });
        Ok(state.next_tx_ref())
    }

    async fn withdraw_funds(&self, campaign_id: &str, creator: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let campaign = state
            .campaigns
            .get_mut(campaign_id)
            .ok_or_else(|| LedgerError::NotFound(campaign_id.to_string()))?;
        check_action(campaign, &CampaignAction::Withdraw, creator)?;
        campaign.funds_withdrawn = true;
        let amount = campaign.raised;
        state.events.push(LedgerEvent::Withdrawn {
            campaign_id: campaign_id.to_string(),
            creator: creator.to_string(),
            amount,
        });
        info!("campaign {campaign_id}: {amount} withdrawn");
        Ok(state.next_tx_ref())
    }

    async fn fetch_campaign(&self, campaign_id: &str) -> Result<CampaignRecord> {
        let state = self.state.lock().await;
        state
            .campaigns
            .get(campaign_id)
            .cloned()
            .map(CampaignRecord::from)
            .ok_or_else(|| LedgerError::NotFound(campaign_id.to_string()))
    }

    async fn fetch_all_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .campaigns
            .values()
            .cloned()
            .map(CampaignRecord::from)
            .collect())
    }

    async fn fetch_pledges_by_backer(&self, backer: &str) -> Result<Vec<Pledge>> {
        let state = self.state.lock().await;
        Ok(state
            .pledges
            .iter()
            .filter(|p| p.backer == backer)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StreamProvider for MirrorBackend {
    async fn create_stream(&self, params: &CreateStreamParams, sender: &str) -> Result<String> {
        params.validate()?;
        let mut state = self.state.lock().await;
        state.next_stream += 1;
        let id = format!("stream{}", state.next_stream);
        let stream = Stream {
            id: id.clone(),
            campaign_id: params.campaign_id.clone(),
            sender: sender.to_string(),
            recipient: params.recipient.clone(),
            total_amount: params.total_amount,
            start_time: params.start_time,
            end_time: params.end_time,
            canceled_at: None,
        };
        state.streams.insert(id.clone(), stream);
        info!("stream created: {id} ({} over [{}, {}])", params.total_amount, params.start_time, params.end_time);
        Ok(id)
    }

    async fn cancel_stream(&self, stream_id: &str, sender: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let now = state.now();
        let stream = state
            .streams
            .get_mut(stream_id)
            .ok_or_else(|| LedgerError::NotFound(stream_id.to_string()))?;
        if stream.sender != sender {
            return Err(LedgerError::Unauthorized);
        }
        if stream.canceled_at.is_some() {
            return Err(LedgerError::InvalidInput);
        }
        stream.canceled_at = Some(now);
        Ok(state.next_tx_ref())
    }

    async fn list_streams_by_sender(&self, sender: &str) -> Result<Vec<StreamRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .streams
            .values()
            .filter(|s| s.sender == sender)
            .cloned()
            .map(StreamRecord::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATOR: &str = "8Kw7UrFz";
    const BACKER: &str = "5FHwkrdx";

    async fn mirror_with_campaign() -> (MirrorBackend, String) {
        let mirror = MirrorBackend::new();
        mirror.set_now(1_000).await;
        let id = mirror
            .create_campaign("Gallery", "desc", 10, 100_000, CREATOR)
            .await
            .unwrap();
        (mirror, id)
    }

    #[tokio::test]
    async fn create_then_fetch_reflects_the_write() {
        let (mirror, id) = mirror_with_campaign().await;
        let campaign: Campaign = mirror.fetch_campaign(&id).await.unwrap().into();
        assert_eq!(campaign.goal, 10);
        assert_eq!(campaign.created_at, 1_000);
        assert_eq!(campaign.ends_at, 101_000);
        assert!(campaign.active);
    }

    #[tokio::test]
    async fn duplicate_create_collides() {
        let (mirror, _) = mirror_with_campaign().await;
        let err = mirror
            .create_campaign("Gallery", "desc", 10, 100_000, CREATOR)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput));
    }

    #[tokio::test]
    async fn pledge_updates_counters_and_records() {
        let (mirror, id) = mirror_with_campaign().await;
        mirror.pledge(&id, 3, BACKER).await.unwrap();
        let campaign: Campaign = mirror.fetch_campaign(&id).await.unwrap().into();
        assert_eq!(campaign.raised, 3);
        assert_eq!(campaign.backers, 1);

        let pledges = mirror.fetch_pledges_by_backer(BACKER).await.unwrap();
        assert_eq!(pledges.len(), 1);
        assert_eq!(pledges[0].amount, 3);
        assert_eq!(pledges[0].date, 1_000);

        let events = mirror.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "pledge");
    }

    #[tokio::test]
    async fn backers_counts_pledges_not_identities() {
        let (mirror, id) = mirror_with_campaign().await;
        mirror.pledge(&id, 1, BACKER).await.unwrap();
        mirror.pledge(&id, 2, BACKER).await.unwrap();
        let campaign: Campaign = mirror.fetch_campaign(&id).await.unwrap().into();
        assert_eq!(campaign.backers, 2);
    }

    #[tokio::test]
    async fn reaching_the_goal_deactivates() {
        let (mirror, id) = mirror_with_campaign().await;
        mirror.pledge(&id, 12, BACKER).await.unwrap();
        let campaign: Campaign = mirror.fetch_campaign(&id).await.unwrap().into();
        assert!(!campaign.active);
        assert_eq!(campaign.raised, 12);

        let kinds: Vec<&str> = mirror.events().await.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["goal_reached", "pledge"]);

        // No further pledges once deactivated.
        let err = mirror.pledge(&id, 1, BACKER).await.unwrap_err();
        assert!(matches!(err, LedgerError::CampaignNotActive));
    }

    #[tokio::test]
    async fn rejected_cancel_leaves_state_untouched() {
        let (mirror, id) = mirror_with_campaign().await;
        let err = mirror.cancel_campaign(&id, BACKER).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized));
        let campaign: Campaign = mirror.fetch_campaign(&id).await.unwrap().into();
        assert!(campaign.active);
        assert!(!campaign.canceled);
        assert!(mirror.events().await.is_empty());
    }

    #[tokio::test]
    async fn withdraw_after_end_then_again_fails() {
        let (mirror, id) = mirror_with_campaign().await;
        mirror.pledge(&id, 5, BACKER).await.unwrap();
        mirror.end_campaign(&id, CREATOR).await.unwrap();
        mirror.withdraw_funds(&id, CREATOR).await.unwrap();

        let campaign: Campaign = mirror.fetch_campaign(&id).await.unwrap().into();
        assert!(campaign.funds_withdrawn);

        let err = mirror.withdraw_funds(&id, CREATOR).await.unwrap_err();
        assert!(matches!(err, LedgerError::FundsAlreadyWithdrawn));
    }

    #[tokio::test]
    async fn unknown_campaign_is_not_found() {
        let mirror = MirrorBackend::new();
        let err = mirror.fetch_campaign("missing").await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn stream_cancel_freezes_at_the_mirror_clock() {
        let (mirror, id) = mirror_with_campaign().await;
        let params = CreateStreamParams {
            campaign_id: id,
            recipient: CREATOR.to_string(),
            total_amount: 100,
            start_time: 1_000,
            end_time: 1_100,
        };
        let stream_id = mirror.create_stream(&params, BACKER).await.unwrap();

        mirror.set_now(1_040).await;
        mirror.cancel_stream(&stream_id, BACKER).await.unwrap();

        let streams = mirror.list_streams_by_sender(BACKER).await.unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].canceled_at, Some(1_040));

        // Cancelling twice is an error.
        let err = mirror.cancel_stream(&stream_id, BACKER).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput));
    }

    #[tokio::test]
    async fn only_the_sender_cancels_a_stream() {
        let (mirror, id) = mirror_with_campaign().await;
        let params = CreateStreamParams {
            campaign_id: id,
            recipient: CREATOR.to_string(),
            total_amount: 100,
            start_time: 1_000,
            end_time: 1_100,
        };
        let stream_id = mirror.create_stream(&params, BACKER).await.unwrap();
        let err = mirror.cancel_stream(&stream_id, CREATOR).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized));
    }
}
