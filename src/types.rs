//! Domain entities and their wire records.
//!
//! The domain structs (`Campaign`, `Pledge`, `Stream`) are what the rest
//! of the crate works with.  The `*Record` structs carry the camelCase
//! field names the backends speak and convert into the domain types at
//! the repository boundary.  Amounts are in the backend's fixed base unit
//! (lamports); timestamps are unix seconds.

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// A fundraising campaign as held by the backend.
///
/// Aggregate counters (`raised`, `backers`) are owned by the campaign;
/// pledges and streams are independent append-only records that reference
/// it by id.  Campaigns are never deleted, only flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub goal: u64,
    pub raised: u64,
    pub backers: u64,
    pub created_at: i64,
    pub ends_at: i64,
    pub active: bool,
    pub canceled: bool,
    pub funds_withdrawn: bool,
}

/// An immutable one-time contribution record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pledge {
    pub id: String,
    pub campaign_id: String,
    pub backer: String,
    pub amount: u64,
    pub date: i64,
}

/// A time-vested continuous payment record.
///
/// Only `canceled_at` ever changes after creation; the streamed amount is
/// derived from elapsed time, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub campaign_id: String,
    pub sender: String,
    pub recipient: String,
    pub total_amount: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub canceled_at: Option<i64>,
}

/// Derived stream state, evaluated with precedence
/// canceled > completed > active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Active,
    Completed,
    Canceled,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

/// Inputs to campaign creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCampaignParams {
    pub title: String,
    pub description: String,
    pub goal: u64,
    pub duration_secs: i64,
}

impl CreateCampaignParams {
    /// The program's own well-formedness guards, checked client-side so a
    /// malformed create never leaves the client.
    pub fn validate(&self) -> Result<()> {
        if self.title.is_empty() || self.description.is_empty() {
            return Err(LedgerError::InvalidInput);
        }
        if self.goal == 0 {
            return Err(LedgerError::InvalidInput);
        }
        if self.duration_secs <= 0 {
            return Err(LedgerError::InvalidInput);
        }
        Ok(())
    }
}

/// Inputs to stream creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStreamParams {
    pub campaign_id: String,
    pub recipient: String,
    pub total_amount: u64,
    pub start_time: i64,
    pub end_time: i64,
}

impl CreateStreamParams {
    pub fn validate(&self) -> Result<()> {
        if self.recipient.is_empty() {
            return Err(LedgerError::InvalidInput);
        }
        if self.total_amount == 0 {
            return Err(LedgerError::InvalidInput);
        }
        if self.end_time <= self.start_time {
            return Err(LedgerError::InvalidDuration);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────
// Wire records
// ─────────────────────────────────────────────────────────

/// Campaign as returned by `fetchCampaign` / `fetchAllCampaigns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: String,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub goal: u64,
    pub raised: u64,
    pub backers: u64,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "endsAt")]
    pub ends_at: i64,
    pub active: bool,
    pub canceled: bool,
    #[serde(rename = "fundsWithdrawn")]
    pub funds_withdrawn: bool,
}

impl From<CampaignRecord> for Campaign {
    fn from(r: CampaignRecord) -> Self {
        Campaign {
            id: r.id,
            creator: r.creator,
            title: r.title,
            description: r.description,
            goal: r.goal,
            raised: r.raised,
            backers: r.backers,
            created_at: r.created_at,
            ends_at: r.ends_at,
            active: r.active,
            canceled: r.canceled,
            funds_withdrawn: r.funds_withdrawn,
        }
    }
}

impl From<Campaign> for CampaignRecord {
    fn from(c: Campaign) -> Self {
        CampaignRecord {
            id: c.id,
            creator: c.creator,
            title: c.title,
            description: c.description,
            goal: c.goal,
            raised: c.raised,
            backers: c.backers,
            created_at: c.created_at,
            ends_at: c.ends_at,
            active: c.active,
            canceled: c.canceled,
            funds_withdrawn: c.funds_withdrawn,
        }
    }
}

/// Stream as returned by the streaming provider.
///
/// The accrual engine operates purely on these fields regardless of which
/// provider supplied them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRecord {
    pub id: String,
    #[serde(rename = "campaignId")]
    pub campaign_id: String,
    pub sender: String,
    pub recipient: String,
    #[serde(rename = "totalAmount")]
    pub total_amount: u64,
    #[serde(rename = "startTime")]
    pub start_time: i64,
    #[serde(rename = "endTime")]
    pub end_time: i64,
    #[serde(rename = "canceledAt")]
    pub canceled_at: Option<i64>,
}

impl From<StreamRecord> for Stream {
    fn from(r: StreamRecord) -> Self {
        Stream {
            id: r.id,
            campaign_id: r.campaign_id,
            sender: r.sender,
            recipient: r.recipient,
            total_amount: r.total_amount,
            start_time: r.start_time,
            end_time: r.end_time,
            canceled_at: r.canceled_at,
        }
    }
}

impl From<Stream> for StreamRecord {
    fn from(s: Stream) -> Self {
        StreamRecord {
            id: s.id,
            campaign_id: s.campaign_id,
            sender: s.sender,
            recipient: s.recipient,
            total_amount: s.total_amount,
            start_time: s.start_time,
            end_time: s.end_time,
            canceled_at: s.canceled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CreateCampaignParams {
        CreateCampaignParams {
            title: "Decentralized Art Gallery".to_string(),
            description: "A virtual gallery for NFT artists".to_string(),
            goal: 10,
            duration_secs: 30 * 24 * 60 * 60,
        }
    }

    #[test]
    fn well_formed_params_pass() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut p = params();
        p.title.clear();
        assert!(matches!(p.validate(), Err(LedgerError::InvalidInput)));
    }

    #[test]
    fn zero_goal_is_rejected() {
        let mut p = params();
        p.goal = 0;
        assert!(matches!(p.validate(), Err(LedgerError::InvalidInput)));
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        let mut p = params();
        p.duration_secs = 0;
        assert!(matches!(p.validate(), Err(LedgerError::InvalidInput)));
    }

    #[test]
    fn degenerate_stream_window_is_rejected() {
        let p = CreateStreamParams {
            campaign_id: "campaign1".to_string(),
            recipient: "recipient1".to_string(),
            total_amount: 100,
            start_time: 1_000,
            end_time: 1_000,
        };
        assert!(matches!(p.validate(), Err(LedgerError::InvalidDuration)));
    }

    #[test]
    fn campaign_record_uses_camel_case_on_the_wire() {
        let json = r#"{
            "id": "campaign1",
            "creator": "8Kw7UrFz",
            "title": "Gallery",
            "description": "desc",
            "goal": 10,
            "raised": 3,
            "backers": 1,
            "createdAt": 1000,
            "endsAt": 2000,
            "active": true,
            "canceled": false,
            "fundsWithdrawn": false
        }"#;
        let record: CampaignRecord = serde_json::from_str(json).unwrap();
        let campaign = Campaign::from(record);
        assert_eq!(campaign.ends_at, 2000);
        assert!(!campaign.funds_withdrawn);
    }

    #[test]
    fn stream_record_round_trips_through_domain() {
        let json = r#"{
            "id": "stream1",
            "campaignId": "campaign1",
            "sender": "8Kw7UrFz",
            "recipient": "5FHwkrdx",
            "totalAmount": 100,
            "startTime": 0,
            "endTime": 100,
            "canceledAt": null
        }"#;
        let record: StreamRecord = serde_json::from_str(json).unwrap();
        let stream = Stream::from(record);
        assert_eq!(stream.total_amount, 100);
        assert!(stream.canceled_at.is_none());
    }
}
