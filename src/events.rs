//! Ledger events recorded on successful mutations.
//!
//! These mirror the event set emitted by the on-chain crowdfunding
//! program.  The mirror backend appends them to an inspectable log; the
//! authoritative backend emits the originals on-chain.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A pledge was applied to a campaign.
    Pledge {
        campaign_id: String,
        backer: String,
        amount: u64,
    },
    /// A pledge pushed the campaign to or past its goal.
    GoalReached {
        campaign_id: String,
        goal: u64,
        raised: u64,
    },
    /// The creator canceled the campaign.
    Canceled { campaign_id: String },
    /// The creator withdrew the raised funds.
    Withdrawn {
        campaign_id: String,
        creator: String,
        amount: u64,
    },
}

impl LedgerEvent {
    /// Short identifier string, stable across versions.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pledge { .. } => "pledge",
            Self::GoalReached { .. } => "goal_reached",
            Self::Canceled { .. } => "canceled",
            Self::Withdrawn { .. } => "withdrawn",
        }
    }

    /// The campaign this event belongs to.
    pub fn campaign_id(&self) -> &str {
        match self {
            Self::Pledge { campaign_id, .. }
            | Self::GoalReached { campaign_id, .. }
            | Self::Canceled { campaign_id }
            | Self::Withdrawn { campaign_id, .. } => campaign_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings_are_stable() {
        let ev = LedgerEvent::GoalReached {
            campaign_id: "campaign1".to_string(),
            goal: 10,
            raised: 12,
        };
        assert_eq!(ev.kind(), "goal_reached");
        assert_eq!(ev.campaign_id(), "campaign1");
    }

    #[test]
    fn events_serialize_with_a_kind_tag() {
        let ev = LedgerEvent::Pledge {
            campaign_id: "campaign1".to_string(),
            backer: "backer1".to_string(),
            amount: 3,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["kind"], "pledge");
        assert_eq!(json["amount"], 3);
    }
}
