//! Campaign lifecycle state machine.
//!
//! Mirrors the instruction guards of the on-chain crowdfunding program.
//! Every mutating action runs through [`check_action`] before it is
//! forwarded to a backend, so an illegal action never leaves the client
//! and a rejected one mutates nothing.
//!
//! ```text
//! Active ──end────► Ended
//! Active ──cancel─► Canceled
//! ```
//!
//! `end` and `cancel` are mutually exclusive terminal transitions; once
//! `Active` is left it is never re-entered.  The withdrawn flag is
//! orthogonal and only meaningful once not `Active`.

use crate::errors::{LedgerError, Result};
use crate::types::Campaign;

/// The exclusive lifecycle phase a campaign is in, derived from its
/// stored flags.  `canceled` wins over `active` should a backend ever
/// hand back both (the program never does).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignPhase {
    Active,
    Ended,
    Canceled,
}

impl CampaignPhase {
    pub fn of(campaign: &Campaign) -> Self {
        if campaign.canceled {
            Self::Canceled
        } else if campaign.active {
            Self::Active
        } else {
            Self::Ended
        }
    }
}

/// A mutating action a caller can request against an existing campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignAction {
    Pledge { amount: u64 },
    End,
    Cancel,
    Withdraw,
}

impl CampaignAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pledge { .. } => "pledge",
            Self::End => "end",
            Self::Cancel => "cancel",
            Self::Withdraw => "withdraw",
        }
    }
}

/// Validate that `action` by `caller` is legal given the campaign's
/// current state.  Returns the first violated guard; checks nothing is
/// mutated here.
///
/// The `active` flag is the sole mutation authority: a campaign past its
/// `ends_at` but never explicitly ended still accepts pledges.  Natural
/// expiry is display-only (see [`crate::accrual::time_left`]).
pub fn check_action(campaign: &Campaign, action: &CampaignAction, caller: &str) -> Result<()> {
    let phase = CampaignPhase::of(campaign);
    match action {
        CampaignAction::Pledge { amount } => {
            if phase != CampaignPhase::Active {
                return Err(LedgerError::CampaignNotActive);
            }
            if *amount == 0 {
                return Err(LedgerError::InvalidInput);
            }
            Ok(())
        }
        CampaignAction::End | CampaignAction::Cancel => {
            if caller != campaign.creator {
                return Err(LedgerError::Unauthorized);
            }
            if phase != CampaignPhase::Active {
                return Err(LedgerError::CampaignNotActive);
            }
            Ok(())
        }
        CampaignAction::Withdraw => {
            if caller != campaign.creator {
                return Err(LedgerError::Unauthorized);
            }
            if phase == CampaignPhase::Active {
                return Err(LedgerError::CampaignNotActive);
            }
            if campaign.funds_withdrawn {
                return Err(LedgerError::FundsAlreadyWithdrawn);
            }
            if campaign.raised == 0 {
                return Err(LedgerError::InsufficientFunds);
            }
            Ok(())
        }
    }
}
