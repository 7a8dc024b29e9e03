//! Crate-wide error taxonomy.

use thiserror::Error;

/// Every way a ledger action can fail.
///
/// The first five variants mirror the crowdfunding program's error codes
/// one-to-one.  They are domain rejections: the action is illegal given
/// current state, and retrying without a state change will fail again.
/// Only [`LedgerError::BackendUnavailable`] is worth a caller-directed
/// retry.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid input parameters")]
    InvalidInput,

    #[error("Unauthorized: only the creator can perform this action")]
    Unauthorized,

    #[error("Campaign lifecycle state does not permit this action")]
    CampaignNotActive,

    #[error("Funds have already been withdrawn")]
    FundsAlreadyWithdrawn,

    #[error("Insufficient funds for operation")]
    InsufficientFunds,

    #[error("Campaign goal must be positive")]
    InvalidGoal,

    #[error("Stream end time must be after its start time")]
    InvalidDuration,

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Another action is already in flight for {0}")]
    ActionInProgress(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        LedgerError::BackendUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::BackendUnavailable(format!("malformed backend response: {e}"))
    }
}

impl LedgerError {
    /// Map a numeric backend error code onto its domain kind.
    ///
    /// Codes 6000–6004 come straight from the crowdfunding program's IDL;
    /// 6005 is the fetch-miss code.  Anything unrecognised is treated as a
    /// backend fault rather than a domain rejection.
    pub fn from_code(code: i64, message: &str) -> Self {
        match code {
            6000 => Self::CampaignNotActive,
            6001 => Self::Unauthorized,
            6002 => Self::InvalidInput,
            6003 => Self::FundsAlreadyWithdrawn,
            6004 => Self::InsufficientFunds,
            6005 => Self::NotFound(message.to_string()),
            _ => Self::BackendUnavailable(format!("unexpected error code {code}: {message}")),
        }
    }

    /// True when retrying the same call might succeed without any state
    /// change first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_codes_map_one_to_one() {
        assert!(matches!(
            LedgerError::from_code(6000, ""),
            LedgerError::CampaignNotActive
        ));
        assert!(matches!(
            LedgerError::from_code(6001, ""),
            LedgerError::Unauthorized
        ));
        assert!(matches!(
            LedgerError::from_code(6002, ""),
            LedgerError::InvalidInput
        ));
        assert!(matches!(
            LedgerError::from_code(6003, ""),
            LedgerError::FundsAlreadyWithdrawn
        ));
        assert!(matches!(
            LedgerError::from_code(6004, ""),
            LedgerError::InsufficientFunds
        ));
        assert!(matches!(
            LedgerError::from_code(6005, "campaign1"),
            LedgerError::NotFound(_)
        ));
    }

    #[test]
    fn unknown_code_is_a_backend_fault() {
        let err = LedgerError::from_code(-32601, "method not found");
        assert!(matches!(err, LedgerError::BackendUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn domain_errors_are_not_retryable() {
        assert!(!LedgerError::Unauthorized.is_retryable());
        assert!(!LedgerError::CampaignNotActive.is_retryable());
        assert!(!LedgerError::InvalidInput.is_retryable());
    }
}
