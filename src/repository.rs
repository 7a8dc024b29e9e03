//! Ledger repositories — typed reads and guarded mutations over a
//! backend.
//!
//! A repository never caches writes as authoritative.  After every
//! successful mutation it re-fetches the canonical entity from the
//! backend and returns that, rather than hand-patching a local copy —
//! the copy a caller holds is advisory and goes stale the moment the
//! backend moves on.

use std::sync::Arc;

use tracing::info;

use crate::backend::{CampaignBackend, StreamProvider};
use crate::errors::{LedgerError, Result};
use crate::lifecycle::{check_action, CampaignAction};
use crate::types::{Campaign, CreateCampaignParams, CreateStreamParams, Pledge, Stream};

/// Campaign reads and guarded mutations, polymorphic over the backend.
pub struct LedgerRepository<B: CampaignBackend> {
    backend: Arc<B>,
}

impl<B: CampaignBackend> LedgerRepository<B> {
    pub fn new(backend: Arc<B>) -> Self {
        LedgerRepository { backend }
    }

    /// Register a new campaign.  Input shape is validated locally so a
    /// malformed create never reaches the backend.
    pub async fn create(&self, params: &CreateCampaignParams, creator: &str) -> Result<String> {
        params.validate()?;
        let id = self
            .backend
            .create_campaign(
                &params.title,
                &params.description,
                params.goal,
                params.duration_secs,
                creator,
            )
            .await?;
        info!("created campaign {id}");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Campaign> {
        Ok(self.backend.fetch_campaign(id).await?.into())
    }

    /// All campaigns.  Order is unspecified; callers must not depend on it.
    pub async fn list_all(&self) -> Result<Vec<Campaign>> {
        Ok(self
            .backend
            .fetch_all_campaigns()
            .await?
            .into_iter()
            .map(Campaign::from)
            .collect())
    }

    /// Campaigns created by `owner`.
    pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<Campaign>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|c| c.creator == owner)
            .collect())
    }

    pub async fn pledges_by_backer(&self, backer: &str) -> Result<Vec<Pledge>> {
        self.backend.fetch_pledges_by_backer(backer).await
    }

    /// Run a mutating action through the lifecycle state machine, forward
    /// it to the backend, and return the re-fetched canonical entity.
    ///
    /// The guard runs against the freshest state the backend will give
    /// us; a rejection means nothing was forwarded and nothing changed.
    pub async fn apply_action(
        &self,
        id: &str,
        action: &CampaignAction,
        caller: &str,
    ) -> Result<Campaign> {
        let current = self.get(id).await?;
        check_action(&current, action, caller)?;

        let tx_ref = match action {
            CampaignAction::Pledge { amount } => self.backend.pledge(id, *amount, caller).await?,
            CampaignAction::End => self.backend.end_campaign(id, caller).await?,
            CampaignAction::Cancel => self.backend.cancel_campaign(id, caller).await?,
            CampaignAction::Withdraw => self.backend.withdraw_funds(id, caller).await?,
        };
        info!("{} applied to {id} ({tx_ref})", action.name());

        // Read-after-write: the backend copy is the only canonical one.
        self.get(id).await
    }
}

/// Stream reads and guarded mutations over a provider.
pub struct StreamLedger<P: StreamProvider> {
    provider: Arc<P>,
}

impl<P: StreamProvider> StreamLedger<P> {
    pub fn new(provider: Arc<P>) -> Self {
        StreamLedger { provider }
    }

    pub async fn create(&self, params: &CreateStreamParams, sender: &str) -> Result<String> {
        params.validate()?;
        let id = self.provider.create_stream(params, sender).await?;
        info!("created stream {id}");
        Ok(id)
    }

    pub async fn cancel(&self, stream_id: &str, sender: &str) -> Result<String> {
        let tx_ref = self.provider.cancel_stream(stream_id, sender).await?;
        info!("canceled stream {stream_id} ({tx_ref})");
        Ok(tx_ref)
    }

    pub async fn list_by_sender(&self, sender: &str) -> Result<Vec<Stream>> {
        Ok(self
            .provider
            .list_streams_by_sender(sender)
            .await?
            .into_iter()
            .map(Stream::from)
            .collect())
    }

    /// Re-fetch a single stream from the provider after a mutation.
    /// The provider's contract only exposes sender-scoped listing.
    pub async fn get(&self, stream_id: &str, sender: &str) -> Result<Stream> {
        self.list_by_sender(sender)
            .await?
            .into_iter()
            .find(|s| s.id == stream_id)
            .ok_or_else(|| LedgerError::NotFound(stream_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::MirrorBackend;

    const CREATOR: &str = "8Kw7UrFz";
    const BACKER: &str = "5FHwkrdx";

    fn params() -> CreateCampaignParams {
        CreateCampaignParams {
            title: "Gallery".to_string(),
            description: "desc".to_string(),
            goal: 10,
            duration_secs: 100_000,
        }
    }

    async fn repo_with_campaign() -> (LedgerRepository<MirrorBackend>, String) {
        let mirror = Arc::new(MirrorBackend::new());
        mirror.set_now(1_000).await;
        let repo = LedgerRepository::new(mirror);
        let id = repo.create(&params(), CREATOR).await.unwrap();
        (repo, id)
    }

    #[tokio::test]
    async fn apply_action_returns_the_refetched_entity() {
        let (repo, id) = repo_with_campaign().await;
        let updated = repo
            .apply_action(&id, &CampaignAction::Pledge { amount: 3 }, BACKER)
            .await
            .unwrap();
        assert_eq!(updated.raised, 3);
        assert_eq!(updated.backers, 1);
        // And an independent read agrees.
        assert_eq!(repo.get(&id).await.unwrap().raised, 3);
    }

    #[tokio::test]
    async fn rejected_action_changes_nothing() {
        let (repo, id) = repo_with_campaign().await;
        let err = repo
            .apply_action(&id, &CampaignAction::Cancel, BACKER)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized));
        let campaign = repo.get(&id).await.unwrap();
        assert!(campaign.active);
        assert!(!campaign.canceled);
    }

    #[tokio::test]
    async fn malformed_create_never_reaches_the_backend() {
        let mirror = Arc::new(MirrorBackend::new());
        let repo = LedgerRepository::new(Arc::clone(&mirror));
        let mut bad = params();
        bad.goal = 0;
        assert!(matches!(
            repo.create(&bad, CREATOR).await,
            Err(LedgerError::InvalidInput)
        ));
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_by_owner_filters() {
        let (repo, _) = repo_with_campaign().await;
        assert_eq!(repo.list_by_owner(CREATOR).await.unwrap().len(), 1);
        assert!(repo.list_by_owner(BACKER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stream_ledger_round_trip() {
        let mirror = Arc::new(MirrorBackend::new());
        mirror.set_now(1_000).await;
        let streams = StreamLedger::new(Arc::clone(&mirror));
        let id = streams
            .create(
                &CreateStreamParams {
                    campaign_id: "campaign1".to_string(),
                    recipient: CREATOR.to_string(),
                    total_amount: 100,
                    start_time: 1_000,
                    end_time: 1_100,
                },
                BACKER,
            )
            .await
            .unwrap();

        mirror.set_now(1_040).await;
        streams.cancel(&id, BACKER).await.unwrap();
        let stream = streams.get(&id, BACKER).await.unwrap();
        assert_eq!(stream.canceled_at, Some(1_040));
    }
}
