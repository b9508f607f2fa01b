use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::classifier::{self, Classification};
use super::domain::{Claim, ClaimId, Creation, DataIntegrityError, NewClaim, UserId};
use super::query::{ClaimQueryEngine, ClaimStore, StoreError};
use super::reference::{ReferenceData, ReferenceNotFound};

static CLAIM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_claim_id() -> ClaimId {
    ClaimId(CLAIM_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Facade composing the claim store, reference data, and the classifier.
pub struct ClaimService<S, D> {
    store: Arc<S>,
    refs: Arc<D>,
}

impl<S, D> ClaimService<S, D>
where
    S: ClaimStore + 'static,
    D: ReferenceData + 'static,
{
    pub fn new(store: Arc<S>, refs: Arc<D>) -> Self {
        Self { store, refs }
    }

    pub fn queries(&self) -> ClaimQueryEngine<S> {
        ClaimQueryEngine::new(self.store.clone())
    }

    pub fn references(&self) -> &D {
        &self.refs
    }

    /// Record a user claiming a slot, with or without a request signup.
    pub fn claim(&self, new_claim: NewClaim) -> Result<Claim, ClaimServiceError> {
        let claim = Claim {
            id: next_claim_id(),
            collection_id: new_claim.collection_id,
            request_signup_id: new_claim.request_signup_id,
            request_prompt_id: new_claim.request_prompt_id,
            claiming_user_id: new_claim.claiming_user_id,
            creation: None,
            created_at: Utc::now(),
        };
        let stored = self.store.insert(claim)?;
        info!(claim = stored.id.0, collection = stored.collection_id.0, "claim recorded");
        Ok(stored)
    }

    pub fn get(&self, id: ClaimId) -> Result<Claim, ClaimServiceError> {
        self.store
            .fetch(id)?
            .ok_or(ClaimServiceError::Store(StoreError::NotFound))
    }

    /// Attach a produced creation to a claim in one store update. A claim
    /// that already carries a creation must be detached first.
    pub fn attach_creation(
        &self,
        id: ClaimId,
        creation: Creation,
    ) -> Result<Claim, ClaimServiceError> {
        let mut claim = self.get(id)?;
        if claim.creation.is_some() {
            return Err(ClaimServiceError::Store(StoreError::Conflict));
        }
        claim.creation = Some(creation);
        self.store.update(claim.clone())?;
        info!(claim = id.0, "creation attached");
        Ok(claim)
    }

    /// Detach the creation (the claimant retracted the work); a no-op error
    /// when the claim is unstarted.
    pub fn detach_creation(&self, id: ClaimId) -> Result<Claim, ClaimServiceError> {
        let mut claim = self.get(id)?;
        if claim.creation.take().is_none() {
            return Err(ClaimServiceError::Store(StoreError::NotFound));
        }
        self.store.update(claim.clone())?;
        info!(claim = id.0, "creation detached");
        Ok(claim)
    }

    /// Convenience approval check. Short-circuits to `false` without any
    /// store lookups when the claim is unstarted.
    pub fn fulfilled(&self, claim: &Claim) -> Result<bool, ClaimServiceError> {
        let Some(creation) = &claim.creation else {
            return Ok(false);
        };
        let item = self.store.collection_item(claim.collection_id, creation)?;
        let work = match creation.work_id() {
            Some(work_id) => self.store.work(work_id)?,
            None => None,
        };
        Ok(classifier::is_fulfilled(claim, item.as_ref(), work.as_ref()))
    }

    /// Join the claim against its moderation record and work row, then run
    /// the classifier. Unstarted claims skip the joins entirely.
    pub fn classification(&self, claim: &Claim) -> Result<Classification, ClaimServiceError> {
        let Some(creation) = &claim.creation else {
            return Ok(classifier::classify(claim, None, None));
        };
        let item = self.store.collection_item(claim.collection_id, creation)?;
        let work = match creation.work_id() {
            Some(work_id) => self.store.work(work_id)?,
            None => None,
        };
        Ok(classifier::classify(claim, item.as_ref(), work.as_ref()))
    }

    /// A claim may be destroyed by its claimant or a collection maintainer.
    /// A collection that no longer resolves grants no maintainer rights.
    pub fn can_destroy(&self, claim: &Claim, acting_user: UserId) -> bool {
        if claim.claiming_user_id == acting_user {
            return true;
        }
        self.refs
            .collection(claim.collection_id)
            .is_some_and(|collection| collection.is_maintained_by(acting_user))
    }

    pub fn destroy(&self, id: ClaimId, acting_user: UserId) -> Result<(), ClaimServiceError> {
        let claim = self.get(id)?;
        if !self.can_destroy(&claim, acting_user) {
            return Err(ClaimServiceError::Forbidden);
        }
        self.store.delete(id)?;
        info!(claim = id.0, user = acting_user.0, "claim destroyed");
        Ok(())
    }
}

/// Error raised by the claim service.
#[derive(Debug, thiserror::Error)]
pub enum ClaimServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Reference(#[from] ReferenceNotFound),
    #[error(transparent)]
    Integrity(#[from] DataIntegrityError),
    #[error("not allowed to destroy this claim")]
    Forbidden,
}
