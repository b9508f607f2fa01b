//! Claim query engine: composable filters plus the bulk scopes used by
//! challenge collection views.
//!
//! Filters are an explicit predicate AST compiled (here, evaluated) at the
//! store boundary, so a SQL-backed store can translate them once instead of
//! concatenating join clauses. The "unfulfilled"/"unposted" scopes are
//! derived by subtraction: compute the cheap inner-join id set first, then
//! remove it from the scoped claim set. That derivation must return exactly
//! the set the classifier predicates would select directly.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::classifier;
use super::domain::{
    Claim, ClaimId, CollectionId, CollectionItem, Creation, SignupId, UserId, Work, WorkId,
};
use super::reference::ReferenceData;

/// Predicate over claim rows. Composes with [`ClaimFilter::and`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimFilter {
    All,
    InCollection(CollectionId),
    ByClaimingUser(UserId),
    ForRequestSignup(SignupId),
    WithRequest,
    WithoutRequest,
    Unstarted,
    NotIn(Vec<ClaimId>),
    And(Vec<ClaimFilter>),
}

impl ClaimFilter {
    pub fn matches(&self, claim: &Claim) -> bool {
        match self {
            ClaimFilter::All => true,
            ClaimFilter::InCollection(collection) => claim.collection_id == *collection,
            ClaimFilter::ByClaimingUser(user) => claim.claiming_user_id == *user,
            ClaimFilter::ForRequestSignup(signup) => claim.request_signup_id == Some(*signup),
            ClaimFilter::WithRequest => claim.request_signup_id.is_some(),
            ClaimFilter::WithoutRequest => claim.request_signup_id.is_none(),
            ClaimFilter::Unstarted => claim.creation.is_none(),
            ClaimFilter::NotIn(ids) => !ids.contains(&claim.id),
            ClaimFilter::And(filters) => filters.iter().all(|filter| filter.matches(claim)),
        }
    }

    pub fn and(self, other: ClaimFilter) -> ClaimFilter {
        match self {
            ClaimFilter::And(mut filters) => {
                filters.push(other);
                ClaimFilter::And(filters)
            }
            filter => ClaimFilter::And(vec![filter, other]),
        }
    }
}

/// Error enumeration for claim store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("claim already exists")]
    Conflict,
    #[error("claim not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The external query executor boundary.
///
/// `select` honors a [`ClaimFilter`]; `collection_item` resolves the
/// (collection, creation) moderation join and `work` the Work publication
/// join. Mutations are single-row and atomic at this boundary — no
/// multi-step sequence is coordinated here.
pub trait ClaimStore: Send + Sync {
    fn select(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, StoreError>;
    fn fetch(&self, id: ClaimId) -> Result<Option<Claim>, StoreError>;
    fn insert(&self, claim: Claim) -> Result<Claim, StoreError>;
    fn update(&self, claim: Claim) -> Result<(), StoreError>;
    fn delete(&self, id: ClaimId) -> Result<(), StoreError>;

    fn collection_item(
        &self,
        collection: CollectionId,
        creation: &Creation,
    ) -> Result<Option<CollectionItem>, StoreError>;

    fn work(&self, id: WorkId) -> Result<Option<Work>, StoreError>;

    /// Ids of fulfilled claims within `filter`, inner-join-equivalent:
    /// unstarted claims never resolve a moderation row, so only started
    /// claims are joined.
    fn fulfilled_ids(&self, filter: &ClaimFilter) -> Result<Vec<ClaimId>, StoreError> {
        let mut ids = Vec::new();
        for claim in self.select(filter)? {
            let Some(creation) = claim.creation.clone() else {
                continue;
            };
            let item = self.collection_item(claim.collection_id, &creation)?;
            let work = match creation.work_id() {
                Some(work_id) => self.work(work_id)?,
                None => None,
            };
            if classifier::is_fulfilled(&claim, item.as_ref(), work.as_ref()) {
                ids.push(claim.id);
            }
        }
        Ok(ids)
    }

    /// Ids of posted claims within `filter`; same inner-join shape as
    /// [`ClaimStore::fulfilled_ids`] without the moderation condition.
    fn posted_ids(&self, filter: &ClaimFilter) -> Result<Vec<ClaimId>, StoreError> {
        let mut ids = Vec::new();
        for claim in self.select(filter)? {
            let Some(creation) = claim.creation.clone() else {
                continue;
            };
            let work = match creation.work_id() {
                Some(work_id) => self.work(work_id)?,
                None => None,
            };
            if classifier::is_posted(&claim, work.as_ref()) {
                ids.push(claim.id);
            }
        }
        Ok(ids)
    }
}

/// In-memory claim store. Persistence proper is an external collaborator;
/// this backing serves the demo seed and every test suite.
#[derive(Default)]
pub struct MemoryClaimStore {
    claims: Mutex<HashMap<ClaimId, Claim>>,
    items: Mutex<Vec<CollectionItem>>,
    works: Mutex<HashMap<WorkId, Work>>,
}

impl MemoryClaimStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_collection_item(&self, item: CollectionItem) {
        self.items.lock().expect("store mutex poisoned").push(item);
    }

    pub fn insert_work(&self, work: Work) {
        self.works
            .lock()
            .expect("store mutex poisoned")
            .insert(work.id, work);
    }

    pub fn set_work_posted(&self, id: WorkId, posted: bool) {
        if let Some(work) = self
            .works
            .lock()
            .expect("store mutex poisoned")
            .get_mut(&id)
        {
            work.posted = posted;
        }
    }
}

impl ClaimStore for MemoryClaimStore {
    fn select(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, StoreError> {
        let guard = self.claims.lock().expect("store mutex poisoned");
        let mut claims: Vec<Claim> = guard
            .values()
            .filter(|claim| filter.matches(claim))
            .cloned()
            .collect();
        claims.sort_by_key(|claim| claim.id);
        Ok(claims)
    }

    fn fetch(&self, id: ClaimId) -> Result<Option<Claim>, StoreError> {
        let guard = self.claims.lock().expect("store mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn insert(&self, claim: Claim) -> Result<Claim, StoreError> {
        let mut guard = self.claims.lock().expect("store mutex poisoned");
        if guard.contains_key(&claim.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(claim.id, claim.clone());
        Ok(claim)
    }

    fn update(&self, claim: Claim) -> Result<(), StoreError> {
        let mut guard = self.claims.lock().expect("store mutex poisoned");
        if !guard.contains_key(&claim.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(claim.id, claim);
        Ok(())
    }

    fn delete(&self, id: ClaimId) -> Result<(), StoreError> {
        let mut guard = self.claims.lock().expect("store mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn collection_item(
        &self,
        collection: CollectionId,
        creation: &Creation,
    ) -> Result<Option<CollectionItem>, StoreError> {
        let guard = self.items.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .find(|item| item.collection_id == collection && item.item == *creation)
            .cloned())
    }

    fn work(&self, id: WorkId) -> Result<Option<Work>, StoreError> {
        let guard = self.works.lock().expect("store mutex poisoned");
        Ok(guard.get(&id).cloned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Bulk claim retrieval over a [`ClaimStore`].
pub struct ClaimQueryEngine<S> {
    store: Arc<S>,
}

impl<S> ClaimQueryEngine<S>
where
    S: ClaimStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn select(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, StoreError> {
        self.store.select(filter)
    }

    pub fn for_request_signup(&self, signup: SignupId) -> Result<Vec<Claim>, StoreError> {
        self.store.select(&ClaimFilter::ForRequestSignup(signup))
    }

    pub fn by_claiming_user(&self, user: UserId) -> Result<Vec<Claim>, StoreError> {
        self.store.select(&ClaimFilter::ByClaimingUser(user))
    }

    pub fn in_collection(&self, collection: CollectionId) -> Result<Vec<Claim>, StoreError> {
        self.store.select(&ClaimFilter::InCollection(collection))
    }

    pub fn with_request(&self) -> Result<Vec<Claim>, StoreError> {
        self.store.select(&ClaimFilter::WithRequest)
    }

    pub fn without_request(&self) -> Result<Vec<Claim>, StoreError> {
        self.store.select(&ClaimFilter::WithoutRequest)
    }

    pub fn unstarted_in(&self, collection: CollectionId) -> Result<Vec<Claim>, StoreError> {
        self.store.select(
            &ClaimFilter::InCollection(collection).and(ClaimFilter::Unstarted),
        )
    }

    pub fn fulfilled_in(&self, collection: CollectionId) -> Result<Vec<Claim>, StoreError> {
        let scope = ClaimFilter::InCollection(collection);
        let ids: HashSet<ClaimId> = self.store.fulfilled_ids(&scope)?.into_iter().collect();
        let mut claims = self.store.select(&scope)?;
        claims.retain(|claim| ids.contains(&claim.id));
        Ok(claims)
    }

    /// Everything in the collection minus the fulfilled id set. Cheaper than
    /// evaluating the outer-join predicate per claim, and required to return
    /// the identical result.
    pub fn unfulfilled_in(&self, collection: CollectionId) -> Result<Vec<Claim>, StoreError> {
        let scope = ClaimFilter::InCollection(collection);
        let fulfilled = self.store.fulfilled_ids(&scope)?;
        if fulfilled.is_empty() {
            debug!(collection = collection.0, "no fulfilled claims, returning full scope");
            return self.store.select(&scope);
        }
        self.store.select(&scope.and(ClaimFilter::NotIn(fulfilled)))
    }

    pub fn posted_in(&self, collection: CollectionId) -> Result<Vec<Claim>, StoreError> {
        let scope = ClaimFilter::InCollection(collection);
        let ids: HashSet<ClaimId> = self.store.posted_ids(&scope)?.into_iter().collect();
        let mut claims = self.store.select(&scope)?;
        claims.retain(|claim| ids.contains(&claim.id));
        Ok(claims)
    }

    pub fn unposted_in(&self, collection: CollectionId) -> Result<Vec<Claim>, StoreError> {
        let scope = ClaimFilter::InCollection(collection);
        let posted = self.store.posted_ids(&scope)?;
        if posted.is_empty() {
            return self.store.select(&scope);
        }
        self.store.select(&scope.and(ClaimFilter::NotIn(posted)))
    }

    /// Same subtraction pattern scoped by claiming user instead of
    /// collection.
    pub fn unposted_for_user(&self, user: UserId) -> Result<Vec<Claim>, StoreError> {
        let scope = ClaimFilter::ByClaimingUser(user);
        let posted = self.store.posted_ids(&scope)?;
        if posted.is_empty() {
            return self.store.select(&scope);
        }
        self.store.select(&scope.and(ClaimFilter::NotIn(posted)))
    }
}

/// Sort claims by the requesting pseud's byline. Inner-join semantics:
/// claims whose signup or pseud cannot be resolved are dropped.
pub fn order_by_requesting_byline(
    mut claims: Vec<Claim>,
    direction: SortDirection,
    refs: &dyn ReferenceData,
) -> Vec<Claim> {
    let mut keyed: Vec<(String, Claim)> = claims
        .drain(..)
        .filter_map(|claim| {
            let signup = refs.signup(claim.request_signup_id?)?;
            let pseud = refs.pseud(signup.pseud_id)?;
            Some((pseud.name, claim))
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| direction.apply(a.to_lowercase().cmp(&b.to_lowercase())));
    keyed.into_iter().map(|(_, claim)| claim).collect()
}

/// Sort claims by the claiming user's default pseud byline, dropping claims
/// whose claiming user no longer resolves.
pub fn order_by_claiming_byline(
    mut claims: Vec<Claim>,
    direction: SortDirection,
    refs: &dyn ReferenceData,
) -> Vec<Claim> {
    let mut keyed: Vec<(String, Claim)> = claims
        .drain(..)
        .filter_map(|claim| {
            let pseud = refs.default_pseud(claim.claiming_user_id)?;
            Some((pseud.name, claim))
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| direction.apply(a.to_lowercase().cmp(&b.to_lowercase())));
    keyed.into_iter().map(|(_, claim)| claim).collect()
}

/// Sort claims oldest-first by creation timestamp.
pub fn order_by_date(mut claims: Vec<Claim>) -> Vec<Claim> {
    claims.sort_by_key(|claim| (claim.created_at, claim.id));
    claims
}
