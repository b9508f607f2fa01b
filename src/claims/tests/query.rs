use std::collections::BTreeSet;
use std::sync::Arc;

use super::common::{
    claim, claim_with_work, draft_work, insert_all, pending_item, posted_work, references,
    seed_fulfilled, store, ALICE, ALICE_SIGNUP, BOB, BOB_SIGNUP, COLLECTION, ZED, ZED_SIGNUP,
};
use crate::claims::classifier;
use crate::claims::domain::{Claim, ClaimId, CollectionId, Creation, WorkId};
use crate::claims::query::{
    order_by_claiming_byline, order_by_date, order_by_requesting_byline, ClaimFilter,
    ClaimQueryEngine, ClaimStore, MemoryClaimStore, SortDirection,
};

fn ids(claims: &[Claim]) -> BTreeSet<ClaimId> {
    claims.iter().map(|claim| claim.id).collect()
}

/// Evaluate the classifier predicate directly over every claim in the
/// collection, the way the subtraction-based scopes must behave.
fn direct_unfulfilled(store: &MemoryClaimStore, collection: CollectionId) -> BTreeSet<ClaimId> {
    store
        .select(&ClaimFilter::InCollection(collection))
        .expect("select")
        .into_iter()
        .filter(|claim| {
            let (item, work) = join(store, claim);
            !classifier::is_fulfilled(claim, item.as_ref(), work.as_ref())
        })
        .map(|claim| claim.id)
        .collect()
}

fn direct_unposted(store: &MemoryClaimStore, collection: CollectionId) -> BTreeSet<ClaimId> {
    store
        .select(&ClaimFilter::InCollection(collection))
        .expect("select")
        .into_iter()
        .filter(|claim| {
            let (_, work) = join(store, claim);
            !classifier::is_posted(claim, work.as_ref())
        })
        .map(|claim| claim.id)
        .collect()
}

fn join(
    store: &MemoryClaimStore,
    claim: &Claim,
) -> (
    Option<crate::claims::domain::CollectionItem>,
    Option<crate::claims::domain::Work>,
) {
    let Some(creation) = &claim.creation else {
        return (None, None);
    };
    let item = store
        .collection_item(claim.collection_id, creation)
        .expect("item lookup");
    let work = creation
        .work_id()
        .and_then(|id| store.work(id).expect("work lookup"));
    (item, work)
}

/// Mixed population: fulfilled, posted-unapproved, approved-draft, unstarted,
/// and an open claim without a signup.
fn mixed_population(store: &MemoryClaimStore) -> Vec<Claim> {
    let fulfilled = seed_fulfilled(store, 1, ALICE_SIGNUP, BOB);

    let posted_pending = claim_with_work(2, Some(BOB_SIGNUP), ALICE, WorkId(201));
    store.insert(posted_pending.clone()).expect("insert");
    store.insert_work(posted_work(WorkId(201)));
    store.insert_collection_item(pending_item(Creation::Work { id: WorkId(201) }));

    let approved_draft = claim_with_work(3, Some(ZED_SIGNUP), BOB, WorkId(202));
    store.insert(approved_draft.clone()).expect("insert");
    store.insert_work(draft_work(WorkId(202)));
    store.insert_collection_item(super::common::approved_item(Creation::Work {
        id: WorkId(202),
    }));

    let unstarted = claim(4, Some(ALICE_SIGNUP), ZED);
    let open = claim(5, None, ALICE);
    insert_all(store, &[unstarted.clone(), open.clone()]);

    vec![fulfilled, posted_pending, approved_draft, unstarted, open]
}

#[test]
fn filter_ast_matches_expected_rows() {
    let with_request = claim(1, Some(ALICE_SIGNUP), BOB);
    let open = claim(2, None, ZED);

    assert!(ClaimFilter::InCollection(COLLECTION).matches(&with_request));
    assert!(ClaimFilter::ByClaimingUser(BOB).matches(&with_request));
    assert!(!ClaimFilter::ByClaimingUser(ZED).matches(&with_request));
    assert!(ClaimFilter::ForRequestSignup(ALICE_SIGNUP).matches(&with_request));
    assert!(ClaimFilter::WithRequest.matches(&with_request));
    assert!(!ClaimFilter::WithRequest.matches(&open));
    assert!(ClaimFilter::WithoutRequest.matches(&open));
    assert!(ClaimFilter::Unstarted.matches(&open));
    assert!(!ClaimFilter::NotIn(vec![ClaimId(1)]).matches(&with_request));

    let composed = ClaimFilter::InCollection(COLLECTION)
        .and(ClaimFilter::WithRequest)
        .and(ClaimFilter::ByClaimingUser(BOB));
    assert!(composed.matches(&with_request));
    assert!(!composed.matches(&open));
}

#[test]
fn equality_scopes_select_expected_claims() {
    let store = store();
    mixed_population(&store);
    let engine = ClaimQueryEngine::new(store.clone());

    let for_signup = engine.for_request_signup(ALICE_SIGNUP).expect("select");
    assert_eq!(ids(&for_signup), BTreeSet::from([ClaimId(1), ClaimId(4)]));

    let by_user = engine.by_claiming_user(BOB).expect("select");
    assert_eq!(ids(&by_user), BTreeSet::from([ClaimId(1), ClaimId(3)]));

    let with_request = engine.with_request().expect("select");
    assert_eq!(with_request.len(), 4);

    let without_request = engine.without_request().expect("select");
    assert_eq!(ids(&without_request), BTreeSet::from([ClaimId(5)]));

    let unstarted = engine.unstarted_in(COLLECTION).expect("select");
    assert_eq!(ids(&unstarted), BTreeSet::from([ClaimId(4), ClaimId(5)]));
}

#[test]
fn fulfilled_scope_contains_only_approved_posted_works() {
    let store = store();
    mixed_population(&store);
    let engine = ClaimQueryEngine::new(store.clone());

    let fulfilled = engine.fulfilled_in(COLLECTION).expect("select");
    assert_eq!(ids(&fulfilled), BTreeSet::from([ClaimId(1)]));

    let posted = engine.posted_in(COLLECTION).expect("select");
    assert_eq!(ids(&posted), BTreeSet::from([ClaimId(1), ClaimId(2)]));
}

#[test]
fn subtraction_scopes_match_direct_predicate_evaluation() {
    let store = store();
    mixed_population(&store);
    let engine = ClaimQueryEngine::new(store.clone());

    let unfulfilled = engine.unfulfilled_in(COLLECTION).expect("select");
    assert_eq!(ids(&unfulfilled), direct_unfulfilled(&store, COLLECTION));

    let unposted = engine.unposted_in(COLLECTION).expect("select");
    assert_eq!(ids(&unposted), direct_unposted(&store, COLLECTION));
}

#[test]
fn subtraction_scopes_match_direct_evaluation_when_nothing_is_fulfilled() {
    let store = store();
    // Population with no fulfilled or posted claims at all.
    insert_all(
        &store,
        &[claim(1, Some(ALICE_SIGNUP), BOB), claim(2, None, ZED)],
    );
    let engine = ClaimQueryEngine::new(store.clone());

    let unfulfilled = engine.unfulfilled_in(COLLECTION).expect("select");
    assert_eq!(ids(&unfulfilled), direct_unfulfilled(&store, COLLECTION));
    assert_eq!(unfulfilled.len(), 2);

    let unposted = engine.unposted_in(COLLECTION).expect("select");
    assert_eq!(ids(&unposted), direct_unposted(&store, COLLECTION));
    assert_eq!(unposted.len(), 2);
}

#[test]
fn subtraction_scopes_match_direct_evaluation_when_everything_is_fulfilled() {
    let store = store();
    seed_fulfilled(&store, 1, ALICE_SIGNUP, BOB);
    seed_fulfilled(&store, 2, BOB_SIGNUP, ZED);
    let engine = ClaimQueryEngine::new(store.clone());

    let unfulfilled = engine.unfulfilled_in(COLLECTION).expect("select");
    assert!(unfulfilled.is_empty());
    assert_eq!(ids(&unfulfilled), direct_unfulfilled(&store, COLLECTION));
}

#[test]
fn unknown_collection_yields_empty_sets_not_errors() {
    let store = store();
    mixed_population(&store);
    let engine = ClaimQueryEngine::new(store.clone());
    let unknown = CollectionId(99);

    assert!(engine.in_collection(unknown).expect("select").is_empty());
    assert!(engine.fulfilled_in(unknown).expect("select").is_empty());
    assert!(engine.unfulfilled_in(unknown).expect("select").is_empty());
    assert!(engine.posted_in(unknown).expect("select").is_empty());
    assert!(engine.unposted_in(unknown).expect("select").is_empty());
}

#[test]
fn unposted_for_user_scopes_by_claimant() {
    let store = store();
    mixed_population(&store);
    let engine = ClaimQueryEngine::new(store.clone());

    // BOB holds claim 1 (posted, fulfilled) and claim 3 (draft).
    let unposted = engine.unposted_for_user(BOB).expect("select");
    assert_eq!(ids(&unposted), BTreeSet::from([ClaimId(3)]));

    // ZED holds only the unstarted claim 4.
    let unposted = engine.unposted_for_user(ZED).expect("select");
    assert_eq!(ids(&unposted), BTreeSet::from([ClaimId(4)]));
}

#[test]
fn ordering_by_requesting_byline_is_case_insensitive_and_drops_open_claims() {
    let refs = references();
    let claims = vec![
        claim(1, Some(ZED_SIGNUP), ALICE),
        claim(2, Some(ALICE_SIGNUP), BOB),
        claim(3, None, BOB),
        claim(4, Some(BOB_SIGNUP), ZED),
    ];

    let sorted = order_by_requesting_byline(claims.clone(), SortDirection::Ascending, refs.as_ref());
    let order: Vec<ClaimId> = sorted.iter().map(|claim| claim.id).collect();
    // alice < Bob < Zed, case-insensitively; the open claim is dropped.
    assert_eq!(order, vec![ClaimId(2), ClaimId(4), ClaimId(1)]);

    let reversed = order_by_requesting_byline(claims, SortDirection::Descending, refs.as_ref());
    let order: Vec<ClaimId> = reversed.iter().map(|claim| claim.id).collect();
    assert_eq!(order, vec![ClaimId(1), ClaimId(4), ClaimId(2)]);
}

#[test]
fn ordering_by_claiming_byline_uses_default_pseuds() {
    let refs = references();
    let claims = vec![
        claim(1, Some(ALICE_SIGNUP), ZED),
        claim(2, Some(ALICE_SIGNUP), ALICE),
        claim(3, Some(ALICE_SIGNUP), BOB),
    ];

    let sorted = order_by_claiming_byline(claims, SortDirection::Ascending, refs.as_ref());
    let order: Vec<ClaimId> = sorted.iter().map(|claim| claim.id).collect();
    assert_eq!(order, vec![ClaimId(2), ClaimId(3), ClaimId(1)]);
}

#[test]
fn ordering_by_date_is_oldest_first() {
    let mut early = claim(1, None, ALICE);
    let mut late = claim(2, None, BOB);
    early.created_at = chrono::Utc::now() - chrono::Duration::days(2);
    late.created_at = chrono::Utc::now();

    let sorted = order_by_date(vec![late, early]);
    let order: Vec<ClaimId> = sorted.iter().map(|claim| claim.id).collect();
    assert_eq!(order, vec![ClaimId(1), ClaimId(2)]);
}

#[test]
fn shared_store_supports_concurrent_classification_reads() {
    let store = store();
    mixed_population(&store);
    let store: Arc<MemoryClaimStore> = store;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                let engine = ClaimQueryEngine::new(store);
                ids(&engine.unfulfilled_in(COLLECTION).expect("select"))
            })
        })
        .collect();

    let expected = direct_unfulfilled(&store, COLLECTION);
    for handle in handles {
        assert_eq!(handle.join().expect("thread joins"), expected);
    }
}
