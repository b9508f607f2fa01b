use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::claims::domain::{
    ApprovalStatus, Claim, ClaimId, Collection, CollectionId, CollectionItem, Creation, Prompt,
    PromptId, Pseud, PseudId, Signup, SignupId, User, UserId, Work, WorkId,
};
use crate::claims::query::{ClaimStore, MemoryClaimStore};
use crate::claims::reference::MemoryReferenceData;
use crate::claims::service::ClaimService;

pub(super) const COLLECTION: CollectionId = CollectionId(1);
pub(super) const OTHER_COLLECTION: CollectionId = CollectionId(2);
pub(super) const MAINTAINER: UserId = UserId(9);

pub(super) const ALICE: UserId = UserId(1);
pub(super) const BOB: UserId = UserId(2);
pub(super) const ZED: UserId = UserId(3);

pub(super) const ALICE_SIGNUP: SignupId = SignupId(1);
pub(super) const BOB_SIGNUP: SignupId = SignupId(2);
pub(super) const ZED_SIGNUP: SignupId = SignupId(3);

pub(super) const OPEN_PROMPT: PromptId = PromptId(1);
pub(super) const ANON_PROMPT: PromptId = PromptId(2);

pub(super) fn references() -> Arc<MemoryReferenceData> {
    let refs = MemoryReferenceData::shared();

    refs.insert_collection(Collection {
        id: COLLECTION,
        title: "Midwinter Exchange".to_string(),
        maintainer_ids: vec![MAINTAINER],
    });
    refs.insert_collection(Collection {
        id: OTHER_COLLECTION,
        title: "Rarepair Fest".to_string(),
        maintainer_ids: Vec::new(),
    });

    let people = [
        (ALICE, PseudId(1), "alice"),
        (BOB, PseudId(2), "Bob"),
        (ZED, PseudId(3), "Zed"),
        (MAINTAINER, PseudId(9), "mod_holly"),
    ];
    for (user_id, pseud_id, name) in people {
        refs.insert_user(User {
            id: user_id,
            login: name.to_lowercase(),
            default_pseud_id: pseud_id,
        });
        refs.insert_pseud(Pseud {
            id: pseud_id,
            user_id,
            name: name.to_string(),
        });
    }

    let signups = [
        (ALICE_SIGNUP, PseudId(1)),
        (BOB_SIGNUP, PseudId(2)),
        (ZED_SIGNUP, PseudId(3)),
    ];
    for (signup_id, pseud_id) in signups {
        refs.insert_signup(Signup {
            id: signup_id,
            collection_id: COLLECTION,
            pseud_id,
        });
    }

    refs.insert_prompt(Prompt {
        id: OPEN_PROMPT,
        anonymous: false,
        tags: vec!["Winter".to_string(), "Found Family".to_string()],
    });
    refs.insert_prompt(Prompt {
        id: ANON_PROMPT,
        anonymous: true,
        tags: Vec::new(),
    });

    refs
}

pub(super) fn claim(id: u64, signup: Option<SignupId>, claiming_user: UserId) -> Claim {
    Claim {
        id: ClaimId(id),
        collection_id: COLLECTION,
        request_signup_id: signup,
        request_prompt_id: Some(OPEN_PROMPT),
        claiming_user_id: claiming_user,
        creation: None,
        created_at: Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap(),
    }
}

pub(super) fn claim_with_work(
    id: u64,
    signup: Option<SignupId>,
    claiming_user: UserId,
    work: WorkId,
) -> Claim {
    let mut claim = claim(id, signup, claiming_user);
    claim.creation = Some(Creation::Work { id: work });
    claim
}

pub(super) fn approved_item(creation: Creation) -> CollectionItem {
    CollectionItem {
        collection_id: COLLECTION,
        item: creation,
        user_approval_status: ApprovalStatus::Approved,
        collection_approval_status: ApprovalStatus::Approved,
    }
}

pub(super) fn pending_item(creation: Creation) -> CollectionItem {
    CollectionItem {
        collection_id: COLLECTION,
        item: creation,
        user_approval_status: ApprovalStatus::Approved,
        collection_approval_status: ApprovalStatus::Unreviewed,
    }
}

pub(super) fn posted_work(id: WorkId) -> Work {
    Work { id, posted: true }
}

pub(super) fn draft_work(id: WorkId) -> Work {
    Work { id, posted: false }
}

pub(super) fn store() -> Arc<MemoryClaimStore> {
    MemoryClaimStore::shared()
}

pub(super) fn insert_all(store: &MemoryClaimStore, claims: &[Claim]) {
    for claim in claims {
        store.insert(claim.clone()).expect("claim inserts");
    }
}

pub(super) fn build_service() -> (
    ClaimService<MemoryClaimStore, MemoryReferenceData>,
    Arc<MemoryClaimStore>,
    Arc<MemoryReferenceData>,
) {
    let store = store();
    let refs = references();
    let service = ClaimService::new(store.clone(), refs.clone());
    (service, store, refs)
}

/// A fully fulfilled claim: posted work, approved on both moderation axes.
pub(super) fn seed_fulfilled(store: &MemoryClaimStore, id: u64, signup: SignupId, user: UserId) -> Claim {
    let work = WorkId(100 + id);
    let claim = claim_with_work(id, Some(signup), user, work);
    store.insert(claim.clone()).expect("claim inserts");
    store.insert_work(posted_work(work));
    store.insert_collection_item(approved_item(Creation::Work { id: work }));
    claim
}
