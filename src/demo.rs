//! Seed data for the CLI report and for running the service without an
//! external store attached.

use std::sync::Arc;

use crate::claims::{
    ApprovalStatus, Claim, ClaimService, ClaimServiceError, Collection, CollectionId,
    CollectionItem, Creation, MemoryClaimStore, MemoryReferenceData, NewClaim, Prompt, PromptId,
    Pseud, PseudId, Signup, SignupId, User, UserId, Work, WorkId,
};

pub const DEMO_COLLECTION: CollectionId = CollectionId(1);

/// A small exchange: one fulfilled claim, one posted-but-unapproved claim,
/// one unstarted claim against a signup, and one open claim with no request.
pub struct DemoExchange {
    pub service: ClaimService<MemoryClaimStore, MemoryReferenceData>,
    pub collection: CollectionId,
    pub claims: Vec<Claim>,
}

pub fn seed() -> Result<DemoExchange, ClaimServiceError> {
    let store = MemoryClaimStore::shared();
    let refs = MemoryReferenceData::shared();

    refs.insert_collection(Collection {
        id: DEMO_COLLECTION,
        title: "Midwinter Exchange".to_string(),
        maintainer_ids: vec![UserId(1)],
    });

    let people = [
        (UserId(1), PseudId(1), "mod_holly"),
        (UserId(2), PseudId(2), "Astra"),
        (UserId(3), PseudId(3), "birchwine"),
        (UserId(4), PseudId(4), "Caradoc"),
        (UserId(5), PseudId(5), "zephyr"),
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

    refs.insert_signup(Signup {
        id: SignupId(10),
        collection_id: DEMO_COLLECTION,
        pseud_id: PseudId(2),
    });
    refs.insert_signup(Signup {
        id: SignupId(11),
        collection_id: DEMO_COLLECTION,
        pseud_id: PseudId(3),
    });
    refs.insert_prompt(Prompt {
        id: PromptId(20),
        anonymous: false,
        tags: vec!["Winter".to_string(), "Found Family".to_string()],
    });
    refs.insert_prompt(Prompt {
        id: PromptId(21),
        anonymous: true,
        tags: vec!["Mystery".to_string()],
    });

    let service = ClaimService::new(store.clone(), refs);

    let fulfilled = service.claim(NewClaim {
        collection_id: DEMO_COLLECTION,
        request_signup_id: Some(SignupId(10)),
        request_prompt_id: Some(PromptId(20)),
        claiming_user_id: UserId(4),
    })?;
    let fulfilled = service.attach_creation(fulfilled.id, Creation::Work { id: WorkId(100) })?;
    store.insert_work(Work {
        id: WorkId(100),
        posted: true,
    });
    store.insert_collection_item(CollectionItem {
        collection_id: DEMO_COLLECTION,
        item: Creation::Work { id: WorkId(100) },
        user_approval_status: ApprovalStatus::Approved,
        collection_approval_status: ApprovalStatus::Approved,
    });

    let pending = service.claim(NewClaim {
        collection_id: DEMO_COLLECTION,
        request_signup_id: Some(SignupId(11)),
        request_prompt_id: Some(PromptId(21)),
        claiming_user_id: UserId(5),
    })?;
    let pending = service.attach_creation(pending.id, Creation::Work { id: WorkId(101) })?;
    store.insert_work(Work {
        id: WorkId(101),
        posted: true,
    });
    store.insert_collection_item(CollectionItem {
        collection_id: DEMO_COLLECTION,
        item: Creation::Work { id: WorkId(101) },
        user_approval_status: ApprovalStatus::Approved,
        collection_approval_status: ApprovalStatus::Unreviewed,
    });

    let unstarted = service.claim(NewClaim {
        collection_id: DEMO_COLLECTION,
        request_signup_id: Some(SignupId(10)),
        request_prompt_id: Some(PromptId(20)),
        claiming_user_id: UserId(2),
    })?;

    let open = service.claim(NewClaim {
        collection_id: DEMO_COLLECTION,
        request_signup_id: None,
        request_prompt_id: None,
        claiming_user_id: UserId(3),
    })?;

    Ok(DemoExchange {
        service,
        collection: DEMO_COLLECTION,
        claims: vec![fulfilled, pending, unstarted, open],
    })
}

pub fn shared_service() -> Result<Arc<ClaimService<MemoryClaimStore, MemoryReferenceData>>, ClaimServiceError> {
    Ok(Arc::new(seed()?.service))
}
