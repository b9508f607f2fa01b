//! Claim tracking for gift-exchange challenges.
//!
//! A claim records a user taking responsibility for fulfilling a request (a
//! signup/prompt pairing, or an open slot) within a collection. The modules
//! here resolve each claim's fulfillment state against the moderation and
//! publication status of its attached creation, expose the same semantics as
//! bulk query scopes, and derive the display ordering and titles used by
//! claim listings.

pub mod classifier;
pub mod domain;
pub mod presentation;
pub mod query;
pub mod reference;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use classifier::{classify, is_fulfilled, is_posted, is_unstarted, Approval, Classification, Progress, Publication};
pub use domain::{
    ApprovalStatus, Claim, ClaimId, Collection, CollectionId, CollectionItem, Creation,
    DataIntegrityError, NewClaim, Prompt, PromptId, Pseud, PseudId, Signup, SignupId, User, UserId,
    Work, WorkId, ALL_REQUESTED_ITEMS,
};
pub use presentation::{
    claim_title, claiming_byline, compare_by_request_byline, request_byline, requesting_pseud,
    BylineKey, NONE_BYLINE,
};
pub use query::{
    order_by_claiming_byline, order_by_date, order_by_requesting_byline, ClaimFilter,
    ClaimQueryEngine, ClaimStore, MemoryClaimStore, SortDirection, StoreError,
};
pub use reference::{MemoryReferenceData, ReferenceData, ReferenceNotFound};
pub use router::{claim_router, ClaimView};
pub use service::{ClaimService, ClaimServiceError};
