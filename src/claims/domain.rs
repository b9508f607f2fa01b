use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for claim records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignupId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PromptId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PseudId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkId(pub u64);

/// Sentinel callers pass for "every requested item". Assignment collaborators
/// consume it; nothing in this crate interprets it.
pub const ALL_REQUESTED_ITEMS: i64 = -1;

/// The creation a claimant attaches once they have produced something.
///
/// Replaces a loosely-coupled (creation_type, creation_id) column pair: a claim
/// holds `Option<Creation>`, so a half-set pair cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Creation {
    Work { id: WorkId },
    External { kind: String, id: u64 },
}

impl Creation {
    /// Decode a raw (type, id) column pair as read from an external store.
    /// A pair with exactly one side set violates the entity invariant.
    pub fn from_parts(
        kind: Option<&str>,
        id: Option<u64>,
    ) -> Result<Option<Self>, DataIntegrityError> {
        match (kind, id) {
            (None, None) => Ok(None),
            (Some("Work"), Some(id)) => Ok(Some(Creation::Work { id: WorkId(id) })),
            (Some(kind), Some(id)) => Ok(Some(Creation::External {
                kind: kind.to_string(),
                id,
            })),
            (Some(kind), None) => Err(DataIntegrityError::PartialCreation {
                detail: format!("creation type '{kind}' present without an id"),
            }),
            (None, Some(id)) => Err(DataIntegrityError::PartialCreation {
                detail: format!("creation id {id} present without a type"),
            }),
        }
    }

    pub fn work_id(&self) -> Option<WorkId> {
        match self {
            Creation::Work { id } => Some(*id),
            Creation::External { .. } => None,
        }
    }
}

/// Invariant violations detected while decoding externally stored rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataIntegrityError {
    #[error("partially set creation reference: {detail}")]
    PartialCreation { detail: String },
}

/// One claim slot: a user taking responsibility for fulfilling a request
/// (or an open slot) within a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub collection_id: CollectionId,
    pub request_signup_id: Option<SignupId>,
    pub request_prompt_id: Option<PromptId>,
    pub claiming_user_id: UserId,
    pub creation: Option<Creation>,
    pub created_at: DateTime<Utc>,
}

impl Claim {
    pub fn has_request(&self) -> bool {
        self.request_signup_id.is_some()
    }
}

/// Fields callers supply when claiming a slot; the service assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClaim {
    pub collection_id: CollectionId,
    pub request_signup_id: Option<SignupId>,
    pub request_prompt_id: Option<PromptId>,
    pub claiming_user_id: UserId,
}

/// Moderation verdict on one axis of a collection item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Unreviewed,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Unreviewed => "unreviewed",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

/// Moderation record for an item within a collection, carrying independent
/// user-side and collection-side approval flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub collection_id: CollectionId,
    pub item: Creation,
    pub user_approval_status: ApprovalStatus,
    pub collection_approval_status: ApprovalStatus,
}

impl CollectionItem {
    /// Approved only when both axes agree.
    pub fn approved(&self) -> bool {
        self.user_approval_status == ApprovalStatus::Approved
            && self.collection_approval_status == ApprovalStatus::Approved
    }
}

/// Snapshot of a produced work; only the publication flag matters here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: WorkId,
    pub posted: bool,
}

/// Read-only snapshot of an account, owned by an external collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub default_pseud_id: PseudId,
}

/// A display alias; `name` is the byline shown for the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pseud {
    pub id: PseudId,
    pub user_id: UserId,
    pub name: String,
}

impl Pseud {
    pub fn byline(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub title: String,
    pub maintainer_ids: Vec<UserId>,
}

impl Collection {
    pub fn is_maintained_by(&self, user: UserId) -> bool {
        self.maintainer_ids.contains(&user)
    }
}

/// A participant's registration expressing a request within a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signup {
    pub id: SignupId,
    pub collection_id: CollectionId,
    pub pseud_id: PseudId,
}

/// The content of a request; may be anonymous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: PromptId,
    pub anonymous: bool,
    pub tags: Vec<String>,
}

impl Prompt {
    /// Plain-text tag listing appended to claim titles.
    pub fn unlinked_tag_list(&self) -> String {
        self.tags.join(", ")
    }
}
