//! Fulfillment-state resolution.
//!
//! Pure predicates over a claim joined with its moderation record and, for
//! Work creations, the work's publication flag. Classification runs along two
//! independent axes — approval (fulfilled/unfulfilled) and publication
//! (posted/unposted) — each refined by whether the claim has been started at
//! all. Fulfilled implies Posted; Posted does not imply Fulfilled.

use serde::{Deserialize, Serialize};

use super::domain::{Claim, CollectionItem, Creation, Work};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Unstarted,
    Started,
}

impl Progress {
    pub const fn label(self) -> &'static str {
        match self {
            Progress::Unstarted => "unstarted",
            Progress::Started => "started",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approval {
    Fulfilled,
    Unfulfilled,
}

impl Approval {
    pub const fn label(self) -> &'static str {
        match self {
            Approval::Fulfilled => "fulfilled",
            Approval::Unfulfilled => "unfulfilled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Publication {
    Posted,
    Unposted,
}

impl Publication {
    pub const fn label(self) -> &'static str {
        match self {
            Publication::Posted => "posted",
            Publication::Unposted => "unposted",
        }
    }
}

/// Where a claim stands on every axis at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub progress: Progress,
    pub approval: Approval,
    pub publication: Publication,
}

/// A claim with no attached creation. Reversible: the claimant may still
/// attach one later.
pub fn is_unstarted(claim: &Claim) -> bool {
    claim.creation.is_none()
}

/// Creation present and publicly visible. For Work creations the work row
/// must exist and be posted; for other kinds the condition is vacuous.
pub fn is_posted(claim: &Claim, work: Option<&Work>) -> bool {
    match &claim.creation {
        None => false,
        Some(Creation::Work { id }) => work.is_some_and(|work| work.id == *id && work.posted),
        Some(Creation::External { .. }) => true,
    }
}

/// Creation present, approved on both moderation axes, and posted (the
/// posted condition applying only to Work creations).
pub fn is_fulfilled(claim: &Claim, item: Option<&CollectionItem>, work: Option<&Work>) -> bool {
    if claim.creation.is_none() {
        return false;
    }
    let approved = item.is_some_and(CollectionItem::approved);
    approved && is_posted(claim, work)
}

pub fn classify(claim: &Claim, item: Option<&CollectionItem>, work: Option<&Work>) -> Classification {
    let progress = if is_unstarted(claim) {
        Progress::Unstarted
    } else {
        Progress::Started
    };
    let approval = if is_fulfilled(claim, item, work) {
        Approval::Fulfilled
    } else {
        Approval::Unfulfilled
    };
    let publication = if is_posted(claim, work) {
        Publication::Posted
    } else {
        Publication::Unposted
    };

    Classification {
        progress,
        approval,
        publication,
    }
}
