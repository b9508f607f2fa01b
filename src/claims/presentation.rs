//! Claim ordering and display derivations.

use std::cmp::Ordering;

use super::domain::{Claim, Pseud};
use super::reference::{ReferenceData, ReferenceNotFound};

/// Byline shown for claims that carry no request signup.
pub const NONE_BYLINE: &str = "- None -";

/// Total-order sort key for claims: a claim without a request signup sorts
/// after one with a signup, then case-insensitive byline comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BylineKey {
    missing_request: bool,
    byline: String,
}

impl BylineKey {
    /// Build the key for a claim. A signup reference that no longer resolves
    /// degrades to the missing-request key rather than erroring, so ordering
    /// paths never fail on deleted reference data.
    pub fn for_claim(claim: &Claim, refs: &dyn ReferenceData) -> Self {
        let byline = claim
            .request_signup_id
            .and_then(|signup_id| refs.signup(signup_id))
            .and_then(|signup| refs.pseud(signup.pseud_id))
            .map(|pseud| pseud.name);

        match byline {
            Some(byline) => Self {
                missing_request: false,
                byline: byline.to_lowercase(),
            },
            None => Self {
                missing_request: true,
                byline: NONE_BYLINE.to_lowercase(),
            },
        }
    }
}

impl Ord for BylineKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.missing_request
            .cmp(&other.missing_request)
            .then_with(|| self.byline.cmp(&other.byline))
    }
}

impl PartialOrd for BylineKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Comparison rule used when presenting claim listings.
pub fn compare_by_request_byline(a: &Claim, b: &Claim, refs: &dyn ReferenceData) -> Ordering {
    BylineKey::for_claim(a, refs).cmp(&BylineKey::for_claim(b, refs))
}

/// The requesting signup's pseud, or `None` for open claims. A signup id
/// that no longer resolves is an error: the claim names an entity the
/// reference store cannot produce.
pub fn requesting_pseud(
    claim: &Claim,
    refs: &dyn ReferenceData,
) -> Result<Option<Pseud>, ReferenceNotFound> {
    let Some(signup_id) = claim.request_signup_id else {
        return Ok(None);
    };
    let signup = refs
        .signup(signup_id)
        .ok_or_else(|| ReferenceNotFound::new("signup", signup_id.0))?;
    let pseud = refs
        .pseud(signup.pseud_id)
        .ok_or_else(|| ReferenceNotFound::new("pseud", signup.pseud_id.0))?;
    Ok(Some(pseud))
}

/// Display name of the requester, `- None -` for open claims.
pub fn request_byline(claim: &Claim, refs: &dyn ReferenceData) -> Result<String, ReferenceNotFound> {
    Ok(requesting_pseud(claim, refs)?
        .map(|pseud| pseud.name)
        .unwrap_or_else(|| NONE_BYLINE.to_string()))
}

/// Display name of the claiming user's default pseud.
pub fn claiming_byline(claim: &Claim, refs: &dyn ReferenceData) -> Result<String, ReferenceNotFound> {
    let pseud = refs
        .default_pseud(claim.claiming_user_id)
        .ok_or_else(|| ReferenceNotFound::new("user", claim.claiming_user_id.0))?;
    Ok(pseud.name)
}

/// Display title for a claim: collection title plus the requester byline
/// (or `Anonymous` when the prompt hides it), then the prompt's tag list.
pub fn claim_title(claim: &Claim, refs: &dyn ReferenceData) -> Result<String, ReferenceNotFound> {
    let collection = refs
        .collection(claim.collection_id)
        .ok_or_else(|| ReferenceNotFound::new("collection", claim.collection_id.0))?;

    let prompt = match claim.request_prompt_id {
        Some(prompt_id) => Some(
            refs.prompt(prompt_id)
                .ok_or_else(|| ReferenceNotFound::new("prompt", prompt_id.0))?,
        ),
        None => None,
    };

    let anonymous = prompt.as_ref().is_some_and(|prompt| prompt.anonymous);
    let mut title = if anonymous {
        format!("{} (Anonymous)", collection.title)
    } else {
        format!("{} ({})", collection.title, request_byline(claim, refs)?)
    };

    if let Some(prompt) = prompt {
        if !prompt.tags.is_empty() {
            title.push_str(" - ");
            title.push_str(&prompt.unlinked_tag_list());
        }
    }

    Ok(title)
}
