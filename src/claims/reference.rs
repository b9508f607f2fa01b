use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{
    Collection, CollectionId, Prompt, PromptId, Pseud, PseudId, Signup, SignupId, User, UserId,
};

/// Read-only lookups for entities owned by external collaborators.
///
/// Missing rows are an ordinary outcome (accounts get deleted, signups get
/// withdrawn), so every accessor returns `Option` rather than erroring.
pub trait ReferenceData: Send + Sync {
    fn user(&self, id: UserId) -> Option<User>;
    fn pseud(&self, id: PseudId) -> Option<Pseud>;
    fn collection(&self, id: CollectionId) -> Option<Collection>;
    fn signup(&self, id: SignupId) -> Option<Signup>;
    fn prompt(&self, id: PromptId) -> Option<Prompt>;

    /// The user's default alias, used for claiming bylines.
    fn default_pseud(&self, user: UserId) -> Option<Pseud> {
        let user = self.user(user)?;
        self.pseud(user.default_pseud_id)
    }
}

/// Raised by derivations that cannot proceed without the named entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct ReferenceNotFound {
    pub entity: &'static str,
    pub id: u64,
}

impl ReferenceNotFound {
    pub fn new(entity: &'static str, id: u64) -> Self {
        Self { entity, id }
    }
}

/// In-memory reference set backing demos and tests.
#[derive(Default)]
pub struct MemoryReferenceData {
    users: Mutex<HashMap<UserId, User>>,
    pseuds: Mutex<HashMap<PseudId, Pseud>>,
    collections: Mutex<HashMap<CollectionId, Collection>>,
    signups: Mutex<HashMap<SignupId, Signup>>,
    prompts: Mutex<HashMap<PromptId, Prompt>>,
}

impl MemoryReferenceData {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_user(&self, user: User) {
        self.users
            .lock()
            .expect("reference mutex poisoned")
            .insert(user.id, user);
    }

    pub fn insert_pseud(&self, pseud: Pseud) {
        self.pseuds
            .lock()
            .expect("reference mutex poisoned")
            .insert(pseud.id, pseud);
    }

    pub fn insert_collection(&self, collection: Collection) {
        self.collections
            .lock()
            .expect("reference mutex poisoned")
            .insert(collection.id, collection);
    }

    pub fn insert_signup(&self, signup: Signup) {
        self.signups
            .lock()
            .expect("reference mutex poisoned")
            .insert(signup.id, signup);
    }

    pub fn insert_prompt(&self, prompt: Prompt) {
        self.prompts
            .lock()
            .expect("reference mutex poisoned")
            .insert(prompt.id, prompt);
    }

    pub fn remove_user(&self, id: UserId) {
        self.users
            .lock()
            .expect("reference mutex poisoned")
            .remove(&id);
    }
}

impl ReferenceData for MemoryReferenceData {
    fn user(&self, id: UserId) -> Option<User> {
        self.users
            .lock()
            .expect("reference mutex poisoned")
            .get(&id)
            .cloned()
    }

    fn pseud(&self, id: PseudId) -> Option<Pseud> {
        self.pseuds
            .lock()
            .expect("reference mutex poisoned")
            .get(&id)
            .cloned()
    }

    fn collection(&self, id: CollectionId) -> Option<Collection> {
        self.collections
            .lock()
            .expect("reference mutex poisoned")
            .get(&id)
            .cloned()
    }

    fn signup(&self, id: SignupId) -> Option<Signup> {
        self.signups
            .lock()
            .expect("reference mutex poisoned")
            .get(&id)
            .cloned()
    }

    fn prompt(&self, id: PromptId) -> Option<Prompt> {
        self.prompts
            .lock()
            .expect("reference mutex poisoned")
            .get(&id)
            .cloned()
    }
}
