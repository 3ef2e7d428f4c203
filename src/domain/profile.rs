//! Profile Entity
//!
//! One row per user in the `profiles` table, keyed by the user's own id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::id::OwnerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: OwnerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProfile {
    pub name: String,
}

impl Entity for Profile {
    type Id = OwnerId;
    type Draft = NewProfile;
    type Patch = NewProfile;

    const TABLE: &'static str = "profiles";
    const OWNER_COLUMN: &'static str = "id";

    fn id(&self) -> &OwnerId {
        &self.id
    }

    fn owner(&self) -> &OwnerId {
        &self.id
    }

    fn from_draft(owner: &OwnerId, draft: &NewProfile, _created_at: DateTime<Utc>) -> Self {
        Self {
            id: owner.clone(),
            name: draft.name.clone(),
        }
    }

    fn apply(&mut self, patch: &NewProfile) {
        self.name = patch.name.clone();
    }
}
