//! Lock service outcomes
//!
//! Contention is an expected result of correct operation, so `Conflict` and
//! `NotHeld` are enum variants rather than errors. `Err` is reserved for
//! storage and programming faults.

use easel_common::model::{LockGrant, LockStatus};
use serde::{Deserialize, Serialize};

/// Proof of a successful acquire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockToken {
    pub resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    pub acquired_at: i64,
    pub expires_at: i64,
}

impl LockToken {
    /// Wire-shaped grant body for the acquirer.
    pub fn grant(&self) -> LockGrant {
        LockGrant::new(self.expires_at, self.holder.clone())
    }
}

/// Result of an acquire attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum AcquireOutcome {
    Acquired(LockToken),
    /// Someone else holds a live lease; carries what the contender saw.
    Conflict(LockStatus),
}

impl AcquireOutcome {
    pub fn is_acquired(&self) -> bool {
        matches!(self, AcquireOutcome::Acquired(_))
    }
}

/// Result of a refresh attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { expires_at: i64 },
    /// No live lease matched: it expired, was released, or (in holder
    /// tracking mode) belongs to a different holder. The caller has lost
    /// ownership and must stop treating the resource as editable.
    NotHeld,
}
