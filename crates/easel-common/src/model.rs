//! Wire models for the lock API
//!
//! These are the JSON bodies exchanged between the dashboard client and the
//! server. Timestamps are unix epoch milliseconds; field names are camelCase.

use serde::{Deserialize, Serialize};

/// Observed state of a lock, as returned by the status endpoint and carried
/// in conflict responses. An expired row reports `locked: false`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
}

impl LockStatus {
    pub fn unlocked() -> Self {
        Self {
            locked: false,
            expires_at: None,
            holder: None,
        }
    }

    pub fn held(expires_at: i64, holder: Option<String>) -> Self {
        Self {
            locked: true,
            expires_at: Some(expires_at),
            holder,
        }
    }
}

/// Successful acquire response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockGrant {
    pub locked: bool,
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
}

impl LockGrant {
    pub fn new(expires_at: i64, holder: Option<String>) -> Self {
        Self {
            locked: true,
            expires_at,
            holder,
        }
    }
}

/// Successful refresh response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReceipt {
    pub expires_at: i64,
}

/// Release response body. `released` tells whether a row actually existed;
/// releasing an absent lock is still a success.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseReceipt {
    pub released: bool,
}

/// Maintenance sweep response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReceipt {
    pub deleted: u64,
}

/// Optional acquire/refresh request body. `holder` is a passthrough for
/// holder-tracking deployments; the server mints its own when absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
}

/// Standard error envelope for 4xx/5xx responses that are not lock outcomes.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResult {
    pub timestamp: String,
    pub status: i32,
    pub error: String,
    pub message: String,
    pub path: String,
}
