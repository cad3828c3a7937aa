//! Easel Client - session-side lock controller
//!
//! This crate models the editor's side of canvas locking:
//! - `LockTransport`: the wire seam, implemented over HTTP by
//!   `HttpLockTransport` and by mocks in tests
//! - `LockStateMachine`: the pure session state machine
//!   (Unlocked → Acquiring → Held ⇄ Refreshing → Released/Expired)
//! - `EditSession`: the timer-driven driver that keeps a held lock alive and
//!   releases it on close or drop

pub mod error;
pub mod machine;
pub mod session;
pub mod transport;

pub use error::{ClientError, Result};
pub use machine::{LockStateMachine, SessionAction, SessionEvent, SessionState};
pub use session::{EditSession, OpenError, SessionConfig};
pub use transport::{
    AcquireResponse, HttpLockTransport, LockClientConfig, LockTransport, RefreshResponse,
};
