//! Session state machine
//!
//! Pure transition table for an editing session's lock lifecycle. The driver
//! in `session` feeds it events and performs the actions it emits; keeping
//! the table free of I/O makes every transition unit-testable.
//!
//! ```text
//! Unlocked --Open--> Acquiring --Granted--> Held <--Refreshed-- Refreshing
//!                        |                   |                      |
//!                      Denied            RefreshDue              NotHeld
//!                        v                   v                      v
//!                    Unlocked            Refreshing              Expired
//!
//! Held/Refreshing --Close--> Released        (Released, Expired terminal)
//! ```

/// Lifecycle states of an editing session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unlocked,
    Acquiring,
    Held,
    Refreshing,
    /// Closed normally; the lock was released.
    Released,
    /// Ownership was lost (lease lapsed or taken over). Terminal: the editor
    /// must go read-only, and only a fresh session may edit again.
    Expired,
}

/// Inputs to the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The editor was opened.
    Open,
    /// Acquire succeeded with this lease expiry.
    Granted { expires_at: i64 },
    /// Acquire hit a live lock held elsewhere.
    Denied,
    /// The refresh timer fired.
    RefreshDue,
    /// Refresh succeeded with this new expiry.
    Refreshed { expires_at: i64 },
    /// Refresh was answered: no live lease is ours.
    NotHeld,
    /// Refresh could not reach the server; ownership unknown.
    RefreshFailed,
    /// The editor is closing.
    Close,
}

/// Side effects the driver must perform after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAction {
    CallAcquire,
    CallRefresh,
    CallRelease,
    /// Show the caller why the session could not start.
    SurfaceConflict,
    /// Stop accepting edits.
    ForceReadOnly,
}

/// The transition table. Events that make no sense in the current state are
/// ignored; `Released` and `Expired` absorb everything.
#[derive(Debug)]
pub struct LockStateMachine {
    state: SessionState,
    expires_at: Option<i64>,
}

impl Default for LockStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LockStateMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Unlocked,
            expires_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Server-side expiry of the current lease, if one is held.
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    pub fn handle(&mut self, event: SessionEvent) -> Option<SessionAction> {
        use SessionAction::*;
        use SessionEvent::*;
        use SessionState::*;

        let (next, action) = match (self.state, event) {
            (Unlocked, Open) => (Acquiring, Some(CallAcquire)),

            (Acquiring, Granted { expires_at }) => {
                self.expires_at = Some(expires_at);
                (Held, None)
            }
            (Acquiring, Denied) => (Unlocked, Some(SurfaceConflict)),

            (Held, RefreshDue) => (Refreshing, Some(CallRefresh)),

            (Refreshing, Refreshed { expires_at }) => {
                self.expires_at = Some(expires_at);
                (Held, None)
            }
            (Refreshing, NotHeld) => {
                self.expires_at = None;
                (Expired, Some(ForceReadOnly))
            }
            // Ownership unknown; keep the lease we think we have and let the
            // next timer tick try again.
            (Refreshing, RefreshFailed) => (Held, None),

            (Held, Close) | (Refreshing, Close) | (Acquiring, Close) => {
                self.expires_at = None;
                (Released, Some(CallRelease))
            }
            (Unlocked, Close) => (Unlocked, None),

            (state, _) => (state, None),
        };

        self.state = next;
        action
    }
}
