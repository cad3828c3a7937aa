//! Editing session driver
//!
//! `EditSession` owns a held lock for the lifetime of an editor view. It
//! acquires on open, keeps the lease alive from a timer task, exposes the
//! session state through a watch channel, and releases on close or drop.
//!
//! Losing the lock is detected through the server's answer, never guessed
//! from the local clock: a refresh answered with "not held" flips the
//! session to `Expired`, and consumers watching the state must stop editing.
//! A refresh that cannot reach the server keeps the session in `Held` and is
//! retried, first with backoff inside the tick, then on the next tick.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use easel_common::epoch_millis;
use easel_common::model::LockStatus;

use crate::error::ClientError;
use crate::machine::{LockStateMachine, SessionAction, SessionEvent, SessionState};
use crate::transport::{AcquireResponse, LockTransport, RefreshResponse};

/// Tunables for the session driver.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Cadence of keep-alive refreshes. Must be well below the server's lock
    /// TTL; a third of it is a good choice.
    pub refresh_interval: Duration,
    /// Attempts per refresh cycle before giving up until the next tick.
    pub retry_attempts: u32,
    /// First retry delay; doubles per attempt.
    pub retry_base_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

/// Why a session could not be opened.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// Another session holds the lock; the status tells the caller what to
    /// show (typically "locked until {expiresAt}").
    #[error("resource is locked by another session")]
    Locked(LockStatus),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// A live editing session holding the exclusive lock on one resource.
pub struct EditSession {
    resource_id: String,
    holder: Option<String>,
    transport: Arc<dyn LockTransport>,
    machine: Arc<Mutex<LockStateMachine>>,
    state_tx: Arc<watch::Sender<SessionState>>,
    refresh_task: Option<JoinHandle<()>>,
    closed: bool,
}

impl EditSession {
    /// Acquire the lock and start the keep-alive loop.
    ///
    /// On contention the session never starts: the current status travels
    /// back in `OpenError::Locked` for the caller to surface.
    pub async fn open(
        transport: Arc<dyn LockTransport>,
        resource_id: &str,
        config: SessionConfig,
    ) -> Result<Self, OpenError> {
        let mut machine = LockStateMachine::new();
        machine.handle(SessionEvent::Open);

        match transport.acquire(resource_id, None).await? {
            AcquireResponse::Granted(grant) => {
                machine.handle(SessionEvent::Granted {
                    expires_at: grant.expires_at,
                });
                debug!(resource_id = %resource_id, expires_at = grant.expires_at, "edit session opened");

                let lease = Duration::from_millis((grant.expires_at - epoch_millis()).max(0) as u64);
                let (state_tx, _) = watch::channel(SessionState::Held);
                let mut session = Self {
                    resource_id: resource_id.to_string(),
                    holder: grant.holder,
                    transport,
                    machine: Arc::new(Mutex::new(machine)),
                    state_tx: Arc::new(state_tx),
                    refresh_task: None,
                    closed: false,
                };
                session.refresh_task = Some(session.spawn_refresh_loop(config, lease));
                Ok(session)
            }
            AcquireResponse::Conflict(status) => {
                machine.handle(SessionEvent::Denied);
                debug!(resource_id = %resource_id, "edit session denied, lock is held");
                Err(OpenError::Locked(status))
            }
        }
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Holder identity from the grant, present in holder tracking mode.
    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.machine
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .state()
    }

    /// Server-side lease expiry as of the last acknowledged grant/refresh.
    pub fn expires_at(&self) -> Option<i64> {
        self.machine
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .expires_at()
    }

    /// Subscribe to state changes. The editor forces read-only mode when it
    /// observes `Expired`.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Release the lock and end the session.
    ///
    /// A failed release is logged and swallowed: the lease lapses by TTL.
    pub async fn close(mut self) {
        self.closed = true;
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }

        let release_due = {
            let mut machine = self.machine.lock().unwrap_or_else(|e| e.into_inner());
            machine.handle(SessionEvent::Close) == Some(SessionAction::CallRelease)
        };

        if release_due {
            if let Err(err) = self
                .transport
                .release(&self.resource_id, self.holder.as_deref())
                .await
            {
                warn!(resource_id = %self.resource_id, error = %err, "release on close failed, lease will lapse by TTL");
            }
            let _ = self.state_tx.send(SessionState::Released);
            debug!(resource_id = %self.resource_id, "edit session closed");
        }
    }

    fn spawn_refresh_loop(&self, config: SessionConfig, lease: Duration) -> JoinHandle<()> {
        let transport = Arc::clone(&self.transport);
        let machine = Arc::clone(&self.machine);
        let state_tx = Arc::clone(&self.state_tx);
        let resource_id = self.resource_id.clone();
        let holder = self.holder.clone();
        let period = effective_refresh_interval(&config, lease, &self.resource_id);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately and is not a cycle.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let due = {
                    let mut machine = machine.lock().unwrap_or_else(|e| e.into_inner());
                    machine.handle(SessionEvent::RefreshDue)
                };
                if due != Some(SessionAction::CallRefresh) {
                    break;
                }
                let _ = state_tx.send(SessionState::Refreshing);

                match refresh_with_retry(transport.as_ref(), &resource_id, holder.as_deref(), &config)
                    .await
                {
                    Ok(RefreshResponse::Refreshed { expires_at }) => {
                        let mut machine = machine.lock().unwrap_or_else(|e| e.into_inner());
                        machine.handle(SessionEvent::Refreshed { expires_at });
                        drop(machine);
                        let _ = state_tx.send(SessionState::Held);
                    }
                    Ok(RefreshResponse::NotHeld) => {
                        let mut machine = machine.lock().unwrap_or_else(|e| e.into_inner());
                        machine.handle(SessionEvent::NotHeld);
                        drop(machine);
                        let _ = state_tx.send(SessionState::Expired);
                        warn!(resource_id = %resource_id, "edit lock lost, session is now read-only");
                        break;
                    }
                    Err(err) => {
                        let mut machine = machine.lock().unwrap_or_else(|e| e.into_inner());
                        machine.handle(SessionEvent::RefreshFailed);
                        drop(machine);
                        let _ = state_tx.send(SessionState::Held);
                        warn!(resource_id = %resource_id, error = %err, "refresh cycle failed, will retry on next tick");
                    }
                }
            }
        })
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }

        let release_due = {
            let mut machine = self.machine.lock().unwrap_or_else(|e| e.into_inner());
            machine.handle(SessionEvent::Close) == Some(SessionAction::CallRelease)
        };

        // Best effort: fire the release without waiting for it. If no
        // runtime is available the lease simply lapses by TTL.
        if release_due && let Ok(handle) = tokio::runtime::Handle::try_current() {
            let transport = Arc::clone(&self.transport);
            let resource_id = self.resource_id.clone();
            let holder = self.holder.clone();
            handle.spawn(async move {
                let _ = transport.release(&resource_id, holder.as_deref()).await;
            });
        }
    }
}

/// Cap the refresh cadence at half the granted lease; a slower timer would
/// let the lease lapse between ticks. Falls back to a third of the lease.
/// A degenerate lease (mocks, clock skew) leaves the configured cadence
/// untouched.
fn effective_refresh_interval(
    config: &SessionConfig,
    lease: Duration,
    resource_id: &str,
) -> Duration {
    let cap = lease / 2;
    if cap.is_zero() || config.refresh_interval <= cap {
        return config.refresh_interval;
    }
    let fallback = (lease / 3).max(Duration::from_millis(1));
    warn!(
        resource_id = %resource_id,
        configured_ms = config.refresh_interval.as_millis() as u64,
        lease_ms = lease.as_millis() as u64,
        effective_ms = fallback.as_millis() as u64,
        "refresh interval exceeds half the lease, tightening cadence"
    );
    fallback
}

async fn refresh_with_retry(
    transport: &dyn LockTransport,
    resource_id: &str,
    holder: Option<&str>,
    config: &SessionConfig,
) -> Result<RefreshResponse, ClientError> {
    let mut delay = config.retry_base_delay;
    let mut attempt = 0;

    loop {
        match transport.refresh(resource_id, holder).await {
            Ok(response) => return Ok(response),
            Err(err) => {
                attempt += 1;
                if attempt >= config.retry_attempts.max(1) {
                    return Err(err);
                }
                debug!(resource_id = %resource_id, attempt, error = %err, "refresh attempt failed, backing off");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
        }
    }
}
