//! Session store.
//!
//! The single authoritative in-memory answer to "who is logged in". State is
//! published on a `watch` channel as a [`SessionSnapshot`] whose `generation`
//! grows by one on every applied change.
//!
//! Two guards keep observers from ever seeing a stale value overwrite a newer one:
//!
//! - backend [`AuthChange`]s carry a sequence number; a change whose sequence
//!   is not greater than the last applied one is dropped
//! - `initialize` remembers the generation it started from and discards its
//!   restore result if anything was applied while the restore was in flight

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::{CancellationToken, DropGuard};
use toxiscope_core::local_state::PreferenceStore;
use toxiscope_core::session::{
    AuthBackend, AuthChange, Credentials, Identity, Session, SessionState, validate_credentials, validate_password,
};
use toxiscope_core::{BackendError, ClientError, ClientResult};

/// One published session value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub state: SessionState,
}

#[derive(Debug, Default)]
struct Progress {
    last_sequence: u64,
    generation: u64,
}

pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    preferences: Option<Arc<dyn PreferenceStore>>,
    progress: Mutex<Progress>,
    snapshots: watch::Sender<SessionSnapshot>,
    listening: AtomicBool,
    shutdown: CancellationToken,
}

impl SessionStore {
    /// Creates a store in the `Loading` state. Nothing is fetched until
    /// [`initialize`](Self::initialize) is called.
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (snapshots, _) = watch::channel(SessionSnapshot::default());
        Self {
            backend,
            preferences: None,
            progress: Mutex::new(Progress::default()),
            snapshots,
            listening: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    /// Keeps the advisory cached identity in `preferences` in step with the session.
    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Restores any existing session from the backend.
    ///
    /// Subscribes to backend changes *before* asking for the current session,
    /// so a change that lands during the restore is never missed. If such a
    /// change is applied first, the restore result is discarded.
    ///
    /// A failed restore resolves to `Anonymous`.
    pub async fn initialize(self: &Arc<Self>) -> SessionState {
        let started_at = self.generation();
        self.start_listening();

        let restored = match self.backend.current_session().await {
            Ok(session) => SessionState::from_session(session),
            Err(e) => {
                tracing::warn!("Session restore failed, continuing signed out: {}", e);
                SessionState::Anonymous
            }
        };

        let applied = self.commit_if(|progress| progress.generation == started_at, restored);
        if !applied {
            tracing::debug!(generation = started_at, "Discarding restore result superseded by a newer change");
        }
        self.state()
    }

    fn start_listening(self: &Arc<Self>) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut changes = self.backend.changes();
        let store = Arc::downgrade(self);
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    received = changes.recv() => received,
                };
                match received {
                    Ok(change) => match store.upgrade() {
                        Some(store) => {
                            store.apply_event(&change);
                        }
                        None => break,
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session change listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("Session change listener stopped");
        });
    }

    /// Stops listening for backend changes. Registered callbacks stop too.
    pub fn teardown(&self) {
        self.shutdown.cancel();
    }

    /// Applies a backend change unless a newer one was already applied.
    ///
    /// # Returns
    ///
    /// `true` if the change became the current state.
    pub fn apply_event(&self, change: &AuthChange) -> bool {
        let sequence = change.sequence;
        let accepted = self.commit_if(
            |progress| {
                if sequence <= progress.last_sequence {
                    return false;
                }
                progress.last_sequence = sequence;
                true
            },
            SessionState::from_session(change.session.clone()),
        );
        if !accepted {
            tracing::debug!(sequence, "Ignoring stale session change");
        }
        accepted
    }

    /// Drops the current session after the backend rejected its token.
    ///
    /// # Returns
    ///
    /// `true` only for the call that actually ended a live (or still loading)
    /// session; later calls for the same expiry return `false`.
    pub fn expire(&self) -> bool {
        let expired = self.commit_if(
            |_| {
                matches!(
                    self.snapshots.borrow().state,
                    SessionState::Loading | SessionState::Authenticated(_)
                )
            },
            SessionState::Anonymous,
        );
        if expired {
            tracing::info!("Session expired");
        }
        expired
    }

    fn commit_if<F>(&self, accept: F, state: SessionState) -> bool
    where
        F: FnOnce(&mut Progress) -> bool,
    {
        let mut progress = self.lock_progress();
        if !accept(&mut progress) {
            return false;
        }
        progress.generation += 1;
        let generation = progress.generation;
        let identity = state.identity().cloned();
        let resolved = !state.is_loading();
        self.snapshots.send_replace(SessionSnapshot { generation, state });
        drop(progress);

        tracing::debug!(generation, authenticated = identity.is_some(), "Session state changed");
        if resolved {
            self.remember_identity(identity.as_ref());
        }
        true
    }

    fn lock_progress(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remember_identity(&self, identity: Option<&Identity>) {
        if let Some(preferences) = &self.preferences {
            if let Err(e) = preferences.set_cached_identity(identity) {
                tracing::warn!("Failed to update cached identity: {}", e);
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshots.borrow().state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.snapshots.borrow().generation
    }

    pub fn session(&self) -> Option<Session> {
        self.snapshots.borrow().state.session().cloned()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.snapshots.borrow().state.identity().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.snapshots.borrow().state.is_loading()
    }

    /// Last known identity from local state. Advisory only; never use it to
    /// decide whether a session exists.
    pub fn cached_identity(&self) -> Option<Identity> {
        self.preferences.as_ref().and_then(|p| p.cached_identity())
    }

    /// Waits until the state is no longer `Loading`.
    pub async fn resolved(&self) -> SessionState {
        let mut subscription = self.subscribe();
        subscription.resolved().await.unwrap_or_else(|| self.state())
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.snapshots.subscribe(),
        }
    }

    /// Runs `callback` for every new snapshot until the returned listener is dropped.
    ///
    /// Dropping the listener from inside the callback is allowed; the current
    /// call completes and no further calls are made.
    pub fn on_change<F>(&self, callback: F) -> ChangeListener
    where
        F: Fn(&SessionSnapshot) + Send + 'static,
    {
        let mut subscription = self.subscribe();
        let token = self.shutdown.child_token();
        let cancelled = token.clone();

        tokio::spawn(async move {
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    next = subscription.changed() => next,
                };
                let Some(snapshot) = next else { break };
                if cancelled.is_cancelled() {
                    break;
                }
                callback(&snapshot);
            }
        });

        ChangeListener {
            _guard: token.drop_guard(),
        }
    }

    /// Signs in with email and password.
    ///
    /// Input is validated locally first. On success the new session is applied
    /// (and published to subscribers) before this returns. On failure the
    /// current state is left untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        let credentials = Credentials::new(email.trim(), password);
        validate_credentials(&credentials)?;

        let change = self
            .backend
            .sign_in_with_password(&credentials)
            .await
            .map_err(ClientError::from_auth_backend)?;
        self.established(change)
    }

    /// Creates an account and signs in with it.
    pub async fn sign_up(&self, email: &str, password: &str) -> ClientResult<Session> {
        let credentials = Credentials::new(email.trim(), password);
        validate_credentials(&credentials)?;
        validate_password(&credentials.password)?;

        let change = self
            .backend
            .sign_up_with_password(&credentials)
            .await
            .map_err(ClientError::from_auth_backend)?;
        self.established(change)
    }

    fn established(&self, change: AuthChange) -> ClientResult<Session> {
        let session = change
            .session
            .clone()
            .ok_or_else(|| ClientError::Auth("The auth service did not return a session".to_string()))?;
        self.apply_event(&change);
        tracing::info!(user_id = %session.user_id(), "Signed in");
        Ok(session)
    }

    /// Signs out.
    ///
    /// The local session is cleared only after the backend confirms. On
    /// failure the session stays as it was and the error is returned.
    pub async fn sign_out(&self) -> ClientResult<()> {
        let session = self.session().ok_or(ClientError::Unauthenticated)?;
        let change = self
            .backend
            .sign_out(&session)
            .await
            .map_err(ClientError::from_auth_backend)?;
        self.apply_event(&change);
        Ok(())
    }

    pub async fn update_password(&self, new_password: &str) -> ClientResult<()> {
        let session = self.session().ok_or(ClientError::Unauthenticated)?;
        validate_password(new_password)?;

        self.backend
            .update_password(&session, new_password)
            .await
            .map_err(|e| match e {
                BackendError::Unauthorized => ClientError::Unauthenticated,
                other => ClientError::from_auth_backend(other),
            })
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Pull-style view of the session, backed by a `watch` receiver.
pub struct SessionSubscription {
    receiver: watch::Receiver<SessionSnapshot>,
}

impl SessionSubscription {
    pub fn current(&self) -> SessionSnapshot {
        self.receiver.borrow().clone()
    }

    /// Waits for the next snapshot. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<SessionSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Waits until the state is no longer `Loading`.
    pub async fn resolved(&mut self) -> Option<SessionState> {
        self.receiver
            .wait_for(|snapshot| !snapshot.state.is_loading())
            .await
            .ok()
            .map(|snapshot| snapshot.state.clone())
    }
}

/// Registration returned by [`SessionStore::on_change`]. Dropping it unsubscribes.
pub struct ChangeListener {
    _guard: DropGuard,
}

impl ChangeListener {
    pub fn unsubscribe(self) {}
}
