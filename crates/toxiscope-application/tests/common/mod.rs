//! In-memory fakes of the collaborator traits.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Barrier, broadcast, oneshot};
use toxiscope_application::{AnalysisFlow, AuthFailurePolicy, HistoryService, SessionStore};
use toxiscope_core::BackendError;
use toxiscope_core::admin::{AdminBackend, AdminHistoryEntry, AdminUser};
use toxiscope_core::analysis::{AnalysisResult, InferenceBackend, Sentiment};
use toxiscope_core::history::{HistoryQuery, HistoryRecord, NewHistoryRecord, RecordId, RecordStore};
use toxiscope_core::local_state::{PreferenceStore, TokenStore};
use toxiscope_core::route::{Navigator, Route};
use toxiscope_core::session::{
    AuthBackend, AuthChange, Credentials, Identity, Role, Session, SessionTokens, UnauthorizedHandler, UserId,
};

pub const PASSWORD: &str = "secret1";

pub fn identity(id: &str) -> Identity {
    Identity::new(id, format!("{}@example.com", id))
}

pub fn session_for(id: &str) -> Session {
    Session::new(identity(id), SessionTokens::new(format!("token-{}", id)))
}

pub fn admin_session(id: &str) -> Session {
    Session::new(identity(id).with_role(Role::Admin), SessionTokens::new(format!("token-{}", id)))
}

pub fn scores(toxicity: f64, cyberbullying: f64, sentiment: Sentiment) -> AnalysisResult {
    AnalysisResult {
        toxicity_score: toxicity,
        cyberbullying_prob: cyberbullying,
        sarcasm: false,
        sentiment,
    }
}

// ---------------------------------------------------------------------------
// Auth

pub struct FakeAuthBackend {
    persisted: Mutex<Option<Session>>,
    restore_error: Mutex<Option<BackendError>>,
    restore_gate: Mutex<Option<oneshot::Receiver<()>>>,
    sign_out_error: Mutex<Option<BackendError>>,
    sequence: AtomicU64,
    changes: broadcast::Sender<AuthChange>,
    pub calls: AtomicUsize,
}

impl FakeAuthBackend {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            persisted: Mutex::new(None),
            restore_error: Mutex::new(None),
            restore_gate: Mutex::new(None),
            sign_out_error: Mutex::new(None),
            sequence: AtomicU64::new(0),
            changes,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_persisted(&self, session: Option<Session>) {
        *self.persisted.lock().unwrap() = session;
    }

    /// Makes the next `current_session` wait until the returned sender fires.
    pub fn hold_restore(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.restore_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_restore(&self, err: BackendError) {
        *self.restore_error.lock().unwrap() = Some(err);
    }

    pub fn fail_sign_out(&self, err: Option<BackendError>) {
        *self.sign_out_error.lock().unwrap() = err;
    }

    /// Allocates the next change without publishing it.
    pub fn next_change(&self, session: Option<Session>) -> AuthChange {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        AuthChange { sequence, session }
    }

    /// Publishes a change that did not come from this client (another tab, a refresh).
    pub fn emit(&self, session: Option<Session>) -> AuthChange {
        self.set_persisted(session.clone());
        let change = self.next_change(session);
        let _ = self.changes.send(change.clone());
        change
    }

    pub fn receiver_count(&self) -> usize {
        self.changes.receiver_count()
    }

    fn establish(&self, session: Session) -> AuthChange {
        self.emit(Some(session))
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[async_trait]
impl AuthBackend for FakeAuthBackend {
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.restore_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.restore_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.persisted.lock().unwrap().clone())
    }

    fn changes(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthChange, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if credentials.password != PASSWORD {
            return Err(BackendError::status(400, "Invalid login credentials"));
        }
        Ok(self.establish(session_for(local_part(&credentials.email))))
    }

    async fn sign_up_with_password(&self, credentials: &Credentials) -> Result<AuthChange, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if credentials.email.starts_with("taken@") {
            return Err(BackendError::status(422, "User already registered"));
        }
        Ok(self.establish(session_for(local_part(&credentials.email))))
    }

    async fn sign_out(&self, _session: &Session) -> Result<AuthChange, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.sign_out_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.emit(None))
    }

    async fn update_password(&self, _session: &Session, _new_password: &str) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Records

pub struct FakeRecordStore {
    records: Mutex<Vec<HistoryRecord>>,
    next_id: AtomicI64,
    ignore_owner_filter: Mutex<bool>,
    select_gate: Mutex<Option<oneshot::Receiver<()>>>,
    failure: Mutex<Option<BackendError>>,
    rejecting: Mutex<Option<(Arc<dyn UnauthorizedHandler>, Arc<Barrier>)>>,
    pub calls: AtomicUsize,
}

impl FakeRecordStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            ignore_owner_filter: Mutex::new(false),
            select_gate: Mutex::new(None),
            failure: Mutex::new(None),
            rejecting: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Adds a record created `minutes_ago` minutes before a fixed instant.
    pub fn seed(&self, owner: &str, text: &str, result: AnalysisResult, minutes_ago: i64) -> HistoryRecord {
        let base = Utc.with_ymd_and_hms(2025, 12, 2, 12, 0, 0).unwrap();
        let draft = NewHistoryRecord::draft(
            &UserId::new(owner),
            text,
            &result,
            None,
            base - Duration::minutes(minutes_ago),
        );
        self.store(draft)
    }

    fn store(&self, draft: NewHistoryRecord) -> HistoryRecord {
        let record = HistoryRecord {
            id: RecordId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            user_id: draft.user_id,
            input_text: draft.input_text,
            toxicity_score: draft.toxicity_score,
            cyberbullying_prob: draft.cyberbullying_prob,
            result_sarcasm: draft.result_sarcasm,
            sentiment: draft.sentiment,
            source_url: draft.source_url,
            created_at: draft.created_at,
        };
        self.records.lock().unwrap().push(record.clone());
        record
    }

    pub fn all(&self) -> Vec<HistoryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Simulates a misconfigured backend that ignores the owner filter.
    pub fn ignore_owner_filter(&self) {
        *self.ignore_owner_filter.lock().unwrap() = true;
    }

    /// The next select snapshots its rows immediately but only answers once
    /// the returned sender fires.
    pub fn hold_next_select(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.select_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_with(&self, err: Option<BackendError>) {
        *self.failure.lock().unwrap() = err;
    }

    /// Every call answers 401 once `parties` calls are in flight, invoking
    /// `handler` the way the HTTP transport does.
    pub fn reject_with_401(&self, handler: Arc<dyn UnauthorizedHandler>, parties: usize) {
        *self.rejecting.lock().unwrap() = Some((handler, Arc::new(Barrier::new(parties))));
    }

    async fn gate(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rejecting = self.rejecting.lock().unwrap().clone();
        if let Some((handler, barrier)) = rejecting {
            barrier.wait().await;
            handler.on_unauthorized();
            return Err(BackendError::Unauthorized);
        }
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn insert(&self, record: &NewHistoryRecord) -> Result<HistoryRecord, BackendError> {
        self.gate().await?;
        Ok(self.store(record.clone()))
    }

    async fn select(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, BackendError> {
        self.gate().await?;
        let ignore_owner = *self.ignore_owner_filter.lock().unwrap();
        let mut rows: Vec<HistoryRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| ignore_owner || r.user_id == query.owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let gate = self.select_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(rows)
    }

    async fn delete(&self, id: RecordId, owner: &UserId) -> Result<(), BackendError> {
        self.gate().await?;
        let mut records = self.records.lock().unwrap();
        match records.iter().position(|r| r.id == id && &r.user_id == owner) {
            Some(index) => {
                records.remove(index);
                Ok(())
            }
            None => Err(BackendError::NotFound),
        }
    }
}

// ---------------------------------------------------------------------------
// Inference

pub struct FakeInference {
    response: Mutex<Result<AnalysisResult, BackendError>>,
    pub calls: AtomicUsize,
}

impl FakeInference {
    pub fn new() -> Self {
        Self {
            response: Mutex::new(Ok(scores(0.02, 0.01, Sentiment::Positive))),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn respond_with(&self, response: Result<AnalysisResult, BackendError>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceBackend for FakeInference {
    async fn analyze(&self, _text: &str) -> Result<AnalysisResult, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().unwrap().clone()
    }
}

// ---------------------------------------------------------------------------
// Admin

pub struct FakeAdminBackend {
    pub users: Mutex<Vec<AdminUser>>,
    pub calls: AtomicUsize,
}

impl FakeAdminBackend {
    pub fn with_users(ids: &[&str]) -> Self {
        let users = ids
            .iter()
            .map(|id| AdminUser {
                id: UserId::new(*id),
                name: id.to_string(),
                email: format!("{}@example.com", id),
                role: Role::User,
                created_at: None,
            })
            .collect();
        Self {
            users: Mutex::new(users),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AdminBackend for FakeAdminBackend {
    async fn list_users(&self) -> Result<Vec<AdminUser>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().unwrap().clone())
    }

    async fn list_history(&self) -> Result<Vec<AdminHistoryEntry>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|user| &user.id != id);
        if users.len() == before {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Local state and navigation

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<SessionTokens>>,
}

impl TokenStore for MemoryTokenStore {
    fn load_tokens(&self) -> Option<SessionTokens> {
        self.tokens.lock().unwrap().clone()
    }

    fn save_tokens(&self, tokens: &SessionTokens) -> Result<(), String> {
        *self.tokens.lock().unwrap() = Some(tokens.clone());
        Ok(())
    }

    fn clear_tokens(&self) -> Result<(), String> {
        *self.tokens.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    dark_mode: Mutex<bool>,
    identity: Mutex<Option<Identity>>,
}

impl PreferenceStore for MemoryPreferences {
    fn dark_mode(&self) -> bool {
        *self.dark_mode.lock().unwrap()
    }

    fn set_dark_mode(&self, enabled: bool) -> Result<(), String> {
        *self.dark_mode.lock().unwrap() = enabled;
        Ok(())
    }

    fn cached_identity(&self) -> Option<Identity> {
        self.identity.lock().unwrap().clone()
    }

    fn set_cached_identity(&self, identity: Option<&Identity>) -> Result<(), String> {
        *self.identity.lock().unwrap() = identity.cloned();
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

// ---------------------------------------------------------------------------
// Wiring

pub struct Harness {
    pub auth: Arc<FakeAuthBackend>,
    pub records: Arc<FakeRecordStore>,
    pub inference: Arc<FakeInference>,
    pub tokens: Arc<MemoryTokenStore>,
    pub preferences: Arc<MemoryPreferences>,
    pub navigator: Arc<RecordingNavigator>,
    pub session: Arc<SessionStore>,
}

impl Harness {
    pub fn new() -> Self {
        let auth = Arc::new(FakeAuthBackend::new());
        let preferences = Arc::new(MemoryPreferences::default());
        let session = Arc::new(SessionStore::new(auth.clone()).with_preferences(preferences.clone()));
        Self {
            auth,
            records: Arc::new(FakeRecordStore::new()),
            inference: Arc::new(FakeInference::new()),
            tokens: Arc::new(MemoryTokenStore::default()),
            preferences,
            navigator: Arc::new(RecordingNavigator::default()),
            session,
        }
    }

    /// A harness whose session restored as `id`.
    pub async fn signed_in(id: &str) -> Self {
        let harness = Self::new();
        harness.auth.set_persisted(Some(session_for(id)));
        harness.session.initialize().await;
        harness
    }

    pub async fn anonymous() -> Self {
        let harness = Self::new();
        harness.session.initialize().await;
        harness
    }

    pub fn history(&self) -> Arc<HistoryService> {
        Arc::new(HistoryService::new(self.session.clone(), self.records.clone()))
    }

    pub fn flow(&self) -> Arc<AnalysisFlow> {
        Arc::new(AnalysisFlow::new(
            self.inference.clone(),
            self.records.clone(),
            self.session.clone(),
        ))
    }

    pub fn auth_failure_policy(&self) -> Arc<AuthFailurePolicy> {
        Arc::new(AuthFailurePolicy::new(
            &self.session,
            self.tokens.clone(),
            self.navigator.clone(),
        ))
    }
}

/// Polls `condition` until it holds or a second has passed.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    condition()
}
