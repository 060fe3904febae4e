//! View-local history state.
//!
//! Holds the canonical list from the last applied fetch and the visible
//! sorted/filtered projection of it. Both are only ever changed together.
//!
//! Fetches are ticketed: a fetch that resolves after a newer one was started
//! is dropped. Confirmed deletes are remembered as tombstones and subtracted
//! from every fetch result applied afterwards, so a fetch that started before
//! the delete cannot bring the row back. A tombstone is forgotten once a
//! fetch no longer returns its row.
//!
//! The lists always belong to one identity. When the session changes hands
//! the view is emptied, and a fetch made for the previous identity is dropped.

use super::service::HistoryService;
use crate::session_store::ChangeListener;
use crate::view_scope::ViewScope;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use toxiscope_core::history::{FilterKey, HistoryRow, RecordId, SortKey, apply_sort_and_filter, remove_by_id};
use toxiscope_core::session::UserId;
use toxiscope_core::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    /// Fetched successfully, nothing there.
    Empty,
    /// No session; render a login prompt rather than an error.
    LoginRequired,
    Failed(String),
}

#[derive(Debug)]
struct ViewState {
    /// Identity the lists were fetched for.
    owner: Option<UserId>,
    canonical: Vec<HistoryRow>,
    visible: Vec<HistoryRow>,
    sort: SortKey,
    filter: FilterKey,
    deleted: HashSet<RecordId>,
    fetch_ticket: u64,
    status: LoadStatus,
}

impl ViewState {
    fn new() -> Self {
        Self {
            owner: None,
            canonical: Vec::new(),
            visible: Vec::new(),
            sort: SortKey::default(),
            filter: FilterKey::default(),
            deleted: HashSet::new(),
            fetch_ticket: 0,
            status: LoadStatus::Loading,
        }
    }

    fn reproject(&mut self) {
        self.visible = apply_sort_and_filter(&self.canonical, self.sort, self.filter);
    }

    /// Applies a fetch result and returns the resulting status.
    fn apply_rows(&mut self, rows: Vec<HistoryRow>) -> LoadStatus {
        self.deleted.retain(|id| rows.iter().any(|row| row.id == *id));
        let deleted = &self.deleted;
        self.canonical = rows.into_iter().filter(|row| !deleted.contains(&row.id)).collect();
        self.reproject();
        if self.canonical.is_empty() {
            LoadStatus::Empty
        } else {
            LoadStatus::Ready
        }
    }

    /// Empties the view for a new identity. In-flight fetches are invalidated.
    fn reset_for(&mut self, owner: Option<UserId>) {
        self.status = if owner.is_some() {
            LoadStatus::Loading
        } else {
            LoadStatus::LoginRequired
        };
        self.owner = owner;
        self.canonical.clear();
        self.visible.clear();
        self.deleted.clear();
        self.fetch_ticket += 1;
    }
}

fn lock_state(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct HistoryView {
    service: Arc<HistoryService>,
    scope: ViewScope,
    state: Arc<Mutex<ViewState>>,
    _session_listener: ChangeListener,
}

impl HistoryView {
    /// Creates the view and starts following session changes. Must be called
    /// inside a Tokio runtime.
    pub fn new(service: Arc<HistoryService>, scope: ViewScope) -> Self {
        let state = Arc::new(Mutex::new(ViewState::new()));
        let session_listener = service.session().on_change({
            let state = state.clone();
            let scope = scope.clone();
            move |snapshot| {
                if !scope.is_active() {
                    return;
                }
                let current = snapshot.state.identity().map(|identity| identity.id.clone());
                let mut state = lock_state(&state);
                if state.owner != current && !snapshot.state.is_loading() {
                    tracing::debug!(authenticated = current.is_some(), "Session changed hands, clearing history view");
                    state.reset_for(current);
                }
            }
        });

        Self {
            service,
            scope,
            state,
            _session_listener: session_listener,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        lock_state(&self.state)
    }

    fn current_owner(&self) -> Option<UserId> {
        self.service.session().identity().map(|identity| identity.id)
    }

    /// (Re)loads the history. Also the "Try Again" action.
    pub async fn refresh(&self) -> LoadStatus {
        if self.service.session().is_loading() {
            let mut state = self.lock();
            state.status = LoadStatus::Loading;
            return state.status.clone();
        }

        let fetched_for = self.current_owner();
        let ticket = {
            let mut state = self.lock();
            if state.owner != fetched_for {
                state.reset_for(fetched_for.clone());
            }
            state.fetch_ticket += 1;
            state.status = LoadStatus::Loading;
            state.fetch_ticket
        };

        let Some(result) = self.scope.run(self.service.fetch_history()).await else {
            tracing::debug!(ticket, "History view closed before fetch resolved");
            return LoadStatus::Loading;
        };

        let current = self.current_owner();
        let mut state = self.lock();
        if current != fetched_for {
            tracing::debug!(ticket, "Discarding history fetched for a previous session");
            if state.owner != current {
                state.reset_for(current);
            }
            return state.status.clone();
        }
        if ticket != state.fetch_ticket {
            tracing::debug!(ticket, latest = state.fetch_ticket, "Discarding superseded history fetch");
            return state.status.clone();
        }

        let status = match result {
            Ok(rows) => state.apply_rows(rows),
            Err(ClientError::Unauthenticated) => {
                state.canonical.clear();
                state.visible.clear();
                state.deleted.clear();
                LoadStatus::LoginRequired
            }
            Err(e) => LoadStatus::Failed(e.to_string()),
        };
        state.status = status.clone();
        status
    }

    /// Deletes a row remotely, then removes it from both local lists.
    ///
    /// On failure local state is untouched.
    pub async fn delete(&self, id: RecordId) -> ClientResult<()> {
        let identity = self.service.session().identity().ok_or(ClientError::Unauthenticated)?;
        let owned_elsewhere = self
            .lock()
            .canonical
            .iter()
            .any(|row| row.id == id && row.owner != identity.id);
        if owned_elsewhere {
            return Err(ClientError::validation("This record belongs to another account"));
        }

        self.service.delete_record(id).await?;
        if !self.scope.is_active() {
            return Ok(());
        }

        let mut state = self.lock();
        if state.owner.as_ref() != Some(&identity.id) {
            return Ok(());
        }
        state.deleted.insert(id);
        state.canonical = remove_by_id(&state.canonical, id);
        state.visible = remove_by_id(&state.visible, id);
        if state.canonical.is_empty() && state.status == LoadStatus::Ready {
            state.status = LoadStatus::Empty;
        }
        Ok(())
    }

    pub fn set_sort(&self, sort: SortKey) {
        let mut state = self.lock();
        state.sort = sort;
        state.reproject();
    }

    pub fn set_filter(&self, filter: FilterKey) {
        let mut state = self.lock();
        state.filter = filter;
        state.reproject();
    }

    /// The sorted, filtered rows.
    pub fn rows(&self) -> Vec<HistoryRow> {
        self.lock().visible.clone()
    }

    /// Every fetched row, in fetch order.
    pub fn all_rows(&self) -> Vec<HistoryRow> {
        self.lock().canonical.clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.lock().status.clone()
    }

    pub fn sort(&self) -> SortKey {
        self.lock().sort
    }

    pub fn filter(&self) -> FilterKey {
        self.lock().filter
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}
