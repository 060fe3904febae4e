mod common;

use common::{Harness, PASSWORD, eventually, identity, session_for};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use toxiscope_application::{ChangeListener, SessionStore};
use toxiscope_core::local_state::PreferenceStore;
use toxiscope_core::session::SessionState;
use toxiscope_core::{BackendError, ClientError};

fn user_of(state: &SessionState) -> Option<String> {
    state.identity().map(|identity| identity.id.to_string())
}

#[tokio::test]
async fn test_starts_loading_until_initialized() {
    let harness = Harness::new();
    assert!(harness.session.is_loading());

    harness.auth.set_persisted(Some(session_for("alice")));
    let state = harness.session.initialize().await;

    assert_eq!(user_of(&state).as_deref(), Some("alice"));
    assert_eq!(harness.preferences.cached_identity(), Some(identity("alice")));
}

#[tokio::test]
async fn test_failed_restore_resolves_anonymous() {
    let harness = Harness::new();
    harness.auth.fail_restore(BackendError::Timeout);

    assert_eq!(harness.session.initialize().await, SessionState::Anonymous);
}

#[tokio::test]
async fn test_stale_change_never_overwrites_newer_one() {
    let harness = Harness::anonymous().await;
    let older = harness.auth.next_change(Some(session_for("alice")));
    let newer = harness.auth.next_change(Some(session_for("bob")));

    assert!(harness.session.apply_event(&newer));
    assert!(!harness.session.apply_event(&older));
    assert!(!harness.session.apply_event(&newer));

    assert_eq!(user_of(&harness.session.state()).as_deref(), Some("bob"));
}

#[tokio::test]
async fn test_subscribers_observe_monotonic_generations() {
    let harness = Harness::anonymous().await;
    let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let _listener = harness.session.on_change({
        let seen = seen.clone();
        move |snapshot| seen.lock().unwrap().push(snapshot.generation)
    });

    let changes: Vec<_> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| harness.auth.next_change(Some(session_for(id))))
        .collect();
    // Out-of-order completion: 2, 0, 4, 1, 3.
    for index in [2, 0, 4, 1, 3] {
        harness.session.apply_event(&changes[index]);
        tokio::task::yield_now().await;
    }

    assert_eq!(user_of(&harness.session.state()).as_deref(), Some("e"));
    let final_generation = harness.session.generation();
    assert!(eventually(|| seen.lock().unwrap().last() == Some(&final_generation)).await);

    let seen = seen.lock().unwrap().clone();
    assert!(seen.windows(2).all(|pair| pair[0] < pair[1]), "{:?}", seen);
}

#[tokio::test]
async fn test_restore_result_is_discarded_when_a_newer_change_lands_first() {
    let harness = Harness::new();
    harness.auth.set_persisted(Some(session_for("alice")));
    let release = harness.auth.hold_restore();

    let store = harness.session.clone();
    let init = tokio::spawn(async move { store.initialize().await });
    assert!(eventually(|| harness.auth.receiver_count() > 0).await);

    // Another tab signs out while the restore is still in flight, but the
    // restore answers with the session it read before that.
    harness.auth.emit(None);
    harness.auth.set_persisted(Some(session_for("alice")));
    assert!(eventually(|| harness.session.state() == SessionState::Anonymous).await);

    release.send(()).unwrap();
    assert_eq!(init.await.unwrap(), SessionState::Anonymous);
    assert_eq!(harness.session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_backend_changes_reach_the_store() {
    let harness = Harness::anonymous().await;

    harness.auth.emit(Some(session_for("alice")));
    assert!(eventually(|| harness.session.identity() == Some(identity("alice"))).await);

    harness.auth.emit(None);
    assert!(eventually(|| harness.session.state() == SessionState::Anonymous).await);
    assert_eq!(harness.preferences.cached_identity(), None);
}

#[tokio::test]
async fn test_sign_in_applies_session_and_notifies() {
    let harness = Harness::anonymous().await;
    let mut subscription = harness.session.subscribe();

    let session = harness.session.sign_in("alice@example.com", PASSWORD).await.unwrap();

    assert_eq!(session.identity, identity("alice"));
    let snapshot = subscription.changed().await.unwrap();
    assert_eq!(user_of(&snapshot.state).as_deref(), Some("alice"));
    assert_eq!(harness.preferences.cached_identity(), Some(identity("alice")));
}

#[tokio::test]
async fn test_rejected_sign_in_leaves_state_untouched() {
    let harness = Harness::anonymous().await;
    let before = harness.session.snapshot();

    let err = harness.session.sign_in("alice@example.com", "wrong-password").await.unwrap_err();

    assert_eq!(err, ClientError::Auth("Invalid login credentials".to_string()));
    assert_eq!(harness.session.snapshot(), before);
}

#[tokio::test]
async fn test_invalid_credentials_are_rejected_locally() {
    let harness = Harness::anonymous().await;
    let calls = harness.auth.calls.load(Ordering::SeqCst);

    assert!(harness.session.sign_in("", PASSWORD).await.unwrap_err().is_validation());
    assert!(harness.session.sign_in("not-an-email", PASSWORD).await.unwrap_err().is_validation());
    assert!(harness.session.sign_up("new@example.com", "12345").await.unwrap_err().is_validation());

    assert_eq!(harness.auth.calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn test_sign_up_reports_backend_rejection() {
    let harness = Harness::anonymous().await;

    let err = harness.session.sign_up("taken@example.com", PASSWORD).await.unwrap_err();
    assert_eq!(err, ClientError::Auth("User already registered".to_string()));

    let session = harness.session.sign_up("carol@example.com", PASSWORD).await.unwrap();
    assert_eq!(session.identity, identity("carol"));
    assert!(harness.session.state().is_authenticated());
}

#[tokio::test]
async fn test_sign_out_waits_for_backend_confirmation() {
    let harness = Harness::signed_in("alice").await;

    harness.auth.fail_sign_out(Some(BackendError::network("connection refused")));
    let err = harness.session.sign_out().await.unwrap_err();
    assert!(matches!(err, ClientError::Failed(_)));
    assert_eq!(harness.session.identity(), Some(identity("alice")));

    harness.auth.fail_sign_out(None);
    harness.session.sign_out().await.unwrap();
    assert_eq!(harness.session.state(), SessionState::Anonymous);
    assert_eq!(harness.preferences.cached_identity(), None);
}

#[tokio::test]
async fn test_sign_out_without_session_is_unauthenticated() {
    let harness = Harness::anonymous().await;
    assert_eq!(harness.session.sign_out().await.unwrap_err(), ClientError::Unauthenticated);
}

#[tokio::test]
async fn test_listener_may_unsubscribe_itself_mid_callback() {
    let harness = Harness::anonymous().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<ChangeListener>>> = Arc::new(Mutex::new(None));

    let listener = harness.session.on_change({
        let calls = calls.clone();
        let slot = slot.clone();
        move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            slot.lock().unwrap().take();
        }
    });
    *slot.lock().unwrap() = Some(listener);

    harness.auth.emit(Some(session_for("alice")));
    assert!(eventually(|| calls.load(Ordering::SeqCst) == 1).await);

    harness.auth.emit(None);
    harness.auth.emit(Some(session_for("bob")));
    assert!(eventually(|| harness.session.identity() == Some(identity("bob"))).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_teardown_stops_listening() {
    let harness = Harness::anonymous().await;
    assert_eq!(harness.auth.receiver_count(), 1);

    harness.session.teardown();
    assert!(eventually(|| harness.auth.receiver_count() == 0).await);

    harness.auth.emit(Some(session_for("alice")));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(harness.session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_dropping_the_store_stops_listening() {
    let harness = Harness::new();
    let store = Arc::new(SessionStore::new(harness.auth.clone()));
    store.initialize().await;
    assert_eq!(harness.auth.receiver_count(), 1);

    drop(store);
    assert!(eventually(|| harness.auth.receiver_count() == 0).await);
}

#[tokio::test]
async fn test_update_password_requires_session_and_length() {
    let harness = Harness::anonymous().await;
    assert_eq!(
        harness.session.update_password("longenough").await.unwrap_err(),
        ClientError::Unauthenticated
    );

    let harness = Harness::signed_in("alice").await;
    assert!(harness.session.update_password("short").await.unwrap_err().is_validation());
    harness.session.update_password("longenough").await.unwrap();
}

#[tokio::test]
async fn test_expire_reports_only_the_first_call() {
    let harness = Harness::signed_in("alice").await;

    assert!(harness.session.expire());
    assert!(!harness.session.expire());
    assert_eq!(harness.session.state(), SessionState::Anonymous);
    assert_eq!(harness.preferences.cached_identity(), None);
}
