#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, NaiveDate, Utc};
use onboard::{
    AuthFacade, Error, ProfileUpdate, RegistrationData, SessionStore, StoreConfig,
    VerificationMethod,
    clock::ManualClock,
    countries::find_country,
    delivery::InboxCodeNotifier,
    navigation::{HistoryNavigator, Navigator, Screen},
    storage::{FileStorage, Storage},
};
use std::sync::Arc;

struct Fixture {
    _dir: tempfile::TempDir,
    storage: Arc<FileStorage>,
    inbox: Arc<InboxCodeNotifier>,
    clock: ManualClock,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let storage = Arc::new(FileStorage::new(dir.path().join("data")));
        Self {
            _dir: dir,
            storage,
            inbox: Arc::new(InboxCodeNotifier::new()),
            clock: ManualClock::new(Utc::now()),
        }
    }

    fn facade(&self, screen: Screen) -> (AuthFacade, Arc<HistoryNavigator>) {
        let store = SessionStore::new(
            StoreConfig::new(),
            self.storage.clone(),
            self.inbox.clone(),
            Arc::new(self.clock.clone()),
        );
        let navigator = Arc::new(HistoryNavigator::new(screen));
        (AuthFacade::new(store, navigator.clone()), navigator)
    }
}

fn registration(username: &str, email: &str) -> RegistrationData {
    RegistrationData {
        avatar: None,
        username: username.to_string(),
        email: email.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1988, 11, 3).unwrap(),
        country: find_country("GH").unwrap(),
        phone: "+233 20 000 0000".to_string(),
        website: String::new(),
        verification_method: VerificationMethod::Phone,
    }
}

#[tokio::test]
async fn test_register_verify_edit_logout() {
    let fixture = Fixture::new();
    let (mut facade, navigator) = fixture.facade(Screen::Register);

    let user_id = facade
        .register(registration("kofi", "kofi@example.com"))
        .await
        .unwrap();
    navigator.navigate(Screen::Verify);

    let session_id = facade.send_verification_code(user_id).await.unwrap();
    let notifications = fixture.inbox.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].destination, "+233 20 000 0000");
    assert_eq!(notifications[0].method, VerificationMethod::Phone);

    fixture.clock.advance(Duration::seconds(45));
    let code = fixture.inbox.last_code().unwrap();
    let auth = facade.verify_code(session_id, &code).await.unwrap();
    assert!(auth.user.is_verified);
    assert!(facade.is_authenticated());
    assert_eq!(navigator.current(), Screen::Profile);

    let updated = facade
        .update_profile(
            ProfileUpdate::new()
                .with_website("https://kofi.dev".to_string())
                .with_country(find_country("KE").unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(updated.website, "https://kofi.dev");
    assert_eq!(updated.country.code, "KE");
    assert_eq!(updated.phone, "+233 20 000 0000");

    facade.logout().await;
    assert!(!facade.is_authenticated());
    assert_eq!(navigator.current(), Screen::Root);
    assert_eq!(fixture.storage.get_item("currentUser").unwrap(), None);
}

#[tokio::test]
async fn test_state_survives_restart() {
    let fixture = Fixture::new();
    let (mut facade, _) = fixture.facade(Screen::Register);

    let user_id = facade
        .register(registration("ama", "ama@example.com"))
        .await
        .unwrap();
    let session_id = facade.send_verification_code(user_id).await.unwrap();
    let code = fixture.inbox.last_code().unwrap();
    drop(facade);

    // A second process picks up the pending session.
    let (mut facade, navigator) = fixture.facade(Screen::Verify);
    assert!(!facade.is_authenticated());
    facade.verify_code(session_id, &code).await.unwrap();
    assert_eq!(navigator.current(), Screen::Profile);
    drop(facade);

    // And a third one starts signed in.
    let (facade, navigator) = fixture.facade(Screen::Root);
    let profile = facade.profile().unwrap();
    assert_eq!(profile.id, user_id);
    assert!(profile.is_verified);
    assert_eq!(navigator.current(), Screen::Profile);
}

#[tokio::test]
async fn test_expired_code_needs_a_new_session() {
    let fixture = Fixture::new();
    let (mut facade, _) = fixture.facade(Screen::Verify);

    let user_id = facade
        .register(registration("yaw", "yaw@example.com"))
        .await
        .unwrap();
    let first = facade.send_verification_code(user_id).await.unwrap();
    let first_code = fixture.inbox.last_code().unwrap();

    fixture.clock.advance(Duration::seconds(121));
    let err = facade.verify_code(first, &first_code).await.unwrap_err();
    assert_eq!(err, Error::CodeExpired);
    assert!(err.requires_new_code());

    let second = facade.send_verification_code(user_id).await.unwrap();
    let second_code = fixture.inbox.last_code().unwrap();
    let auth = facade.verify_code(second, &second_code).await.unwrap();
    assert_eq!(auth.user.id, user_id);

    // The old session is still stored but stays unusable.
    assert_eq!(
        facade.verify_code(first, &first_code).await.unwrap_err(),
        Error::CodeExpired
    );
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected_across_restarts() {
    let fixture = Fixture::new();
    let (mut facade, _) = fixture.facade(Screen::Register);
    facade
        .register(registration("esi", "esi@example.com"))
        .await
        .unwrap();
    drop(facade);

    let (mut facade, _) = fixture.facade(Screen::Register);
    let err = facade
        .register(registration("esi", "other@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err, Error::DuplicateUser);
    assert_eq!(err.to_string(), "User with this email or username already exists");
}
