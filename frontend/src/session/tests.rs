use super::*;
use crate::clock::testing::ManualClock;
use rocket_assess_shared::{cookie_keys, local_keys, session_keys};

const NOW: i64 = 1_700_000_000_000;

// =========================================================
// Shared Fixtures
// =========================================================

/// Stores of one browser profile: cookies and local storage are shared
/// between tabs, each tab has its own session storage.
struct Browser {
    cookies: MemoryStore,
    local: MemoryStore,
}

struct Tab {
    store: MemoryStore,
    clock: Rc<ManualClock>,
    manager: SessionManager,
}

impl Browser {
    fn new() -> Self {
        Self {
            cookies: MemoryStore::new(),
            local: MemoryStore::new(),
        }
    }

    fn open_tab(&self) -> Tab {
        let store = MemoryStore::new();
        let clock = Rc::new(ManualClock::new(NOW));
        let manager = SessionManager::new(
            StorageBackends {
                cookies: Rc::new(self.cookies.clone()),
                local: Rc::new(self.local.clone()),
                tab: Rc::new(store.clone()),
            },
            clock.clone(),
        );
        Tab {
            store,
            clock,
            manager,
        }
    }
}

fn teacher() -> UserProfile {
    UserProfile {
        name: "Tom".into(),
        email: "tom@school.com".into(),
        teacher_id: Some("T-001".into()),
        teacher_pk: Some("17".into()),
        ..Default::default()
    }
}

fn organization() -> UserProfile {
    UserProfile {
        name: "Acme".into(),
        email: "admin@acme.com".into(),
        org_code: Some("ACME1".into()),
        ..Default::default()
    }
}

fn profile_for(role: UserRole) -> UserProfile {
    match role {
        UserRole::Organization => organization(),
        UserRole::Teacher => teacher(),
        UserRole::Student => UserProfile::new("Ann", "a@x.com"),
    }
}

// =========================================================
// Tests
// =========================================================

#[test]
fn test_initialize_is_idempotent() {
    let browser = Browser::new();
    let tab = browser.open_tab();

    let id = tab.manager.session_id().expect("session id created on construction");
    assert!(id.starts_with("session_"));

    tab.manager.initialize_session();
    assert_eq!(tab.manager.session_id(), Some(id));
}

#[test]
fn test_login_then_logged_in_for_every_role() {
    for role in UserRole::ALL {
        let browser = Browser::new();
        let tab = browser.open_tab();

        assert!(!tab.manager.is_logged_in());
        assert!(tab.manager.set_logged_in(role, &profile_for(role)));
        assert!(tab.manager.is_logged_in(), "{} should be logged in", role);
        assert_eq!(tab.manager.user_type(), Some(role));
    }
}

#[test]
fn test_student_auth_data_round_trip() {
    let browser = Browser::new();
    let tab = browser.open_tab();

    assert!(
        tab.manager
            .set_logged_in(UserRole::Student, &UserProfile::new("Ann", "a@x.com"))
    );

    assert_eq!(
        tab.manager.auth_data(),
        Some(AuthData {
            email: "a@x.com".into(),
            user_type: UserRole::Student,
        })
    );
    assert_eq!(tab.manager.display_name().as_deref(), Some("Ann"));
}

#[test]
fn test_identity_written_in_wire_layout() {
    let browser = Browser::new();
    let tab = browser.open_tab();

    assert!(tab.manager.set_logged_in(UserRole::Teacher, &teacher()));

    assert_eq!(
        browser.cookies.get(cookie_keys::TEACHER_NAME).unwrap().as_deref(),
        Some("Tom")
    );
    assert_eq!(
        browser.cookies.get(cookie_keys::USER_EMAIL).unwrap().as_deref(),
        Some("tom@school.com")
    );
    assert_eq!(
        browser.cookies.get(cookie_keys::TEACHER_ID).unwrap().as_deref(),
        Some("T-001")
    );
    assert_eq!(
        browser.local.get(local_keys::TEACHER_PK).unwrap().as_deref(),
        Some("17")
    );
    assert_eq!(
        tab.store.get(session_keys::USER_TYPE).unwrap().as_deref(),
        Some("teacher")
    );
    assert_eq!(
        tab.store.get(session_keys::TIMESTAMP).unwrap(),
        Some(NOW.to_string())
    );
    assert_eq!(tab.manager.teacher_pk().as_deref(), Some("17"));
}

#[test]
fn test_incomplete_profile_is_rejected() {
    let browser = Browser::new();
    let tab = browser.open_tab();

    assert!(
        !tab.manager
            .set_logged_in(UserRole::Student, &UserProfile::new("Ann", ""))
    );
    assert!(!tab.manager.is_logged_in());
    assert!(browser.local.is_empty());
}

#[test]
fn test_expiry_boundaries() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Student, &profile_for(UserRole::Student)));

    for minutes in [1u64, 30, 480, 1440] {
        let timeout = Duration::from_secs(minutes * 60);

        tab.clock.set(NOW);
        tab.clock.advance(Duration::from_secs((minutes + 1) * 60));
        assert!(tab.manager.is_session_expired_after(timeout));

        tab.clock.set(NOW);
        tab.clock.advance(Duration::from_secs((minutes - 1) * 60));
        assert!(!tab.manager.is_session_expired_after(timeout));
    }
}

#[test]
fn test_default_timeout_is_eight_hours() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Teacher, &teacher()));

    tab.clock.advance(Duration::from_secs(479 * 60));
    assert!(!tab.manager.is_session_expired());
    tab.clock.advance(Duration::from_secs(2 * 60));
    assert!(tab.manager.is_session_expired());
}

#[test]
fn test_missing_or_garbled_timestamp_is_expired() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.is_session_expired());

    tab.store.set(session_keys::TIMESTAMP, "yesterday").unwrap();
    assert!(tab.manager.is_session_expired());
}

#[test]
fn test_extreme_timestamp_is_expired() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Student, &profile_for(UserRole::Student)));

    tab.store
        .set(session_keys::TIMESTAMP, &i64::MIN.to_string())
        .unwrap();
    assert!(tab.manager.is_session_expired());
}

#[test]
fn test_refresh_slides_expiry() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Teacher, &teacher()));

    tab.clock.advance(Duration::from_secs(400 * 60));
    tab.manager.refresh_session();
    tab.clock.advance(Duration::from_secs(400 * 60));
    assert!(!tab.manager.is_session_expired());
}

#[test]
fn test_refresh_ignored_when_logged_out() {
    let browser = Browser::new();
    let tab = browser.open_tab();

    tab.manager.refresh_session();
    assert!(!tab.store.contains(session_keys::TIMESTAMP));
}

#[test]
fn test_clear_session_twice_is_noop() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Teacher, &teacher()));

    tab.manager.clear_session();
    assert!(!tab.manager.is_logged_in());
    assert!(tab.store.is_empty());

    tab.manager.clear_session();
    assert!(!tab.manager.is_logged_in());
    assert!(tab.store.is_empty());

    // shared identity untouched
    assert!(browser.cookies.contains(cookie_keys::TEACHER_NAME));
}

#[test]
fn test_clear_all_removes_shared_keys() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Teacher, &teacher()));
    browser.cookies.set(cookie_keys::TOKEN, "abc").unwrap();

    tab.manager.clear_all_auth_data();

    assert!(!tab.manager.is_logged_in());
    assert!(browser.cookies.is_empty());
    assert!(browser.local.is_empty());
    for key in session_keys::ALL {
        assert!(!tab.store.contains(key));
    }
}

#[test]
fn test_new_tab_requires_its_own_login() {
    let browser = Browser::new();
    let first = browser.open_tab();
    assert!(first.manager.set_logged_in(UserRole::Student, &profile_for(UserRole::Student)));

    let second = browser.open_tab();
    assert!(second.manager.session_id().is_some());
    assert!(!second.manager.is_logged_in());
    assert_eq!(second.manager.user_type(), None);

    assert!(second.manager.set_logged_in(UserRole::Student, &profile_for(UserRole::Student)));
    assert!(second.manager.is_logged_in());
    assert!(first.manager.is_logged_in());
}

#[test]
fn test_stale_identity_of_other_role_does_not_authenticate() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Student, &profile_for(UserRole::Student)));

    // leftover teacher cookie from an older session, student keys gone
    browser.cookies.set(cookie_keys::TEACHER_NAME, "Old Tom").unwrap();
    browser.local.remove(local_keys::STUDENT_NAME).unwrap();

    assert!(!tab.manager.is_logged_in());
    assert_eq!(tab.manager.auth_data(), None);
}

#[test]
fn test_login_replaces_previous_role_identity() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Teacher, &teacher()));
    assert!(tab.manager.set_logged_in(UserRole::Student, &profile_for(UserRole::Student)));

    assert!(!browser.cookies.contains(cookie_keys::TEACHER_NAME));
    assert!(!browser.local.contains(local_keys::TEACHER_NAME));
    assert_eq!(tab.manager.user_type(), Some(UserRole::Student));
}

#[test]
fn test_unknown_role_string_is_not_logged_in() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Teacher, &teacher()));

    tab.store.set(session_keys::USER_TYPE, "admin").unwrap();
    assert!(!tab.manager.is_logged_in());
    assert_eq!(tab.manager.user_type(), None);
}

#[test]
fn test_teacher_without_email_has_no_auth_data() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Teacher, &teacher()));

    browser.cookies.remove(cookie_keys::USER_EMAIL).unwrap();
    assert!(tab.manager.is_logged_in());
    assert_eq!(tab.manager.auth_data(), None);
}

#[test]
fn test_storage_failure_fails_closed() {
    let browser = Browser::new();
    let tab = browser.open_tab();
    assert!(tab.manager.set_logged_in(UserRole::Teacher, &teacher()));

    browser.cookies.set_failing(true);
    assert!(!tab.manager.is_logged_in());
    assert_eq!(tab.manager.user_type(), None);
    assert_eq!(tab.manager.auth_data(), None);
    assert!(!tab.manager.set_logged_in(UserRole::Teacher, &teacher()));
    // must not panic
    tab.manager.clear_all_auth_data();

    tab.store.set_failing(true);
    assert!(tab.manager.is_session_expired());
    assert_eq!(tab.manager.session_id(), None);
}
