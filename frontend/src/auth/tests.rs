use super::*;
use crate::api::testing::MockApi;
use crate::clock::testing::ManualClock;
use crate::session::MemoryStore;
use rocket_assess_shared::UserProfile;
use rocket_assess_shared::protocol::{StudentLoginRequest, TeacherLoginRequest};
use std::cell::RefCell;

struct Fixture {
    cookies: MemoryStore,
    local: MemoryStore,
    api: MockApi,
    services: AuthServices,
}

impl Fixture {
    fn new() -> Self {
        let cookies = MemoryStore::new();
        let local = MemoryStore::new();
        let api = MockApi::new();
        let services = AuthServices::new(
            &AppConfig::default(),
            StorageBackends {
                cookies: Rc::new(cookies.clone()),
                local: Rc::new(local.clone()),
                tab: Rc::new(MemoryStore::new()),
            },
            Rc::new(api.clone()),
            Rc::new(ManualClock::new(1_700_000_000_000)),
        );
        Self {
            cookies,
            local,
            api,
            services,
        }
    }

    fn record_events(&self) -> (Rc<RefCell<Vec<AuthEvent>>>, events::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sub = {
            let seen = seen.clone();
            self.services
                .events()
                .subscribe(move |e| seen.borrow_mut().push(*e))
        };
        (seen, sub)
    }
}

fn teacher_credentials() -> LoginCredentials {
    LoginCredentials::Teacher(TeacherLoginRequest {
        email: "tom@school.com".into(),
        password: "secret1".into(),
    })
}

fn teacher_profile() -> UserProfile {
    UserProfile {
        teacher_id: Some("T-001".into()),
        teacher_pk: Some("17".into()),
        ..UserProfile::new("Tom", "tom@school.com")
    }
}

#[tokio::test]
async fn login_stores_session_and_publishes() {
    let fx = Fixture::new();
    fx.api.state.borrow_mut().login_result = Ok(teacher_profile());
    let (seen, _sub) = fx.record_events();

    let role = fx.services.login(&teacher_credentials()).await.unwrap();

    assert_eq!(role, UserRole::Teacher);
    assert!(fx.services.session().is_logged_in());
    assert_eq!(
        fx.services.local_status(),
        AuthStatus::SignedIn {
            role: UserRole::Teacher,
            name: "Tom".into()
        }
    );
    assert_eq!(*seen.borrow(), vec![AuthEvent::LoggedIn(UserRole::Teacher)]);
}

#[tokio::test]
async fn login_failure_leaves_state_untouched() {
    let fx = Fixture::new();
    fx.api.state.borrow_mut().login_result = Err(ApiError::Server("Invalid credentials".into()));
    let (seen, _sub) = fx.record_events();

    let err = fx.services.login(&teacher_credentials()).await.unwrap_err();

    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!fx.services.session().is_logged_in());
    assert_eq!(fx.services.local_status(), AuthStatus::SignedOut);
    assert!(seen.borrow().is_empty());
}

#[tokio::test]
async fn incomplete_profile_is_a_session_error() {
    let fx = Fixture::new();
    fx.api.state.borrow_mut().login_result = Ok(UserProfile::new("", "ann@school.com"));

    let credentials = LoginCredentials::Student(StudentLoginRequest {
        email: "ann@school.com".into(),
        password: "secret1".into(),
    });
    let err = fx.services.login(&credentials).await.unwrap_err();

    assert!(matches!(err, ApiError::Session(_)));
    assert!(!fx.services.session().is_logged_in());
}

#[tokio::test]
async fn logout_notifies_server_and_clears_everything() {
    let fx = Fixture::new();
    fx.api.state.borrow_mut().login_result = Ok(teacher_profile());
    fx.services.login(&teacher_credentials()).await.unwrap();
    let (seen, _sub) = fx.record_events();

    fx.services.logout().await;

    let requests = fx.api.state.borrow().logout_requests.clone();
    assert_eq!(
        requests,
        vec![LogoutRequest {
            email: "tom@school.com".into(),
            user_type: UserRole::Teacher,
            teacher_pk: Some("17".into()),
        }]
    );
    assert!(fx.cookies.is_empty());
    assert!(fx.local.is_empty());
    assert_eq!(fx.services.local_status(), AuthStatus::SignedOut);
    assert_eq!(*seen.borrow(), vec![AuthEvent::LoggedOut]);
}

#[tokio::test]
async fn logout_clears_locally_when_server_fails() {
    let fx = Fixture::new();
    fx.api.state.borrow_mut().login_result = Ok(teacher_profile());
    fx.services.login(&teacher_credentials()).await.unwrap();
    fx.api.state.borrow_mut().logout_error = Some(ApiError::Network("offline".into()));

    fx.services.logout().await;

    assert!(!fx.services.session().is_logged_in());
    assert!(fx.cookies.is_empty());
}

#[tokio::test]
async fn logout_without_session_skips_server() {
    let fx = Fixture::new();
    let (seen, _sub) = fx.record_events();

    fx.services.logout().await;

    assert!(fx.api.state.borrow().logout_requests.is_empty());
    assert_eq!(*seen.borrow(), vec![AuthEvent::LoggedOut]);
}

#[tokio::test]
async fn each_verifier_has_its_own_flag() {
    let fx = Fixture::new();
    fx.api.state.borrow_mut().login_result = Ok(teacher_profile());
    fx.services.login(&teacher_credentials()).await.unwrap();

    let header = fx.services.verifier();
    let route_guard = fx.services.route_guard();

    let (outcome, state) = futures::join!(header.check(None), route_guard.evaluate(None, "/profile"));

    assert_eq!(outcome, verifier::VerifyOutcome::Authenticated(UserRole::Teacher));
    assert_eq!(state, Some(guard::GuardState::Authenticated(UserRole::Teacher)));
}

#[test]
fn status_role() {
    assert_eq!(AuthStatus::Unknown.role(), None);
    assert_eq!(AuthStatus::SignedOut.role(), None);
    assert_eq!(
        AuthStatus::SignedIn {
            role: UserRole::Student,
            name: "Ann".into()
        }
        .role(),
        Some(UserRole::Student)
    );
}
