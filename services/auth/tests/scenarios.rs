//! End-to-end scenarios for the auth service over the in-memory store

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use auth::{
    AuthService,
    config::AuthConfig,
    error::AuthError,
    models::{LoginRequest, RegisterRequest},
};
use identity::{MemoryUserStore, UserStore};

fn service_with(token_duration: Duration) -> (AuthService, Arc<MemoryUserStore>) {
    let store = Arc::new(MemoryUserStore::new());
    let config = AuthConfig {
        jwt_secret: "scenario-secret".to_string(),
        token_duration,
        hash_cost: 1,
    };
    let service = AuthService::new(store.clone(), &config).expect("service should construct");
    (service, store)
}

fn service() -> (AuthService, Arc<MemoryUserStore>) {
    service_with(Duration::from_secs(3600))
}

fn alice() -> RegisterRequest {
    RegisterRequest {
        email: "a@x.com".to_string(),
        username: "alice".to_string(),
        password: "secret1".to_string(),
        first_name: "A".to_string(),
        last_name: "A".to_string(),
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[test]
fn register_then_login_resolves_same_user() {
    let (service, _) = service();

    let registered = service.register(&alice()).unwrap();
    assert!(!registered.user.id.is_empty());
    assert_eq!(registered.user.email, "a@x.com");
    let json = serde_json::to_value(&registered.user).unwrap();
    assert!(json.get("password_hash").is_none());
    assert!(json.get("password").is_none());

    let logged_in = service.login(&login("a@x.com", "secret1")).unwrap();
    let resolved = service.validate_token(&logged_in.token).unwrap();
    assert_eq!(resolved.id, registered.user.id);
}

#[test]
fn register_same_email_twice_fails() {
    let (service, _) = service();
    service.register(&alice()).unwrap();

    let mut again = alice();
    again.username = "alice2".to_string();
    assert_eq!(service.register(&again).unwrap_err(), AuthError::AlreadyExists);
}

#[test]
fn login_with_wrong_password_fails() {
    let (service, _) = service();
    service.register(&alice()).unwrap();

    assert_eq!(
        service.login(&login("a@x.com", "wrong")).unwrap_err(),
        AuthError::InvalidCredentials
    );
}

#[test]
fn deactivated_user_token_is_invalid() {
    let (service, _) = service();
    let registered = service.register(&alice()).unwrap();
    let token = service.login(&login("a@x.com", "secret1")).unwrap().token;

    service.set_active(&registered.user.id, false).unwrap();

    assert_eq!(
        service.validate_token(&token).unwrap_err(),
        AuthError::InvalidToken
    );
}

#[test]
fn short_lived_token_expires() {
    let (service, _) = service_with(Duration::from_secs(1));
    let registered = service.register(&alice()).unwrap();

    thread::sleep(Duration::from_secs(2));

    assert_eq!(
        service.validate_token(&registered.token).unwrap_err(),
        AuthError::TokenExpired
    );
}

#[test]
fn concurrent_registrations_with_distinct_identities_all_succeed() {
    let (service, store) = service();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            thread::spawn(move || {
                service.register(&RegisterRequest {
                    email: format!("user{i}@x.com"),
                    username: format!("user{i}"),
                    ..alice()
                })
            })
        })
        .collect();

    let responses: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    assert_eq!(store.len(), 8);
    for response in responses {
        let by_id = store.get_by_id(&response.user.id).unwrap();
        let by_email = store.get_by_email(&response.user.email).unwrap();
        let by_username = store.get_by_username(&response.user.username).unwrap();
        assert_eq!(by_id, by_email);
        assert_eq!(by_id, by_username);
        assert_eq!(
            service.validate_token(&response.token).unwrap(),
            response.user
        );
    }
}
