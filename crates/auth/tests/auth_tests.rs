use guard_portal_auth::{AuthClient, AuthError, Credentials, SignupForm};
use guard_portal_resources::{ResourceClient, ResourceError, RetryPolicy};
use guard_portal_session::{Session, SessionStore};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup_client(server_uri: &str) -> AuthClient {
    let resources = ResourceClient::new(server_uri, reqwest::Client::new())
        .unwrap()
        .with_retry_policy(RetryPolicy::new(1, Duration::from_millis(5)));
    AuthClient::new(resources, SessionStore::in_memory())
}

#[tokio::test]
async fn test_login_stores_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/guard/guard-login"))
        .and(body_json(json!({"email": "guard@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "guard-token",
            "email": "guard@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = setup_client(&server.uri());
    let session = auth
        .login(&Credentials {
            email: "guard@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(session.token, "guard-token");
    assert_eq!(auth.session().get(), Some(session));
}

#[tokio::test]
async fn test_login_failure_keeps_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/guard/guard-login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let auth = setup_client(&server.uri());
    let err = auth
        .login(&Credentials {
            email: "guard@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!auth.session().is_authenticated());
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords_locally() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let auth = setup_client(&server.uri());
    let result = auth
        .register(&SignupForm {
            email: "guard@example.com".to_string(),
            password: "one".to_string(),
            confirm_password: "two".to_string(),
            society_id: "soc1".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AuthError::PasswordMismatch)));
}

#[tokio::test]
async fn test_register_sends_society() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/guard/guard-register"))
        .and(body_json(json!({
            "email": "guard@example.com",
            "password": "pw",
            "society": "soc1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let auth = setup_client(&server.uri());
    let message = auth
        .register(&SignupForm {
            email: "guard@example.com".to_string(),
            password: "pw".to_string(),
            confirm_password: "pw".to_string(),
            society_id: "soc1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(message, "Registration successful! Please log in.");
}

#[tokio::test]
async fn test_reset_password() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/guard/reset-password"))
        .and(body_json(json!({"token": "reset-abc", "newPassword": "fresh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Password updated"})))
        .expect(1)
        .mount(&server)
        .await;

    let auth = setup_client(&server.uri());
    let message = auth.reset_password("reset-abc", "fresh", "fresh").await.unwrap();
    assert_eq!(message, "Password updated");
}

#[tokio::test]
async fn test_forgot_password_default_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/guard/forgot-password"))
        .and(body_json(json!({"email": "guard@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let auth = setup_client(&server.uri());
    let message = auth.forgot_password("guard@example.com").await.unwrap();
    assert_eq!(message, "Password reset link sent to your email.");
}

#[tokio::test]
async fn test_profile_requires_session() {
    let server = MockServer::start().await;
    let auth = setup_client(&server.uri());
    assert!(matches!(auth.profile().await, Err(AuthError::MissingSession)));
}

#[tokio::test]
async fn test_profile_unauthorized_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/guard/guard-profile"))
        .and(header("Authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let auth = setup_client(&server.uri());
    auth.session()
        .set(Session::new("expired", "guard@example.com"))
        .unwrap();

    let result = auth.profile().await;
    assert!(matches!(
        result,
        Err(AuthError::Request(ResourceError::Unauthorized))
    ));
    assert!(!auth.session().is_authenticated());
}

#[tokio::test]
async fn test_profile_with_society() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/guard/guard-profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "guard@example.com",
            "role": "security",
            "society": { "_id": "soc1", "name": "Green Park", "flats": ["A-101"] }
        })))
        .mount(&server)
        .await;

    let auth = setup_client(&server.uri());
    auth.session()
        .set(Session::new("tok", "guard@example.com"))
        .unwrap();

    let profile = auth.profile().await.unwrap();
    assert_eq!(profile.role.as_deref(), Some("security"));
    assert_eq!(profile.society.unwrap().flats, vec!["A-101".to_string()]);
}
