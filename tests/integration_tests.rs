use guard_portal::prelude::*;
use guard_portal::screens::ValidationError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_options(server_uri: &str) -> ClientOptions {
    ClientOptions::default()
        .with_base_url(server_uri)
        .with_max_retries(2)
        .with_retry_delay(Duration::from_millis(5))
        .with_search_debounce(Duration::from_millis(10))
}

async fn mount_backend(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/guard/guard-login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "guard-token",
            "email": "guard@example.com"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/entries"))
        .and(query_param("email", "guard@example.com"))
        .and(header("Authorization", "Bearer guard-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "_id": "e1",
                "name": "Asha",
                "societyId": { "_id": "soc1", "name": "Green Park" },
                "flatNumber": "A-101",
                "visitorType": "Swiggy/Zomato",
                "description": "Order",
                "status": "pending"
            }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/societies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "soc1", "name": "Green Park", "flats": ["A-101"] }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_guard_session_flow() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let notices = NoticeQueue::new();
    let options = fast_options(&server.uri()).with_session_path(&session_file);
    let portal = GuardPortal::new_with_notifier(options.clone(), Arc::new(notices.clone())).unwrap();

    // Protected screens bounce to login until a session exists
    assert_eq!(
        portal.resolve_route("/security/entry-permission"),
        Route::Login
    );
    let mut entries = portal.entry_permission_screen();
    assert_eq!(entries.load().await, Effect::Navigate(Route::Login));

    let mut login = portal.login_screen();
    login.credentials = Credentials {
        email: "guard@example.com".to_string(),
        password: "secret".to_string(),
    };
    assert_eq!(
        login.submit().await.unwrap(),
        Effect::Navigate(Route::EntryPermission)
    );
    assert_eq!(
        portal.resolve_route("/security/entry-permission"),
        Route::EntryPermission
    );

    let mut entries = portal.entry_permission_screen();
    assert_eq!(entries.load().await, Effect::Stay);
    assert_eq!(entries.state(), &ScreenState::Ready);
    assert_eq!(entries.society_name(&entries.records()[0]).as_deref(), Some("Green Park"));

    entries.set_search_term("ZOMATO");
    assert_eq!(entries.visible().len(), 1);

    // Residents are missing: the flat is accepted, the email stays empty
    entries.select_society(Some("soc1")).unwrap();
    entries.select_flat("A-101");
    assert_eq!(entries.draft().email, "");
    assert_eq!(
        entries.select_society(Some("unknown")),
        Err(ValidationError::UnknownRecord("unknown".to_string()))
    );

    // A new client over the same session file is still logged in
    let reopened = GuardPortal::new_with_options(options).unwrap();
    assert!(reopened.session().is_authenticated());

    let mut profile = reopened.profile_screen();
    assert_eq!(profile.logout(), Effect::Navigate(Route::Login));
    assert!(!session_file.exists());
}

#[tokio::test]
async fn test_retries_reach_unreachable_notice() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/vehicles"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let notices = NoticeQueue::new();
    let portal =
        GuardPortal::new_with_notifier(fast_options(&server.uri()), Arc::new(notices.clone()))
            .unwrap();
    portal
        .session()
        .set(Session::new("guard-token", "guard@example.com"))
        .unwrap();

    let mut vehicles = portal.vehicle_screen();
    assert_eq!(vehicles.load().await, Effect::Stay);
    assert!(matches!(vehicles.state(), ScreenState::Errored(_)));

    let notices = notices.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(
        notices[0].message,
        "Unable to reach the server. Please check your connection and try again."
    );
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let options = ClientOptions::default().with_base_url("not a url");
    let err = GuardPortal::new_with_options(options).unwrap_err();
    assert!(matches!(err, Error::Resource(_)));
}
