mod common;

use std::sync::Arc;

use auth::JwtError;
use auth::JwtHandler;
use auth::TokenSubject;
use chrono::Duration;
use common::TestApp;
use common::TEST_ISSUER;
use login_service::login::errors::LoginError;
use login_service::login::models::AuthResult;
use login_service::login::models::Credentials;
use login_service::login::ports::LoginServicePort;
use serde_json::json;

#[tokio::test]
async fn test_authenticate_admin_success() {
    let app = TestApp::spawn();

    let result = app
        .service
        .authenticate(Credentials::new("admin", "password123"))
        .await;

    assert!(result.is_success());
    let session = result.session().unwrap();
    assert_eq!(session.user.id, 1);
    assert_eq!(session.user.username, "admin");
    assert_eq!(session.user.email, "admin@example.com");

    let body = serde_json::to_value(&result).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["id"], 1);
    assert!(body["token"].is_string());
    assert!(body.get("error").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_authenticate_second_user() {
    let app = TestApp::spawn();

    let result = app
        .service
        .authenticate(Credentials::new("user", "userpass"))
        .await;

    assert_eq!(result.session().unwrap().user.id, 2);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
    let app = TestApp::spawn();

    let wrong_password = app
        .service
        .authenticate(Credentials::new("admin", "wrong"))
        .await;
    let unknown_user = app.service.authenticate(Credentials::new("ghost", "x")).await;

    assert_eq!(
        wrong_password,
        AuthResult::Rejected(LoginError::InvalidCredentials)
    );
    assert_eq!(wrong_password, unknown_user);

    let expected = json!({"success": false, "error": "Invalid credentials"});
    assert_eq!(serde_json::to_value(&wrong_password).unwrap(), expected);
    assert_eq!(serde_json::to_value(&unknown_user).unwrap(), expected);
}

#[tokio::test]
async fn test_empty_fields_are_validation_errors() {
    let app = TestApp::spawn();

    let cases = [
        ("", "password123"),
        ("", "wrong"),
        ("", ""),
        ("admin", ""),
        ("ghost", ""),
    ];

    for (username, password) in cases {
        let result = app
            .service
            .authenticate(Credentials::new(username, password))
            .await;

        assert_eq!(
            result.error(),
            Some(&LoginError::Validation(
                "Username and password are required".to_string()
            )),
            "username={:?} password_len={}",
            username,
            password.len()
        );
    }
}

#[tokio::test]
async fn test_issued_token_decodes_to_user() {
    let app = TestApp::spawn();

    let result = app
        .service
        .authenticate(Credentials::new("admin", "password123"))
        .await;
    let session = result.session().unwrap();

    let claims = app
        .service
        .validate_token(&session.token)
        .expect("Issued token should validate");

    assert_eq!(claims.user_id, session.user.id);
    assert_eq!(claims.username, session.user.username);
    assert_eq!(claims.email, session.user.email);
    assert_eq!(claims.iss, TEST_ISSUER);
    assert_eq!(claims.iat, app.started_at.timestamp());
    assert_eq!(claims.exp, (app.started_at + Duration::hours(24)).timestamp());
}

#[tokio::test]
async fn test_token_expires_after_24_hours() {
    let app = TestApp::spawn();

    let result = app
        .service
        .authenticate(Credentials::new("user", "userpass"))
        .await;
    let token = result.session().unwrap().token.clone();

    app.clock
        .set(app.started_at + Duration::hours(24) - Duration::seconds(1));
    assert!(app.service.validate_token(&token).is_some());

    app.clock
        .set(app.started_at + Duration::hours(24) + Duration::seconds(1));
    assert!(app.service.validate_token(&token).is_none());
    assert_eq!(
        app.authenticator.validate_token(&token),
        Err(JwtError::TokenExpired)
    );
}

#[tokio::test]
async fn test_tampered_token_never_validates() {
    let app = TestApp::spawn();

    let result = app
        .service
        .authenticate(Credentials::new("admin", "password123"))
        .await;
    let token = result.session().unwrap().token.clone();

    for position in 0..token.len() {
        let mut bytes = token.clone().into_bytes();
        bytes[position] = if bytes[position] == b'x' { b'y' } else { b'x' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(
            app.service.validate_token(&tampered).is_none(),
            "tampered token accepted (byte {})",
            position
        );
    }
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = TestApp::spawn();

    let forger = JwtHandler::new(b"attacker-secret-key-that-is-32-bytes!!", TEST_ISSUER);
    let token = forger
        .issue(
            &TokenSubject {
                user_id: 1,
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
            },
            Duration::hours(1),
        )
        .unwrap();

    assert!(app.service.validate_token(&token).is_none());
}

#[tokio::test]
async fn test_hash_password_then_verify() {
    let app = TestApp::spawn();

    for password in ["correct horse battery staple", "contraseña-пароль-🔐", "z"] {
        let hash = app.service.hash_password(password).await.unwrap();

        assert!(app.authenticator.verify_password(password, &hash).unwrap());
        assert!(!app
            .authenticator
            .verify_password("not the password", &hash)
            .unwrap());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins() {
    let app = Arc::new(TestApp::spawn());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                let credentials = if i % 2 == 0 {
                    Credentials::new("admin", "password123")
                } else {
                    Credentials::new("admin", "wrong")
                };
                (i, app.service.authenticate(credentials).await)
            })
        })
        .collect();

    for handle in handles {
        let (i, result) = handle.await.unwrap();
        assert_eq!(result.is_success(), i % 2 == 0);
    }
}
