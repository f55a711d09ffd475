use alloc::string::String;

use embassy_futures::block_on;

use super::*;
use crate::{
    config::{DEFAULT_AUTH_URL, DEFAULT_DATABASE_URL, DEFAULT_TOKEN_URL},
    testing::{response, token, FakeTransport},
};

fn store(transport: FakeTransport) -> FirebaseStore<FakeTransport> {
    let config = FirebaseConfig::from_urls(
        "api-key",
        "http://db.local:9000/?ns=demo",
        "http://auth.local",
        "http://token.local",
    )
    .unwrap();
    FirebaseStore::new(transport, config)
}

#[test]
fn sign_up_posts_credentials_and_computes_expiry() {
    let mut transport = FakeTransport::new();
    transport.push(response(
        200,
        r#"{"idToken":"id-1","refreshToken":"r-1","expiresIn":"3600","localId":"u"}"#,
    ));
    let mut store = store(transport);
    let credentials = StoreCredentials {
        email: "node@example.com",
        password: "pw",
    };

    let token = block_on(store.sign_up(&credentials, 10_000)).unwrap();

    assert_eq!(token.id_token, "id-1");
    assert_eq!(token.refresh_token, "r-1");
    assert_eq!(token.expires_at_ms, 10_000 + 3_600_000);
    let request = &store.transport().requests[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.host, "auth.local");
    assert_eq!(request.target, "/v1/accounts:signUp?key=api-key");
    assert_eq!(
        request.body.as_deref(),
        Some(r#"{"email":"node@example.com","password":"pw","returnSecureToken":true}"#)
    );
}

#[test]
fn anonymous_sign_up_sends_only_token_flag() {
    let mut transport = FakeTransport::new();
    transport.push(response(200, r#"{"idToken":"anon"}"#));
    let mut store = store(transport);

    let token = block_on(store.sign_up(&StoreCredentials::anonymous(), 0)).unwrap();

    assert_eq!(token.expires_at_ms, 3_600_000);
    assert_eq!(
        store.transport().requests[0].body.as_deref(),
        Some(r#"{"returnSecureToken":true}"#)
    );
}

#[test]
fn identity_errors_surface_their_message() {
    let mut transport = FakeTransport::new();
    transport.push(response(
        400,
        r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#,
    ));
    let mut store = store(transport);

    let err = block_on(store.sign_up(&StoreCredentials::anonymous(), 0)).unwrap_err();
    assert_eq!(err, StoreError::Auth(String::from("EMAIL_EXISTS")));
}

#[test]
fn refresh_uses_secure_token_shape() {
    let mut transport = FakeTransport::new();
    transport.push(response(
        200,
        r#"{"id_token":"id-2","refresh_token":"r-2","expires_in":"1800","token_type":"Bearer"}"#,
    ));
    let mut store = store(transport);

    let token = block_on(store.refresh("r-1", 5_000)).unwrap();

    assert_eq!(token.id_token, "id-2");
    assert_eq!(token.expires_at_ms, 5_000 + 1_800_000);
    let request = &store.transport().requests[0];
    assert_eq!(request.host, "token.local");
    assert_eq!(request.target, "/v1/token?key=api-key");
    assert_eq!(
        request.body.as_deref(),
        Some(r#"{"grant_type":"refresh_token","refresh_token":"r-1"}"#)
    );
}

#[test]
fn get_json_reads_object_with_auth_query() {
    let mut transport = FakeTransport::new();
    transport.push(response(200, r#"{"baixo":0.2,"alto":0.8}"#));
    let mut store = store(transport);

    let value = block_on(store.get_json(&token("tok", 0), "/dispositivos/AA/calibragem")).unwrap();

    assert_eq!(value["alto"], 0.8);
    let request = &store.transport().requests[0];
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.port, 9000);
    assert_eq!(
        request.target,
        "/dispositivos/AA/calibragem.json?ns=demo&auth=tok"
    );
}

#[test]
fn get_json_rejects_null_node() {
    let mut transport = FakeTransport::new();
    transport.push(response(200, "null"));
    let mut store = store(transport);

    let err = block_on(store.get_json(&token("tok", 0), "/missing")).unwrap_err();
    assert_eq!(err, StoreError::TypeMismatch);
}

#[test]
fn database_errors_carry_status_and_reason() {
    let mut transport = FakeTransport::new();
    transport.push(response(401, r#"{"error":"Permission denied"}"#));
    let mut store = store(transport);

    let err = block_on(store.set_float(&token("tok", 0), "/x", 0.5)).unwrap_err();
    assert_eq!(
        err,
        StoreError::Http {
            status: 401,
            reason: String::from("Permission denied"),
        }
    );
    assert_eq!(err.reason(), "Permission denied");
}

#[test]
fn set_float_puts_json_number() {
    let mut transport = FakeTransport::new();
    transport.push(response(200, "0.53"));
    let mut store = store(transport);

    block_on(store.set_float(&token("tok", 0), "/dispositivos/AA/umidade", 0.53)).unwrap();

    let request = &store.transport().requests[0];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.body.as_deref(), Some("0.53"));
    assert_eq!(request.target, "/dispositivos/AA/umidade.json?ns=demo&auth=tok");
}

#[test]
fn transport_failures_pass_through() {
    let mut transport = FakeTransport::new();
    transport.fail(TransportError::Timeout);
    let mut store = store(transport);

    let err = block_on(store.set_float(&token("tok", 0), "/x", 0.5)).unwrap_err();
    assert_eq!(err, StoreError::Transport(TransportError::Timeout));
}

#[test]
fn default_endpoints_are_plain_http() {
    let config = FirebaseConfig::from_urls(
        "api-key",
        DEFAULT_DATABASE_URL,
        DEFAULT_AUTH_URL,
        DEFAULT_TOKEN_URL,
    )
    .unwrap();

    assert_eq!(config.mismatched_scheme(Scheme::Http), None);
    assert_eq!(config.auth.prefix, "/identitytoolkit.googleapis.com");
    assert_eq!(config.token.port, 9099);
}

#[test]
fn https_endpoint_is_named_as_mismatched() {
    let config = FirebaseConfig::from_urls(
        "api-key",
        "http://db.local:9000/?ns=demo",
        "http://auth.local",
        "https://securetoken.googleapis.com",
    )
    .unwrap();

    assert_eq!(config.mismatched_scheme(Scheme::Http), Some("token"));
    assert_eq!(config.mismatched_scheme(Scheme::Https), Some("database"));
}
