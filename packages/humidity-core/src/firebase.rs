//! Firebase Realtime Database and Identity Toolkit over REST.

use alloc::{
    format,
    string::{String, ToString},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    http::{Endpoint, HttpResponse, HttpTransport, Method, Scheme, TransportError},
    store::{AuthToken, RemoteStore, StoreCredentials, StoreError},
};

const SIGN_UP_PATH: &str = "/v1/accounts:signUp";
const SIGN_IN_PATH: &str = "/v1/accounts:signInWithPassword";
const REFRESH_PATH: &str = "/v1/token";
const DEFAULT_TOKEN_LIFETIME_S: u64 = 3_600;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: &'static str,
    pub database: Endpoint,
    pub auth: Endpoint,
    pub token: Endpoint,
}

impl FirebaseConfig {
    pub fn from_urls(
        api_key: &'static str,
        database_url: &str,
        auth_url: &str,
        token_url: &str,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            api_key,
            database: Endpoint::parse(database_url)?,
            auth: Endpoint::parse(auth_url)?,
            token: Endpoint::parse(token_url)?,
        })
    }

    /// Name of the first endpoint whose scheme is not `scheme`.
    pub fn mismatched_scheme(&self, scheme: Scheme) -> Option<&'static str> {
        [
            ("database", &self.database),
            ("auth", &self.auth),
            ("token", &self.token),
        ]
        .into_iter()
        .find(|(_, endpoint)| endpoint.scheme != scheme)
        .map(|(name, _)| name)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountRequest<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    email: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

pub struct FirebaseStore<T> {
    transport: T,
    config: FirebaseConfig,
}

impl<T: HttpTransport> FirebaseStore<T> {
    pub fn new(transport: T, config: FirebaseConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn account_call(
        &mut self,
        path: &str,
        credentials: &StoreCredentials,
        now_ms: u64,
    ) -> Result<AuthToken, StoreError> {
        let body = serde_json::to_string(&AccountRequest {
            email: credentials.email,
            password: credentials.password,
            return_secure_token: true,
        })
        .map_err(|_| StoreError::Decode)?;
        let request = self.config.auth.request(
            Method::Post,
            path,
            &[("key", self.config.api_key)],
            Some(body),
        );
        let response = self.transport.request(&request).await?;
        let body = auth_body(response)?;
        let parsed: AccountResponse =
            serde_json::from_slice(&body).map_err(|_| StoreError::Decode)?;
        Ok(AuthToken {
            id_token: parsed.id_token,
            refresh_token: parsed.refresh_token,
            expires_at_ms: expiry(now_ms, parsed.expires_in.as_deref()),
        })
    }
}

impl<T: HttpTransport> RemoteStore for FirebaseStore<T> {
    async fn sign_up(
        &mut self,
        credentials: &StoreCredentials,
        now_ms: u64,
    ) -> Result<AuthToken, StoreError> {
        self.account_call(SIGN_UP_PATH, credentials, now_ms).await
    }

    async fn sign_in(
        &mut self,
        credentials: &StoreCredentials,
        now_ms: u64,
    ) -> Result<AuthToken, StoreError> {
        self.account_call(SIGN_IN_PATH, credentials, now_ms).await
    }

    async fn refresh(&mut self, refresh_token: &str, now_ms: u64) -> Result<AuthToken, StoreError> {
        let body = serde_json::to_string(&RefreshRequest {
            grant_type: "refresh_token",
            refresh_token,
        })
        .map_err(|_| StoreError::Decode)?;
        let request = self.config.token.request(
            Method::Post,
            REFRESH_PATH,
            &[("key", self.config.api_key)],
            Some(body),
        );
        let response = self.transport.request(&request).await?;
        let body = auth_body(response)?;
        let parsed: RefreshResponse =
            serde_json::from_slice(&body).map_err(|_| StoreError::Decode)?;
        Ok(AuthToken {
            id_token: parsed.id_token,
            refresh_token: parsed.refresh_token,
            expires_at_ms: expiry(now_ms, parsed.expires_in.as_deref()),
        })
    }

    async fn get_json(&mut self, token: &AuthToken, path: &str) -> Result<Value, StoreError> {
        let request = self.config.database.request(
            Method::Get,
            &format!("{}.json", path),
            &[("auth", token.id_token.as_str())],
            None,
        );
        let response = self.transport.request(&request).await?;
        let body = database_body(response)?;
        let value: Value = serde_json::from_slice(&body).map_err(|_| StoreError::Decode)?;
        // A missing node comes back as `null`.
        if value.is_object() {
            Ok(value)
        } else {
            Err(StoreError::TypeMismatch)
        }
    }

    async fn set_float(
        &mut self,
        token: &AuthToken,
        path: &str,
        value: f32,
    ) -> Result<(), StoreError> {
        let body = serde_json::to_string(&value).map_err(|_| StoreError::Decode)?;
        let request = self.config.database.request(
            Method::Put,
            &format!("{}.json", path),
            &[("auth", token.id_token.as_str())],
            Some(body),
        );
        let response = self.transport.request(&request).await?;
        database_body(response).map(|_| ())
    }
}

fn expiry(now_ms: u64, expires_in: Option<&str>) -> u64 {
    let seconds = expires_in
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_S);
    now_ms.saturating_add(seconds.saturating_mul(1_000))
}

/// Identity Toolkit reports `{"error":{"message":"EMAIL_EXISTS",...}}`.
fn auth_body(response: HttpResponse) -> Result<alloc::vec::Vec<u8>, StoreError> {
    if response.is_success() {
        return Ok(response.body);
    }
    let reason = error_reason(&response.body).unwrap_or_else(|| format!("http {}", response.status));
    Err(StoreError::Auth(reason))
}

/// The database reports `{"error":"Permission denied"}`.
fn database_body(response: HttpResponse) -> Result<alloc::vec::Vec<u8>, StoreError> {
    if response.is_success() {
        return Ok(response.body);
    }
    let reason = error_reason(&response.body).unwrap_or_default();
    Err(StoreError::Http {
        status: response.status,
        reason,
    })
}

fn error_reason(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let error = value.get("error")?;
    match error {
        Value::String(message) => Some(message.clone()),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
