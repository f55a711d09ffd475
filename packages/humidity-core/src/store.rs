use alloc::string::String;
use core::fmt;

use log::{info, warn};
use serde_json::Value;

use crate::{
    clock::Clock,
    config::TOKEN_REFRESH_MARGIN_MS,
    http::TransportError,
    radio::{format_hardware_address, WifiRadio},
};

/// Identity Toolkit error message for an address that already has an account.
pub const EMAIL_EXISTS: &str = "EMAIL_EXISTS";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreCredentials {
    pub email: &'static str,
    pub password: &'static str,
}

impl StoreCredentials {
    pub const fn anonymous() -> Self {
        Self {
            email: "",
            password: "",
        }
    }

    pub const fn is_anonymous(&self) -> bool {
        self.email.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthToken {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at_ms: u64,
}

impl AuthToken {
    pub fn needs_refresh(&self, now_ms: u64) -> bool {
        now_ms.saturating_add(TOKEN_REFRESH_MARGIN_MS) >= self.expires_at_ms
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceSession {
    pub device_id: String,
    pub token: AuthToken,
}

impl DeviceSession {
    /// `<base>/<device_id>/<suffix>`
    pub fn path(&self, base: &str, suffix: &str) -> String {
        let base = base.trim_end_matches('/');
        let mut path = String::with_capacity(base.len() + self.device_id.len() + suffix.len() + 2);
        path.push_str(base);
        path.push('/');
        path.push_str(&self.device_id);
        path.push('/');
        path.push_str(suffix);
        path
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    Transport(TransportError),
    Http { status: u16, reason: String },
    Auth(String),
    Decode,
    TypeMismatch,
}

impl StoreError {
    pub fn reason(&self) -> &str {
        match self {
            Self::Transport(err) => err.as_str(),
            Self::Http { reason, .. } => reason.as_str(),
            Self::Auth(reason) => reason.as_str(),
            Self::Decode => "response decode failed",
            Self::TypeMismatch => "data type mismatch",
        }
    }
}

impl From<TransportError> for StoreError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { status, reason } => write!(f, "http {} {}", status, reason),
            other => f.write_str(other.reason()),
        }
    }
}

/// Remote database plus its token service.
///
/// Paths are database paths such as `/dispositivos/<id>/umidade`; the
/// implementation decides how they map onto requests.
pub trait RemoteStore {
    async fn sign_up(
        &mut self,
        credentials: &StoreCredentials,
        now_ms: u64,
    ) -> Result<AuthToken, StoreError>;

    async fn sign_in(
        &mut self,
        credentials: &StoreCredentials,
        now_ms: u64,
    ) -> Result<AuthToken, StoreError>;

    async fn refresh(&mut self, refresh_token: &str, now_ms: u64) -> Result<AuthToken, StoreError>;

    async fn get_json(&mut self, token: &AuthToken, path: &str) -> Result<Value, StoreError>;

    async fn set_float(&mut self, token: &AuthToken, path: &str, value: f32)
        -> Result<(), StoreError>;
}

/// Signs up, falling back to sign-in when the account already exists.
pub async fn handshake<S: RemoteStore>(
    store: &mut S,
    credentials: &StoreCredentials,
    now_ms: u64,
) -> Result<AuthToken, StoreError> {
    match store.sign_up(credentials, now_ms).await {
        Err(StoreError::Auth(reason))
            if !credentials.is_anonymous() && reason.starts_with(EMAIL_EXISTS) =>
        {
            info!("Account exists, signing in");
            store.sign_in(credentials, now_ms).await
        }
        result => result,
    }
}

/// Derives the device id and authenticates against the store.
pub async fn establish_session<R, S, C>(
    radio: &R,
    store: &mut S,
    clock: &C,
    credentials: &StoreCredentials,
) -> Result<DeviceSession, StoreError>
where
    R: WifiRadio,
    S: RemoteStore,
    C: Clock,
{
    info!("Setting up remote store");
    let device_id = format_hardware_address(radio.hardware_address());

    match handshake(store, credentials, clock.now_ms()).await {
        Ok(token) => {
            info!("Sign up succeeded device_id={}", device_id);
            Ok(DeviceSession { device_id, token })
        }
        Err(err) => {
            warn!("Sign up failed reason={}", err);
            Err(err)
        }
    }
}

/// Refreshes the session token when it is close to expiry.
pub async fn ensure_fresh_token<S: RemoteStore>(
    store: &mut S,
    session: &mut DeviceSession,
    now_ms: u64,
) -> Result<(), StoreError> {
    if !session.token.needs_refresh(now_ms) {
        return Ok(());
    }
    info!("Refreshing auth token");
    let token = store.refresh(&session.token.refresh_token, now_ms).await?;
    session.token = token;
    Ok(())
}
