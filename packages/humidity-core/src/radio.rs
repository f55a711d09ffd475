use alloc::{string::String, vec::Vec};
use core::fmt::Write as _;

use crate::catalog::NetworkIdentity;

pub const HARDWARE_ADDRESS_LEN: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityMode {
    Open,
    Wep,
    WpaPsk,
    Wpa2Psk,
    WpaWpa2Psk,
    Wpa2Enterprise,
    Wpa3Psk,
    Wpa2Wpa3Psk,
    WapiPsk,
    Unknown,
}

impl SecurityMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Wep => "WEP",
            Self::WpaPsk => "WPA PSK",
            Self::Wpa2Psk => "WPA2 PSK",
            Self::WpaWpa2Psk => "WPA/WPA2 PSK",
            Self::Wpa2Enterprise => "WPA2 Enterprise",
            Self::Wpa3Psk => "WPA3 PSK",
            Self::Wpa2Wpa3Psk => "WPA2/WPA3 PSK",
            Self::WapiPsk => "WAPI PSK",
            Self::Unknown => "Err",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanResult {
    pub name: String,
    /// RSSI in dBm; more negative is weaker.
    pub signal_strength: i8,
    pub security: SecurityMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStatus {
    Idle,
    InProgress,
    Connected,
    ConnectFailed,
}

impl LinkStatus {
    /// Connected and ConnectFailed end a candidate's polling early.
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Connected | Self::ConnectFailed)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InProgress => "in_progress",
            Self::Connected => "connected",
            Self::ConnectFailed => "connect_failed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadioError {
    NotStarted,
    Scan,
    Config,
    Connect,
    Other,
}

impl RadioError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Scan => "scan",
            Self::Config => "config",
            Self::Connect => "connect",
            Self::Other => "other",
        }
    }
}

/// Station-mode WiFi as seen by the reconnection logic.
///
/// `begin` only starts association; progress is observed by polling
/// `status`.
pub trait WifiRadio {
    async fn start(&mut self) -> Result<(), RadioError>;

    async fn scan(&mut self) -> Result<Vec<ScanResult>, RadioError>;

    async fn begin(&mut self, identity: &NetworkIdentity) -> Result<(), RadioError>;

    fn status(&mut self) -> LinkStatus;

    /// Tears down an attempt that did not connect. Once this returns, no
    /// event from that attempt may affect the next `begin`.
    async fn abandon(&mut self);

    fn is_connected(&mut self) -> bool;

    fn hardware_address(&self) -> [u8; HARDWARE_ADDRESS_LEN];
}

/// Formats a MAC as `AA:BB:CC:DD:EE:FF`.
pub fn format_hardware_address(mac: [u8; HARDWARE_ADDRESS_LEN]) -> String {
    let mut out = String::with_capacity(HARDWARE_ADDRESS_LEN * 3);
    for (idx, byte) in mac.iter().enumerate() {
        if idx > 0 {
            out.push(':');
        }
        let _ = write!(out, "{:02X}", byte);
    }
    out
}
