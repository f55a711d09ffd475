use alloc::{string::String, vec::Vec};
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_net::Stack;
use embassy_time::{with_timeout, Duration, Timer};
use esp_println::println;
use esp_radio::wifi::{
    event::{self, EventExt},
    AccessPointInfo, AuthMethod, ClientConfig, Config as WifiRuntimeConfig, ModeConfig,
    ScanConfig, ScanMethod, WifiController,
};
use humidity_core::{
    catalog::NetworkIdentity,
    radio::{LinkStatus, RadioError, ScanResult, SecurityMode, WifiRadio, HARDWARE_ADDRESS_LEN},
};

use super::super::config::{SCAN_MAX_APS, WIFI_START_SETTLE_MS};

const WIFI_RX_QUEUE_SIZE: usize = 3;
const WIFI_TX_QUEUE_SIZE: usize = 2;
const WIFI_STATIC_RX_BUF_NUM: u8 = 4;
const WIFI_DYNAMIC_RX_BUF_NUM: u16 = 8;
const WIFI_DYNAMIC_TX_BUF_NUM: u16 = 8;
const WIFI_RX_BA_WIN: u8 = 3;
// disconnect_async never resolves if the driver was already idle.
const WIFI_DISCONNECT_SETTLE_MS: u64 = 1_000;
const WIFI_EVENT_DRAIN_MS: u64 = 50;
const WIFI_LOG_EVENTS: bool = cfg!(feature = "radio-event-log");

static EVENT_HANDLERS_INSTALLED: AtomicBool = AtomicBool::new(false);
// Set by the disconnect handler; cleared when a new association begins.
static DISCONNECT_SEEN: AtomicBool = AtomicBool::new(false);
static LAST_DISCONNECT_REASON: AtomicU8 = AtomicU8::new(0);

pub(super) fn wifi_runtime_config() -> WifiRuntimeConfig {
    WifiRuntimeConfig::default()
        .with_rx_queue_size(WIFI_RX_QUEUE_SIZE)
        .with_tx_queue_size(WIFI_TX_QUEUE_SIZE)
        .with_static_rx_buf_num(WIFI_STATIC_RX_BUF_NUM)
        .with_dynamic_rx_buf_num(WIFI_DYNAMIC_RX_BUF_NUM)
        .with_dynamic_tx_buf_num(WIFI_DYNAMIC_TX_BUF_NUM)
        .with_ampdu_rx_enable(false)
        .with_ampdu_tx_enable(false)
        .with_rx_ba_win(WIFI_RX_BA_WIN)
}

/// Station-mode radio backed by esp-radio.
///
/// `status` reports `Connected` only once DHCP has handed out an address,
/// so the node never tries the store before the stack can route.
pub(crate) struct EspRadio {
    controller: WifiController<'static>,
    stack: Stack<'static>,
    mac: [u8; HARDWARE_ADDRESS_LEN],
    attempting: bool,
}

impl EspRadio {
    pub(super) fn new(
        controller: WifiController<'static>,
        stack: Stack<'static>,
        mac: [u8; HARDWARE_ADDRESS_LEN],
    ) -> Self {
        install_event_handlers();
        Self {
            controller,
            stack,
            mac,
            attempting: false,
        }
    }

    fn associated(&self) -> bool {
        matches!(self.controller.is_connected(), Ok(true))
    }

    /// Disconnects and waits for the driver to report it, then clears the
    /// disconnect flag so only events of the next attempt are seen.
    async fn teardown(&mut self) {
        let _ = with_timeout(
            Duration::from_millis(WIFI_DISCONNECT_SETTLE_MS),
            self.controller.disconnect_async(),
        )
        .await;
        Timer::after(Duration::from_millis(WIFI_EVENT_DRAIN_MS)).await;
        DISCONNECT_SEEN.store(false, Ordering::Relaxed);
        self.attempting = false;
    }
}

impl WifiRadio for EspRadio {
    async fn start(&mut self) -> Result<(), RadioError> {
        match self.controller.is_started() {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.controller
                    .set_config(&ModeConfig::Client(ClientConfig::default()))
                    .map_err(|err| {
                        println!("wifi: station config err={:?}", err);
                        RadioError::Config
                    })?;
                self.controller.start_async().await.map_err(|err| {
                    println!("wifi: start err={:?}", err);
                    RadioError::NotStarted
                })?;
                Timer::after(Duration::from_millis(WIFI_START_SETTLE_MS)).await;
                Ok(())
            }
            Err(err) => {
                println!("wifi: status err={:?}", err);
                Err(RadioError::NotStarted)
            }
        }
    }

    async fn scan(&mut self) -> Result<Vec<ScanResult>, RadioError> {
        let config = ScanConfig::default()
            .with_show_hidden(false)
            .with_max(SCAN_MAX_APS);
        let found = self
            .controller
            .scan_with_config_async(config)
            .await
            .map_err(|err| {
                println!("wifi: scan err={:?}", err);
                RadioError::Scan
            })?;
        Ok(found.iter().map(scan_result).collect())
    }

    async fn begin(&mut self, identity: &NetworkIdentity) -> Result<(), RadioError> {
        if self.attempting || self.associated() {
            self.teardown().await;
        } else {
            // A link that dropped earlier may have left the flag set.
            DISCONNECT_SEEN.store(false, Ordering::Relaxed);
        }

        let auth_method = if identity.secret.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::Wpa2Personal
        };
        let client = ClientConfig::default()
            .with_ssid(identity.name.into())
            .with_password(identity.secret.into())
            .with_auth_method(auth_method)
            .with_scan_method(ScanMethod::AllChannels);
        self.controller
            .set_config(&ModeConfig::Client(client))
            .map_err(|err| {
                println!("wifi: client config err={:?} ssid={}", err, identity.name);
                RadioError::Config
            })?;

        self.controller.connect().map_err(|err| {
            println!("wifi: connect err={:?} ssid={}", err, identity.name);
            RadioError::Connect
        })?;
        self.attempting = true;
        Ok(())
    }

    fn status(&mut self) -> LinkStatus {
        if self.associated() {
            return if self.stack.config_v4().is_some() {
                self.attempting = false;
                LinkStatus::Connected
            } else {
                LinkStatus::InProgress
            };
        }
        if !self.attempting {
            return LinkStatus::Idle;
        }
        if DISCONNECT_SEEN.load(Ordering::Relaxed) {
            let reason = LAST_DISCONNECT_REASON.load(Ordering::Relaxed);
            log::debug!(
                "wifi: attempt ended reason={} ({})",
                reason,
                disconnect_reason_label(reason)
            );
            self.attempting = false;
            return LinkStatus::ConnectFailed;
        }
        LinkStatus::InProgress
    }

    async fn abandon(&mut self) {
        self.teardown().await;
    }

    fn is_connected(&mut self) -> bool {
        self.associated() && self.stack.is_link_up() && self.stack.config_v4().is_some()
    }

    fn hardware_address(&self) -> [u8; HARDWARE_ADDRESS_LEN] {
        self.mac
    }
}

fn scan_result(ap: &AccessPointInfo) -> ScanResult {
    ScanResult {
        name: String::from(ap.ssid.as_str()),
        signal_strength: ap.signal_strength,
        security: ap.auth_method.map_or(SecurityMode::Unknown, security_mode),
    }
}

fn security_mode(method: AuthMethod) -> SecurityMode {
    match method {
        AuthMethod::None => SecurityMode::Open,
        AuthMethod::Wep => SecurityMode::Wep,
        AuthMethod::Wpa => SecurityMode::WpaPsk,
        AuthMethod::Wpa2Personal => SecurityMode::Wpa2Psk,
        AuthMethod::WpaWpa2Personal => SecurityMode::WpaWpa2Psk,
        AuthMethod::Wpa2Enterprise => SecurityMode::Wpa2Enterprise,
        AuthMethod::Wpa3Personal => SecurityMode::Wpa3Psk,
        AuthMethod::Wpa2Wpa3Personal => SecurityMode::Wpa2Wpa3Psk,
        AuthMethod::WapiPersonal => SecurityMode::WapiPsk,
        #[allow(unreachable_patterns)]
        _ => SecurityMode::Unknown,
    }
}

fn install_event_handlers() {
    if EVENT_HANDLERS_INSTALLED.swap(true, Ordering::Relaxed) {
        return;
    }

    event::StaDisconnected::update_handler(|event| {
        let reason = event.reason();
        LAST_DISCONNECT_REASON.store(reason, Ordering::Relaxed);
        DISCONNECT_SEEN.store(true, Ordering::Relaxed);
        if WIFI_LOG_EVENTS {
            println!(
                "wifi: event sta_disconnected reason={} ({}) rssi={}",
                reason,
                disconnect_reason_label(reason),
                event.rssi()
            );
        }
    });

    if !WIFI_LOG_EVENTS {
        return;
    }

    event::StaStart::update_handler(|_| {
        println!("wifi: event sta_start");
    });

    event::StaStop::update_handler(|_| {
        println!("wifi: event sta_stop");
    });

    event::ScanDone::update_handler(|event| {
        println!(
            "wifi: event scan_done status={} count={} scan_id={}",
            event.status(),
            event.number(),
            event.id()
        );
    });

    event::StaConnected::update_handler(|event| {
        let ssid_len = (event.ssid_len() as usize).min(event.ssid().len());
        let ssid = core::str::from_utf8(&event.ssid()[..ssid_len]).unwrap_or("<non_utf8>");
        println!(
            "wifi: event sta_connected ssid={} channel={} authmode={}",
            ssid,
            event.channel(),
            event.authmode()
        );
    });
}

fn disconnect_reason_label(reason: u8) -> &'static str {
    match reason {
        2 => "auth_expire",
        8 => "assoc_leave",
        15 => "4way_handshake_timeout",
        200 => "beacon_timeout",
        201 => "no_ap_found",
        202 => "auth_fail",
        203 => "assoc_fail",
        204 => "handshake_timeout",
        205 => "connection_fail",
        210 => "no_ap_found_compatible_security",
        211 => "no_ap_found_authmode_threshold",
        212 => "no_ap_found_rssi_threshold",
        _ => "other",
    }
}
