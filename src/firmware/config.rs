use humidity_core::{
    catalog::NetworkIdentity,
    config::{
        DEFAULT_AUTH_URL, DEFAULT_BASE_PATH, DEFAULT_DATABASE_URL, DEFAULT_TOKEN_URL,
        TICK_INTERVAL_MS,
    },
    node::NodeConfig,
    store::StoreCredentials,
};

// esp-radio needs roughly 72 KiB of internal heap on the ESP32.
pub(crate) const HEAP_SIZE: usize = 72 * 1024;
pub(crate) const SCAN_MAX_APS: usize = 32;
pub(crate) const WIFI_START_SETTLE_MS: u64 = 800;

/// Known networks, in no particular order; scans decide the ranking.
pub(crate) static NETWORKS: [NetworkIdentity; 2] = [
    NetworkIdentity::new("Hermes-IoT", "HermesIOT"),
    NetworkIdentity::new("WiFi-IoT-123", "TUDOMINUSCULO"),
];

pub(crate) fn api_key() -> &'static str {
    option_env!("HUMIDITY_API_KEY")
        .or(option_env!("FIREBASE_API_KEY"))
        .unwrap_or("")
}

pub(crate) fn database_url() -> &'static str {
    option_env!("HUMIDITY_DB_URL")
        .or(option_env!("FIREBASE_DB_URL"))
        .unwrap_or(DEFAULT_DATABASE_URL)
}

pub(crate) fn auth_url() -> &'static str {
    option_env!("HUMIDITY_AUTH_URL").unwrap_or(DEFAULT_AUTH_URL)
}

pub(crate) fn token_url() -> &'static str {
    option_env!("HUMIDITY_TOKEN_URL").unwrap_or(DEFAULT_TOKEN_URL)
}

pub(crate) fn node_config() -> NodeConfig {
    NodeConfig {
        catalog: &NETWORKS,
        credentials: StoreCredentials {
            email: option_env!("HUMIDITY_EMAIL").unwrap_or(""),
            password: option_env!("HUMIDITY_PASSWORD").unwrap_or(""),
        },
        base_path: option_env!("HUMIDITY_BASE_PATH").unwrap_or(DEFAULT_BASE_PATH),
        tick_interval_ms: TICK_INTERVAL_MS,
    }
}
