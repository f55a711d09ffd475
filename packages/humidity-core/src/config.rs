/// Delay between two link status polls while associating with a candidate.
pub const POLL_INTERVAL_MS: u64 = 500;
/// Status polls per candidate before it counts as timed out (~10s).
pub const MAX_POLLS: usize = 20;
pub const TICK_INTERVAL_MS: u64 = 1_000;
pub const SERVER_RESPONSE_TIMEOUT_MS: u64 = 1_000;
pub const CONNECT_TIMEOUT_MS: u64 = 5_000;
// Tokens are refreshed this long before Firebase would reject them.
pub const TOKEN_REFRESH_MARGIN_MS: u64 = 300_000;

pub const DEFAULT_BASE_PATH: &str = "/dispositivos";
pub const CALIBRATION_SUFFIX: &str = "calibragem";
pub const READING_SUFFIX: &str = "umidade";
pub const LOW_FIELD: &str = "baixo";
pub const HIGH_FIELD: &str = "alto";

// Firebase emulator suite on the LAN; the device has no TLS, so hosted
// Firebase is reached through a plain-HTTP relay at the same paths.
pub const DEFAULT_DATABASE_URL: &str = "http://192.168.1.10:9000/?ns=humidity";
pub const DEFAULT_AUTH_URL: &str = "http://192.168.1.10:9099/identitytoolkit.googleapis.com";
pub const DEFAULT_TOKEN_URL: &str = "http://192.168.1.10:9099/securetoken.googleapis.com";

pub const HTTP_RESPONSE_MAX: usize = 4_096;
