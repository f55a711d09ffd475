//! Host-side fakes for the radio, clock, store, transport and RNG.

use alloc::{
    collections::VecDeque,
    string::{String, ToString},
    vec::Vec,
};

use serde_json::{json, Value};

use crate::{
    catalog::NetworkIdentity,
    clock::Clock,
    http::{HttpRequest, HttpResponse, HttpTransport, TransportError},
    radio::{LinkStatus, RadioError, ScanResult, SecurityMode, WifiRadio, HARDWARE_ADDRESS_LEN},
    reading::RandomSource,
    store::{AuthToken, RemoteStore, StoreCredentials, StoreError},
};

pub(crate) fn scan_result(name: &str, rssi: i8) -> ScanResult {
    ScanResult {
        name: name.to_string(),
        signal_strength: rssi,
        security: SecurityMode::Wpa2Psk,
    }
}

pub(crate) fn token(id: &str, expires_at_ms: u64) -> AuthToken {
    AuthToken {
        id_token: id.to_string(),
        refresh_token: "refresh".to_string(),
        expires_at_ms,
    }
}

pub(crate) fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: body.as_bytes().to_vec(),
    }
}

/// How an SSID reacts once `begin` is called for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Behavior {
    /// Reports connected on the n-th status poll.
    ConnectAfter(usize),
    /// Reports connect-failed on the n-th status poll.
    FailAfter(usize),
    Never,
    BeginError,
}

pub(crate) struct FakeRadio {
    pub(crate) scans: VecDeque<Result<Vec<ScanResult>, RadioError>>,
    pub(crate) default_scan: Vec<ScanResult>,
    /// Per SSID; each `begin` consumes one entry, the last one sticks.
    behaviors: Vec<(&'static str, VecDeque<Behavior>)>,
    pub(crate) begun: Vec<&'static str>,
    pub(crate) abandoned: Vec<&'static str>,
    pub(crate) connected: bool,
    pub(crate) start_error: Option<RadioError>,
    pub(crate) starts: usize,
    pub(crate) scan_count: usize,
    pub(crate) status_polls: usize,
    current: Option<(Behavior, usize)>,
    pub(crate) mac: [u8; HARDWARE_ADDRESS_LEN],
}

impl FakeRadio {
    pub(crate) fn new() -> Self {
        Self {
            scans: VecDeque::new(),
            default_scan: Vec::new(),
            behaviors: Vec::new(),
            begun: Vec::new(),
            abandoned: Vec::new(),
            connected: false,
            start_error: None,
            starts: 0,
            scan_count: 0,
            status_polls: 0,
            current: None,
            mac: [0x24, 0x0A, 0xC4, 0x00, 0x11, 0x22],
        }
    }

    pub(crate) fn behave(&mut self, name: &'static str, behavior: Behavior) {
        match self.behaviors.iter_mut().find(|(known, _)| *known == name) {
            Some((_, queue)) => queue.push_back(behavior),
            None => {
                let mut queue = VecDeque::new();
                queue.push_back(behavior);
                self.behaviors.push((name, queue));
            }
        }
    }

    fn next_behavior(&mut self, name: &str) -> Behavior {
        let Some((_, queue)) = self.behaviors.iter_mut().find(|(known, _)| *known == name) else {
            return Behavior::Never;
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or(Behavior::Never)
        } else {
            queue.front().copied().unwrap_or(Behavior::Never)
        }
    }
}

impl WifiRadio for FakeRadio {
    async fn start(&mut self) -> Result<(), RadioError> {
        self.starts += 1;
        match self.start_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn scan(&mut self) -> Result<Vec<ScanResult>, RadioError> {
        self.scan_count += 1;
        self.scans
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_scan.clone()))
    }

    async fn begin(&mut self, identity: &NetworkIdentity) -> Result<(), RadioError> {
        self.begun.push(identity.name);
        self.connected = false;
        let behavior = self.next_behavior(identity.name);
        if behavior == Behavior::BeginError {
            self.current = None;
            return Err(RadioError::Connect);
        }
        self.current = Some((behavior, 0));
        Ok(())
    }

    fn status(&mut self) -> LinkStatus {
        self.status_polls += 1;
        let Some((behavior, polls)) = self.current.as_mut() else {
            return LinkStatus::Idle;
        };
        *polls += 1;
        match *behavior {
            Behavior::ConnectAfter(n) if *polls >= n => {
                self.connected = true;
                LinkStatus::Connected
            }
            Behavior::FailAfter(n) if *polls >= n => LinkStatus::ConnectFailed,
            _ => LinkStatus::InProgress,
        }
    }

    async fn abandon(&mut self) {
        if let Some(name) = self.begun.last().copied() {
            self.abandoned.push(name);
        }
        self.current = None;
        self.connected = false;
    }

    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn hardware_address(&self) -> [u8; HARDWARE_ADDRESS_LEN] {
        self.mac
    }
}

pub(crate) struct FakeClock {
    now: u64,
    pub(crate) sleeps: Vec<u64>,
}

impl FakeClock {
    pub(crate) fn new() -> Self {
        Self {
            now: 0,
            sleeps: Vec::new(),
        }
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    async fn sleep_ms(&mut self, ms: u64) {
        self.sleeps.push(ms);
        self.now += ms;
    }
}

pub(crate) struct FakeStore {
    pub(crate) sign_up_result: Result<AuthToken, StoreError>,
    /// Sign-ups that time out before `sign_up_result` is returned.
    pub(crate) failing_sign_ups: usize,
    pub(crate) sign_in_result: Result<AuthToken, StoreError>,
    pub(crate) refresh_result: Result<AuthToken, StoreError>,
    pub(crate) get_result: Result<Value, StoreError>,
    pub(crate) set_result: Result<(), StoreError>,
    pub(crate) sign_ups: usize,
    pub(crate) sign_ins: usize,
    pub(crate) refreshes: usize,
    pub(crate) reads: Vec<String>,
    pub(crate) writes: Vec<(String, f32)>,
    pub(crate) write_attempts: usize,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self {
            sign_up_result: Ok(token("signed-up", u64::MAX)),
            failing_sign_ups: 0,
            sign_in_result: Ok(token("signed-in", u64::MAX)),
            refresh_result: Ok(token("refreshed", u64::MAX)),
            get_result: Ok(json!({})),
            set_result: Ok(()),
            sign_ups: 0,
            sign_ins: 0,
            refreshes: 0,
            reads: Vec::new(),
            writes: Vec::new(),
            write_attempts: 0,
        }
    }
}

impl RemoteStore for FakeStore {
    async fn sign_up(
        &mut self,
        _credentials: &StoreCredentials,
        _now_ms: u64,
    ) -> Result<AuthToken, StoreError> {
        self.sign_ups += 1;
        if self.failing_sign_ups > 0 {
            self.failing_sign_ups -= 1;
            return Err(StoreError::Transport(TransportError::Timeout));
        }
        self.sign_up_result.clone()
    }

    async fn sign_in(
        &mut self,
        _credentials: &StoreCredentials,
        _now_ms: u64,
    ) -> Result<AuthToken, StoreError> {
        self.sign_ins += 1;
        self.sign_in_result.clone()
    }

    async fn refresh(&mut self, _refresh_token: &str, _now_ms: u64) -> Result<AuthToken, StoreError> {
        self.refreshes += 1;
        self.refresh_result.clone()
    }

    async fn get_json(&mut self, _token: &AuthToken, path: &str) -> Result<Value, StoreError> {
        self.reads.push(path.to_string());
        self.get_result.clone()
    }

    async fn set_float(
        &mut self,
        _token: &AuthToken,
        path: &str,
        value: f32,
    ) -> Result<(), StoreError> {
        self.write_attempts += 1;
        self.set_result.clone()?;
        self.writes.push((path.to_string(), value));
        Ok(())
    }
}

pub(crate) struct FakeTransport {
    responses: VecDeque<Result<HttpResponse, TransportError>>,
    pub(crate) requests: Vec<HttpRequest>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            requests: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, response: HttpResponse) {
        self.responses.push_back(Ok(response));
    }

    pub(crate) fn fail(&mut self, err: TransportError) {
        self.responses.push_back(Err(err));
    }
}

impl HttpTransport for FakeTransport {
    async fn request(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.push(request.clone());
        self.responses
            .pop_front()
            .unwrap_or(Err(TransportError::Connect))
    }
}

/// Replays a fixed list of words, cycling when exhausted.
pub(crate) struct SeqRng {
    words: Vec<u32>,
    next: usize,
}

impl SeqRng {
    pub(crate) fn new(words: &[u32]) -> Self {
        Self {
            words: words.to_vec(),
            next: 0,
        }
    }
}

impl RandomSource for SeqRng {
    fn next_u32(&mut self) -> u32 {
        let word = self.words[self.next % self.words.len()];
        self.next += 1;
        word
    }
}

pub(crate) struct XorShift(u32);

impl XorShift {
    pub(crate) fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }
}

impl RandomSource for XorShift {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}
