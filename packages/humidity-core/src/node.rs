use core::fmt;

use log::{info, warn};

use crate::{
    calibration::{read_calibration, CalibrationRange},
    catalog::NetworkIdentity,
    clock::Clock,
    config::{DEFAULT_BASE_PATH, TICK_INTERVAL_MS},
    radio::WifiRadio,
    reading::{publish_reading, RandomSource},
    session::{LinkState, NetworkSession},
    store::{establish_session, ensure_fresh_token, DeviceSession, RemoteStore, StoreCredentials, StoreError},
};

#[derive(Clone, Copy, Debug)]
pub struct NodeConfig {
    pub catalog: &'static [NetworkIdentity],
    pub credentials: StoreCredentials,
    pub base_path: &'static str,
    pub tick_interval_ms: u64,
}

impl NodeConfig {
    pub const fn new(catalog: &'static [NetworkIdentity], credentials: StoreCredentials) -> Self {
        Self {
            catalog,
            credentials,
            base_path: DEFAULT_BASE_PATH,
            tick_interval_ms: TICK_INTERVAL_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickError {
    /// No authenticated session; calibration and publishing were skipped.
    NoSession,
    Store(StoreError),
}

impl From<StoreError> for TickError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => f.write_str("no remote session"),
            Self::Store(err) => write!(f, "{}", err),
        }
    }
}

/// Everything one tick touches, owned by the single main task.
pub struct Node<R, S, C, G> {
    radio: R,
    store: S,
    clock: C,
    rng: G,
    config: NodeConfig,
    network: NetworkSession,
    calibration: CalibrationRange,
    session: Option<DeviceSession>,
}

impl<R, S, C, G> Node<R, S, C, G>
where
    R: WifiRadio,
    S: RemoteStore,
    C: Clock,
    G: RandomSource,
{
    pub fn new(radio: R, store: S, clock: C, rng: G, config: NodeConfig) -> Self {
        Self {
            radio,
            store,
            clock,
            rng,
            network: NetworkSession::new(config.catalog),
            config,
            calibration: CalibrationRange::default(),
            session: None,
        }
    }

    pub fn calibration(&self) -> CalibrationRange {
        self.calibration
    }

    pub fn session(&self) -> Option<&DeviceSession> {
        self.session.as_ref()
    }

    pub fn link_state(&self) -> LinkState {
        self.network.state()
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Replaces the device session; true when the handshake succeeded.
    pub async fn establish_session(&mut self) -> bool {
        self.session = establish_session(
            &self.radio,
            &mut self.store,
            &self.clock,
            &self.config.credentials,
        )
        .await
        .ok();
        self.session.is_some()
    }

    /// Link check, session upkeep, calibration read and one published
    /// reading.
    ///
    /// Read and publish failures are logged where they happen and do not
    /// fail the tick; they are retried on the next one.
    pub async fn tick(&mut self) -> Result<(), TickError> {
        let reconnected = self
            .network
            .ensure_connected(&mut self.radio, &mut self.clock)
            .await;

        // A new link invalidates the token; a missing session is retried
        // even when the link held.
        if reconnected || self.session.is_none() {
            self.establish_session().await;
        }

        let Some(session) = self.session.as_mut() else {
            return Err(TickError::NoSession);
        };

        if let Err(err) = ensure_fresh_token(&mut self.store, session, self.clock.now_ms()).await {
            self.session = None;
            return Err(err.into());
        }

        read_calibration(
            &mut self.store,
            session,
            self.config.base_path,
            &mut self.calibration,
        )
        .await;

        // Logged inside; the next tick publishes a fresh reading anyway.
        publish_reading(
            &mut self.store,
            session,
            self.config.base_path,
            &self.calibration,
            &mut self.rng,
        )
        .await
        .ok();

        Ok(())
    }

    /// Runs `count` ticks, each followed by the tick interval. A failed
    /// tick is logged and the next one runs regardless. Returns the number
    /// of failed ticks.
    pub async fn run_ticks(&mut self, count: usize) -> usize {
        let mut failed = 0;
        for _ in 0..count {
            if let Err(err) = self.tick().await {
                warn!("Tick failed: {}", err);
                failed += 1;
            }
            self.clock.sleep_ms(self.config.tick_interval_ms).await;
        }
        failed
    }

    pub async fn run(&mut self) -> ! {
        info!("Node running interval_ms={}", self.config.tick_interval_ms);
        loop {
            self.run_ticks(1).await;
        }
    }
}
