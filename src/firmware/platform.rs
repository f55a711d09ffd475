use embassy_time::{Instant, Timer};
use esp_hal::rng::Rng;
use humidity_core::{clock::Clock, reading::RandomSource};

pub(crate) struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    async fn sleep_ms(&mut self, ms: u64) {
        Timer::after_millis(ms).await;
    }
}

/// Hardware RNG; with the radio running it is a true random source.
pub(crate) struct HardwareRng(Rng);

impl HardwareRng {
    pub(crate) fn new() -> Self {
        Self(Rng::new())
    }
}

impl RandomSource for HardwareRng {
    fn next_u32(&mut self) -> u32 {
        self.0.random()
    }
}
