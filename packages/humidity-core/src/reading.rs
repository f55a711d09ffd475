use log::{info, warn};

use crate::{
    calibration::CalibrationRange,
    config::READING_SUFFIX,
    store::{DeviceSession, RemoteStore, StoreError},
};

/// Source of uniformly distributed 32-bit words.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub value: f32,
}

/// Draws a value uniformly from the calibration range, both ends included.
pub fn generate<G: RandomSource>(range: &CalibrationRange, rng: &mut G) -> Reading {
    let (low, high) = range.ordered();
    let unit = rng.next_u32() as f64 / u32::MAX as f64;
    let value = (low as f64 + unit * (high as f64 - low as f64)) as f32;
    // Rounding back to f32 may land one ulp outside.
    Reading {
        value: value.max(low).min(high),
    }
}

/// Generates a reading and writes it to `<base>/<device>/umidade`.
pub async fn publish_reading<S, G>(
    store: &mut S,
    session: &DeviceSession,
    base_path: &str,
    range: &CalibrationRange,
    rng: &mut G,
) -> Result<Reading, StoreError>
where
    S: RemoteStore,
    G: RandomSource,
{
    info!("Publishing readings");
    let path = session.path(base_path, READING_SUFFIX);
    let reading = generate(range, rng);

    match store.set_float(&session.token, &path, reading.value).await {
        Ok(()) => {
            info!("Path = {}; Reading: {:.2}", path, reading.value);
            Ok(reading)
        }
        Err(err) => {
            warn!("Failed to publish reading. Reason: {}", err);
            Err(err)
        }
    }
}
