use log::{info, warn};
use serde_json::Value;

use crate::{
    config::{CALIBRATION_SUFFIX, HIGH_FIELD, LOW_FIELD},
    store::{DeviceSession, RemoteStore},
};

/// Bounds for generated readings.
///
/// Nothing enforces `low <= high`; a partial update can leave the range
/// inverted, which [`CalibrationRange::ordered`] accounts for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationRange {
    pub low: f32,
    pub high: f32,
}

impl Default for CalibrationRange {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 1.0,
        }
    }
}

/// Which bounds a payload overwrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationUpdate {
    pub low: bool,
    pub high: bool,
}

impl CalibrationRange {
    pub fn is_inverted(&self) -> bool {
        self.low > self.high
    }

    /// `(min, max)` of the two bounds.
    pub fn ordered(&self) -> (f32, f32) {
        if self.is_inverted() {
            (self.high, self.low)
        } else {
            (self.low, self.high)
        }
    }

    /// Overwrites each bound independently when its field is present and
    /// numeric; absent fields keep the previous value.
    pub fn apply(&mut self, payload: &Value) -> CalibrationUpdate {
        let mut update = CalibrationUpdate::default();

        match field_as_f32(payload, LOW_FIELD) {
            Some(low) => {
                self.low = low;
                update.low = true;
            }
            None => warn!("Failed to read calibration low"),
        }

        match field_as_f32(payload, HIGH_FIELD) {
            Some(high) => {
                self.high = high;
                update.high = true;
            }
            None => warn!("Failed to read calibration high"),
        }

        update
    }
}

/// Numbers and numeric strings are accepted; non-finite values are not.
fn field_as_f32(payload: &Value, key: &str) -> Option<f32> {
    let value = match payload.get(key)? {
        Value::Number(number) => number.as_f64()? as f32,
        Value::String(text) => text.trim().parse::<f32>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Reads `<base>/<device>/calibragem` into `range`.
///
/// On failure the range is left untouched and `None` is returned.
pub async fn read_calibration<S: RemoteStore>(
    store: &mut S,
    session: &DeviceSession,
    base_path: &str,
    range: &mut CalibrationRange,
) -> Option<CalibrationUpdate> {
    info!("Reading calibration");
    let path = session.path(base_path, CALIBRATION_SUFFIX);

    let payload = match store.get_json(&session.token, &path).await {
        Ok(payload) => payload,
        Err(err) => {
            warn!(
                "Failed to read calibration. Reason: {}. Path = {}",
                err, path
            );
            return None;
        }
    };
    info!("Path = {}; Payload = {}", path, payload);

    let update = range.apply(&payload);
    info!("Calibration: {:.2} - {:.2}", range.low, range.high);
    if range.is_inverted() {
        warn!("Calibration range is inverted; readings use the swapped bounds");
    }
    Some(update)
}
