//! Battery sampling
//!
//! Batteries report their state in one of two conventions. Most drivers
//! expose `energy_now` in µWh directly. Others only expose `charge_now` (µAh)
//! and `voltage_now` (µV); for those the energy is derived as
//! `charge_now * voltage_now / 1e6`, which lands on the same µWh scale.

use crate::power_supply::DeviceHandle;
use crate::sysfs::{read_float, read_uint};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Sentinel for an unknown capacity percentage
pub const CAPACITY_UNKNOWN: f32 = -1.0;

/// Source of the wall-clock time recorded with each sample
pub trait Clock {
    /// Current unix time in seconds, `None` if the clock cannot be read
    fn now(&self) -> Option<i64>;
}

/// The system real-time clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Option<i64> {
        let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        i64::try_from(since_epoch.as_secs()).ok()
    }
}

/// How a battery reported its energy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryUnit {
    /// Neither convention could be read
    Invalid,
    /// `energy_now` in µWh
    Energy,
    /// `charge_now` (µAh) times `voltage_now` (µV)
    Charge,
}

impl std::fmt::Display for BatteryUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatteryUnit::Invalid => write!(f, "invalid"),
            BatteryUnit::Energy => write!(f, "energy"),
            BatteryUnit::Charge => write!(f, "charge"),
        }
    }
}

/// Point-in-time reading of one battery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySample {
    /// Device name, e.g. `BAT0`
    pub name: String,
    /// Energy now in µWh (read or derived)
    pub energy_now: u64,
    /// Convention the energy came from
    pub unit: BatteryUnit,
    /// Charge level 0-100, or [`CAPACITY_UNKNOWN`]
    pub capacity_percent: f32,
    /// Unix time of the reading in seconds
    pub timestamp: i64,
    /// Whether `energy_now` and `timestamp` are usable
    pub valid: bool,
}

impl BatterySample {
    /// A sample for a battery that could not be read
    pub fn invalid(name: &str, capacity_percent: f32) -> Self {
        Self {
            name: name.to_string(),
            energy_now: 0,
            unit: BatteryUnit::Invalid,
            capacity_percent,
            timestamp: 0,
            valid: false,
        }
    }

    /// Check whether a capacity percentage was reported
    pub fn has_capacity(&self) -> bool {
        self.capacity_percent > CAPACITY_UNKNOWN
    }

    /// Get energy now in watt-hours
    pub fn energy_wh(&self) -> f64 {
        self.energy_now as f64 / 1_000_000.0
    }
}

/// Convert a µAh charge at a µV voltage into µWh, truncating.
pub fn charge_to_energy(charge_now: u64, voltage_now: u64) -> u64 {
    let energy = u128::from(charge_now) * u128::from(voltage_now) / 1_000_000;
    u64::try_from(energy).unwrap_or(u64::MAX)
}

/// Sample a battery using the system clock
pub fn sample(handle: &DeviceHandle) -> BatterySample {
    sample_with(handle, &SystemClock)
}

/// Sample a battery, taking the timestamp from `clock`.
///
/// Never fails: an unreadable battery yields a sample with `valid == false`.
/// A missing `capacity` only sets the capacity to [`CAPACITY_UNKNOWN`].
pub fn sample_with(handle: &DeviceHandle, clock: &dyn Clock) -> BatterySample {
    let reading = read_energy(handle);
    let now = clock.now();

    let capacity_percent = match read_float(&handle.path, "capacity") {
        Ok(capacity) => capacity,
        Err(e) => {
            warn!("{}: capacity unavailable ({})", handle.name, e);
            CAPACITY_UNKNOWN
        }
    };

    let (energy_now, unit, timestamp) = match (reading, now) {
        (Some((energy_now, unit)), Some(timestamp)) => (energy_now, unit, timestamp),
        (None, _) => {
            debug!("{}: no readable energy or charge", handle.name);
            return BatterySample::invalid(&handle.name, capacity_percent);
        }
        (_, None) => {
            debug!("{}: clock unavailable", handle.name);
            return BatterySample::invalid(&handle.name, capacity_percent);
        }
    };

    let sample = BatterySample {
        name: handle.name.clone(),
        energy_now,
        unit,
        capacity_percent,
        timestamp,
        valid: true,
    };

    debug!(
        "{}: energy_now {} µWh ({:.2} Wh, {}), capacity {:.2}, at {}",
        sample.name,
        sample.energy_now,
        sample.energy_wh(),
        sample.unit,
        sample.capacity_percent,
        sample.timestamp
    );

    sample
}

fn read_energy(handle: &DeviceHandle) -> Option<(u64, BatteryUnit)> {
    match read_uint(&handle.path, "energy_now") {
        Ok(energy_now) => Some((energy_now, BatteryUnit::Energy)),
        Err(e) => {
            debug!("{}: {}, trying charge_now", handle.name, e);

            let charge_now = read_uint(&handle.path, "charge_now").ok()?;
            let voltage_now = read_uint(&handle.path, "voltage_now").ok()?;

            Some((charge_to_energy(charge_now, voltage_now), BatteryUnit::Charge))
        }
    }
}
