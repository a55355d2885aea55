//! Reduction of per-device readings into one measurement

use crate::battery::{BatterySample, CAPACITY_UNKNOWN};
use crate::error::AggError;
use crate::power_supply::DeviceHandle;
use crate::sysfs::read_uint;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which AC adapter decides the online state when several are present.
///
/// Notebooks have a single adapter, so only one policy exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcTieBreak {
    /// The first adapter in enumeration order wins
    #[default]
    FirstEnumerated,
}

/// Battery totals at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyTotals {
    /// Sum of `energy_now` over all batteries in µWh
    pub total_energy: u64,
    /// Latest sample timestamp (unix seconds)
    pub timestamp: i64,
    /// Mean capacity percentage, or -1 if no battery reported one
    pub total_capacity: f32,
}

/// Combined machine power state for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateSample {
    /// Whether AC power is connected
    pub ac_online: bool,
    /// Sum of `energy_now` over all batteries in µWh
    pub total_energy: u64,
    /// Latest sample timestamp (unix seconds)
    pub timestamp: i64,
    /// Mean capacity percentage, or -1 if no battery reported one
    pub total_capacity: f32,
}

impl AggregateSample {
    /// Combine the AC state with battery totals
    pub fn new(ac_online: bool, totals: EnergyTotals) -> Self {
        Self {
            ac_online,
            total_energy: totals.total_energy,
            timestamp: totals.timestamp,
            total_capacity: totals.total_capacity,
        }
    }

    /// Get the sample time as a UTC date (if representable)
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Get total energy in watt-hours
    pub fn total_energy_wh(&self) -> f64 {
        self.total_energy as f64 / 1_000_000.0
    }
}

/// Reduce battery samples to totals.
///
/// Every sample must be valid: one unreadable battery fails the whole
/// measurement. Energy is summed with wrapping arithmetic.
pub fn aggregate(samples: &[BatterySample]) -> Result<EnergyTotals, AggError> {
    if samples.is_empty() {
        return Err(AggError::NoBatteries);
    }

    if let Some(bad) = samples.iter().find(|s| !s.valid) {
        return Err(AggError::SampleInvalid {
            device: bad.name.clone(),
        });
    }

    let total_energy = samples
        .iter()
        .fold(0u64, |total, s| total.wrapping_add(s.energy_now));
    let timestamp = samples.iter().map(|s| s.timestamp).max().unwrap_or(0);

    Ok(EnergyTotals {
        total_energy,
        timestamp,
        total_capacity: mean_capacity(samples),
    })
}

/// Mean of the reported capacities; unknown ones are ignored
fn mean_capacity(samples: &[BatterySample]) -> f32 {
    let (sum, count) = samples
        .iter()
        .filter(|s| s.has_capacity())
        .fold((0.0f64, 0u32), |(sum, count), s| {
            (sum + f64::from(s.capacity_percent), count + 1)
        });

    if count == 0 {
        CAPACITY_UNKNOWN
    } else {
        (sum / f64::from(count)) as f32
    }
}

/// Pick the AC adapter that decides the online state
pub fn select_ac_adapter(devices: &[DeviceHandle], policy: AcTieBreak) -> Option<&DeviceHandle> {
    match policy {
        AcTieBreak::FirstEnumerated => devices.iter().find(|d| d.is_ac_adapter()),
    }
}

/// Whether AC power is connected, using [`AcTieBreak::FirstEnumerated`]
pub fn ac_status(devices: &[DeviceHandle]) -> Result<bool, AggError> {
    ac_status_with(devices, AcTieBreak::default())
}

/// Whether AC power is connected, choosing the adapter by `policy`
pub fn ac_status_with(devices: &[DeviceHandle], policy: AcTieBreak) -> Result<bool, AggError> {
    let adapter = select_ac_adapter(devices, policy).ok_or(AggError::NoAcDevice)?;

    let online = read_uint(&adapter.path, "online").map_err(|source| AggError::AcRead {
        device: adapter.name.clone(),
        source,
    })?;

    debug!("{}: online {}", adapter.name, online);
    Ok(online != 0)
}
