//! # Power drain recorder (ptdrain)
//!
//! Records how much battery energy a machine holds at a point in time, so
//! that the energy drawn while suspended can be computed later. Meant to be
//! run from a `systemd-sleep` hook (`/usr/lib/systemd/system-sleep/`),
//! once before and once after every suspend.
//!
//! Each run reads `/sys/class/power_supply`, sums the energy of all
//! batteries, checks whether AC power is connected, and appends one line
//! to `/var/cache/pt/drain.csv`:
//!
//! ```text
//! action,timestamp,ac,energy_total,capacity_total
//! pre,1700000000,0,41250000,80.00
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use ptdrain::{Config, Recorder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = Recorder::from_config(&Config::default());
//!
//! // Measure without touching the log
//! let sample = recorder.measure()?;
//! println!("{} µWh, AC {}", sample.total_energy, sample.ac_online);
//!
//! // Measure and append
//! recorder.record("check")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Energy units
//!
//! Batteries reporting `energy_now` (µWh) are used as is. Batteries that
//! only report `charge_now` (µAh) and `voltage_now` (µV) are converted with
//! `charge_now * voltage_now / 1_000_000`. See [`battery`].

pub mod aggregate; // Reduction of battery samples and AC state
pub mod battery; // Per-battery sampling with energy unit fallback
pub mod config; // Configuration management with TOML persistence
pub mod drain_log; // Append-only CSV log
pub mod error;
pub mod power_supply; // Power supply discovery and classification
pub mod recorder; // One measure-and-append cycle
pub mod sysfs; // Numeric sysfs attribute reading

pub use aggregate::{ac_status, aggregate, AcTieBreak, AggregateSample, EnergyTotals};
pub use battery::{sample, BatterySample, BatteryUnit, Clock, SystemClock};
pub use config::Config;
pub use drain_log::{append_record, LogRecord};
pub use error::{DrainError, Result};
pub use power_supply::{classify, list_devices, DeviceHandle, DeviceKind};
pub use recorder::Recorder;
pub use sysfs::{read_float, read_uint};
