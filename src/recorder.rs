//! One measure-and-append cycle
//!
//! # Examples
//!
//! ```no_run
//! use ptdrain::{Config, Recorder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = Recorder::from_config(&Config::load()?);
//! let record = recorder.record("pre")?;
//! println!("{record}");
//! # Ok(())
//! # }
//! ```

use crate::aggregate::{ac_status, aggregate, AggregateSample};
use crate::battery::{sample_with, Clock, SystemClock};
use crate::config::Config;
use crate::drain_log::{append_record, LogRecord};
use crate::error::{AggError, Result};
use crate::power_supply::{batteries, list_devices};
use log::debug;
use std::path::PathBuf;

/// Measures the power state and appends it to the drain log
#[derive(Debug, Clone)]
pub struct Recorder {
    /// Directory holding one subdirectory per power supply
    pub power_supply_root: PathBuf,
    /// CSV file records are appended to
    pub log_file: PathBuf,
}

impl Recorder {
    /// Create a recorder for explicit locations
    pub fn new(power_supply_root: impl Into<PathBuf>, log_file: impl Into<PathBuf>) -> Self {
        Self {
            power_supply_root: power_supply_root.into(),
            log_file: log_file.into(),
        }
    }

    /// Create a recorder using the configured locations
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.paths.power_supply_root, &config.paths.log_file)
    }

    /// Measure the current power state using the system clock
    pub fn measure(&self) -> Result<AggregateSample> {
        self.measure_with(&SystemClock)
    }

    /// Measure the current power state, timestamping samples with `clock`.
    ///
    /// Fails if there is no battery, no AC adapter, or any battery cannot
    /// be read.
    pub fn measure_with(&self, clock: &dyn Clock) -> Result<AggregateSample> {
        let devices = list_devices(&self.power_supply_root)?;
        let bats = batteries(&devices);
        debug!(
            "{} power supplies, {} batteries under {}",
            devices.len(),
            bats.len(),
            self.power_supply_root.display()
        );

        if bats.is_empty() {
            return Err(AggError::NoBatteries.into());
        }

        let ac_online = ac_status(&devices)?;

        let samples: Vec<_> = bats.iter().map(|bat| sample_with(bat, clock)).collect();
        let totals = aggregate(&samples)?;

        Ok(AggregateSample::new(ac_online, totals))
    }

    /// Measure and append one record labelled `action`
    pub fn record(&self, action: &str) -> Result<LogRecord> {
        self.record_with(action, &SystemClock)
    }

    /// Measure with `clock` and append one record labelled `action`
    pub fn record_with(&self, action: &str, clock: &dyn Clock) -> Result<LogRecord> {
        let record = LogRecord::new(action, &self.measure_with(clock)?);
        append_record(&self.log_file, &record)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DrainError;
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Hands out the given timestamps one per call
    struct StepClock {
        times: Vec<i64>,
        next: Cell<usize>,
    }

    impl StepClock {
        fn new(times: &[i64]) -> Self {
            Self {
                times: times.to_vec(),
                next: Cell::new(0),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> Option<i64> {
            let i = self.next.get();
            self.next.set(i + 1);
            self.times.get(i).copied()
        }
    }

    fn device(root: &Path, name: &str, attributes: &[(&str, &str)]) {
        let path = root.join(name);
        fs::create_dir(&path).unwrap();
        for (attr, value) in attributes {
            fs::write(path.join(attr), format!("{value}\n")).unwrap();
        }
    }

    fn laptop() -> TempDir {
        let root = TempDir::new().unwrap();
        device(
            root.path(),
            "BAT0",
            &[("energy_now", "40000000"), ("capacity", "80.0")],
        );
        device(
            root.path(),
            "BAT1",
            &[("energy_now", "60000000"), ("capacity", "60.0")],
        );
        device(root.path(), "AC", &[("online", "1")]);
        device(root.path(), "hidpp_battery_0", &[("capacity", "5")]);
        root
    }

    #[test]
    fn test_measure_two_batteries() {
        let root = laptop();
        let recorder = Recorder::new(root.path(), root.path().join("drain.csv"));

        let sample = recorder.measure_with(&StepClock::new(&[1000, 1005])).unwrap();
        assert_eq!(
            sample,
            AggregateSample {
                ac_online: true,
                total_energy: 100_000_000,
                timestamp: 1005,
                total_capacity: 70.0,
            }
        );
    }

    #[test]
    fn test_record_appends_line() {
        let root = laptop();
        let out = TempDir::new().unwrap();
        let log = out.path().join("pt").join("drain.csv");
        let recorder = Recorder::new(root.path(), &log);

        let record = recorder
            .record_with("check", &StepClock::new(&[1000, 1005]))
            .unwrap();
        assert_eq!(record.to_string(), "check,1005,1,100000000,70.00");

        let content = fs::read_to_string(&log).unwrap();
        assert_eq!(
            content,
            "action,timestamp,ac,energy_total,capacity_total\ncheck,1005,1,100000000,70.00\n"
        );
    }

    #[test]
    fn test_no_batteries_leaves_log_untouched() {
        let root = TempDir::new().unwrap();
        device(root.path(), "AC", &[("online", "0")]);
        let out = TempDir::new().unwrap();
        let log = out.path().join("drain.csv");
        let recorder = Recorder::new(root.path(), &log);

        assert!(matches!(
            recorder.record_with("check", &StepClock::new(&[1])),
            Err(DrainError::Agg(AggError::NoBatteries))
        ));
        assert!(!log.exists());
    }

    #[test]
    fn test_unreadable_battery_aborts() {
        let root = laptop();
        device(root.path(), "BAT2", &[("charge_now", "100")]);
        let out = TempDir::new().unwrap();
        let log = out.path().join("drain.csv");
        let recorder = Recorder::new(root.path(), &log);

        match recorder.record_with("pre", &StepClock::new(&[1, 2, 3])) {
            Err(DrainError::Agg(AggError::SampleInvalid { device })) => assert_eq!(device, "BAT2"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!log.exists());
    }

    #[test]
    fn test_missing_ac_adapter() {
        let root = TempDir::new().unwrap();
        device(root.path(), "BAT0", &[("energy_now", "1")]);
        let recorder = Recorder::new(root.path(), root.path().join("drain.csv"));

        assert!(matches!(
            recorder.measure_with(&StepClock::new(&[1])),
            Err(DrainError::Agg(AggError::NoAcDevice))
        ));
    }

    #[test]
    fn test_missing_root() {
        let root = TempDir::new().unwrap();
        let recorder = Recorder::new(root.path().join("nope"), root.path().join("drain.csv"));

        assert!(matches!(
            recorder.measure(),
            Err(DrainError::Enum(_))
        ));
    }
}
