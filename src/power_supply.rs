//! Power supply discovery
//!
//! This module finds batteries and AC adapters under the Linux
//! `/sys/class/power_supply/` tree. Devices are recognized by the name the
//! kernel driver gives them (`BAT0`, `AC`, `ADP1`, ...), not by their `type`
//! attribute.
//!
//! # Examples
//!
//! ```no_run
//! use ptdrain::power_supply::{list_devices, DeviceKind, DEFAULT_POWER_SUPPLY_ROOT};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! for device in list_devices(DEFAULT_POWER_SUPPLY_ROOT)? {
//!     if device.kind == DeviceKind::Battery {
//!         println!("battery: {}", device.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::EnumError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the kernel exposes power supplies
pub const DEFAULT_POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Kind of power supply, derived from the device name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Rechargeable battery (`BAT*`)
    Battery,
    /// AC adapter / mains power (`AC*`, `ADP*`)
    AcAdapter,
    /// Anything else (USB, UPS, peripheral batteries)
    Other,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Battery => write!(f, "Battery"),
            DeviceKind::AcAdapter => write!(f, "AC adapter"),
            DeviceKind::Other => write!(f, "Other"),
        }
    }
}

/// Classify a power supply by its name.
///
/// The prefix match is case-sensitive. This relies on drivers following
/// the usual naming convention; a battery called `CMB0` is not recognized.
pub fn classify(name: &str) -> DeviceKind {
    if name.starts_with("BAT") {
        DeviceKind::Battery
    } else if name.starts_with("AC") || name.starts_with("ADP") {
        DeviceKind::AcAdapter
    } else {
        DeviceKind::Other
    }
}

/// A battery or AC adapter found under the power supply root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHandle {
    /// Directory name, e.g. `BAT0`
    pub name: String,
    /// Directory holding the attribute files
    pub path: PathBuf,
    /// Result of [`classify`] on `name`
    pub kind: DeviceKind,
}

impl DeviceHandle {
    /// Create a handle for the device directory at `path`
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            kind: classify(name),
        }
    }

    /// Check if this is a battery
    pub fn is_battery(&self) -> bool {
        self.kind == DeviceKind::Battery
    }

    /// Check if this is an AC adapter
    pub fn is_ac_adapter(&self) -> bool {
        self.kind == DeviceKind::AcAdapter
    }
}

/// List batteries and AC adapters under `root`, sorted by name.
///
/// Entries that cannot be read are skipped. An empty list is not an error.
pub fn list_devices(root: impl AsRef<Path>) -> Result<Vec<DeviceHandle>, EnumError> {
    let root = root.as_ref();

    let entries = fs::read_dir(root).map_err(|source| EnumError::RootUnavailable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut devices = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry in {}: {}", root.display(), e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        let device = DeviceHandle::new(&name, entry.path());

        if device.kind == DeviceKind::Other {
            continue;
        }

        debug!("found {} {}", device.kind, device.name);
        devices.push(device);
    }

    devices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(devices)
}

/// Batteries in `devices`, in enumeration order
pub fn batteries(devices: &[DeviceHandle]) -> Vec<&DeviceHandle> {
    devices.iter().filter(|d| d.is_battery()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify() {
        assert_eq!(classify("BAT0"), DeviceKind::Battery);
        assert_eq!(classify("BAT1"), DeviceKind::Battery);
        assert_eq!(classify("AC"), DeviceKind::AcAdapter);
        assert_eq!(classify("AC0"), DeviceKind::AcAdapter);
        assert_eq!(classify("ADP1"), DeviceKind::AcAdapter);
        assert_eq!(classify("USB0"), DeviceKind::Other);
        assert_eq!(classify("bat0"), DeviceKind::Other);
        assert_eq!(classify("hidpp_battery_0"), DeviceKind::Other);
        assert_eq!(classify(""), DeviceKind::Other);
    }

    #[test]
    fn test_list_devices() {
        let root = TempDir::new().unwrap();
        for name in ["USB0", "BAT1", "ADP1", "BAT0", "ucsi-source-psy-USBC000:001"] {
            fs::create_dir(root.path().join(name)).unwrap();
        }

        let devices = list_devices(root.path()).unwrap();
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["ADP1", "BAT0", "BAT1"]);
        assert_eq!(devices[0].kind, DeviceKind::AcAdapter);
        assert_eq!(devices[1].path, root.path().join("BAT0"));

        let bats: Vec<&str> = batteries(&devices).iter().map(|d| d.name.as_str()).collect();
        assert_eq!(bats, vec!["BAT0", "BAT1"]);
    }

    #[test]
    fn test_list_devices_empty() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("USB0")).unwrap();

        assert!(list_devices(root.path()).unwrap().is_empty());
    }

    #[test]
    fn test_list_devices_missing_root() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("power_supply");

        assert!(matches!(
            list_devices(&missing),
            Err(EnumError::RootUnavailable { .. })
        ));
    }
}
