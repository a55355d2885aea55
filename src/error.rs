//! Error types for the power drain recorder (ptdrain)

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ptdrain operations
pub type Result<T> = std::result::Result<T, DrainError>;

/// Failure to read a numeric sysfs attribute
#[derive(Error, Debug)]
pub enum ReadError {
    /// Attribute file is absent or unreadable
    #[error("cannot read {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Attribute file has no leading numeral
    #[error("no number in {}: {content:?}", path.display())]
    ParseError { path: PathBuf, content: String },
}

/// Failure to enumerate the power-supply root
#[derive(Error, Debug)]
pub enum EnumError {
    /// Root directory cannot be opened
    #[error("power supply root {} unavailable: {source}", path.display())]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to reduce device readings into one measurement
#[derive(Error, Debug)]
pub enum AggError {
    /// No battery devices were discovered
    #[error("no batteries found")]
    NoBatteries,

    /// No AC adapter device was discovered
    #[error("no AC adapter device found")]
    NoAcDevice,

    /// A battery could not be sampled
    #[error("battery {device} could not be sampled")]
    SampleInvalid { device: String },

    /// The AC adapter `online` attribute could not be read
    #[error("AC adapter {device}: {source}")]
    AcRead {
        device: String,
        #[source]
        source: ReadError,
    },
}

/// Failure to append to the drain log
#[derive(Error, Debug)]
pub enum WriteError {
    /// Containing directory could not be created
    #[error("cannot create directory {}: {source}", path.display())]
    DirCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Log file could not be opened for appending
    #[error("cannot open {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Exclusive lock on the log file could not be taken
    #[error("cannot lock {}: {source}", path.display())]
    LockFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Header or record was not written completely
    #[error("incomplete write to {}: {source}", path.display())]
    PartialWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Data could not be flushed to disk
    #[error("cannot close {}: {source}", path.display())]
    CloseFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Action label would break the CSV line
    #[error("invalid action label {0:?}")]
    InvalidAction(String),
}

/// Failure to load or store the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read or written
    #[error("config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::config::Config`]
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration could not be serialized
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Main error type, wraps every stage of a recording run
#[derive(Error, Debug)]
pub enum DrainError {
    /// Reading a device attribute failed
    #[error(transparent)]
    Read(#[from] ReadError),

    /// Enumerating devices failed
    #[error(transparent)]
    Enum(#[from] EnumError),

    /// Aggregating samples failed
    #[error(transparent)]
    Agg(#[from] AggError),

    /// Appending to the log failed
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Loading configuration failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}
