//! crates/logging/src/config.rs
//! Manager configuration: destinations, file location, threshold, mask and policy.

use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::levels::{FlagMask, LogFlag, ParseLevelError, Severity};
use super::policy::{DispatchMode, DispatchPolicy};

/// Environment variable prefix consulted by [`LogConfig::from_env`].
pub const ENV_PREFIX: &str = "MIDILOG_";

/// Default syslog ident and file name prefix.
pub const DEFAULT_TAG: &str = "midilog";

/// Error raised while parsing configuration tokens.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A destination name outside the closed set.
    #[error("unknown destination: {0}")]
    UnknownDestination(String),
    /// A directive key that is not recognised.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
    /// A directive without `=value`.
    #[error("missing value for configuration key: {0}")]
    MissingValue(String),
    /// A syslog facility name outside the supported set.
    #[error("unknown syslog facility: {0}")]
    UnknownFacility(String),
    /// A boolean value that is neither true nor false.
    #[error("invalid boolean for {key}: {value}")]
    InvalidBool {
        /// Directive key.
        key: String,
        /// Offending value.
        value: String,
    },
    /// A severity or flag token that failed to parse.
    #[error(transparent)]
    Level(#[from] ParseLevelError),
}

/// Built-in destination descriptor.
///
/// The set is closed; each kind has a stable name used for registry
/// deduplication and configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DestinationKind {
    /// Console log (standard error).
    #[cfg_attr(feature = "serde", serde(rename = "asl"))]
    Console,
    /// Terminal output (standard output, coloured when attached to a TTY).
    #[cfg_attr(feature = "serde", serde(rename = "tty"))]
    Tty,
    /// Operating system log (syslog on Unix).
    #[cfg_attr(feature = "serde", serde(rename = "os"))]
    Os,
    /// Append-only log file.
    #[cfg_attr(feature = "serde", serde(rename = "file"))]
    File,
}

impl DestinationKind {
    /// Every built-in destination.
    pub const ALL: [Self; 4] = [Self::Console, Self::Tty, Self::Os, Self::File];

    /// Stable registry name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Console => "asl",
            Self::Tty => "tty",
            Self::Os => "os",
            Self::File => "file",
        }
    }

    /// Looks a destination up by registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DestinationKind {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "asl" | "console" | "stderr" => Ok(Self::Console),
            "tty" | "terminal" | "stdout" => Ok(Self::Tty),
            "os" | "oslog" | "syslog" => Ok(Self::Os),
            "file" => Ok(Self::File),
            _ => Err(ConfigError::UnknownDestination(token.to_string())),
        }
    }
}

/// Syslog facility used by the OS log destination.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Facility {
    /// User-level messages.
    #[default]
    User,
    /// System daemons.
    Daemon,
    /// Local use 0.
    Local0,
    /// Local use 1.
    Local1,
    /// Local use 2.
    Local2,
    /// Local use 3.
    Local3,
    /// Local use 4.
    Local4,
    /// Local use 5.
    Local5,
    /// Local use 6.
    Local6,
    /// Local use 7.
    Local7,
}

impl Facility {
    /// Every supported facility.
    pub const ALL: [Self; 10] = [
        Self::User,
        Self::Daemon,
        Self::Local0,
        Self::Local1,
        Self::Local2,
        Self::Local3,
        Self::Local4,
        Self::Local5,
        Self::Local6,
        Self::Local7,
    ];

    /// Lowercase facility name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Daemon => "daemon",
            Self::Local0 => "local0",
            Self::Local1 => "local1",
            Self::Local2 => "local2",
            Self::Local3 => "local3",
            Self::Local4 => "local4",
            Self::Local5 => "local5",
            Self::Local6 => "local6",
            Self::Local7 => "local7",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facility {
    type Err = ConfigError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let name = token.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|facility| facility.as_str() == name)
            .ok_or_else(|| ConfigError::UnknownFacility(token.to_string()))
    }
}

/// Configuration applied by the manager on `start`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogConfig {
    /// Destinations to register.
    pub destinations: BTreeSet<DestinationKind>,
    /// Directory of the file destination.
    pub file_directory: Option<PathBuf>,
    /// File name inside `file_directory`; a dated name is used when absent.
    pub file_name: Option<String>,
    /// Highest severity that is accepted.
    pub threshold: Severity,
    /// Enabled categories.
    pub flags: FlagMask,
    /// Synchronous versus deferred delivery per severity.
    pub policy: DispatchPolicy,
    /// Ident used by the OS log destination and as the file name prefix.
    pub tag: String,
    /// Facility of the OS log destination.
    pub facility: Facility,
}

impl LogConfig {
    /// Configuration with no destination and default filtering.
    pub fn empty() -> Self {
        Self {
            destinations: BTreeSet::new(),
            ..Self::default()
        }
    }

    /// Reads the configuration from `MIDILOG_*` environment variables on top
    /// of the defaults.
    ///
    /// Recognised variables: `MIDILOG_DESTINATIONS`, `MIDILOG_DIR`,
    /// `MIDILOG_FILE`, `MIDILOG_LEVEL`, `MIDILOG_FLAGS`, `MIDILOG_SYNC`,
    /// `MIDILOG_ASYNC`, `MIDILOG_TAG` and `MIDILOG_FACILITY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a caller-provided lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for key in [
            "destinations",
            "dir",
            "file",
            "level",
            "flags",
            "sync",
            "async",
            "tag",
            "facility",
        ] {
            let var = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
            if let Some(value) = lookup(&var) {
                config.set(key, &value)?;
            }
        }
        Ok(config)
    }

    /// Adds a destination.
    #[must_use]
    pub fn with_destination(mut self, kind: DestinationKind) -> Self {
        self.destinations.insert(kind);
        self
    }

    /// Sets the file destination directory.
    #[must_use]
    pub fn with_file_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.file_directory = Some(directory.into());
        self
    }

    /// Sets the log file name.
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Sets the severity threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the enabled flag mask.
    #[must_use]
    pub const fn with_flags(mut self, flags: FlagMask) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the dispatch policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reports whether `kind` is enabled.
    pub fn has_destination(&self, kind: DestinationKind) -> bool {
        self.destinations.contains(&kind)
    }

    /// Directory of the file destination, if configured.
    pub fn file_directory(&self) -> Option<&Path> {
        self.file_directory.as_deref()
    }

    /// Applies a single `key=value` directive (e.g., `"level=debug"`).
    pub fn apply_directive(&mut self, directive: &str) -> Result<(), ConfigError> {
        let (key, value) = parse_directive(directive)?;
        self.set(key, value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "destinations" | "destination" => {
                self.destinations = value
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::parse)
                    .collect::<Result<_, _>>()?;
            }
            "dir" | "directory" => self.file_directory = Some(PathBuf::from(value)),
            "file" => self.file_name = Some(value.to_string()),
            "level" | "threshold" => self.threshold = value.parse()?,
            "flags" => self.flags = value.parse()?,
            "sync" => {
                let synchronous: FlagMask = value.parse()?;
                for flag in LogFlag::ALL {
                    let mode = if synchronous.contains(flag) {
                        DispatchMode::Synchronous
                    } else {
                        DispatchMode::Deferred
                    };
                    self.policy.set(flag, mode);
                }
            }
            "async" => self.policy.asynchronous = parse_bool(key, value)?,
            "tag" => self.tag = value.to_string(),
            "facility" => self.facility = value.parse()?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            destinations: [DestinationKind::Console, DestinationKind::File]
                .into_iter()
                .collect(),
            file_directory: Some(env::temp_dir().join(DEFAULT_TAG)),
            file_name: None,
            threshold: Severity::All,
            flags: FlagMask::ALL,
            policy: DispatchPolicy::default(),
            tag: DEFAULT_TAG.to_string(),
            facility: Facility::User,
        }
    }
}

/// Splits `"key=value"` into its trimmed key and value.
fn parse_directive(directive: &str) -> Result<(&str, &str), ConfigError> {
    let Some((key, value)) = directive.split_once('=') else {
        return Err(ConfigError::MissingValue(directive.trim().to_string()));
    };
    Ok((key.trim(), value.trim()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
