//! crates/logging/src/levels.rs
//! Severity levels, category flags and the acceptance predicate.

use std::fmt;
use std::str::FromStr;

/// Error returned when a severity, flag or mask token cannot be parsed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseLevelError {
    /// The token named no known severity.
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
    /// The token named no known flag.
    #[error("unknown log flag: {0}")]
    UnknownFlag(String),
}

/// Ordered log importance.
///
/// A record at severity `L` passes a threshold `T` when `L <= T`. [`Severity::Off`]
/// as a threshold accepts nothing and [`Severity::All`] accepts everything.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// Nothing is logged.
    Off = 0,
    /// Failures that must be recorded before the caller continues.
    Error = 1,
    /// Recoverable anomalies.
    Warning = 2,
    /// Normal operational messages.
    Info = 3,
    /// Developer diagnostics.
    Debug = 4,
    /// High-volume tracing output.
    Verbose = 5,
    /// Everything is logged.
    All = 6,
}

impl Severity {
    /// Every severity in ascending order.
    pub const ALL: [Self; 7] = [
        Self::Off,
        Self::Error,
        Self::Warning,
        Self::Info,
        Self::Debug,
        Self::Verbose,
        Self::All,
    ];

    /// Returns the lowercase name used in configuration and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Verbose => "verbose",
            Self::All => "all",
        }
    }

    /// Returns the flag sharing this severity's name.
    ///
    /// `Off` and `All` are thresholds only and have no flag.
    pub const fn flag(self) -> Option<LogFlag> {
        match self {
            Self::Error => Some(LogFlag::Error),
            Self::Warning => Some(LogFlag::Warning),
            Self::Info => Some(LogFlag::Info),
            Self::Debug => Some(LogFlag::Debug),
            Self::Verbose => Some(LogFlag::Verbose),
            Self::Off | Self::All => None,
        }
    }

    /// Single-letter marker used when rendering records.
    pub const fn marker(self) -> char {
        match self {
            Self::Off => '-',
            Self::Error => 'E',
            Self::Warning => 'W',
            Self::Info => 'I',
            Self::Debug => 'D',
            Self::Verbose => 'V',
            Self::All => '*',
        }
    }

    const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Off),
            1 => Some(Self::Error),
            2 => Some(Self::Warning),
            3 => Some(Self::Info),
            4 => Some(Self::Debug),
            5 => Some(Self::Verbose),
            6 => Some(Self::All),
            _ => None,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseLevelError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let trimmed = token.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return Self::from_index(index)
                .ok_or_else(|| ParseLevelError::UnknownSeverity(token.to_string()));
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "verbose" | "trace" => Ok(Self::Verbose),
            "all" => Ok(Self::All),
            _ => Err(ParseLevelError::UnknownSeverity(token.to_string())),
        }
    }
}

/// Independent category bit carried by every record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogFlag {
    /// Error category.
    Error = 1 << 0,
    /// Warning category.
    Warning = 1 << 1,
    /// Info category.
    Info = 1 << 2,
    /// Debug category.
    Debug = 1 << 3,
    /// Verbose category.
    Verbose = 1 << 4,
}

impl LogFlag {
    /// Every flag in severity order.
    pub const ALL: [Self; 5] = [
        Self::Error,
        Self::Warning,
        Self::Info,
        Self::Debug,
        Self::Verbose,
    ];

    /// Returns the bit value of the flag.
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Returns the severity with the same name.
    pub const fn severity(self) -> Severity {
        match self {
            Self::Error => Severity::Error,
            Self::Warning => Severity::Warning,
            Self::Info => Severity::Info,
            Self::Debug => Severity::Debug,
            Self::Verbose => Severity::Verbose,
        }
    }

    /// Returns the lowercase name of the flag.
    pub const fn as_str(self) -> &'static str {
        self.severity().as_str()
    }
}

impl Default for LogFlag {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for LogFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFlag {
    type Err = ParseLevelError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        token
            .parse::<Severity>()
            .ok()
            .and_then(Severity::flag)
            .ok_or_else(|| ParseLevelError::UnknownFlag(token.to_string()))
    }
}

/// Set of enabled [`LogFlag`] categories.
///
/// With the `serde` feature the mask is written as its [`Display`](fmt::Display)
/// form (`"error,warning"`). It reads back from that form, from a list of
/// flag names, or from raw bits, dropping bits that name no flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FlagMask(u8);

impl FlagMask {
    /// Mask with no flag enabled.
    pub const NONE: Self = Self(0);
    /// Mask with every flag enabled.
    pub const ALL: Self = Self(0b1_1111);

    /// Builds a mask from raw bits, dropping bits that name no flag.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Mask enabling every flag whose severity does not exceed `threshold`.
    ///
    /// This is the level-as-bitmask encoding: `Info` enables error, warning
    /// and info.
    pub fn for_threshold(threshold: Severity) -> Self {
        LogFlag::ALL
            .into_iter()
            .filter(|flag| flag.severity() <= threshold)
            .collect()
    }

    /// Reports whether `flag` is enabled.
    pub const fn contains(self, flag: LogFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Reports whether no flag is enabled.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enables `flag`.
    pub fn insert(&mut self, flag: LogFlag) {
        self.0 |= flag.bit();
    }

    /// Disables `flag`.
    pub fn remove(&mut self, flag: LogFlag) {
        self.0 &= !flag.bit();
    }

    /// Returns a mask with `flag` enabled.
    #[must_use]
    pub const fn with(self, flag: LogFlag) -> Self {
        Self(self.0 | flag.bit())
    }

    /// Returns a mask with `flag` disabled.
    #[must_use]
    pub const fn without(self, flag: LogFlag) -> Self {
        Self(self.0 & !flag.bit())
    }

    /// Returns the union of both masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Iterates over the enabled flags in severity order.
    pub fn iter(self) -> impl Iterator<Item = LogFlag> {
        LogFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl Default for FlagMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<LogFlag> for FlagMask {
    fn from(flag: LogFlag) -> Self {
        Self(flag.bit())
    }
}

impl FromIterator<LogFlag> for FlagMask {
    fn from_iter<I: IntoIterator<Item = LogFlag>>(iter: I) -> Self {
        let mut mask = Self::NONE;
        for flag in iter {
            mask.insert(flag);
        }
        mask
    }
}

impl fmt::Display for FlagMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for flag in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(flag.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for FlagMask {
    type Err = ParseLevelError;

    /// Parses `"all"`, `"none"` or a comma-separated list of flag names.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "all" => return Ok(Self::ALL),
            "none" | "off" | "" => return Ok(Self::NONE),
            _ => {}
        }

        token
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse::<LogFlag>)
            .collect()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FlagMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FlagMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(FlagMaskVisitor)
    }
}

#[cfg(feature = "serde")]
struct FlagMaskVisitor;

#[cfg(feature = "serde")]
impl<'de> serde::de::Visitor<'de> for FlagMaskVisitor {
    type Value = FlagMask;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("flag names or a bit mask")
    }

    fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<FlagMask, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<FlagMask, E> {
        u8::try_from(value)
            .map(FlagMask::from_bits_truncate)
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Unsigned(value), &self))
    }

    fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<FlagMask, E> {
        u8::try_from(value)
            .map(FlagMask::from_bits_truncate)
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Signed(value), &self))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<FlagMask, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut mask = FlagMask::NONE;
        while let Some(flag) = seq.next_element::<LogFlag>()? {
            mask.insert(flag);
        }
        Ok(mask)
    }
}

/// Decides whether a record passes the severity threshold and the flag mask.
///
/// Both gates must pass: `severity <= threshold` and `flag` enabled in `mask`.
/// A threshold of [`Severity::Off`] rejects every record.
///
/// # Examples
///
/// ```
/// use logging::{accepts, FlagMask, LogFlag, Severity};
///
/// assert!(accepts(Severity::Info, LogFlag::Info, Severity::Debug, FlagMask::ALL));
/// assert!(!accepts(Severity::Debug, LogFlag::Debug, Severity::Info, FlagMask::ALL));
/// assert!(!accepts(Severity::Error, LogFlag::Error, Severity::All, FlagMask::NONE));
/// ```
pub fn accepts(severity: Severity, flag: LogFlag, threshold: Severity, mask: FlagMask) -> bool {
    threshold != Severity::Off && severity <= threshold && mask.contains(flag)
}
