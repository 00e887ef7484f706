//! Destination port values.

use std::fmt;
use std::str::FromStr;

/// A single port or an inclusive `START-END` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PortSpec {
    Single(u16),
    Range(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid port '{0}'")]
pub(crate) struct InvalidPort(pub String);

impl FromStr for PortSpec {
    type Err = InvalidPort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidPort(s.to_string());
        let s = s.trim();
        match s.split_once('-') {
            None => s.parse().map(PortSpec::Single).map_err(|_| invalid()),
            Some((start, end)) => {
                let start: u16 = start.trim().parse().map_err(|_| invalid())?;
                let end: u16 = end.trim().parse().map_err(|_| invalid())?;
                if start > end {
                    return Err(invalid());
                }
                Ok(PortSpec::Range(start, end))
            }
        }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::Single(port) => write!(f, "{port}"),
            PortSpec::Range(start, end) => write!(f, "{start}-{end}"),
        }
    }
}
