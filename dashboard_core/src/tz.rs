//! Time zone parsing helpers.
//!
//! - [`parse_tz`]: IANA name (e.g. "America/New_York") to [`chrono_tz::Tz`],
//!   accepting the `US/Eastern`-style aliases as chrono-tz does.
//!
//! Timestamps travel through the engine as instants; zones only matter for
//! the session mask and for display.

use chrono_tz::Tz;
use thiserror::Error;

/// A zone name that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TzError {
    /// Unknown IANA zone name.
    #[error("bad tz: {0}")]
    UnknownZone(String),
}

/// Parses an IANA zone name; surrounding whitespace is ignored.
pub fn parse_tz(name: &str) -> Result<Tz, TzError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TzError::UnknownZone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_names_and_aliases() {
        assert_eq!(parse_tz("America/New_York").unwrap(), chrono_tz::America::New_York);
        assert_eq!(parse_tz(" US/Eastern ").unwrap(), chrono_tz::US::Eastern);
        assert_eq!(parse_tz("UTC").unwrap(), Tz::UTC);
        assert_eq!(
            parse_tz("Mars/Olympus"),
            Err(TzError::UnknownZone("Mars/Olympus".into()))
        );
    }
}
