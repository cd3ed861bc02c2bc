//! Shopify API version handling.
//!
//! The helper only needs to carry the configured version through to the API
//! client's request path, so versions are parsed once and displayed as the
//! `YYYY-MM` / `unstable` strings Shopify expects.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A Shopify API version.
///
/// Shopify releases stable versions quarterly (January, April, July and
/// October). `Unstable` targets the in-development API.
///
/// # Example
///
/// ```rust
/// use shopify_app::ApiVersion;
///
/// let version: ApiVersion = "2025-07".parse().unwrap();
/// assert_eq!(version, ApiVersion::Release { year: 2025, month: 7 });
/// assert_eq!(version.to_string(), "2025-07");
/// assert!("2025-02".parse::<ApiVersion>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApiVersion {
    /// A dated stable release.
    Release {
        /// Release year, e.g. `2025`.
        year: u16,
        /// Release month: 1, 4, 7 or 10.
        month: u8,
    },
    /// The unstable API.
    Unstable,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Unstable => f.write_str("unstable"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "unstable" {
            return Ok(Self::Unstable);
        }

        let invalid = || ConfigError::InvalidApiVersion { version: s.clone() };

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: u16 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;

        // Quarterly releases only
        if !matches!(month, 1 | 4 | 7 | 10) {
            return Err(invalid());
        }

        Ok(Self::Release { year, month })
    }
}
