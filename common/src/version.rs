use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A `MAJOR.MINOR.PATCH` version, as exchanged for API and type versions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ApiVersion {
    /// The version reported for types this side knows nothing about.
    pub const UNKNOWN: ApiVersion = ApiVersion::new(0, 0, 0);

    #[inline]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns `true` if something built against `self` can run on a side providing `provided`,
    /// given that `self` is a minimum version.
    ///
    /// Both must share the same major version, and `provided` must not be older than `self`.
    #[inline]
    pub fn is_satisfied_by(&self, provided: ApiVersion) -> bool {
        self.major == provided.major && *self <= provided
    }
}

impl PartialOrd for ApiVersion {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => match self.minor.cmp(&other.minor) {
                Ordering::Equal => self.patch.cmp(&other.patch),
                o => o,
            },
            o => o,
        }
    }
}

impl Display for ApiVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The error returned when parsing an [`ApiVersion`] fails.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct VersionParseError {
    input: String,
}

impl Display for VersionParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid version string: {:?}", self.input)
    }
}

impl Error for VersionParseError {}

impl FromStr for ApiVersion {
    type Err = VersionParseError;

    /// Parses `MAJOR`, `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`. Missing parts are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError {
            input: s.to_owned(),
        };

        let mut parts = s.trim().split('.');
        let mut next = |required: bool| match parts.next() {
            Some(part) => part.parse::<u32>().map_err(|_| err()),
            None if required => Err(err()),
            None => Ok(0),
        };

        let version = ApiVersion::new(next(true)?, next(false)?, next(false)?);

        if parts.next().is_some() {
            return Err(err());
        }

        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_versions() {
        assert_eq!("1.2.3".parse(), Ok(ApiVersion::new(1, 2, 3)));
        assert_eq!("2.0".parse(), Ok(ApiVersion::new(2, 0, 0)));
        assert_eq!("4".parse(), Ok(ApiVersion::new(4, 0, 0)));
        assert!("1.2.3.4".parse::<ApiVersion>().is_err());
        assert!("".parse::<ApiVersion>().is_err());
        assert!("1.x".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn orders_component_wise() {
        assert!(ApiVersion::new(1, 10, 0) > ApiVersion::new(1, 9, 42));
        assert!(ApiVersion::new(2, 0, 0) > ApiVersion::new(1, 99, 99));
        assert_eq!(ApiVersion::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn minimum_requires_same_major() {
        let min = ApiVersion::new(2, 1, 0);
        assert!(min.is_satisfied_by(ApiVersion::new(2, 1, 0)));
        assert!(min.is_satisfied_by(ApiVersion::new(2, 4, 1)));
        assert!(!min.is_satisfied_by(ApiVersion::new(2, 0, 9)));
        assert!(!min.is_satisfied_by(ApiVersion::new(3, 0, 0)));
    }
}
