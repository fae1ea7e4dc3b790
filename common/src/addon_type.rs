use crate::version::ApiVersion;
use std::ffi::{CStr, c_int};
use std::fmt::{Display, Formatter};

/// The type tag of an addon part: either one of the global interfaces, or an instance type.
///
/// This is a plain integer on the wire. It is kept as an open newtype rather than an enum, so that
/// tags unknown to this side still round-trip and compare by value.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct AddonType(pub c_int);

impl AddonType {
    pub const GLOBAL_MAIN: AddonType = AddonType(0);
    pub const GLOBAL_GUI: AddonType = AddonType(1);
    pub const GLOBAL_AUDIOENGINE: AddonType = AddonType(2);
    pub const GLOBAL_GENERAL: AddonType = AddonType(3);
    pub const GLOBAL_NETWORK: AddonType = AddonType(4);
    pub const GLOBAL_FILESYSTEM: AddonType = AddonType(5);

    pub const INSTANCE_AUDIODECODER: AddonType = AddonType(102);
    pub const INSTANCE_AUDIOENCODER: AddonType = AddonType(103);
    pub const INSTANCE_GAME: AddonType = AddonType(104);
    pub const INSTANCE_INPUTSTREAM: AddonType = AddonType(105);
    pub const INSTANCE_PERIPHERAL: AddonType = AddonType(106);
    pub const INSTANCE_PVR: AddonType = AddonType(107);
    pub const INSTANCE_SCREENSAVER: AddonType = AddonType(108);
    pub const INSTANCE_VISUALIZATION: AddonType = AddonType(109);
    pub const INSTANCE_VFS: AddonType = AddonType(110);
    pub const INSTANCE_IMAGEDECODER: AddonType = AddonType(111);
    pub const INSTANCE_VIDEOCODEC: AddonType = AddonType(112);

    #[inline]
    pub const fn from_raw(raw: c_int) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> c_int {
        self.0
    }

    #[inline]
    pub const fn is_global(self) -> bool {
        self.0 >= Self::GLOBAL_MAIN.0 && self.0 <= Self::GLOBAL_FILESYSTEM.0
    }

    #[inline]
    pub const fn is_instance(self) -> bool {
        self.0 >= Self::INSTANCE_AUDIODECODER.0 && self.0 <= Self::INSTANCE_VIDEOCODEC.0
    }

    /// A short name for this type, if it is a known one.
    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::GLOBAL_MAIN => "main",
            Self::GLOBAL_GUI => "gui",
            Self::GLOBAL_AUDIOENGINE => "audioengine",
            Self::GLOBAL_GENERAL => "general",
            Self::GLOBAL_NETWORK => "network",
            Self::GLOBAL_FILESYSTEM => "filesystem",
            Self::INSTANCE_AUDIODECODER => "audiodecoder",
            Self::INSTANCE_AUDIOENCODER => "audioencoder",
            Self::INSTANCE_GAME => "game",
            Self::INSTANCE_INPUTSTREAM => "inputstream",
            Self::INSTANCE_PERIPHERAL => "peripheral",
            Self::INSTANCE_PVR => "pvr",
            Self::INSTANCE_SCREENSAVER => "screensaver",
            Self::INSTANCE_VISUALIZATION => "visualization",
            Self::INSTANCE_VFS => "vfs",
            Self::INSTANCE_IMAGEDECODER => "imagedecoder",
            Self::INSTANCE_VIDEOCODEC => "videocodec",
            _ => return None,
        })
    }
}

impl From<c_int> for AddonType {
    #[inline]
    fn from(raw: c_int) -> Self {
        Self(raw)
    }
}

impl Display for AddonType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "unknown type ({})", self.0),
        }
    }
}

/// The version an addon was built against for a given type, and the oldest one it still accepts.
#[derive(Copy, Clone, Debug)]
pub struct TypeVersion {
    pub addon_type: AddonType,
    pub version: &'static CStr,
    pub min_version: &'static CStr,
}

impl TypeVersion {
    #[inline]
    pub const fn new(
        addon_type: AddonType,
        version: &'static CStr,
        min_version: &'static CStr,
    ) -> Self {
        Self {
            addon_type,
            version,
            min_version,
        }
    }

    /// Parses the version. Entries with a malformed version string report [`ApiVersion::UNKNOWN`].
    pub fn version(&self) -> ApiVersion {
        parse_or_unknown(self.version)
    }

    /// Parses the minimum version.
    ///
    /// Entries with a malformed version string report [`ApiVersion::UNKNOWN`].
    pub fn min_version(&self) -> ApiVersion {
        parse_or_unknown(self.min_version)
    }

    /// Finds the entry for a given type in a version table.
    pub fn lookup(table: &[TypeVersion], addon_type: AddonType) -> Option<&TypeVersion> {
        table.iter().find(|v| v.addon_type == addon_type)
    }
}

fn parse_or_unknown(raw: &CStr) -> ApiVersion {
    raw.to_str()
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(ApiVersion::UNKNOWN)
}

/// The string reported for types missing from a version table.
pub const UNKNOWN_TYPE_VERSION: &CStr = c"0.0.0";

/// The type versions this crate's ABI definitions correspond to.
pub const DEFAULT_TYPE_VERSIONS: &[TypeVersion] = &[
    TypeVersion::new(AddonType::GLOBAL_MAIN, c"1.0.14", c"1.0.12"),
    TypeVersion::new(AddonType::GLOBAL_GUI, c"5.14.0", c"5.14.0"),
    TypeVersion::new(AddonType::GLOBAL_AUDIOENGINE, c"1.1.0", c"1.1.0"),
    TypeVersion::new(AddonType::GLOBAL_GENERAL, c"1.0.4", c"1.0.4"),
    TypeVersion::new(AddonType::GLOBAL_NETWORK, c"1.0.4", c"1.0.0"),
    TypeVersion::new(AddonType::GLOBAL_FILESYSTEM, c"1.1.3", c"1.1.3"),
    TypeVersion::new(AddonType::INSTANCE_AUDIODECODER, c"2.0.1", c"2.0.1"),
    TypeVersion::new(AddonType::INSTANCE_AUDIOENCODER, c"2.0.1", c"2.0.1"),
    TypeVersion::new(AddonType::INSTANCE_GAME, c"2.1.0", c"2.1.0"),
    TypeVersion::new(AddonType::INSTANCE_INPUTSTREAM, c"2.3.0", c"2.3.0"),
    TypeVersion::new(AddonType::INSTANCE_PERIPHERAL, c"1.3.8", c"1.3.4"),
    TypeVersion::new(AddonType::INSTANCE_PVR, c"6.5.1", c"6.5.1"),
    TypeVersion::new(AddonType::INSTANCE_SCREENSAVER, c"2.0.1", c"2.0.1"),
    TypeVersion::new(AddonType::INSTANCE_VISUALIZATION, c"2.0.1", c"2.0.1"),
    TypeVersion::new(AddonType::INSTANCE_VFS, c"2.3.0", c"2.3.0"),
    TypeVersion::new(AddonType::INSTANCE_IMAGEDECODER, c"2.0.0", c"2.0.0"),
    TypeVersion::new(AddonType::INSTANCE_VIDEOCODEC, c"1.0.2", c"1.0.1"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_well_formed() {
        for entry in DEFAULT_TYPE_VERSIONS {
            assert_ne!(entry.version(), ApiVersion::UNKNOWN, "{}", entry.addon_type);
            assert!(entry.min_version() <= entry.version(), "{}", entry.addon_type);
            assert!(entry.addon_type.is_global() || entry.addon_type.is_instance());
        }
    }

    #[test]
    fn lookup_by_tag() {
        let entry = TypeVersion::lookup(DEFAULT_TYPE_VERSIONS, AddonType::INSTANCE_SCREENSAVER);
        assert_eq!(entry.unwrap().version(), ApiVersion::new(2, 0, 1));
        assert!(TypeVersion::lookup(DEFAULT_TYPE_VERSIONS, AddonType(42)).is_none());
    }

    #[test]
    fn unknown_tags_display_their_value() {
        assert_eq!(AddonType(42).to_string(), "unknown type (42)");
        assert_eq!(AddonType::INSTANCE_PVR.to_string(), "pvr (107)");
    }
}
