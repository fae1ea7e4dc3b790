use crate::sys::*;
use std::fmt::{Display, Formatter};

/// The status reported by an addon for any lifecycle call.
///
/// This is the recoverable error channel of the boundary: the host decides how to react to
/// anything other than [`Ok`](AddonStatus::Ok).
#[repr(i32)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AddonStatus {
    /// The call succeeded.
    Ok = ADDON_STATUS_OK,
    /// The addon lost its connection to whatever backend it talks to.
    LostConnection = ADDON_STATUS_LOST_CONNECTION,
    /// The addon needs to be restarted.
    NeedRestart = ADDON_STATUS_NEED_RESTART,
    /// The addon needs its settings to be configured first.
    NeedSettings = ADDON_STATUS_NEED_SETTINGS,
    /// An unknown error occurred, or the request was not understood.
    Unknown = ADDON_STATUS_UNKNOWN,
    /// The addon failed in a way that will not recover.
    PermanentFailure = ADDON_STATUS_PERMANENT_FAILURE,
    /// The requested operation is not implemented by this addon.
    NotImplemented = ADDON_STATUS_NOT_IMPLEMENTED,
}

impl AddonStatus {
    #[inline]
    pub const fn from_raw(raw: ADDON_STATUS) -> Option<Self> {
        use AddonStatus::*;

        match raw {
            ADDON_STATUS_OK => Some(Ok),
            ADDON_STATUS_LOST_CONNECTION => Some(LostConnection),
            ADDON_STATUS_NEED_RESTART => Some(NeedRestart),
            ADDON_STATUS_NEED_SETTINGS => Some(NeedSettings),
            ADDON_STATUS_UNKNOWN => Some(Unknown),
            ADDON_STATUS_PERMANENT_FAILURE => Some(PermanentFailure),
            ADDON_STATUS_NOT_IMPLEMENTED => Some(NotImplemented),
            _ => None,
        }
    }

    #[inline]
    pub const fn to_raw(self) -> ADDON_STATUS {
        self as _
    }

    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, AddonStatus::Ok)
    }

    /// The fixed, human-readable label of this status.
    pub const fn label(self) -> &'static str {
        match self {
            AddonStatus::Ok => "OK",
            AddonStatus::LostConnection => "Lost Connection",
            AddonStatus::NeedRestart => "Need Restart",
            AddonStatus::NeedSettings => "Need Settings",
            AddonStatus::Unknown => "Unknown error",
            AddonStatus::PermanentFailure => "Permanent failure",
            AddonStatus::NotImplemented => "Not implemented",
        }
    }
}

impl Display for AddonStatus {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns the label of a raw status code, or `"Unknown"` if it is outside the vocabulary.
pub fn translate_status(raw: ADDON_STATUS) -> &'static str {
    match AddonStatus::from_raw(raw) {
        Some(status) => status.label(),
        None => "Unknown",
    }
}
