use crate::sys::*;

/// The severity of a message sent to the host's log.
#[repr(i32)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum AddonLog {
    Debug = ADDON_LOG_DEBUG,
    Info = ADDON_LOG_INFO,
    Warning = ADDON_LOG_WARNING,
    Error = ADDON_LOG_ERROR,
    Fatal = ADDON_LOG_FATAL,
}

impl AddonLog {
    pub fn from_raw(raw: ADDON_LOG) -> Option<Self> {
        use AddonLog::*;

        match raw {
            ADDON_LOG_DEBUG => Some(Debug),
            ADDON_LOG_INFO => Some(Info),
            ADDON_LOG_WARNING => Some(Warning),
            ADDON_LOG_ERROR => Some(Error),
            ADDON_LOG_FATAL => Some(Fatal),
            _ => None,
        }
    }

    #[inline]
    pub fn to_raw(self) -> ADDON_LOG {
        self as _
    }

    pub fn label(self) -> &'static str {
        match self {
            AddonLog::Debug => "DEBUG",
            AddonLog::Info => "INFO",
            AddonLog::Warning => "WARNING",
            AddonLog::Error => "ERROR",
            AddonLog::Fatal => "FATAL",
        }
    }
}
