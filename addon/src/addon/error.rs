use kaddon_common::status::AddonStatus;
use std::error::Error;
use std::ffi::NulError;
use std::fmt::{Debug, Display, Formatter};

/// An error an addon can report while being constructed or talking to the host.
///
/// At the boundary, every such error is logged and reported to the host as
/// [`AddonStatus::PermanentFailure`], unless it carries its own status.
#[derive(Debug)]
pub enum AddonError {
    /// A string handed to the host contained an interior NUL byte.
    Nul(NulError),
    /// The host did not provide a function the addon requires.
    MissingHostFunction(&'static str),
    /// A failure that maps to a specific status code.
    Status(AddonStatus),
    Io(std::io::Error),
    Custom(Box<dyn Error + 'static>),
}

impl AddonError {
    /// The status to report to the host for this error.
    pub fn status(&self) -> AddonStatus {
        match self {
            AddonError::Status(status) => *status,
            _ => AddonStatus::PermanentFailure,
        }
    }
}

impl Display for AddonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AddonError::Nul(e) => write!(f, "Failed to encode string for the host: {e}"),
            AddonError::MissingHostFunction(name) => {
                write!(f, "Host does not provide the required function '{name}'")
            }
            AddonError::Status(status) => write!(f, "Addon failed with status: {status}"),
            AddonError::Io(e) => Display::fmt(&e, f),
            AddonError::Custom(e) => Display::fmt(&e, f),
        }
    }
}

impl Error for AddonError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AddonError::Nul(e) => Some(e),
            AddonError::Io(e) => Some(e),
            AddonError::Custom(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<NulError> for AddonError {
    #[inline]
    fn from(e: NulError) -> Self {
        AddonError::Nul(e)
    }
}

impl From<std::io::Error> for AddonError {
    #[inline]
    fn from(e: std::io::Error) -> Self {
        AddonError::Io(e)
    }
}

impl From<AddonStatus> for AddonError {
    #[inline]
    fn from(status: AddonStatus) -> Self {
        AddonError::Status(status)
    }
}
