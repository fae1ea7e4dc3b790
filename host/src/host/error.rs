use kaddon_common::addon_type::AddonType;
use std::error::Error;
use std::fmt;

/// All errors that can arise when loading and driving an addon.
#[derive(Debug)]
pub enum HostError {
    /// A string to send to the addon contained an interior NUL byte.
    NulString,
    /// The addon was already created.
    AlreadyCreated,
    /// The addon is not created, or was already destroyed.
    NotCreated,
    /// The addon did not register the given function.
    ///
    /// This is a sign of a misbehaving addon implementation.
    MissingAddonFunction(&'static str),
    /// The addon declares no version for the given type.
    UnknownType(AddonType),
    /// The dynamic library could not be loaded, or lacks an entry point.
    #[cfg(feature = "libloading")]
    LibraryLoadingError(libloading::Error),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NulString => write!(f, "String contains an interior NUL byte"),
            Self::AlreadyCreated => write!(f, "Addon was already created"),
            Self::NotCreated => write!(f, "Addon is not created"),
            Self::MissingAddonFunction(name) => {
                write!(f, "Addon did not register its '{name}' function")
            }
            Self::UnknownType(addon_type) => {
                write!(f, "Addon declares no version for type {addon_type}")
            }
            #[cfg(feature = "libloading")]
            Self::LibraryLoadingError(e) => write!(f, "Failed to load addon library: {e}"),
        }
    }
}

impl Error for HostError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            #[cfg(feature = "libloading")]
            Self::LibraryLoadingError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::ffi::NulError> for HostError {
    #[inline]
    fn from(_: std::ffi::NulError) -> Self {
        Self::NulString
    }
}
