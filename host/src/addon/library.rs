use crate::host::HostError;
use kaddon_common::sys::*;
use libloading::Library;
use std::ffi::{CStr, OsStr};

/// A loaded addon library, along with the entry points resolved from it.
pub(crate) struct AddonLibrary {
    entry: addon_entry,
    _library: Library,
}

impl AddonLibrary {
    /// # Safety
    /// Loading a library runs its initialization code, and the resolved symbols are trusted to have
    /// the expected signatures.
    pub unsafe fn load(path: &OsStr) -> Result<Self, HostError> {
        // SAFETY: upheld by the caller
        let library = unsafe { Library::new(path) }.map_err(HostError::LibraryLoadingError)?;

        let entry = addon_entry {
            create: symbol(&library, ADDON_CREATE_SYMBOL)?,
            destroy: symbol(&library, ADDON_DESTROY_SYMBOL)?,
            get_status: symbol(&library, ADDON_GET_STATUS_SYMBOL)?,
            set_setting: symbol(&library, ADDON_SET_SETTING_SYMBOL)?,
            get_type_version: symbol(&library, ADDON_GET_TYPE_VERSION_SYMBOL)?,
            get_type_min_version: symbol(&library, ADDON_GET_TYPE_MIN_VERSION_SYMBOL)?,
        };

        Ok(Self {
            entry,
            _library: library,
        })
    }

    #[inline]
    pub fn entry(&self) -> addon_entry {
        self.entry
    }
}

/// # Safety
/// The symbol must have type `T`.
unsafe fn symbol<T: Copy>(library: &Library, name: &CStr) -> Result<T, HostError> {
    // SAFETY: the caller guarantees the symbol's type
    let symbol = unsafe { library.get::<T>(name.to_bytes_with_nul()) }
        .map_err(HostError::LibraryLoadingError)?;

    Ok(*symbol)
}
