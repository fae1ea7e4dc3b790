//! Loading and driving of a single addon.
//!
//! A [`LoadedAddon`] owns everything the addon is handed at creation: the interface table, the
//! host's function table (backed by a [`Host`] implementation), and the function table the addon
//! registers itself into. It can be built from a static [`AddonEntryDescriptor`] (addons built into
//! the host's binary), or from a dynamic library using [`LoadedAddon::load`].
//!
//! # Example
//!
//! ```no_run
//! # pub fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kaddon_host::prelude::*;
//!
//! struct MyHost;
//! impl Host for MyHost {}
//!
//! let mut addon = unsafe { LoadedAddon::load("/usr/lib/addons/pvr.demo.so", MyHost)? };
//! let status = addon.create("1.0.14")?;
//!
//! println!("Addon created with status: {status}");
//! # Ok(()) }
//! ```
//!
//! # Safety
//!
//! Loading an addon is inherently unsafe: the safe APIs of this type protect the host
//! implementation from misuse, not from a non-compliant addon.

use crate::host::{Host, HostError};
use crate::setting::SettingInput;
use callbacks::HostData;
use kaddon_common::addon_type::AddonType;
use kaddon_common::entry::AddonEntryDescriptor;
use kaddon_common::handle::{HostInstanceHandle, InstanceHandle};
use kaddon_common::status::AddonStatus;
use kaddon_common::sys::*;
use kaddon_common::version::ApiVersion;
use std::ffi::{CStr, CString, c_char};
use std::ptr::{NonNull, addr_of_mut};

mod callbacks;

#[cfg(feature = "libloading")]
mod library;

/// Everything the addon may point into. Allocated once, so that addresses never change.
struct Shared<H: Host> {
    interface: AddonGlobalInterface,
    to_kodi: AddonToKodiFuncTable_Addon,
    to_addon: KodiToAddonFuncTable_Addon,
    host: HostData<H>,
}

/// A loaded addon, and the tables it was (or will be) created with.
///
/// The addon is destroyed when this is dropped, if it was created.
pub struct LoadedAddon<H: Host> {
    entry: addon_entry,
    shared: NonNull<Shared<H>>,
    _lib_path: CString,
    created: bool,
    #[cfg(feature = "libloading")]
    _library: Option<library::AddonLibrary>,
}

impl<H: Host> LoadedAddon<H> {
    /// Prepares an addon from a static entry descriptor, typically built with the addon crate's
    /// `kaddon_entry!` macro.
    ///
    /// `lib_path` is reported to the addon as the directory its library lives in.
    ///
    /// # Safety
    ///
    /// The descriptor's functions must implement the addon ABI.
    pub unsafe fn from_descriptor(
        entry: &'static AddonEntryDescriptor,
        host: H,
        lib_path: &str,
    ) -> Result<Self, HostError> {
        Self::from_entry(*entry.as_raw(), host, CString::new(lib_path)?)
    }

    /// Loads an addon from a dynamic library, resolving its entry points by symbol name.
    ///
    /// # Safety
    ///
    /// Loading a library runs its initialization code, and its entry points are trusted to
    /// implement the addon ABI.
    #[cfg(feature = "libloading")]
    pub unsafe fn load(path: impl AsRef<std::path::Path>, host: H) -> Result<Self, HostError> {
        let path = path.as_ref();
        // SAFETY: upheld by the caller
        let library = unsafe { library::AddonLibrary::load(path.as_os_str()) }?;

        let lib_path = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut addon = Self::from_entry(library.entry(), host, CString::new(lib_path)?)?;
        addon._library = Some(library);
        Ok(addon)
    }

    fn from_entry(entry: addon_entry, host: H, lib_path: CString) -> Result<Self, HostError> {
        let shared = Box::new(Shared {
            interface: AddonGlobalInterface {
                lib_base_path: lib_path.as_ptr(),
                addon_base: core::ptr::null_mut(),
                global_single_instance: core::ptr::null_mut(),
                first_kodi_instance: core::ptr::null_mut(),
                to_kodi: core::ptr::null_mut(),
                to_addon: core::ptr::null_mut(),
            },
            to_kodi: callbacks::to_kodi_table::<H>(core::ptr::null_mut()),
            to_addon: KodiToAddonFuncTable_Addon::default(),
            host: HostData::new(host),
        });

        let shared = Box::into_raw(shared);

        // SAFETY: the pointer was just allocated, and is not shared yet
        unsafe {
            (*shared).interface.to_kodi = addr_of_mut!((*shared).to_kodi);
            (*shared).interface.to_addon = addr_of_mut!((*shared).to_addon);
            (*shared).to_kodi.kodi_base = addr_of_mut!((*shared).host).cast();
        }

        Ok(Self {
            entry,
            // SAFETY: Box::into_raw never returns null
            shared: unsafe { NonNull::new_unchecked(shared) },
            _lib_path: lib_path,
            created: false,
            #[cfg(feature = "libloading")]
            _library: None,
        })
    }

    #[inline]
    fn shared(&self) -> &Shared<H> {
        // SAFETY: the allocation lives as long as self. The addon only writes into it during create
        unsafe { self.shared.as_ref() }
    }

    #[inline]
    fn interface_mut(&mut self) -> *mut AddonGlobalInterface {
        // SAFETY: the allocation lives as long as self
        unsafe { addr_of_mut!((*self.shared.as_ptr()).interface) }
    }

    /// The host implementation the addon talks to.
    #[inline]
    pub fn host(&self) -> &H {
        &self.shared().host.host
    }

    /// The number of strings given to the addon that it has not freed yet.
    #[inline]
    pub fn outstanding_strings(&self) -> usize {
        self.shared().host.outstanding_strings()
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Sets the host handle of the first instance, used by addons running in single-instance mode.
    ///
    /// This must be set before [`create`](Self::create) to have any effect on such addons.
    pub fn set_first_instance(&mut self, handle: HostInstanceHandle) {
        // SAFETY: the interface is valid, and the addon is not running
        unsafe { (*self.interface_mut()).first_kodi_instance = handle.as_raw() };
    }

    /// Creates the addon.
    ///
    /// Once this returns (with any status), the addon must be destroyed, which happens on drop.
    pub fn create(&mut self, api_version: &str) -> Result<AddonStatus, HostError> {
        if self.created {
            return Err(HostError::AlreadyCreated);
        }

        let api_version = CString::new(api_version)?;
        self.created = true;

        // SAFETY: the interface is fully initialized and stays valid until destroy
        let status = unsafe {
            (self.entry.create)(
                self.interface_mut().cast(),
                api_version.as_ptr(),
                core::ptr::null_mut(),
            )
        };

        Ok(read_status(status))
    }

    fn to_addon(&self) -> Result<&KodiToAddonFuncTable_Addon, HostError> {
        if !self.created {
            return Err(HostError::NotCreated);
        }

        Ok(&self.shared().to_addon)
    }

    /// The handle the addon published for its root object.
    #[inline]
    pub fn addon_base(&self) -> Option<InstanceHandle> {
        InstanceHandle::from_raw(self.shared().interface.addon_base)
    }

    /// The handle of the addon's global single instance, if it runs in single-instance mode.
    #[inline]
    pub fn global_single_instance(&self) -> Option<InstanceHandle> {
        InstanceHandle::from_raw(self.shared().interface.global_single_instance)
    }

    pub fn status(&self) -> Result<AddonStatus, HostError> {
        let get_status = self
            .to_addon()?
            .get_status
            .ok_or(HostError::MissingAddonFunction("get_status"))?;

        // SAFETY: the addon is created
        Ok(read_status(unsafe { get_status() }))
    }

    /// Pushes a new value for one of the addon's settings.
    pub fn set_setting(
        &mut self,
        name: &str,
        value: &SettingInput,
    ) -> Result<AddonStatus, HostError> {
        let set_setting = self
            .to_addon()?
            .set_setting
            .ok_or(HostError::MissingAddonFunction("set_setting"))?;

        let name = CString::new(name)?;

        // SAFETY: the addon is created, and both pointers stay valid for the duration of the call
        Ok(read_status(unsafe {
            set_setting(name.as_ptr(), value.as_ptr())
        }))
    }

    /// Asks the addon for a new instance.
    ///
    /// Returns the addon's status, and the addon's handle to the new instance if one was created.
    pub fn create_instance(
        &mut self,
        instance_type: AddonType,
        instance_id: &str,
        host_instance: HostInstanceHandle,
        version: &str,
        parent: Option<InstanceHandle>,
    ) -> Result<(AddonStatus, Option<InstanceHandle>), HostError> {
        let create_instance = self
            .to_addon()?
            .create_instance
            .ok_or(HostError::MissingAddonFunction("create_instance"))?;

        let instance_id = CString::new(instance_id)?;
        let version = CString::new(version)?;
        let mut addon_instance: KODI_HANDLE = core::ptr::null_mut();

        // SAFETY: the addon is created, and all pointers stay valid for the duration of the call
        let status = unsafe {
            create_instance(
                instance_type.to_raw(),
                instance_id.as_ptr(),
                host_instance.as_raw(),
                version.as_ptr(),
                &mut addon_instance,
                parent.map_or(core::ptr::null_mut(), InstanceHandle::to_raw),
            )
        };

        Ok((read_status(status), InstanceHandle::from_raw(addon_instance)))
    }

    /// Destroys an instance created by [`create_instance`](Self::create_instance).
    pub fn destroy_instance(
        &mut self,
        instance_type: AddonType,
        handle: InstanceHandle,
    ) -> Result<(), HostError> {
        let destroy_instance = self
            .to_addon()?
            .destroy_instance
            .ok_or(HostError::MissingAddonFunction("destroy_instance"))?;

        // SAFETY: the addon is created
        unsafe { destroy_instance(instance_type.to_raw(), handle.to_raw()) };
        Ok(())
    }

    /// The version of the given type the addon was built against.
    pub fn type_version(&self, addon_type: AddonType) -> String {
        // SAFETY: this entry point can be called at any time
        read_version(unsafe { (self.entry.get_type_version)(addon_type.to_raw()) })
    }

    /// The oldest version of the given type the addon accepts.
    pub fn type_min_version(&self, addon_type: AddonType) -> String {
        // SAFETY: this entry point can be called at any time
        read_version(unsafe { (self.entry.get_type_min_version)(addon_type.to_raw()) })
    }

    /// Parses the version of the given type the addon was built against.
    ///
    /// Returns [`HostError::UnknownType`] if the addon reports no usable version for it.
    pub fn type_api_version(&self, addon_type: AddonType) -> Result<ApiVersion, HostError> {
        match self.type_version(addon_type).parse::<ApiVersion>() {
            Ok(version) if version != ApiVersion::UNKNOWN => Ok(version),
            _ => Err(HostError::UnknownType(addon_type)),
        }
    }

    /// Checks whether the addon's version of a type falls into the range the host supports.
    pub fn is_type_compatible(
        &self,
        addon_type: AddonType,
        host_min_version: ApiVersion,
        host_version: ApiVersion,
    ) -> bool {
        self.type_api_version(addon_type)
            .is_ok_and(|version| host_min_version <= version && version <= host_version)
    }

    /// Destroys the addon. Does nothing if it is not created.
    pub fn destroy(&mut self) {
        if !self.created {
            return;
        }

        self.created = false;
        // SAFETY: the addon is created, and destroyed exactly once
        unsafe { (self.entry.destroy)() };
    }
}

impl<H: Host> Drop for LoadedAddon<H> {
    fn drop(&mut self) {
        self.destroy();

        // SAFETY: the allocation came from Box::into_raw, and the addon no longer uses it
        drop(unsafe { Box::from_raw(self.shared.as_ptr()) });
    }
}

fn read_status(raw: ADDON_STATUS) -> AddonStatus {
    AddonStatus::from_raw(raw).unwrap_or(AddonStatus::Unknown)
}

fn read_version(raw: *const c_char) -> String {
    if raw.is_null() {
        return String::new();
    }

    // SAFETY: type versions are static NUL-terminated strings
    unsafe { CStr::from_ptr(raw) }
        .to_string_lossy()
        .into_owned()
}
