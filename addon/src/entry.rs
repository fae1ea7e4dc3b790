//! The module entry points exposed to the host.
//!
//! The host talks to an addon through free C functions that carry no context pointer. Each addon
//! type therefore gets its own [`EntrySlot`], a static holding the [`AddonContext`] between the
//! host's `create` and `destroy` calls. The [`kaddon_entry!`](crate::kaddon_entry) macro declares
//! such a slot and returns the matching [`AddonEntryDescriptor`], and
//! [`kaddon_export_entry!`](crate::kaddon_export_entry) exports it under the symbol names hosts
//! look up.
//!
//! # Example
//!
//! ```
//! use kaddon::prelude::*;
//!
//! pub struct MyAddon;
//!
//! impl Addon for MyAddon {
//!     fn new(_host: HostHandle) -> Result<Self, AddonError> {
//!         Ok(Self)
//!     }
//! }
//!
//! kaddon_export_entry!(MyAddon);
//! ```

use crate::addon::Addon;
use crate::dispatch::AddonContext;
use crate::host::HostHandle;
use crate::internal_utils::{guard, str_from_host};
use crate::logging::{self, HostLogger};
use kaddon_common::addon_type::{AddonType, TypeVersion, UNKNOWN_TYPE_VERSION};
use kaddon_common::handle::{HostInstanceHandle, InstanceHandle};
use kaddon_common::setting::SettingValue;
use kaddon_common::status::AddonStatus;
use kaddon_common::sys::*;
use parking_lot::Mutex;
use std::ffi::{c_char, c_int, c_void};

pub use kaddon_common::entry::AddonEntryDescriptor;

/// Ties an addon type to the static slot holding its context.
///
/// This is implemented by the [`kaddon_entry!`](crate::kaddon_entry) macro, and should not need to
/// be implemented manually.
pub trait AddonEntry: 'static {
    type Addon: Addon;

    fn slot() -> &'static EntrySlot<Self::Addon>;
}

/// Holds the context of a created addon, between the host's `create` and `destroy` calls.
///
/// Every access only tries to lock the slot: a host calling back into the addon while another
/// entry point is still running gets rejected (and logged) instead of blocking forever.
pub struct EntrySlot<A: Addon> {
    context: Mutex<Option<AddonContext<A>>>,
}

impl<A: Addon> EntrySlot<A> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            context: parking_lot::const_mutex(None),
        }
    }

    /// Returns `true` if the addon is currently created.
    ///
    /// An addon currently running one of its entry points is reported as created.
    #[inline]
    pub fn is_created(&self) -> bool {
        self.context.try_lock().is_none_or(|context| context.is_some())
    }

    /// Returns `false` if the slot is busy, in which case `context` is dropped.
    fn install(&self, context: AddonContext<A>) -> bool {
        let Some(mut slot) = self.context.try_lock() else {
            log::error!("Host re-entered the addon during 'create'");
            return false;
        };

        if slot.replace(context).is_some() {
            log::warn!("Addon was created twice, dropping the previous instance");
        }

        true
    }

    fn take(&self) -> Option<AddonContext<A>> {
        let Some(mut slot) = self.context.try_lock() else {
            log::error!("Host re-entered the addon during 'destroy'");
            return None;
        };

        let context = slot.take();
        if context.is_none() {
            log::warn!("Host destroyed an addon that is not created");
        }

        context
    }

    /// Runs `f` on the context. Returns `default` if there is no context, or if it is already in
    /// use further up the stack.
    fn with<R>(
        &self,
        operation: &'static str,
        default: R,
        f: impl FnOnce(&mut AddonContext<A>) -> R,
    ) -> R {
        let Some(mut context) = self.context.try_lock() else {
            log::error!("Host re-entered the addon during '{operation}'");
            return default;
        };

        match context.as_mut() {
            Some(context) => f(context),
            None => {
                log::error!("Host called '{operation}' on an addon that is not created");
                default
            }
        }
    }
}

impl<A: Addon> Default for EntrySlot<A> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the entry points for an [`AddonEntry`] implementation.
pub const fn descriptor<E: AddonEntry>() -> AddonEntryDescriptor {
    AddonEntryDescriptor::new(addon_entry {
        create: create::<E>,
        destroy: destroy::<E>,
        get_status: get_status::<E>,
        set_setting: set_setting::<E>,
        get_type_version: get_type_version::<E>,
        get_type_min_version: get_type_min_version::<E>,
    })
}

unsafe extern "C" fn create<E: AddonEntry>(
    addon_interface: KODI_HANDLE,
    global_api_version: *const c_char,
    _unused: *mut c_void,
) -> ADDON_STATUS {
    guard("create", AddonStatus::PermanentFailure, || {
        let Some(host) = HostHandle::from_raw(addon_interface.cast()) else {
            log::error!("Host did not provide an interface table");
            return AddonStatus::PermanentFailure;
        };

        HostLogger::install();
        // Unbound again on any early return or panic, until the context is installed.
        let binding = logging::bind(host);

        log::debug!(
            "Creating addon for host API version '{}'",
            str_from_host(global_api_version)
        );

        let context = match AddonContext::<E::Addon>::new(host) {
            Ok(context) => context,
            Err(e) => {
                log::error!("Failed to create addon: {e}");
                return e.status();
            }
        };

        let registered = host.register_to_addon(KodiToAddonFuncTable_Addon {
            destroy: Some(destroy::<E>),
            get_status: Some(get_status::<E>),
            create_instance: Some(create_instance::<E>),
            destroy_instance: Some(destroy_instance::<E>),
            set_setting: Some(set_setting::<E>),
        });

        if !registered {
            log::error!("Host did not provide a function table to register the addon into");
            return AddonStatus::PermanentFailure;
        }

        let single_instance = context.single_instance().map(|_| InstanceHandle::ROOT);
        if !E::slot().install(context) {
            return AddonStatus::Unknown;
        }

        binding.keep();
        host.set_addon_base(Some(InstanceHandle::ROOT));
        host.set_global_single_instance(single_instance);

        E::slot().with("create", AddonStatus::Unknown, |context| context.create())
    })
    .to_raw()
}

unsafe extern "C" fn destroy<E: AddonEntry>() {
    guard("destroy", (), || {
        let Some(context) = E::slot().take() else {
            return;
        };

        let host = context.host();
        context.destroy();

        host.set_addon_base(None);
        host.set_global_single_instance(None);
        logging::unbind(host);
    })
}

unsafe extern "C" fn get_status<E: AddonEntry>() -> ADDON_STATUS {
    guard("get_status", AddonStatus::PermanentFailure, || {
        E::slot().with("get_status", AddonStatus::Unknown, |context| {
            context.status()
        })
    })
    .to_raw()
}

unsafe extern "C" fn set_setting<E: AddonEntry>(
    setting_name: *const c_char,
    setting_value: *const c_void,
) -> ADDON_STATUS {
    guard("set_setting", AddonStatus::PermanentFailure, || {
        if setting_name.is_null() {
            log::error!("Host pushed a setting without a name");
            return AddonStatus::Unknown;
        }

        let name = str_from_host(setting_name);
        let value = SettingValue::from_raw(setting_value);

        E::slot().with("set_setting", AddonStatus::Unknown, |context| {
            context.set_setting(&name, value)
        })
    })
    .to_raw()
}

unsafe extern "C" fn create_instance<E: AddonEntry>(
    instance_type: c_int,
    instance_id: *const c_char,
    instance: KODI_HANDLE,
    version: *const c_char,
    addon_instance: *mut KODI_HANDLE,
    parent: KODI_HANDLE,
) -> ADDON_STATUS {
    guard("create_instance", AddonStatus::PermanentFailure, || {
        if addon_instance.is_null() {
            log::error!("Host did not provide a location for the new instance");
            return AddonStatus::Unknown;
        }
        addon_instance.write(core::ptr::null_mut());

        let instance_id = str_from_host(instance_id);
        let version = str_from_host(version);

        let (status, handle) =
            E::slot().with("create_instance", (AddonStatus::Unknown, None), |context| {
                context.create_instance(
                    AddonType::from_raw(instance_type),
                    &instance_id,
                    HostInstanceHandle::from_raw(instance),
                    &version,
                    InstanceHandle::from_raw(parent),
                )
            });

        if let Some(handle) = handle {
            addon_instance.write(handle.to_raw());
        }

        status
    })
    .to_raw()
}

unsafe extern "C" fn destroy_instance<E: AddonEntry>(instance_type: c_int, instance: KODI_HANDLE) {
    guard("destroy_instance", (), || {
        E::slot().with("destroy_instance", (), |context| {
            context.destroy_instance(
                AddonType::from_raw(instance_type),
                InstanceHandle::from_raw(instance),
            )
        })
    })
}

unsafe extern "C" fn get_type_version<E: AddonEntry>(addon_type: c_int) -> *const c_char {
    TypeVersion::lookup(
        <E::Addon as Addon>::type_versions(),
        AddonType::from_raw(addon_type),
    )
    .map_or(UNKNOWN_TYPE_VERSION, |v| v.version)
    .as_ptr()
}

unsafe extern "C" fn get_type_min_version<E: AddonEntry>(addon_type: c_int) -> *const c_char {
    TypeVersion::lookup(
        <E::Addon as Addon>::type_versions(),
        AddonType::from_raw(addon_type),
    )
    .map_or(UNKNOWN_TYPE_VERSION, |v| v.min_version)
    .as_ptr()
}

/// Declares the static context slot of an [`Addon`] type, and evaluates to its
/// [`AddonEntryDescriptor`].
///
/// Each invocation declares its own slot: two descriptors created from two invocations are two
/// fully independent addons.
///
/// ```
/// use kaddon::prelude::*;
///
/// struct MyAddon;
///
/// impl Addon for MyAddon {
///     fn new(_host: HostHandle) -> Result<Self, AddonError> {
///         Ok(Self)
///     }
/// }
///
/// static ENTRY: AddonEntryDescriptor = kaddon_entry!(MyAddon);
/// ```
#[macro_export]
macro_rules! kaddon_entry {
    ($addon:ty) => {{
        struct __KaddonEntry;

        static __KADDON_SLOT: $crate::entry::EntrySlot<$addon> = $crate::entry::EntrySlot::new();

        impl $crate::entry::AddonEntry for __KaddonEntry {
            type Addon = $addon;

            #[inline]
            fn slot() -> &'static $crate::entry::EntrySlot<$addon> {
                &__KADDON_SLOT
            }
        }

        $crate::entry::descriptor::<__KaddonEntry>()
    }};
}

/// Exports the entry points of an [`Addon`] type under the symbol names hosts look up.
///
/// This must only be used once per dynamic library.
#[macro_export]
macro_rules! kaddon_export_entry {
    ($addon:ty) => {
        #[allow(non_upper_case_globals, missing_docs)]
        pub static KADDON_ENTRY: $crate::entry::AddonEntryDescriptor =
            $crate::kaddon_entry!($addon);

        #[allow(non_snake_case, missing_docs)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn ADDON_Create(
            addon_interface: $crate::sys::KODI_HANDLE,
            global_api_version: *const ::core::ffi::c_char,
            unused: *mut ::core::ffi::c_void,
        ) -> $crate::sys::ADDON_STATUS {
            // SAFETY: forwarded as-is from the host
            unsafe { (KADDON_ENTRY.as_raw().create)(addon_interface, global_api_version, unused) }
        }

        #[allow(non_snake_case, missing_docs)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn ADDON_Destroy() {
            // SAFETY: forwarded as-is from the host
            unsafe { (KADDON_ENTRY.as_raw().destroy)() }
        }

        #[allow(non_snake_case, missing_docs)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn ADDON_GetStatus() -> $crate::sys::ADDON_STATUS {
            // SAFETY: forwarded as-is from the host
            unsafe { (KADDON_ENTRY.as_raw().get_status)() }
        }

        #[allow(non_snake_case, missing_docs)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn ADDON_SetSetting(
            setting_name: *const ::core::ffi::c_char,
            setting_value: *const ::core::ffi::c_void,
        ) -> $crate::sys::ADDON_STATUS {
            // SAFETY: forwarded as-is from the host
            unsafe { (KADDON_ENTRY.as_raw().set_setting)(setting_name, setting_value) }
        }

        #[allow(non_snake_case, missing_docs)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn ADDON_GetTypeVersion(
            addon_type: ::core::ffi::c_int,
        ) -> *const ::core::ffi::c_char {
            // SAFETY: forwarded as-is from the host
            unsafe { (KADDON_ENTRY.as_raw().get_type_version)(addon_type) }
        }

        #[allow(non_snake_case, missing_docs)]
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn ADDON_GetTypeMinVersion(
            addon_type: ::core::ffi::c_int,
        ) -> *const ::core::ffi::c_char {
            // SAFETY: forwarded as-is from the host
            unsafe { (KADDON_ENTRY.as_raw().get_type_min_version)(addon_type) }
        }
    };
}
