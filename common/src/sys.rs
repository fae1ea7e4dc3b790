//! Raw C ABI shared by addons and hosts.
//!
//! These types mirror the C headers the host is built against, field for field. They carry no
//! invariants of their own: every pointer may be null, and every function pointer is optional.

#![allow(non_camel_case_types, non_snake_case)]

use std::ffi::{c_char, c_int, c_void};

/// An opaque pointer owned by either side of the boundary.
pub type KODI_HANDLE = *mut c_void;

/// A raw status code, see [`AddonStatus`](crate::status::AddonStatus).
pub type ADDON_STATUS = c_int;

pub const ADDON_STATUS_OK: ADDON_STATUS = 0;
pub const ADDON_STATUS_LOST_CONNECTION: ADDON_STATUS = 1;
pub const ADDON_STATUS_NEED_RESTART: ADDON_STATUS = 2;
pub const ADDON_STATUS_NEED_SETTINGS: ADDON_STATUS = 3;
pub const ADDON_STATUS_UNKNOWN: ADDON_STATUS = 4;
pub const ADDON_STATUS_PERMANENT_FAILURE: ADDON_STATUS = 5;
pub const ADDON_STATUS_NOT_IMPLEMENTED: ADDON_STATUS = 6;

/// A raw log level, see [`AddonLog`](crate::log::AddonLog).
pub type ADDON_LOG = c_int;

pub const ADDON_LOG_DEBUG: ADDON_LOG = 0;
pub const ADDON_LOG_INFO: ADDON_LOG = 1;
pub const ADDON_LOG_WARNING: ADDON_LOG = 2;
pub const ADDON_LOG_ERROR: ADDON_LOG = 3;
pub const ADDON_LOG_FATAL: ADDON_LOG = 4;

/// Calls from the addon into the host.
///
/// Every function receives [`kodi_base`](Self::kodi_base) as its first argument. Strings returned
/// by the host belong to the host, and must be handed back through
/// [`free_string`](Self::free_string).
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct AddonToKodiFuncTable_Addon {
    pub kodi_base: KODI_HANDLE,

    pub get_type_version:
        Option<unsafe extern "C" fn(kodi_base: KODI_HANDLE, type_: c_int) -> *mut c_char>,
    pub get_addon_path: Option<unsafe extern "C" fn(kodi_base: KODI_HANDLE) -> *mut c_char>,
    pub get_base_user_path: Option<unsafe extern "C" fn(kodi_base: KODI_HANDLE) -> *mut c_char>,
    pub addon_log_msg: Option<
        unsafe extern "C" fn(kodi_base: KODI_HANDLE, loglevel: ADDON_LOG, msg: *const c_char),
    >,

    pub get_setting_bool: Option<
        unsafe extern "C" fn(kodi_base: KODI_HANDLE, id: *const c_char, value: *mut bool) -> bool,
    >,
    pub get_setting_int: Option<
        unsafe extern "C" fn(kodi_base: KODI_HANDLE, id: *const c_char, value: *mut c_int) -> bool,
    >,
    pub get_setting_float: Option<
        unsafe extern "C" fn(kodi_base: KODI_HANDLE, id: *const c_char, value: *mut f32) -> bool,
    >,
    pub get_setting_string: Option<
        unsafe extern "C" fn(
            kodi_base: KODI_HANDLE,
            id: *const c_char,
            value: *mut *mut c_char,
        ) -> bool,
    >,

    pub set_setting_bool: Option<
        unsafe extern "C" fn(kodi_base: KODI_HANDLE, id: *const c_char, value: bool) -> bool,
    >,
    pub set_setting_int: Option<
        unsafe extern "C" fn(kodi_base: KODI_HANDLE, id: *const c_char, value: c_int) -> bool,
    >,
    pub set_setting_float:
        Option<unsafe extern "C" fn(kodi_base: KODI_HANDLE, id: *const c_char, value: f32) -> bool>,
    pub set_setting_string: Option<
        unsafe extern "C" fn(
            kodi_base: KODI_HANDLE,
            id: *const c_char,
            value: *const c_char,
        ) -> bool,
    >,

    pub free_string: Option<unsafe extern "C" fn(kodi_base: KODI_HANDLE, str_: *mut c_char)>,
    pub get_interface: Option<
        unsafe extern "C" fn(
            kodi_base: KODI_HANDLE,
            name: *const c_char,
            version: *const c_char,
        ) -> *mut c_void,
    >,
}

/// Calls from the host into the addon, registered by the addon during creation.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct KodiToAddonFuncTable_Addon {
    pub destroy: Option<unsafe extern "C" fn()>,
    pub get_status: Option<unsafe extern "C" fn() -> ADDON_STATUS>,
    pub create_instance: Option<
        unsafe extern "C" fn(
            instance_type: c_int,
            instance_id: *const c_char,
            instance: KODI_HANDLE,
            version: *const c_char,
            addon_instance: *mut KODI_HANDLE,
            parent: KODI_HANDLE,
        ) -> ADDON_STATUS,
    >,
    pub destroy_instance: Option<unsafe extern "C" fn(instance_type: c_int, instance: KODI_HANDLE)>,
    pub set_setting: Option<
        unsafe extern "C" fn(
            setting_name: *const c_char,
            setting_value: *const c_void,
        ) -> ADDON_STATUS,
    >,
}

/// The table exchanged once at load time. It is the only channel between the host and the addon.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct AddonGlobalInterface {
    pub lib_base_path: *const c_char,
    pub addon_base: KODI_HANDLE,
    pub global_single_instance: KODI_HANDLE,
    pub first_kodi_instance: KODI_HANDLE,
    pub to_kodi: *mut AddonToKodiFuncTable_Addon,
    pub to_addon: *mut KodiToAddonFuncTable_Addon,
}

pub type addon_create_fn = unsafe extern "C" fn(
    addon_interface: KODI_HANDLE,
    global_api_version: *const c_char,
    unused: *mut c_void,
) -> ADDON_STATUS;
pub type addon_destroy_fn = unsafe extern "C" fn();
pub type addon_get_status_fn = unsafe extern "C" fn() -> ADDON_STATUS;
pub type addon_set_setting_fn =
    unsafe extern "C" fn(setting_name: *const c_char, setting_value: *const c_void) -> ADDON_STATUS;
pub type addon_get_type_version_fn = unsafe extern "C" fn(type_: c_int) -> *const c_char;

/// The module entry points a host resolves by name.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct addon_entry {
    pub create: addon_create_fn,
    pub destroy: addon_destroy_fn,
    pub get_status: addon_get_status_fn,
    pub set_setting: addon_set_setting_fn,
    pub get_type_version: addon_get_type_version_fn,
    pub get_type_min_version: addon_get_type_version_fn,
}

pub const ADDON_CREATE_SYMBOL: &std::ffi::CStr = c"ADDON_Create";
pub const ADDON_DESTROY_SYMBOL: &std::ffi::CStr = c"ADDON_Destroy";
pub const ADDON_GET_STATUS_SYMBOL: &std::ffi::CStr = c"ADDON_GetStatus";
pub const ADDON_SET_SETTING_SYMBOL: &std::ffi::CStr = c"ADDON_SetSetting";
pub const ADDON_GET_TYPE_VERSION_SYMBOL: &std::ffi::CStr = c"ADDON_GetTypeVersion";
pub const ADDON_GET_TYPE_MIN_VERSION_SYMBOL: &std::ffi::CStr = c"ADDON_GetTypeMinVersion";
