//! Access to the functions the host exposes to the addon.

use kaddon_common::addon_type::AddonType;
use kaddon_common::handle::{HostInstanceHandle, InstanceHandle};
use kaddon_common::log::AddonLog;
use kaddon_common::sys::{
    AddonGlobalInterface, AddonToKodiFuncTable_Addon, KodiToAddonFuncTable_Addon,
};
use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::ptr::NonNull;

/// The separator [`join_path`] inserts between two path segments.
pub const PATH_SEPARATOR: char = if cfg!(windows) { '\\' } else { '/' };

/// Appends a path segment to a base path.
///
/// A separator is inserted unless `append` is empty or already starts with one (either `/` or `\`).
pub fn join_path(mut base: String, append: &str) -> String {
    if append.is_empty() {
        return base;
    }

    if !append.starts_with(['/', '\\']) {
        base.push(PATH_SEPARATOR);
    }

    base.push_str(append);
    base
}

/// A handle to the host, backed by the interface table it provided at creation time.
///
/// Every call is forwarded to the host's function table. A function the host left unset produces a
/// neutral result (empty string, `None` or `false`) instead of failing.
#[derive(Copy, Clone)]
pub struct HostHandle {
    interface: NonNull<AddonGlobalInterface>,
}

// SAFETY: The interface table is owned by the host and outlives the addon. The host functions it
// exposes are callable from any thread.
unsafe impl Send for HostHandle {}
// SAFETY: See above.
unsafe impl Sync for HostHandle {}

impl HostHandle {
    /// # Safety
    /// The pointer must either be null, or point to an interface table that stays valid until the
    /// addon is destroyed.
    #[inline]
    pub unsafe fn from_raw(interface: *mut AddonGlobalInterface) -> Option<Self> {
        Some(Self {
            interface: NonNull::new(interface)?,
        })
    }

    #[inline]
    pub fn as_raw(&self) -> *mut AddonGlobalInterface {
        self.interface.as_ptr()
    }

    #[inline]
    fn global(&self) -> &AddonGlobalInterface {
        // SAFETY: the table is valid for as long as this handle exists (see from_raw)
        unsafe { self.interface.as_ref() }
    }

    #[inline]
    fn to_kodi(&self) -> Option<&AddonToKodiFuncTable_Addon> {
        // SAFETY: the host's function table lives as long as the interface table
        unsafe { self.global().to_kodi.as_ref() }
    }

    /// The host's half of the very first instance, used by the single-instance shortcut.
    #[inline]
    pub fn first_instance(&self) -> HostInstanceHandle {
        HostInstanceHandle::from_raw(self.global().first_kodi_instance)
    }

    /// The path to the directory containing the addon's library, as given by the host.
    pub fn lib_path(&self) -> String {
        let path = self.global().lib_base_path;
        if path.is_null() {
            return String::new();
        }

        // SAFETY: the host provides a NUL-terminated string, valid as long as the table
        unsafe { CStr::from_ptr(path) }
            .to_string_lossy()
            .into_owned()
    }

    /// The version of the given type the host implements, or an empty string if unknown.
    pub fn type_version(&self, addon_type: AddonType) -> String {
        let Some(table) = self.to_kodi() else {
            return String::new();
        };
        let Some(get_type_version) = table.get_type_version else {
            missing("get_type_version");
            return String::new();
        };

        // SAFETY: the function pointer and kodi_base were both provided by the host
        let raw = unsafe { get_type_version(table.kodi_base, addon_type.to_raw()) };
        // SAFETY: the returned string is owned by the host and must be freed through the table
        unsafe { HostString::new(table, raw) }
            .map(|s| s.to_string_lossy())
            .unwrap_or_default()
    }

    /// The addon's installation path, with `append` joined to it.
    pub fn addon_path(&self, append: &str) -> String {
        join_path(
            self.path_from(|t| t.get_addon_path, "get_addon_path"),
            append,
        )
    }

    /// The addon's user data path, with `append` joined to it.
    pub fn base_user_path(&self, append: &str) -> String {
        join_path(
            self.path_from(|t| t.get_base_user_path, "get_base_user_path"),
            append,
        )
    }

    fn path_from(
        &self,
        getter: impl FnOnce(
            &AddonToKodiFuncTable_Addon,
        ) -> Option<unsafe extern "C" fn(*mut c_void) -> *mut c_char>,
        name: &'static str,
    ) -> String {
        let Some(table) = self.to_kodi() else {
            return String::new();
        };
        let Some(get_path) = getter(table) else {
            missing(name);
            return String::new();
        };

        // SAFETY: the function pointer and kodi_base were both provided by the host
        let raw = unsafe { get_path(table.kodi_base) };
        // SAFETY: the returned string is owned by the host and must be freed through the table
        unsafe { HostString::new(table, raw) }
            .map(|s| s.to_string_lossy())
            .unwrap_or_default()
    }

    /// Sends a message to the host's log. Interior NUL bytes are dropped.
    ///
    /// Returns `false` if the host has no logging function, in which case nothing was sent.
    pub fn log(&self, level: AddonLog, message: &str) -> bool {
        let Some(table) = self.to_kodi() else {
            return false;
        };
        let Some(addon_log_msg) = table.addon_log_msg else {
            return false;
        };

        let message = to_log_string(message);
        // SAFETY: the function pointer and kodi_base were both provided by the host
        unsafe { addon_log_msg(table.kodi_base, level.to_raw(), message.as_ptr()) };
        true
    }

    /// Reads a string setting, or `None` if the host does not know it.
    ///
    /// A setting the host reports as found without providing a buffer reads as an empty string.
    pub fn check_setting_string(&self, id: &str) -> Option<String> {
        let table = self.to_kodi()?;
        let Some(get_setting_string) = table.get_setting_string else {
            missing("get_setting_string");
            return None;
        };
        let id = setting_id(id)?;

        let mut raw: *mut c_char = core::ptr::null_mut();
        // SAFETY: the function pointer and kodi_base were both provided by the host
        let found = unsafe { get_setting_string(table.kodi_base, id.as_ptr(), &mut raw) };
        // SAFETY: whatever was written into raw is owned by the host, and freed on drop
        let value = unsafe { HostString::new(table, raw) };

        match (found, value) {
            (false, _) => None,
            (true, Some(value)) => Some(value.to_string_lossy()),
            (true, None) => Some(String::new()),
        }
    }

    /// Reads a string setting, defaulting to `default` if the host does not know it.
    #[inline]
    pub fn setting_string(&self, id: &str, default: &str) -> String {
        self.check_setting_string(id)
            .unwrap_or_else(|| default.to_owned())
    }

    pub fn check_setting_int(&self, id: &str) -> Option<i32> {
        let table = self.to_kodi()?;
        let Some(get_setting_int) = table.get_setting_int else {
            missing("get_setting_int");
            return None;
        };
        let id = setting_id(id)?;

        let mut value: c_int = 0;
        // SAFETY: the function pointer and kodi_base were both provided by the host
        unsafe { get_setting_int(table.kodi_base, id.as_ptr(), &mut value) }.then_some(value)
    }

    #[inline]
    pub fn setting_int(&self, id: &str, default: i32) -> i32 {
        self.check_setting_int(id).unwrap_or(default)
    }

    pub fn check_setting_boolean(&self, id: &str) -> Option<bool> {
        let table = self.to_kodi()?;
        let Some(get_setting_bool) = table.get_setting_bool else {
            missing("get_setting_bool");
            return None;
        };
        let id = setting_id(id)?;

        let mut value = false;
        // SAFETY: the function pointer and kodi_base were both provided by the host
        unsafe { get_setting_bool(table.kodi_base, id.as_ptr(), &mut value) }.then_some(value)
    }

    #[inline]
    pub fn setting_boolean(&self, id: &str, default: bool) -> bool {
        self.check_setting_boolean(id).unwrap_or(default)
    }

    pub fn check_setting_float(&self, id: &str) -> Option<f32> {
        let table = self.to_kodi()?;
        let Some(get_setting_float) = table.get_setting_float else {
            missing("get_setting_float");
            return None;
        };
        let id = setting_id(id)?;

        let mut value = 0.0f32;
        // SAFETY: the function pointer and kodi_base were both provided by the host
        unsafe { get_setting_float(table.kodi_base, id.as_ptr(), &mut value) }.then_some(value)
    }

    #[inline]
    pub fn setting_float(&self, id: &str, default: f32) -> f32 {
        self.check_setting_float(id).unwrap_or(default)
    }

    /// Stores a string setting. Returns whether the host accepted it.
    pub fn set_setting_string(&self, id: &str, value: &str) -> bool {
        let Some(table) = self.to_kodi() else {
            return false;
        };
        let Some(set_setting_string) = table.set_setting_string else {
            missing("set_setting_string");
            return false;
        };
        let (Some(id), Ok(value)) = (setting_id(id), CString::new(value)) else {
            log::warn!("Cannot send setting value containing a NUL byte to the host");
            return false;
        };

        // SAFETY: the function pointer and kodi_base were both provided by the host
        unsafe { set_setting_string(table.kodi_base, id.as_ptr(), value.as_ptr()) }
    }

    pub fn set_setting_int(&self, id: &str, value: i32) -> bool {
        let Some(table) = self.to_kodi() else {
            return false;
        };
        let Some(set_setting_int) = table.set_setting_int else {
            missing("set_setting_int");
            return false;
        };
        let Some(id) = setting_id(id) else {
            return false;
        };

        // SAFETY: the function pointer and kodi_base were both provided by the host
        unsafe { set_setting_int(table.kodi_base, id.as_ptr(), value) }
    }

    pub fn set_setting_boolean(&self, id: &str, value: bool) -> bool {
        let Some(table) = self.to_kodi() else {
            return false;
        };
        let Some(set_setting_bool) = table.set_setting_bool else {
            missing("set_setting_bool");
            return false;
        };
        let Some(id) = setting_id(id) else {
            return false;
        };

        // SAFETY: the function pointer and kodi_base were both provided by the host
        unsafe { set_setting_bool(table.kodi_base, id.as_ptr(), value) }
    }

    pub fn set_setting_float(&self, id: &str, value: f32) -> bool {
        let Some(table) = self.to_kodi() else {
            return false;
        };
        let Some(set_setting_float) = table.set_setting_float else {
            missing("set_setting_float");
            return false;
        };
        let Some(id) = setting_id(id) else {
            return false;
        };

        // SAFETY: the function pointer and kodi_base were both provided by the host
        unsafe { set_setting_float(table.kodi_base, id.as_ptr(), value) }
    }

    /// Looks up an additional interface published by the host under a name and version.
    pub fn interface(&self, name: &str, version: &str) -> Option<NonNull<c_void>> {
        let table = self.to_kodi()?;
        let Some(get_interface) = table.get_interface else {
            missing("get_interface");
            return None;
        };
        let name = CString::new(name).ok()?;
        let version = CString::new(version).ok()?;

        // SAFETY: the function pointer and kodi_base were both provided by the host
        NonNull::new(unsafe { get_interface(table.kodi_base, name.as_ptr(), version.as_ptr()) })
    }

    /// Publishes the addon's dispatch functions into the table the host provided.
    ///
    /// Returns `false` if the host did not provide a table to fill.
    pub(crate) fn register_to_addon(&self, functions: KodiToAddonFuncTable_Addon) -> bool {
        let to_addon = self.global().to_addon;
        if to_addon.is_null() {
            return false;
        }

        // SAFETY: the host-owned table is valid, and only written to during creation
        unsafe { to_addon.write(functions) };
        true
    }

    pub(crate) fn set_addon_base(&self, handle: Option<InstanceHandle>) {
        let raw = handle.map_or(core::ptr::null_mut(), InstanceHandle::to_raw);
        // SAFETY: the host only reads these fields after creation, on the same thread
        unsafe { (*self.interface.as_ptr()).addon_base = raw };
    }

    pub(crate) fn set_global_single_instance(&self, handle: Option<InstanceHandle>) {
        let raw = handle.map_or(core::ptr::null_mut(), InstanceHandle::to_raw);
        // SAFETY: the host only reads these fields after creation, on the same thread
        unsafe { (*self.interface.as_ptr()).global_single_instance = raw };
    }
}

fn missing(name: &str) {
    log::debug!("Host does not provide '{name}'");
}

fn setting_id(id: &str) -> Option<CString> {
    match CString::new(id) {
        Ok(id) => Some(id),
        Err(_) => {
            log::warn!("Invalid setting identifier {id:?}: contains a NUL byte");
            None
        }
    }
}

pub(crate) fn to_log_string(message: &str) -> CString {
    CString::new(message).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|b| *b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}

/// A string allocated by the host, handed back to it through `free_string` when dropped.
struct HostString<'a> {
    table: &'a AddonToKodiFuncTable_Addon,
    ptr: NonNull<c_char>,
}

impl<'a> HostString<'a> {
    /// # Safety
    /// The pointer must be null, or a NUL-terminated string allocated by the host.
    #[inline]
    unsafe fn new(table: &'a AddonToKodiFuncTable_Addon, ptr: *mut c_char) -> Option<Self> {
        Some(Self {
            table,
            ptr: NonNull::new(ptr)?,
        })
    }

    fn to_string_lossy(&self) -> String {
        // SAFETY: the pointer is a valid NUL-terminated string until dropped
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for HostString<'_> {
    fn drop(&mut self) {
        match self.table.free_string {
            // SAFETY: the string was allocated by this host, and is not used after this point
            Some(free_string) => unsafe { free_string(self.table.kodi_base, self.ptr.as_ptr()) },
            None => missing("free_string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaddon_common::sys::KODI_HANDLE;

    static_assertions::assert_impl_all!(HostHandle: Send, Sync, Copy);

    #[test]
    fn joining_inserts_a_separator() {
        let expected = format!("/usr/share/addon{PATH_SEPARATOR}resources");
        assert_eq!(join_path("/usr/share/addon".into(), "resources"), expected);
    }

    #[test]
    fn joining_keeps_existing_separators() {
        assert_eq!(join_path("/base".into(), "/data"), "/base/data");
        assert_eq!(join_path("C:\\base".into(), "\\data"), "C:\\base\\data");
    }

    #[test]
    fn joining_nothing_keeps_the_base() {
        assert_eq!(join_path("/base".into(), ""), "/base");
        assert_eq!(join_path(String::new(), ""), "");
    }

    unsafe extern "C" fn found_without_buffer(
        _kodi_base: KODI_HANDLE,
        id: *const c_char,
        value: *mut *mut c_char,
    ) -> bool {
        value.write(core::ptr::null_mut());
        CStr::from_ptr(id) == c"empty"
    }

    #[test]
    fn found_string_settings_without_a_buffer_are_empty() {
        let mut to_kodi = AddonToKodiFuncTable_Addon {
            kodi_base: core::ptr::null_mut(),
            get_type_version: None,
            get_addon_path: None,
            get_base_user_path: None,
            addon_log_msg: None,
            get_setting_bool: None,
            get_setting_int: None,
            get_setting_float: None,
            get_setting_string: Some(found_without_buffer),
            set_setting_bool: None,
            set_setting_int: None,
            set_setting_float: None,
            set_setting_string: None,
            free_string: None,
            get_interface: None,
        };
        let mut interface = AddonGlobalInterface {
            lib_base_path: core::ptr::null(),
            addon_base: core::ptr::null_mut(),
            global_single_instance: core::ptr::null_mut(),
            first_kodi_instance: core::ptr::null_mut(),
            to_kodi: &mut to_kodi,
            to_addon: core::ptr::null_mut(),
        };

        // SAFETY: both tables outlive the handle
        let host = unsafe { HostHandle::from_raw(&mut interface) }.unwrap();

        assert_eq!(host.check_setting_string("empty"), Some(String::new()));
        assert_eq!(host.setting_string("empty", "fallback"), "");
        assert_eq!(host.check_setting_string("missing"), None);
        assert_eq!(host.setting_string("missing", "fallback"), "fallback");
    }

    #[test]
    fn log_strings_drop_nul_bytes() {
        assert_eq!(to_log_string("a\0b\0c").as_bytes(), b"abc");
        assert_eq!(to_log_string("plain").as_bytes(), b"plain");
    }
}
