use crate::host::{Host, Setting};
use kaddon_common::addon_type::AddonType;
use kaddon_common::log::AddonLog;
use kaddon_common::sys::*;
use std::borrow::Cow;
use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::sync::atomic::{AtomicUsize, Ordering};

/// The data behind `kodi_base`: the host implementation, and the count of strings the addon still
/// has to free.
pub(crate) struct HostData<H: Host> {
    pub host: H,
    outstanding_strings: AtomicUsize,
}

impl<H: Host> HostData<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            outstanding_strings: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn outstanding_strings(&self) -> usize {
        self.outstanding_strings.load(Ordering::Acquire)
    }

    /// Hands a string over to the addon, which must give it back through `free_string`.
    fn share_string(&self, value: String) -> *mut c_char {
        let value = CString::new(value).unwrap_or_else(|e| {
            let mut bytes = e.into_vec();
            bytes.retain(|b| *b != 0);
            CString::new(bytes).unwrap_or_default()
        });

        self.outstanding_strings.fetch_add(1, Ordering::AcqRel);
        value.into_raw()
    }
}

pub(crate) fn to_kodi_table<H: Host>(kodi_base: KODI_HANDLE) -> AddonToKodiFuncTable_Addon {
    AddonToKodiFuncTable_Addon {
        kodi_base,
        get_type_version: Some(get_type_version::<H>),
        get_addon_path: Some(get_addon_path::<H>),
        get_base_user_path: Some(get_base_user_path::<H>),
        addon_log_msg: Some(addon_log_msg::<H>),
        get_setting_bool: Some(get_setting_bool::<H>),
        get_setting_int: Some(get_setting_int::<H>),
        get_setting_float: Some(get_setting_float::<H>),
        get_setting_string: Some(get_setting_string::<H>),
        set_setting_bool: Some(set_setting_bool::<H>),
        set_setting_int: Some(set_setting_int::<H>),
        set_setting_float: Some(set_setting_float::<H>),
        set_setting_string: Some(set_setting_string::<H>),
        free_string: Some(free_string::<H>),
        get_interface: Some(get_interface::<H>),
    }
}

#[inline]
unsafe fn host_data<'a, H: Host>(kodi_base: KODI_HANDLE) -> Option<&'a HostData<H>> {
    kodi_base.cast::<HostData<H>>().as_ref()
}

#[inline]
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<Cow<'a, str>> {
    if ptr.is_null() {
        return None;
    }

    Some(CStr::from_ptr(ptr).to_string_lossy())
}

unsafe extern "C" fn get_type_version<H: Host>(
    kodi_base: KODI_HANDLE,
    type_: c_int,
) -> *mut c_char {
    let Some(data) = host_data::<H>(kodi_base) else {
        return core::ptr::null_mut();
    };

    data.share_string(data.host.type_version(AddonType::from_raw(type_)))
}

unsafe extern "C" fn get_addon_path<H: Host>(kodi_base: KODI_HANDLE) -> *mut c_char {
    let Some(data) = host_data::<H>(kodi_base) else {
        return core::ptr::null_mut();
    };

    data.share_string(data.host.addon_path())
}

unsafe extern "C" fn get_base_user_path<H: Host>(kodi_base: KODI_HANDLE) -> *mut c_char {
    let Some(data) = host_data::<H>(kodi_base) else {
        return core::ptr::null_mut();
    };

    data.share_string(data.host.base_user_path())
}

unsafe extern "C" fn addon_log_msg<H: Host>(
    kodi_base: KODI_HANDLE,
    loglevel: ADDON_LOG,
    msg: *const c_char,
) {
    let (Some(data), Some(msg)) = (host_data::<H>(kodi_base), str_arg(msg)) else {
        return;
    };

    let level = AddonLog::from_raw(loglevel).unwrap_or(AddonLog::Info);
    data.host.log(level, &msg);
}

unsafe fn lookup<H: Host>(kodi_base: KODI_HANDLE, id: *const c_char) -> Option<Setting> {
    let data = host_data::<H>(kodi_base)?;
    data.host.setting(&str_arg(id)?)
}

unsafe extern "C" fn get_setting_bool<H: Host>(
    kodi_base: KODI_HANDLE,
    id: *const c_char,
    value: *mut bool,
) -> bool {
    match (lookup::<H>(kodi_base, id), value.is_null()) {
        (Some(Setting::Bool(v)), false) => {
            value.write(v);
            true
        }
        _ => false,
    }
}

unsafe extern "C" fn get_setting_int<H: Host>(
    kodi_base: KODI_HANDLE,
    id: *const c_char,
    value: *mut c_int,
) -> bool {
    match (lookup::<H>(kodi_base, id), value.is_null()) {
        (Some(Setting::Int(v)), false) => {
            value.write(v);
            true
        }
        _ => false,
    }
}

unsafe extern "C" fn get_setting_float<H: Host>(
    kodi_base: KODI_HANDLE,
    id: *const c_char,
    value: *mut f32,
) -> bool {
    match (lookup::<H>(kodi_base, id), value.is_null()) {
        (Some(Setting::Float(v)), false) => {
            value.write(v);
            true
        }
        _ => false,
    }
}

unsafe extern "C" fn get_setting_string<H: Host>(
    kodi_base: KODI_HANDLE,
    id: *const c_char,
    value: *mut *mut c_char,
) -> bool {
    let Some(data) = host_data::<H>(kodi_base) else {
        return false;
    };

    match (lookup::<H>(kodi_base, id), value.is_null()) {
        (Some(Setting::String(v)), false) => {
            value.write(data.share_string(v));
            true
        }
        _ => false,
    }
}

unsafe fn store<H: Host>(kodi_base: KODI_HANDLE, id: *const c_char, value: Setting) -> bool {
    match (host_data::<H>(kodi_base), str_arg(id)) {
        (Some(data), Some(id)) => data.host.set_setting(&id, value),
        _ => false,
    }
}

unsafe extern "C" fn set_setting_bool<H: Host>(
    kodi_base: KODI_HANDLE,
    id: *const c_char,
    value: bool,
) -> bool {
    store::<H>(kodi_base, id, Setting::Bool(value))
}

unsafe extern "C" fn set_setting_int<H: Host>(
    kodi_base: KODI_HANDLE,
    id: *const c_char,
    value: c_int,
) -> bool {
    store::<H>(kodi_base, id, Setting::Int(value))
}

unsafe extern "C" fn set_setting_float<H: Host>(
    kodi_base: KODI_HANDLE,
    id: *const c_char,
    value: f32,
) -> bool {
    store::<H>(kodi_base, id, Setting::Float(value))
}

unsafe extern "C" fn set_setting_string<H: Host>(
    kodi_base: KODI_HANDLE,
    id: *const c_char,
    value: *const c_char,
) -> bool {
    let Some(value) = str_arg(value) else {
        return false;
    };

    store::<H>(kodi_base, id, Setting::String(value.into_owned()))
}

unsafe extern "C" fn free_string<H: Host>(kodi_base: KODI_HANDLE, str_: *mut c_char) {
    if str_.is_null() {
        return;
    }

    drop(CString::from_raw(str_));

    if let Some(data) = host_data::<H>(kodi_base) {
        data.outstanding_strings.fetch_sub(1, Ordering::AcqRel);
    }
}

unsafe extern "C" fn get_interface<H: Host>(
    kodi_base: KODI_HANDLE,
    name: *const c_char,
    version: *const c_char,
) -> *mut c_void {
    match (host_data::<H>(kodi_base), str_arg(name), str_arg(version)) {
        (Some(data), Some(name), Some(version)) => data.host.interface(&name, &version),
        _ => core::ptr::null_mut(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Store;

    impl Host for Store {
        fn addon_path(&self) -> String {
            "/addons/pvr.demo".into()
        }

        fn setting(&self, id: &str) -> Option<Setting> {
            match id {
                "port" => Some(Setting::Int(8080)),
                "host" => Some(Setting::String("localhost".into())),
                _ => None,
            }
        }
    }

    #[test]
    fn shared_strings_are_counted_until_freed() {
        let mut data = HostData::new(Store);
        let base: KODI_HANDLE = (&mut data as *mut HostData<Store>).cast();
        let table = to_kodi_table::<Store>(base);

        // SAFETY: the table was built for this host data, which outlives every call below
        unsafe {
            let path = (table.get_addon_path.unwrap())(base);
            assert_eq!(CStr::from_ptr(path).to_str().unwrap(), "/addons/pvr.demo");
            assert_eq!(data.outstanding_strings(), 1);

            let mut value = core::ptr::null_mut();
            assert!((table.get_setting_string.unwrap())(base, c"host".as_ptr(), &mut value));
            assert_eq!(CStr::from_ptr(value).to_str().unwrap(), "localhost");
            assert_eq!(data.outstanding_strings(), 2);

            (table.free_string.unwrap())(base, path);
            (table.free_string.unwrap())(base, value);
        }

        assert_eq!(data.outstanding_strings(), 0);
    }

    #[test]
    fn settings_must_match_the_requested_type() {
        let mut data = HostData::new(Store);
        let base: KODI_HANDLE = (&mut data as *mut HostData<Store>).cast();
        let table = to_kodi_table::<Store>(base);

        // SAFETY: the table was built for this host data, which outlives every call below
        unsafe {
            let mut int = 0;
            assert!((table.get_setting_int.unwrap())(base, c"port".as_ptr(), &mut int));
            assert_eq!(int, 8080);

            let mut boolean = false;
            assert!(!(table.get_setting_bool.unwrap())(base, c"port".as_ptr(), &mut boolean));
            assert!(!(table.get_setting_int.unwrap())(base, c"missing".as_ptr(), &mut int));
            assert!(!(table.get_setting_int.unwrap())(base, core::ptr::null(), &mut int));
        }
    }
}
