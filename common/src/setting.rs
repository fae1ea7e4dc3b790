use std::ffi::{CStr, c_char, c_int, c_uint, c_void};
use std::marker::PhantomData;

/// A read-only view over a setting value pushed by the host.
///
/// The host does not tell which type the value has: the caller must know it from the setting's
/// name, and pick the matching getter. This type never owns the value.
#[derive(Copy, Clone, Debug)]
pub struct SettingValue<'a> {
    raw: *const c_void,
    _lifetime: PhantomData<&'a c_void>,
}

impl<'a> SettingValue<'a> {
    /// # Safety
    /// The pointer must either be null, or point to a value that stays valid for `'a`.
    #[inline]
    pub unsafe fn from_raw(raw: *const c_void) -> Self {
        Self {
            raw,
            _lifetime: PhantomData,
        }
    }

    #[inline]
    pub fn empty() -> Self {
        Self {
            raw: core::ptr::null(),
            _lifetime: PhantomData,
        }
    }

    /// Returns `true` if the host passed no value at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_null()
    }

    #[inline]
    pub fn as_raw(&self) -> *const c_void {
        self.raw
    }

    /// Reads the value as a NUL-terminated string. Invalid UTF-8 is replaced.
    ///
    /// # Safety
    /// The host must have stored a NUL-terminated string.
    pub unsafe fn get_string(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        Some(
            CStr::from_ptr(self.raw.cast::<c_char>())
                .to_string_lossy()
                .into_owned(),
        )
    }

    /// # Safety
    /// The host must have stored a C `int`.
    #[inline]
    pub unsafe fn get_int(&self) -> Option<i32> {
        self.read::<c_int>()
    }

    /// # Safety
    /// The host must have stored a C `unsigned int`.
    #[inline]
    pub unsafe fn get_uint(&self) -> Option<u32> {
        self.read::<c_uint>()
    }

    /// Any non-zero byte reads as `true`.
    ///
    /// # Safety
    /// The host must have stored a C `bool`.
    #[inline]
    pub unsafe fn get_boolean(&self) -> Option<bool> {
        self.read::<u8>().map(|b| b != 0)
    }

    /// # Safety
    /// The host must have stored a C `float`.
    #[inline]
    pub unsafe fn get_float(&self) -> Option<f32> {
        self.read::<f32>()
    }

    #[inline]
    unsafe fn read<T: Copy>(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        Some(self.raw.cast::<T>().read_unaligned())
    }
}
