//! Setting values pushed by the host to a loaded addon.

use crate::host::HostError;
use std::ffi::{CString, c_void};

/// A setting value to push to an addon with
/// [`LoadedAddon::set_setting`](crate::addon::LoadedAddon::set_setting).
///
/// The addon receives an untyped pointer to this value, and must know its type from the setting's
/// name.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingInput {
    String(CString),
    Int(i32),
    UInt(u32),
    Bool(bool),
    Float(f32),
}

impl SettingInput {
    /// Creates a string value. Fails if the string contains a NUL byte.
    #[inline]
    pub fn string(value: &str) -> Result<Self, HostError> {
        Ok(Self::String(CString::new(value)?))
    }

    /// A pointer to the value, as received by the addon. Valid as long as `self` is.
    pub fn as_ptr(&self) -> *const c_void {
        match self {
            SettingInput::String(value) => value.as_ptr().cast(),
            SettingInput::Int(value) => (value as *const i32).cast(),
            SettingInput::UInt(value) => (value as *const u32).cast(),
            SettingInput::Bool(value) => (value as *const bool).cast(),
            SettingInput::Float(value) => (value as *const f32).cast(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointers_target_the_stored_value() {
        let value = SettingInput::Int(-5);
        // SAFETY: the pointer targets the i32 stored in the value
        assert_eq!(unsafe { *value.as_ptr().cast::<i32>() }, -5);

        let value = SettingInput::string("hello").unwrap();
        // SAFETY: the pointer targets a NUL-terminated string
        let read = unsafe { std::ffi::CStr::from_ptr(value.as_ptr().cast()) };
        assert_eq!(read.to_str().unwrap(), "hello");
    }

    #[test]
    fn nul_strings_are_rejected() {
        assert!(matches!(
            SettingInput::string("a\0b"),
            Err(HostError::NulString)
        ));
    }
}
