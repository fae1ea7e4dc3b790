//! The services a host provides to the addons it loads.

use kaddon_common::addon_type::AddonType;
use kaddon_common::log::AddonLog;
use std::ffi::c_void;

mod error;

pub use error::HostError;

/// A setting value, as stored by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum Setting {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
}

/// The host-side implementation of every addon→host call.
///
/// All methods have neutral defaults, so a host only needs to implement what it supports.
pub trait Host: 'static {
    /// The addon's installation directory.
    #[inline]
    fn addon_path(&self) -> String {
        String::new()
    }

    /// The addon's user data directory.
    #[inline]
    fn base_user_path(&self) -> String {
        String::new()
    }

    /// Receives a message from the addon.
    fn log(&self, level: AddonLog, message: &str) {
        eprintln!("[ADDON] [{}] {message}", level.label());
    }

    /// Looks up a setting of the addon.
    #[inline]
    fn setting(&self, _id: &str) -> Option<Setting> {
        None
    }

    /// Stores a setting of the addon. Returns whether the value was accepted.
    #[inline]
    fn set_setting(&self, _id: &str, _value: Setting) -> bool {
        false
    }

    /// The version of the given type the host implements.
    #[inline]
    fn type_version(&self, _addon_type: AddonType) -> String {
        "0.0.0".into()
    }

    /// Returns an additional interface the host publishes, or null.
    #[inline]
    fn interface(&self, _name: &str, _version: &str) -> *mut c_void {
        core::ptr::null_mut()
    }
}
