//! Opaque handles crossing the boundary.
//!
//! Neither side ever dereferences the other side's handles. Host handles are opaque pointers kept
//! as-is, while addon-side handles are registry keys encoded into the pointer value.

use crate::sys::KODI_HANDLE;
use std::num::NonZeroUsize;

/// An opaque handle to a host-side object, such as the host's half of an instance.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct HostInstanceHandle(KODI_HANDLE);

impl HostInstanceHandle {
    #[inline]
    pub const fn null() -> Self {
        Self(core::ptr::null_mut())
    }

    #[inline]
    pub const fn from_raw(ptr: KODI_HANDLE) -> Self {
        Self(ptr)
    }

    #[inline]
    pub const fn as_raw(&self) -> KODI_HANDLE {
        self.0
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl Default for HostInstanceHandle {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

// SAFETY: Host handles are just opaque values, which the addon never dereferences
unsafe impl Send for HostInstanceHandle {}
// SAFETY: Host handles are just opaque values, which the addon never dereferences
unsafe impl Sync for HostInstanceHandle {}

/// A key identifying an addon-side instance, handed to the host in place of a pointer.
///
/// The host only ever passes these back; the addon resolves them through its instance registry.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct InstanceHandle(NonZeroUsize);

impl InstanceHandle {
    /// The handle designating the addon's root object.
    ///
    /// In single-instance mode, this is also the handle of the global instance.
    pub const ROOT: InstanceHandle = InstanceHandle(NonZeroUsize::MIN);

    #[inline]
    pub const fn new(raw: NonZeroUsize) -> Self {
        Self(raw)
    }

    /// Decodes a handle from the pointer value the host passed back. Returns `None` for null.
    #[inline]
    pub fn from_raw(ptr: KODI_HANDLE) -> Option<Self> {
        NonZeroUsize::new(ptr as usize).map(Self)
    }

    /// Encodes this handle into a pointer value. The result must never be dereferenced.
    #[inline]
    pub fn to_raw(self) -> KODI_HANDLE {
        self.0.get() as KODI_HANDLE
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::{assert_eq_size, assert_impl_all};

    assert_eq_size!(InstanceHandle, KODI_HANDLE);
    assert_eq_size!(Option<InstanceHandle>, KODI_HANDLE);
    assert_eq_size!(HostInstanceHandle, KODI_HANDLE);
    assert_impl_all!(HostInstanceHandle: Send, Sync, Copy);

    #[test]
    fn instance_handles_survive_the_boundary() {
        let handle = InstanceHandle::new(NonZeroUsize::new(42).unwrap());
        assert_eq!(InstanceHandle::from_raw(handle.to_raw()), Some(handle));
        assert_eq!(InstanceHandle::from_raw(core::ptr::null_mut()), None);
        assert!(InstanceHandle::from_raw(InstanceHandle::ROOT.to_raw()).unwrap().is_root());
    }
}
