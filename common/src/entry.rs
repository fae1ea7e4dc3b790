use crate::sys::addon_entry;

/// The set of module entry points an addon exposes to its host.
///
/// Hosts loading an addon from a dynamic library resolve each of these by symbol name. This type
/// allows in-process hosts to reach the very same functions without any symbol lookup.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct AddonEntryDescriptor(addon_entry);

impl AddonEntryDescriptor {
    #[inline]
    pub const fn new(raw: addon_entry) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(&self) -> &addon_entry {
        &self.0
    }
}
