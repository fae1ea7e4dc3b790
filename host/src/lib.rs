//! A safe interface to load and drive addons over the addon C ABI.
//!
//! Hosts implement the [`Host`](host::Host) trait to provide the services addons can call, then
//! load addons as [`LoadedAddon`](addon::LoadedAddon)s, either from a dynamic library or from an
//! entry descriptor built into the host's binary.

pub mod addon;
pub mod host;
pub mod setting;

pub use kaddon_common::addon_type;
pub use kaddon_common::entry;
pub use kaddon_common::handle;
pub use kaddon_common::log;
pub use kaddon_common::status;
pub use kaddon_common::sys;
pub use kaddon_common::version;

/// A helpful prelude re-exporting all the types related to host implementation.
pub mod prelude {
    pub use crate::addon::LoadedAddon;
    pub use crate::addon_type::AddonType;
    pub use crate::entry::AddonEntryDescriptor;
    pub use crate::handle::{HostInstanceHandle, InstanceHandle};
    pub use crate::host::{Host, HostError, Setting};
    pub use crate::log::AddonLog;
    pub use crate::setting::SettingInput;
    pub use crate::status::AddonStatus;
    pub use crate::version::ApiVersion;
}
