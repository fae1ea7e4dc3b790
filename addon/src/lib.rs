//! Safe Rust wrappers to implement addons loaded by a host over the addon C ABI.
//!
//! An addon is made of a root object implementing [`Addon`](addon::Addon), and of any number of
//! [instances](instance::AddonInstance) the host asks the root object (or other instances) to
//! create. The [`kaddon_export_entry!`] macro exposes an addon type to the host.

#[macro_use]
pub mod entry;
pub mod addon;
pub mod dispatch;
pub mod host;
pub mod instance;
pub mod logging;

pub(crate) mod internal_utils;

pub use kaddon_common::addon_type;
pub use kaddon_common::handle;
pub use kaddon_common::log as host_log;
pub use kaddon_common::setting;
pub use kaddon_common::status;
pub use kaddon_common::structure;
pub use kaddon_common::sys;
pub use kaddon_common::version;

/// A helpful prelude re-exporting all the types related to addon implementation.
pub mod prelude {
    pub use crate::addon::{Addon, AddonError};
    pub use crate::addon_type::{AddonType, TypeVersion};
    pub use crate::dispatch::{AddonContext, DispatchDefect};
    pub use crate::entry::{AddonEntry, AddonEntryDescriptor};
    pub use crate::host::HostHandle;
    pub use crate::instance::{
        AddonInstance, CreatedInstance, InstanceDescriptor, InstanceHandle, InstanceOutcome,
        InstanceRequest,
    };
    pub use crate::setting::SettingValue;
    pub use crate::status::AddonStatus;
    pub use crate::structure::{StructHandle, StructWrapper};
    pub use crate::{kaddon_entry, kaddon_export_entry};
}
