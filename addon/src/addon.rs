//! The addon's root object, and its lifecycle.

use crate::host::HostHandle;
use crate::instance::{AddonInstance, InstanceDescriptor, InstanceOutcome, InstanceRequest};
use kaddon_common::addon_type::{AddonType, DEFAULT_TYPE_VERSIONS, TypeVersion};
use kaddon_common::setting::SettingValue;
use kaddon_common::status::AddonStatus;

mod error;

pub use error::AddonError;

/// The root object of an addon.
///
/// Exactly one value of this type exists between the host's `create` and `destroy` calls. It is the
/// fallback factory for every instance the host requests, and receives the addon-wide lifecycle
/// notifications.
///
/// All of these methods are called one at a time, but not necessarily always from the same host
/// thread.
pub trait Addon: Sized + Send + 'static {
    /// Builds the root object, right after the host handed over its interface table.
    ///
    /// Returning an error fails the creation with the error's [status](AddonError::status).
    fn new(host: HostHandle) -> Result<Self, AddonError>;

    /// Called once the root object is in place. The returned status is reported to the host as the
    /// result of the creation.
    #[inline]
    fn create(&mut self) -> AddonStatus {
        AddonStatus::Ok
    }

    #[inline]
    fn status(&mut self) -> AddonStatus {
        AddonStatus::Ok
    }

    /// Called when the host pushes a new value for one of the addon's settings.
    ///
    /// The value's type depends on the setting: the addon must pick the right getter for it. The
    /// default implementation reports [`AddonStatus::Unknown`].
    #[inline]
    fn set_setting(&mut self, _name: &str, _value: SettingValue<'_>) -> AddonStatus {
        AddonStatus::Unknown
    }

    /// The root factory, called for every instance request no instance-scoped factory handled.
    ///
    /// The default implementation only supports the single-instance shortcut (see
    /// [`single_instance_shortcut`](crate::instance::single_instance_shortcut)).
    #[inline]
    fn create_instance(&mut self, request: &InstanceRequest<'_>) -> InstanceOutcome {
        crate::instance::single_instance_shortcut(request)
    }

    /// Called right before a registered instance is dropped, with the identifier the host gave it.
    #[inline]
    fn destroy_instance(
        &mut self,
        _instance_type: AddonType,
        _instance_id: &str,
        _instance: &mut dyn AddonInstance,
    ) {
    }

    /// The legacy global single instance, for addons that implement exactly one instance type
    /// directly on their root object.
    ///
    /// This is read once, after [`new`](Addon::new). The returned descriptor must always be the
    /// same.
    #[inline]
    fn single_instance(&self) -> Option<&InstanceDescriptor> {
        None
    }

    /// The versions of each type this addon was built against.
    #[inline]
    fn type_versions() -> &'static [TypeVersion] {
        DEFAULT_TYPE_VERSIONS
    }
}
