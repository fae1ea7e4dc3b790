//! The dispatch protocol between the host and the addon's objects.
//!
//! An [`AddonContext`] owns the addon's root object and every instance created from it. The C entry
//! points are thin wrappers around it, but it can also be driven directly.

use crate::addon::{Addon, AddonError};
use crate::host::HostHandle;
use crate::instance::registry::InstanceRegistry;
use crate::instance::{AddonInstance, CreatedInstance, InstanceHandle, InstanceRequest};
use kaddon_common::addon_type::AddonType;
use kaddon_common::handle::HostInstanceHandle;
use kaddon_common::setting::SettingValue;
use kaddon_common::status::AddonStatus;

mod defect;

pub use defect::DispatchDefect;

/// The state of one created addon: its root object and its live instances.
pub struct AddonContext<A: Addon> {
    host: HostHandle,
    // Instances are dropped before the root object.
    instances: InstanceRegistry,
    root: A,
    single_instance: Option<AddonType>,
}

impl<A: Addon> AddonContext<A> {
    /// Builds the addon's root object.
    pub fn new(host: HostHandle) -> Result<Self, AddonError> {
        let root = A::new(host)?;
        Ok(Self::with_root(host, root))
    }

    /// Wraps an already built root object.
    pub fn with_root(host: HostHandle, root: A) -> Self {
        let single_instance = root.single_instance().map(|d| d.instance_type());

        Self {
            host,
            instances: InstanceRegistry::new(),
            root,
            single_instance,
        }
    }

    #[inline]
    pub fn host(&self) -> HostHandle {
        self.host
    }

    #[inline]
    pub fn root(&self) -> &A {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut A {
        &mut self.root
    }

    /// The type of the global single instance, if the addon runs in single-instance mode.
    #[inline]
    pub fn single_instance(&self) -> Option<AddonType> {
        self.single_instance
    }

    #[inline]
    pub fn instance(&self, handle: InstanceHandle) -> Option<&dyn AddonInstance> {
        self.instances.get(handle)
    }

    #[inline]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn create(&mut self) -> AddonStatus {
        self.root.create()
    }

    #[inline]
    pub fn status(&mut self) -> AddonStatus {
        self.root.status()
    }

    #[inline]
    pub fn set_setting(&mut self, name: &str, value: SettingValue<'_>) -> AddonStatus {
        self.root.set_setting(name, value)
    }

    /// Handles an instance request from the host.
    ///
    /// The parent instance's factory is tried first, if `parent` designates a live instance. If it
    /// (or the missing parent) reports `NotImplemented`, the root factory is tried. On success, the
    /// new instance is stamped with `instance_id` and registered.
    ///
    /// Returns the factory's status, and the handle to give to the host if an instance was created.
    ///
    /// # Panics
    ///
    /// Panics with a [`DispatchDefect`] if a factory reports anything but `NotImplemented` without
    /// an instance, or produces an instance of another type than the requested one.
    pub fn create_instance(
        &mut self,
        instance_type: AddonType,
        instance_id: &str,
        host_instance: HostInstanceHandle,
        version: &str,
        parent: Option<InstanceHandle>,
    ) -> (AddonStatus, Option<InstanceHandle>) {
        let request = InstanceRequest::new(instance_type, instance_id, host_instance, version)
            .with_single_instance(self.host.first_instance(), self.single_instance);

        let mut outcome = None;

        if let Some(parent) = parent.filter(|p| !p.is_root()) {
            match self.instances.get_mut(parent) {
                Some(parent) => outcome = Some(parent.create_instance(&request)),
                None => log::warn!(
                    "Unknown parent instance {parent:?} for new instance '{instance_id}', using the addon's factory"
                ),
            }
        }

        let outcome = match outcome {
            Some(outcome) if outcome.get_status() != AddonStatus::NotImplemented => outcome,
            _ => self.root.create_instance(&request),
        };

        let (status, created) = outcome.into_parts();
        if status == AddonStatus::NotImplemented {
            log::debug!("No factory implements instances of type {instance_type}");
            return (status, None);
        }

        let Some(created) = created else {
            DispatchDefect::MissingInstance {
                requested: instance_type,
                status,
            }
            .raise()
        };

        match created {
            CreatedInstance::New(instance) => {
                check_created_type(instance_type, instance.descriptor().instance_type());
                stamp(instance.descriptor(), instance_id);

                (status, Some(self.instances.insert(instance)))
            }
            CreatedInstance::SingleInstance => {
                let Some(single) = self.root.single_instance() else {
                    DispatchDefect::MissingInstance {
                        requested: instance_type,
                        status,
                    }
                    .raise()
                };

                check_created_type(instance_type, single.instance_type());
                stamp(single, instance_id);

                (status, Some(InstanceHandle::ROOT))
            }
        }
    }

    /// Handles an instance destruction request from the host.
    ///
    /// This does nothing in single-instance mode, or for the root handle. Unknown handles are
    /// logged and ignored.
    ///
    /// # Panics
    ///
    /// Panics with a [`DispatchDefect`] if the instance does not have the given type. The instance
    /// is left in place in that case.
    pub fn destroy_instance(&mut self, instance_type: AddonType, handle: Option<InstanceHandle>) {
        if self.single_instance.is_some() {
            return;
        }

        let Some(handle) = handle.filter(|h| !h.is_root()) else {
            return;
        };

        let Some(present) = self
            .instances
            .get(handle)
            .map(|i| i.descriptor().instance_type())
        else {
            log::error!("Asked to destroy unknown instance {handle:?} of type {instance_type}");
            return;
        };

        if present != instance_type {
            DispatchDefect::DestroyedTypeMismatch {
                requested: instance_type,
                present,
            }
            .raise()
        }

        if let Some(mut instance) = self.instances.remove(handle) {
            let id = instance.descriptor().id().to_owned();
            self.root
                .destroy_instance(instance_type, &id, instance.as_mut());
        }
    }

    /// Destroys every remaining instance, then the root object.
    pub fn destroy(self) {
        if self.instances.len() > 0 {
            log::debug!(
                "Destroying addon with {} live instance(s)",
                self.instances.len()
            );
        }
    }
}

fn check_created_type(requested: AddonType, produced: AddonType) {
    if requested != produced {
        DispatchDefect::CreatedTypeMismatch {
            requested,
            produced,
        }
        .raise()
    }
}

fn stamp(descriptor: &crate::instance::InstanceDescriptor, id: &str) {
    if !descriptor.stamp(id) {
        log::warn!(
            "Instance already identified as '{}', ignoring new identifier '{id}'",
            descriptor.id()
        );
    }
}
