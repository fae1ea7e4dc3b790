//! Instances: polymorphic addon-side objects created and destroyed on the host's request.
//!
//! Each instance implements one capability type, identified by an [`AddonType`] tag. The host asks
//! for a new instance through the dispatch protocol, which routes the request to an instance-scoped
//! factory ([`AddonInstance::create_instance`]) or to the addon's root factory
//! ([`Addon::create_instance`](crate::addon::Addon::create_instance)), validates the result,
//! stamps it with the host-given identifier and registers it.
//!
//! Instances are then only ever referred to by an opaque [`InstanceHandle`], and are dropped when
//! the host destroys them.

use kaddon_common::addon_type::AddonType;
use kaddon_common::handle::HostInstanceHandle;
use kaddon_common::status::AddonStatus;
use once_cell::sync::OnceCell;
use std::fmt::{Debug, Formatter};

pub(crate) mod registry;

pub use kaddon_common::handle::InstanceHandle;

/// The part every instance has in common: its type, the version of that type the host negotiated,
/// and the identifier the host gave it.
pub struct InstanceDescriptor {
    instance_type: AddonType,
    host_version: String,
    id: OnceCell<String>,
}

impl InstanceDescriptor {
    #[inline]
    pub fn new(instance_type: AddonType, host_version: impl Into<String>) -> Self {
        Self {
            instance_type,
            host_version: host_version.into(),
            id: OnceCell::new(),
        }
    }

    /// Creates a descriptor matching the type and version of a creation request.
    #[inline]
    pub fn for_request(request: &InstanceRequest<'_>) -> Self {
        Self::new(request.instance_type, request.version)
    }

    #[inline]
    pub fn instance_type(&self) -> AddonType {
        self.instance_type
    }

    /// The version of this instance's type the host is using.
    #[inline]
    pub fn host_version(&self) -> &str {
        &self.host_version
    }

    /// The identifier the host gave this instance. Empty until the instance is fully created.
    #[inline]
    pub fn id(&self) -> &str {
        self.id.get().map(String::as_str).unwrap_or("")
    }

    #[inline]
    pub fn is_identified(&self) -> bool {
        self.id.get().is_some()
    }

    /// Sets the identifier if it was not set yet. Returns `false` if it was already set to a
    /// different value, which is then left untouched.
    pub(crate) fn stamp(&self, id: &str) -> bool {
        match self.id.set(id.to_owned()) {
            Ok(()) => true,
            Err(_) => self.id() == id,
        }
    }
}

impl Debug for InstanceDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceDescriptor")
            .field("instance_type", &self.instance_type)
            .field("host_version", &self.host_version)
            .field("id", &self.id.get())
            .finish()
    }
}

/// An addon-side instance.
///
/// Instances are owned by the addon's context, which the host may drive from any of its threads.
pub trait AddonInstance: Send + 'static {
    fn descriptor(&self) -> &InstanceDescriptor;

    /// Creates a nested instance on behalf of this one, when the host passes this instance as the
    /// parent of a creation request.
    ///
    /// The default implementation returns [`AddonStatus::NotImplemented`], which hands the request
    /// over to the addon's root factory.
    #[inline]
    fn create_instance(&mut self, _request: &InstanceRequest<'_>) -> InstanceOutcome {
        InstanceOutcome::not_implemented()
    }
}

/// A request from the host to create a new instance.
#[derive(Copy, Clone, Debug)]
pub struct InstanceRequest<'a> {
    /// The requested type.
    pub instance_type: AddonType,
    /// The identifier the host gives to the new instance.
    pub instance_id: &'a str,
    /// The host's half of the new instance. It must be kept to talk to the host about it.
    pub host_instance: HostInstanceHandle,
    /// The version of the type the host is using.
    pub version: &'a str,
    first_host_instance: HostInstanceHandle,
    single_instance: Option<AddonType>,
}

impl<'a> InstanceRequest<'a> {
    #[inline]
    pub fn new(
        instance_type: AddonType,
        instance_id: &'a str,
        host_instance: HostInstanceHandle,
        version: &'a str,
    ) -> Self {
        Self {
            instance_type,
            instance_id,
            host_instance,
            version,
            first_host_instance: HostInstanceHandle::null(),
            single_instance: None,
        }
    }

    /// Attaches the single-instance state of the addon to this request.
    #[inline]
    pub fn with_single_instance(
        mut self,
        first_host_instance: HostInstanceHandle,
        single_instance: Option<AddonType>,
    ) -> Self {
        self.first_host_instance = first_host_instance;
        self.single_instance = single_instance;
        self
    }

    /// The host's half of the very first instance, as published by the host.
    #[inline]
    pub fn first_host_instance(&self) -> HostInstanceHandle {
        self.first_host_instance
    }

    /// The type of the addon's global single instance, if it runs in single-instance mode.
    #[inline]
    pub fn single_instance(&self) -> Option<AddonType> {
        self.single_instance
    }
}

/// The instance produced by a factory.
pub enum CreatedInstance {
    /// A newly allocated instance, which will be owned by the instance registry.
    New(Box<dyn AddonInstance>),
    /// The addon's root object, acting as the global single instance.
    SingleInstance,
}

impl Debug for CreatedInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CreatedInstance::New(instance) => f
                .debug_tuple("New")
                .field(instance.descriptor())
                .finish(),
            CreatedInstance::SingleInstance => f.write_str("SingleInstance"),
        }
    }
}

/// What a factory did with an [`InstanceRequest`].
///
/// Any status other than [`AddonStatus::NotImplemented`] must come with an instance of the
/// requested type: anything else is a defect in the addon, and aborts.
#[must_use]
#[derive(Debug)]
pub struct InstanceOutcome {
    status: AddonStatus,
    instance: Option<CreatedInstance>,
}

impl InstanceOutcome {
    /// A successfully created instance.
    #[inline]
    pub fn created(instance: impl AddonInstance) -> Self {
        Self::created_with_status(AddonStatus::Ok, instance)
    }

    /// A created instance, reported with a status other than [`AddonStatus::Ok`].
    #[inline]
    pub fn created_with_status(status: AddonStatus, instance: impl AddonInstance) -> Self {
        Self {
            status,
            instance: Some(CreatedInstance::New(Box::new(instance))),
        }
    }

    /// The addon's global single instance, reused for this request.
    #[inline]
    pub fn single_instance() -> Self {
        Self {
            status: AddonStatus::Ok,
            instance: Some(CreatedInstance::SingleInstance),
        }
    }

    /// No instance at all. Only [`AddonStatus::NotImplemented`] is valid without an instance.
    #[inline]
    pub fn status(status: AddonStatus) -> Self {
        Self {
            status,
            instance: None,
        }
    }

    #[inline]
    pub fn not_implemented() -> Self {
        Self::status(AddonStatus::NotImplemented)
    }

    #[inline]
    pub fn unknown() -> Self {
        Self::status(AddonStatus::Unknown)
    }

    #[inline]
    pub fn get_status(&self) -> AddonStatus {
        self.status
    }

    #[inline]
    pub fn instance(&self) -> Option<&CreatedInstance> {
        self.instance.as_ref()
    }

    #[inline]
    pub fn into_parts(self) -> (AddonStatus, Option<CreatedInstance>) {
        (self.status, self.instance)
    }
}

/// The legacy single-instance shortcut, used by the default root factory.
///
/// Succeeds with the global single instance only if all of the following hold:
///
/// 1. the request's host handle is the first host instance handle;
/// 2. the addon has a global single instance;
/// 3. that instance's type is the requested one.
///
/// Otherwise, reports [`AddonStatus::Unknown`] without an instance.
pub fn single_instance_shortcut(request: &InstanceRequest<'_>) -> InstanceOutcome {
    let is_first = request.host_instance == request.first_host_instance;

    match request.single_instance {
        Some(single_type) if is_first && single_type == request.instance_type => {
            InstanceOutcome::single_instance()
        }
        _ => InstanceOutcome::unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(value: usize) -> HostInstanceHandle {
        HostInstanceHandle::from_raw(value as *mut _)
    }

    fn request(host_instance: HostInstanceHandle) -> InstanceRequest<'static> {
        InstanceRequest::new(
            AddonType::INSTANCE_SCREENSAVER,
            "screensaver.1",
            host_instance,
            "2.0.1",
        )
    }

    #[test]
    fn shortcut_succeeds_only_when_all_conditions_hold() {
        let first = host(0x10);
        let outcome = single_instance_shortcut(
            &request(first).with_single_instance(first, Some(AddonType::INSTANCE_SCREENSAVER)),
        );

        assert_eq!(outcome.get_status(), AddonStatus::Ok);
        assert!(matches!(
            outcome.instance(),
            Some(CreatedInstance::SingleInstance)
        ));
    }

    #[test]
    fn shortcut_rejects_other_host_handles() {
        let outcome = single_instance_shortcut(
            &request(host(0x20))
                .with_single_instance(host(0x10), Some(AddonType::INSTANCE_SCREENSAVER)),
        );

        assert_eq!(outcome.get_status(), AddonStatus::Unknown);
        assert!(outcome.instance().is_none());
    }

    #[test]
    fn shortcut_requires_a_single_instance() {
        let first = host(0x10);
        let outcome = single_instance_shortcut(&request(first).with_single_instance(first, None));

        assert_eq!(outcome.get_status(), AddonStatus::Unknown);
        assert!(outcome.instance().is_none());
    }

    #[test]
    fn shortcut_requires_matching_type() {
        let first = host(0x10);
        let outcome = single_instance_shortcut(
            &request(first).with_single_instance(first, Some(AddonType::INSTANCE_VISUALIZATION)),
        );

        assert_eq!(outcome.get_status(), AddonStatus::Unknown);
        assert!(outcome.instance().is_none());
    }

    #[test]
    fn identifier_is_set_once() {
        let descriptor = InstanceDescriptor::new(AddonType::INSTANCE_VFS, "2.3.0");
        assert_eq!(descriptor.id(), "");
        assert!(!descriptor.is_identified());

        assert!(descriptor.stamp("vfs.zip"));
        assert!(descriptor.stamp("vfs.zip"));
        assert!(!descriptor.stamp("vfs.rar"));

        assert_eq!(descriptor.id(), "vfs.zip");
        assert_eq!(descriptor.instance_type(), AddonType::INSTANCE_VFS);
        assert_eq!(descriptor.host_version(), "2.3.0");
    }
}
