use crate::instance::{AddonInstance, InstanceHandle};
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// Owns every live instance, keyed by the handle given to the host.
///
/// Handles are never reused during the lifetime of a registry. The root handle is never issued.
pub(crate) struct InstanceRegistry {
    instances: HashMap<InstanceHandle, Box<dyn AddonInstance>>,
    next: NonZeroUsize,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
            // Directly follows the root handle.
            next: NonZeroUsize::MIN.saturating_add(1),
        }
    }

    pub fn insert(&mut self, instance: Box<dyn AddonInstance>) -> InstanceHandle {
        let handle = InstanceHandle::new(self.next);
        self.next = self.next.saturating_add(1);

        self.instances.insert(handle, instance);
        handle
    }

    #[inline]
    pub fn get(&self, handle: InstanceHandle) -> Option<&dyn AddonInstance> {
        self.instances.get(&handle).map(|i| i.as_ref())
    }

    #[inline]
    pub fn get_mut(&mut self, handle: InstanceHandle) -> Option<&mut dyn AddonInstance> {
        self.instances.get_mut(&handle).map(|i| i.as_mut())
    }

    #[inline]
    pub fn remove(&mut self, handle: InstanceHandle) -> Option<Box<dyn AddonInstance>> {
        self.instances.remove(&handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceDescriptor;
    use kaddon_common::addon_type::AddonType;

    struct Dummy(InstanceDescriptor);

    impl AddonInstance for Dummy {
        fn descriptor(&self) -> &InstanceDescriptor {
            &self.0
        }
    }

    fn dummy(instance_type: AddonType) -> Box<dyn AddonInstance> {
        Box::new(Dummy(InstanceDescriptor::new(instance_type, "1.0.0")))
    }

    #[test]
    fn handles_are_unique_and_never_root() {
        let mut registry = InstanceRegistry::new();
        let first = registry.insert(dummy(AddonType::INSTANCE_PVR));
        let second = registry.insert(dummy(AddonType::INSTANCE_VFS));

        assert_ne!(first, second);
        assert!(!first.is_root());
        assert!(!second.is_root());
        assert_eq!(registry.len(), 2);

        assert_eq!(
            registry.get(second).map(|i| i.descriptor().instance_type()),
            Some(AddonType::INSTANCE_VFS)
        );

        assert!(registry.remove(first).is_some());
        assert!(registry.remove(first).is_none());
        assert!(registry.get(first).is_none());

        let third = registry.insert(dummy(AddonType::INSTANCE_PVR));
        assert_ne!(third, first);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn root_is_not_registered() {
        let mut registry = InstanceRegistry::new();
        registry.insert(dummy(AddonType::INSTANCE_PVR));

        assert!(registry.get(InstanceHandle::ROOT).is_none());
        assert!(registry.get_mut(InstanceHandle::ROOT).is_none());
    }
}
