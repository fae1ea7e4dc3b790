//! Data holders for fixed-layout records exchanged with the host.
//!
//! A record crossing the boundary either belongs to the host, which allocated it and hands it to
//! the addon for editing, or to the addon, which builds it from scratch to give it to the host.
//! [`StructHandle`] covers both cases with a single API:
//!
//! * an *owning* handle holds its own heap copy of the record, and frees it when dropped;
//! * a *borrowing* handle points to a record someone else allocated, and edits it in place. It
//!   never frees it, and assigning a new value into it overwrites the external memory, so that
//!   every other holder of that address observes the change.
//!
//! Types exposing a higher-level API over a raw record wrap a [`StructHandle`] and implement
//! [`StructWrapper`].
//!
//! # Example
//!
//! ```
//! use kaddon_common::structure::{StructHandle, StructWrapper};
//!
//! #[allow(non_camel_case_types)]
//! #[repr(C)]
//! #[derive(Copy, Clone, Default)]
//! pub struct sample_data {
//!     pub unique_id: u32,
//! }
//!
//! pub struct SampleData<'a>(StructHandle<'a, sample_data>);
//!
//! impl<'a> StructWrapper<'a> for SampleData<'a> {
//!     type Raw = sample_data;
//!
//!     fn from_handle(handle: StructHandle<'a, sample_data>) -> Self {
//!         Self(handle)
//!     }
//!
//!     fn handle(&self) -> &StructHandle<'a, sample_data> {
//!         &self.0
//!     }
//!
//!     fn handle_mut(&mut self) -> &mut StructHandle<'a, sample_data> {
//!         &mut self.0
//!     }
//! }
//!
//! impl SampleData<'_> {
//!     pub fn set_unique_id(&mut self, id: u32) {
//!         self.0.unique_id = id;
//!     }
//! }
//!
//! // Editing a record the host owns:
//! let mut from_host = sample_data::default();
//! SampleData::borrowing(&mut from_host).set_unique_id(4);
//! assert_eq!(from_host.unique_id, 4);
//!
//! // Building a record to hand to the host:
//! let mut fresh = SampleData::new_owned();
//! fresh.set_unique_id(9);
//! let raw: *const sample_data = fresh.as_raw();
//! # let _ = raw;
//! ```

use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

enum Storage<'a, T> {
    Owned(Box<T>),
    Borrowed(NonNull<T>, PhantomData<&'a mut T>),
}

/// A handle over a raw record that is either owned or borrowed.
///
/// See the [module documentation](self) for more information.
pub struct StructHandle<'a, T: Copy> {
    storage: Storage<'a, T>,
}

impl<'a, T: Copy> StructHandle<'a, T> {
    /// Allocates a new, default-initialized record. The handle owns it.
    #[inline]
    pub fn new() -> Self
    where
        T: Default,
    {
        Self::owned(T::default())
    }

    /// Allocates a copy of the given record. The handle owns it.
    #[inline]
    pub fn from_copy(raw: &T) -> Self {
        Self::owned(*raw)
    }

    /// Allocates a copy of the record behind the given pointer. The handle owns it.
    ///
    /// # Panics
    /// Panics if `raw` is null.
    ///
    /// # Safety
    /// If non-null, `raw` must point to a valid record.
    pub unsafe fn from_raw_copy(raw: *const T) -> Self {
        assert!(!raw.is_null(), "Cannot copy a record from a null pointer");
        Self::owned(raw.read())
    }

    /// Wraps an externally owned record without copying it. The handle borrows it.
    #[inline]
    pub fn borrowed(raw: &'a mut T) -> Self {
        Self {
            storage: Storage::Borrowed(NonNull::from(raw), PhantomData),
        }
    }

    /// Wraps the externally owned record behind the given pointer without copying it. The handle
    /// borrows it, and never frees it.
    ///
    /// # Panics
    /// Panics if `raw` is null.
    ///
    /// # Safety
    /// If non-null, `raw` must point to a valid record that is not accessed through any other path
    /// while this handle is in use, and that outlives `'a`.
    pub unsafe fn from_raw_mut(raw: *mut T) -> Self {
        let raw = NonNull::new(raw).expect("Cannot borrow a record from a null pointer");

        Self {
            storage: Storage::Borrowed(raw, PhantomData),
        }
    }

    #[inline]
    fn owned(value: T) -> Self {
        Self {
            storage: Storage::Owned(Box::new(value)),
        }
    }

    /// Returns `true` if this handle owns its record.
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Replaces the record's value.
    ///
    /// A borrowing handle copies the value into the external record, whose address is preserved.
    /// An owning handle drops its current allocation and allocates a new copy.
    pub fn assign(&mut self, value: &T) {
        match self.storage {
            Storage::Borrowed(ptr, _) => {
                // SAFETY: the pointer is non-null and valid for writes for 'a, per construction
                unsafe { ptr.as_ptr().write(*value) }
            }
            Storage::Owned(_) => self.storage = Storage::Owned(Box::new(*value)),
        }
    }

    /// Replaces the record's value with the value of another handle.
    ///
    /// See [`assign`](Self::assign).
    #[inline]
    pub fn assign_from(&mut self, other: &StructHandle<'_, T>) {
        let value = *other.get();
        self.assign(&value);
    }

    #[inline]
    pub fn get(&self) -> &T {
        match &self.storage {
            Storage::Owned(b) => &**b,
            // SAFETY: the pointer is non-null and valid for 'a, per construction
            Storage::Borrowed(ptr, _) => unsafe { ptr.as_ref() },
        }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        match &mut self.storage {
            Storage::Owned(b) => &mut **b,
            // SAFETY: the pointer is non-null, valid and exclusive for 'a, per construction
            Storage::Borrowed(ptr, _) => unsafe { ptr.as_mut() },
        }
    }

    /// Returns a pointer to the record, for handing it to the other side.
    ///
    /// For an owning handle, the pointer is only valid as long as the handle is alive and not
    /// assigned to.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.get()
    }

    /// Returns a mutable pointer to the record, for handing it to the other side.
    ///
    /// See [`as_ptr`](Self::as_ptr).
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.get_mut()
    }
}

impl<T: Copy + Default> Default for StructHandle<'_, T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning always produces an owning handle with an independent copy of the record.
impl<T: Copy> Clone for StructHandle<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self::from_copy(self.get())
    }
}

impl<T: Copy> From<&T> for StructHandle<'_, T> {
    #[inline]
    fn from(raw: &T) -> Self {
        Self::from_copy(raw)
    }
}

impl<T: Copy> Deref for StructHandle<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: Copy> DerefMut for StructHandle<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T: Copy + Debug> Debug for StructHandle<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructHandle")
            .field("owned", &self.is_owned())
            .field("record", self.get())
            .finish()
    }
}

// SAFETY: a borrowing handle behaves like a &mut T, and an owning one like a Box<T>
unsafe impl<T: Copy + Send> Send for StructHandle<'_, T> {}
// SAFETY: a borrowing handle behaves like a &mut T, and an owning one like a Box<T>
unsafe impl<T: Copy + Sync> Sync for StructHandle<'_, T> {}

/// A higher-level type built over a [`StructHandle`].
///
/// Implementors only provide access to their handle. All construction paths and assignment
/// semantics are then shared.
pub trait StructWrapper<'a>: Sized + 'a {
    /// The raw, fixed-layout record this type wraps.
    type Raw: Copy + 'a;

    fn from_handle(handle: StructHandle<'a, Self::Raw>) -> Self;
    fn handle(&self) -> &StructHandle<'a, Self::Raw>;
    fn handle_mut(&mut self) -> &mut StructHandle<'a, Self::Raw>;

    /// Creates a wrapper over a new, default-initialized, owned record.
    #[inline]
    fn new_owned() -> Self
    where
        Self::Raw: Default,
    {
        Self::from_handle(StructHandle::new())
    }

    /// Creates a wrapper over an owned copy of the given record.
    #[inline]
    fn from_raw_copy(raw: &Self::Raw) -> Self {
        Self::from_handle(StructHandle::from_copy(raw))
    }

    /// Creates a wrapper editing the given external record in place.
    #[inline]
    fn borrowing(raw: &'a mut Self::Raw) -> Self {
        Self::from_handle(StructHandle::borrowed(raw))
    }

    /// Returns a new, owning wrapper with an independent copy of this wrapper's record.
    #[inline]
    fn owned_copy(&self) -> Self {
        Self::from_handle(self.handle().clone())
    }

    /// Assigns the value of another wrapper into this one.
    ///
    /// See [`StructHandle::assign`] for the semantics.
    #[inline]
    fn assign_wrapper(&mut self, other: &Self) {
        let value = *other.handle().get();
        self.handle_mut().assign(&value);
    }

    /// Assigns the value of a raw record into this wrapper.
    #[inline]
    fn assign_raw(&mut self, raw: &Self::Raw) {
        self.handle_mut().assign(raw);
    }

    #[inline]
    fn raw<'s>(&'s self) -> &'s Self::Raw
    where
        'a: 's,
    {
        self.handle().get()
    }

    #[inline]
    fn as_raw(&self) -> *const Self::Raw {
        self.handle().as_ptr()
    }

    #[inline]
    fn as_raw_mut(&mut self) -> *mut Self::Raw {
        self.handle_mut().as_mut_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(non_camel_case_types)]
    #[repr(C)]
    #[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
    struct sample_data {
        unique_id: u32,
        flags: u64,
    }

    struct SampleData<'a>(StructHandle<'a, sample_data>);

    impl<'a> StructWrapper<'a> for SampleData<'a> {
        type Raw = sample_data;

        fn from_handle(handle: StructHandle<'a, sample_data>) -> Self {
            Self(handle)
        }

        fn handle(&self) -> &StructHandle<'a, sample_data> {
            &self.0
        }

        fn handle_mut(&mut self) -> &mut StructHandle<'a, sample_data> {
            &mut self.0
        }
    }

    impl SampleData<'_> {
        fn unique_id(&self) -> u32 {
            self.0.unique_id
        }

        fn set_unique_id(&mut self, id: u32) {
            self.0.unique_id = id;
        }
    }

    #[test]
    fn default_is_owned_and_zeroed() {
        let handle = StructHandle::<sample_data>::new();
        assert!(handle.is_owned());
        assert_eq!(*handle, sample_data::default());
    }

    #[test]
    fn copies_are_independent() {
        let mut a = SampleData::new_owned();
        a.set_unique_id(1);

        let b = a.owned_copy();
        a.set_unique_id(2);

        assert_eq!(a.unique_id(), 2);
        assert_eq!(b.unique_id(), 1);
        assert!(b.handle().is_owned());
    }

    #[test]
    fn raw_access_goes_through_the_wrapper() {
        let mut external = sample_data {
            unique_id: 5,
            flags: 1,
        };
        let address = &external as *const sample_data;

        let mut wrapper = SampleData::borrowing(&mut external);
        assert_eq!(
            wrapper.raw(),
            &sample_data {
                unique_id: 5,
                flags: 1,
            }
        );

        wrapper.assign_raw(&sample_data {
            unique_id: 6,
            flags: 2,
        });
        assert_eq!(wrapper.raw().unique_id, 6);
        assert_eq!(wrapper.as_raw_mut().cast_const(), address);

        let copy = wrapper.owned_copy();
        assert_eq!(copy.raw().flags, 2);
        assert_ne!(copy.as_raw(), address);
    }

    #[test]
    fn copy_from_raw_does_not_alias() {
        let mut external = sample_data {
            unique_id: 3,
            flags: 0,
        };

        // SAFETY: pointer comes from a valid reference
        let mut handle = unsafe { StructHandle::from_raw_copy(&external as *const sample_data) };
        assert!(handle.is_owned());
        assert_ne!(handle.as_ptr(), &external as *const sample_data);

        handle.unique_id = 10;
        external.flags = 5;
        assert_eq!(external.unique_id, 3);
        assert_eq!(handle.flags, 0);
    }

    #[test]
    fn borrowed_assignment_writes_in_place() {
        let mut external = sample_data::default();
        let address = &external as *const sample_data;

        {
            let mut c = SampleData::borrowing(&mut external);
            assert!(!c.handle().is_owned());

            let replacement = SampleData::from_raw_copy(&sample_data {
                unique_id: 77,
                flags: 0xFF,
            });
            c.assign_wrapper(&replacement);

            assert_eq!(c.as_raw(), address);
        }

        assert_eq!(
            external,
            sample_data {
                unique_id: 77,
                flags: 0xFF,
            }
        );
    }

    #[test]
    fn borrowed_assignment_is_seen_through_raw_pointer() {
        let mut external = sample_data::default();
        let raw = &mut external as *mut sample_data;

        // SAFETY: raw comes from a valid, otherwise unused reference
        let mut handle = unsafe { StructHandle::from_raw_mut(raw) };
        handle.assign(&sample_data {
            unique_id: 5,
            flags: 6,
        });
        assert_eq!(handle.as_mut_ptr(), raw);
        drop(handle);

        assert_eq!(external.unique_id, 5);
        assert_eq!(external.flags, 6);
    }

    #[test]
    fn owned_assignment_never_touches_previous_source() {
        let source = sample_data {
            unique_id: 1,
            flags: 1,
        };
        let mut handle = StructHandle::from_copy(&source);
        let before = handle.as_ptr();

        handle.assign(&sample_data {
            unique_id: 2,
            flags: 2,
        });

        assert!(handle.is_owned());
        assert_ne!(before, &source as *const _);
        assert_eq!(source.unique_id, 1);
        assert_eq!(handle.unique_id, 2);
    }

    #[test]
    fn assigning_borrowed_into_owned_copies() {
        let mut external = sample_data {
            unique_id: 9,
            flags: 0,
        };
        let mut owned = StructHandle::<sample_data>::new();

        {
            let borrowed = StructHandle::borrowed(&mut external);
            owned.assign_from(&borrowed);
        }

        owned.unique_id = 11;
        assert!(owned.is_owned());
        assert_eq!(external.unique_id, 9);
    }

    #[test]
    fn dropping_borrowed_leaves_record_intact() {
        let mut external = sample_data {
            unique_id: 8,
            flags: 8,
        };

        let mut handle = StructHandle::borrowed(&mut external);
        handle.flags = 9;
        drop(handle);

        assert_eq!(external.unique_id, 8);
        assert_eq!(external.flags, 9);
    }

    #[test]
    fn cloning_a_borrowed_handle_owns() {
        let mut external = sample_data::default();
        let borrowed = StructHandle::borrowed(&mut external);
        let mut clone = borrowed.clone();
        clone.unique_id = 4;

        assert!(clone.is_owned());
        assert_eq!(borrowed.unique_id, 0);
    }

    #[test]
    #[should_panic(expected = "null pointer")]
    fn borrowing_null_panics() {
        // SAFETY: null is checked before any access
        let _ = unsafe { StructHandle::<sample_data>::from_raw_mut(core::ptr::null_mut()) };
    }

    #[test]
    #[should_panic(expected = "null pointer")]
    fn copying_null_panics() {
        // SAFETY: null is checked before any access
        let _ = unsafe { StructHandle::<sample_data>::from_raw_copy(core::ptr::null()) };
    }
}
