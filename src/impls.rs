use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Deref;

use crate::block::ControlBlock;
use crate::SharedPtr;

// SAFETY: like `Arc<T>`, a `SharedPtr<T>` hands out `&T` on any thread that
// holds a clone and runs `T`'s destructor on whichever thread releases last.
unsafe impl<T: Send + Sync> Send for SharedPtr<T> {}
unsafe impl<T: Send + Sync> Sync for SharedPtr<T> {}

impl<T> Clone for SharedPtr<T> {
    /// Make a clone of the `SharedPtr`.
    ///
    /// This creates another handle to the same payload and increments the
    /// reference count. Cloning an empty handle yields an empty handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// let five = SharedPtr::new(5);
    /// let _ = SharedPtr::clone(&five);
    ///
    /// assert_eq!(SharedPtr::use_count(&five), 1);
    /// let other = SharedPtr::clone(&five);
    /// assert_eq!(SharedPtr::use_count(&five), 2);
    /// assert!(SharedPtr::ptr_eq(&five, &other));
    /// ```
    #[inline]
    fn clone(&self) -> Self {
        if let Some(owned) = self.inner {
            owned.block().increment();
        }
        Self::from_owned(self.inner)
    }

    /// Copy-assign `source` into `self`.
    ///
    /// `source` is cloned into a temporary which is swapped into `self`, then
    /// the previous state of `self` is released. Assigning a handle that
    /// shares `self`'s control block leaves the count unchanged.
    #[inline]
    fn clone_from(&mut self, source: &Self) {
        let mut tmp = source.clone();
        Self::swap(self, &mut tmp);
    }
}

impl<T> Drop for SharedPtr<T> {
    /// Drops the `SharedPtr`.
    ///
    /// This will decrement the reference count. If the count reaches zero, the
    /// payload is dropped and the control block is freed. Dropping an empty
    /// handle does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// struct Foo;
    ///
    /// impl Drop for Foo {
    ///     fn drop(&mut self) {
    ///         println!("dropped!");
    ///     }
    /// }
    ///
    /// let foo  = SharedPtr::new(Foo);
    /// let foo2 = SharedPtr::clone(&foo);
    ///
    /// drop(foo);    // Doesn't print anything
    /// drop(foo2);   // Prints "dropped!"
    /// ```
    #[inline]
    fn drop(&mut self) {
        if let Some(owned) = self.inner.take() {
            // SAFETY: `self` held one reference to the block and gives it up
            // here exactly once.
            unsafe {
                ControlBlock::release(owned.block);
            }
        }
    }
}

impl<T> Default for SharedPtr<T> {
    /// Creates an empty `SharedPtr<T>`.
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for SharedPtr<T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the `SharedPtr` is empty. Use [`SharedPtr::as_ref`] for a
    /// non-panicking alternative.
    #[inline]
    #[track_caller]
    fn deref(&self) -> &T {
        match Self::as_ref(self) {
            Some(payload) => payload,
            None => panic!("dereferenced an empty SharedPtr"),
        }
    }
}

impl<T> From<T> for SharedPtr<T> {
    /// Converts a generic type `T` into a `SharedPtr<T>`.
    ///
    /// The conversion allocates on the heap and moves `t` from the stack into
    /// it.
    ///
    /// # Example
    ///
    /// ```
    /// # use sharedptr::SharedPtr;
    /// let x = 5;
    /// let ptr = SharedPtr::new(5);
    ///
    /// assert_eq!(SharedPtr::from(x), ptr);
    /// ```
    #[inline]
    fn from(t: T) -> Self {
        Self::new(t)
    }
}

impl<T> From<Box<T>> for SharedPtr<T> {
    /// Move a boxed object into a new `SharedPtr` without reallocating it.
    ///
    /// # Example
    ///
    /// ```
    /// # use sharedptr::SharedPtr;
    /// let original: Box<i32> = Box::new(1);
    /// let shared: SharedPtr<i32> = SharedPtr::from(original);
    /// assert_eq!(1, *shared);
    /// ```
    #[inline]
    fn from(payload: Box<T>) -> Self {
        Self::from_box(payload)
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::as_ref(self) {
            Some(payload) => fmt::Debug::fmt(payload, f),
            None => f.write_str("(empty)"),
        }
    }
}

impl<T: fmt::Display> fmt::Display for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::as_ref(self) {
            Some(payload) => fmt::Display::fmt(payload, f),
            None => f.write_str("(empty)"),
        }
    }
}

impl<T> fmt::Pointer for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&Self::as_ptr(self), f)
    }
}

// Comparisons look through to the payloads. An empty handle is equal to other
// empty handles and orders before every owning handle.

impl<T: PartialEq> PartialEq for SharedPtr<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Self::as_ref(self) == Self::as_ref(other)
    }
}

impl<T: Eq> Eq for SharedPtr<T> {}

impl<T: PartialOrd> PartialOrd for SharedPtr<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Self::as_ref(self).partial_cmp(&Self::as_ref(other))
    }
}

impl<T: Ord> Ord for SharedPtr<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        Self::as_ref(self).cmp(&Self::as_ref(other))
    }
}

impl<T: Hash> Hash for SharedPtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Self::as_ref(self).hash(state);
    }
}
