use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};
use core::sync::atomic::{self, Ordering};

use crate::block::ControlBlock;


/// The payload view and control block of an owning [`SharedPtr`].
///
/// Both pointers are present together or not at all.
pub(crate) struct Owned<T> {
    pub(crate) ptr: NonNull<T>,
    pub(crate) block: NonNull<ControlBlock>,
}

impl<T> Clone for Owned<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Owned<T> {}

impl<T> Owned<T> {
    #[inline]
    pub(crate) fn block(&self) -> &ControlBlock {
        // SAFETY: an `Owned` is only reachable through a live `SharedPtr`,
        // which holds one of the references counted by the block.
        unsafe { self.block.as_ref() }
    }
}

/// A thread-safe reference-counting pointer. 'Shared' because every clone
/// shares ownership of one heap-allocated payload.
///
/// The type `SharedPtr<T>` provides shared ownership of a value of type `T`,
/// allocated in the heap. Invoking [`clone`] on `SharedPtr` produces a new
/// handle to the same payload and increments a reference count stored in a
/// separately allocated control block. When the last handle to a given payload
/// is dropped or reset, the payload is dropped and the control block is freed.
///
/// Unlike [`std::sync::Arc`], a `SharedPtr` may be *empty*. An empty handle
/// owns nothing, has a [`use_count`] of zero and panics when dereferenced.
/// Handles become empty through [`Default`], [`SharedPtr::take`] and
/// [`SharedPtr::reset`].
///
/// All functions on `SharedPtr` are associated functions that must be called
/// as, for example, `SharedPtr::use_count(&ptr)` so they do not shadow methods
/// on `T` reached through [`Deref`].
///
/// [`clone`]: Clone::clone
/// [`use_count`]: SharedPtr::use_count
/// [`Deref`]: core::ops::Deref
///
/// # Thread safety
///
/// The reference count is updated with atomic read-modify-write operations,
/// so clones of one handle may be created and dropped concurrently from any
/// number of threads. The thread which drops the last handle runs the
/// payload's destructor. `SharedPtr<T>` is [`Send`] and [`Sync`] when `T` is
/// both `Send` and `Sync`.
///
/// # Examples
///
/// ```
/// use sharedptr::SharedPtr;
///
/// let a = SharedPtr::new(String::from("shared"));
/// let b = SharedPtr::clone(&a);
/// assert_eq!(SharedPtr::use_count(&a), 2);
/// assert_eq!(*b, "shared");
///
/// drop(a);
/// assert_eq!(SharedPtr::use_count(&b), 1);
/// ```
pub struct SharedPtr<T> {
    pub(crate) inner: Option<Owned<T>>,
    phantom: PhantomData<T>,
}

impl<T> SharedPtr<T> {
    /// Construct an empty `SharedPtr` which owns nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// let empty = SharedPtr::<i32>::empty();
    /// assert!(SharedPtr::is_empty(&empty));
    /// assert_eq!(SharedPtr::use_count(&empty), 0);
    /// ```
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            inner: None,
            phantom: PhantomData,
        }
    }

    /// Construct a new `SharedPtr<T>` which owns `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// let five = SharedPtr::new(5);
    /// assert_eq!(*five, 5);
    /// ```
    #[inline]
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Take ownership of an already boxed payload.
    ///
    /// The box's allocation becomes the payload. A fresh control block with a
    /// count of one is allocated next to it.
    #[inline]
    #[must_use]
    pub fn from_box(payload: Box<T>) -> Self {
        let (ptr, block) = ControlBlock::allocate(payload);
        Self::from_owned(Some(Owned { ptr, block }))
    }

    // The caller must have accounted for the reference this handle holds.
    #[inline]
    pub(crate) fn from_owned(inner: Option<Owned<T>>) -> Self {
        Self {
            inner,
            phantom: PhantomData,
        }
    }

    /// Take ownership of a raw payload pointer.
    ///
    /// A null `ptr` yields an empty `SharedPtr`.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must have been returned by [`Box::into_raw`] and must
    /// not be owned by anything else, including another `SharedPtr`.
    /// Constructing two `SharedPtr`s from the same pointer results in a
    /// double free.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// let raw = Box::into_raw(Box::new(10));
    /// let ten = unsafe { SharedPtr::from_raw(raw) };
    /// assert_eq!(*ten, 10);
    ///
    /// let null = unsafe { SharedPtr::<i32>::from_raw(core::ptr::null_mut()) };
    /// assert!(SharedPtr::is_empty(&null));
    /// ```
    #[inline]
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        if ptr.is_null() {
            Self::empty()
        } else {
            Self::from_box(Box::from_raw(ptr))
        }
    }

    /// Returns `true` if `this` owns a payload.
    #[inline]
    #[must_use]
    pub fn is_owning(this: &Self) -> bool {
        this.inner.is_some()
    }

    /// Returns `true` if `this` owns nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(this: &Self) -> bool {
        this.inner.is_none()
    }

    /// Borrow the payload, or `None` if `this` is empty.
    ///
    /// This is the non-panicking counterpart of dereferencing.
    #[inline]
    #[must_use]
    pub fn as_ref(this: &Self) -> Option<&T> {
        // SAFETY: the payload lives at least as long as the reference held by
        // `this`.
        this.inner.as_ref().map(|owned| unsafe { owned.ptr.as_ref() })
    }

    /// Raw view of the payload. Null if `this` is empty.
    ///
    /// The pointer does not carry ownership and is valid only as long as some
    /// `SharedPtr` to the same payload is alive.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// let x = SharedPtr::new("hello");
    /// let y = SharedPtr::clone(&x);
    /// assert_eq!(SharedPtr::as_ptr(&x), SharedPtr::as_ptr(&y));
    /// assert!(SharedPtr::as_ptr(&SharedPtr::<u8>::empty()).is_null());
    /// ```
    #[inline]
    #[must_use]
    pub fn as_ptr(this: &Self) -> *const T {
        this.inner
            .as_ref()
            .map_or(ptr::null(), |owned| owned.ptr.as_ptr().cast_const())
    }

    /// Number of `SharedPtr`s sharing the payload of `this`, or zero if `this`
    /// is empty.
    ///
    /// The count is a snapshot. If handles to the same payload live on other
    /// threads it may change before the caller looks at it, so it must not be
    /// used to make ownership decisions across threads.
    #[inline]
    #[must_use]
    pub fn use_count(this: &Self) -> usize {
        this.inner.as_ref().map_or(0, |owned| owned.block().count())
    }

    /// Returns `true` if both handles share the same control block.
    ///
    /// Two empty handles are considered equal.
    #[inline]
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        match (this.inner, other.inner) {
            (Some(left), Some(right)) => left.block == right.block,
            (None, None) => true,
            _ => false,
        }
    }

    /// Mutable access to the payload if `this` is its only owner.
    ///
    /// Returns `None` if `this` is empty or shared.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// let mut x = SharedPtr::new(3);
    /// *SharedPtr::get_mut(&mut x).unwrap() = 4;
    /// assert_eq!(*x, 4);
    ///
    /// let _y = SharedPtr::clone(&x);
    /// assert!(SharedPtr::get_mut(&mut x).is_none());
    /// ```
    #[inline]
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        let owned = this.inner?;
        if owned.block().count() != 1 {
            return None;
        }
        // Synchronize with the `Release` decrements of handles that were
        // dropped on other threads before touching the payload.
        atomic::fence(Ordering::Acquire);
        // SAFETY: a count of one means no other handle can observe the
        // payload, and `&mut this` prevents new clones for the lifetime of the
        // returned borrow.
        Some(unsafe { &mut *owned.ptr.as_ptr() })
    }

    /// Move the payload out of `this` if it is the only owner.
    ///
    /// Otherwise, `this` is returned unchanged in the `Err` variant. An empty
    /// handle is always returned as an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// let x = SharedPtr::new(3);
    /// assert_eq!(SharedPtr::try_unwrap(x).ok(), Some(3));
    ///
    /// let x = SharedPtr::new(4);
    /// let _y = SharedPtr::clone(&x);
    /// assert!(SharedPtr::try_unwrap(x).is_err());
    /// ```
    pub fn try_unwrap(mut this: Self) -> Result<T, Self> {
        let Some(owned) = this.inner else {
            return Err(this);
        };
        if !owned.block().try_claim() {
            debug!(
                "sharedptr try_unwrap failed, control block {:p} is shared",
                owned.block
            );
            return Err(this);
        }
        // The count is now zero. Disarm `this` so its drop does not release
        // the block a second time.
        this.inner = None;
        unsafe {
            ControlBlock::free(owned.block);
            Ok(*Box::from_raw(owned.ptr.as_ptr()))
        }
    }

    /// Move the payload out of `this` if it is the last owner, otherwise
    /// release `this`.
    ///
    /// If every owner of a payload calls `into_inner`, exactly one of them
    /// receives `Some`, even when the calls race on different threads.
    pub fn into_inner(this: Self) -> Option<T> {
        let mut this = mem::ManuallyDrop::new(this);
        let owned = this.inner.take()?;
        // SAFETY: `this` is never dropped, so the reference it held is
        // released here exactly once.
        unsafe {
            if ControlBlock::release_retaining_payload(owned.block) {
                Some(*Box::from_raw(owned.ptr.as_ptr()))
            } else {
                None
            }
        }
    }

    /// Move the state out of `this`, leaving it empty.
    ///
    /// Ownership is transferred, not duplicated, so the count is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// let mut a = SharedPtr::new(1);
    /// let b = SharedPtr::take(&mut a);
    /// assert!(SharedPtr::is_empty(&a));
    /// assert_eq!(SharedPtr::use_count(&b), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn take(this: &mut Self) -> Self {
        mem::take(this)
    }

    /// Move-assign `source` into `this`.
    ///
    /// `source` is left empty. The previous state of `this` is released after
    /// the new state has been installed.
    #[inline]
    pub fn assign(this: &mut Self, source: &mut Self) {
        let mut tmp = Self::take(source);
        Self::swap(this, &mut tmp);
    }

    /// Exchange the states of two handles. No count is modified.
    #[inline]
    pub fn swap(this: &mut Self, other: &mut Self) {
        mem::swap(&mut this.inner, &mut other.inner);
    }

    /// Release the payload owned by `this`, if any, and leave it empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedptr::SharedPtr;
    ///
    /// let mut a = SharedPtr::new(1);
    /// let b = SharedPtr::clone(&a);
    /// SharedPtr::reset(&mut a);
    /// assert_eq!(SharedPtr::use_count(&a), 0);
    /// assert_eq!(SharedPtr::use_count(&b), 1);
    /// ```
    #[inline]
    pub fn reset(this: &mut Self) {
        let mut tmp = Self::empty();
        Self::swap(this, &mut tmp);
    }

    /// Replace the payload owned by `this` with `payload`.
    ///
    /// The new handle is fully constructed before the previous payload is
    /// released.
    #[inline]
    pub fn reset_with(this: &mut Self, payload: Box<T>) {
        let mut tmp = Self::from_box(payload);
        Self::swap(this, &mut tmp);
    }

    /// Replace the payload owned by `this` with a raw payload pointer.
    ///
    /// A null `ptr` leaves `this` empty.
    ///
    /// # Safety
    ///
    /// Same as [`SharedPtr::from_raw`]. In particular `ptr` must not be the
    /// payload currently owned by `this` or any other `SharedPtr`.
    #[inline]
    pub unsafe fn reset_raw(this: &mut Self, ptr: *mut T) {
        let mut tmp = Self::from_raw(ptr);
        Self::swap(this, &mut tmp);
    }
}
