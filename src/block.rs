use core::ptr::NonNull;
use core::sync::atomic::{self, AtomicUsize, Ordering};
use std::process::abort;

/// Any count above this value means handles have been leaked with
/// `mem::forget` faster than they could ever be dropped.
const MAX_REFCOUNT: usize = isize::MAX as usize;

/// Shared bookkeeping for a single payload.
///
/// The block is not generic over the payload type. It stores a type-erased
/// pointer to the boxed payload together with the monomorphized function that
/// knows how to drop it, so the count can be manipulated without knowledge of
/// `T`.
pub struct ControlBlock {
    count: AtomicUsize,
    payload: NonNull<()>,
    drop_payload: unsafe fn(NonNull<()>),
}

// Reconstitute and drop the `Box<T>` that was leaked in `allocate`.
unsafe fn drop_boxed<T>(payload: NonNull<()>) {
    drop(Box::from_raw(payload.cast::<T>().as_ptr()));
}

impl ControlBlock {
    /// Take ownership of `payload` and allocate a block for it with a count of
    /// one.
    ///
    /// Returns the payload view and the block. The payload and the block are
    /// separate heap allocations.
    pub fn allocate<T>(payload: Box<T>) -> (NonNull<T>, NonNull<Self>) {
        let payload = NonNull::from(Box::leak(payload));
        let block = Box::new(Self {
            count: AtomicUsize::new(1),
            payload: payload.cast(),
            drop_payload: drop_boxed::<T>,
        });
        let block = NonNull::from(Box::leak(block));
        trace!(
            "sharedptr allocated control block {:p} for payload {:p}",
            block,
            payload
        );
        (payload, block)
    }

    /// Relaxed snapshot of the count.
    ///
    /// The value is stale as soon as it is read if other threads hold handles
    /// to the same block. Do not make ownership decisions based on it.
    #[inline]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn increment(&self) {
        // A new reference can only be formed from an existing one, so no
        // synchronization with other threads is required here.
        let old = self.count.fetch_add(1, Ordering::Relaxed);
        if old > MAX_REFCOUNT {
            abort();
        }
    }

    /// Drop one reference. If it was the last one, destroy the payload and
    /// free `this` block.
    ///
    /// Returns `true` if this call observed the 0-transition.
    ///
    /// # Safety
    ///
    /// `this` must point to a live block and the caller must own one of the
    /// references it counts. The caller must not touch the block or the
    /// payload after this call.
    #[inline]
    pub unsafe fn release(this: NonNull<Self>) -> bool {
        if this.as_ref().count.fetch_sub(1, Ordering::Release) != 1 {
            return false;
        }
        // Every other owner's uses of the payload happen-before the decrement
        // that released it. Pair with those `Release` decrements before
        // running the destructor.
        atomic::fence(Ordering::Acquire);

        let block = Box::from_raw(this.as_ptr());
        trace!(
            "sharedptr dropping payload {:p} and freeing control block {:p}",
            block.payload,
            this
        );
        (block.drop_payload)(block.payload);
        drop(block);
        true
    }

    /// Drop one reference. If it was the last one, free `this` block but leave
    /// the payload alive.
    ///
    /// Returns `true` if this call observed the 0-transition, in which case the
    /// caller owns the payload and must drop or move it out.
    ///
    /// # Safety
    ///
    /// Same as [`ControlBlock::release`].
    #[inline]
    pub unsafe fn release_retaining_payload(this: NonNull<Self>) -> bool {
        if this.as_ref().count.fetch_sub(1, Ordering::Release) != 1 {
            return false;
        }
        atomic::fence(Ordering::Acquire);
        trace!("sharedptr freeing control block {:p}, payload moved out", this);
        drop(Box::from_raw(this.as_ptr()));
        true
    }

    /// Attempt to move the count from one to zero without dropping the payload.
    ///
    /// On success the caller is the sole owner and is responsible for the
    /// payload and for calling [`ControlBlock::free`].
    #[inline]
    pub fn try_claim(&self) -> bool {
        self.count
            .compare_exchange(1, 0, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Free the block's memory without touching the payload.
    ///
    /// # Safety
    ///
    /// `this` must have been claimed with [`ControlBlock::try_claim`] and must
    /// not be used afterward.
    #[inline]
    pub unsafe fn free(this: NonNull<Self>) {
        debug_assert_eq!(this.as_ref().count(), 0);
        drop(Box::from_raw(this.as_ptr()));
    }
}
