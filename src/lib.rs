#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::inline_always)]
#![allow(clippy::option_if_let_else)]
#![allow(unknown_lints)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(unused_qualifications)]
#![warn(variant_size_differences)]

//! Thread-safe, reference-counting pointers with a separately allocated
//! control block.
//!
//! The type [`SharedPtr<T>`] provides shared ownership of a value of type `T`,
//! allocated in the heap. Invoking [`clone`] on [`SharedPtr`] produces a new
//! handle to the same value in the heap. When the last handle to a given value
//! is dropped or reset, the pointed-to value is also destroyed, exactly once.
//!
//! [`SharedPtr<T>`]: crate::SharedPtr
//! [`clone`]: Clone::clone
//!
//! # Layout
//!
//! Each payload is paired with a *control block*, a separate heap allocation
//! which holds the atomic reference count and a type-erased destructor for the
//! payload. A `SharedPtr` is two pointers wide: a view of the payload and a
//! pointer to the control block. The payload keeps the allocation it was given,
//! so [`SharedPtr::from_box`] and [`SharedPtr::from_raw`] never move or
//! reallocate it.
//!
//! # Empty handles
//!
//! Unlike [`std::sync::Arc`], a `SharedPtr` may own nothing. Empty handles are
//! produced by [`Default`], [`SharedPtr::empty`], [`SharedPtr::take`] and
//! [`SharedPtr::reset`]. Dereferencing an empty handle panics; use
//! [`SharedPtr::as_ref`] to check first.
//!
//! # `SharedPtr` vs. `std::sync::Arc`
//!
//! `SharedPtr` covers the strong-reference half of the API of `Arc`. It does
//! not implement:
//!
//! - Weak references.
//! - Unsized payloads like `[T]`, `str` or `dyn Trait`.
//! - Custom allocators.
//! - `make_mut` and other clone-on-write helpers.
//!
//! # Thread safety
//!
//! Every change to the reference count is a single atomic read-modify-write.
//! Clones of one handle may be created and dropped concurrently from any number
//! of threads, and exactly one thread observes the count reaching zero and
//! drops the payload. Mutating a single handle requires `&mut`, so racing
//! resets or swaps of the same handle are rejected at compile time.
//!
//! [`SharedPtr::use_count`] is a snapshot for diagnostics. Under concurrent
//! use it may be stale by the time it is returned.
//!
//! # Examples
//!
//! ```
//! use std::thread;
//!
//! use sharedptr::SharedPtr;
//!
//! let config = SharedPtr::new(vec![1, 2, 3]);
//!
//! let handles = (0..4)
//!     .map(|_| {
//!         let config = SharedPtr::clone(&config);
//!         thread::spawn(move || config.iter().sum::<i32>())
//!     })
//!     .collect::<Vec<_>>();
//!
//! for handle in handles {
//!     assert_eq!(handle.join().unwrap(), 6);
//! }
//! assert_eq!(SharedPtr::use_count(&config), 1);
//! ```

#![doc(html_root_url = "https://docs.rs/sharedptr/0.1.0")]

// Ensure code blocks in README.md compile
#[cfg(doctest)]
#[doc = include_str!("../README.md")]
mod readme {}

#[macro_use]
extern crate log;

mod block;
mod impls;
mod shared;

pub use shared::SharedPtr;
