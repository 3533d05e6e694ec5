//! Arclet Core
//!
//! Foundational primitives for the Arclet widget crates:
//!
//! - **Memoization**: Cache niladic methods and getters, or methods keyed by
//!   primitive arguments, with pluggable hashing and cache storage
//! - **Completion Channels**: One-to-many event emitters with one-shot
//!   listeners and reentrant emission
//! - **Numeric Helpers**: Significant-figure rounding and percentage clamping
//!
//! # Example
//!
//! ```rust
//! use arclet_core::memo::memoize;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let calls = Rc::new(Cell::new(0));
//! let calls_clone = calls.clone();
//!
//! let area = memoize(move |(w, h): (u32, u32)| {
//!     calls_clone.set(calls_clone.get() + 1);
//!     w * h
//! });
//!
//! assert_eq!(area.call((3, 4)), 12);
//! assert_eq!(area.call((3, 4)), 12);
//! assert_eq!(calls.get(), 1);
//! ```

pub mod emitter;
pub mod memo;
pub mod numeric;

pub use emitter::{EventEmitter, ListenerId, Subscription};
pub use memo::{
    memoize, HashMemoCache, LruMemoCache, MemberKind, MemoArg, MemoArgs, MemoCache, MemoToken,
    Memoize, MemoizeError, Memoized, Primitive, PrimitiveArg, PrimitiveArgs,
};
pub use numeric::{clamp_percent, precise};
