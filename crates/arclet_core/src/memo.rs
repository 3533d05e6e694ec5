//! Memoization for pure derivations
//!
//! A [`Memoized`] value wraps a pure function together with its own cache.
//! Owners build their wrappers at construction time and keep them in a
//! private field, so two instances of the same type never observe each
//! other's cached values.
//!
//! Cache keys are derived from the arguments:
//!
//! - No arguments: the result is computed once and kept forever. This is
//!   the lazily computed property case.
//! - Primitive arguments (numbers, strings, booleans, chars): the arguments
//!   are joined with `:` in call order, e.g. `"18:2"`.
//! - Anything else needs an explicit hash function. Calling without one
//!   fails with [`MemoizeError::NonPrimitiveArguments`].
//!
//! # Example
//!
//! ```rust
//! use arclet_core::memo::memoize;
//!
//! let radius = memoize(|(diameter, stroke): (f64, f64)| (diameter - stroke) / 2.0);
//!
//! assert_eq!(radius.call((18.0, 2.0)), 8.0);
//! // Served from the cache under the key "18:2"
//! assert_eq!(radius.call((18.0, 2.0)), 8.0);
//! ```
//!
//! Storage is pluggable through [`MemoCache`]:
//!
//! ```rust
//! use arclet_core::memo::{LruMemoCache, MemberKind, Memoize};
//!
//! let greet = Memoize::<(&str,), String>::options()
//!     .cache_with(|| Box::new(LruMemoCache::with_capacity(64)))
//!     .decorate(MemberKind::Method, |(name,): (&str,)| format!("Hello, {name}"))
//!     .unwrap();
//!
//! assert_eq!(greet.call(("Alice",)), "Hello, Alice");
//! ```

use lru::LruCache;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Misuse of the memoization combinator
///
/// These are programming errors and are meant to surface during development.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoizeError {
    /// The wrapper was attached to something that does not return a value
    #[error("only a method or a getter can be memoized, not a {0}")]
    NonDecoratableDefinition(MemberKind),

    /// Arguments cannot be turned into a key without help
    #[error(
        "memoized function was called with non-primitive arguments; provide an explicit \
         hash function that deterministically maps them to a key, e.g. \
         `.hash_with(|(user, company)| format!(\"{{}}:{{}}\", user.id, company.id))`"
    )]
    NonPrimitiveArguments,
}

/// The kind of member a memoizer is attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A function taking zero or more arguments
    Method,
    /// A computed property
    Getter,
    /// A property setter
    Setter,
    /// A whole type
    Type,
}

impl MemberKind {
    fn is_decoratable(self) -> bool {
        matches!(self, MemberKind::Method | MemberKind::Getter)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberKind::Method => "method",
            MemberKind::Getter => "getter",
            MemberKind::Setter => "setter",
            MemberKind::Type => "type",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Key derivation
// ============================================================================

/// A primitive argument value, as it appears in a cache key
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Int(i128),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Int(v) => write!(f, "{v}"),
            Primitive::Float(v) => write!(f, "{v}"),
            Primitive::Text(v) => f.write_str(v),
            Primitive::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// An argument that may take part in a memoized call
///
/// Primitive types return `Some`. Other types opt in with an empty impl
/// and are then only accepted by wrappers that carry a hash function:
///
/// ```rust
/// use arclet_core::memo::MemoArg;
///
/// struct User {
///     id: u32,
/// }
///
/// impl MemoArg for User {}
/// ```
pub trait MemoArg {
    fn to_primitive(&self) -> Option<Primitive> {
        None
    }
}

/// An argument that always has a primitive key representation
pub trait PrimitiveArg: MemoArg {
    fn primitive(&self) -> Primitive;
}

macro_rules! impl_primitive_arg {
    ($variant:ident as $conv:ty: $($ty:ty),+) => {
        $(
            impl MemoArg for $ty {
                fn to_primitive(&self) -> Option<Primitive> {
                    Some(self.primitive())
                }
            }

            impl PrimitiveArg for $ty {
                fn primitive(&self) -> Primitive {
                    Primitive::$variant(<$conv>::from(*self))
                }
            }
        )+
    };
}

impl_primitive_arg!(Int as i128: i8, i16, i32, i64, u8, u16, u32, u64);
impl_primitive_arg!(Float as f64: f32, f64);
impl_primitive_arg!(Bool as bool: bool);

impl MemoArg for usize {
    fn to_primitive(&self) -> Option<Primitive> {
        Some(self.primitive())
    }
}

impl PrimitiveArg for usize {
    fn primitive(&self) -> Primitive {
        Primitive::Int(*self as i128)
    }
}

impl MemoArg for char {
    fn to_primitive(&self) -> Option<Primitive> {
        Some(self.primitive())
    }
}

impl PrimitiveArg for char {
    fn primitive(&self) -> Primitive {
        Primitive::Text(self.to_string())
    }
}

impl MemoArg for String {
    fn to_primitive(&self) -> Option<Primitive> {
        Some(self.primitive())
    }
}

impl PrimitiveArg for String {
    fn primitive(&self) -> Primitive {
        Primitive::Text(self.clone())
    }
}

impl MemoArg for &str {
    fn to_primitive(&self) -> Option<Primitive> {
        Some(self.primitive())
    }
}

impl PrimitiveArg for &str {
    fn primitive(&self) -> Primitive {
        Primitive::Text((*self).to_string())
    }
}

/// An argument tuple accepted by [`Memoized`]
pub trait MemoArgs {
    /// Number of arguments in the tuple
    const ARITY: usize;

    /// Key made of the joined primitive arguments, or `None` if any
    /// argument is not primitive
    fn primitive_key(&self) -> Option<String>;
}

/// An argument tuple whose key can always be derived
pub trait PrimitiveArgs: MemoArgs {
    fn key(&self) -> String;
}

fn join_key(parts: &[Primitive]) -> String {
    parts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(":")
}

impl MemoArgs for () {
    const ARITY: usize = 0;

    fn primitive_key(&self) -> Option<String> {
        Some(String::new())
    }
}

impl PrimitiveArgs for () {
    fn key(&self) -> String {
        String::new()
    }
}

macro_rules! impl_memo_args {
    ($arity:expr; $($name:ident . $idx:tt),+) => {
        impl<$($name: MemoArg),+> MemoArgs for ($($name,)+) {
            const ARITY: usize = $arity;

            fn primitive_key(&self) -> Option<String> {
                let parts = [$(self.$idx.to_primitive()?),+];
                Some(join_key(&parts))
            }
        }

        impl<$($name: PrimitiveArg),+> PrimitiveArgs for ($($name,)+) {
            fn key(&self) -> String {
                join_key(&[$(self.$idx.primitive()),+])
            }
        }
    };
}

impl_memo_args!(1; A.0);
impl_memo_args!(2; A.0, B.1);
impl_memo_args!(3; A.0, B.1, C.2);
impl_memo_args!(4; A.0, B.1, C.2, D.3);
impl_memo_args!(5; A.0, B.1, C.2, D.3, E.4);
impl_memo_args!(6; A.0, B.1, C.2, D.3, E.4, F.5);

// ============================================================================
// Cache backends
// ============================================================================

/// Storage behind a memoized function
///
/// The default is [`HashMemoCache`]. Any other store, such as the bounded
/// [`LruMemoCache`], can be supplied through [`Memoize::cache_with`]
/// without changing call sites.
pub trait MemoCache<V> {
    /// Get a copy of the cached value
    fn get(&mut self, key: &str) -> Option<V>;

    /// Check whether a value is cached under `key`
    fn has(&self, key: &str) -> bool;

    /// Store a value
    fn set(&mut self, key: String, value: V);
}

/// Unbounded exact-match cache
pub struct HashMemoCache<V> {
    entries: FxHashMap<String, V>,
}

impl<V> HashMemoCache<V> {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for HashMemoCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> MemoCache<V> for HashMemoCache<V> {
    fn get(&mut self, key: &str) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn set(&mut self, key: String, value: V) {
        self.entries.insert(key, value);
    }
}

/// Cache bounded to a fixed number of entries, evicting the least recently used
pub struct LruMemoCache<V> {
    entries: LruCache<String, V>,
}

impl<V> LruMemoCache<V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Create a cache holding at most `capacity` entries (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> MemoCache<V> for LruMemoCache<V> {
    fn get(&mut self, key: &str) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    fn set(&mut self, key: String, value: V) {
        self.entries.put(key, value);
    }
}

// ============================================================================
// Memoize options and wrapper
// ============================================================================

/// Function deriving a cache key from an argument tuple
pub type HashFn<A> = Rc<dyn Fn(&A) -> String>;

/// Factory producing a fresh cache for each wrapper
pub type CacheFactory<V> = Rc<dyn Fn() -> Box<dyn MemoCache<V>>>;

/// Unique identity of a memoized wrapper
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemoToken(u64);

impl MemoToken {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        MemoToken(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// Options for building a [`Memoized`] wrapper
pub struct Memoize<A, R> {
    hash: Option<HashFn<A>>,
    cache_factory: CacheFactory<R>,
}

impl<A: MemoArgs, R: Clone + 'static> Memoize<A, R> {
    /// Default options: derive keys from primitive arguments, store them in a [`HashMemoCache`]
    pub fn options() -> Self {
        Self {
            hash: None,
            cache_factory: Rc::new(|| Box::new(HashMemoCache::<R>::new())),
        }
    }

    /// Derive keys with an explicit hash function
    pub fn hash_with<H>(mut self, hash: H) -> Self
    where
        H: Fn(&A) -> String + 'static,
    {
        self.hash = Some(Rc::new(hash));
        self
    }

    /// Use a custom cache backend
    pub fn cache_with<C>(mut self, factory: C) -> Self
    where
        C: Fn() -> Box<dyn MemoCache<R>> + 'static,
    {
        self.cache_factory = Rc::new(factory);
        self
    }

    /// Wrap `func` for the given member kind
    ///
    /// Fails immediately when the member cannot produce a cacheable value.
    pub fn decorate<F>(self, member: MemberKind, func: F) -> Result<Memoized<A, R>, MemoizeError>
    where
        F: Fn(A) -> R + 'static,
    {
        if !member.is_decoratable() {
            return Err(MemoizeError::NonDecoratableDefinition(member));
        }

        Ok(Memoized {
            token: MemoToken::next(),
            member,
            func: Box::new(func),
            hash: self.hash,
            cache_factory: self.cache_factory,
            slot: RefCell::new(Slot::Empty),
        })
    }
}

/// Memoize a method with default options
pub fn memoize<A, R, F>(func: F) -> Memoized<A, R>
where
    A: MemoArgs,
    R: Clone + 'static,
    F: Fn(A) -> R + 'static,
{
    Memoized {
        token: MemoToken::next(),
        member: MemberKind::Method,
        func: Box::new(func),
        hash: None,
        cache_factory: Rc::new(|| Box::new(HashMemoCache::<R>::new())),
        slot: RefCell::new(Slot::Empty),
    }
}

enum Slot<R> {
    Empty,
    Single(R),
    Keyed(Box<dyn MemoCache<R>>),
}

/// A pure function wrapped together with its own cache
pub struct Memoized<A, R> {
    token: MemoToken,
    member: MemberKind,
    func: Box<dyn Fn(A) -> R>,
    hash: Option<HashFn<A>>,
    cache_factory: CacheFactory<R>,
    slot: RefCell<Slot<R>>,
}

impl<A: MemoArgs, R: Clone> Memoized<A, R> {
    pub fn token(&self) -> MemoToken {
        self.token
    }

    pub fn member(&self) -> MemberKind {
        self.member
    }

    /// Call with arguments whose key can always be derived
    pub fn call(&self, args: A) -> R
    where
        A: PrimitiveArgs,
    {
        if A::ARITY == 0 {
            return self.call_niladic(args);
        }

        let key = match &self.hash {
            Some(hash) => hash(&args),
            None => args.key(),
        };
        self.call_keyed(key, args)
    }

    /// Call with any arguments
    ///
    /// Non-primitive arguments require a hash function.
    pub fn try_call(&self, args: A) -> Result<R, MemoizeError> {
        if A::ARITY == 0 {
            return Ok(self.call_niladic(args));
        }

        let key = match &self.hash {
            Some(hash) => hash(&args),
            None => args
                .primitive_key()
                .ok_or(MemoizeError::NonPrimitiveArguments)?,
        };
        Ok(self.call_keyed(key, args))
    }

    /// Drop every cached value
    pub fn clear(&self) {
        *self.slot.borrow_mut() = Slot::Empty;
    }

    fn call_niladic(&self, args: A) -> R {
        if let Slot::Single(value) = &*self.slot.borrow() {
            return value.clone();
        }

        tracing::trace!(token = self.token.0, "memo miss (niladic)");
        // The borrow is released while computing so the function may use other wrappers
        let value = (self.func)(args);
        *self.slot.borrow_mut() = Slot::Single(value.clone());
        value
    }

    fn call_keyed(&self, key: String, args: A) -> R {
        {
            let mut slot = self.slot.borrow_mut();
            if !matches!(&*slot, Slot::Keyed(_)) {
                *slot = Slot::Keyed((self.cache_factory)());
            }
            if let Slot::Keyed(cache) = &mut *slot {
                if cache.has(&key) {
                    if let Some(value) = cache.get(&key) {
                        return value;
                    }
                }
            }
        }

        tracing::trace!(token = self.token.0, key = %key, "memo miss");
        let value = (self.func)(args);
        if let Slot::Keyed(cache) = &mut *self.slot.borrow_mut() {
            cache.set(key, value.clone());
        }
        value
    }
}

impl<A, R> fmt::Debug for Memoized<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("token", &self.token)
            .field("member", &self.member)
            .field("has_hash", &self.hash.is_some())
            .finish()
    }
}
