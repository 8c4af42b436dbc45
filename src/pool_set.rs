use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ops::BitAnd;
use core::ops::BitOr;
use core::ops::BitXor;
use core::ops::Sub;

use crate::DefaultHashBuilder;
use crate::chain_table::ChainTable;

/// A hash set with pool (interning) semantics, implemented over the chained
/// [`ChainTable`] as the underlying storage.
///
/// `PoolSet<T, S>` stores values of type `T` where `T` implements `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash values. At most one
/// resident instance exists per equality class, and the first inserted
/// instance always wins: a later equal insertion is rejected and never
/// replaces the resident value. The pool methods [`get`], [`put`], and
/// [`take`] expose the resident instance directly, which is what makes the
/// set usable for interning; the membership methods ([`insert`],
/// [`contains`], [`remove`]) answer the same questions as booleans. Both
/// groups operate on the same storage, so they can never disagree about
/// residency.
///
/// Two pools compare equal when they contain the same elements, regardless
/// of hasher builder, seeding, or insertion order. With the `foldhash`
/// feature the pool also hashes order-independently, so equal pools always
/// share a hash.
///
/// [`get`]: PoolSet::get
/// [`put`]: PoolSet::put
/// [`take`]: PoolSet::take
/// [`insert`]: PoolSet::insert
/// [`contains`]: PoolSet::contains
/// [`remove`]: PoolSet::remove
#[derive(Clone)]
pub struct PoolSet<T, S = DefaultHashBuilder> {
    table: ChainTable<T>,
    hash_builder: S,
}

impl<T, S, S2> PartialEq<PoolSet<T, S2>> for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &PoolSet<T, S2>) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

#[cfg(feature = "std")]
impl<T, S, S2> PartialEq<std::collections::HashSet<T, S2>> for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &std::collections::HashSet<T, S2>) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

#[cfg(feature = "foldhash")]
impl<T, S> Hash for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        // Per-element hashing must be deterministic across instances so that
        // equal pools hash equal; the pool's own seeded builder cannot be
        // used here. Summing keeps the result independent of chain order.
        let per_element = foldhash::fast::FixedState::default();
        let mut sum = 0u64;
        for value in self.iter() {
            sum = sum.wrapping_add(per_element.hash_one(value));
        }
        state.write_u64(sum);
    }
}

impl<T, S> Debug for PoolSet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new pool set with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use pool_hash::pool_set::PoolSet;
    ///
    /// let set: PoolSet<i32, _> = PoolSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates a new pool set with the specified capacity and hasher builder.
    ///
    /// The actual capacity may be larger than requested because the
    /// underlying table rounds slot counts up to powers of two. A capacity of
    /// zero allocates nothing until the first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use pool_hash::pool_set::PoolSet;
    ///
    /// let set: PoolSet<i32, _> = PoolSet::with_capacity_and_hasher(100, RandomState::new());
    /// assert!(set.capacity() >= 100);
    /// # }
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: ChainTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Creates a new pool set with the specified capacity, load-factor
    /// threshold, and hasher builder.
    ///
    /// The load factor is accepted as given, without validation, and a value
    /// of `1.0` still grows the table before the element count would exceed
    /// the slot count. See
    /// [`ChainTable::with_capacity_and_load_factor`] for how degenerate
    /// values behave.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use pool_hash::pool_set::PoolSet;
    ///
    /// let set: PoolSet<i32, _> =
    ///     PoolSet::with_capacity_and_load_factor_and_hasher(100, 1.0, RandomState::new());
    /// assert!(set.capacity() >= 100);
    /// # }
    /// ```
    pub fn with_capacity_and_load_factor_and_hasher(
        capacity: usize,
        load_factor: f32,
        hash_builder: S,
    ) -> Self {
        Self {
            table: ChainTable::with_capacity_and_load_factor(capacity, load_factor),
            hash_builder,
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// assert!(set.is_empty());
    /// set.insert(1);
    /// assert!(!set.is_empty());
    /// # }
    /// ```
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the current capacity of the set.
    ///
    /// The capacity is the number of elements the set can hold before the
    /// underlying table grows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::with_capacity(100);
    /// assert!(set.capacity() >= 100);
    /// # }
    /// ```
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the configured load-factor threshold.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Removes all elements from the set.
    ///
    /// This operation preserves the set's allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// set.insert(1);
    /// assert!(!set.is_empty());
    /// set.clear();
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the capacity of the set as much as possible.
    ///
    /// The underlying table shrinks to the smallest slot count that holds
    /// the current elements within the load-factor threshold; an empty set
    /// is deallocated entirely. Cached hashes make this a pure
    /// redistribution.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::with_capacity(1000);
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// set.shrink_to_fit();
    /// assert!(set.capacity() >= 2);
    /// assert!(set.capacity() < 1000);
    /// assert_eq!(set.len(), 2);
    /// # }
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Reserves capacity for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain this value, `true` is
    ///   returned.
    /// - If the set already contained an equal value, `false` is returned,
    ///   the argument is dropped, and the resident instance is untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// assert_eq!(set.insert(37), true);
    /// assert_eq!(set.insert(37), false);
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            crate::chain_table::Entry::Occupied(_) => false,
            crate::chain_table::Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Returns `true` if the set contains a value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// set.insert(1);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&2));
    /// # }
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value).is_some()
    }

    /// Removes a value from the set. Returns whether the value was present
    /// in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// set.insert(1);
    /// assert_eq!(set.remove(&1), true);
    /// assert_eq!(set.remove(&1), false);
    /// # }
    /// ```
    pub fn remove(&mut self, value: &T) -> bool {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value).is_some()
    }

    /// Returns a reference to the resident instance, if any, that is equal
    /// to the given value.
    ///
    /// This is the canonical-instance read half of the pool contract: the
    /// returned reference is the instance that was stored first, not the
    /// probe.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// set.insert(1);
    /// assert_eq!(set.get(&1), Some(&1));
    /// assert_eq!(set.get(&2), None);
    /// # }
    /// ```
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value)
    }

    /// Adds a value to the set if no equal value is resident and returns a
    /// reference to the resident instance either way.
    ///
    /// When an equal value is already present, the argument is dropped and
    /// the original resident instance is returned unchanged; the resident is
    /// never replaced. This is the interning primitive: calling `put` with
    /// equal values any number of times always hands back the same stored
    /// instance.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut pool: PoolSet<String> = PoolSet::new();
    /// assert_eq!(pool.put("key".to_string()), "key");
    ///
    /// // The second equal value is dropped; the first stays resident.
    /// assert_eq!(pool.put("key".to_string()), "key");
    /// assert_eq!(pool.len(), 1);
    /// # }
    /// ```
    pub fn put(&mut self, value: T) -> &T {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            crate::chain_table::Entry::Occupied(entry) => entry.into_mut(),
            crate::chain_table::Entry::Vacant(entry) => entry.insert(value),
        }
    }

    /// Removes and returns the resident instance, if any, that is equal to
    /// the given value.
    ///
    /// Returns `None` without mutating when no equal value is resident.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// set.insert(1);
    /// assert_eq!(set.take(&1), Some(1));
    /// assert_eq!(set.take(&1), None);
    /// # }
    /// ```
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Returns an iterator over the values of the set.
    ///
    /// Values are yielded in table-position order, which depends on hashing
    /// and growth history; treat it as arbitrary.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// for value in set.iter() {
    ///     println!("Value: {}", value);
    /// }
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator that removes and yields all values from the set.
    ///
    /// After calling `drain()`, the set will be empty.
    ///
    /// Calling `mem::forget` on the returned iterator will leak all values
    /// in the set that have not yet been yielded. This can cause memory
    /// leaks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let values: Vec<_> = set.drain().collect();
    /// assert!(set.is_empty());
    /// assert_eq!(values.len(), 2);
    /// # }
    /// ```
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns a cursor over the set that supports removing the value it
    /// last yielded.
    ///
    /// The cursor borrows the set exclusively, so no other mutation can
    /// interleave with the traversal; [`Cursor::remove_current`] takes the
    /// last-yielded value out of the set without disturbing the rest of the
    /// pass.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::from([1, 2, 3, 4, 5]);
    ///
    /// let mut cursor = set.cursor();
    /// while let Some(&value) = cursor.next() {
    ///     if value % 2 == 0 {
    ///         cursor.remove_current();
    ///     }
    /// }
    /// assert_eq!(set.len(), 3);
    /// # }
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, T> {
        Cursor {
            inner: self.table.cursor(),
        }
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all elements `e` for which `f(&e)` returns
    /// `false`. The elements are visited in unsorted (and unspecified)
    /// order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::from([1, 2, 3, 4]);
    ///
    /// set.retain(|&x| x % 2 == 0);
    /// assert_eq!(set.len(), 2);
    /// assert!(set.contains(&2));
    /// assert!(set.contains(&4));
    /// # }
    /// ```
    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.table.retain(f);
    }

    /// Adds every value from the iterator to the set.
    ///
    /// Returns `true` if at least one value was newly inserted. Equal values
    /// already resident are rejected individually, first instance winning,
    /// exactly as with [`insert`].
    ///
    /// [`insert`]: PoolSet::insert
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// assert!(set.insert_all([1, 2, 3]));
    /// assert!(!set.insert_all([1, 2]));
    /// assert_eq!(set.len(), 3);
    /// # }
    /// ```
    pub fn insert_all(&mut self, values: impl IntoIterator<Item = T>) -> bool {
        let mut changed = false;
        for value in values {
            changed |= self.insert(value);
        }
        changed
    }

    /// Returns `true` if every value in the iterator is contained in the
    /// set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// assert!(set.contains_all(&[1, 2]));
    /// assert!(!set.contains_all(&[1, 4]));
    /// # }
    /// ```
    pub fn contains_all<'b>(&self, values: impl IntoIterator<Item = &'b T>) -> bool
    where
        T: 'b,
    {
        values.into_iter().all(|v| self.contains(v))
    }

    /// Removes every value in the iterator from the set.
    ///
    /// Returns `true` if at least one value was removed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// assert!(set.remove_all(&[1, 5]));
    /// assert_eq!(set.len(), 2);
    /// assert!(!set.remove_all(&[9]));
    /// # }
    /// ```
    pub fn remove_all<'b>(&mut self, values: impl IntoIterator<Item = &'b T>) -> bool
    where
        T: 'b,
    {
        let mut changed = false;
        for value in values {
            changed |= self.remove(value);
        }
        changed
    }

    /// Removes every resident element that is not contained in the given
    /// iterator.
    ///
    /// Returns `true` if at least one element was removed. The supplied
    /// values are indexed into a scratch table first, so membership checks
    /// during the sweep are hash lookups rather than scans.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::from([1, 2, 3, 4]);
    /// assert!(set.retain_all(&[2, 4, 6]));
    /// assert_eq!(set.len(), 2);
    /// assert!(set.contains(&2));
    /// assert!(set.contains(&4));
    /// # }
    /// ```
    pub fn retain_all<'b>(&mut self, values: impl IntoIterator<Item = &'b T>) -> bool
    where
        T: 'b,
    {
        let mut keep: ChainTable<&T> = ChainTable::with_capacity(0);
        for value in values {
            let hash = self.hash_builder.hash_one(value);
            keep.entry(hash, |&resident| resident == value)
                .or_insert(value);
        }

        let before = self.table.len();
        self.table.retain(|v| {
            let hash = self.hash_builder.hash_one(v);
            keep.find(hash, |&resident| resident == v).is_some()
        });
        before != self.table.len()
    }

    /// Adds a value and returns the receiver for chaining.
    ///
    /// The returned reference is the same set instance, so chained calls
    /// mutate in place; no copy is made.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let mut set: PoolSet<i32> = PoolSet::new();
    /// set.with(1).with(2).without(&1).with_all([3, 4]);
    /// assert_eq!(set.len(), 3);
    /// assert!(!set.contains(&1));
    /// # }
    /// ```
    pub fn with(&mut self, value: T) -> &mut Self {
        self.insert(value);
        self
    }

    /// Adds every value from the iterator and returns the receiver for
    /// chaining.
    pub fn with_all(&mut self, values: impl IntoIterator<Item = T>) -> &mut Self {
        self.insert_all(values);
        self
    }

    /// Removes a value and returns the receiver for chaining.
    pub fn without(&mut self, value: &T) -> &mut Self {
        self.remove(value);
        self
    }

    /// Removes every value in the iterator and returns the receiver for
    /// chaining.
    pub fn without_all<'b>(&mut self, values: impl IntoIterator<Item = &'b T>) -> &mut Self
    where
        T: 'b,
    {
        self.remove_all(values);
        self
    }

    /// Returns `true` if the set contains no elements in common with
    /// `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2]);
    /// let b: PoolSet<i32> = PoolSet::from([3, 4]);
    ///
    /// assert!(a.is_disjoint(&b));
    /// # }
    /// ```
    pub fn is_disjoint(&self, other: &PoolSet<T, S>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if the set is a subset of another, i.e., `other`
    /// contains at least all the elements in `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2]);
    /// let b: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    ///
    /// assert!(a.is_subset(&b));
    /// # }
    /// ```
    pub fn is_subset(&self, other: &PoolSet<T, S>) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if the set is a superset of another, i.e., `self`
    /// contains at least all the elements in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// let b: PoolSet<i32> = PoolSet::from([1, 2]);
    ///
    /// assert!(a.is_superset(&b));
    /// # }
    /// ```
    pub fn is_superset(&self, other: &PoolSet<T, S>) -> bool {
        other.is_subset(self)
    }

    /// Returns an iterator over the union of `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2]);
    /// let b: PoolSet<i32> = PoolSet::from([2, 3]);
    ///
    /// let union: Vec<_> = a.union(&b).copied().collect();
    /// assert_eq!(union.len(), 3);
    /// # }
    /// ```
    pub fn union<'a>(&'a self, other: &'a PoolSet<T, S>) -> Union<'a, T, S> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            other_set: self,
        }
    }

    /// Returns an iterator over the intersection of `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2]);
    /// let b: PoolSet<i32> = PoolSet::from([2, 3]);
    ///
    /// let intersection: Vec<_> = a.intersection(&b).copied().collect();
    /// assert_eq!(intersection, vec![2]);
    /// # }
    /// ```
    pub fn intersection<'a>(&'a self, other: &'a PoolSet<T, S>) -> Intersection<'a, T, S> {
        if self.len() <= other.len() {
            Intersection {
                iter: self.iter(),
                other,
            }
        } else {
            Intersection {
                iter: other.iter(),
                other: self,
            }
        }
    }

    /// Returns an iterator over the difference of `self` and `other`.
    ///
    /// The difference is asymmetric: it yields the elements of `self` that
    /// are not in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2]);
    /// let b: PoolSet<i32> = PoolSet::from([2, 3]);
    ///
    /// let difference: Vec<_> = a.difference(&b).copied().collect();
    /// assert_eq!(difference, vec![1]);
    /// # }
    /// ```
    pub fn difference<'a>(&'a self, other: &'a PoolSet<T, S>) -> Difference<'a, T, S> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Returns an iterator over the symmetric difference of `self` and
    /// `other`, i.e., the elements in exactly one of the two sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2]);
    /// let b: PoolSet<i32> = PoolSet::from([2, 3]);
    ///
    /// let sym_diff: Vec<_> = a.symmetric_difference(&b).copied().collect();
    /// assert_eq!(sym_diff.len(), 2);
    /// # }
    /// ```
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a PoolSet<T, S>,
    ) -> SymmetricDifference<'a, T, S> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }

    /// Returns a new set containing the elements for which the predicate is
    /// `true`.
    ///
    /// The source set is not mutated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2, 3, 4]);
    /// let even = set.filter(|&v| v % 2 == 0);
    ///
    /// assert_eq!(even.len(), 2);
    /// assert!(even.contains(&2));
    /// assert!(even.contains(&4));
    /// assert_eq!(set.len(), 4);
    /// # }
    /// ```
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> PoolSet<T, S>
    where
        T: Clone,
        S: Default,
    {
        self.iter().filter(|&v| predicate(v)).cloned().collect()
    }

    /// Returns a new set containing the elements for which the predicate is
    /// `false`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2, 3, 4]);
    /// let odd = set.reject(|&v| v % 2 == 0);
    ///
    /// assert_eq!(odd.len(), 2);
    /// assert!(odd.contains(&1));
    /// assert!(odd.contains(&3));
    /// # }
    /// ```
    pub fn reject(&self, mut predicate: impl FnMut(&T) -> bool) -> PoolSet<T, S>
    where
        T: Clone,
        S: Default,
    {
        self.iter().filter(|&v| !predicate(v)).cloned().collect()
    }

    /// Returns a new set of transformed values.
    ///
    /// Transformed values de-duplicate under the same first-instance-wins
    /// rule as insertion, so the result can be smaller than the source.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// let doubled = set.map(|&v| v * 2);
    /// assert!(doubled.contains(&2));
    /// assert!(doubled.contains(&4));
    /// assert!(doubled.contains(&6));
    ///
    /// let parities = set.map(|&v| v % 2);
    /// assert_eq!(parities.len(), 2);
    /// # }
    /// ```
    pub fn map<U>(&self, transform: impl FnMut(&T) -> U) -> PoolSet<U, S>
    where
        U: Hash + Eq,
        S: Default,
    {
        self.iter().map(transform).collect()
    }

    /// Returns a new set of the values for which the closure returns
    /// `Some`, narrowing the element type.
    ///
    /// This is the shape of a runtime-category filter: the closure both
    /// tests each element and converts the ones that belong.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<String> =
    ///     PoolSet::from(["1".to_string(), "two".to_string(), "3".to_string()]);
    /// let numbers = set.filter_map(|s| s.parse::<i32>().ok());
    ///
    /// assert_eq!(numbers.len(), 2);
    /// assert!(numbers.contains(&1));
    /// assert!(numbers.contains(&3));
    /// # }
    /// ```
    pub fn filter_map<U>(&self, f: impl FnMut(&T) -> Option<U>) -> PoolSet<U, S>
    where
        U: Hash + Eq,
        S: Default,
    {
        self.iter().filter_map(f).collect()
    }

    /// Transforms each element into a collection and returns one flattened
    /// set of the results.
    ///
    /// Flattened values de-duplicate under the first-instance-wins rule.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2]);
    /// let expanded = set.flat_map(|&v| [v, v * 2]);
    ///
    /// // 1 -> {1, 2} and 2 -> {2, 4}; the duplicate 2 collapses.
    /// assert_eq!(expanded.len(), 3);
    /// assert!(expanded.contains(&4));
    /// # }
    /// ```
    pub fn flat_map<U, I>(&self, transform: impl FnMut(&T) -> I) -> PoolSet<U, S>
    where
        U: Hash + Eq,
        I: IntoIterator<Item = U>,
        S: Default,
    {
        self.iter().flat_map(transform).collect()
    }

    /// Returns the number of elements satisfying the predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2, 3, 4]);
    /// assert_eq!(set.count(|&v| v % 2 == 0), 2);
    /// # }
    /// ```
    pub fn count(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        self.iter().filter(|&v| predicate(v)).count()
    }

    /// Returns `true` if any element satisfies the predicate.
    ///
    /// Short-circuits on the first satisfying element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// assert!(set.any(|&v| v > 2));
    /// assert!(!set.any(|&v| v > 9));
    /// # }
    /// ```
    pub fn any(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        self.iter().any(predicate)
    }

    /// Returns `true` if every element satisfies the predicate.
    ///
    /// Short-circuits on the first failing element. An empty set satisfies
    /// every predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// assert!(set.all(|&v| v > 0));
    /// assert!(!set.all(|&v| v > 1));
    ///
    /// let empty: PoolSet<i32> = PoolSet::new();
    /// assert!(empty.all(|_| false));
    /// # }
    /// ```
    pub fn all(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        self.iter().all(predicate)
    }

    /// Returns a freshly allocated vector holding a clone of every element,
    /// sized exactly to the element count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// let mut values = set.to_vec();
    /// values.sort_unstable();
    /// assert_eq!(values, vec![1, 2, 3]);
    /// # }
    /// ```
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Copies the elements into the provided buffer, or allocates when it is
    /// too small.
    ///
    /// If `buf` holds at least [`len`] slots, the elements are cloned into
    /// the leading slots, every trailing slot is set to `None`, and this
    /// returns `None` — the caller keeps using its own buffer. If `buf` is
    /// too small it is left completely untouched and a freshly allocated
    /// vector of exactly [`len`] elements is returned instead.
    ///
    /// [`len`]: PoolSet::len
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2]);
    ///
    /// // A large enough buffer is filled in place and the tail is cleared.
    /// let mut buf = [Some(9); 4];
    /// assert!(set.fill_slice(&mut buf).is_none());
    /// assert_eq!(buf.iter().filter(|v| v.is_some()).count(), 2);
    /// assert_eq!(buf[2], None);
    ///
    /// // A too-small buffer is left untouched.
    /// let mut small = [Some(9); 1];
    /// let values = set.fill_slice(&mut small).unwrap();
    /// assert_eq!(values.len(), 2);
    /// assert_eq!(small, [Some(9)]);
    /// # }
    /// ```
    pub fn fill_slice(&self, buf: &mut [Option<T>]) -> Option<Vec<T>>
    where
        T: Clone,
    {
        if buf.len() < self.len() {
            return Some(self.iter().cloned().collect());
        }
        let mut values = self.iter();
        for slot in buf.iter_mut() {
            *slot = values.next().cloned();
        }
        None
    }
}

impl<T, S> PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new pool set using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::new();
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new pool set with the specified capacity using the default
    /// hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::with_capacity(100);
    /// assert!(set.capacity() >= 100);
    /// # }
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    /// Creates a new pool set with the specified capacity and load-factor
    /// threshold using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::with_capacity_and_load_factor(100, 0.5);
    /// assert!(set.capacity() >= 100);
    /// # }
    /// ```
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Self {
        Self::with_capacity_and_load_factor_and_hasher(capacity, load_factor, S::default())
    }
}

impl<T, S> Default for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the values of a `PoolSet`.
pub struct Iter<'a, T> {
    inner: crate::chain_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// A draining iterator over the values of a `PoolSet`.
pub struct Drain<'a, T> {
    inner: crate::chain_table::Drain<'a, T>,
}

/// A consuming iterator over the values of a `PoolSet`.
pub struct IntoIter<T> {
    inner: crate::chain_table::IntoIter<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// A traversal over a `PoolSet` that can remove the value it last yielded.
pub struct Cursor<'a, T> {
    inner: crate::chain_table::Cursor<'a, T>,
}

impl<T> Cursor<'_, T> {
    /// Advances the cursor and returns the next value, or `None` once the
    /// set is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&T> {
        self.inner.next()
    }

    /// Removes and returns the value most recently yielded by [`next`].
    ///
    /// [`next`]: Cursor::next
    ///
    /// # Panics
    ///
    /// Panics if `next` has not yet yielded a value, or if the last-yielded
    /// value was already removed.
    pub fn remove_current(&mut self) -> T {
        self.inner.remove_current()
    }
}

impl<T, S> IntoIterator for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = PoolSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<T, S> Extend<T> for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, S, const N: usize> From<[T; N]> for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Builds a set from an array, dropping duplicate values first-wins.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let set: PoolSet<i32> = PoolSet::from([1, 2, 2, 3]);
    /// assert_eq!(set.len(), 3);
    /// # }
    /// ```
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, S> BitOr<&PoolSet<T, S>> for &PoolSet<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    type Output = PoolSet<T, S>;

    /// Returns the union of `self` and `rhs` as a new set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// let b: PoolSet<i32> = PoolSet::from([3, 4]);
    ///
    /// let union = &a | &b;
    /// assert_eq!(union.len(), 4);
    /// # }
    /// ```
    fn bitor(self, rhs: &PoolSet<T, S>) -> PoolSet<T, S> {
        self.union(rhs).cloned().collect()
    }
}

impl<T, S> BitAnd<&PoolSet<T, S>> for &PoolSet<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    type Output = PoolSet<T, S>;

    /// Returns the intersection of `self` and `rhs` as a new set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// let b: PoolSet<i32> = PoolSet::from([2, 3, 4]);
    ///
    /// let intersection = &a & &b;
    /// assert_eq!(intersection.len(), 2);
    /// # }
    /// ```
    fn bitand(self, rhs: &PoolSet<T, S>) -> PoolSet<T, S> {
        self.intersection(rhs).cloned().collect()
    }
}

impl<T, S> Sub<&PoolSet<T, S>> for &PoolSet<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    type Output = PoolSet<T, S>;

    /// Returns the difference of `self` and `rhs` as a new set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// let b: PoolSet<i32> = PoolSet::from([3, 4]);
    ///
    /// let difference = &a - &b;
    /// assert_eq!(difference.len(), 2);
    /// # }
    /// ```
    fn sub(self, rhs: &PoolSet<T, S>) -> PoolSet<T, S> {
        self.difference(rhs).cloned().collect()
    }
}

impl<T, S> BitXor<&PoolSet<T, S>> for &PoolSet<T, S>
where
    T: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    type Output = PoolSet<T, S>;

    /// Returns the symmetric difference of `self` and `rhs` as a new set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use pool_hash::PoolSet;
    ///
    /// let a: PoolSet<i32> = PoolSet::from([1, 2, 3]);
    /// let b: PoolSet<i32> = PoolSet::from([3, 4]);
    ///
    /// let sym_diff = &a ^ &b;
    /// assert_eq!(sym_diff.len(), 3);
    /// # }
    /// ```
    fn bitxor(self, rhs: &PoolSet<T, S>) -> PoolSet<T, S> {
        self.symmetric_difference(rhs).cloned().collect()
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, T, S> {
    iter: Iter<'a, T>,
    other_iter: Iter<'a, T>,
    other_set: &'a PoolSet<T, S>,
}

impl<'a, T, S> Iterator for Union<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.iter.next() {
            return Some(v);
        }
        loop {
            let v = self.other_iter.next()?;
            if !self.other_set.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a PoolSet<T, S>,
}

impl<'a, T, S> Iterator for Intersection<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S> {
    iter: Iter<'a, T>,
    other: &'a PoolSet<T, S>,
}

impl<'a, T, S> Iterator for Difference<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S> {
    iter: core::iter::Chain<Difference<'a, T, S>, Difference<'a, T, S>>,
}

impl<'a, T, S> Iterator for SymmetricDifference<'a, T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}
