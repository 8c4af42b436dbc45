use alloc::boxed::Box;
use core::fmt::Debug;

use smallvec::SmallVec;

/// Slot count allocated the first time an empty table receives an entry.
const MIN_SLOTS: usize = 8;

/// Growth threshold used when no load factor is supplied.
const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// One stored value plus its cached hash. The hash travels with the value so
/// redistribution never has to re-hash keys.
#[derive(Clone)]
struct Node<V> {
    hash: u64,
    value: V,
}

/// A collision chain. The first entry lives inline in the slot; a chain only
/// touches the heap once its slot actually collides.
type Chain<V> = SmallVec<[Node<V>; 1]>;

fn new_chain_array<V>(slots: usize) -> Box<[Chain<V>]> {
    (0..slots).map(|_| SmallVec::new()).collect()
}

/// Picks a power-of-two slot count that holds `capacity` entries without
/// crossing the load-factor threshold.
fn slots_for(capacity: usize, load_factor: f32) -> usize {
    let lf = load_factor as f64;
    let needed = if lf.is_finite() && lf > 0.0 && lf <= 1.0 {
        (capacity as f64 / lf).ceil() as usize
    } else {
        // Degenerate load factors size by raw capacity; the growth policy
        // handles them from there.
        capacity
    };
    needed
        .max(MIN_SLOTS)
        .checked_next_power_of_two()
        .expect("allocation size overflow")
}

/// Number of entries the table holds before the next growth.
///
/// `NaN` never compares as exceeded, so it disables growth outright; values
/// at or below zero make every insertion grow the table.
fn max_load_for(slots: usize, load_factor: f32) -> usize {
    if slots == 0 {
        return 0;
    }
    let target = slots as f64 * load_factor as f64;
    if target.is_nan() {
        return usize::MAX;
    }
    if target <= 0.0 {
        return 0;
    }
    if target >= usize::MAX as f64 {
        return usize::MAX;
    }
    target as usize
}

/// A chained hash table storing values by hash and equality predicate.
///
/// The table is an array of collision chains. Each value is stored together
/// with its full 64-bit hash in the chain selected by masking that hash, and
/// chains keep their entries in insertion order. The table itself never
/// hashes anything: every operation takes a pre-computed hash and an equality
/// predicate, so callers own the choice of hasher.
///
/// Growth doubles the slot count whenever an insertion pushes the entry count
/// past `slots * load_factor`, and it runs after the entry has been placed,
/// never before. Entries move to their new chains by cached hash; they are
/// never re-hashed, cloned, or replaced. Removal never shrinks the table.
///
/// # Examples
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use pool_hash::chain_table::ChainTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_str(s: &str) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     s.hash(&mut hasher);
/// #     hasher.finish()
/// # }
/// #
/// let mut table = ChainTable::with_capacity(10);
/// let hash = hash_str("key");
///
/// match table.entry(hash, |s: &String| s == "key") {
///     pool_hash::chain_table::Entry::Vacant(entry) => {
///         entry.insert("key".to_string());
///     }
///     pool_hash::chain_table::Entry::Occupied(entry) => {
///         println!("already resident: {}", entry.get());
///     }
/// }
///
/// assert_eq!(table.find(hash, |s| s == "key"), Some(&"key".to_string()));
/// ```
#[derive(Clone)]
pub struct ChainTable<V> {
    chains: Box<[Chain<V>]>,
    len: usize,
    load_factor: f32,
    max_load: usize,
}

impl<V> Debug for ChainTable<V>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<V> ChainTable<V> {
    /// Creates a new table with the specified capacity and the default growth
    /// threshold of 0.75.
    ///
    /// A capacity of zero allocates nothing; the table grows lazily on first
    /// insertion. The actual capacity may be larger than requested because
    /// slot counts are rounded up to powers of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let table: ChainTable<String> = ChainTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    ///
    /// let empty: ChainTable<String> = ChainTable::with_capacity(0);
    /// assert_eq!(empty.capacity(), 0);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Creates a new table with the specified capacity and load-factor
    /// threshold.
    ///
    /// The load factor is accepted as given, without validation. Values in
    /// `(0.0, 1.0]` behave as expected — `1.0` still grows the table before
    /// the entry count would exceed the slot count. Values at or below zero
    /// force a growth on nearly every insertion, values above one defer
    /// growth and lengthen chains instead, and `NaN` disables growth
    /// entirely. None of these corrupt the table.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity overflows the maximum slot count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let table: ChainTable<u64> = ChainTable::with_capacity_and_load_factor(100, 1.0);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Self {
        let chains: Box<[Chain<V>]> = if capacity == 0 {
            Box::default()
        } else {
            new_chain_array(slots_for(capacity, load_factor))
        };
        let max_load = max_load_for(chains.len(), load_factor);
        Self {
            chains,
            len: 0,
            load_factor,
            max_load,
        }
    }

    /// Returns the number of entries in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// assert_eq!(table.len(), 0);
    ///
    /// table.entry(7, |&n: &u64| n == 7).or_insert(7);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table contains no entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let table: ChainTable<i32> = ChainTable::with_capacity(10);
    /// assert!(table.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of entries the table can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.max_load
    }

    /// Returns the configured load-factor threshold.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Removes all entries from the table.
    ///
    /// The allocated slot array is retained, so a cleared table re-fills
    /// without growing. All values are dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// let capacity = table.capacity();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        for chain in self.chains.iter_mut() {
            chain.clear();
        }
        self.len = 0;
    }

    /// Reserves capacity for at least `additional` more entries.
    ///
    /// After calling `reserve`, capacity is greater than or equal to
    /// `self.len() + additional`. Does nothing if capacity is already
    /// sufficient. Cached hashes make this a pure redistribution; no key is
    /// re-hashed.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows the maximum slot count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let mut table: ChainTable<i32> = ChainTable::with_capacity(4);
    /// table.reserve(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let needed = self
            .len
            .checked_add(additional)
            .expect("allocation size overflow");
        if needed <= self.max_load {
            return;
        }
        let new_slots = slots_for(needed, self.load_factor).max(self.chains.len());
        self.rebuild(new_slots);
    }

    /// Shrinks the table to the smallest slot count that holds the current
    /// entries within the load-factor threshold.
    ///
    /// An empty table is deallocated back to the zero-capacity state.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let mut table: ChainTable<i32> = ChainTable::with_capacity(1000);
    /// table.entry(3, |&n: &i32| n == 3).or_insert(3);
    ///
    /// table.shrink_to_fit();
    /// assert!(table.capacity() < 1000);
    /// assert_eq!(table.find(3, |&n| n == 3), Some(&3));
    /// ```
    pub fn shrink_to_fit(&mut self) {
        if self.len == 0 {
            self.chains = Box::default();
            self.max_load = 0;
            return;
        }
        let target = slots_for(self.len, self.load_factor);
        if target < self.chains.len() {
            self.rebuild(target);
        }
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// Returns a reference to the value if found, or `None` if no matching
    /// value exists. Does not modify the table.
    ///
    /// # Arguments
    ///
    /// * `hash` - The hash value to search for
    /// * `eq` - A predicate that returns `true` for the desired value
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use pool_hash::chain_table::ChainTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(hash_u64(42), |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.find(hash_u64(42), |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(hash_u64(99), |&n| n == 99), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let chain = self.chain(hash)?;
        chain
            .iter()
            .find(|node| node.hash == hash && eq(&node.value))
            .map(|node| &node.value)
    }

    /// Finds a value by hash and equality predicate, returning a mutable
    /// reference.
    ///
    /// # Arguments
    ///
    /// * `hash` - The hash value to search for
    /// * `eq` - A predicate that returns `true` for the desired value
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use pool_hash::chain_table::ChainTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(hash_u64(42), |&n: &u64| n == 42).or_insert(42);
    ///
    /// if let Some(value) = table.find_mut(hash_u64(42), |&n| n == 42) {
    ///     *value = 100;
    /// }
    /// assert_eq!(table.find(hash_u64(42), |&n| n == 100), Some(&100));
    /// ```
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        if self.chains.is_empty() {
            return None;
        }
        let slot = self.slot_index(hash);
        self.chains[slot]
            .iter_mut()
            .find(|node| node.hash == hash && eq(&node.value))
            .map(|node| &mut node.value)
    }

    /// Removes and returns a value from the table.
    ///
    /// The entry is removed from any position in its chain, including the
    /// interior. Returns `None` without mutating if no entry matches. The
    /// slot array is never shrunk by removal.
    ///
    /// # Arguments
    ///
    /// * `hash` - The hash value of the entry to remove
    /// * `eq` - A predicate that returns `true` for the value to remove
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use pool_hash::chain_table::ChainTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(hash_u64(42), |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(hash_u64(42), |&n| n == 42), Some(42));
    /// assert_eq!(table.remove(hash_u64(42), |&n| n == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        if self.chains.is_empty() {
            return None;
        }
        let slot = self.slot_index(hash);
        let chain = &mut self.chains[slot];
        let pos = chain
            .iter()
            .position(|node| node.hash == hash && eq(&node.value))?;
        let node = chain.remove(pos);
        self.len -= 1;
        Some(node.value)
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// The returned [`Entry`] distinguishes a resident value from a vacant
    /// chain position and allows insertion or in-place access without a
    /// second lookup.
    ///
    /// # Arguments
    ///
    /// * `hash` - The hash value for the entry
    /// * `eq` - A predicate that returns `true` for matching values
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use pool_hash::chain_table::ChainTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// let hash = hash_str("hello");
    ///
    /// table
    ///     .entry(hash, |s: &String| s == "hello")
    ///     .or_insert("hello".to_string());
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        if !self.chains.is_empty() {
            let slot = self.slot_index(hash);
            if let Some(pos) = self.chains[slot]
                .iter()
                .position(|node| node.hash == hash && eq(&node.value))
            {
                return Entry::Occupied(OccupiedEntry {
                    table: self,
                    slot,
                    pos,
                });
            }
        }
        Entry::Vacant(VacantEntry { table: self, hash })
    }

    /// Retains only the values for which the predicate returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// for n in 0..10u64 {
    ///     table.entry(n, |&v: &u64| v == n).or_insert(n);
    /// }
    ///
    /// table.retain(|&v| v % 2 == 0);
    /// assert_eq!(table.len(), 5);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&V) -> bool) {
        for chain in self.chains.iter_mut() {
            let before = chain.len();
            chain.retain(|node| f(&node.value));
            // Settled per chain so `len` stays accurate if `f` unwinds.
            self.len -= before - chain.len();
        }
    }

    /// Returns an iterator over all values in the table.
    ///
    /// Values are yielded in table-position order: slot index ascending, then
    /// chain order within each slot. That order is an artifact of hashing and
    /// growth history, so callers should treat it as arbitrary.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// table.entry(2, |&n: &u64| n == 2).or_insert(2);
    ///
    /// assert_eq!(table.iter().count(), 2);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            chains: self.chains.iter(),
            current: Default::default(),
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// After the iterator is consumed or dropped, the table is empty. The
    /// slot array is retained.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    ///
    /// let values: Vec<u64> = table.drain().collect();
    /// assert_eq!(values, vec![1]);
    /// assert!(table.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            slot: 0,
        }
    }

    /// Returns a cursor over the table that supports removing the value it
    /// last yielded.
    ///
    /// The cursor walks the same table-position order as [`iter`], but it
    /// borrows the table exclusively, so [`Cursor::remove_current`] can take
    /// the last-yielded entry out of its chain mid-traversal. Positions after
    /// the removed entry are still visited exactly once.
    ///
    /// [`iter`]: ChainTable::iter
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use pool_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// for n in 0..6u64 {
    ///     table.entry(n, |&v: &u64| v == n).or_insert(n);
    /// }
    ///
    /// let mut cursor = table.cursor();
    /// while let Some(&value) = cursor.next() {
    ///     if value % 2 == 1 {
    ///         cursor.remove_current();
    ///     }
    /// }
    /// assert_eq!(table.len(), 3);
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, V> {
        Cursor {
            table: self,
            slot: 0,
            pos: 0,
            last: None,
        }
    }

    #[inline(always)]
    fn slot_index(&self, hash: u64) -> usize {
        (hash as usize) & (self.chains.len() - 1)
    }

    fn chain(&self, hash: u64) -> Option<&Chain<V>> {
        if self.chains.is_empty() {
            return None;
        }
        Some(&self.chains[self.slot_index(hash)])
    }

    /// Places a node, accounts for it, then grows if the threshold is now
    /// exceeded. Returns the node's final slot and chain position.
    fn push_node(&mut self, node: Node<V>) -> (usize, usize) {
        if self.chains.is_empty() {
            self.chains = new_chain_array(MIN_SLOTS);
            self.max_load = max_load_for(MIN_SLOTS, self.load_factor);
        }
        let slot = self.slot_index(node.hash);
        let pos = self.chains[slot].len();
        self.chains[slot].push(node);
        self.len += 1;
        if self.len > self.max_load {
            return self.grow(slot, pos);
        }
        (slot, pos)
    }

    /// Doubles the slot count and redistributes every node by its cached
    /// hash, tracking where the node at `(slot, pos)` lands.
    #[cold]
    #[inline(never)]
    fn grow(&mut self, slot: usize, pos: usize) -> (usize, usize) {
        let Some(new_slots) = self.chains.len().checked_mul(2) else {
            // The slot count cannot double any further; chains absorb the
            // load instead.
            return (slot, pos);
        };
        let mask = new_slots - 1;
        let old = core::mem::replace(&mut self.chains, new_chain_array(new_slots));
        let mut tracked = (slot, pos);
        for (old_slot, chain) in old.into_vec().into_iter().enumerate() {
            for (old_pos, node) in chain.into_iter().enumerate() {
                let new_slot = (node.hash as usize) & mask;
                let new_pos = self.chains[new_slot].len();
                if (old_slot, old_pos) == (slot, pos) {
                    tracked = (new_slot, new_pos);
                }
                self.chains[new_slot].push(node);
            }
        }
        self.max_load = max_load_for(new_slots, self.load_factor);
        tracked
    }

    /// Redistributes every node into a fresh slot array of `new_slots`.
    fn rebuild(&mut self, new_slots: usize) {
        let mask = new_slots - 1;
        let old = core::mem::replace(&mut self.chains, new_chain_array(new_slots));
        for chain in old.into_vec() {
            for node in chain {
                self.chains[(node.hash as usize) & mask].push(node);
            }
        }
        self.max_load = max_load_for(new_slots, self.load_factor);
    }
}

impl<V> IntoIterator for ChainTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            chains: self.chains.into_vec().into_iter(),
            current: SmallVec::new().into_iter(),
        }
    }
}

/// A view into a single entry in the table, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`ChainTable`].
///
/// [`entry`]: ChainTable::entry
///
/// # Examples
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use pool_hash::chain_table::ChainTable;
/// # use pool_hash::chain_table::Entry;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_str(s: &str) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     s.hash(&mut hasher);
/// #     hasher.finish()
/// # }
/// #
/// let mut table = ChainTable::with_capacity(10);
/// let hash = hash_str("key");
///
/// match table.entry(hash, |s: &String| s == "key") {
///     Entry::Vacant(entry) => {
///         entry.insert("key".to_string());
///     }
///     Entry::Occupied(entry) => {
///         println!("resident: {}", entry.get());
///     }
/// }
/// ```
pub enum Entry<'a, V> {
    /// A vacant entry - no matching value is present in the table
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - a matching value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference to the resident value either way.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use pool_hash::chain_table::ChainTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// let hash = hash_str("key");
    ///
    /// let value = table
    ///     .entry(hash, |s: &String| s == "key")
    ///     .or_insert("key".to_string());
    /// assert_eq!(value, "key");
    ///
    /// // The resident value wins on the second call.
    /// let existing = table
    ///     .entry(hash, |s: &String| s == "key")
    ///     .or_insert("other".to_string());
    /// assert_eq!(existing, "key");
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference to the resident value either way.
    ///
    /// The closure is not called for occupied entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use pool_hash::chain_table::ChainTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// let hash = hash_str("key");
    ///
    /// table
    ///     .entry(hash, |s: &String| s == "key")
    ///     .or_insert_with(|| "key".to_string());
    ///
    /// let existing = table
    ///     .entry(hash, |s: &String| s == "key")
    ///     .or_insert_with(|| unreachable!("entry is occupied"));
    /// assert_eq!(existing, "key");
    /// ```
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies a closure to the value if the entry is occupied, then returns
    /// the entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use pool_hash::chain_table::ChainTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// let hash = hash_u64(1);
    ///
    /// table.entry(hash, |&(k, _): &(u64, u32)| k == 1).or_insert((1, 0));
    /// table
    ///     .entry(hash, |&(k, _): &(u64, u32)| k == 1)
    ///     .and_modify(|(_, count)| *count += 1)
    ///     .or_insert((1, 0));
    ///
    /// assert_eq!(table.find(hash, |&(k, _)| k == 1), Some(&(1, 1)));
    /// ```
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference to the resident value either way.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in a [`ChainTable`].
///
/// Created by the [`entry`] method when no matching value is present.
///
/// [`entry`]: ChainTable::entry
pub struct VacantEntry<'a, V> {
    table: &'a mut ChainTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts a value into the vacant entry and returns a mutable reference
    /// to it.
    ///
    /// The value is appended to the chain selected by the hash given to
    /// [`entry`]. If the insertion pushes the table past its load-factor
    /// threshold, the table grows immediately afterwards and the returned
    /// reference points at the value's post-growth position.
    ///
    /// [`entry`]: ChainTable::entry
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use pool_hash::chain_table::ChainTable;
    /// # use pool_hash::chain_table::Entry;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// let hash = hash_str("key");
    ///
    /// match table.entry(hash, |s: &String| s == "key") {
    ///     Entry::Vacant(entry) => {
    ///         let value = entry.insert("value".to_string());
    ///         assert_eq!(value, "value");
    ///     }
    ///     Entry::Occupied(_) => unreachable!("entry should be vacant"),
    /// }
    /// ```
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        let (slot, pos) = table.push_node(Node {
            hash: self.hash,
            value,
        });
        &mut table.chains[slot][pos].value
    }
}

/// A view into an occupied entry in a [`ChainTable`].
///
/// Created by the [`entry`] method when a matching value is present. The
/// resident value can be read, modified in place, or removed; it is never
/// silently replaced.
///
/// [`entry`]: ChainTable::entry
pub struct OccupiedEntry<'a, V> {
    table: &'a mut ChainTable<V>,
    slot: usize,
    pos: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the resident value.
    pub fn get(&self) -> &V {
        &self.table.chains[self.slot][self.pos].value
    }

    /// Gets a mutable reference to the resident value.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.table.chains[self.slot][self.pos].value
    }

    /// Converts the entry into a mutable reference to the resident value with
    /// the lifetime of the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.table.chains[self.slot][self.pos].value
    }

    /// Removes the entry from the table and returns the value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use pool_hash::chain_table::ChainTable;
    /// # use pool_hash::chain_table::Entry;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// let hash = hash_str("key");
    /// table
    ///     .entry(hash, |s: &String| s == "key")
    ///     .or_insert("key".to_string());
    ///
    /// let removed = match table.entry(hash, |s: &String| s == "key") {
    ///     Entry::Occupied(entry) => entry.remove(),
    ///     Entry::Vacant(_) => unreachable!(),
    /// };
    /// assert_eq!(removed, "key");
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(self) -> V {
        let node = self.table.chains[self.slot].remove(self.pos);
        self.table.len -= 1;
        node.value
    }
}

/// An iterator over the values in a [`ChainTable`].
///
/// This struct is created by the [`iter`] method on [`ChainTable`]. It yields
/// `&V` references in table-position order.
///
/// [`iter`]: ChainTable::iter
pub struct Iter<'a, V> {
    chains: core::slice::Iter<'a, Chain<V>>,
    current: core::slice::Iter<'a, Node<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.current.next() {
                return Some(&node.value);
            }
            self.current = self.chains.next()?.iter();
        }
    }
}

/// A draining iterator over the values in a [`ChainTable`].
///
/// This struct is created by the [`drain`] method on [`ChainTable`]. It
/// yields owned `V` values and empties the table as it iterates; dropping it
/// finishes the drain.
///
/// [`drain`]: ChainTable::drain
pub struct Drain<'a, V> {
    table: &'a mut ChainTable<V>,
    slot: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.slot < self.table.chains.len() {
            if let Some(node) = self.table.chains[self.slot].pop() {
                self.table.len -= 1;
                return Some(node.value);
            }
            self.slot += 1;
        }
        None
    }
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in self {}
    }
}

/// A consuming iterator over the values of a [`ChainTable`].
pub struct IntoIter<V> {
    chains: alloc::vec::IntoIter<Chain<V>>,
    current: smallvec::IntoIter<[Node<V>; 1]>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.current.next() {
                return Some(node.value);
            }
            self.current = self.chains.next()?.into_iter();
        }
    }
}

/// A traversal over a [`ChainTable`] that can remove the value it last
/// yielded.
///
/// Created by the [`cursor`] method. Unlike [`Iter`], the cursor holds an
/// exclusive borrow of the table, which is what allows mid-traversal removal
/// and what rules out any other mutation while the cursor is live.
///
/// [`cursor`]: ChainTable::cursor
pub struct Cursor<'a, V> {
    table: &'a mut ChainTable<V>,
    slot: usize,
    pos: usize,
    last: Option<(usize, usize)>,
}

impl<V> Cursor<'_, V> {
    /// Advances the cursor and returns the next value, or `None` once the
    /// table is exhausted.
    ///
    /// After exhaustion every further call returns `None`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&V> {
        while self.slot < self.table.chains.len() {
            if self.pos < self.table.chains[self.slot].len() {
                self.last = Some((self.slot, self.pos));
                self.pos += 1;
                return Some(&self.table.chains[self.slot][self.pos - 1].value);
            }
            self.slot += 1;
            self.pos = 0;
        }
        None
    }

    /// Removes and returns the value most recently yielded by [`next`].
    ///
    /// [`next`]: Cursor::next
    ///
    /// # Panics
    ///
    /// Panics if `next` has not yet yielded a value, or if the last-yielded
    /// value was already removed.
    pub fn remove_current(&mut self) -> V {
        let Some((slot, pos)) = self.last.take() else {
            panic!("remove_current called without a current element");
        };
        let node = self.table.chains[slot].remove(pos);
        self.table.len -= 1;
        if slot == self.slot && pos < self.pos {
            // The chain shifted left underneath the cursor; step back so the
            // element after the removed one is not skipped.
            self.pos -= 1;
        }
        node.value
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl Default for HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }
    }

    impl HashState {
        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone, Default)]
    struct Item {
        key: u64,
        value: i32,
    }

    fn hash_key(state: &HashState, key: u64) -> u64 {
        let mut h = state.build_hasher();
        h.write_u64(key);
        h.finish()
    }

    #[test]
    fn insert_and_find() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in (0..48u64).rev() {
            let hash = hash_key(&state, k);
            match table.entry(hash, |v: &Item| v.key == k) {
                Entry::Vacant(v) => {
                    v.insert(Item {
                        key: k,
                        value: -(k as i32),
                    });
                }
                Entry::Occupied(_) => panic!("unexpected occupied on first insert: {:#?}", table),
            }
        }
        assert_eq!(table.len(), 48);

        for k in 0..48u64 {
            let hash = hash_key(&state, k);
            let found = table
                .find(hash, |v| v.key == k)
                .unwrap_or_else(|| panic!("missing {}#{:02X} in {:#?}", k, hash, table));
            assert_eq!(found.value, -(k as i32));
        }

        // A resident hash with a rejecting predicate is still a miss.
        let resident_hash = hash_key(&state, 7);
        assert!(table.find(resident_hash, |v| v.key == 999).is_none());
        let miss_hash = hash_key(&state, 999);
        assert!(table.find(miss_hash, |v| v.key == 999).is_none());
    }

    #[test]
    fn duplicate_entry_is_occupied() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(4);
        let k = 9000u64;
        let hash = hash_key(&state, k);

        table.entry(hash, |v| v.key == k).or_insert(Item { key: k, value: 1 });

        let table_dbg = alloc::format!("{:#?}", table);
        match table.entry(hash, |v| v.key == k) {
            Entry::Occupied(mut occ) => {
                assert_eq!(occ.get().value, 1, "{}", table_dbg);
                occ.get_mut().value = 2;
            }
            Entry::Vacant(_) => panic!("should be occupied: {}#{:02X} in {:#?}", k, hash, table),
        }

        let resident = match table.entry(hash, |v| v.key == k) {
            Entry::Occupied(occ) => occ.into_mut(),
            Entry::Vacant(_) => unreachable!(),
        };
        resident.value += 10;

        assert_eq!(table.find(hash, |v| v.key == k).unwrap().value, 12);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn find_mut_and_modify() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(12);
        for k in 0..12u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: 100,
            });
        }

        // Touch every third entry; the rest must keep their value.
        for k in (0..12u64).step_by(3) {
            let hash = hash_key(&state, k);
            let v = table.find_mut(hash, |v| v.key == k).expect("resident key");
            v.value = k as i32;
        }
        for k in 0..12u64 {
            let hash = hash_key(&state, k);
            let expected = if k % 3 == 0 { k as i32 } else { 100 };
            assert_eq!(table.find(hash, |v| v.key == k).unwrap().value, expected);
        }

        let miss_hash = hash_key(&state, 404);
        assert!(table.find_mut(miss_hash, |v| v.key == 404).is_none());
    }

    #[test]
    fn remove_items() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in 0..16u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: k as i32,
            });
        }

        for k in (0..16u64).filter(|k| k % 2 == 1) {
            let hash = hash_key(&state, k);
            let removed = table.remove(hash, |v| v.key == k).expect("should remove");
            assert_eq!(removed.value, k as i32);
            assert!(table.find(hash, |v| v.key == k).is_none());
        }
        assert_eq!(table.len(), 8);

        // Removing an already-removed key is a no-op.
        let hash = hash_key(&state, 3);
        assert!(table.remove(hash, |v| v.key == 3).is_none());
        assert_eq!(table.len(), 8);

        // A removed key can come back.
        let hash = hash_key(&state, 5);
        table.entry(hash, |v| v.key == 5).or_insert(Item { key: 5, value: -5 });
        assert_eq!(table.find(hash, |v| v.key == 5).unwrap().value, -5);
        assert_eq!(table.len(), 9);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn insert_many() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in 0..100000u64 {
            let hash = hash_key(&state, k);
            match table.entry(hash, |v| v.key == k) {
                Entry::Vacant(v) => {
                    v.insert(Item {
                        key: k,
                        value: k as i32,
                    });

                    assert_eq!(
                        table.find(hash, |v| v.key == k),
                        Some(&Item {
                            key: k,
                            value: k as i32
                        })
                    );
                }
                _ => unreachable!(),
            }
        }

        assert_eq!(table.len(), 100000);
        for k in 0..100000u64 {
            let hash = hash_key(&state, k);

            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: k as i32
                })
            );
        }
    }

    #[test]
    fn explicit_collision() {
        // Every entry shares one hash, so growth never spreads the chain and
        // every probe walks it end to end.
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        let hash = u64::MAX;
        for k in 0..40u64 {
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: k as i32,
            });
        }

        assert_eq!(table.len(), 40);
        for k in 0..40u64 {
            let found = table.find(hash, |v| v.key == k).expect("chained key");
            assert_eq!(found.value, k as i32);
        }

        // Interior chain removal keeps the rest of the chain reachable.
        for k in [20u64, 0, 39] {
            let removed = table.remove(hash, |v| v.key == k).unwrap();
            assert_eq!(removed.key, k);
        }
        assert_eq!(table.len(), 37);
        for k in (1..39u64).filter(|&k| k != 20) {
            assert!(table.find(hash, |v| v.key == k).is_some());
        }
    }

    #[test]
    fn shared_slot_distinguishes_hashes() {
        // Hashes 1 and 9 land in the same slot at the smallest table size.
        // The cached hash must keep the two entries apart even when the
        // predicate accepts anything.
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        table.entry(1, |v| v.key == 1).or_insert(Item { key: 1, value: 10 });
        table.entry(9, |v| v.key == 9).or_insert(Item { key: 9, value: 90 });

        assert_eq!(table.find(1, |_| true).map(|v| v.key), Some(1));
        assert_eq!(table.find(9, |_| true).map(|v| v.key), Some(9));
        assert!(table.find(17, |_| true).is_none());
        assert!(table.remove(17, |_| true).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn growth_runs_after_insertion_accounting() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity_and_load_factor(2, 1.0);
        let capacity = table.capacity();

        // Filling exactly to capacity must not grow; one past it must.
        for k in 0..capacity as u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: k as i32,
            });
        }
        assert_eq!(table.capacity(), capacity);

        let hash = hash_key(&state, capacity as u64);
        table
            .entry(hash, |v| v.key == capacity as u64)
            .or_insert(Item {
                key: capacity as u64,
                value: 0,
            });
        assert!(table.capacity() > capacity);

        for k in 0..=capacity as u64 {
            let hash = hash_key(&state, k);
            assert!(table.find(hash, |v| v.key == k).is_some());
        }
    }

    #[test]
    fn degenerate_load_factors_still_work() {
        let state = HashState::default();

        // Above 1.0 growth is deferred and chains lengthen; NaN disables
        // growth outright.
        for lf in [5.0f32, f32::NAN] {
            let mut table: ChainTable<Item> = ChainTable::with_capacity_and_load_factor(4, lf);
            for k in 0..50u64 {
                let hash = hash_key(&state, k);
                table.entry(hash, |v| v.key == k).or_insert(Item {
                    key: k,
                    value: k as i32,
                });
            }
            assert_eq!(table.len(), 50, "load factor {}", lf);
            for k in 0..50u64 {
                let hash = hash_key(&state, k);
                assert!(
                    table.find(hash, |v| v.key == k).is_some(),
                    "load factor {}",
                    lf
                );
            }
        }

        // At or below zero every insertion doubles the table, so keep the
        // entry count small.
        for lf in [0.0f32, -1.0] {
            let mut table: ChainTable<Item> = ChainTable::with_capacity_and_load_factor(4, lf);
            for k in 0..6u64 {
                let hash = hash_key(&state, k);
                table.entry(hash, |v| v.key == k).or_insert(Item {
                    key: k,
                    value: k as i32,
                });
            }
            assert_eq!(table.len(), 6, "load factor {}", lf);
            for k in 0..6u64 {
                let hash = hash_key(&state, k);
                assert!(
                    table.find(hash, |v| v.key == k).is_some(),
                    "load factor {}",
                    lf
                );
            }
        }
    }

    #[test]
    fn vacant_insert_reference_survives_growth() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity_and_load_factor(2, 1.0);
        let capacity = table.capacity();
        for k in 0..capacity as u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: 0,
            });
        }

        // This insertion triggers growth; the returned reference must point
        // at the entry's post-growth position.
        let k = capacity as u64;
        let hash = hash_key(&state, k);
        match table.entry(hash, |v| v.key == k) {
            Entry::Vacant(v) => {
                let value = v.insert(Item { key: k, value: 1 });
                assert_eq!(value.key, k);
                value.value = 99;
            }
            _ => unreachable!(),
        }
        assert_eq!(table.find(hash, |v| v.key == k).unwrap().value, 99);
    }

    #[test]
    fn iter_and_drain() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in 100..125u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: (k as i32) - 100,
            });
        }

        let mut iter = table.iter();
        let mut collected: Vec<u64> = (&mut iter).map(|v| v.key).collect();
        // Exhaustion is permanent.
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
        collected.sort_unstable();
        assert_eq!(collected, (100..125u64).collect::<Vec<_>>());
        assert_eq!(table.len(), 25);

        let mut drain = table.drain();
        let drained: Vec<Item> = (&mut drain).collect();
        assert!(drain.next().is_none());
        assert!(drain.next().is_none());
        drop(drain);
        assert_eq!(drained.len(), 25);
        assert_eq!(table.len(), 0);

        for k in 100..125u64 {
            let hash = hash_key(&state, k);
            assert!(table.find(hash, |v| v.key == k).is_none());
        }
    }

    #[test]
    fn iter_is_table_position_order() {
        // With a shared hash every entry lands in one chain, so iteration
        // must replay insertion order exactly.
        let mut table: ChainTable<Item> = ChainTable::with_capacity(64);
        for k in 0..6u64 {
            table.entry(3, |v| v.key == k).or_insert(Item {
                key: k,
                value: k as i32,
            });
        }
        let keys: Vec<u64> = table.iter().map(|v| v.key).collect();
        assert_eq!(keys, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn into_iter_consumes_table() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in 0..10u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: k as i32,
            });
        }

        let mut into_iter = table.into_iter();
        let mut keys: Vec<u64> = (&mut into_iter).map(|item| item.key).collect();
        assert!(into_iter.next().is_none());
        assert!(into_iter.next().is_none());
        keys.sort_unstable();
        assert_eq!(keys, (0..10u64).collect::<Vec<_>>());
    }

    #[test]
    fn drain_partially_consumed_still_empties() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in 0..10u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: 0,
            });
        }

        let mut drain = table.drain();
        assert!(drain.next().is_some());
        assert!(drain.next().is_some());
        drop(drain);

        assert_eq!(table.len(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn clear_retains_capacity() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(100);
        for k in 0..50u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: 0,
            });
        }
        let capacity = table.capacity();

        table.clear();
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), capacity);

        let hash = hash_key(&state, 1);
        assert!(table.find(hash, |v| v.key == 1).is_none());
    }

    #[test]
    fn retain_filters() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in 0..20u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: k as i32,
            });
        }

        table.retain(|v| v.key % 2 == 0);
        assert_eq!(table.len(), 10);
        for k in 0..20u64 {
            let hash = hash_key(&state, k);
            assert_eq!(table.find(hash, |v| v.key == k).is_some(), k % 2 == 0);
        }
    }

    #[test]
    #[cfg(feature = "std")]
    fn retain_unwinding_predicate_keeps_len_accurate() {
        // Four chains of four entries each: hashes 0..4 occupy distinct
        // slots, and the sweep visits them in slot order.
        let mut table: ChainTable<Item> = ChainTable::with_capacity(16);
        for k in 0..16u64 {
            table.entry(k % 4, |v| v.key == k).or_insert(Item {
                key: k,
                value: 0,
            });
        }

        let mut visited = 0;
        let sweep = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            table.retain(|_| {
                visited += 1;
                if visited == 6 {
                    panic!("predicate bailed mid-sweep");
                }
                false
            });
        }));
        assert!(sweep.is_err());

        // The first chain was emptied before the unwind; the count must match
        // what is actually still stored.
        assert_eq!(table.len(), table.iter().count());
        assert_eq!(table.len(), 12);

        table.retain(|_| false);
        assert!(table.is_empty());
    }

    #[test]
    fn reserve_grows_capacity() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in 0..4u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: 0,
            });
        }

        table.reserve(1000);
        assert!(table.capacity() >= table.len() + 1000);
        for k in 0..4u64 {
            let hash = hash_key(&state, k);
            assert!(table.find(hash, |v| v.key == k).is_some());
        }
    }

    #[test]
    fn shrink_to_fit_after_removals() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(500);
        for k in 0..120u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: k as i32,
            });
        }
        let initial_capacity = table.capacity();

        for k in 3..120u64 {
            let hash = hash_key(&state, k);
            table.remove(hash, |v| v.key == k);
        }
        // Removal alone never releases slots.
        assert_eq!(table.len(), 3);
        assert_eq!(table.capacity(), initial_capacity);

        table.shrink_to_fit();
        assert!(table.capacity() < initial_capacity);
        assert!(table.capacity() >= 3);
        for k in 0..3u64 {
            let hash = hash_key(&state, k);
            assert_eq!(table.find(hash, |v| v.key == k).unwrap().value, k as i32);
        }

        // The shrunken table keeps accepting inserts.
        let hash = hash_key(&state, 777);
        table.entry(hash, |v| v.key == 777).or_insert(Item {
            key: 777,
            value: 0,
        });
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn shrink_to_fit_empty_table() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(64);
        for k in 0..10u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item { key: k, value: 0 });
        }
        table.drain().for_each(drop);
        assert!(table.is_empty());
        assert!(table.capacity() > 0);

        // Shrinking an emptied table releases the slots entirely.
        table.shrink_to_fit();
        assert_eq!(table.capacity(), 0);

        let hash = hash_key(&state, 1);
        table.entry(hash, |v| v.key == 1).or_insert(Item { key: 1, value: 1 });
        assert_eq!(table.len(), 1);
        assert!(table.capacity() > 0);
    }

    #[test]
    fn entry_or_insert_with() {
        let state = HashState::default();
        let mut table: ChainTable<StringItem> = ChainTable::with_capacity(0);
        let key = "memoized";
        let hash = hash_string_key(&state, key);

        let mut builds = 0;
        for _ in 0..3 {
            let value_ref = table.entry(hash, |v| v.key == key).or_insert_with(|| {
                builds += 1;
                StringItem {
                    key: key.to_string(),
                    value: 42,
                }
            });
            assert_eq!(value_ref.value, 42);
        }

        // The constructor ran only for the vacant first pass.
        assert_eq!(builds, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn entry_and_modify_then_or_default() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        let hash = hash_key(&state, 5);

        table
            .entry(hash, |v| v.key == 5)
            .and_modify(|v| v.value += 1)
            .or_insert(Item { key: 5, value: 0 });
        assert_eq!(table.find(hash, |v| v.key == 5).unwrap().value, 0);

        table
            .entry(hash, |v| v.key == 5)
            .and_modify(|v| v.value += 1)
            .or_insert(Item { key: 5, value: 0 });
        assert_eq!(table.find(hash, |v| v.key == 5).unwrap().value, 1);

        let defaulted = table.entry(hash_key(&state, 9), |v| v.key == 9).or_default();
        assert_eq!(defaulted.key, 0);
    }

    #[test]
    fn entry_remove() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        let hash = hash_key(&state, 1);
        table.entry(hash, |v| v.key == 1).or_insert(Item {
            key: 1,
            value: 10,
        });

        let removed = match table.entry(hash, |v| v.key == 1) {
            Entry::Occupied(entry) => entry.remove(),
            Entry::Vacant(_) => unreachable!(),
        };
        assert_eq!(removed.value, 10);
        assert!(table.is_empty());
    }

    #[test]
    fn cursor_visits_every_entry_once() {
        let state = HashState::default();
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in 0..30u64 {
            let hash = hash_key(&state, k);
            table.entry(hash, |v| v.key == k).or_insert(Item {
                key: k,
                value: 0,
            });
        }

        let mut seen = Vec::new();
        let mut cursor = table.cursor();
        while let Some(item) = cursor.next() {
            seen.push(item.key);
        }
        assert!(cursor.next().is_none());
        assert!(cursor.next().is_none());

        seen.sort_unstable();
        assert_eq!(seen, (0..30u64).collect::<Vec<_>>());
    }

    #[test]
    fn cursor_removes_interior_chain_entries() {
        // Shared hash: a single chain of six entries. Removing mid-traversal
        // must not skip the entry that shifts into the removed position.
        let mut table: ChainTable<Item> = ChainTable::with_capacity(64);
        for k in 0..6u64 {
            table.entry(7, |v| v.key == k).or_insert(Item {
                key: k,
                value: 0,
            });
        }

        let mut yielded = Vec::new();
        let mut cursor = table.cursor();
        while let Some(item) = cursor.next() {
            yielded.push(item.key);
            if item.key % 2 == 0 {
                let removed = cursor.remove_current();
                assert_eq!(removed.key % 2, 0);
            }
        }
        assert_eq!(yielded, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(table.len(), 3);
        for k in [1u64, 3, 5] {
            assert!(table.find(7, |v| v.key == k).is_some());
        }
    }

    #[test]
    fn cursor_remove_after_exhaustion_removes_last_yielded() {
        let mut table: ChainTable<Item> = ChainTable::with_capacity(64);
        for k in 0..3u64 {
            table.entry(1, |v| v.key == k).or_insert(Item {
                key: k,
                value: 0,
            });
        }

        let mut cursor = table.cursor();
        while cursor.next().is_some() {}
        let removed = cursor.remove_current();
        assert_eq!(removed.key, 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    #[should_panic(expected = "remove_current called without a current element")]
    fn cursor_remove_before_next_panics() {
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        table.entry(0, |v| v.key == 0).or_insert(Item {
            key: 0,
            value: 0,
        });

        let mut cursor = table.cursor();
        cursor.remove_current();
    }

    #[test]
    #[should_panic(expected = "remove_current called without a current element")]
    fn cursor_double_remove_panics() {
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        for k in 0..3u64 {
            table.entry(k, |v| v.key == k).or_insert(Item {
                key: k,
                value: 0,
            });
        }

        let mut cursor = table.cursor();
        cursor.next();
        cursor.remove_current();
        cursor.remove_current();
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct StringItem {
        key: String,
        value: i32,
    }

    fn hash_string_key(state: &HashState, key: &str) -> u64 {
        let mut h = state.build_hasher();
        h.write(key.as_bytes());
        h.finish()
    }

    #[test]
    fn insert_and_find_string_keys() {
        let state = HashState::default();
        let mut table: ChainTable<StringItem> = ChainTable::with_capacity(0);
        let keys = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"];

        for (i, k) in keys.iter().enumerate() {
            let hash = hash_string_key(&state, k);
            table
                .entry(hash, |v: &StringItem| v.key == *k)
                .or_insert(StringItem {
                    key: k.to_string(),
                    value: i as i32,
                });
        }
        assert_eq!(table.len(), keys.len());

        for (i, k) in keys.iter().enumerate() {
            let hash = hash_string_key(&state, k);
            let found = table.find(hash, |v| v.key == *k).expect("resident key");
            assert_eq!(found.value, i as i32);
        }

        // Prefixes of resident keys are not resident.
        for miss in ["alph", "bet", ""] {
            let hash = hash_string_key(&state, miss);
            assert!(table.find(hash, |v| v.key == miss).is_none());
        }
    }

    #[test]
    fn clone_is_independent() {
        let state = HashState::default();
        let mut original: ChainTable<StringItem> = ChainTable::with_capacity(10);

        let test_data = [("hello", 1), ("world", 2), ("clone", 3)];
        for (key, value) in test_data.iter() {
            let hash = hash_string_key(&state, key);
            original
                .entry(hash, |v| v.key == *key)
                .or_insert(StringItem {
                    key: key.to_string(),
                    value: *value,
                });
        }

        let cloned = original.clone();
        assert_eq!(original.len(), cloned.len());

        let hash = hash_string_key(&state, "hello");
        if let Some(item) = original.find_mut(hash, |v| v.key == "hello") {
            item.value = 999;
        }

        assert_eq!(original.find(hash, |v| v.key == "hello").unwrap().value, 999);
        assert_eq!(cloned.find(hash, |v| v.key == "hello").unwrap().value, 1);
    }

    #[test]
    fn zero_capacity_allocates_nothing_until_insert() {
        let mut table: ChainTable<Item> = ChainTable::with_capacity(0);
        assert_eq!(table.capacity(), 0);
        assert!(table.find(0, |_| true).is_none());
        assert!(table.remove(0, |_| true).is_none());

        table.entry(0, |v| v.key == 0).or_insert(Item {
            key: 0,
            value: 0,
        });
        assert!(table.capacity() > 0);
        assert_eq!(table.len(), 1);
    }
}
