use core::hash::BuildHasher;
use core::hash::Hash;

use crate::pool_set::PoolSet;

/// A pool of canonical instances, indexed by equality.
///
/// A pool holds at most one resident instance per equality class and hands
/// that instance back on every request, which is the contract interning
/// code relies on: ask the pool for an equal value twice and both callers
/// see the same stored instance. [`PoolSet`] implements this trait, so any
/// code written against `Pool<T>` works with it directly.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use pool_hash::Pool;
/// use pool_hash::PoolSet;
///
/// fn intern(pool: &mut impl Pool<String>, name: &str) -> String {
///     pool.put(name.to_string()).clone()
/// }
///
/// let mut pool: PoolSet<String> = PoolSet::new();
/// intern(&mut pool, "alpha");
/// intern(&mut pool, "alpha");
/// assert_eq!(pool.len(), 1);
/// # }
/// ```
pub trait Pool<T> {
    /// Returns a reference to the resident instance equal to `value`, if
    /// one is pooled.
    fn get(&self, value: &T) -> Option<&T>;

    /// Adds `value` if no equal instance is resident and returns the
    /// resident instance either way.
    ///
    /// When an equal instance is already pooled, the argument is dropped
    /// and the original resident instance is returned; the resident is
    /// never replaced.
    fn put(&mut self, value: T) -> &T;

    /// Removes and returns the resident instance equal to `value`, if one
    /// is pooled.
    fn take(&mut self, value: &T) -> Option<T>;
}

impl<T, S> Pool<T> for PoolSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn get(&self, value: &T) -> Option<&T> {
        PoolSet::get(self, value)
    }

    fn put(&mut self, value: T) -> &T {
        PoolSet::put(self, value)
    }

    fn take(&mut self, value: &T) -> Option<T> {
        PoolSet::take(self, value)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    fn canonical<'a, P: Pool<String>>(pool: &'a mut P, name: &str) -> &'a String {
        pool.put(name.to_string())
    }

    #[test]
    fn test_pool_generic_bound() {
        let mut pool = PoolSet::with_hasher(SipHashBuilder::default());

        let ptr = canonical(&mut pool, "value").as_ptr();
        assert_eq!(canonical(&mut pool, "value").as_ptr(), ptr);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_pool_trait_object() {
        let mut set = PoolSet::with_hasher(SipHashBuilder::default());
        let pool: &mut dyn Pool<String> = &mut set;

        let first_ptr = pool.put("name".to_string()).as_ptr();
        assert_eq!(pool.put("name".to_string()).as_ptr(), first_ptr);
        assert_eq!(
            pool.get(&"name".to_string()).map(|s| s.as_ptr()),
            Some(first_ptr)
        );

        assert_eq!(pool.take(&"name".to_string()), Some("name".to_string()));
        assert_eq!(pool.get(&"name".to_string()), None);
    }

    #[test]
    fn test_pool_round_trip_returns_original() {
        let mut pool = PoolSet::with_hasher(SipHashBuilder::default());
        let original = "shared".to_string();
        let original_ptr = original.as_ptr();

        Pool::put(&mut pool, original);
        let taken = Pool::take(&mut pool, &"shared".to_string()).unwrap();
        assert_eq!(taken.as_ptr(), original_ptr);
        assert!(pool.is_empty());
    }
}
