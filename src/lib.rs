#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use cfg_if::cfg_if;

pub mod chain_table;

/// The canonical-instance pool interface.
///
/// This module provides the `Pool` trait, the get/put/take surface that
/// interning code programs against; `PoolSet` implements it.
pub mod pool;

/// A hash set with pool (interning) semantics.
///
/// This module provides a `PoolSet` that wraps the `ChainTable` and provides
/// a standard set interface with configurable hashers, plus the pool
/// operations that hand out resident instances.
pub mod pool_set;

pub use chain_table::ChainTable;
pub use chain_table::Entry;
pub use pool::Pool;
pub use pool_set::PoolSet;

cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The default hasher builder for [`PoolSet`], backed by `foldhash`.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The default hasher builder for [`PoolSet`], backed by the standard
        /// library's `RandomState`.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        /// A placeholder hasher builder used when neither the `std` nor the
        /// `foldhash` feature is enabled.
        ///
        /// This type cannot be constructed. Without a default hasher, build
        /// sets through the `with_hasher` constructors instead.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}

        impl core::hash::BuildHasher for DefaultHashBuilder {
            type Hasher = Self;

            fn build_hasher(&self) -> Self::Hasher {
                match *self {}
            }
        }

        impl core::hash::Hasher for DefaultHashBuilder {
            fn finish(&self) -> u64 {
                match *self {}
            }

            fn write(&mut self, _bytes: &[u8]) {
                match *self {}
            }
        }
    }
}
