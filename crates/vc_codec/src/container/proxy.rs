use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, LinkedList, VecDeque};
use alloc::vec::Vec;
use core::any::type_name;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::{HashMap, HashSet};

use crate::{At, CodecError, Describe};

// -----------------------------------------------------------------------------
// Traits

/// A container encoded as an array of its items.
pub trait SequenceLike: Sized + 'static {
    type Item: Describe;
    type Proxy: SequenceProxy<Self>;

    fn len(&self) -> usize;

    /// Items in encoding order.
    fn items(&self) -> impl Iterator<Item = &Self::Item>;

    /// A fresh proxy that collects decoded items.
    fn proxy(capacity: usize) -> Self::Proxy;
}

/// Mutable stand-in for a sequence while its items are decoded.
pub trait SequenceProxy<C: SequenceLike> {
    fn push(&mut self, item: C::Item) -> Result<(), CodecError>;

    /// Produces the container. Fails if the items do not fit it.
    fn construct(self) -> Result<C, CodecError>;
}

/// A container of key-value entries.
pub trait MapLike: Sized + 'static {
    type Key: Describe;
    type Value: Describe;
    type Proxy: MapProxy<Self>;

    fn len(&self) -> usize;

    /// Entries in encoding order.
    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;

    fn proxy(capacity: usize) -> Self::Proxy;
}

/// Mutable stand-in for a map while its entries are decoded.
pub trait MapProxy<M: MapLike> {
    /// Adds an entry. A key that is already present is a data error.
    fn insert(&mut self, key: M::Key, value: M::Value) -> Result<(), CodecError>;

    fn construct(self) -> M;
}

#[inline]
fn duplicate<C>() -> CodecError {
    CodecError::DuplicateKey {
        ty: type_name::<C>(),
        at: At(None),
    }
}

// -----------------------------------------------------------------------------
// Lists

/// Collects items in order, then builds the list in one go.
pub struct ListProxy<C, T> {
    items: Vec<T>,
    _marker: PhantomData<fn() -> C>,
}

impl<C, T> ListProxy<C, T> {
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            _marker: PhantomData,
        }
    }
}

impl<C, T> SequenceProxy<C> for ListProxy<C, T>
where
    C: SequenceLike<Item = T> + FromIterator<T>,
{
    #[inline]
    fn push(&mut self, item: C::Item) -> Result<(), CodecError> {
        self.items.push(item);
        Ok(())
    }

    #[inline]
    fn construct(self) -> Result<C, CodecError> {
        Ok(self.items.into_iter().collect())
    }
}

macro_rules! impl_list {
    ($($ty:ident),*) => {
        $(
            impl<T: Describe> SequenceLike for $ty<T> {
                type Item = T;
                type Proxy = ListProxy<Self, T>;

                #[inline]
                fn len(&self) -> usize {
                    <$ty<T>>::len(self)
                }

                #[inline]
                fn items(&self) -> impl Iterator<Item = &T> {
                    self.iter()
                }

                #[inline]
                fn proxy(capacity: usize) -> Self::Proxy {
                    ListProxy::with_capacity(capacity)
                }
            }
        )*
    };
}

impl_list!(Vec, VecDeque, LinkedList);

impl<T: Describe> SequenceLike for Box<[T]> {
    type Item = T;
    type Proxy = ListProxy<Self, T>;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn proxy(capacity: usize) -> Self::Proxy {
        ListProxy::with_capacity(capacity)
    }
}

// -----------------------------------------------------------------------------
// Arrays

/// Collects items of a fixed-size array; the count is checked on construction.
pub struct ArrayProxy<T, const N: usize> {
    items: Vec<T>,
}

impl<T: Describe, const N: usize> SequenceProxy<[T; N]> for ArrayProxy<T, N> {
    #[inline]
    fn push(&mut self, item: T) -> Result<(), CodecError> {
        self.items.push(item);
        Ok(())
    }

    fn construct(self) -> Result<[T; N], CodecError> {
        <[T; N]>::try_from(self.items).map_err(|items| CodecError::LengthMismatch {
            ty: type_name::<[T; N]>(),
            expected: N,
            found: items.len(),
            at: At(None),
        })
    }
}

impl<T: Describe, const N: usize> SequenceLike for [T; N] {
    type Item = T;
    type Proxy = ArrayProxy<T, N>;

    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn proxy(_: usize) -> Self::Proxy {
        ArrayProxy {
            items: Vec::with_capacity(N),
        }
    }
}

// -----------------------------------------------------------------------------
// Sets

pub struct HashSetProxy<T, S> {
    set: HashSet<T, S>,
}

impl<T, S> SequenceProxy<HashSet<T, S>> for HashSetProxy<T, S>
where
    T: Describe + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    fn push(&mut self, item: T) -> Result<(), CodecError> {
        if self.set.insert(item) {
            Ok(())
        } else {
            Err(duplicate::<HashSet<T, S>>())
        }
    }

    #[inline]
    fn construct(self) -> Result<HashSet<T, S>, CodecError> {
        Ok(self.set)
    }
}

impl<T, S> SequenceLike for HashSet<T, S>
where
    T: Describe + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    type Item = T;
    type Proxy = HashSetProxy<T, S>;

    #[inline]
    fn len(&self) -> usize {
        HashSet::len(self)
    }

    #[inline]
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn proxy(capacity: usize) -> Self::Proxy {
        HashSetProxy {
            set: HashSet::with_capacity_and_hasher(capacity, S::default()),
        }
    }
}

pub struct BTreeSetProxy<T> {
    set: BTreeSet<T>,
}

impl<T: Describe + Ord> SequenceProxy<BTreeSet<T>> for BTreeSetProxy<T> {
    fn push(&mut self, item: T) -> Result<(), CodecError> {
        if self.set.insert(item) {
            Ok(())
        } else {
            Err(duplicate::<BTreeSet<T>>())
        }
    }

    #[inline]
    fn construct(self) -> Result<BTreeSet<T>, CodecError> {
        Ok(self.set)
    }
}

impl<T: Describe + Ord> SequenceLike for BTreeSet<T> {
    type Item = T;
    type Proxy = BTreeSetProxy<T>;

    #[inline]
    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    #[inline]
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn proxy(_: usize) -> Self::Proxy {
        BTreeSetProxy { set: BTreeSet::new() }
    }
}

// -----------------------------------------------------------------------------
// Maps

pub struct HashMapProxy<K, V, S> {
    map: HashMap<K, V, S>,
}

impl<K, V, S> MapProxy<HashMap<K, V, S>> for HashMapProxy<K, V, S>
where
    K: Describe + Eq + Hash,
    V: Describe,
    S: BuildHasher + Default + 'static,
{
    fn insert(&mut self, key: K, value: V) -> Result<(), CodecError> {
        use std::collections::hash_map::Entry;

        match self.map.entry(key) {
            Entry::Occupied(_) => Err(duplicate::<HashMap<K, V, S>>()),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    #[inline]
    fn construct(self) -> HashMap<K, V, S> {
        self.map
    }
}

impl<K, V, S> MapLike for HashMap<K, V, S>
where
    K: Describe + Eq + Hash,
    V: Describe,
    S: BuildHasher + Default + 'static,
{
    type Key = K;
    type Value = V;
    type Proxy = HashMapProxy<K, V, S>;

    #[inline]
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    #[inline]
    fn proxy(capacity: usize) -> Self::Proxy {
        HashMapProxy {
            map: HashMap::with_capacity_and_hasher(capacity, S::default()),
        }
    }
}

pub struct BTreeMapProxy<K, V> {
    map: BTreeMap<K, V>,
}

impl<K: Describe + Ord, V: Describe> MapProxy<BTreeMap<K, V>> for BTreeMapProxy<K, V> {
    fn insert(&mut self, key: K, value: V) -> Result<(), CodecError> {
        use alloc::collections::btree_map::Entry;

        match self.map.entry(key) {
            Entry::Occupied(_) => Err(duplicate::<BTreeMap<K, V>>()),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    #[inline]
    fn construct(self) -> BTreeMap<K, V> {
        self.map
    }
}

impl<K: Describe + Ord, V: Describe> MapLike for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    type Proxy = BTreeMapProxy<K, V>;

    #[inline]
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    #[inline]
    fn proxy(_: usize) -> Self::Proxy {
        BTreeMapProxy { map: BTreeMap::new() }
    }
}
