use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, LinkedList, VecDeque};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::{HashMap, HashSet};

use crate::container::{derive_map, derive_sequence};
use crate::registry::Derivation;
use crate::{Codec, CodecError, Describe};

macro_rules! impl_sequence {
    ($($ty:ty where [$($bounds:tt)*]),* $(,)?) => {
        $(
            impl<$($bounds)*> Describe for $ty {
                #[inline]
                fn derive(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Self>>, CodecError> {
                    derive_sequence::<Self>(cx)
                }
            }
        )*
    };
}

impl_sequence! {
    Vec<T> where [T: Describe],
    VecDeque<T> where [T: Describe],
    LinkedList<T> where [T: Describe],
    Box<[T]> where [T: Describe],
    BTreeSet<T> where [T: Describe + Ord],
    HashSet<T, S> where [T: Describe + Eq + Hash, S: BuildHasher + Default + 'static],
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    #[inline]
    fn derive(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Self>>, CodecError> {
        derive_sequence::<Self>(cx)
    }
}

impl<K: Describe + Ord, V: Describe> Describe for BTreeMap<K, V> {
    #[inline]
    fn derive(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Self>>, CodecError> {
        derive_map::<Self>(cx)
    }
}

impl<K, V, S> Describe for HashMap<K, V, S>
where
    K: Describe + Eq + Hash,
    V: Describe,
    S: BuildHasher + Default + 'static,
{
    #[inline]
    fn derive(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<Self>>, CodecError> {
        derive_map::<Self>(cx)
    }
}
