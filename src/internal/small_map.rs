// SPDX-License-Identifier: MPL-2.0

//! A map optimized for the very common case of zero, one or two entries,
//! falling back to a [`Vec`]-backed map for anything larger. Most incompatibilities
//! and partial solution bookkeeping only ever touch a handful of packages at once,
//! so a linear scan beats hashing here.

use std::fmt;
use std::hash::Hash;

use crate::type_aliases::Map;

#[derive(Clone)]
pub(crate) enum SmallMap<K, V> {
    Empty,
    One([(K, V); 1]),
    Two([(K, V); 2]),
    Flexible(Vec<(K, V)>),
}

impl<K: PartialEq, V> SmallMap<K, V> {
    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        match self {
            Self::Empty => None,
            Self::One([(k, v)]) => (k == key).then_some(v),
            Self::Two([(k1, v1), (k2, v2)]) => {
                if k1 == key {
                    Some(v1)
                } else if k2 == key {
                    Some(v2)
                } else {
                    None
                }
            }
            Self::Flexible(v) => v.iter().find(|(k, _)| k == key).map(|(_, v)| v),
        }
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        match std::mem::replace(self, Self::Empty) {
            Self::Empty => None,
            Self::One([(k, v)]) => {
                if &k == key {
                    Some(v)
                } else {
                    *self = Self::One([(k, v)]);
                    None
                }
            }
            Self::Two([(k1, v1), (k2, v2)]) => {
                if &k1 == key {
                    *self = Self::One([(k2, v2)]);
                    Some(v1)
                } else if &k2 == key {
                    *self = Self::One([(k1, v1)]);
                    Some(v2)
                } else {
                    *self = Self::Two([(k1, v1), (k2, v2)]);
                    None
                }
            }
            Self::Flexible(mut v) => {
                let idx = v.iter().position(|(k, _)| k == key);
                let out = idx.map(|i| v.remove(i).1);
                *self = Self::Flexible(v);
                out
            }
        }
    }

    pub(crate) fn insert(&mut self, key: K, value: V) {
        match std::mem::replace(self, Self::Empty) {
            Self::Empty => *self = Self::One([(key, value)]),
            Self::One([(k, v)]) => {
                if k == key {
                    *self = Self::One([(k, value)]);
                } else {
                    *self = Self::Two([(k, v), (key, value)]);
                }
            }
            Self::Two([(k1, v1), (k2, v2)]) => {
                if k1 == key {
                    *self = Self::Two([(k1, value), (k2, v2)]);
                } else if k2 == key {
                    *self = Self::Two([(k1, v1), (k2, value)]);
                } else {
                    *self = Self::Flexible(vec![(k1, v1), (k2, v2), (key, value)]);
                }
            }
            Self::Flexible(mut v) => {
                if let Some(slot) = v.iter_mut().find(|(k, _)| k == &key) {
                    slot.1 = value;
                } else {
                    v.push((key, value));
                }
                *self = Self::Flexible(v);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Two(_) => 2,
            Self::Flexible(v) => v.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        let slice: &[(K, V)] = match self {
            Self::Empty => &[],
            Self::One(v) => v,
            Self::Two(v) => v,
            Self::Flexible(v) => v,
        };
        slice.iter().map(|(k, v)| (k, v))
    }
}

impl<K: PartialEq + Clone, V> SmallMap<K, V> {
    /// Merge another set of (key, value) pairs into this map.
    /// Keys present in both are combined with `f`; if `f` returns `None` the key is dropped.
    /// Keys only present in `iter` are inherited as-is.
    pub(crate) fn merge<'a>(
        &mut self,
        iter: impl Iterator<Item = (&'a K, &'a V)>,
        mut f: impl FnMut(&V, &'a V) -> Option<V>,
    ) where
        K: 'a,
        V: Clone,
    {
        for (k, v) in iter {
            match self.get(k) {
                Some(existing) => match f(existing, v) {
                    Some(merged) => self.insert(k.clone(), merged),
                    None => {
                        self.remove(k);
                    }
                },
                None => self.insert(k.clone(), v.clone()),
            }
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> SmallMap<K, V> {
    pub(crate) fn as_map(&self) -> Map<K, V> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SmallMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
